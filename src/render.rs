//! Rendering values through serde, and JSON output.

use serde::{
    Serialize, Serializer,
    ser::{Error as _, SerializeMap, SerializeSeq},
};

use crate::{Error, Options, Result, SharedSlice, Slice, ValueType};

/// A value paired with the options used to render it.
///
/// Integer keys are translated and external values resolved through the
/// options. Tags are dropped. None, illegal, min key and max key render as
/// null; BCD numbers render as strings such as `"-125e-2"`; custom values
/// render as their hex dump.
#[derive(Clone, Copy, Debug)]
pub struct Render<'s, 'o> {
    slice: Slice<'s>,
    options: &'o Options,
}

impl<'s, 'o> Render<'s, 'o> {
    pub fn new(slice: Slice<'s>, options: &'o Options) -> Self {
        Render { slice, options }
    }
}

fn bcd_to_string(sign: i8, exponent: i32, mantissa: &[u8]) -> String {
    let digits: String = mantissa
        .iter()
        .flat_map(|byte| [byte >> 4, byte & 0x0f])
        .map(|digit| char::from(b'0' + digit.min(9)))
        .collect();
    let digits = digits.trim_start_matches('0');
    let digits = if digits.is_empty() { "0" } else { digits };
    let sign = if sign < 0 { "-" } else { "" };
    if exponent == 0 {
        format!("{sign}{digits}")
    } else {
        format!("{sign}{digits}e{exponent}")
    }
}

impl Serialize for Render<'_, '_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let fail = |e: Error| S::Error::custom(e);
        let value = self.slice.value().map_err(fail)?;
        match value.value_type() {
            ValueType::None
            | ValueType::Illegal
            | ValueType::Null
            | ValueType::MinKey
            | ValueType::MaxKey => serializer.serialize_none(),
            ValueType::Bool => serializer.serialize_bool(value.get_bool().map_err(fail)?),
            ValueType::Double => serializer.serialize_f64(value.get_double().map_err(fail)?),
            ValueType::UtcDate => serializer.serialize_i64(value.get_utc_date().map_err(fail)?),
            ValueType::Int | ValueType::SmallInt => {
                serializer.serialize_i64(value.get_int().map_err(fail)?)
            }
            ValueType::UInt => serializer.serialize_u64(value.get_uint().map_err(fail)?),
            ValueType::String => serializer.serialize_str(value.string_view().map_err(fail)?),
            ValueType::Binary => serializer.serialize_bytes(value.get_binary().map_err(fail)?),
            ValueType::Bcd => {
                let bcd = value.get_bcd().map_err(fail)?;
                serializer.serialize_str(&bcd_to_string(bcd.sign, bcd.exponent, bcd.mantissa))
            }
            ValueType::Custom => serializer.serialize_str(&value.to_hex().map_err(fail)?),
            ValueType::External => {
                let id = value.get_external().map_err(fail)?;
                let resolved = self.options.resolve(id).map_err(fail)?;
                Render::new(resolved.slice(), self.options).serialize(serializer)
            }
            ValueType::Array => {
                let iter = value.array_iter().map_err(fail)?;
                let mut seq = serializer.serialize_seq(Some(iter.size()))?;
                for member in iter {
                    seq.serialize_element(&Render::new(member.map_err(fail)?, self.options))?;
                }
                seq.end()
            }
            ValueType::Object => {
                let iter = value.object_iter().map_err(fail)?;
                let mut map = serializer.serialize_map(Some(iter.size()))?;
                for pair in iter {
                    let (key, member) = pair.map_err(fail)?;
                    let key = key.make_key(self.options).map_err(fail)?;
                    map.serialize_entry(
                        key.string_view().map_err(fail)?,
                        &Render::new(member, self.options),
                    )?;
                }
                map.end()
            }
            // value() strips every tag
            ValueType::Tagged => Err(fail(Error::MalformedData)),
        }
    }
}

impl Serialize for Slice<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Render::new(*self, &Options::DEFAULT).serialize(serializer)
    }
}

impl Serialize for SharedSlice {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.slice().serialize(serializer)
    }
}

fn json(render: &Render<'_, '_>) -> Result<String> {
    let rendered = if render.options.pretty_print {
        serde_json::to_string_pretty(render)
    } else {
        serde_json::to_string(render)
    };
    rendered.map_err(|e| Error::Message(e.to_string()))
}

impl Slice<'_> {
    /// Renders the value with `options`.
    pub fn render<'o>(&self, options: &'o Options) -> Render<'_, 'o> {
        Render::new(*self, options)
    }

    /// The value as JSON text.
    ///
    /// # Example
    ///
    /// ```
    /// use na_vpack::{Builder, Options, Value};
    ///
    /// let mut builder = Builder::new();
    /// builder.open_object().unwrap();
    /// builder.add_entry("foo", Value::Int(42)).unwrap();
    /// builder.close().unwrap();
    ///
    /// let json = builder.slice().unwrap().to_json(&Options::DEFAULT).unwrap();
    /// assert_eq!(json, r#"{"foo":42}"#);
    /// ```
    pub fn to_json(&self, options: &Options) -> Result<String> {
        json(&self.render(options))
    }
}

impl SharedSlice {
    pub fn render<'o>(&self, options: &'o Options) -> Render<'_, 'o> {
        Render::new(self.slice(), options)
    }

    pub fn to_json(&self, options: &Options) -> Result<String> {
        json(&self.render(options))
    }
}
