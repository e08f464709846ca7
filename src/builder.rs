//! Encoder producing complete VelocyPack buffers.
//!
//! The builder exists so that documents can be produced without an external
//! encoder: tests, benchmarks and the attribute translator all build their
//! inputs with it.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, trace};
use zerocopy::byteorder::{F64, I32, I64, LittleEndian};

use crate::{
    AttributeTranslator, Error, Options, Result, SharedSlice, Slice,
    util::{uint_width, write_uint, write_varint_forward},
};

/// A scalar value to append.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value<'a> {
    /// Only valid as a complete document, never inside a container.
    None,
    Illegal,
    Null,
    Bool(bool),
    /// Encoded as a small int when it fits, otherwise with the fewest bytes.
    Int(i64),
    UInt(u64),
    Double(f64),
    /// Milliseconds since the Unix epoch.
    UtcDate(i64),
    String(&'a str),
    Binary(&'a [u8]),
    /// An opaque id for an [`ExternalResolver`](crate::ExternalResolver).
    External(u64),
    MinKey,
    MaxKey,
}

#[derive(Debug)]
struct Frame {
    /// Position of the first member in the buffer; the header is inserted
    /// here on close.
    start: usize,
    object: bool,
    compact: bool,
    /// Member offsets relative to `start` (keys for objects).
    members: Vec<usize>,
    /// Attribute names, parallel to `members`, for sorting the index table.
    names: Vec<Box<str>>,
    expecting_value: bool,
}

/// Builds one VelocyPack document.
///
/// # Example
///
/// ```
/// use na_vpack::{Builder, Value};
///
/// let mut builder = Builder::new();
/// builder.open_array().unwrap();
/// builder.add(Value::Int(1)).unwrap();
/// builder.add(Value::String("two")).unwrap();
/// builder.close().unwrap();
///
/// let shared = builder.into_shared_slice().unwrap();
/// assert_eq!(shared.length(), Ok(2));
/// assert_eq!(shared.at(1).unwrap().string_view().unwrap(), "two");
/// ```
#[derive(Debug, Default)]
pub struct Builder {
    buffer: Vec<u8>,
    stack: Vec<Frame>,
    translator: Option<Arc<AttributeTranslator>>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder that writes object keys known to the options' attribute
    /// translator as integer ids.
    pub fn with_options(options: &Options) -> Self {
        Builder {
            translator: options.attribute_translator.clone(),
            ..Self::default()
        }
    }

    /// Returns `true` once a complete document has been written.
    pub fn is_closed(&self) -> bool {
        self.stack.is_empty() && !self.buffer.is_empty()
    }

    /// Checks that one more value may be written and records its position.
    fn before_value(&mut self) -> Result<()> {
        let position = self.buffer.len();
        match self.stack.last_mut() {
            None if !self.buffer.is_empty() => {
                Err(Error::InvalidBuilderState("document already complete"))
            }
            None => Ok(()),
            Some(frame) if frame.object => {
                if !frame.expecting_value {
                    return Err(Error::InvalidBuilderState("object key expected"));
                }
                frame.expecting_value = false;
                Ok(())
            }
            Some(frame) => {
                frame.members.push(position - frame.start);
                Ok(())
            }
        }
    }

    fn in_container(&self) -> bool {
        !self.stack.is_empty()
    }

    pub fn add(&mut self, value: Value<'_>) -> Result<&mut Self> {
        if matches!(value, Value::None) && self.in_container() {
            return Err(Error::InvalidBuilderState("none inside a container"));
        }
        self.before_value()?;
        encode_value(&mut self.buffer, value);
        Ok(self)
    }

    /// Writes an object key; the next value written is its value.
    pub fn add_key(&mut self, key: &str) -> Result<&mut Self> {
        let position = self.buffer.len();
        let Some(frame) = self.stack.last_mut() else {
            return Err(Error::InvalidBuilderState("key outside an object"));
        };
        if !frame.object {
            return Err(Error::InvalidBuilderState("key outside an object"));
        }
        if frame.expecting_value {
            return Err(Error::InvalidBuilderState("value expected"));
        }
        frame.members.push(position - frame.start);
        frame.names.push(key.into());
        frame.expecting_value = true;
        match self.translator.as_deref().and_then(|t| t.id_of(key)) {
            Some(id) => {
                trace!(key, id, "writing translated key");
                encode_value(&mut self.buffer, Value::UInt(id));
            }
            None => encode_string(&mut self.buffer, key),
        }
        Ok(self)
    }

    pub fn add_entry(&mut self, key: &str, value: Value<'_>) -> Result<&mut Self> {
        self.add_key(key)?;
        self.add(value)
    }

    fn open(&mut self, object: bool, compact: bool) -> Result<&mut Self> {
        self.before_value()?;
        self.stack.push(Frame {
            start: self.buffer.len(),
            object,
            compact,
            members: Vec::new(),
            names: Vec::new(),
            expecting_value: false,
        });
        Ok(self)
    }

    pub fn open_array(&mut self) -> Result<&mut Self> {
        self.open(false, false)
    }

    pub fn open_object(&mut self) -> Result<&mut Self> {
        self.open(true, false)
    }

    /// Opens an array written without an index table.
    pub fn open_compact_array(&mut self) -> Result<&mut Self> {
        self.open(false, true)
    }

    /// Opens an object written without an index table.
    pub fn open_compact_object(&mut self) -> Result<&mut Self> {
        self.open(true, true)
    }

    /// Closes the innermost open array or object.
    pub fn close(&mut self) -> Result<&mut Self> {
        let Some(frame) = self.stack.pop() else {
            return Err(Error::InvalidBuilderState("no open container"));
        };
        if frame.expecting_value {
            self.stack.push(frame);
            return Err(Error::InvalidBuilderState("key without value"));
        }
        let body = self.buffer.split_off(frame.start);
        if frame.members.is_empty() {
            self.buffer.push(if frame.object { 0x0a } else { 0x01 });
        } else if frame.compact {
            close_compact(&mut self.buffer, &frame, &body);
        } else if !frame.object && same_sizes(&frame.members, body.len()) {
            close_equal_sized(&mut self.buffer, &body);
        } else {
            close_indexed(&mut self.buffer, &frame, &body);
        }
        trace!(
            members = frame.members.len(),
            size = self.buffer.len() - frame.start,
            "closed container"
        );
        Ok(self)
    }

    /// Writes `value` wrapped in `tag`.
    pub fn add_tagged(&mut self, tag: u64, value: Value<'_>) -> Result<&mut Self> {
        if matches!(value, Value::None) {
            return Err(Error::InvalidBuilderState("tagged none"));
        }
        self.before_value()?;
        if tag <= 0xff {
            self.buffer.extend_from_slice(&[0xee, tag as u8]);
        } else {
            self.buffer.push(0xef);
            write_uint(&mut self.buffer, tag, 8);
        }
        encode_value(&mut self.buffer, value);
        Ok(self)
    }

    /// Writes a BCD number `sign * mantissa * 10^exponent`.
    ///
    /// `sign` is negative for negative numbers; the mantissa holds packed
    /// decimal digits.
    pub fn add_bcd(&mut self, sign: i8, exponent: i32, mantissa: &[u8]) -> Result<&mut Self> {
        self.before_value()?;
        let width = uint_width(mantissa.len() as u64);
        let base = if sign < 0 { 0xd0 } else { 0xc8 };
        self.buffer.push(base + (width - 1) as u8);
        write_uint(&mut self.buffer, mantissa.len() as u64, width);
        self.buffer
            .extend_from_slice(&I32::<LittleEndian>::new(exponent).to_bytes());
        self.buffer.extend_from_slice(mantissa);
        Ok(self)
    }

    /// Writes a custom value given its complete encoding.
    pub fn add_custom(&mut self, raw: &[u8]) -> Result<&mut Self> {
        let slice = Slice::new(raw);
        if !slice.is_custom() || slice.byte_size() != Ok(raw.len()) {
            return Err(Error::InvalidBuilderState("malformed custom value"));
        }
        self.before_value()?;
        self.buffer.extend_from_slice(raw);
        Ok(self)
    }

    /// Copies an existing value.
    pub fn add_slice(&mut self, slice: Slice<'_>) -> Result<&mut Self> {
        let bytes = slice.start()?;
        if slice.is_none() && self.in_container() {
            return Err(Error::InvalidBuilderState("none inside a container"));
        }
        self.before_value()?;
        self.buffer.extend_from_slice(bytes);
        Ok(self)
    }

    fn finished(&self) -> Result<()> {
        if !self.stack.is_empty() {
            return Err(Error::InvalidBuilderState("unclosed container"));
        }
        if self.buffer.is_empty() {
            return Err(Error::InvalidBuilderState("empty document"));
        }
        Ok(())
    }

    /// The finished document.
    pub fn slice(&self) -> Result<Slice<'_>> {
        self.finished()?;
        Ok(Slice::new(&self.buffer))
    }

    pub fn into_vec(self) -> Result<Vec<u8>> {
        self.finished()?;
        debug!(size = self.buffer.len(), "finished document");
        Ok(self.buffer)
    }

    pub fn into_bytes(self) -> Result<Bytes> {
        self.into_vec().map(Bytes::from)
    }

    pub fn into_shared_slice(self) -> Result<SharedSlice> {
        self.into_bytes().map(SharedSlice::new)
    }
}

fn same_sizes(members: &[usize], body_len: usize) -> bool {
    let first = members.get(1).copied().unwrap_or(body_len) - members[0];
    members
        .iter()
        .zip(members.iter().skip(1).chain(std::iter::once(&body_len)))
        .all(|(start, end)| end - start == first)
}

/// Smallest offset width whose fields can hold `size(width)`.
fn pick_width(size: impl Fn(usize) -> usize) -> usize {
    [1, 2, 4]
        .into_iter()
        .find(|width| (size(*width) as u64) < 1u64 << (8 * width))
        .unwrap_or(8)
}

fn close_equal_sized(buffer: &mut Vec<u8>, body: &[u8]) {
    let width = pick_width(|width| 1 + width + body.len());
    buffer.push(match width {
        1 => 0x02,
        2 => 0x03,
        4 => 0x04,
        _ => 0x05,
    });
    write_uint(buffer, (1 + width + body.len()) as u64, width);
    buffer.extend_from_slice(body);
}

fn close_indexed(buffer: &mut Vec<u8>, frame: &Frame, body: &[u8]) {
    let count = frame.members.len();
    let header = |width: usize| if width == 8 { 9 } else { 1 + 2 * width };
    let total = |width: usize| {
        header(width) + body.len() + count * width + if width == 8 { 8 } else { 0 }
    };
    let width = pick_width(total);
    let base = if frame.object { 0x0b } else { 0x06 };
    buffer.push(
        base + match width {
            1 => 0,
            2 => 1,
            4 => 2,
            _ => 3,
        },
    );
    write_uint(buffer, total(width) as u64, width);
    if width < 8 {
        write_uint(buffer, count as u64, width);
    }
    buffer.extend_from_slice(body);

    let mut order: Vec<usize> = (0..count).collect();
    if frame.object {
        order.sort_by(|a, b| frame.names[*a].as_bytes().cmp(frame.names[*b].as_bytes()));
    }
    for index in order {
        write_uint(buffer, (header(width) + frame.members[index]) as u64, width);
    }
    if width == 8 {
        write_uint(buffer, count as u64, 8);
    }
}

fn varint_len(mut value: u64) -> usize {
    let mut len = 1;
    while value >= 0x80 {
        value >>= 7;
        len += 1;
    }
    len
}

fn close_compact(buffer: &mut Vec<u8>, frame: &Frame, body: &[u8]) {
    let count = frame.members.len() as u64;
    let fixed = 1 + body.len() + varint_len(count);
    let mut size_len = 1;
    while varint_len((fixed + size_len) as u64) != size_len {
        size_len += 1;
    }
    buffer.push(if frame.object { 0x14 } else { 0x13 });
    write_varint_forward(buffer, (fixed + size_len) as u64);
    buffer.extend_from_slice(body);
    let mut tail = Vec::with_capacity(varint_len(count));
    write_varint_forward(&mut tail, count);
    tail.reverse();
    buffer.extend_from_slice(&tail);
}

pub(crate) fn encode_string(buffer: &mut Vec<u8>, value: &str) {
    let bytes = value.as_bytes();
    if bytes.len() <= 126 {
        buffer.push(0x40 + bytes.len() as u8);
    } else {
        buffer.push(0xbf);
        write_uint(buffer, bytes.len() as u64, 8);
    }
    buffer.extend_from_slice(bytes);
}

fn int_width(value: i64) -> usize {
    (1..8)
        .find(|width| {
            let shift = 64 - 8 * *width as u32;
            (value << shift) >> shift == value
        })
        .unwrap_or(8)
}

fn encode_value(buffer: &mut Vec<u8>, value: Value<'_>) {
    match value {
        Value::None => buffer.push(0x00),
        Value::Illegal => buffer.push(0x17),
        Value::Null => buffer.push(0x18),
        Value::Bool(false) => buffer.push(0x19),
        Value::Bool(true) => buffer.push(0x1a),
        Value::Int(v @ 0..=9) => buffer.push(0x30 + v as u8),
        Value::Int(v @ -6..=-1) => buffer.push((0x40 + v) as u8),
        Value::Int(v) => {
            let width = int_width(v);
            buffer.push(0x1f + width as u8);
            write_uint(buffer, v as u64, width);
        }
        Value::UInt(v @ 0..=9) => buffer.push(0x30 + v as u8),
        Value::UInt(v) => {
            let width = uint_width(v);
            buffer.push(0x27 + width as u8);
            write_uint(buffer, v, width);
        }
        Value::Double(v) => {
            buffer.push(0x1b);
            buffer.extend_from_slice(&F64::<LittleEndian>::new(v).to_bytes());
        }
        Value::UtcDate(v) => {
            buffer.push(0x1c);
            buffer.extend_from_slice(&I64::<LittleEndian>::new(v).to_bytes());
        }
        Value::String(v) => encode_string(buffer, v),
        Value::Binary(v) => {
            let width = uint_width(v.len() as u64);
            buffer.push(0xbf + width as u8);
            write_uint(buffer, v.len() as u64, width);
            buffer.extend_from_slice(v);
        }
        Value::External(id) => {
            buffer.push(0x1d);
            write_uint(buffer, id, 8);
        }
        Value::MinKey => buffer.push(0x1e),
        Value::MaxKey => buffer.push(0x1f),
    }
}
