//! The borrowed, zero-copy decoder.
//!
//! A [`Slice`] is a view of one encoded value. It never allocates (apart from
//! the explicit `copy_*`, [`tags`](Slice::tags) and hex helpers) and never
//! reads outside the bytes it was created from: truncated or corrupt input is
//! reported as [`Error::MalformedData`].

use std::{cmp::Ordering, fmt, str};

use zerocopy::byteorder::{F64, I32, I64, LittleEndian};

use crate::{
    Error, Result, ValueType, cold_path,
    util::{ILLEGAL_SLICE_DATA, NONE_SLICE_DATA, read_len, read_uint, read_varint_forward},
    value_type::offset_width,
};

mod container;
mod iter;
mod number;

pub(crate) use iter::Cursor;
pub use iter::{ArrayIterator, ObjectIterator};
pub use number::Number;

/// A decoded BCD value.
///
/// `M` is the mantissa representation: `&[u8]` for borrowed slices,
/// [`SharedBytes`](crate::SharedBytes) for shared ones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bcd<M> {
    /// `1` or `-1`.
    pub sign: i8,
    pub exponent: i32,
    pub mantissa: M,
}

/// A read-only view of a single encoded value.
///
/// The view starts at the value's head byte and may extend past the end of
/// the value; [`byte_size`](Slice::byte_size) tells where the value ends.
#[derive(Clone, Copy)]
pub struct Slice<'a> {
    data: &'a [u8],
}

impl Default for Slice<'_> {
    #[inline]
    fn default() -> Self {
        Slice::none()
    }
}

impl<'a> Slice<'a> {
    /// Creates a view of the value starting at `data[0]`.
    ///
    /// An empty input denotes the none value.
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        if data.is_empty() {
            cold_path();
            return Slice {
                data: &NONE_SLICE_DATA,
            };
        }
        Slice { data }
    }

    /// The canonical none value.
    #[inline]
    pub const fn none() -> Slice<'static> {
        Slice {
            data: &NONE_SLICE_DATA,
        }
    }

    /// The canonical illegal value.
    #[inline]
    pub const fn illegal() -> Slice<'static> {
        Slice {
            data: &ILLEGAL_SLICE_DATA,
        }
    }

    /// All bytes this view can see, starting at the head byte.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// The sub-value starting `offset` bytes into this view.
    #[inline]
    pub(crate) fn sub(&self, offset: usize) -> Result<Slice<'a>> {
        match self.data.get(offset..) {
            Some(rest) if !rest.is_empty() => Ok(Slice { data: rest }),
            _ => {
                cold_path();
                Err(Error::MalformedData)
            }
        }
    }

    #[inline]
    pub(crate) fn mismatch(&self, expected: &'static str) -> Error {
        Error::TypeMismatch {
            expected,
            actual: self.value_type(),
        }
    }

    #[inline]
    pub fn head(&self) -> u8 {
        self.data.first().copied().unwrap_or(0x00)
    }

    #[inline]
    pub fn value_type(&self) -> ValueType {
        ValueType::of_head(self.head())
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.value_type().name()
    }

    /// The head byte formatted as `0x..`.
    pub fn hex_type(&self) -> String {
        format!("0x{:02x}", self.head())
    }

    #[inline]
    pub fn is_type(&self, value_type: ValueType) -> bool {
        self.value_type() == value_type
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        self.head() == 0x00
    }

    #[inline]
    pub fn is_illegal(&self) -> bool {
        self.is_type(ValueType::Illegal)
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.head() == 0x18
    }

    #[inline]
    pub fn is_bool(&self) -> bool {
        matches!(self.head(), 0x19 | 0x1a)
    }

    /// Alias of [`is_bool`](Slice::is_bool).
    #[inline]
    pub fn is_boolean(&self) -> bool {
        self.is_bool()
    }

    #[inline]
    pub fn is_true(&self) -> bool {
        self.head() == 0x1a
    }

    #[inline]
    pub fn is_false(&self) -> bool {
        self.head() == 0x19
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        self.is_type(ValueType::Array)
    }

    #[inline]
    pub fn is_object(&self) -> bool {
        self.is_type(ValueType::Object)
    }

    #[inline]
    pub fn is_double(&self) -> bool {
        self.head() == 0x1b
    }

    #[inline]
    pub fn is_utc_date(&self) -> bool {
        self.head() == 0x1c
    }

    #[inline]
    pub fn is_external(&self) -> bool {
        self.head() == 0x1d
    }

    #[inline]
    pub fn is_min_key(&self) -> bool {
        self.head() == 0x1e
    }

    #[inline]
    pub fn is_max_key(&self) -> bool {
        self.head() == 0x1f
    }

    #[inline]
    pub fn is_int(&self) -> bool {
        self.is_type(ValueType::Int)
    }

    #[inline]
    pub fn is_uint(&self) -> bool {
        self.is_type(ValueType::UInt)
    }

    #[inline]
    pub fn is_small_int(&self) -> bool {
        self.is_type(ValueType::SmallInt)
    }

    #[inline]
    pub fn is_string(&self) -> bool {
        self.is_type(ValueType::String)
    }

    #[inline]
    pub fn is_binary(&self) -> bool {
        self.is_type(ValueType::Binary)
    }

    #[inline]
    pub fn is_bcd(&self) -> bool {
        self.is_type(ValueType::Bcd)
    }

    #[inline]
    pub fn is_custom(&self) -> bool {
        self.is_type(ValueType::Custom)
    }

    #[inline]
    pub fn is_tagged(&self) -> bool {
        matches!(self.head(), 0xee | 0xef)
    }

    #[inline]
    pub fn is_integer(&self) -> bool {
        self.value_type().is_integer()
    }

    #[inline]
    pub fn is_number(&self) -> bool {
        self.value_type().is_number()
    }

    /// Returns `true` if the value is a number representable as `T`.
    #[inline]
    pub fn is_number_of<T: Number>(&self) -> bool {
        self.get_number::<T>().is_ok()
    }

    /// Returns `true` for objects whose index table is sorted by key.
    #[inline]
    pub fn is_sorted(&self) -> bool {
        matches!(self.head(), 0x0b..=0x0e)
    }

    #[inline]
    pub fn is_empty_array(&self) -> bool {
        self.head() == 0x01
    }

    #[inline]
    pub fn is_empty_object(&self) -> bool {
        self.head() == 0x0a
    }

    /// Returns the number of bytes the value occupies, tags included.
    ///
    /// Fails with [`Error::MalformedData`] if the size cannot be read or
    /// exceeds the bytes available to this view.
    pub fn byte_size(&self) -> Result<usize> {
        let (tags_len, inner) = self.skip_tags()?;
        let size = inner
            .untagged_byte_size()?
            .checked_add(tags_len)
            .ok_or(Error::MalformedData)?;
        if size == 0 || size > self.data.len() {
            cold_path();
            return Err(Error::MalformedData);
        }
        Ok(size)
    }

    /// Byte size of the value behind all tags.
    pub fn value_byte_size(&self) -> Result<usize> {
        self.value()?.byte_size()
    }

    fn untagged_byte_size(&self) -> Result<usize> {
        let data = self.data;
        let head = self.head();
        let fixed = |n: usize, width: usize| -> Result<usize> {
            read_len(data, 1, width)?
                .checked_add(n)
                .ok_or(Error::MalformedData)
        };
        match head {
            0x00 | 0x01 | 0x0a | 0x17..=0x1a | 0x1e | 0x1f | 0x30..=0x3f => Ok(1),
            0x02..=0x12 => read_len(data, 1, offset_width(head)),
            0x13 | 0x14 => {
                let (size, _) = read_varint_forward(data, 1)?;
                usize::try_from(size).map_err(|_| Error::MalformedData)
            }
            0x1b..=0x1d => Ok(9),
            0x20..=0x27 => Ok(1 + (head - 0x1f) as usize),
            0x28..=0x2f => Ok(1 + (head - 0x27) as usize),
            0x40..=0xbe => Ok(1 + (head - 0x40) as usize),
            0xbf => fixed(1 + 8, 8),
            0xc0..=0xc7 => {
                let width = (head - 0xbf) as usize;
                fixed(1 + width, width)
            }
            0xc8..=0xd7 => {
                let width = ((head - 0xc8) % 8) as usize + 1;
                fixed(1 + width + 4, width)
            }
            0xf0 => Ok(2),
            0xf1 => Ok(3),
            0xf2 => Ok(5),
            0xf3 => Ok(9),
            0xf4..=0xf6 => fixed(2, 1),
            0xf7..=0xf9 => fixed(3, 2),
            0xfa..=0xfc => fixed(5, 4),
            0xfd..=0xff => fixed(9, 8),
            _ => {
                cold_path();
                Err(Error::MalformedData)
            }
        }
    }

    /// The bytes of this value, exactly [`byte_size`](Slice::byte_size) long.
    pub fn start(&self) -> Result<&'a [u8]> {
        let size = self.byte_size()?;
        Ok(&self.data[..size])
    }

    /// Alias of [`start`](Slice::start).
    #[inline]
    pub fn begin(&self) -> Result<&'a [u8]> {
        self.start()
    }

    /// The empty range just past the end of this value.
    pub fn end(&self) -> Result<&'a [u8]> {
        let size = self.byte_size()?;
        Ok(&self.data[size..size])
    }

    /// The bytes of the value behind all tags.
    pub fn value_start(&self) -> Result<&'a [u8]> {
        self.value()?.start()
    }

    /// Returns the length of the tag prefix and the value following it.
    fn skip_tags(&self) -> Result<(usize, Slice<'a>)> {
        let mut offset = 0;
        loop {
            match self.data.get(offset) {
                Some(0xee) => offset += 2,
                Some(0xef) => offset += 9,
                _ => break,
            }
        }
        if offset == 0 {
            return Ok((0, *self));
        }
        Ok((offset, self.sub(offset)?))
    }

    /// The value behind all tags, or the value itself if it is not tagged.
    pub fn value(&self) -> Result<Slice<'a>> {
        Ok(self.skip_tags()?.1)
    }

    /// The outermost tag, `None` if the value is not tagged.
    pub fn first_tag(&self) -> Result<Option<u64>> {
        match self.head() {
            0xee => read_uint(self.data, 1, 1).map(Some),
            0xef => read_uint(self.data, 1, 8).map(Some),
            _ => Ok(None),
        }
    }

    /// All tags from the outermost inwards.
    pub fn tags(&self) -> Result<Vec<u64>> {
        let mut tags = Vec::new();
        let mut current = *self;
        while let Some(tag) = current.first_tag()? {
            tags.push(tag);
            current = current.sub(if current.head() == 0xee { 2 } else { 9 })?;
        }
        Ok(tags)
    }

    pub fn has_tag(&self, tag: u64) -> Result<bool> {
        let mut current = *self;
        while let Some(found) = current.first_tag()? {
            if found == tag {
                return Ok(true);
            }
            current = current.sub(if current.head() == 0xee { 2 } else { 9 })?;
        }
        Ok(false)
    }

    pub fn get_bool(&self) -> Result<bool> {
        match self.head() {
            0x19 => Ok(false),
            0x1a => Ok(true),
            _ => Err(self.mismatch("bool")),
        }
    }

    /// Alias of [`get_bool`](Slice::get_bool).
    #[inline]
    pub fn get_boolean(&self) -> Result<bool> {
        self.get_bool()
    }

    pub fn get_double(&self) -> Result<f64> {
        if !self.is_double() {
            return Err(self.mismatch("double"));
        }
        let bytes = self.fixed::<8>(1)?;
        Ok(F64::<LittleEndian>::from_bytes(bytes).get())
    }

    /// Milliseconds since the Unix epoch.
    pub fn get_utc_date(&self) -> Result<i64> {
        if !self.is_utc_date() {
            return Err(self.mismatch("utc-date"));
        }
        Ok(I64::<LittleEndian>::from_bytes(self.fixed::<8>(1)?).get())
    }

    #[inline]
    fn fixed<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        self.data
            .get(offset..offset + N)
            .and_then(|bytes| <[u8; N]>::try_from(bytes).ok())
            .ok_or(Error::MalformedData)
    }

    /// Signed integer value of an int, uint or smallint.
    pub fn get_int(&self) -> Result<i64> {
        let head = self.head();
        match head {
            0x20..=0x27 => {
                let width = (head - 0x1f) as usize;
                let raw = read_uint(self.data, 1, width)?;
                let shift = 64 - 8 * width as u32;
                Ok(((raw << shift) as i64) >> shift)
            }
            0x28..=0x2f => {
                let value = self.get_uint()?;
                i64::try_from(value).map_err(|_| Error::NumberOutOfRange)
            }
            0x30..=0x3f => self.get_small_int(),
            _ => Err(self.mismatch("int")),
        }
    }

    /// Unsigned integer value of an int, uint or smallint.
    pub fn get_uint(&self) -> Result<u64> {
        let head = self.head();
        match head {
            0x28..=0x2f => read_uint(self.data, 1, (head - 0x27) as usize),
            0x20..=0x27 | 0x30..=0x3f => {
                let value = self.get_int()?;
                u64::try_from(value).map_err(|_| Error::NumberOutOfRange)
            }
            _ => Err(self.mismatch("uint")),
        }
    }

    pub fn get_small_int(&self) -> Result<i64> {
        let head = self.head();
        match head {
            0x30..=0x39 => Ok(i64::from(head - 0x30)),
            0x3a..=0x3f => Ok(i64::from(head) - 0x40),
            0x20..=0x2f => self.get_int(),
            _ => Err(self.mismatch("smallint")),
        }
    }

    /// Numeric value converted to `T`, with range checking.
    ///
    /// # Example
    ///
    /// ```
    /// use na_vpack::{Builder, Error, Value};
    ///
    /// let mut builder = Builder::new();
    /// builder.add(Value::Int(300)).unwrap();
    /// let slice = builder.slice().unwrap();
    ///
    /// assert_eq!(slice.get_number::<u16>(), Ok(300));
    /// assert_eq!(slice.get_number::<u8>(), Err(Error::NumberOutOfRange));
    /// assert_eq!(slice.get_number::<f64>(), Ok(300.0));
    /// ```
    pub fn get_number<T: Number>(&self) -> Result<T> {
        match self.value_type() {
            ValueType::Int | ValueType::SmallInt => T::from_i64(self.get_int()?),
            ValueType::UInt => T::from_u64(self.get_uint()?),
            ValueType::Double => T::from_f64(self.get_double()?),
            _ => Err(self.mismatch("number")),
        }
    }

    /// The raw UTF-8 payload of a string.
    pub fn get_string(&self) -> Result<&'a [u8]> {
        let head = self.head();
        let (start, len) = match head {
            0x40..=0xbe => (1, (head - 0x40) as usize),
            0xbf => (9, read_len(self.data, 1, 8)?),
            _ => return Err(self.mismatch("string")),
        };
        self.payload(start, len)
    }

    #[inline]
    fn payload(&self, start: usize, len: usize) -> Result<&'a [u8]> {
        let end = start.checked_add(len).ok_or(Error::MalformedData)?;
        self.data.get(start..end).ok_or(Error::MalformedData)
    }

    pub fn get_string_length(&self) -> Result<usize> {
        Ok(self.get_string()?.len())
    }

    /// The string payload as `&str`, validated.
    pub fn string_view(&self) -> Result<&'a str> {
        Ok(str::from_utf8(self.get_string()?)?)
    }

    pub fn copy_string(&self) -> Result<String> {
        self.string_view().map(str::to_owned)
    }

    /// Compares the string payload with `value` byte by byte.
    pub fn compare_string(&self, value: &str) -> Result<Ordering> {
        Ok(self.get_string()?.cmp(value.as_bytes()))
    }

    pub fn is_equal_string(&self, value: &str) -> Result<bool> {
        Ok(self.get_string()? == value.as_bytes())
    }

    pub fn get_binary(&self) -> Result<&'a [u8]> {
        let head = self.head();
        if !(0xc0..=0xc7).contains(&head) {
            return Err(self.mismatch("binary"));
        }
        let width = (head - 0xbf) as usize;
        let len = read_len(self.data, 1, width)?;
        self.payload(1 + width, len)
    }

    pub fn get_binary_length(&self) -> Result<usize> {
        Ok(self.get_binary()?.len())
    }

    pub fn copy_binary(&self) -> Result<Vec<u8>> {
        self.get_binary().map(<[u8]>::to_vec)
    }

    pub fn get_bcd(&self) -> Result<Bcd<&'a [u8]>> {
        let head = self.head();
        let sign = match head {
            0xc8..=0xcf => 1,
            0xd0..=0xd7 => -1,
            _ => return Err(self.mismatch("bcd")),
        };
        let width = ((head - 0xc8) % 8) as usize + 1;
        let len = read_len(self.data, 1, width)?;
        let exponent = I32::<LittleEndian>::from_bytes(self.fixed::<4>(1 + width)?).get();
        Ok(Bcd {
            sign,
            exponent,
            mantissa: self.payload(1 + width + 4, len)?,
        })
    }

    /// The 8-byte reference stored in an external value.
    pub fn get_external(&self) -> Result<u64> {
        if !self.is_external() {
            return Err(self.mismatch("external"));
        }
        read_uint(self.data, 1, 8)
    }

    /// Returns `true` if both values have identical encodings.
    pub fn binary_equals(&self, other: &Slice<'_>) -> Result<bool> {
        Ok(self.start()? == other.start()?)
    }

    /// The value bytes as space-separated `0x..` pairs.
    pub fn to_hex(&self) -> Result<String> {
        let bytes = self.start()?;
        let mut out = String::with_capacity(bytes.len() * 5);
        for (i, byte) in bytes.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(&format!("0x{byte:02x}"));
        }
        Ok(out)
    }
}

impl fmt::Debug for Slice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_hex() {
            Ok(hex) => write!(f, "Slice({}, {hex})", self.type_name()),
            Err(_) => write!(f, "Slice({}, <malformed>)", self.type_name()),
        }
    }
}
