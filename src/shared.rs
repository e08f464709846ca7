//! Reference-counted handles into immutable VelocyPack buffers.
//!
//! A [`SharedSlice`] is an [`Anchor`] plus an offset. It reads through the
//! borrowed decoder and hands out results that alias the same buffer, so
//! every nested value, string payload or raw byte range keeps the buffer
//! alive on its own:
//!
//! ```
//! use na_vpack::{Builder, SharedSlice, Value};
//!
//! let mut builder = Builder::new();
//! builder.open_object().unwrap();
//! builder.add_entry("foo", Value::String("bar")).unwrap();
//! builder.close().unwrap();
//! let document = builder.into_shared_slice().unwrap();
//!
//! let foo: SharedSlice = document.get("foo").unwrap().unwrap();
//! drop(document);
//! assert_eq!(foo.string_view().unwrap(), "bar");
//! assert_eq!(foo.use_count(), 1);
//! ```

use std::{cmp::Ordering, fmt};

use bytes::Bytes;

use crate::{
    Bcd, Error, Index, Number, Options, Result, Slice, ValueType, cold_path,
};

mod anchor;
mod iter;
mod region;

pub use anchor::Anchor;
pub use iter::{ObjectPair, SharedArrayIterator, SharedObjectIterator};
pub use region::SharedBytes;

/// A handle to one value inside an anchored buffer.
///
/// Cloning is O(1) and shares the buffer. The default handle is the none
/// value backed by a static buffer. Handles do not implement `PartialEq`;
/// compare encodings with [`binary_equals`](SharedSlice::binary_equals) and
/// identity with [`shares_ownership`](SharedSlice::shares_ownership).
#[derive(Clone, Default)]
pub struct SharedSlice {
    anchor: Anchor,
    offset: usize,
}

impl SharedSlice {
    /// Takes ownership of an encoded buffer whose first byte is the value's
    /// head. The contents are not validated.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self::from_anchor(Anchor::new(bytes))
    }

    /// The value at the start of `anchor`'s buffer.
    #[inline]
    pub fn from_anchor(anchor: Anchor) -> Self {
        SharedSlice { anchor, offset: 0 }
    }

    /// The value `offset` bytes into `anchor`'s buffer.
    ///
    /// `offset` must lie within the buffer.
    #[inline]
    pub fn from_parts(anchor: Anchor, offset: usize) -> Self {
        debug_assert!(
            offset < anchor.len() || anchor.is_empty(),
            "offset {offset} outside a buffer of {} bytes",
            anchor.len()
        );
        SharedSlice { anchor, offset }
    }

    /// A handle sharing this one's buffer, `offset` bytes from its start.
    #[inline]
    pub fn alias_at(&self, offset: usize) -> SharedSlice {
        Self::from_parts(self.anchor.clone(), offset)
    }

    /// Rebinds a view read from this handle to this handle's buffer.
    ///
    /// Views outside the buffer are copied into a buffer of their own.
    pub(crate) fn alias(&self, slice: Slice<'_>) -> SharedSlice {
        match self.anchor.offset_of(slice.as_bytes()) {
            Some(offset) if offset < self.anchor.len() => self.alias_at(offset),
            _ => {
                cold_path();
                if slice.is_none() {
                    return SharedSlice::default();
                }
                let bytes = slice.start().unwrap_or(slice.as_bytes());
                SharedSlice::new(Bytes::copy_from_slice(bytes))
            }
        }
    }

    pub(crate) fn alias_bytes(&self, bytes: &[u8]) -> SharedBytes {
        match self.anchor.offset_of(bytes) {
            Some(offset) => SharedBytes::new(self.anchor.clone(), offset..offset + bytes.len()),
            None => {
                cold_path();
                let anchor = Anchor::new(Bytes::copy_from_slice(bytes));
                SharedBytes::new(anchor, 0..bytes.len())
            }
        }
    }

    /// The borrowed view of this value.
    #[inline]
    pub fn slice(&self) -> Slice<'_> {
        Slice::new(&self.anchor.as_bytes()[self.offset..])
    }

    #[inline]
    pub fn anchor(&self) -> &Anchor {
        &self.anchor
    }

    /// Position of the value inside the anchored buffer.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of handles sharing the buffer; `0` for the static none value.
    #[inline]
    pub fn use_count(&self) -> usize {
        self.anchor.use_count()
    }

    /// Returns `true` if both handles keep the same buffer alive, regardless
    /// of the values they point at.
    #[inline]
    pub fn shares_ownership(&self, other: &SharedSlice) -> bool {
        self.anchor.ptr_eq(&other.anchor)
    }

    /// Moves the value out, leaving the none value behind.
    #[inline]
    pub fn take(&mut self) -> SharedSlice {
        std::mem::take(self)
    }

    /// The value bytes as a [`Bytes`] sharing the buffer.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let size = self.byte_size()?;
        Ok(self.anchor.bytes(self.offset..self.offset + size))
    }

    #[inline]
    pub fn head(&self) -> u8 {
        self.slice().head()
    }

    #[inline]
    pub fn value_type(&self) -> ValueType {
        self.slice().value_type()
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.slice().type_name()
    }

    pub fn hex_type(&self) -> String {
        self.slice().hex_type()
    }

    #[inline]
    pub fn is_type(&self, value_type: ValueType) -> bool {
        self.slice().is_type(value_type)
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        self.slice().is_none()
    }

    #[inline]
    pub fn is_illegal(&self) -> bool {
        self.slice().is_illegal()
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.slice().is_null()
    }

    #[inline]
    pub fn is_bool(&self) -> bool {
        self.slice().is_bool()
    }

    #[inline]
    pub fn is_boolean(&self) -> bool {
        self.slice().is_boolean()
    }

    #[inline]
    pub fn is_true(&self) -> bool {
        self.slice().is_true()
    }

    #[inline]
    pub fn is_false(&self) -> bool {
        self.slice().is_false()
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        self.slice().is_array()
    }

    #[inline]
    pub fn is_object(&self) -> bool {
        self.slice().is_object()
    }

    #[inline]
    pub fn is_double(&self) -> bool {
        self.slice().is_double()
    }

    #[inline]
    pub fn is_utc_date(&self) -> bool {
        self.slice().is_utc_date()
    }

    #[inline]
    pub fn is_external(&self) -> bool {
        self.slice().is_external()
    }

    #[inline]
    pub fn is_min_key(&self) -> bool {
        self.slice().is_min_key()
    }

    #[inline]
    pub fn is_max_key(&self) -> bool {
        self.slice().is_max_key()
    }

    #[inline]
    pub fn is_int(&self) -> bool {
        self.slice().is_int()
    }

    #[inline]
    pub fn is_uint(&self) -> bool {
        self.slice().is_uint()
    }

    #[inline]
    pub fn is_small_int(&self) -> bool {
        self.slice().is_small_int()
    }

    #[inline]
    pub fn is_string(&self) -> bool {
        self.slice().is_string()
    }

    #[inline]
    pub fn is_binary(&self) -> bool {
        self.slice().is_binary()
    }

    #[inline]
    pub fn is_bcd(&self) -> bool {
        self.slice().is_bcd()
    }

    #[inline]
    pub fn is_custom(&self) -> bool {
        self.slice().is_custom()
    }

    #[inline]
    pub fn is_tagged(&self) -> bool {
        self.slice().is_tagged()
    }

    #[inline]
    pub fn is_integer(&self) -> bool {
        self.slice().is_integer()
    }

    #[inline]
    pub fn is_number(&self) -> bool {
        self.slice().is_number()
    }

    #[inline]
    pub fn is_number_of<T: Number>(&self) -> bool {
        self.slice().is_number_of::<T>()
    }

    #[inline]
    pub fn is_sorted(&self) -> bool {
        self.slice().is_sorted()
    }

    #[inline]
    pub fn is_empty_array(&self) -> bool {
        self.slice().is_empty_array()
    }

    #[inline]
    pub fn is_empty_object(&self) -> bool {
        self.slice().is_empty_object()
    }

    pub fn byte_size(&self) -> Result<usize> {
        self.slice().byte_size()
    }

    pub fn value_byte_size(&self) -> Result<usize> {
        self.slice().value_byte_size()
    }

    /// The bytes of this value.
    pub fn start(&self) -> Result<SharedBytes> {
        Ok(self.alias_bytes(self.slice().start()?))
    }

    pub fn begin(&self) -> Result<SharedBytes> {
        self.start()
    }

    /// The empty range just past the end of this value.
    pub fn end(&self) -> Result<SharedBytes> {
        Ok(self.alias_bytes(self.slice().end()?))
    }

    pub fn value_start(&self) -> Result<SharedBytes> {
        Ok(self.alias_bytes(self.slice().value_start()?))
    }

    /// The value behind all tags.
    pub fn value(&self) -> Result<SharedSlice> {
        Ok(self.alias(self.slice().value()?))
    }

    pub fn first_tag(&self) -> Result<Option<u64>> {
        self.slice().first_tag()
    }

    pub fn tags(&self) -> Result<Vec<u64>> {
        self.slice().tags()
    }

    pub fn has_tag(&self, tag: u64) -> Result<bool> {
        self.slice().has_tag(tag)
    }

    pub fn get_bool(&self) -> Result<bool> {
        self.slice().get_bool()
    }

    pub fn get_boolean(&self) -> Result<bool> {
        self.slice().get_boolean()
    }

    pub fn get_double(&self) -> Result<f64> {
        self.slice().get_double()
    }

    pub fn get_utc_date(&self) -> Result<i64> {
        self.slice().get_utc_date()
    }

    pub fn get_int(&self) -> Result<i64> {
        self.slice().get_int()
    }

    pub fn get_uint(&self) -> Result<u64> {
        self.slice().get_uint()
    }

    pub fn get_small_int(&self) -> Result<i64> {
        self.slice().get_small_int()
    }

    pub fn get_number<T: Number>(&self) -> Result<T> {
        self.slice().get_number()
    }

    /// Same as [`get_number`](SharedSlice::get_number).
    #[inline]
    pub fn get_numeric_value<T: Number>(&self) -> Result<T> {
        self.get_number()
    }

    /// The string payload, sharing the buffer.
    pub fn get_string(&self) -> Result<SharedBytes> {
        Ok(self.alias_bytes(self.slice().get_string()?))
    }

    pub fn get_string_length(&self) -> Result<usize> {
        self.slice().get_string_length()
    }

    pub fn string_view(&self) -> Result<&str> {
        self.slice().string_view()
    }

    pub fn copy_string(&self) -> Result<String> {
        self.slice().copy_string()
    }

    pub fn compare_string(&self, value: &str) -> Result<Ordering> {
        self.slice().compare_string(value)
    }

    pub fn is_equal_string(&self, value: &str) -> Result<bool> {
        self.slice().is_equal_string(value)
    }

    /// The binary payload, sharing the buffer.
    pub fn get_binary(&self) -> Result<SharedBytes> {
        Ok(self.alias_bytes(self.slice().get_binary()?))
    }

    pub fn get_binary_length(&self) -> Result<usize> {
        self.slice().get_binary_length()
    }

    pub fn copy_binary(&self) -> Result<Vec<u8>> {
        self.slice().copy_binary()
    }

    pub fn get_bcd(&self) -> Result<Bcd<SharedBytes>> {
        let Bcd {
            sign,
            exponent,
            mantissa,
        } = self.slice().get_bcd()?;
        Ok(Bcd {
            sign,
            exponent,
            mantissa: self.alias_bytes(mantissa),
        })
    }

    pub fn get_external(&self) -> Result<u64> {
        self.slice().get_external()
    }

    /// Follows one external reference; other values are returned unchanged.
    ///
    /// The result is anchored to the resolved value's own buffer.
    pub fn resolve_external(&self, options: &Options) -> Result<SharedSlice> {
        if !self.is_external() {
            return Ok(self.clone());
        }
        options.resolve(self.get_external()?)
    }

    /// Follows external references until a non-external value is reached.
    pub fn resolve_externals(&self, options: &Options) -> Result<SharedSlice> {
        let mut current = self.clone();
        while current.is_external() {
            current = current.resolve_external(options)?;
        }
        Ok(current)
    }

    pub fn length(&self) -> Result<usize> {
        self.slice().length()
    }

    pub fn find_data_offset(&self, head: u8) -> Result<usize> {
        self.slice().find_data_offset(head)
    }

    pub fn get_nth_offset(&self, index: usize) -> Result<usize> {
        self.slice().get_nth_offset(index)
    }

    pub fn at(&self, index: usize) -> Result<SharedSlice> {
        Ok(self.alias(self.slice().at(index)?))
    }

    pub fn key_at(&self, index: usize) -> Result<SharedSlice> {
        Ok(self.alias(self.slice().key_at(index)?))
    }

    /// The `index`-th key; integer keys are translated and anchored to the
    /// attribute translator.
    pub fn translated_key_at(&self, index: usize, options: &Options) -> Result<SharedSlice> {
        self.key_at(index)?.make_key(options)
    }

    pub fn value_at(&self, index: usize) -> Result<SharedSlice> {
        Ok(self.alias(self.slice().value_at(index)?))
    }

    pub fn get_nth_value(&self, index: usize) -> Result<SharedSlice> {
        self.value_at(index)
    }

    /// Looks up `key` in an object. `Ok(None)` if the key is absent.
    pub fn get(&self, key: &str) -> Result<Option<SharedSlice>> {
        Ok(self.slice().get(key)?.map(|value| self.alias(value)))
    }

    pub fn get_with(&self, key: &str, options: &Options) -> Result<Option<SharedSlice>> {
        Ok(self
            .slice()
            .get_with(key, options)?
            .map(|value| self.alias(value)))
    }

    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Result<Option<SharedSlice>> {
        Ok(self.slice().get_path(path)?.map(|value| self.alias(value)))
    }

    /// Follows `path` through nested objects, resolving external references
    /// before the first step and after each one.
    ///
    /// Values reached through an external are anchored to the resolved
    /// value's own buffer.
    pub fn get_path_with<S: AsRef<str>>(
        &self,
        path: &[S],
        options: &Options,
    ) -> Result<Option<SharedSlice>> {
        let mut current = self.resolve_externals(options)?;
        for key in path {
            match current.get_with(key.as_ref(), options)? {
                Some(next) => current = next.resolve_externals(options)?,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    pub fn has_key(&self, key: &str) -> Result<bool> {
        self.slice().has_key(key)
    }

    pub fn has_path<S: AsRef<str>>(&self, path: &[S]) -> Result<bool> {
        self.slice().has_path(path)
    }

    /// Positional or keyed access; see [`Slice::lookup`].
    pub fn lookup<I: Index>(&self, index: I) -> Result<SharedSlice> {
        Ok(self.alias(self.slice().lookup(index)?))
    }

    /// Translates an integer key to its attribute name, anchored to the
    /// attribute translator.
    pub fn translate(&self, options: &Options) -> Result<SharedSlice> {
        if !self.is_small_int() && !self.is_uint() {
            return Err(self.slice().mismatch("integer key"));
        }
        let translator = options
            .attribute_translator
            .as_deref()
            .ok_or(Error::NeedAttributeTranslator)?;
        translator
            .translate(self.get_uint()?)
            .ok_or(Error::KeyNotFound)
    }

    /// Returns string keys unchanged and translates integer keys.
    pub fn make_key(&self, options: &Options) -> Result<SharedSlice> {
        if self.is_string() {
            return Ok(self.clone());
        }
        if self.is_small_int() || self.is_uint() {
            return self.translate(options);
        }
        Err(self.slice().mismatch("string"))
    }

    pub fn array_iter(&self) -> Result<SharedArrayIterator> {
        SharedArrayIterator::new(self.clone())
    }

    pub fn object_iter(&self) -> Result<SharedObjectIterator> {
        SharedObjectIterator::new(self.clone(), false)
    }

    /// Iterates an object in storage order.
    pub fn object_iter_sequential(&self) -> Result<SharedObjectIterator> {
        SharedObjectIterator::new(self.clone(), true)
    }

    pub fn binary_equals(&self, other: &SharedSlice) -> Result<bool> {
        self.slice().binary_equals(&other.slice())
    }

    pub fn to_hex(&self) -> Result<String> {
        self.slice().to_hex()
    }
}

impl From<Bytes> for SharedSlice {
    fn from(bytes: Bytes) -> Self {
        SharedSlice::new(bytes)
    }
}

impl From<Anchor> for SharedSlice {
    fn from(anchor: Anchor) -> Self {
        SharedSlice::from_anchor(anchor)
    }
}

impl fmt::Debug for SharedSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSlice")
            .field("offset", &self.offset)
            .field("uses", &self.use_count())
            .field("value", &self.slice())
            .finish()
    }
}
