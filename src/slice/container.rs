use std::cmp::Ordering;

use crate::{
    Error, Index, Options, Result, Slice, cold_path,
    util::{read_len, read_varint_backward, read_varint_forward},
    value_type::{first_sub_offset, offset_width},
};

impl<'a> Slice<'a> {
    /// Number of members of an array or object.
    pub fn length(&self) -> Result<usize> {
        let head = self.head();
        match head {
            0x01 | 0x0a => Ok(0),
            0x02..=0x05 => {
                let bytes = self.start()?;
                let data_offset = self.find_data_offset(head)?;
                let first = Slice::new(bytes).sub(data_offset)?.byte_size()?;
                Ok((bytes.len() - data_offset) / first)
            }
            0x06..=0x08 | 0x0b..=0x0d | 0x0f..=0x11 => {
                let width = offset_width(head);
                read_len(self.data, 1 + width, width)
            }
            0x09 | 0x0e | 0x12 => {
                let size = self.byte_size()?;
                read_len(self.data, size.checked_sub(8).ok_or(Error::MalformedData)?, 8)
            }
            0x13 | 0x14 => {
                let size = self.byte_size()?;
                let (count, _) = read_varint_backward(self.data, size - 1)?;
                usize::try_from(count).map_err(|_| Error::MalformedData)
            }
            _ => Err(self.mismatch("array or object")),
        }
    }

    /// Position of the first member when the container head is `head`.
    ///
    /// Zero bytes between the header and the first member are skipped.
    pub fn find_data_offset(&self, head: u8) -> Result<usize> {
        let first = first_sub_offset(head);
        if first == 0 {
            let (_, len) = read_varint_forward(self.data, 1)?;
            return Ok(1 + len);
        }
        let non_zero = |i: usize| self.data.get(i).is_some_and(|b| *b != 0);
        if first <= 2 && non_zero(2) {
            Ok(2)
        } else if first <= 3 && non_zero(3) {
            Ok(3)
        } else if first <= 5 && non_zero(5) {
            Ok(5)
        } else {
            Ok(9)
        }
    }

    /// Byte offset, relative to this value, of the `index`-th member (for
    /// objects: of the `index`-th key).
    pub fn get_nth_offset(&self, index: usize) -> Result<usize> {
        let head = self.head();
        if !self.is_array() && !self.is_object() {
            return Err(self.mismatch("array or object"));
        }
        let length = self.length()?;
        if index >= length {
            return Err(Error::IndexOutOfBounds { index, length });
        }
        let bytes = self.start()?;
        let container = Slice::new(bytes);
        let offset = match head {
            0x02..=0x05 => {
                let data_offset = self.find_data_offset(head)?;
                let first = container.sub(data_offset)?.byte_size()?;
                data_offset + index * first
            }
            0x13 | 0x14 => {
                let per_entry = if head == 0x14 { 2 } else { 1 };
                let mut offset = self.find_data_offset(head)?;
                let steps = index.checked_mul(per_entry).ok_or(Error::MalformedData)?;
                for _ in 0..steps {
                    offset += container.sub(offset)?.byte_size()?;
                }
                offset
            }
            _ if length == 1 => self.find_data_offset(head)?,
            _ => {
                let width = offset_width(head);
                let table_end = if width == 8 {
                    bytes.len().checked_sub(8).ok_or(Error::MalformedData)?
                } else {
                    bytes.len()
                };
                let table = length
                    .checked_mul(width)
                    .and_then(|len| table_end.checked_sub(len))
                    .ok_or(Error::MalformedData)?;
                read_len(bytes, table + index * width, width)?
            }
        };
        if offset >= bytes.len() {
            cold_path();
            return Err(Error::MalformedData);
        }
        Ok(offset)
    }

    #[inline]
    fn nth(&self, index: usize) -> Result<Slice<'a>> {
        let offset = self.get_nth_offset(index)?;
        Slice::new(self.start()?).sub(offset)
    }

    /// The `index`-th member of an array.
    pub fn at(&self, index: usize) -> Result<Slice<'a>> {
        if !self.is_array() {
            return Err(self.mismatch("array"));
        }
        self.nth(index)
    }

    /// The `index`-th key of an object, untranslated.
    pub fn key_at(&self, index: usize) -> Result<Slice<'a>> {
        if !self.is_object() {
            return Err(self.mismatch("object"));
        }
        self.nth(index)
    }

    /// The `index`-th key of an object, integer keys translated to their
    /// attribute name.
    pub fn translated_key_at<'o>(&self, index: usize, options: &'o Options) -> Result<Slice<'o>>
    where
        'a: 'o,
    {
        self.key_at(index)?.make_key(options)
    }

    /// The `index`-th value of an object.
    pub fn value_at(&self, index: usize) -> Result<Slice<'a>> {
        if !self.is_object() {
            return Err(self.mismatch("object"));
        }
        let offset = self.get_nth_offset(index)?;
        let container = Slice::new(self.start()?);
        let key_size = container.sub(offset)?.byte_size()?;
        container.sub(offset + key_size)
    }

    /// Alias of [`value_at`](Slice::value_at).
    #[inline]
    pub fn get_nth_value(&self, index: usize) -> Result<Slice<'a>> {
        self.value_at(index)
    }

    /// Looks up `key` in an object.
    ///
    /// Returns `Ok(None)` if the key is absent and [`Error::TypeMismatch`] if
    /// this is not an object. Integer keys cannot be compared without an
    /// attribute translator; use [`get_with`](Slice::get_with) for those.
    pub fn get(&self, key: &str) -> Result<Option<Slice<'a>>> {
        self.get_with(key, &Options::DEFAULT)
    }

    /// Looks up `key`, translating integer keys through `options`.
    pub fn get_with(&self, key: &str, options: &Options) -> Result<Option<Slice<'a>>> {
        if !self.is_object() {
            return Err(self.mismatch("object"));
        }
        let length = self.length()?;
        if length == 0 {
            return Ok(None);
        }
        if self.is_sorted() && length >= 4 {
            self.search_binary(key, length, options)
        } else {
            self.search_linear(key, length, options)
        }
    }

    fn search_linear(&self, key: &str, length: usize, options: &Options) -> Result<Option<Slice<'a>>> {
        let mut iter = super::ObjectIterator::with_sequential(*self, self.head() == 0x14)?;
        for _ in 0..length {
            let (candidate, value) = iter.current()?;
            if key_compare(candidate, key, options)? == Ordering::Equal {
                return Ok(Some(value));
            }
            iter.advance()?;
        }
        Ok(None)
    }

    fn search_binary(&self, key: &str, length: usize, options: &Options) -> Result<Option<Slice<'a>>> {
        let mut low = 0;
        let mut high = length;
        while low < high {
            let mid = low + (high - low) / 2;
            let candidate = self.key_at(mid)?;
            match key_compare(candidate, key, options)? {
                Ordering::Equal => return self.value_at(mid).map(Some),
                Ordering::Less => low = mid + 1,
                Ordering::Greater => high = mid,
            }
        }
        Ok(None)
    }

    /// Follows `path` through nested objects.
    ///
    /// An empty path yields the value itself.
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Result<Option<Slice<'a>>> {
        let mut current = *self;
        for key in path {
            match current.get(key.as_ref())? {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    pub fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    pub fn has_path<S: AsRef<str>>(&self, path: &[S]) -> Result<bool> {
        Ok(self.get_path(path)?.is_some())
    }

    /// Positional or keyed access.
    ///
    /// A `usize` selects an array member or object value by position, a string
    /// selects an object value by key. Unlike [`get`](Slice::get), an absent
    /// key is an [`Error::KeyNotFound`].
    ///
    /// # Example
    ///
    /// ```
    /// use na_vpack::{Builder, Error, Value};
    ///
    /// let mut builder = Builder::new();
    /// builder.open_object().unwrap();
    /// builder.add_entry("foo", Value::Int(42)).unwrap();
    /// builder.close().unwrap();
    /// let slice = builder.slice().unwrap();
    ///
    /// assert_eq!(slice.lookup("foo").unwrap().get_int(), Ok(42));
    /// assert_eq!(slice.lookup(0).unwrap().get_int(), Ok(42));
    /// assert_eq!(slice.lookup("bar").unwrap_err(), Error::KeyNotFound);
    /// ```
    pub fn lookup<I: Index>(&self, index: I) -> Result<Slice<'a>> {
        index.select(*self)
    }

    /// Translates an integer key to its attribute name.
    pub fn translate<'o>(&self, options: &'o Options) -> Result<Slice<'o>>
    where
        'a: 'o,
    {
        if !self.is_small_int() && !self.is_uint() {
            return Err(self.mismatch("integer key"));
        }
        let translator = options
            .attribute_translator
            .as_deref()
            .ok_or(Error::NeedAttributeTranslator)?;
        translator
            .translate_slice(self.get_uint()?)
            .ok_or(Error::KeyNotFound)
    }

    /// Returns string keys unchanged and translates integer keys.
    pub fn make_key<'o>(&self, options: &'o Options) -> Result<Slice<'o>>
    where
        'a: 'o,
    {
        if self.is_string() {
            return Ok(*self);
        }
        if self.is_small_int() || self.is_uint() {
            return self.translate(options);
        }
        Err(self.mismatch("string"))
    }
}

/// Orders an object key against `key`, translating integer keys.
pub(crate) fn key_compare(candidate: Slice<'_>, key: &str, options: &Options) -> Result<Ordering> {
    if candidate.is_string() {
        return candidate.compare_string(key);
    }
    candidate.make_key(options)?.compare_string(key)
}

impl<'a> Slice<'a> {
    pub fn array_iter(&self) -> Result<super::ArrayIterator<'a>> {
        super::ArrayIterator::new(*self)
    }

    pub fn object_iter(&self) -> Result<super::ObjectIterator<'a>> {
        super::ObjectIterator::new(*self)
    }

    /// Iterates an object in storage order.
    pub fn object_iter_sequential(&self) -> Result<super::ObjectIterator<'a>> {
        super::ObjectIterator::with_sequential(*self, true)
    }
}
