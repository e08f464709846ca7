use std::iter::FusedIterator;

use crate::{Options, Result, SharedSlice, Slice, slice::Cursor};

/// Iterates the members of a shared array; every member is a handle sharing
/// the array's buffer.
#[derive(Clone, Debug)]
pub struct SharedArrayIterator {
    array: SharedSlice,
    byte_size: usize,
    cursor: Cursor,
}

/// Bounds the shared value to its own bytes.
fn view(value: &SharedSlice, byte_size: usize) -> Slice<'_> {
    Slice::new(&value.slice().as_bytes()[..byte_size])
}

impl SharedArrayIterator {
    pub fn new(array: SharedSlice) -> Result<Self> {
        if !array.is_array() {
            return Err(array.slice().mismatch("array"));
        }
        let byte_size = array.byte_size()?;
        let cursor = Cursor::new(view(&array, byte_size), true)?;
        Ok(SharedArrayIterator {
            array,
            byte_size,
            cursor,
        })
    }

    #[inline]
    pub fn valid(&self) -> bool {
        self.cursor.valid()
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.cursor.index()
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.cursor.size()
    }

    #[inline]
    pub fn is_first(&self) -> bool {
        self.index() == 0
    }

    #[inline]
    pub fn is_last(&self) -> bool {
        self.index() + 1 == self.size()
    }

    pub fn value(&self) -> Result<SharedSlice> {
        let member = self.cursor.member(view(&self.array, self.byte_size))?;
        Ok(self.array.alias(member))
    }

    pub fn forward(&mut self, count: usize) -> Result<()> {
        self.cursor
            .forward(view(&self.array, self.byte_size), count)
    }

    pub fn reset(&mut self) -> Result<()> {
        self.cursor = Cursor::new(view(&self.array, self.byte_size), true)?;
        Ok(())
    }
}

impl Iterator for SharedArrayIterator {
    type Item = Result<SharedSlice>;

    fn next(&mut self) -> Option<Self::Item> {
        let array = &self.array;
        let item = self
            .cursor
            .step(view(array, self.byte_size), |cursor, container| {
                cursor.member(container)
            })?;
        Some(item.map(|member| array.alias(member)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cursor.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SharedArrayIterator {}

impl FusedIterator for SharedArrayIterator {}

/// A key and its value, both sharing the object's buffer.
#[derive(Clone, Debug, Default)]
pub struct ObjectPair {
    pub key: SharedSlice,
    pub value: SharedSlice,
}

impl ObjectPair {
    /// The key with integer ids translated to attribute names.
    pub fn translated_key(&self, options: &Options) -> Result<SharedSlice> {
        self.key.make_key(options)
    }
}

/// Iterates the pairs of a shared object.
#[derive(Clone, Debug)]
pub struct SharedObjectIterator {
    object: SharedSlice,
    byte_size: usize,
    cursor: Cursor,
}

impl SharedObjectIterator {
    /// With `sequential`, pairs are visited in storage order instead of
    /// index-table order. Compact objects are always iterated sequentially.
    pub fn new(object: SharedSlice, sequential: bool) -> Result<Self> {
        if !object.is_object() {
            return Err(object.slice().mismatch("object"));
        }
        let byte_size = object.byte_size()?;
        let sequential = sequential || object.head() == 0x14;
        let cursor = Cursor::new(view(&object, byte_size), sequential)?;
        Ok(SharedObjectIterator {
            object,
            byte_size,
            cursor,
        })
    }

    #[inline]
    pub fn valid(&self) -> bool {
        self.cursor.valid()
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.cursor.index()
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.cursor.size()
    }

    #[inline]
    pub fn is_first(&self) -> bool {
        self.index() == 0
    }

    #[inline]
    pub fn is_last(&self) -> bool {
        self.index() + 1 == self.size()
    }

    #[inline]
    pub fn is_sequential(&self) -> bool {
        self.cursor.is_sequential()
    }

    /// The current key, untranslated.
    pub fn key(&self) -> Result<SharedSlice> {
        let key = self.cursor.member(view(&self.object, self.byte_size))?;
        Ok(self.object.alias(key))
    }

    pub fn value(&self) -> Result<SharedSlice> {
        Ok(self.current()?.value)
    }

    pub fn current(&self) -> Result<ObjectPair> {
        let pair = self.cursor.pair(view(&self.object, self.byte_size))?;
        Ok(self.pair(pair))
    }

    fn pair(&self, (key, value): (Slice<'_>, Slice<'_>)) -> ObjectPair {
        ObjectPair {
            key: self.object.alias(key),
            value: self.object.alias(value),
        }
    }

    pub fn forward(&mut self, count: usize) -> Result<()> {
        self.cursor
            .forward(view(&self.object, self.byte_size), count)
    }

    pub fn reset(&mut self) -> Result<()> {
        let sequential = self.cursor.is_sequential();
        self.cursor = Cursor::new(view(&self.object, self.byte_size), sequential)?;
        Ok(())
    }
}

impl Iterator for SharedObjectIterator {
    type Item = Result<ObjectPair>;

    fn next(&mut self) -> Option<Self::Item> {
        let object = &self.object;
        let item = self
            .cursor
            .step(view(object, self.byte_size), |cursor, container| {
                cursor.pair(container)
            })?;
        Some(item.map(|(key, value)| ObjectPair {
            key: object.alias(key),
            value: object.alias(value),
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cursor.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SharedObjectIterator {}

impl FusedIterator for SharedObjectIterator {}
