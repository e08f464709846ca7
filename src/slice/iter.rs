use std::iter::FusedIterator;

use crate::{Error, Result, Slice};

/// Iteration state independent of the borrowed container, so that the
/// borrowed and the shared iterators walk members the same way.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Cursor {
    index: usize,
    size: usize,
    /// Offset of the current member, used by sequential iteration.
    position: usize,
    sequential: bool,
}

impl Cursor {
    /// `container` must be bounded to the container's own bytes.
    pub(crate) fn new(container: Slice<'_>, sequential: bool) -> Result<Self> {
        let size = container.length()?;
        let position = if size > 0 && sequential {
            container.find_data_offset(container.head())?
        } else {
            0
        };
        Ok(Cursor {
            index: 0,
            size,
            position,
            sequential,
        })
    }

    #[inline]
    pub(crate) fn valid(&self) -> bool {
        self.index < self.size
    }

    #[inline]
    pub(crate) fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub(crate) fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub(crate) fn is_sequential(&self) -> bool {
        self.sequential
    }

    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.size - self.index
    }

    fn offset(&self, container: Slice<'_>) -> Result<usize> {
        if !self.valid() {
            return Err(Error::IndexOutOfBounds {
                index: self.index,
                length: self.size,
            });
        }
        if self.sequential {
            Ok(self.position)
        } else {
            container.get_nth_offset(self.index)
        }
    }

    /// The current array member or object key.
    pub(crate) fn member<'a>(&self, container: Slice<'a>) -> Result<Slice<'a>> {
        container.sub(self.offset(container)?)
    }

    pub(crate) fn pair<'a>(&self, container: Slice<'a>) -> Result<(Slice<'a>, Slice<'a>)> {
        let offset = self.offset(container)?;
        let key = container.sub(offset)?;
        let value = container.sub(offset + key.byte_size()?)?;
        Ok((key, value))
    }

    pub(crate) fn advance(&mut self, container: Slice<'_>) -> Result<()> {
        if self.sequential {
            let member = self.member(container)?;
            let mut step = member.byte_size()?;
            if container.is_object() {
                step += container.sub(self.position + step)?.byte_size()?;
            }
            self.position += step;
        }
        self.index += 1;
        Ok(())
    }

    /// Moves past `count` members, stopping at the end.
    pub(crate) fn forward(&mut self, container: Slice<'_>, count: usize) -> Result<()> {
        if !self.sequential {
            self.index = self.index.saturating_add(count).min(self.size);
            return Ok(());
        }
        for _ in 0..count {
            if !self.valid() {
                break;
            }
            self.advance(container)?;
        }
        Ok(())
    }

    /// Yields the current item and advances; a malformed member ends the
    /// iteration.
    pub(crate) fn step<'a, T>(
        &mut self,
        container: Slice<'a>,
        read: impl FnOnce(&Self, Slice<'a>) -> Result<T>,
    ) -> Option<Result<T>> {
        if !self.valid() {
            return None;
        }
        let item = read(self, container).and_then(|item| {
            self.advance(container)?;
            Ok(item)
        });
        if item.is_err() {
            self.index = self.size;
        }
        Some(item)
    }
}

/// Walks the members of an array in storage order.
#[derive(Clone, Debug)]
pub struct ArrayIterator<'a> {
    array: Slice<'a>,
    cursor: Cursor,
}

impl<'a> ArrayIterator<'a> {
    pub fn new(array: Slice<'a>) -> Result<Self> {
        if !array.is_array() {
            return Err(array.mismatch("array"));
        }
        let array = Slice::new(array.start()?);
        Ok(ArrayIterator {
            array,
            cursor: Cursor::new(array, true)?,
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

    /// The member at the current position.
    pub fn value(&self) -> Result<Slice<'a>> {
        self.cursor.member(self.array)
    }

    /// Skips `count` members, stopping at the end.
    pub fn forward(&mut self, count: usize) -> Result<()> {
        self.cursor.forward(self.array, count)
    }

    /// Rewinds to the first member.
    pub fn reset(&mut self) -> Result<()> {
        self.cursor = Cursor::new(self.array, true)?;
        Ok(())
    }
}

impl<'a> Iterator for ArrayIterator<'a> {
    type Item = Result<Slice<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.step(self.array, Cursor::member)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cursor.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ArrayIterator<'_> {}

impl FusedIterator for ArrayIterator<'_> {}

/// Walks the key/value pairs of an object.
///
/// By default pairs are visited in index-table order (sorted by key for sorted
/// objects). Sequential iteration visits them in storage order without
/// touching the index table; compact objects are always iterated sequentially.
#[derive(Clone, Debug)]
pub struct ObjectIterator<'a> {
    object: Slice<'a>,
    cursor: Cursor,
}

impl<'a> ObjectIterator<'a> {
    pub fn new(object: Slice<'a>) -> Result<Self> {
        Self::with_sequential(object, false)
    }

    pub fn with_sequential(object: Slice<'a>, sequential: bool) -> Result<Self> {
        if !object.is_object() {
            return Err(object.mismatch("object"));
        }
        let object = Slice::new(object.start()?);
        let sequential = sequential || object.head() == 0x14;
        Ok(ObjectIterator {
            object,
            cursor: Cursor::new(object, sequential)?,
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
    pub fn key(&self) -> Result<Slice<'a>> {
        self.cursor.member(self.object)
    }

    pub fn value(&self) -> Result<Slice<'a>> {
        Ok(self.current()?.1)
    }

    /// The current key and value.
    pub fn current(&self) -> Result<(Slice<'a>, Slice<'a>)> {
        self.cursor.pair(self.object)
    }

    /// Moves to the next pair.
    pub fn advance(&mut self) -> Result<()> {
        self.cursor.advance(self.object)
    }

    pub fn forward(&mut self, count: usize) -> Result<()> {
        self.cursor.forward(self.object, count)
    }

    pub fn reset(&mut self) -> Result<()> {
        self.cursor = Cursor::new(self.object, self.cursor.is_sequential())?;
        Ok(())
    }
}

impl<'a> Iterator for ObjectIterator<'a> {
    type Item = Result<(Slice<'a>, Slice<'a>)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.step(self.object, Cursor::pair)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cursor.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ObjectIterator<'_> {}

impl FusedIterator for ObjectIterator<'_> {}
