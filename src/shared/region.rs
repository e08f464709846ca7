use std::{fmt, ops::{Deref, Range}};

use bytes::Bytes;

use crate::Anchor;

/// A byte range inside an anchored buffer, such as a string payload.
///
/// Holding a `SharedBytes` keeps the whole buffer alive.
#[derive(Clone, Default)]
pub struct SharedBytes {
    anchor: Anchor,
    range: Range<usize>,
}

impl SharedBytes {
    pub(crate) fn new(anchor: Anchor, range: Range<usize>) -> Self {
        debug_assert!(range.start <= range.end && range.end <= anchor.len());
        SharedBytes { anchor, range }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.anchor.as_bytes()[self.range.clone()]
    }

    #[inline]
    pub fn anchor(&self) -> &Anchor {
        &self.anchor
    }

    /// Start of the range within the anchored buffer.
    #[inline]
    pub fn offset(&self) -> usize {
        self.range.start
    }

    #[inline]
    pub fn use_count(&self) -> usize {
        self.anchor.use_count()
    }

    /// Converts into a [`Bytes`] that shares the anchored buffer.
    pub fn to_bytes(&self) -> Bytes {
        self.anchor.bytes(self.range.clone())
    }
}

impl Deref for SharedBytes {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for SharedBytes {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for SharedBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBytes")
            .field("range", &self.range)
            .field("bytes", &self.as_bytes())
            .finish()
    }
}
