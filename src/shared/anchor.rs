use std::{fmt, sync::Arc};

use bytes::Bytes;
use tracing::trace;

use crate::util::NONE_SLICE_DATA;

/// Shared ownership of one immutable encoded buffer.
///
/// Every handle into a buffer holds a clone of its anchor; the buffer is
/// released when the last clone is dropped. The default anchor refers to the
/// static one-byte none value and is not reference counted.
#[derive(Clone, Default)]
pub struct Anchor(Option<Arc<Bytes>>);

impl Anchor {
    /// Takes ownership of `bytes`. The contents are not validated.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        trace!(len = bytes.len(), "anchoring buffer");
        Anchor(Some(Arc::new(bytes)))
    }

    /// The anchor of the static none value.
    #[inline]
    pub const fn none() -> Self {
        Anchor(None)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.0 {
            Some(bytes) => &bytes[..],
            None => &NONE_SLICE_DATA,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Returns `true` for the static none anchor.
    #[inline]
    pub fn is_static(&self) -> bool {
        self.0.is_none()
    }

    /// Number of live clones of this anchor, `0` for the static anchor.
    #[inline]
    pub fn use_count(&self) -> usize {
        self.0.as_ref().map_or(0, Arc::strong_count)
    }

    /// Returns `true` if both anchors own the same buffer.
    #[inline]
    pub fn ptr_eq(&self, other: &Anchor) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Offset of `bytes` inside this anchor's buffer, if it lies there.
    pub(crate) fn offset_of(&self, bytes: &[u8]) -> Option<usize> {
        let base = self.as_bytes().as_ptr() as usize;
        let start = (bytes.as_ptr() as usize).checked_sub(base)?;
        let end = start.checked_add(bytes.len())?;
        (end <= self.len()).then_some(start)
    }

    /// The bytes in `range` as a [`Bytes`] sharing the buffer.
    pub(crate) fn bytes(&self, range: std::ops::Range<usize>) -> Bytes {
        match &self.0 {
            Some(bytes) => bytes.slice(range),
            None => Bytes::from_static(&NONE_SLICE_DATA).slice(range),
        }
    }
}

impl fmt::Debug for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_static() {
            f.write_str("Anchor(static)")
        } else {
            write!(f, "Anchor(len: {}, uses: {})", self.len(), self.use_count())
        }
    }
}
