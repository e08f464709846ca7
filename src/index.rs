use crate::{Error, Result, Slice};

mod private {
    pub trait Sealed {}
    impl Sealed for usize {}
    impl Sealed for str {}
    impl Sealed for String {}
    impl<T> Sealed for &T where T: ?Sized + Sealed {}
}

/// A position or key usable with [`Slice::lookup`](crate::Slice::lookup) and
/// [`SharedSlice::lookup`](crate::SharedSlice::lookup).
///
/// Implemented for `usize` (member position) and for string types (object
/// key). This trait is sealed.
pub trait Index: private::Sealed {
    #[doc(hidden)]
    fn select<'a>(&self, container: Slice<'a>) -> Result<Slice<'a>>;
}

impl Index for usize {
    #[inline]
    fn select<'a>(&self, container: Slice<'a>) -> Result<Slice<'a>> {
        // a position in an object selects the value
        if container.is_object() {
            container.value_at(*self)
        } else {
            container.at(*self)
        }
    }
}

impl Index for str {
    #[inline]
    fn select<'a>(&self, container: Slice<'a>) -> Result<Slice<'a>> {
        container.get(self)?.ok_or(Error::KeyNotFound)
    }
}

impl Index for String {
    #[inline]
    fn select<'a>(&self, container: Slice<'a>) -> Result<Slice<'a>> {
        self.as_str().select(container)
    }
}

impl<T: ?Sized + Index> Index for &T {
    #[inline]
    fn select<'a>(&self, container: Slice<'a>) -> Result<Slice<'a>> {
        (**self).select(container)
    }
}
