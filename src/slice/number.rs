use crate::{Error, Result};

mod private {
    pub trait Sealed {}
}

/// Numeric types a value can be extracted as with
/// [`get_number`](crate::Slice::get_number).
pub trait Number: private::Sealed + Sized {
    #[doc(hidden)]
    fn from_i64(value: i64) -> Result<Self>;
    #[doc(hidden)]
    fn from_u64(value: u64) -> Result<Self>;
    #[doc(hidden)]
    fn from_f64(value: f64) -> Result<Self>;
}

macro_rules! impl_integer {
    ($($t:ty),* $(,)?) => {
        $(
            impl private::Sealed for $t {}

            impl Number for $t {
                #[inline]
                fn from_i64(value: i64) -> Result<Self> {
                    <$t>::try_from(value).map_err(|_| Error::NumberOutOfRange)
                }

                #[inline]
                fn from_u64(value: u64) -> Result<Self> {
                    <$t>::try_from(value).map_err(|_| Error::NumberOutOfRange)
                }

                #[inline]
                fn from_f64(value: f64) -> Result<Self> {
                    // `MAX as f64` rounds up to 2^63 / 2^64 for the 64-bit types
                    if value.is_nan()
                        || value < <$t>::MIN as f64
                        || value >= <$t>::MAX as f64 + 1.0
                    {
                        return Err(Error::NumberOutOfRange);
                    }
                    Ok(value as $t)
                }
            }
        )*
    };
}

impl_integer!(i8, i16, i32, i64, u8, u16, u32, u64);

impl private::Sealed for f64 {}

impl Number for f64 {
    #[inline]
    fn from_i64(value: i64) -> Result<Self> {
        Ok(value as f64)
    }

    #[inline]
    fn from_u64(value: u64) -> Result<Self> {
        Ok(value as f64)
    }

    #[inline]
    fn from_f64(value: f64) -> Result<Self> {
        Ok(value)
    }
}
