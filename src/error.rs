//! Error types for decoding, encoding and resolving VelocyPack values.
//!
//! This module contains the [`Error`] type which represents every condition a
//! read can fail with. Errors raised by the decoder pass through the shared
//! handle layer unchanged.
//!
//! # Example
//!
//! ```
//! use na_vpack::{Builder, Error, Value, ValueType};
//!
//! let mut builder = Builder::new();
//! builder.add(Value::String("42")).unwrap();
//! let value = builder.into_shared_slice().unwrap();
//!
//! match value.get_int() {
//!     Ok(number) => println!("got {number}"),
//!     Err(Error::TypeMismatch { expected, actual }) => {
//!         assert_eq!(expected, "int");
//!         assert_eq!(actual, ValueType::String);
//!     }
//!     Err(e) => panic!("unexpected error: {e}"),
//! }
//! ```

use std::fmt::{self, Display};

use crate::ValueType;

/// Alias for a `Result` with the error type [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// This type represents all possible errors that can occur when reading,
/// building or resolving VelocyPack values.
///
/// # Variants
///
/// - [`TypeMismatch`](Error::TypeMismatch) - An accessor was used on a value of another type
/// - [`IndexOutOfBounds`](Error::IndexOutOfBounds) - A position beyond the member count
/// - [`KeyNotFound`](Error::KeyNotFound) - A required key or key id is absent
/// - [`MalformedData`](Error::MalformedData) - The input is truncated or corrupt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Message(String),

    /// An accessor was invoked on a value of an incompatible type.
    ///
    /// `expected` names what the accessor needs, `actual` is the type found.
    TypeMismatch {
        expected: &'static str,
        actual: ValueType,
    },

    /// An array or object position beyond the value's member count.
    IndexOutOfBounds { index: usize, length: usize },

    /// A key requested through [`lookup`](crate::Slice::lookup), or a key id
    /// unknown to the attribute translator.
    KeyNotFound,

    /// A byte size or offset cannot be established.
    ///
    /// This error occurs when the data is truncated, when a length field points
    /// past the end of the buffer, or when a head byte is reserved.
    MalformedData,

    /// A number does not fit into the requested numeric type.
    NumberOutOfRange,

    /// A string payload is not valid UTF-8.
    InvalidUtf8,

    /// An integer object key was translated without an attribute translator.
    NeedAttributeTranslator,

    /// An external reference could not be resolved.
    UnresolvedExternal(u64),

    /// The builder was used in a way the format cannot express.
    InvalidBuilderState(&'static str),
}

#[cfg(feature = "serde")]
impl serde::ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Message(message) => formatter.write_str(message),
            Error::TypeMismatch { expected, actual } => write!(
                formatter,
                "type mismatch: expected {expected}, got {}",
                actual.name()
            ),
            Error::IndexOutOfBounds { index, length } => {
                write!(formatter, "index out of bounds: {index} >= {length}")
            }
            Error::KeyNotFound => formatter.write_str("key not found"),
            Error::MalformedData => formatter.write_str("malformed or truncated data"),
            Error::NumberOutOfRange => formatter.write_str("number out of range"),
            Error::InvalidUtf8 => formatter.write_str("invalid UTF-8 sequence"),
            Error::NeedAttributeTranslator => {
                formatter.write_str("attribute translator required")
            }
            Error::UnresolvedExternal(id) => {
                write!(formatter, "unresolved external reference: {id:#x}")
            }
            Error::InvalidBuilderState(reason) => write!(formatter, "invalid builder state: {reason}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::str::Utf8Error> for Error {
    fn from(_: std::str::Utf8Error) -> Self {
        Error::InvalidUtf8
    }
}
