//! Shared-ownership, zero-copy handles over VelocyPack documents.
//!
//! [`Slice`] is the borrowed decoder: a `Copy` view of one encoded value.
//! [`SharedSlice`] pairs the same view with shared ownership of the buffer,
//! so that every value read from it, down to a single string payload, stays
//! valid for as long as it is held.
//!
//! ```
//! use na_vpack::{Builder, Value};
//!
//! let mut builder = Builder::new();
//! builder.open_object().unwrap();
//! builder.add_entry("foo", Value::Int(42)).unwrap();
//! builder.close().unwrap();
//!
//! let document = builder.into_shared_slice().unwrap();
//! let foo = document.get("foo").unwrap().unwrap();
//! assert_eq!(foo.get_int(), Ok(42));
//! assert!(foo.shares_ownership(&document));
//! assert_eq!(document.use_count(), 2);
//! ```

mod builder;
mod error;
mod hash;
mod index;
mod options;
#[cfg(feature = "serde")]
mod render;
#[cfg(feature = "serde")]
mod ser;
mod shared;
mod slice;
mod util;
mod value_type;

pub use builder::*;
pub use error::*;
pub use hash::*;
pub use index::*;
pub use options::*;
#[cfg(feature = "serde")]
pub use render::*;
#[cfg(feature = "serde")]
pub use ser::*;
pub use shared::*;
pub use slice::*;
pub(crate) use util::cold_path;
pub use value_type::*;
