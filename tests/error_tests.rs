//! Tests for the Error type

use na_vpack::{Error, ValueType};

#[test]
fn test_error_display_type_mismatch() {
    let error = Error::TypeMismatch {
        expected: "string",
        actual: ValueType::UInt,
    };
    assert_eq!(format!("{}", error), "type mismatch: expected string, got uint");
}

#[test]
fn test_error_display_index_out_of_bounds() {
    let error = Error::IndexOutOfBounds {
        index: 3,
        length: 2,
    };
    assert_eq!(format!("{}", error), "index out of bounds: 3 >= 2");
}

#[test]
fn test_error_display_simple_variants() {
    assert_eq!(Error::KeyNotFound.to_string(), "key not found");
    assert_eq!(Error::MalformedData.to_string(), "malformed or truncated data");
    assert_eq!(Error::NumberOutOfRange.to_string(), "number out of range");
    assert_eq!(Error::InvalidUtf8.to_string(), "invalid UTF-8 sequence");
    assert_eq!(
        Error::NeedAttributeTranslator.to_string(),
        "attribute translator required"
    );
    assert_eq!(
        Error::UnresolvedExternal(0x2a).to_string(),
        "unresolved external reference: 0x2a"
    );
    assert_eq!(
        Error::InvalidBuilderState("unclosed container").to_string(),
        "invalid builder state: unclosed container"
    );
    assert_eq!(Error::Message("custom".to_owned()).to_string(), "custom");
}

#[test]
fn test_error_is_std_error() {
    fn takes_error(_: &dyn std::error::Error) {}
    takes_error(&Error::KeyNotFound);
    let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(Error::MalformedData);
    assert!(boxed.to_string().contains("malformed"));
}

#[test]
fn test_error_from_utf8() {
    let bytes = [0xffu8];
    let error: Error = std::str::from_utf8(&bytes).unwrap_err().into();
    assert_eq!(error, Error::InvalidUtf8);
}

#[test]
fn test_error_debug() {
    let debug_str = format!("{:?}", Error::KeyNotFound);
    assert!(debug_str.contains("KeyNotFound"));
}

#[cfg(feature = "serde")]
#[test]
fn test_error_serde_custom() {
    use serde::ser::Error as _;
    assert_eq!(Error::custom("boom"), Error::Message("boom".to_owned()));
}
