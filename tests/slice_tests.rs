//! Decoder tests against hand-encoded buffers.

use std::cmp::Ordering;

use na_vpack::{Error, Slice, ValueType};

#[test]
fn test_empty_input_is_none() {
    let slice = Slice::new(&[]);
    assert!(slice.is_none());
    assert_eq!(slice.byte_size(), Ok(1));
    assert!(Slice::default().is_none());
    assert!(Slice::illegal().is_illegal());
}

#[test]
fn test_scalar_heads() {
    assert!(Slice::new(&[0x18]).is_null());
    assert_eq!(Slice::new(&[0x19]).get_bool(), Ok(false));
    assert_eq!(Slice::new(&[0x1a]).get_bool(), Ok(true));
    assert!(Slice::new(&[0x1e]).is_min_key());
    assert!(Slice::new(&[0x1f]).is_max_key());
    assert_eq!(Slice::new(&[0x17]).value_type(), ValueType::Illegal);
}

#[test]
fn test_integers() {
    assert_eq!(Slice::new(&[0x30]).get_int(), Ok(0));
    assert_eq!(Slice::new(&[0x39]).get_small_int(), Ok(9));
    assert_eq!(Slice::new(&[0x3a]).get_int(), Ok(-6));
    assert_eq!(Slice::new(&[0x3f]).get_int(), Ok(-1));
    assert_eq!(Slice::new(&[0x20, 0xff]).get_int(), Ok(-1));
    assert_eq!(Slice::new(&[0x21, 0x00, 0x80]).get_int(), Ok(-32768));
    assert_eq!(Slice::new(&[0x28, 0xff]).get_uint(), Ok(255));
    assert_eq!(
        Slice::new(&[0x2f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]).get_int(),
        Err(Error::NumberOutOfRange)
    );
    assert_eq!(Slice::new(&[0x3f]).get_uint(), Err(Error::NumberOutOfRange));
    assert_eq!(Slice::new(&[0x28, 0x2a]).get_number::<u8>(), Ok(42));
    assert_eq!(Slice::new(&[0x28, 0xff]).get_number::<i8>(), Err(Error::NumberOutOfRange));
}

#[test]
fn test_double_and_date() {
    let mut data = vec![0x1b];
    data.extend_from_slice(&1.5f64.to_le_bytes());
    assert_eq!(Slice::new(&data).get_double(), Ok(1.5));
    assert_eq!(Slice::new(&data).get_number::<i32>(), Ok(1));
    assert_eq!(Slice::new(&data).byte_size(), Ok(9));

    let mut data = vec![0x1c];
    data.extend_from_slice(&(-5i64).to_le_bytes());
    assert_eq!(Slice::new(&data).get_utc_date(), Ok(-5));
    assert_eq!(Slice::new(&data[..4]).get_utc_date(), Err(Error::MalformedData));
}

#[test]
fn test_strings() {
    let short = [0x43, b'f', b'o', b'o'];
    let slice = Slice::new(&short);
    assert_eq!(slice.get_string(), Ok(&b"foo"[..]));
    assert_eq!(slice.string_view(), Ok("foo"));
    assert_eq!(slice.get_string_length(), Ok(3));
    assert_eq!(slice.compare_string("fop"), Ok(Ordering::Less));
    assert_eq!(slice.is_equal_string("foo"), Ok(true));
    assert_eq!(slice.copy_string(), Ok("foo".to_owned()));

    let mut long = vec![0xbf];
    long.extend_from_slice(&3u64.to_le_bytes());
    long.extend_from_slice(b"bar");
    assert_eq!(Slice::new(&long).string_view(), Ok("bar"));
    assert_eq!(Slice::new(&long).byte_size(), Ok(12));

    assert_eq!(Slice::new(&[0x42, 0xff, 0xfe]).string_view(), Err(Error::InvalidUtf8));
    assert_eq!(Slice::new(&[0x43, b'a']).get_string(), Err(Error::MalformedData));
}

#[test]
fn test_binary_bcd_external_custom() {
    let binary = [0xc0, 0x02, 0xaa, 0xbb];
    assert_eq!(Slice::new(&binary).get_binary(), Ok(&[0xaa, 0xbb][..]));
    assert_eq!(Slice::new(&binary).copy_binary(), Ok(vec![0xaa, 0xbb]));

    let bcd = [0xd0, 0x01, 0xfe, 0xff, 0xff, 0xff, 0x12];
    let decoded = Slice::new(&bcd).get_bcd().unwrap();
    assert_eq!(decoded.sign, -1);
    assert_eq!(decoded.exponent, -2);
    assert_eq!(decoded.mantissa, &[0x12][..]);

    let mut external = vec![0x1d];
    external.extend_from_slice(&9u64.to_le_bytes());
    assert_eq!(Slice::new(&external).get_external(), Ok(9));

    assert_eq!(Slice::new(&[0xf1, 0x01, 0x02]).byte_size(), Ok(3));
    assert!(Slice::new(&[0xf1, 0x01, 0x02]).is_custom());
}

#[test]
fn test_tags() {
    // tag 5, then tag 0x0100, then smallint 7
    let data = [0xee, 0x05, 0xef, 0x00, 0x01, 0, 0, 0, 0, 0, 0, 0x37];
    let slice = Slice::new(&data);
    assert!(slice.is_tagged());
    assert_eq!(slice.first_tag(), Ok(Some(5)));
    assert_eq!(slice.tags(), Ok(vec![5, 0x100]));
    assert_eq!(slice.has_tag(0x100), Ok(true));
    assert_eq!(slice.has_tag(6), Ok(false));
    assert_eq!(slice.byte_size(), Ok(12));
    assert_eq!(slice.value_byte_size(), Ok(1));
    assert_eq!(slice.value().unwrap().get_int(), Ok(7));
    assert_eq!(slice.value_start(), Ok(&[0x37][..]));
    assert_eq!(Slice::new(&[0x37]).first_tag(), Ok(None));
}

#[test]
fn test_equal_sized_array() {
    let data = [0x02, 0x05, 0x31, 0x32, 0x33];
    let array = Slice::new(&data);
    assert_eq!(array.length(), Ok(3));
    assert_eq!(array.at(2).unwrap().get_int(), Ok(3));
    assert_eq!(array.get_nth_offset(1), Ok(3));
    assert_eq!(
        array.at(3).unwrap_err(),
        Error::IndexOutOfBounds { index: 3, length: 3 }
    );
}

#[test]
fn test_zero_padded_array() {
    // header reserved for a wider length, padded with zero bytes
    let data = [0x02, 0x07, 0x00, 0x00, 0x00, 0x31, 0x32];
    let array = Slice::new(&data);
    assert_eq!(array.find_data_offset(0x02), Ok(5));
    assert_eq!(array.length(), Ok(2));
    assert_eq!(array.at(1).unwrap().get_int(), Ok(2));
}

#[test]
fn test_indexed_array() {
    // [1, "ab"]
    let data = [0x06, 0x09, 0x02, 0x31, 0x42, b'a', b'b', 0x03, 0x04];
    let array = Slice::new(&data);
    assert_eq!(array.byte_size(), Ok(9));
    assert_eq!(array.length(), Ok(2));
    assert_eq!(array.at(1).unwrap().string_view(), Ok("ab"));
    assert_eq!(array.lookup(0).unwrap().get_int(), Ok(1));
}

#[test]
fn test_compact_containers() {
    let array = [0x13, 0x06, 0x31, 0x41, b'x', 0x02];
    let slice = Slice::new(&array);
    assert_eq!(slice.length(), Ok(2));
    assert_eq!(slice.at(1).unwrap().string_view(), Ok("x"));

    // {"a": 1, "b": 2}
    let object = [0x14, 0x09, 0x41, b'a', 0x31, 0x41, b'b', 0x32, 0x02];
    let slice = Slice::new(&object);
    assert_eq!(slice.length(), Ok(2));
    assert_eq!(slice.get("b").unwrap().unwrap().get_int(), Ok(2));
    assert_eq!(slice.key_at(1).unwrap().string_view(), Ok("b"));
    assert_eq!(slice.value_at(0).unwrap().get_int(), Ok(1));
}

#[test]
fn test_object_lookup() {
    // {"b": 1, "a": 2}, sorted index table
    let data = [0x0b, 0x0b, 0x02, 0x41, b'b', 0x31, 0x41, b'a', 0x32, 0x06, 0x03];
    let object = Slice::new(&data);
    assert!(object.is_sorted());
    assert_eq!(object.key_at(0).unwrap().string_view(), Ok("a"));
    assert_eq!(object.get("b").unwrap().unwrap().get_int(), Ok(1));
    assert_eq!(object.get("c"), Ok(None));
    assert_eq!(object.has_key("a"), Ok(true));
    assert_eq!(object.lookup("c").unwrap_err(), Error::KeyNotFound);
    assert_eq!(object.lookup(String::from("a")).unwrap().get_int(), Ok(2));
    assert_eq!(object.get_path(&["a"]).unwrap().unwrap().get_int(), Ok(2));
    assert_eq!(object.get_path::<&str>(&[]).unwrap().map(|v| v.is_object()), Some(true));
}

#[test]
fn test_malformed_input() {
    // byte length beyond the buffer
    assert_eq!(Slice::new(&[0x06, 0x20, 0x01]).byte_size(), Err(Error::MalformedData));
    assert_eq!(Slice::new(&[0x06, 0x20, 0x01]).length(), Ok(1));
    assert_eq!(Slice::new(&[0x06, 0x20, 0x01]).at(0), Err(Error::MalformedData));
    // reserved head
    assert_eq!(Slice::new(&[0x15]).byte_size(), Err(Error::MalformedData));
    assert_eq!(Slice::new(&[0xd8]).value_type(), ValueType::Illegal);
    // truncated tag
    assert_eq!(Slice::new(&[0xee]).byte_size(), Err(Error::MalformedData));
    // unterminated varint
    assert_eq!(Slice::new(&[0x13, 0x80]).byte_size(), Err(Error::MalformedData));
    // 8-byte width container too short for its count
    assert_eq!(Slice::new(&[0x09, 3, 0, 0, 0, 0, 0, 0, 0]).length(), Err(Error::MalformedData));
}

#[test]
fn test_type_mismatch_names() {
    let null = Slice::new(&[0x18]);
    assert_eq!(
        null.get_string(),
        Err(Error::TypeMismatch {
            expected: "string",
            actual: ValueType::Null
        })
    );
    assert_eq!(
        null.length(),
        Err(Error::TypeMismatch {
            expected: "array or object",
            actual: ValueType::Null
        })
    );
    assert_eq!(null.hex_type(), "0x18");
    assert_eq!(null.type_name(), "null");
    assert_eq!(Slice::new(&[0x31, 0x32]).to_hex(), Ok("0x31".to_owned()));
}

fn double(value: f64) -> Vec<u8> {
    let mut data = vec![0x1b];
    data.extend_from_slice(&value.to_le_bytes());
    data
}

#[test]
fn test_double_to_integer_bounds() {
    let two_63 = double(9223372036854775808.0);
    assert_eq!(Slice::new(&two_63).get_number::<i64>(), Err(Error::NumberOutOfRange));
    assert_eq!(Slice::new(&two_63).get_number::<u64>(), Ok(1 << 63));

    let two_64 = double(18446744073709551616.0);
    assert_eq!(Slice::new(&two_64).get_number::<u64>(), Err(Error::NumberOutOfRange));

    assert_eq!(Slice::new(&double(-9223372036854775808.0)).get_number::<i64>(), Ok(i64::MIN));
    assert_eq!(Slice::new(&double(255.0)).get_number::<u8>(), Ok(255));
    assert_eq!(Slice::new(&double(256.0)).get_number::<u8>(), Err(Error::NumberOutOfRange));
    assert_eq!(Slice::new(&double(-1.0)).get_number::<u32>(), Err(Error::NumberOutOfRange));
}

#[test]
#[cfg(target_pointer_width = "64")]
fn test_compact_object_with_corrupt_count() {
    // trailing count varint decodes to far more entries than the bytes hold
    let data = [0x14, 0x0b, 0xc5, 0xf2, 0xe7, 0x8a, 0x85, 0x8a, 0xa1, 0xd6, 0x9b];
    let object = Slice::new(&data);
    assert_eq!(object.get_nth_offset(usize::MAX / 2 + 1), Err(Error::MalformedData));
    assert!(object.key_at(usize::MAX / 2 + 1).is_err());
}
