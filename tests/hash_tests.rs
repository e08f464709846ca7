use na_vpack::{Builder, DEFAULT_SEED32, DEFAULT_SEED64, Error, SharedSlice, Slice, Value, ValueType};

fn build(f: impl FnOnce(&mut Builder) -> na_vpack::Result<()>) -> SharedSlice {
    let mut builder = Builder::new();
    f(&mut builder).unwrap();
    builder.into_shared_slice().unwrap()
}

fn pair(first: (&str, i64), second: (&str, i64), compact: bool) -> SharedSlice {
    build(|b| {
        if compact {
            b.open_compact_object()?;
        } else {
            b.open_object()?;
        }
        b.add_entry(first.0, Value::Int(first.1))?;
        b.add_entry(second.0, Value::Int(second.1))?;
        b.close().map(drop)
    })
}

#[test]
fn test_hash_covers_encoding() {
    let a = build(|b| b.add(Value::String("foo")).map(drop));
    let b = build(|b| b.add(Value::String("foo")).map(drop));
    let c = build(|b| b.add(Value::String("bar")).map(drop));
    assert_eq!(a.hash(DEFAULT_SEED64), b.hash(DEFAULT_SEED64));
    assert_ne!(a.hash(DEFAULT_SEED64), c.hash(DEFAULT_SEED64));
    assert_ne!(a.hash(DEFAULT_SEED64), a.hash(1));
    assert_eq!(a.hash32(DEFAULT_SEED32), b.hash32(DEFAULT_SEED32));
    assert_eq!(
        a.hash(DEFAULT_SEED64),
        Ok(xxhash_rust::xxh3::xxh3_64_with_seed(&[0x43, b'f', b'o', b'o'], DEFAULT_SEED64))
    );
}

#[test]
fn test_hash_slow_ignores_member_order() {
    let sorted = pair(("a", 1), ("b", 2), false);
    let stored = pair(("b", 2), ("a", 1), true);
    assert_ne!(sorted.hash(DEFAULT_SEED64), stored.hash(DEFAULT_SEED64));
    assert_eq!(sorted.hash_slow(DEFAULT_SEED64), stored.hash_slow(DEFAULT_SEED64));

    let different = pair(("a", 2), ("b", 1), false);
    assert_ne!(sorted.hash_slow(DEFAULT_SEED64), different.hash_slow(DEFAULT_SEED64));
}

#[test]
fn test_normalized_hash_ignores_representation() {
    let small = build(|b| b.add(Value::Int(5)).map(drop));
    let unsigned = Slice::new(&[0x28, 0x05]);
    let double = build(|b| b.add(Value::Double(5.0)).map(drop));
    let tagged = build(|b| b.add_tagged(9, Value::Int(5)).map(drop));
    let expected = small.normalized_hash(DEFAULT_SEED64).unwrap();
    assert_eq!(unsigned.normalized_hash(DEFAULT_SEED64), Ok(expected));
    assert_eq!(double.normalized_hash(DEFAULT_SEED64), Ok(expected));
    assert_eq!(tagged.normalized_hash(DEFAULT_SEED64), Ok(expected));
    assert_eq!(
        small.normalized_hash32(DEFAULT_SEED32),
        double.normalized_hash32(DEFAULT_SEED32)
    );

    let mut long = vec![0xbf];
    long.extend_from_slice(&3u64.to_le_bytes());
    long.extend_from_slice(b"abc");
    let short = [0x43, b'a', b'b', b'c'];
    assert_eq!(
        Slice::new(&long).normalized_hash(DEFAULT_SEED64),
        Slice::new(&short).normalized_hash(DEFAULT_SEED64)
    );
    assert_ne!(
        Slice::new(&short).normalized_hash(DEFAULT_SEED64),
        small.normalized_hash(DEFAULT_SEED64)
    );
}

#[test]
fn test_hash_string_requires_string() {
    let number = build(|b| b.add(Value::Int(1)).map(drop));
    assert_eq!(
        number.hash_string(DEFAULT_SEED64),
        Err(Error::TypeMismatch {
            expected: "string",
            actual: ValueType::SmallInt
        })
    );
    let string = build(|b| b.add(Value::String("x")).map(drop));
    assert_eq!(string.hash_string(DEFAULT_SEED64), string.hash(DEFAULT_SEED64));
    assert_eq!(string.hash_string32(DEFAULT_SEED32), string.hash32(DEFAULT_SEED32));
}
