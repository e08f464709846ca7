use na_vpack::{ArrayIterator, Builder, Error, ObjectIterator, SharedSlice, Slice, Value};

fn numbers(count: i64) -> SharedSlice {
    let mut builder = Builder::new();
    builder.open_array().unwrap();
    for i in 0..count {
        builder.add(Value::Int(i)).unwrap();
    }
    builder.close().unwrap();
    builder.into_shared_slice().unwrap()
}

fn object(compact: bool) -> SharedSlice {
    let mut builder = Builder::new();
    if compact {
        builder.open_compact_object().unwrap();
    } else {
        builder.open_object().unwrap();
    }
    builder.add_entry("c", Value::Int(3)).unwrap();
    builder.add_entry("a", Value::Int(1)).unwrap();
    builder.add_entry("b", Value::Int(2)).unwrap();
    builder.close().unwrap();
    builder.into_shared_slice().unwrap()
}

#[test]
fn test_array_iterator_positions() {
    let array = numbers(4);
    let mut iter = ArrayIterator::new(array.slice()).unwrap();
    assert_eq!(iter.size(), 4);
    assert!(iter.valid());
    assert!(iter.is_first());
    assert_eq!(iter.value().unwrap().get_int(), Ok(0));

    iter.forward(3).unwrap();
    assert!(iter.is_last());
    assert_eq!(iter.index(), 3);
    assert_eq!(iter.value().unwrap().get_int(), Ok(3));

    iter.forward(10).unwrap();
    assert!(!iter.valid());
    assert_eq!(
        iter.value().unwrap_err(),
        Error::IndexOutOfBounds { index: 4, length: 4 }
    );

    iter.reset().unwrap();
    let values: Vec<i64> = iter.map(|v| v.unwrap().get_int().unwrap()).collect();
    assert_eq!(values, [0, 1, 2, 3]);
}

#[test]
fn test_array_iterator_exact_size() {
    let array = numbers(5);
    let mut iter = array.array_iter().unwrap();
    assert_eq!(iter.len(), 5);
    iter.next();
    assert_eq!(iter.len(), 4);
    assert_eq!(iter.by_ref().count(), 4);
    assert!(iter.next().is_none());
}

#[test]
fn test_object_iterator_orders() {
    for compact in [false, true] {
        let object = object(compact);
        let sorted: Vec<String> = object
            .object_iter()
            .unwrap()
            .map(|pair| pair.unwrap().key.copy_string().unwrap())
            .collect();
        let stored: Vec<String> = object
            .object_iter_sequential()
            .unwrap()
            .map(|pair| pair.unwrap().key.copy_string().unwrap())
            .collect();
        assert_eq!(stored, ["c", "a", "b"]);
        if compact {
            assert_eq!(sorted, ["c", "a", "b"]);
        } else {
            assert_eq!(sorted, ["a", "b", "c"]);
        }
    }
}

#[test]
fn test_shared_object_iterator_keeps_buffer() {
    let object = object(false);
    let mut iter = object.object_iter().unwrap();
    drop(object);
    assert!(iter.is_first());
    assert_eq!(iter.key().unwrap().string_view(), Ok("a"));
    assert_eq!(iter.value().unwrap().get_int(), Ok(1));
    iter.forward(2).unwrap();
    assert!(iter.is_last());
    let pair = iter.next().unwrap().unwrap();
    assert_eq!(pair.key.string_view(), Ok("c"));
    assert!(pair.key.shares_ownership(&pair.value));
    assert!(iter.next().is_none());
    iter.reset().unwrap();
    assert_eq!(iter.size(), 3);
}

#[test]
fn test_borrowed_object_iterator() {
    let object = object(false);
    let mut iter = ObjectIterator::new(object.slice()).unwrap();
    assert!(!iter.is_sequential());
    let (key, value) = iter.current().unwrap();
    assert_eq!(key.string_view(), Ok("a"));
    assert_eq!(value.get_int(), Ok(1));
    iter.advance().unwrap();
    assert_eq!(iter.key().unwrap().string_view(), Ok("b"));

    let compact = self::object(true);
    assert!(
        ObjectIterator::with_sequential(compact.slice(), false)
            .unwrap()
            .is_sequential()
    );
}

#[test]
fn test_iterator_type_errors() {
    let number = Slice::new(&[0x31]);
    assert!(ArrayIterator::new(number).is_err());
    assert!(ObjectIterator::new(number).is_err());
    assert!(numbers(2).object_iter().is_err());
    assert!(object(false).array_iter().is_err());
}

#[test]
fn test_malformed_member_ends_iteration() {
    // compact array claiming two members, the second one truncated
    let data = [0x13, 0x05, 0x31, 0xbf, 0x02];
    let mut iter = ArrayIterator::new(Slice::new(&data)).unwrap();
    assert_eq!(iter.next().unwrap().unwrap().get_int(), Ok(1));
    assert_eq!(iter.next().unwrap().unwrap_err(), Error::MalformedData);
    assert!(iter.next().is_none());
}
