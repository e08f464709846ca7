use bytes::Bytes;
use na_vpack::{
    AttributeTranslator, DEFAULT_SEED32, DEFAULT_SEED64, ExternalTable, Options, SharedSlice,
    Slice, to_vec,
};
use serde::Serialize;
use std::{collections::BTreeMap, sync::Arc};

#[derive(Debug, Clone, PartialEq, Serialize)]
enum TestEnum {
    Unit,
    Newtype(i32),
    Tuple(i32, String),
    Struct { x: i32, y: i32 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct TestObject {
    name: String,
    values: Vec<i64>,
    nested: Option<Box<TestObject>>,
    map: BTreeMap<String, TestEnum>,
}

fn options() -> Options {
    let translator = AttributeTranslator::new([(1, "_key"), (2, "_id"), (20, "_rev")]).ok();
    let mut table = ExternalTable::new();
    table.insert(SharedSlice::new(vec![0x18]));
    let options = Options::DEFAULT.with_resolver(Arc::new(table));
    match translator {
        Some(translator) => options.with_translator(Arc::new(translator)),
        None => options,
    }
}

/// Reads every accessor of a borrowed view; none of them may panic.
fn visit_slice(slice: Slice<'_>, options: &Options, depth: usize) {
    let _ = slice.byte_size();
    let _ = slice.value_byte_size();
    let _ = slice.start();
    let _ = slice.end();
    let _ = slice.tags();
    let _ = slice.has_tag(1);
    let _ = slice.get_bool();
    let _ = slice.get_double();
    let _ = slice.get_utc_date();
    let _ = slice.get_int();
    let _ = slice.get_uint();
    let _ = slice.get_number::<u8>();
    let _ = slice.get_number::<f64>();
    let _ = slice.string_view();
    let _ = slice.compare_string("_key");
    let _ = slice.get_binary();
    let _ = slice.get_bcd();
    let _ = slice.get_external();
    let _ = slice.to_hex();
    let _ = slice.hash(DEFAULT_SEED64);
    let _ = slice.hash32(DEFAULT_SEED32);
    let _ = slice.make_key(options);
    let _ = slice.get("_key");
    let _ = slice.get_with("_rev", options);
    let _ = slice.get_path(&["a", "b"]);
    let _ = slice.to_json(options);
    if depth > 4 {
        return;
    }
    let _ = slice.hash_slow(DEFAULT_SEED64);
    let _ = slice.normalized_hash(DEFAULT_SEED64);
    if let Ok(length) = slice.length() {
        for index in 0..length.min(16) {
            if let Ok(member) = slice.at(index) {
                visit_slice(member, options, depth + 1);
            }
            if let Ok(value) = slice.value_at(index) {
                visit_slice(value, options, depth + 1);
            }
            let _ = slice.translated_key_at(index, options);
        }
    }
    if let Ok(iter) = slice.array_iter() {
        for member in iter.take(16).flatten() {
            let _ = member.byte_size();
        }
    }
    if let Ok(iter) = slice.object_iter_sequential() {
        for (key, _) in iter.take(16).flatten() {
            let _ = key.make_key(options);
        }
    }
}

/// Same for a shared handle, including the aliasing results.
fn visit_shared(shared: &SharedSlice, options: &Options) {
    let _ = shared.value();
    let _ = shared.get_string();
    let _ = shared.get_binary();
    let _ = shared.get_bcd();
    let _ = shared.value_start();
    let _ = shared.resolve_externals(options);
    let _ = shared.get_path_with(&["_key"], options);
    let _ = shared.get_numeric_value::<i64>();
    if let Ok(iter) = shared.array_iter() {
        for member in iter.take(16).flatten() {
            let _ = member.get_string();
        }
    }
    if let Ok(iter) = shared.object_iter() {
        for pair in iter.take(16).flatten() {
            let _ = pair.translated_key(options);
        }
    }
    let _ = shared.to_bytes();
}

pub fn test_direct(data: &[u8]) {
    let options = options();
    visit_slice(Slice::new(data), &options, 0);
    let shared = SharedSlice::new(Bytes::copy_from_slice(data));
    visit_shared(&shared, &options);
    if let Ok(offset) = shared.get_nth_offset(0) {
        visit_shared(&shared.alias_at(offset), &options);
    }
}

pub fn test_serde(data: &[u8]) {
    let mut map = BTreeMap::new();
    for (i, chunk) in data.chunks(4).take(8).enumerate() {
        let value = match chunk.first().copied().unwrap_or(0) % 4 {
            0 => TestEnum::Unit,
            1 => TestEnum::Newtype(i as i32),
            2 => TestEnum::Tuple(i as i32, String::from_utf8_lossy(chunk).into_owned()),
            _ => TestEnum::Struct { x: i as i32, y: -(i as i32) },
        };
        map.insert(format!("k{i}"), value);
    }
    let object = TestObject {
        name: String::from_utf8_lossy(data).into_owned(),
        values: data.iter().map(|b| i64::from(*b) * 1_000_003).collect(),
        nested: None,
        map,
    };
    if let Ok(bytes) = to_vec(&object) {
        let slice = Slice::new(&bytes);
        assert!(slice.is_object());
        visit_slice(slice, &Options::DEFAULT, 0);
    }
}

pub fn test(data: &[u8]) {
    test_direct(data);
    test_serde(data);
}
