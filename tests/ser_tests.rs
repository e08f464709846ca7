#![cfg(feature = "serde")]

use std::{collections::BTreeMap, sync::Arc};

use na_vpack::{
    AttributeTranslator, Builder, ExternalTable, Options, Serializer, SharedSlice, Slice, Value,
    to_shared_slice, to_vec,
};
use serde::Serialize;

#[derive(Serialize)]
struct Document {
    name: String,
    count: u32,
    ratio: f64,
    tags: Vec<&'static str>,
    parent: Option<Box<Document>>,
}

#[derive(Serialize)]
enum Shape {
    Point,
    Circle(f64),
    Line(i32, i32),
    Rect { w: u8, h: u8 },
}

#[test]
fn test_struct_to_vpack() {
    let doc = Document {
        name: "child".to_owned(),
        count: 3,
        ratio: 0.5,
        tags: vec!["a", "b"],
        parent: Some(Box::new(Document {
            name: "root".to_owned(),
            count: 1000,
            ratio: -1.0,
            tags: vec![],
            parent: None,
        })),
    };
    let bytes = to_vec(&doc).unwrap();
    let slice = Slice::new(&bytes);
    assert!(slice.is_object());
    assert_eq!(slice.length(), Ok(5));
    assert_eq!(slice.get("count").unwrap().unwrap().get_uint(), Ok(3));
    assert_eq!(slice.get("tags").unwrap().unwrap().length(), Ok(2));
    assert_eq!(
        slice.get_path(&["parent", "name"]).unwrap().unwrap().string_view(),
        Ok("root")
    );
    assert!(
        slice
            .get_path(&["parent", "parent"])
            .unwrap()
            .unwrap()
            .is_null()
    );
}

#[test]
fn test_enums_to_vpack() {
    let shapes = vec![
        Shape::Point,
        Shape::Circle(1.5),
        Shape::Line(1, 2),
        Shape::Rect { w: 3, h: 4 },
    ];
    let shared = to_shared_slice(&shapes).unwrap();
    assert_eq!(shared.at(0).unwrap().string_view(), Ok("Point"));
    assert_eq!(
        shared.at(1).unwrap().get("Circle").unwrap().unwrap().get_double(),
        Ok(1.5)
    );
    assert_eq!(
        shared.at(2).unwrap().get("Line").unwrap().unwrap().at(1).unwrap().get_int(),
        Ok(2)
    );
    assert_eq!(
        shared
            .at(3)
            .unwrap()
            .get_path(&["Rect", "h"])
            .unwrap()
            .unwrap()
            .get_uint(),
        Ok(4)
    );
}

#[test]
fn test_map_keys() {
    let mut map = BTreeMap::new();
    map.insert(2u32, "two");
    map.insert(10u32, "ten");
    let shared = to_shared_slice(&map).unwrap();
    assert_eq!(shared.get("10").unwrap().unwrap().string_view(), Ok("ten"));

    let mut bad = BTreeMap::new();
    bad.insert(vec![1], 1);
    assert!(to_vec(&bad).is_err());
}

#[test]
fn test_serializer_with_translator() {
    #[derive(Serialize)]
    struct Keyed {
        _key: &'static str,
        value: i32,
    }
    let translator = Arc::new(AttributeTranslator::new([(1, "_key")]).unwrap());
    let options = Options::DEFAULT.with_translator(translator);
    let mut serializer = Serializer::with_options(&options);
    Keyed {
        _key: "k",
        value: 5,
    }
    .serialize(&mut serializer)
    .unwrap();
    let shared = serializer.into_builder().into_shared_slice().unwrap();
    assert!(shared.key_at(0).unwrap().is_small_int());
    assert_eq!(shared.to_json(&options).unwrap(), r#"{"_key":"k","value":5}"#);
}

#[test]
fn test_to_json_scalars() {
    let json = |value: Value<'_>| {
        let mut builder = Builder::new();
        builder.add(value).unwrap();
        builder.slice().unwrap().to_json(&Options::DEFAULT).unwrap()
    };
    assert_eq!(json(Value::Null), "null");
    assert_eq!(json(Value::None), "null");
    assert_eq!(json(Value::MinKey), "null");
    assert_eq!(json(Value::Bool(true)), "true");
    assert_eq!(json(Value::Int(-42)), "-42");
    assert_eq!(json(Value::UInt(u64::MAX)), "18446744073709551615");
    assert_eq!(json(Value::Double(2.5)), "2.5");
    assert_eq!(json(Value::UtcDate(1000)), "1000");
    assert_eq!(json(Value::String("a\"b")), r#""a\"b""#);
    assert_eq!(json(Value::Binary(&[1, 2])), "[1,2]");
}

#[test]
fn test_to_json_special_values() {
    let mut builder = Builder::new();
    builder.open_array().unwrap();
    builder.add_bcd(-1, -2, &[0x01, 0x25]).unwrap();
    builder.add_tagged(7, Value::String("t")).unwrap();
    builder.add_custom(&[0xf0, 0x2a]).unwrap();
    builder.close().unwrap();
    let slice = builder.slice().unwrap();
    assert_eq!(
        slice.to_json(&Options::DEFAULT).unwrap(),
        r#"["-125e-2","t","0xf0 0x2a"]"#
    );
}

#[test]
fn test_to_json_externals() {
    let mut table = ExternalTable::new();
    let id = table.insert(SharedSlice::new(vec![0x1a]));
    let mut builder = Builder::new();
    builder.open_object().unwrap();
    builder.add_entry("ext", Value::External(id)).unwrap();
    builder.close().unwrap();
    let shared = builder.into_shared_slice().unwrap();

    assert!(shared.to_json(&Options::DEFAULT).is_err());
    let options = Options::DEFAULT.with_resolver(Arc::new(table));
    assert_eq!(shared.to_json(&options).unwrap(), r#"{"ext":true}"#);
}

#[test]
fn test_to_json_pretty() {
    let shared = to_shared_slice(&vec![1, 2]).unwrap();
    let options = Options::DEFAULT.with_pretty_print(true);
    assert_eq!(shared.to_json(&options).unwrap(), "[\n  1,\n  2\n]");
}

#[test]
fn test_serialize_into_serde_json_value() {
    let shared = to_shared_slice(&BTreeMap::from([("k", vec![true, false])])).unwrap();
    let value = serde_json::to_value(&shared).unwrap();
    assert_eq!(value, serde_json::json!({"k": [true, false]}));
}
