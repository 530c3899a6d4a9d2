use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use indexmap::IndexMap;
use json_map_codec::{
    BoolCodec, CodecError, CodecOptions, DefaultConstructor, IntCodec, JsonToken, JsonWriter,
    MapCodec, MapEncoding, OptionCodec, SerdeCodec, StreamError, StringCodec, TypeCodec,
};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
struct Point {
    x: i32,
    y: i32,
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
enum Key {
    Name(String),
    At(Point),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) => f.write_str(name),
            Key::At(point) => point.fmt(f),
        }
    }
}

fn complex() -> CodecOptions {
    CodecOptions::default().with_complex_map_key_serialization(true)
}

type PointMapCodec = MapCodec<IndexMap<Point, String>, SerdeCodec<Point>, StringCodec>;

fn point_codec(options: CodecOptions) -> PointMapCodec {
    MapCodec::with_codecs(SerdeCodec::new(), StringCodec, DefaultConstructor, options)
}

fn parse(text: &str) -> Value {
    serde_json::from_str(text).unwrap()
}

#[test]
fn object_form_round_trip_for_string_keys() {
    let codec = MapCodec::<HashMap<String, i64>, _, _>::new(CodecOptions::default());
    let map = HashMap::from([("a".to_owned(), 1), ("b".to_owned(), -2)]);
    let text = codec.to_json(Some(&map)).unwrap();
    assert_eq!(parse(&text), json!({"a": 1, "b": -2}));
    assert_eq!(codec.from_json(&text).unwrap(), Some(map));
}

#[test]
fn array_form_round_trip_for_composite_keys() {
    let codec = point_codec(complex());
    let mut map = IndexMap::new();
    map.insert(Point { x: 5, y: 6 }, "a".to_owned());
    map.insert(Point { x: 8, y: 8 }, "b".to_owned());
    assert_eq!(codec.encoding_for(&map).unwrap(), MapEncoding::EntryArray);

    let text = codec.to_json(Some(&map)).unwrap();
    assert_eq!(text, r#"[[{"x":5,"y":6},"a"],[{"x":8,"y":8},"b"]]"#);
    assert_eq!(codec.from_json(&text).unwrap(), Some(map));
}

#[test]
fn composite_keys_without_complex_mode_use_display_text() {
    let codec = point_codec(CodecOptions::default());
    let mut map = IndexMap::new();
    map.insert(Point { x: 5, y: 6 }, "a".to_owned());
    let text = codec.to_json(Some(&map)).unwrap();
    assert_eq!(text, r#"{"(5,6)":"a"}"#);
    // The member name is not a serialized point.
    assert!(matches!(codec.from_json(&text), Err(CodecError::Tree(_))));
}

#[test]
fn one_composite_key_switches_the_whole_map_to_entries() {
    let codec: MapCodec<IndexMap<Key, i64>, _, _> =
        MapCodec::with_codecs(SerdeCodec::<Key>::new(), IntCodec, DefaultConstructor, complex());
    let mut map = IndexMap::new();
    map.insert(Key::Name("a".to_owned()), 1);
    map.insert(Key::At(Point { x: 1, y: 2 }), 2);
    map.insert(Key::Name("b".to_owned()), 3);

    let text = codec.to_json(Some(&map)).unwrap();
    assert_eq!(text, r#"[["a",1],[{"x":1,"y":2},2],["b",3]]"#);
    assert_eq!(codec.from_json(&text).unwrap(), Some(map.clone()));

    map.shift_remove(&Key::At(Point { x: 1, y: 2 }));
    assert_eq!(codec.to_json(Some(&map)).unwrap(), r#"{"a":1,"b":3}"#);
}

#[test]
fn duplicate_keys_are_rejected_in_both_forms() {
    let codec = MapCodec::<HashMap<String, i64>, _, _>::new(CodecOptions::default());
    for input in [r#"{"a":1,"a":2}"#, r#"[["a",1],["a",2]]"#] {
        match codec.from_json(input) {
            Err(CodecError::DuplicateKey(key)) => assert_eq!(key, "a"),
            other => panic!("expected a duplicate key error for {input}, got {other:?}"),
        }
    }
}

#[test]
fn duplicates_are_detected_after_key_decoding() {
    // "1" and "1.0" are different names but the same integer key.
    let codec = MapCodec::<BTreeMap<i64, bool>, _, _>::new(CodecOptions::default());
    let err = codec.from_json(r#"{"1": true, "1.0": false}"#).unwrap_err();
    assert_eq!(err.to_string(), "duplicate key: 1");
}

#[test]
fn null_maps_skip_construction() {
    let calls = Cell::new(0);
    let constructor = || {
        calls.set(calls.get() + 1);
        HashMap::<String, String>::new()
    };
    let codec: MapCodec<HashMap<String, String>, _, _, _> =
        MapCodec::with_codecs(StringCodec, StringCodec, constructor, CodecOptions::default());

    assert_eq!(codec.from_json("null").unwrap(), None);
    assert_eq!(calls.get(), 0);
    assert_eq!(codec.to_json(None).unwrap(), "null");

    assert_eq!(codec.from_json("{}").unwrap(), Some(HashMap::new()));
    assert_eq!(calls.get(), 1);
}

#[test]
fn boolean_keys_are_written_as_names_and_read_back_as_booleans() {
    for options in [CodecOptions::default(), complex()] {
        let codec = MapCodec::<BTreeMap<bool, String>, _, _>::new(options);
        let map = BTreeMap::from([(true, "x".to_owned()), (false, "y".to_owned())]);
        let text = codec.to_json(Some(&map)).unwrap();
        assert_eq!(text, r#"{"false":"y","true":"x"}"#);
        assert_eq!(codec.from_json(&text).unwrap(), Some(map));
    }
}

#[test]
fn strict_boolean_key_codec_cannot_read_member_names() {
    let codec: MapCodec<BTreeMap<bool, String>, _, _> =
        MapCodec::with_codecs(BoolCodec, StringCodec, DefaultConstructor, CodecOptions::default());
    let err = codec.from_json(r#"{"true":"x"}"#).unwrap_err();
    assert!(matches!(
        err,
        CodecError::Stream(StreamError::UnexpectedToken {
            expected: JsonToken::Boolean,
            found: JsonToken::String,
            ..
        })
    ));
}

#[test]
fn empty_maps_in_both_forms() {
    let codec = point_codec(complex());
    let empty = IndexMap::new();
    assert_eq!(codec.to_json(Some(&empty)).unwrap(), "{}");
    assert_eq!(codec.encoding_for(&empty).unwrap(), MapEncoding::Object);

    let mut writer = JsonWriter::new();
    codec.encode_entry_array(&mut writer, &empty).unwrap();
    assert_eq!(writer.finish().unwrap(), "[]");

    assert_eq!(codec.from_json("{}").unwrap(), Some(IndexMap::new()));
    assert_eq!(codec.from_json("[]").unwrap(), Some(IndexMap::new()));
}

#[test]
fn entry_array_is_accepted_without_complex_mode() {
    let codec = MapCodec::<BTreeMap<u32, String>, _, _>::new(CodecOptions::default());
    let map = codec.from_json(r#"[[2, "b"], [1, "a"]]"#).unwrap().unwrap();
    assert_eq!(map, BTreeMap::from([(1, "a".to_owned()), (2, "b".to_owned())]));

    let mut writer = JsonWriter::new();
    codec.encode_entry_array(&mut writer, &map).unwrap();
    assert_eq!(writer.finish().unwrap(), r#"[[1,"a"],[2,"b"]]"#);
}

#[test]
fn numeric_keys_use_their_decimal_text() {
    let codec = MapCodec::<BTreeMap<i32, f64>, _, _>::new(complex());
    let map = BTreeMap::from([(-1, 0.5), (10, 2.0)]);
    let text = codec.to_json(Some(&map)).unwrap();
    assert_eq!(text, r#"{"-1":0.5,"10":2.0}"#);
    assert_eq!(codec.from_json(&text).unwrap(), Some(map));
}

#[test]
fn malformed_shapes_surface_stream_errors() {
    let codec = MapCodec::<HashMap<i64, String>, _, _>::new(CodecOptions::default());
    assert!(matches!(
        codec.from_json(r#""not a map""#),
        Err(CodecError::Stream(StreamError::UnexpectedToken {
            expected: JsonToken::BeginObject,
            found: JsonToken::String,
            ..
        }))
    ));
    // Entry with a missing value.
    assert!(matches!(
        codec.from_json("[[1]]"),
        Err(CodecError::Stream(StreamError::UnexpectedToken {
            found: JsonToken::EndArray,
            ..
        }))
    ));
    // Entry with an extra element.
    assert!(codec.from_json(r#"[[1, "a", 2]]"#).is_err());
    // Non-numeric member name for an integer key.
    assert!(matches!(
        codec.from_json(r#"{"x": "a"}"#),
        Err(CodecError::Stream(StreamError::NumberFormat { .. }))
    ));
    assert!(codec.from_json("{} {}").is_err());
}

#[test]
fn maps_nest_as_values() {
    type Inner = BTreeMap<String, i64>;
    let inner = MapCodec::<Inner, _, _>::new(CodecOptions::default());
    let outer: MapCodec<BTreeMap<String, Option<Inner>>, _, _> =
        MapCodec::with_codecs(StringCodec, inner, DefaultConstructor, CodecOptions::default());

    let map = BTreeMap::from([
        ("empty".to_owned(), None),
        ("one".to_owned(), Some(BTreeMap::from([("x".to_owned(), 1)]))),
    ]);
    let text = outer.to_json(Some(&map)).unwrap();
    assert_eq!(text, r#"{"empty":null,"one":{"x":1}}"#);
    assert_eq!(outer.from_json(&text).unwrap(), Some(map));
}

#[test]
fn writer_options_follow_codec_options() {
    let options = CodecOptions::default()
        .with_serialize_nulls(false)
        .with_pretty_print(true);
    let codec: MapCodec<BTreeMap<String, Option<i64>>, _, _> = MapCodec::with_codecs(
        StringCodec,
        OptionCodec(IntCodec),
        DefaultConstructor,
        options,
    );
    let map = BTreeMap::from([("a".to_owned(), Some(1)), ("b".to_owned(), None)]);
    assert_eq!(codec.to_json(Some(&map)).unwrap(), "{\n  \"a\": 1\n}");
}

#[test]
fn map_codec_to_tree_matches_the_written_document() {
    let codec = point_codec(complex());
    let mut map = IndexMap::new();
    map.insert(Point { x: 0, y: 1 }, "p".to_owned());
    let tree = codec.to_tree(&Some(map.clone())).unwrap();
    assert_eq!(tree, json!([[{"x": 0, "y": 1}, "p"]]));
    assert_eq!(codec.from_tree(&tree).unwrap(), Some(map));
}

#[test]
fn shared_codec_serves_concurrent_calls() {
    let codec = MapCodec::<HashMap<String, i64>, _, _>::new(CodecOptions::default());
    std::thread::scope(|scope| {
        for i in 0..4 {
            let codec = &codec;
            scope.spawn(move || {
                let map = HashMap::from([(format!("k{i}"), i)]);
                let text = codec.to_json(Some(&map)).unwrap();
                assert_eq!(codec.from_json(&text).unwrap(), Some(map));
            });
        }
    });
}

proptest! {
    #[test]
    fn object_form_round_trips_any_string_keyed_map(
        map in prop::collection::hash_map("\\PC*", any::<i64>(), 0..16)
    ) {
        let codec = MapCodec::<HashMap<String, i64>, _, _>::new(CodecOptions::default());
        let text = codec.to_json(Some(&map)).unwrap();
        prop_assert_eq!(codec.from_json(&text).unwrap(), Some(map));
    }

    #[test]
    fn array_form_round_trips_any_point_keyed_map(
        entries in prop::collection::vec((any::<i32>(), any::<i32>(), "[a-z]{0,8}"), 0..16)
    ) {
        let map: IndexMap<Point, String> = entries
            .into_iter()
            .map(|(x, y, v)| (Point { x, y }, v))
            .collect();
        let codec = point_codec(complex());
        let text = codec.to_json(Some(&map)).unwrap();
        let expected_prefix = if map.is_empty() { '{' } else { '[' };
        prop_assert!(text.starts_with(expected_prefix));
        prop_assert_eq!(codec.from_json(&text).unwrap(), Some(map));
    }
}
