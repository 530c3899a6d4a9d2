//! Map codec.
//!
//! Maps are written in one of two shapes:
//!
//! - **object**: `{"<key text>": <value>, ...}`, used whenever every key
//!   serializes to a primitive or null, and always when complex map key
//!   serialization is disabled;
//! - **array of entries**: `[[<key>, <value>], ...]`, used for the whole map
//!   when complex map key serialization is enabled and at least one key
//!   serializes to an array or object.
//!
//! Both shapes are accepted when decoding, independent of the options.

use std::fmt::Display;
use std::marker::PhantomData;

use json_stream::{JsonReader, JsonToken, JsonWriter};
use serde_json::Value;
use tracing::debug;

use crate::codec::TypeCodec;
use crate::container::{DefaultConstructor, MutableMap, ObjectConstructor};
use crate::error::CodecError;
use crate::options::CodecOptions;
use crate::resolve::{DefaultCodec, MapKey};

/// Wire shape chosen for one map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEncoding {
    Object,
    EntryArray,
}

/// Converts maps of type `M` to and from JSON, delegating keys to `KC`,
/// values to `VC` and map construction to `F`.
///
/// ```
/// use std::collections::BTreeMap;
/// use json_map_codec::{CodecOptions, MapCodec};
///
/// let codec = MapCodec::<BTreeMap<bool, String>, _, _>::new(CodecOptions::default());
/// let map = BTreeMap::from([(false, "y".to_owned()), (true, "x".to_owned())]);
/// let json = codec.to_json(Some(&map)).unwrap();
/// assert_eq!(json, r#"{"false":"y","true":"x"}"#);
/// assert_eq!(codec.from_json(&json).unwrap(), Some(map));
/// ```
pub struct MapCodec<M, KC, VC, F = DefaultConstructor> {
    key_codec: KC,
    value_codec: VC,
    constructor: F,
    options: CodecOptions,
    _map: PhantomData<fn() -> M>,
}

impl<M> MapCodec<M, <M::Key as MapKey>::KeyCodec, <M::Value as DefaultCodec>::Codec>
where
    M: MutableMap + Default,
    M::Key: MapKey,
    M::Value: DefaultCodec,
{
    /// Builds a codec from the built-in key and value codecs.
    pub fn new(options: CodecOptions) -> Self {
        Self::with_codecs(
            Default::default(),
            Default::default(),
            DefaultConstructor,
            options,
        )
    }
}

impl<M, KC, VC, F> MapCodec<M, KC, VC, F> {
    pub fn with_codecs(key_codec: KC, value_codec: VC, constructor: F, options: CodecOptions) -> Self {
        Self {
            key_codec,
            value_codec,
            constructor,
            options,
            _map: PhantomData,
        }
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    pub fn key_codec(&self) -> &KC {
        &self.key_codec
    }

    pub fn value_codec(&self) -> &VC {
        &self.value_codec
    }
}

impl<M, KC, VC, F> MapCodec<M, KC, VC, F>
where
    M: MutableMap,
    M::Key: Display,
    KC: TypeCodec<M::Key>,
    VC: TypeCodec<M::Value>,
    F: ObjectConstructor<M>,
{
    /// Reads a map in either wire shape. `null` reads as `None` without
    /// constructing a map.
    pub fn decode(&self, reader: &mut JsonReader<'_>) -> Result<Option<M>, CodecError> {
        let shape = reader.peek()?;
        if shape == JsonToken::Null {
            reader.next_null()?;
            return Ok(None);
        }

        let mut map = self.constructor.construct();
        if shape == JsonToken::BeginArray {
            reader.begin_array()?;
            while reader.has_next()? {
                reader.begin_array()?;
                let key = self.key_codec.read(reader)?;
                let value = self.value_codec.read(reader)?;
                insert_unique(&mut map, key, value)?;
                reader.end_array()?;
            }
            reader.end_array()?;
        } else {
            reader.begin_object()?;
            while reader.has_next()? {
                reader.promote_name_to_value()?;
                let key = self.key_codec.read(reader)?;
                let value = self.value_codec.read(reader)?;
                insert_unique(&mut map, key, value)?;
            }
            reader.end_object()?;
        }
        debug!(%shape, entries = map.len(), "decoded map");
        Ok(Some(map))
    }

    /// Writes a map, or `null` for `None`.
    pub fn encode(&self, writer: &mut JsonWriter, map: Option<&M>) -> Result<(), CodecError> {
        let Some(map) = map else {
            return Ok(writer.null_value()?);
        };

        if !self.options.complex_map_key_serialization {
            writer.begin_object()?;
            for (key, value) in map.entries() {
                writer.name(&key.to_string())?;
                self.value_codec.write(writer, value)?;
            }
            writer.end_object()?;
            return Ok(());
        }

        let mut keys = Vec::with_capacity(map.len());
        let mut values = Vec::with_capacity(map.len());
        let mut has_complex_keys = false;
        for (key, value) in map.entries() {
            let element = self.key_codec.to_tree(key)?;
            has_complex_keys |= element.is_array() || element.is_object();
            keys.push(element);
            values.push(value);
        }

        let encoding = if has_complex_keys {
            MapEncoding::EntryArray
        } else {
            MapEncoding::Object
        };
        debug!(?encoding, entries = keys.len(), "encoding map");
        match encoding {
            MapEncoding::EntryArray => self.write_entry_array(writer, keys.iter().zip(values)),
            MapEncoding::Object => {
                writer.begin_object()?;
                for (element, value) in keys.iter().zip(values) {
                    writer.name(&key_to_string(element))?;
                    self.value_codec.write(writer, value)?;
                }
                writer.end_object()?;
                Ok(())
            }
        }
    }

    /// Writes `map` as an array of `[key, value]` entries regardless of key
    /// shape or options.
    pub fn encode_entry_array(&self, writer: &mut JsonWriter, map: &M) -> Result<(), CodecError> {
        let mut entries = Vec::with_capacity(map.len());
        for (key, value) in map.entries() {
            entries.push((self.key_codec.to_tree(key)?, value));
        }
        self.write_entry_array(writer, entries.iter().map(|(key, value)| (key, *value)))
    }

    /// The shape [`encode`](Self::encode) would use for `map`.
    pub fn encoding_for(&self, map: &M) -> Result<MapEncoding, CodecError> {
        if self.options.complex_map_key_serialization {
            for (key, _) in map.entries() {
                let element = self.key_codec.to_tree(key)?;
                if element.is_array() || element.is_object() {
                    return Ok(MapEncoding::EntryArray);
                }
            }
        }
        Ok(MapEncoding::Object)
    }

    /// Encodes with this codec's writer options.
    pub fn to_json(&self, map: Option<&M>) -> Result<String, CodecError> {
        let mut writer = JsonWriter::with_options(self.options.writer_options());
        self.encode(&mut writer, map)?;
        Ok(writer.finish()?)
    }

    /// Decodes a complete document; trailing data is an error.
    pub fn from_json(&self, text: &str) -> Result<Option<M>, CodecError> {
        let mut reader = JsonReader::new(text);
        let map = self.decode(&mut reader)?;
        reader.finish()?;
        Ok(map)
    }

    fn write_entry_array<'v>(
        &self,
        writer: &mut JsonWriter,
        entries: impl Iterator<Item = (&'v Value, &'v M::Value)>,
    ) -> Result<(), CodecError>
    where
        M::Value: 'v,
    {
        writer.begin_array()?;
        for (key, value) in entries {
            writer.begin_array()?;
            writer.tree_value(key)?;
            self.value_codec.write(writer, value)?;
            writer.end_array()?;
        }
        writer.end_array()?;
        Ok(())
    }
}

impl<M, KC, VC, F> TypeCodec<Option<M>> for MapCodec<M, KC, VC, F>
where
    M: MutableMap,
    M::Key: Display,
    KC: TypeCodec<M::Key>,
    VC: TypeCodec<M::Value>,
    F: ObjectConstructor<M>,
{
    fn read(&self, reader: &mut JsonReader<'_>) -> Result<Option<M>, CodecError> {
        self.decode(reader)
    }

    fn write(&self, writer: &mut JsonWriter, value: &Option<M>) -> Result<(), CodecError> {
        self.encode(writer, value.as_ref())
    }
}

fn insert_unique<M>(map: &mut M, key: M::Key, value: M::Value) -> Result<(), CodecError>
where
    M: MutableMap,
    M::Key: Display,
{
    if map.contains_key(&key) {
        return Err(CodecError::DuplicateKey(key.to_string()));
    }
    let replaced = map.insert_entry(key, value);
    debug_assert!(replaced.is_none());
    Ok(())
}

/// Member name for a primitive or null key tree.
///
/// # Panics
///
/// On array and object trees. Those keys are always routed to the
/// array-of-entries form, so reaching this with one is a bug in the
/// classification, not bad input.
fn key_to_string(element: &Value) -> String {
    match element {
        Value::Null => "null".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => {
            unreachable!("complex map key reached object member naming")
        }
    }
}
