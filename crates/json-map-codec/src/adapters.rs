//! Codecs that wrap other codecs or other serialization frameworks.

use std::fmt;
use std::marker::PhantomData;

use json_stream::{JsonReader, JsonToken, JsonWriter};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::codec::TypeCodec;
use crate::error::CodecError;

/// Maps `None` to the null literal and delegates everything else.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionCodec<C>(pub C);

impl<T, C: TypeCodec<T>> TypeCodec<Option<T>> for OptionCodec<C> {
    fn read(&self, reader: &mut JsonReader<'_>) -> Result<Option<T>, CodecError> {
        if reader.peek()? == JsonToken::Null {
            reader.next_null()?;
            return Ok(None);
        }
        self.0.read(reader).map(Some)
    }

    fn write(&self, writer: &mut JsonWriter, value: &Option<T>) -> Result<(), CodecError> {
        match value {
            Some(inner) => self.0.write(writer, inner),
            None => Ok(writer.null_value()?),
        }
    }

    fn to_tree(&self, value: &Option<T>) -> Result<Value, CodecError> {
        match value {
            Some(inner) => self.0.to_tree(inner),
            None => Ok(Value::Null),
        }
    }
}

/// Codes any serde type through its [`Value`] tree.
///
/// This is the usual key codec for composite keys: a struct key serializes
/// to an object tree, which makes the map codec fall back to the
/// array-of-entries form.
pub struct SerdeCodec<T>(PhantomData<fn() -> T>);

impl<T> SerdeCodec<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for SerdeCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for SerdeCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SerdeCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SerdeCodec")
    }
}

impl<T: Serialize + DeserializeOwned> TypeCodec<T> for SerdeCodec<T> {
    fn read(&self, reader: &mut JsonReader<'_>) -> Result<T, CodecError> {
        let tree = reader.read_tree()?;
        Ok(serde_json::from_value(tree)?)
    }

    fn write(&self, writer: &mut JsonWriter, value: &T) -> Result<(), CodecError> {
        let tree = serde_json::to_value(value)?;
        Ok(writer.tree_value(&tree)?)
    }

    fn to_tree(&self, value: &T) -> Result<Value, CodecError> {
        Ok(serde_json::to_value(value)?)
    }

    fn from_tree(&self, tree: &Value) -> Result<T, CodecError> {
        Ok(T::deserialize(tree)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{from_json, to_json};
    use crate::primitives::IntCodec;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn option_codec_maps_null_to_none() {
        let codec = OptionCodec(IntCodec);
        assert_eq!(from_json::<Option<i32>, _>(&codec, "null").unwrap(), None);
        assert_eq!(from_json::<Option<i32>, _>(&codec, "3").unwrap(), Some(3));
        assert_eq!(to_json(&codec, &None::<i32>).unwrap(), "null");
        assert_eq!(codec.to_tree(&Some(4i32)).unwrap(), json!(4));
    }

    #[test]
    fn serde_codec_uses_the_serde_tree() {
        let codec = SerdeCodec::<Point>::new();
        let point = Point { x: 5, y: 6 };
        assert_eq!(codec.to_tree(&point).unwrap(), json!({"x": 5, "y": 6}));
        assert_eq!(to_json(&codec, &point).unwrap(), r#"{"x":5,"y":6}"#);
        assert_eq!(from_json::<Point, _>(&codec, r#"{"y": 6, "x": 5}"#).unwrap(), point);
        assert_eq!(codec.from_tree(&json!({"x": 5, "y": 6})).unwrap(), point);
    }

    #[test]
    fn serde_codec_reports_shape_mismatches() {
        let codec = SerdeCodec::<Point>::new();
        assert!(matches!(
            from_json::<Point, _>(&codec, r#"{"x": 5}"#),
            Err(CodecError::Tree(_))
        ));
    }
}
