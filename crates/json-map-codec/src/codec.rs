//! The codec capability shared by element and map codecs.

use json_stream::{JsonReader, JsonWriter};
use serde_json::Value;

use crate::error::CodecError;

/// Reads and writes values of one type against a JSON stream.
///
/// Implementations are stateless from the caller's point of view: every
/// method takes `&self`, so one codec instance can serve concurrent calls as
/// long as each call brings its own reader or writer.
pub trait TypeCodec<T> {
    fn read(&self, reader: &mut JsonReader<'_>) -> Result<T, CodecError>;

    fn write(&self, writer: &mut JsonWriter, value: &T) -> Result<(), CodecError>;

    /// Converts `value` to its tree form. The default writes the value and
    /// parses the text back.
    fn to_tree(&self, value: &T) -> Result<Value, CodecError> {
        let mut writer = JsonWriter::new();
        self.write(&mut writer, value)?;
        let text = writer.finish()?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Builds a value from its tree form.
    fn from_tree(&self, tree: &Value) -> Result<T, CodecError> {
        let text = serde_json::to_string(tree)?;
        let mut reader = JsonReader::new(&text);
        let value = self.read(&mut reader)?;
        reader.finish()?;
        Ok(value)
    }
}

/// Encodes `value` as a compact JSON document.
pub fn to_json<T, C: TypeCodec<T> + ?Sized>(codec: &C, value: &T) -> Result<String, CodecError> {
    let mut writer = JsonWriter::new();
    codec.write(&mut writer, value)?;
    Ok(writer.finish()?)
}

/// Decodes a complete JSON document; trailing data is an error.
pub fn from_json<T, C: TypeCodec<T> + ?Sized>(codec: &C, text: &str) -> Result<T, CodecError> {
    let mut reader = JsonReader::new(text);
    let value = codec.read(&mut reader)?;
    reader.finish()?;
    Ok(value)
}
