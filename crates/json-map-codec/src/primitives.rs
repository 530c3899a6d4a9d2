//! Codecs for strings, booleans, numbers and raw trees.

use json_stream::{JsonReader, JsonToken, JsonWriter, StreamError};
use serde_json::{Number, Value};

use crate::codec::TypeCodec;
use crate::error::CodecError;

#[derive(Debug, Clone, Copy, Default)]
pub struct StringCodec;

impl TypeCodec<String> for StringCodec {
    fn read(&self, reader: &mut JsonReader<'_>) -> Result<String, CodecError> {
        Ok(reader.next_string()?)
    }

    fn write(&self, writer: &mut JsonWriter, value: &String) -> Result<(), CodecError> {
        Ok(writer.string_value(value)?)
    }

    fn to_tree(&self, value: &String) -> Result<Value, CodecError> {
        Ok(Value::String(value.clone()))
    }
}

/// Strict boolean codec: reads and writes the `true`/`false` literals.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolCodec;

impl TypeCodec<bool> for BoolCodec {
    fn read(&self, reader: &mut JsonReader<'_>) -> Result<bool, CodecError> {
        Ok(reader.next_bool()?)
    }

    fn write(&self, writer: &mut JsonWriter, value: &bool) -> Result<(), CodecError> {
        Ok(writer.bool_value(*value)?)
    }

    fn to_tree(&self, value: &bool) -> Result<Value, CodecError> {
        Ok(Value::Bool(*value))
    }
}

/// Boolean codec for map keys: writes `"true"`/`"false"` strings.
///
/// Reading accepts either a string (true iff it equals `"true"` ignoring
/// ASCII case) or a boolean literal, so a promoted member name decodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolAsStringCodec;

impl TypeCodec<bool> for BoolAsStringCodec {
    fn read(&self, reader: &mut JsonReader<'_>) -> Result<bool, CodecError> {
        if reader.peek()? == JsonToken::String {
            let text = reader.next_string()?;
            return Ok(text.eq_ignore_ascii_case("true"));
        }
        Ok(reader.next_bool()?)
    }

    fn write(&self, writer: &mut JsonWriter, value: &bool) -> Result<(), CodecError> {
        Ok(writer.string_value(if *value { "true" } else { "false" })?)
    }

    fn to_tree(&self, value: &bool) -> Result<Value, CodecError> {
        Ok(Value::String(value.to_string()))
    }
}

/// Integer codec for every primitive integer width. Values outside the
/// target range fail with [`CodecError::OutOfRange`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IntCodec;

macro_rules! int_codec {
    ($($ty:ty => $read:ident, $write:ident, $wide:ty;)*) => {$(
        impl TypeCodec<$ty> for IntCodec {
            fn read(&self, reader: &mut JsonReader<'_>) -> Result<$ty, CodecError> {
                let wide = reader.$read()?;
                <$ty>::try_from(wide).map_err(|_| CodecError::OutOfRange {
                    value: wide.to_string(),
                    target: stringify!($ty),
                })
            }

            fn write(&self, writer: &mut JsonWriter, value: &$ty) -> Result<(), CodecError> {
                Ok(writer.$write(*value as $wide)?)
            }

            fn to_tree(&self, value: &$ty) -> Result<Value, CodecError> {
                Ok(Value::from(*value))
            }
        }
    )*};
}

int_codec! {
    i8 => next_i64, i64_value, i64;
    i16 => next_i64, i64_value, i64;
    i32 => next_i64, i64_value, i64;
    i64 => next_i64, i64_value, i64;
    isize => next_i64, i64_value, i64;
    u8 => next_u64, u64_value, u64;
    u16 => next_u64, u64_value, u64;
    u32 => next_u64, u64_value, u64;
    u64 => next_u64, u64_value, u64;
    usize => next_u64, u64_value, u64;
}

/// Floating point codec. Non-finite values cannot be written.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatCodec;

impl TypeCodec<f64> for FloatCodec {
    fn read(&self, reader: &mut JsonReader<'_>) -> Result<f64, CodecError> {
        Ok(reader.next_f64()?)
    }

    fn write(&self, writer: &mut JsonWriter, value: &f64) -> Result<(), CodecError> {
        Ok(writer.f64_value(*value)?)
    }

    fn to_tree(&self, value: &f64) -> Result<Value, CodecError> {
        let number = Number::from_f64(*value).ok_or(StreamError::NonFinite(*value))?;
        Ok(Value::Number(number))
    }
}

impl TypeCodec<f32> for FloatCodec {
    fn read(&self, reader: &mut JsonReader<'_>) -> Result<f32, CodecError> {
        Ok(reader.next_f64()? as f32)
    }

    // Written from the f32's own shortest text: "0.1", not "0.10000000149011612".
    fn write(&self, writer: &mut JsonWriter, value: &f32) -> Result<(), CodecError> {
        let number = f32_number(*value)?;
        Ok(writer.number_value(&number)?)
    }

    fn to_tree(&self, value: &f32) -> Result<Value, CodecError> {
        Ok(Value::Number(f32_number(*value)?))
    }
}

fn f32_number(value: f32) -> Result<Number, CodecError> {
    if !value.is_finite() {
        return Err(StreamError::NonFinite(f64::from(value)).into());
    }
    Ok(serde_json::from_str::<Number>(&value.to_string())?)
}

/// Passes [`Value`] trees through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueCodec;

impl TypeCodec<Value> for ValueCodec {
    fn read(&self, reader: &mut JsonReader<'_>) -> Result<Value, CodecError> {
        Ok(reader.read_tree()?)
    }

    fn write(&self, writer: &mut JsonWriter, value: &Value) -> Result<(), CodecError> {
        Ok(writer.tree_value(value)?)
    }

    fn to_tree(&self, value: &Value) -> Result<Value, CodecError> {
        Ok(value.clone())
    }
}
