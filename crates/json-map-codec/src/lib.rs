//! JSON codec for maps with arbitrary key types.
//!
//! [`MapCodec`] writes a map as a JSON object when its keys have a primitive
//! serialized form, and as an array of `[key, value]` entries when
//! [`CodecOptions::complex_map_key_serialization`] is enabled and some key
//! serializes to an array or object. Keys and values are handled by
//! [`TypeCodec`] implementations supplied when the codec is built, so maps
//! nest and any serde type can act as a key through [`SerdeCodec`].
//!
//! ```
//! use std::collections::HashMap;
//! use std::fmt;
//!
//! use json_map_codec::{CodecOptions, DefaultConstructor, MapCodec, SerdeCodec, StringCodec};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl fmt::Display for Point {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         write!(f, "({},{})", self.x, self.y)
//!     }
//! }
//!
//! let codec: MapCodec<HashMap<Point, String>, _, _> = MapCodec::with_codecs(
//!     SerdeCodec::<Point>::new(),
//!     StringCodec,
//!     DefaultConstructor,
//!     CodecOptions::default().with_complex_map_key_serialization(true),
//! );
//! let map = HashMap::from([(Point { x: 5, y: 6 }, "a".to_owned())]);
//! let json = codec.to_json(Some(&map)).unwrap();
//! assert_eq!(json, r#"[[{"x":5,"y":6},"a"]]"#);
//! assert_eq!(codec.from_json(&json).unwrap(), Some(map));
//! ```

mod adapters;
mod codec;
mod container;
mod error;
mod map;
mod options;
mod primitives;
mod resolve;

pub use adapters::{OptionCodec, SerdeCodec};
pub use codec::{from_json, to_json, TypeCodec};
pub use container::{DefaultConstructor, MutableMap, ObjectConstructor};
pub use error::CodecError;
pub use map::{MapCodec, MapEncoding};
pub use options::CodecOptions;
pub use primitives::{BoolAsStringCodec, BoolCodec, FloatCodec, IntCodec, StringCodec, ValueCodec};
pub use resolve::{DefaultCodec, MapKey};

pub use json_stream::{JsonReader, JsonToken, JsonWriter, StreamError, WriterOptions};
