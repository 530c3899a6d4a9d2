//! Streaming JSON primitives: a pull reader with one token of lookahead and a
//! push writer that validates document structure as it goes.
//!
//! Trees are represented as [`serde_json::Value`]; both sides can move a
//! whole tree in one call ([`JsonReader::read_tree`],
//! [`JsonWriter::tree_value`]).

mod error;
mod reader;
mod token;
mod util;
mod writer;

pub use error::StreamError;
pub use reader::{JsonReader, MAX_DEPTH};
pub use token::JsonToken;
pub use writer::{JsonWriter, WriterOptions};
