//! Codec configuration.

use json_stream::WriterOptions;
use serde::{Deserialize, Serialize};

/// Settings fixed when a codec is built.
///
/// Deserializable so hosts can keep it in their own configuration files;
/// missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    /// Allow maps whose keys serialize to arrays or objects to be written as
    /// arrays of `[key, value]` entries. When off, maps are always objects
    /// and keys are written with their `Display` text.
    pub complex_map_key_serialization: bool,
    /// Keep object members whose value is null.
    pub serialize_nulls: bool,
    /// Indent output with two spaces.
    pub pretty_print: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            complex_map_key_serialization: false,
            serialize_nulls: true,
            pretty_print: false,
        }
    }
}

impl CodecOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_complex_map_key_serialization(mut self, enabled: bool) -> Self {
        self.complex_map_key_serialization = enabled;
        self
    }

    pub fn with_serialize_nulls(mut self, enabled: bool) -> Self {
        self.serialize_nulls = enabled;
        self
    }

    pub fn with_pretty_print(mut self, enabled: bool) -> Self {
        self.pretty_print = enabled;
        self
    }

    pub fn writer_options(&self) -> WriterOptions {
        WriterOptions {
            indent: self.pretty_print.then(|| "  ".to_owned()),
            serialize_nulls: self.serialize_nulls,
        }
    }
}
