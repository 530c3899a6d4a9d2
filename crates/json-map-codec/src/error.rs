//! Codec error type.

use json_stream::StreamError;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error(transparent)]
    Stream(#[from] StreamError),
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
    #[error("value `{value}` is out of range for {target}")]
    OutOfRange { value: String, target: &'static str },
    #[error("tree conversion error: {0}")]
    Tree(#[from] serde_json::Error),
}
