//! Reader/writer error type.

use thiserror::Error;

use crate::JsonToken;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("{message} at byte {offset}")]
    Syntax { message: &'static str, offset: usize },
    #[error("expected {expected} but was {found} at byte {offset}")]
    UnexpectedToken {
        expected: JsonToken,
        found: JsonToken,
        offset: usize,
    },
    #[error("cannot read `{text}` as {target} at byte {offset}")]
    NumberFormat {
        text: String,
        target: &'static str,
        offset: usize,
    },
    #[error("unterminated string starting at byte {0}")]
    UnterminatedString(usize),
    #[error("invalid escape sequence at byte {0}")]
    InvalidEscape(usize),
    #[error("invalid UTF-8")]
    InvalidUtf8,
    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),
    #[error("numeric values must be finite, got {0}")]
    NonFinite(f64),
    #[error("illegal writer state: {0}")]
    IllegalState(&'static str),
}

impl StreamError {
    /// Byte offset into the input where a reader error was detected.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Syntax { offset, .. }
            | Self::UnexpectedToken { offset, .. }
            | Self::NumberFormat { offset, .. } => Some(*offset),
            Self::UnterminatedString(offset) | Self::InvalidEscape(offset) => Some(*offset),
            _ => None,
        }
    }
}
