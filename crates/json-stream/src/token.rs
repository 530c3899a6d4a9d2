use std::fmt;

/// Structure of the next value in a JSON stream, as reported by
/// [`JsonReader::peek`](crate::JsonReader::peek).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonToken {
    BeginArray,
    EndArray,
    BeginObject,
    EndObject,
    /// A member name inside an object.
    Name,
    String,
    Number,
    Boolean,
    Null,
    /// The top-level value has been fully consumed.
    EndDocument,
}

impl fmt::Display for JsonToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BeginArray => "BEGIN_ARRAY",
            Self::EndArray => "END_ARRAY",
            Self::BeginObject => "BEGIN_OBJECT",
            Self::EndObject => "END_OBJECT",
            Self::Name => "NAME",
            Self::String => "STRING",
            Self::Number => "NUMBER",
            Self::Boolean => "BOOLEAN",
            Self::Null => "NULL",
            Self::EndDocument => "END_DOCUMENT",
        };
        f.write_str(name)
    }
}

/// Nesting state shared by the reader and the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    EmptyDocument,
    NonEmptyDocument,
    EmptyArray,
    NonEmptyArray,
    EmptyObject,
    /// A name has been read or written; its value is next.
    DanglingName,
    NonEmptyObject,
}
