//! Pull-based JSON reader.

use serde_json::{Map, Number, Value};

use crate::error::StreamError;
use crate::token::{JsonToken, Scope};
use crate::util::{find_ending_quote, unescape};

/// Containers nested deeper than this are rejected.
pub const MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq)]
enum Peeked {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    True,
    False,
    Null,
    Name(String),
    Str(String),
    Number(String),
    EndDocument,
}

impl Peeked {
    fn token(&self) -> JsonToken {
        match self {
            Self::BeginObject => JsonToken::BeginObject,
            Self::EndObject => JsonToken::EndObject,
            Self::BeginArray => JsonToken::BeginArray,
            Self::EndArray => JsonToken::EndArray,
            Self::True | Self::False => JsonToken::Boolean,
            Self::Null => JsonToken::Null,
            Self::Name(_) => JsonToken::Name,
            Self::Str(_) => JsonToken::String,
            Self::Number(_) => JsonToken::Number,
            Self::EndDocument => JsonToken::EndDocument,
        }
    }
}

/// Reads a JSON document one token at a time.
///
/// The reader keeps at most one token of lookahead. [`peek`](Self::peek)
/// reports the shape of the next token without consuming it; the `begin_*`,
/// `end_*` and `next_*` methods consume it and fail with
/// [`StreamError::UnexpectedToken`] (leaving the token in place) when the
/// shape does not match.
///
/// # Example
///
/// ```
/// use json_stream::{JsonReader, JsonToken};
///
/// let mut reader = JsonReader::new(r#"{"a": [1, true]}"#);
/// reader.begin_object().unwrap();
/// assert_eq!(reader.next_name().unwrap(), "a");
/// reader.begin_array().unwrap();
/// assert_eq!(reader.next_i64().unwrap(), 1);
/// assert_eq!(reader.peek().unwrap(), JsonToken::Boolean);
/// assert!(reader.next_bool().unwrap());
/// reader.end_array().unwrap();
/// reader.end_object().unwrap();
/// reader.finish().unwrap();
/// ```
pub struct JsonReader<'a> {
    input: &'a [u8],
    x: usize,
    stack: Vec<Scope>,
    peeked: Option<Peeked>,
    token_start: usize,
}

impl<'a> JsonReader<'a> {
    /// Creates a reader over a complete JSON document.
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            x: 0,
            stack: vec![Scope::EmptyDocument],
            peeked: None,
            token_start: 0,
        }
    }

    /// Creates a reader over UTF-8 bytes.
    pub fn from_slice(input: &'a [u8]) -> Result<Self, StreamError> {
        let text = std::str::from_utf8(input).map_err(|_| StreamError::InvalidUtf8)?;
        Ok(Self::new(text))
    }

    /// Current byte position of the cursor.
    pub fn offset(&self) -> usize {
        self.x
    }

    /// Returns the type of the next token without consuming it.
    pub fn peek(&mut self) -> Result<JsonToken, StreamError> {
        let peeked = self.next_peeked()?;
        let token = peeked.token();
        self.peeked = Some(peeked);
        Ok(token)
    }

    /// True if the current array or object has another element.
    pub fn has_next(&mut self) -> Result<bool, StreamError> {
        let token = self.peek()?;
        Ok(!matches!(
            token,
            JsonToken::EndArray | JsonToken::EndObject | JsonToken::EndDocument
        ))
    }

    pub fn begin_array(&mut self) -> Result<(), StreamError> {
        self.expect(JsonToken::BeginArray)?;
        tracing::trace!(offset = self.token_start, "begin array");
        self.push(Scope::EmptyArray)
    }

    pub fn end_array(&mut self) -> Result<(), StreamError> {
        self.expect(JsonToken::EndArray)?;
        self.stack.pop();
        Ok(())
    }

    pub fn begin_object(&mut self) -> Result<(), StreamError> {
        self.expect(JsonToken::BeginObject)?;
        tracing::trace!(offset = self.token_start, "begin object");
        self.push(Scope::EmptyObject)
    }

    pub fn end_object(&mut self) -> Result<(), StreamError> {
        self.expect(JsonToken::EndObject)?;
        self.stack.pop();
        Ok(())
    }

    /// Consumes the next member name.
    pub fn next_name(&mut self) -> Result<String, StreamError> {
        match self.next_peeked()? {
            Peeked::Name(name) => Ok(name),
            other => Err(self.put_back(other, JsonToken::Name)),
        }
    }

    /// Consumes the next string value. Numbers are returned as their literal
    /// text.
    pub fn next_string(&mut self) -> Result<String, StreamError> {
        match self.next_peeked()? {
            Peeked::Str(text) | Peeked::Number(text) => Ok(text),
            other => Err(self.put_back(other, JsonToken::String)),
        }
    }

    /// Consumes a literal `true` or `false`.
    pub fn next_bool(&mut self) -> Result<bool, StreamError> {
        match self.next_peeked()? {
            Peeked::True => Ok(true),
            Peeked::False => Ok(false),
            other => Err(self.put_back(other, JsonToken::Boolean)),
        }
    }

    pub fn next_null(&mut self) -> Result<(), StreamError> {
        self.expect(JsonToken::Null).map(|_| ())
    }

    /// Consumes a number as `i64`. Quoted numbers and integral doubles such
    /// as `1.0` are accepted.
    pub fn next_i64(&mut self) -> Result<i64, StreamError> {
        let text = self.next_number_text()?;
        if let Ok(value) = text.parse::<i64>() {
            return Ok(value);
        }
        match parse_finite(&text) {
            Some(d) if d.fract() == 0.0 && d >= i64::MIN as f64 && d < i64::MAX as f64 => {
                Ok(d as i64)
            }
            _ => Err(self.number_format(text, "i64")),
        }
    }

    /// Consumes a number as `u64`, with the same leniency as
    /// [`next_i64`](Self::next_i64).
    pub fn next_u64(&mut self) -> Result<u64, StreamError> {
        let text = self.next_number_text()?;
        if let Ok(value) = text.parse::<u64>() {
            return Ok(value);
        }
        match parse_finite(&text) {
            Some(d) if d.fract() == 0.0 && d >= 0.0 && d < u64::MAX as f64 => Ok(d as u64),
            _ => Err(self.number_format(text, "u64")),
        }
    }

    /// Consumes a number, or a quoted number, as `f64`.
    pub fn next_f64(&mut self) -> Result<f64, StreamError> {
        let text = self.next_number_text()?;
        match parse_finite(&text) {
            Some(value) => Ok(value),
            None => Err(self.number_format(text, "f64")),
        }
    }

    /// Re-labels a pending member name as a string value, so that the next
    /// value read consumes the name itself. Used to decode object member
    /// names with an arbitrary value reader.
    pub fn promote_name_to_value(&mut self) -> Result<(), StreamError> {
        match self.next_peeked()? {
            Peeked::Name(name) => {
                self.peeked = Some(Peeked::Str(name));
                Ok(())
            }
            other => Err(self.put_back(other, JsonToken::Name)),
        }
    }

    /// Skips the next value, including everything nested inside it. A
    /// pending member name is skipped together with its value.
    pub fn skip_value(&mut self) -> Result<(), StreamError> {
        let mut depth = 0usize;
        loop {
            match self.next_peeked()? {
                Peeked::BeginArray => {
                    self.push(Scope::EmptyArray)?;
                    depth += 1;
                }
                Peeked::BeginObject => {
                    self.push(Scope::EmptyObject)?;
                    depth += 1;
                }
                Peeked::EndArray | Peeked::EndObject if depth > 0 => {
                    self.stack.pop();
                    depth -= 1;
                }
                Peeked::Name(_) => continue,
                other @ (Peeked::EndArray | Peeked::EndObject | Peeked::EndDocument) => {
                    return Err(self.put_back(other, JsonToken::Null));
                }
                _ => {}
            }
            if depth == 0 {
                return Ok(());
            }
        }
    }

    /// Reads the next value, including everything nested inside it, as a
    /// [`Value`] tree.
    pub fn read_tree(&mut self) -> Result<Value, StreamError> {
        match self.next_peeked()? {
            Peeked::BeginArray => {
                self.push(Scope::EmptyArray)?;
                let mut items = Vec::new();
                while self.has_next()? {
                    items.push(self.read_tree()?);
                }
                self.end_array()?;
                Ok(Value::Array(items))
            }
            Peeked::BeginObject => {
                self.push(Scope::EmptyObject)?;
                let mut members = Map::new();
                while self.has_next()? {
                    let name = self.next_name()?;
                    let value = self.read_tree()?;
                    members.insert(name, value);
                }
                self.end_object()?;
                Ok(Value::Object(members))
            }
            Peeked::Str(text) => Ok(Value::String(text)),
            Peeked::Number(text) => match serde_json::from_str::<Number>(&text) {
                Ok(number) => Ok(Value::Number(number)),
                Err(_) => Err(self.number_format(text, "number")),
            },
            Peeked::True => Ok(Value::Bool(true)),
            Peeked::False => Ok(Value::Bool(false)),
            Peeked::Null => Ok(Value::Null),
            other => Err(self.put_back(other, JsonToken::Null)),
        }
    }

    /// Asserts that the top-level value has been consumed and only
    /// whitespace remains.
    pub fn finish(&mut self) -> Result<(), StreamError> {
        self.expect(JsonToken::EndDocument).map(|_| ())
    }

    fn next_number_text(&mut self) -> Result<String, StreamError> {
        match self.next_peeked()? {
            Peeked::Number(text) | Peeked::Str(text) => Ok(text),
            other => Err(self.put_back(other, JsonToken::Number)),
        }
    }

    fn expect(&mut self, expected: JsonToken) -> Result<Peeked, StreamError> {
        let peeked = self.next_peeked()?;
        if peeked.token() != expected {
            return Err(self.put_back(peeked, expected));
        }
        Ok(peeked)
    }

    fn put_back(&mut self, peeked: Peeked, expected: JsonToken) -> StreamError {
        let found = peeked.token();
        self.peeked = Some(peeked);
        StreamError::UnexpectedToken {
            expected,
            found,
            offset: self.token_start,
        }
    }

    fn number_format(&self, text: String, target: &'static str) -> StreamError {
        StreamError::NumberFormat {
            text,
            target,
            offset: self.token_start,
        }
    }

    fn syntax(&self, message: &'static str) -> StreamError {
        StreamError::Syntax {
            message,
            offset: self.x,
        }
    }

    fn push(&mut self, scope: Scope) -> Result<(), StreamError> {
        // The document scope sits at the bottom of the stack.
        if self.stack.len() > MAX_DEPTH {
            return Err(StreamError::TooDeep(MAX_DEPTH));
        }
        self.stack.push(scope);
        Ok(())
    }

    fn set_top(&mut self, scope: Scope) {
        if let Some(top) = self.stack.last_mut() {
            *top = scope;
        }
    }

    fn next_peeked(&mut self) -> Result<Peeked, StreamError> {
        match self.peeked.take() {
            Some(peeked) => Ok(peeked),
            None => self.do_peek(),
        }
    }

    fn do_peek(&mut self) -> Result<Peeked, StreamError> {
        let top = match self.stack.last() {
            Some(scope) => *scope,
            None => return Err(StreamError::IllegalState("reader scope stack is empty")),
        };
        match top {
            Scope::EmptyArray => self.set_top(Scope::NonEmptyArray),
            Scope::NonEmptyArray => match self.next_non_whitespace() {
                Some(b']') => {
                    self.x += 1;
                    return Ok(Peeked::EndArray);
                }
                Some(b',') => self.x += 1,
                _ => return Err(self.syntax("unterminated array")),
            },
            Scope::EmptyObject | Scope::NonEmptyObject => {
                self.set_top(Scope::DanglingName);
                if top == Scope::NonEmptyObject {
                    match self.next_non_whitespace() {
                        Some(b'}') => {
                            self.x += 1;
                            return Ok(Peeked::EndObject);
                        }
                        Some(b',') => self.x += 1,
                        _ => return Err(self.syntax("unterminated object")),
                    }
                }
                return match self.next_non_whitespace() {
                    Some(b'"') => self.read_string().map(Peeked::Name),
                    Some(b'}') if top == Scope::EmptyObject => {
                        self.x += 1;
                        Ok(Peeked::EndObject)
                    }
                    _ => Err(self.syntax("expected a member name")),
                };
            }
            Scope::DanglingName => {
                self.set_top(Scope::NonEmptyObject);
                match self.next_non_whitespace() {
                    Some(b':') => self.x += 1,
                    _ => return Err(self.syntax("expected ':'")),
                }
            }
            Scope::EmptyDocument => self.set_top(Scope::NonEmptyDocument),
            Scope::NonEmptyDocument => {
                return match self.next_non_whitespace() {
                    None => Ok(Peeked::EndDocument),
                    Some(_) => Err(self.syntax("unexpected data after the top-level value")),
                };
            }
        }

        match self.next_non_whitespace() {
            Some(b']') if top == Scope::EmptyArray => {
                self.x += 1;
                Ok(Peeked::EndArray)
            }
            Some(b'[') => {
                self.x += 1;
                Ok(Peeked::BeginArray)
            }
            Some(b'{') => {
                self.x += 1;
                Ok(Peeked::BeginObject)
            }
            Some(b'"') => self.read_string().map(Peeked::Str),
            Some(b't') => self.read_literal("true", Peeked::True),
            Some(b'f') => self.read_literal("false", Peeked::False),
            Some(b'n') => self.read_literal("null", Peeked::Null),
            Some(b'-' | b'0'..=b'9') => self.read_number().map(Peeked::Number),
            None => Err(self.syntax("unexpected end of input")),
            Some(_) => Err(self.syntax("unexpected character")),
        }
    }

    /// Skips whitespace and returns the next byte without consuming it.
    fn next_non_whitespace(&mut self) -> Option<u8> {
        while let Some(&b) = self.input.get(self.x) {
            if !matches!(b, b' ' | b'\t' | b'\n' | b'\r') {
                self.token_start = self.x;
                return Some(b);
            }
            self.x += 1;
        }
        self.token_start = self.x;
        None
    }

    /// Reads a string literal; the cursor is on the opening quote.
    fn read_string(&mut self) -> Result<String, StreamError> {
        let start = self.x + 1;
        let end = find_ending_quote(self.input, start)?;
        let raw = std::str::from_utf8(&self.input[start..end])
            .map_err(|_| StreamError::InvalidUtf8)?;
        let text = unescape(raw, start)?;
        self.x = end + 1;
        Ok(text)
    }

    fn read_literal(&mut self, word: &'static str, peeked: Peeked) -> Result<Peeked, StreamError> {
        if self.input[self.x..].starts_with(word.as_bytes()) {
            self.x += word.len();
            Ok(peeked)
        } else {
            Err(self.syntax("unexpected character"))
        }
    }

    fn read_number(&mut self) -> Result<String, StreamError> {
        let start = self.x;
        if self.byte() == Some(b'-') {
            self.x += 1;
        }
        match self.byte() {
            Some(b'0') => self.x += 1,
            Some(b'1'..=b'9') => self.skip_digits(),
            _ => return Err(self.syntax("malformed number")),
        }
        if self.byte() == Some(b'.') {
            self.x += 1;
            if !matches!(self.byte(), Some(b'0'..=b'9')) {
                return Err(self.syntax("malformed number"));
            }
            self.skip_digits();
        }
        if matches!(self.byte(), Some(b'e' | b'E')) {
            self.x += 1;
            if matches!(self.byte(), Some(b'+' | b'-')) {
                self.x += 1;
            }
            if !matches!(self.byte(), Some(b'0'..=b'9')) {
                return Err(self.syntax("malformed number"));
            }
            self.skip_digits();
        }
        // Only ASCII bytes were consumed.
        let text = String::from_utf8_lossy(&self.input[start..self.x]).into_owned();
        Ok(text)
    }

    fn skip_digits(&mut self) {
        while matches!(self.byte(), Some(b'0'..=b'9')) {
            self.x += 1;
        }
    }

    fn byte(&self) -> Option<u8> {
        self.input.get(self.x).copied()
    }
}

fn parse_finite(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
