//! Push-based JSON writer.

use serde_json::{Number, Value};

use crate::error::StreamError;
use crate::token::Scope;
use crate::util::write_quoted;

/// Output formatting knobs for [`JsonWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterOptions {
    /// Indentation unit for pretty printing. `None` writes compact JSON.
    pub indent: Option<String>,
    /// When false, an object member whose value is null is omitted along
    /// with its name.
    pub serialize_nulls: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            indent: None,
            serialize_nulls: true,
        }
    }
}

/// Writes one JSON document into an in-memory string.
///
/// Structure is validated as it is written: names are only accepted inside
/// objects, values inside objects need a name, only one top-level value is
/// allowed and closing brackets must match.
///
/// ```
/// use json_stream::JsonWriter;
///
/// let mut writer = JsonWriter::new();
/// writer.begin_object().unwrap();
/// writer.name("a").unwrap();
/// writer.i64_value(1).unwrap();
/// writer.end_object().unwrap();
/// assert_eq!(writer.finish().unwrap(), r#"{"a":1}"#);
/// ```
pub struct JsonWriter {
    out: String,
    stack: Vec<Scope>,
    deferred_name: Option<String>,
    options: WriterOptions,
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonWriter {
    pub fn new() -> Self {
        Self::with_options(WriterOptions::default())
    }

    pub fn with_options(options: WriterOptions) -> Self {
        Self {
            out: String::new(),
            stack: vec![Scope::EmptyDocument],
            deferred_name: None,
            options,
        }
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Text written so far.
    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn begin_array(&mut self) -> Result<(), StreamError> {
        self.open(Scope::EmptyArray, '[')
    }

    pub fn end_array(&mut self) -> Result<(), StreamError> {
        self.close(Scope::EmptyArray, Scope::NonEmptyArray, ']')
    }

    pub fn begin_object(&mut self) -> Result<(), StreamError> {
        self.open(Scope::EmptyObject, '{')
    }

    pub fn end_object(&mut self) -> Result<(), StreamError> {
        self.close(Scope::EmptyObject, Scope::NonEmptyObject, '}')
    }

    /// Sets the name of the next object member.
    pub fn name(&mut self, name: &str) -> Result<(), StreamError> {
        if self.deferred_name.is_some() {
            return Err(StreamError::IllegalState("a member name is already pending"));
        }
        if !matches!(self.top(), Scope::EmptyObject | Scope::NonEmptyObject) {
            return Err(StreamError::IllegalState("member name outside of an object"));
        }
        self.deferred_name = Some(name.to_owned());
        Ok(())
    }

    pub fn null_value(&mut self) -> Result<(), StreamError> {
        if self.deferred_name.is_some() && !self.options.serialize_nulls {
            // Drop the member entirely.
            self.deferred_name = None;
            return Ok(());
        }
        self.write_deferred_name()?;
        self.before_value()?;
        self.out.push_str("null");
        Ok(())
    }

    pub fn bool_value(&mut self, value: bool) -> Result<(), StreamError> {
        self.raw_value(if value { "true" } else { "false" })
    }

    pub fn i64_value(&mut self, value: i64) -> Result<(), StreamError> {
        self.raw_value(&value.to_string())
    }

    pub fn u64_value(&mut self, value: u64) -> Result<(), StreamError> {
        self.raw_value(&value.to_string())
    }

    /// Writes a finite double in its shortest round-trip form (`1.0`, `0.1`).
    pub fn f64_value(&mut self, value: f64) -> Result<(), StreamError> {
        let number = Number::from_f64(value).ok_or(StreamError::NonFinite(value))?;
        self.number_value(&number)
    }

    pub fn number_value(&mut self, value: &Number) -> Result<(), StreamError> {
        self.raw_value(&value.to_string())
    }

    pub fn string_value(&mut self, value: &str) -> Result<(), StreamError> {
        self.write_deferred_name()?;
        self.before_value()?;
        write_quoted(&mut self.out, value);
        Ok(())
    }

    /// Writes a whole [`Value`] tree as the next value, preserving member
    /// order.
    pub fn tree_value(&mut self, value: &Value) -> Result<(), StreamError> {
        match value {
            Value::Null => self.null_value(),
            Value::Bool(b) => self.bool_value(*b),
            Value::Number(n) => self.number_value(n),
            Value::String(s) => self.string_value(s),
            Value::Array(items) => {
                self.begin_array()?;
                for item in items {
                    self.tree_value(item)?;
                }
                self.end_array()
            }
            Value::Object(members) => {
                self.begin_object()?;
                for (name, member) in members {
                    self.name(name)?;
                    self.tree_value(member)?;
                }
                self.end_object()
            }
        }
    }

    /// Returns the document, failing if it is incomplete.
    pub fn finish(self) -> Result<String, StreamError> {
        if self.stack.len() != 1 || self.top() != Scope::NonEmptyDocument {
            return Err(StreamError::IllegalState("incomplete document"));
        }
        Ok(self.out)
    }

    fn raw_value(&mut self, text: &str) -> Result<(), StreamError> {
        self.write_deferred_name()?;
        self.before_value()?;
        self.out.push_str(text);
        Ok(())
    }

    fn open(&mut self, empty: Scope, bracket: char) -> Result<(), StreamError> {
        self.write_deferred_name()?;
        self.before_value()?;
        self.stack.push(empty);
        self.out.push(bracket);
        Ok(())
    }

    fn close(&mut self, empty: Scope, non_empty: Scope, bracket: char) -> Result<(), StreamError> {
        let top = self.top();
        if top != empty && top != non_empty {
            return Err(StreamError::IllegalState("nesting problem"));
        }
        if self.deferred_name.is_some() {
            return Err(StreamError::IllegalState("dangling member name"));
        }
        self.stack.pop();
        if top == non_empty {
            self.newline();
        }
        self.out.push(bracket);
        Ok(())
    }

    fn write_deferred_name(&mut self) -> Result<(), StreamError> {
        if let Some(name) = self.deferred_name.take() {
            match self.top() {
                Scope::NonEmptyObject => self.out.push(','),
                Scope::EmptyObject => {}
                _ => return Err(StreamError::IllegalState("nesting problem")),
            }
            self.newline();
            self.set_top(Scope::DanglingName);
            write_quoted(&mut self.out, &name);
        }
        Ok(())
    }

    fn before_value(&mut self) -> Result<(), StreamError> {
        match self.top() {
            Scope::EmptyDocument => self.set_top(Scope::NonEmptyDocument),
            Scope::NonEmptyDocument => {
                return Err(StreamError::IllegalState(
                    "JSON must have only one top-level value",
                ));
            }
            Scope::EmptyArray => {
                self.set_top(Scope::NonEmptyArray);
                self.newline();
            }
            Scope::NonEmptyArray => {
                self.out.push(',');
                self.newline();
            }
            Scope::DanglingName => {
                self.out.push(':');
                if self.options.indent.is_some() {
                    self.out.push(' ');
                }
                self.set_top(Scope::NonEmptyObject);
            }
            Scope::EmptyObject | Scope::NonEmptyObject => {
                return Err(StreamError::IllegalState("object member is missing its name"));
            }
        }
        Ok(())
    }

    fn newline(&mut self) {
        if let Some(indent) = &self.options.indent {
            self.out.push('\n');
            for _ in 1..self.stack.len() {
                self.out.push_str(indent);
            }
        }
    }

    fn top(&self) -> Scope {
        self.stack.last().copied().unwrap_or(Scope::NonEmptyDocument)
    }

    fn set_top(&mut self, scope: Scope) {
        if let Some(top) = self.stack.last_mut() {
            *top = scope;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compact(value: &Value) -> String {
        let mut writer = JsonWriter::new();
        writer.tree_value(value).unwrap();
        writer.finish().unwrap()
    }

    #[test]
    fn writes_compact_trees() {
        assert_eq!(compact(&json!(null)), "null");
        assert_eq!(compact(&json!([])), "[]");
        assert_eq!(compact(&json!({})), "{}");
        assert_eq!(
            compact(&json!({"b": [1, 2.5, "x"], "a": {"c": null}})),
            r#"{"b":[1,2.5,"x"],"a":{"c":null}}"#
        );
    }

    #[test]
    fn writes_doubles_in_shortest_form() {
        let mut writer = JsonWriter::new();
        writer.begin_array().unwrap();
        writer.f64_value(1.0).unwrap();
        writer.f64_value(0.1).unwrap();
        writer.f64_value(-2.5e-8).unwrap();
        writer.end_array().unwrap();
        assert_eq!(writer.finish().unwrap(), "[1.0,0.1,-2.5e-8]");
    }

    #[test]
    fn rejects_non_finite_doubles() {
        let mut writer = JsonWriter::new();
        assert!(matches!(
            writer.f64_value(f64::NAN),
            Err(StreamError::NonFinite(_))
        ));
        assert!(writer.f64_value(f64::INFINITY).is_err());
    }

    #[test]
    fn pretty_prints_with_indent() {
        let mut writer = JsonWriter::with_options(WriterOptions {
            indent: Some("  ".to_owned()),
            serialize_nulls: true,
        });
        writer.tree_value(&json!({"a": [1, 2], "b": {}})).unwrap();
        assert_eq!(
            writer.finish().unwrap(),
            "{\n  \"a\": [\n    1,\n    2\n  ],\n  \"b\": {}\n}"
        );
    }

    #[test]
    fn drops_null_members_when_nulls_are_not_serialized() {
        let mut writer = JsonWriter::with_options(WriterOptions {
            indent: None,
            serialize_nulls: false,
        });
        writer
            .tree_value(&json!({"a": null, "b": 1, "c": [null]}))
            .unwrap();
        assert_eq!(writer.finish().unwrap(), r#"{"b":1,"c":[null]}"#);
    }

    #[test]
    fn structural_misuse_is_rejected() {
        let mut writer = JsonWriter::new();
        assert!(writer.name("a").is_err());
        writer.begin_object().unwrap();
        assert!(writer.i64_value(1).is_err());
        writer.name("a").unwrap();
        assert!(writer.name("b").is_err());
        assert!(writer.end_object().is_err());
        writer.i64_value(1).unwrap();
        assert!(writer.end_array().is_err());
        writer.end_object().unwrap();
        assert!(writer.begin_array().is_err());
    }

    #[test]
    fn finish_rejects_incomplete_documents() {
        let writer = JsonWriter::new();
        assert!(writer.finish().is_err());
        let mut writer = JsonWriter::new();
        writer.begin_array().unwrap();
        assert!(writer.finish().is_err());
    }
}
