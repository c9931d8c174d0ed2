//! Request objects handed to the dispatcher.
//!
//! A request is a JSON object. The dispatcher reads only the `type` field for
//! routing and forwards `payload` verbatim; any other field is checked for
//! presence by the validator and otherwise ignored.

use serde_json::{Map, Value};

use super::errors::DispatchError;

/// Field selecting the handler.
pub const TYPE_FIELD: &str = "type";
/// Field forwarded to the handler.
pub const PAYLOAD_FIELD: &str = "payload";

/// Decoded request mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request(Map<String, Value>);

impl Request {
    /// Parses a JSONL line into a request.
    ///
    /// Trailing whitespace (including the newline delimiter) is trimmed before
    /// parsing.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::MalformedRequest` if the line is empty, is not
    /// valid JSON, or holds a JSON value other than an object.
    pub fn parse(line: &[u8]) -> Result<Self, DispatchError> {
        let trimmed = trim_trailing_whitespace(line);
        if trimmed.is_empty() {
            return Err(DispatchError::malformed("empty request line"));
        }

        let value: Value = serde_json::from_slice(trimmed).map_err(DispatchError::from_json_error)?;
        Self::from_value(value)
    }

    /// Wraps an already-decoded JSON value.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::MalformedRequest` unless the value is an object.
    pub fn from_value(value: Value) -> Result<Self, DispatchError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(DispatchError::malformed(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns `true` when the field is present, even if it holds `null`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Raw `type` value.
    #[must_use]
    pub fn type_value(&self) -> Option<&Value> {
        self.field(TYPE_FIELD)
    }

    /// `type` value when it is a string.
    #[must_use]
    pub fn type_tag(&self) -> Option<&str> {
        self.type_value().and_then(Value::as_str)
    }

    /// Payload forwarded to the handler.
    #[must_use]
    pub fn payload(&self) -> Option<&Value> {
        self.field(PAYLOAD_FIELD)
    }
}

impl From<Map<String, Value>> for Request {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Trims trailing ASCII whitespace from a byte slice.
fn trim_trailing_whitespace(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |pos| pos + 1);
    bytes.get(..end).unwrap_or_default()
}
