//! Request shape validation.
//!
//! The validator is a pure check: it never mutates the request and performs
//! no I/O. Configured required fields are checked first, in configured order,
//! so a request that is both incomplete and unroutable always reports the
//! missing field.

use std::collections::BTreeSet;

use serde_json::Value;

use super::errors::DispatchError;
use super::registry::TypeTag;
use super::request::{PAYLOAD_FIELD, Request, TYPE_FIELD};

/// Ordered, duplicate-free list of field names every request must carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredFields(Vec<String>);

impl RequiredFields {
    /// Builds the list, dropping later duplicates and keeping first-seen order.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ordered: Vec<String> = Vec::new();
        for field in fields {
            let name = field.into();
            if !ordered.contains(&name) {
                ordered.push(name);
            }
        }
        Self(ordered)
    }

    /// Field names in check order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Iterates over field names in check order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for RequiredFields {
    fn default() -> Self {
        Self::new([TYPE_FIELD, PAYLOAD_FIELD])
    }
}

impl<S: Into<String>> FromIterator<S> for RequiredFields {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Routing information extracted from a valid request.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Route<'r> {
    pub(crate) tag: &'r str,
    pub(crate) payload: &'r Value,
}

/// Checks required fields and the routing key of a request.
#[derive(Debug, Clone)]
pub struct Validator {
    required_fields: RequiredFields,
    known_tags: BTreeSet<TypeTag>,
}

impl Validator {
    /// Creates a validator for the given fields and registered tags.
    pub fn new(
        required_fields: RequiredFields,
        known_tags: impl IntoIterator<Item = TypeTag>,
    ) -> Self {
        Self {
            required_fields,
            known_tags: known_tags.into_iter().collect(),
        }
    }

    /// Configured required fields.
    #[must_use]
    pub const fn required_fields(&self) -> &RequiredFields {
        &self.required_fields
    }

    /// Validates a request.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::MissingRequiredField` for the first absent
    /// field and `DispatchError::UnrecognizedType` when `type` does not name a
    /// registered handler.
    pub fn validate(&self, request: &Request) -> Result<(), DispatchError> {
        self.check(request).map(|_| ())
    }

    /// Validates a request and returns what the dispatcher needs to route it.
    ///
    /// `type` and `payload` are required for routing even when the
    /// configuration does not list them; they are checked after the
    /// configured fields.
    pub(crate) fn check<'r>(&self, request: &'r Request) -> Result<Route<'r>, DispatchError> {
        if let Some(missing) = self
            .required_fields
            .iter()
            .find(|field| !request.contains(field))
        {
            return Err(DispatchError::missing_field(missing));
        }

        let type_value = request
            .type_value()
            .ok_or_else(|| DispatchError::missing_field(TYPE_FIELD))?;
        let tag = match type_value.as_str() {
            Some(tag) if self.known_tags.contains(tag) => tag,
            Some(tag) => return Err(DispatchError::unrecognized_type(tag)),
            None => return Err(DispatchError::unrecognized_type(type_value.to_string())),
        };

        let payload = request
            .payload()
            .ok_or_else(|| DispatchError::missing_field(PAYLOAD_FIELD))?;

        Ok(Route { tag, payload })
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use serde_json::json;

    use super::*;

    fn request(value: Value) -> Request {
        Request::from_value(value).expect("test request")
    }

    fn tags(names: &[&str]) -> Vec<TypeTag> {
        names
            .iter()
            .map(|name| TypeTag::new(*name).expect("valid tag"))
            .collect()
    }

    #[fixture]
    fn validator() -> Validator {
        Validator::new(
            RequiredFields::new(["type", "payload", "font"]),
            tags(&["echo", "text"]),
        )
    }

    fn missing_field(result: Result<(), DispatchError>) -> String {
        match result {
            Err(DispatchError::MissingRequiredField { field }) => field,
            other => panic!("expected missing field error, got {other:?}"),
        }
    }

    #[rstest]
    fn accepts_complete_requests(validator: Validator) {
        let input = request(json!({"type": "text", "payload": "aGk=", "font": "Arial"}));
        assert!(validator.validate(&input).is_ok());
    }

    #[rstest]
    #[case::no_type(json!({"payload": "hi", "font": "Arial"}), "type")]
    #[case::no_payload(json!({"type": "echo", "font": "Arial"}), "payload")]
    #[case::no_font(json!({"type": "echo", "payload": "hi"}), "font")]
    #[case::empty(json!({}), "type")]
    fn reports_first_missing_field(
        validator: Validator,
        #[case] input: Value,
        #[case] expected: &str,
    ) {
        assert_eq!(missing_field(validator.validate(&request(input))), expected);
    }

    #[rstest]
    fn missing_field_wins_over_unknown_type(validator: Validator) {
        let result = validator.validate(&request(json!({"type": "unknown", "payload": "hi"})));
        assert_eq!(missing_field(result), "font");
    }

    #[rstest]
    #[case::unknown(json!("unknown"), "unknown")]
    #[case::wrong_case(json!("ECHO"), "ECHO")]
    #[case::number(json!(42), "42")]
    #[case::null(Value::Null, "null")]
    fn rejects_unroutable_types(
        validator: Validator,
        #[case] type_value: Value,
        #[case] rendered: &str,
    ) {
        let input = request(json!({"type": type_value, "payload": "hi", "font": "Arial"}));
        match validator.validate(&input) {
            Err(DispatchError::UnrecognizedType { type_value }) => assert_eq!(type_value, rendered),
            other => panic!("expected unrecognised type, got {other:?}"),
        }
    }

    #[test]
    fn routing_fields_are_checked_even_when_not_configured() {
        let validator = Validator::new(RequiredFields::new(["font"]), tags(&["echo"]));
        let no_type = validator.validate(&request(json!({"font": "Arial", "payload": 1})));
        assert_eq!(missing_field(no_type), "type");
        let no_payload = validator.validate(&request(json!({"font": "Arial", "type": "echo"})));
        assert_eq!(missing_field(no_payload), "payload");
    }

    #[test]
    fn check_exposes_route() {
        let validator = Validator::new(RequiredFields::default(), tags(&["echo"]));
        let input = request(json!({"type": "echo", "payload": [1, 2]}));
        let route = validator.check(&input).expect("valid request");
        assert_eq!(route.tag, "echo");
        assert_eq!(route.payload, &json!([1, 2]));
    }

    #[test]
    fn required_fields_drop_duplicates_in_order() {
        let fields: RequiredFields = ["type", "payload", "type", "font", "payload"]
            .into_iter()
            .collect();
        assert_eq!(fields.as_slice(), ["type", "payload", "font"]);
    }
}
