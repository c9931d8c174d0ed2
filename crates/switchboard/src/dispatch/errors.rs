//! Error types for request validation and dispatch failures.
//!
//! Every failure the dispatcher can observe is expressed as a
//! [`DispatchError`]. None of them escape [`Dispatcher::dispatch`]; they are
//! converted into an [`ErrorPayload`] through [`DispatchError::to_payload`] and
//! returned inside an error reply.
//!
//! [`Dispatcher::dispatch`]: super::Dispatcher::dispatch

use thiserror::Error;

use super::reply::ErrorPayload;

/// Wire kind for a request lacking a configured field.
pub const MISSING_REQUIRED_FIELD: &str = "MissingRequiredField";
/// Wire kind for a request whose `type` has no registered handler.
pub const UNRECOGNIZED_TYPE: &str = "UnrecognizedType";
/// Wire kind for a handler that panicked instead of returning.
pub const HANDLER_PANICKED: &str = "HandlerPanicked";
/// Wire kind for a request line that is not a JSON object.
pub const MALFORMED_REQUEST: &str = "MalformedRequest";
/// Wire kind for a request line over the configured size limit.
pub const REQUEST_TOO_LARGE: &str = "RequestTooLarge";

/// Failure reported by a handler.
///
/// The kind is handler-defined and passed through to the reply untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct HandlerError {
    kind: String,
    message: String,
}

impl HandlerError {
    /// Creates a handler error with the given kind and message.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Handler-defined error kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Human-readable description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors surfaced while validating and dispatching a request.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A configured required field is absent from the request.
    #[error("request is missing required field '{field}'")]
    MissingRequiredField {
        /// Name of the absent field.
        field: String,
    },

    /// The `type` value does not name a registered handler.
    #[error("unrecognised request type: {type_value}")]
    UnrecognizedType {
        /// Rendered `type` value as received.
        type_value: String,
    },

    /// The handler returned an error.
    #[error(transparent)]
    Handler(#[from] HandlerError),

    /// The handler panicked while processing the payload.
    #[error("handler for '{tag}' panicked: {message}")]
    HandlerPanicked {
        /// Type-tag of the handler that panicked.
        tag: String,
        /// Panic message, when one could be recovered.
        message: String,
    },

    /// Request line could not be decoded into a JSON object.
    #[error("malformed request: {message}")]
    MalformedRequest {
        /// Decoder diagnostic.
        message: String,
        /// Underlying JSON error, if decoding got that far.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Request line exceeds the maximum allowed size.
    #[error("request too large: {size} bytes exceeds {max_size} byte limit")]
    RequestTooLarge {
        /// Observed line length.
        size: usize,
        /// Configured limit.
        max_size: usize,
    },
}

impl DispatchError {
    /// Stable kind string reported in error replies.
    ///
    /// Handler errors report their own kind; every other variant reports a
    /// fixed name.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::MissingRequiredField { .. } => MISSING_REQUIRED_FIELD,
            Self::UnrecognizedType { .. } => UNRECOGNIZED_TYPE,
            Self::Handler(error) => error.kind(),
            Self::HandlerPanicked { .. } => HANDLER_PANICKED,
            Self::MalformedRequest { .. } => MALFORMED_REQUEST,
            Self::RequestTooLarge { .. } => REQUEST_TOO_LARGE,
        }
    }

    /// Converts the error into the structured payload of an error reply.
    #[must_use]
    pub fn to_payload(&self) -> ErrorPayload {
        let message = match self {
            Self::Handler(error) => error.message().to_owned(),
            other => other.to_string(),
        };
        ErrorPayload::new(self.kind(), message)
    }

    /// Creates a missing required field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
        }
    }

    /// Creates an unrecognised type error.
    pub fn unrecognized_type(type_value: impl Into<String>) -> Self {
        Self::UnrecognizedType {
            type_value: type_value.into(),
        }
    }

    /// Creates a handler panic error.
    pub fn handler_panicked(tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self::HandlerPanicked {
            tag: tag.into(),
            message: message.into(),
        }
    }

    /// Creates a malformed request error from a serde error.
    #[must_use]
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::MalformedRequest {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates a malformed request error with a custom message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a request too large error.
    #[must_use]
    pub const fn request_too_large(size: usize, max_size: usize) -> Self {
        Self::RequestTooLarge { size, max_size }
    }
}
