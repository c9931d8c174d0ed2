//! Reply envelope produced for every dispatched request.
//!
//! A reply serializes as `{"status":"ok","payload":...}` on success or
//! `{"status":"error","payload":{"kind":...,"message":...}}` on failure.
//! Clients decode the same lines back into a [`Reply`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::DispatchError;

/// Structured description of a failure, always serializable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    kind: String,
    message: String,
}

impl ErrorPayload {
    /// Creates an error payload.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Machine-readable error kind.
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

/// Uniform `{status, payload}` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "payload", rename_all = "snake_case")]
pub enum Reply {
    /// The handler returned a value.
    Ok(Value),
    /// Validation or the handler failed.
    Error(ErrorPayload),
}

impl Reply {
    /// Wraps a handler result.
    #[must_use]
    pub const fn ok(payload: Value) -> Self {
        Self::Ok(payload)
    }

    /// Builds an error reply from any dispatch failure.
    #[must_use]
    pub fn from_error(error: &DispatchError) -> Self {
        Self::Error(error.to_payload())
    }

    /// Returns `true` for success replies.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Wire value of the `status` field.
    #[must_use]
    pub const fn status(&self) -> &'static str {
        match self {
            Self::Ok(_) => "ok",
            Self::Error(_) => "error",
        }
    }

    /// Error details, if this is an error reply.
    #[must_use]
    pub const fn error(&self) -> Option<&ErrorPayload> {
        match self {
            Self::Ok(_) => None,
            Self::Error(payload) => Some(payload),
        }
    }
}
