//! Handlers shipped with the `switchboard` binary.

use serde_json::Value;

use crate::dispatch::{HandlerError, HandlerRegistry, RegistryError};

/// Tag of the identity handler.
pub const ECHO: &str = "echo";
/// Tag of the liveness handler.
pub const PING: &str = "ping";

/// Returns the payload unchanged.
///
/// # Errors
///
/// Never fails.
pub fn echo(payload: &Value) -> Result<Value, HandlerError> {
    Ok(payload.clone())
}

/// Answers `"pong"` regardless of payload.
///
/// # Errors
///
/// Never fails.
pub fn ping(_payload: &Value) -> Result<Value, HandlerError> {
    Ok(Value::from("pong"))
}

/// Registry holding every builtin handler.
///
/// # Errors
///
/// Returns a [`RegistryError`] only if two builtins share a tag.
pub fn registry() -> Result<HandlerRegistry, RegistryError> {
    Ok(HandlerRegistry::builder()
        .register(ECHO, echo)?
        .register(PING, ping)?
        .build())
}
