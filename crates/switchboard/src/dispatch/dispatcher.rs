//! Validation-then-routing dispatcher.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;
use tracing::{debug, warn};

use super::errors::DispatchError;
use super::registry::{Handler, HandlerRegistry};
use super::reply::Reply;
use super::request::Request;
use super::validator::{RequiredFields, Validator};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Routes requests to registered handlers and wraps the outcome in a [`Reply`].
///
/// The dispatcher holds only construction-time state, so a shared reference
/// can serve concurrent callers without locking. Handlers must tolerate
/// concurrent invocation themselves.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: HandlerRegistry,
    validator: Validator,
}

impl Dispatcher {
    /// Creates a dispatcher over a frozen registry.
    #[must_use]
    pub fn new(registry: HandlerRegistry, required_fields: RequiredFields) -> Self {
        let validator = Validator::new(required_fields, registry.tags().cloned());
        Self {
            registry,
            validator,
        }
    }

    /// Registered handlers.
    #[must_use]
    pub const fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Validator applied before routing.
    #[must_use]
    pub const fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Validates and routes a request, always producing exactly one reply.
    ///
    /// Validation failures, handler errors and handler panics all become
    /// error replies; nothing propagates to the caller.
    pub fn dispatch(&self, request: &Request) -> Reply {
        match self.try_dispatch(request) {
            Ok(payload) => Reply::ok(payload),
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    kind = error.kind(),
                    %error,
                    "dispatch failed"
                );
                Reply::from_error(&error)
            }
        }
    }

    fn try_dispatch(&self, request: &Request) -> Result<Value, DispatchError> {
        let route = self.validator.check(request)?;
        let handler = self
            .registry
            .get(route.tag)
            .ok_or_else(|| DispatchError::unrecognized_type(route.tag))?;

        debug!(target: DISPATCH_TARGET, tag = route.tag, "routing request");
        invoke(route.tag, handler, route.payload)
    }
}

/// Runs a handler, turning both returned errors and panics into
/// [`DispatchError`]s.
fn invoke(tag: &str, handler: &dyn Handler, payload: &Value) -> Result<Value, DispatchError> {
    match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(payload))) {
        Ok(result) => result.map_err(DispatchError::from),
        Err(panic) => Err(DispatchError::handler_panicked(
            tag,
            panic_message(panic.as_ref()),
        )),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("handler panicked")
    }
}
