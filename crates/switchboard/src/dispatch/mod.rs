//! Request validation and type-tag dispatch.
//!
//! A [`Dispatcher`] receives a decoded [`Request`], checks it with its
//! [`Validator`], routes it by the `type` field to a handler from an immutable
//! [`HandlerRegistry`], and wraps the outcome in a [`Reply`].
//!
//! ## Envelope
//!
//! Successful requests produce:
//!
//! ```json
//! {"status":"ok","payload":"hi"}
//! ```
//!
//! Every failure, whether validation, a handler error or a handler panic,
//! produces an error envelope with a machine-readable kind:
//!
//! ```json
//! {"status":"error","payload":{"kind":"MissingRequiredField","message":"request is missing required field 'type'"}}
//! ```
//!
//! ## Check order
//!
//! Configured required fields are checked in configured order before the
//! `type` lookup, so the reported error is deterministic.

mod dispatcher;
mod errors;
mod registry;
mod reply;
mod request;
mod validator;

pub(crate) use self::dispatcher::DISPATCH_TARGET;
pub use self::dispatcher::Dispatcher;
pub use self::errors::{
    DispatchError, HANDLER_PANICKED, HandlerError, MALFORMED_REQUEST, MISSING_REQUIRED_FIELD,
    REQUEST_TOO_LARGE, UNRECOGNIZED_TYPE,
};
pub use self::registry::{
    Handler, HandlerRegistry, RegistryBuilder, RegistryError, TypeTag, handler_fn,
};
pub use self::reply::{ErrorPayload, Reply};
pub use self::request::{PAYLOAD_FIELD, Request, TYPE_FIELD};
pub use self::validator::{RequiredFields, Validator};
