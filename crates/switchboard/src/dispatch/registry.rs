//! Immutable handler registry keyed by validated type-tags.
//!
//! Handlers are registered through [`RegistryBuilder`] and frozen by
//! [`RegistryBuilder::build`]. The resulting [`HandlerRegistry`] has no
//! mutation API, so the set of supported request types is fixed for the
//! lifetime of the dispatcher that owns it.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use super::errors::HandlerError;

/// Processes the payload of one request type.
///
/// Implementations may be invoked from several threads at once.
pub trait Handler: Send + Sync {
    /// Transforms a payload into a result.
    ///
    /// # Errors
    ///
    /// Returns a [`HandlerError`] whose kind and message are passed through to
    /// the error reply unchanged.
    fn handle(&self, payload: &Value) -> Result<Value, HandlerError>;
}

impl<F> Handler for F
where
    F: Fn(&Value) -> Result<Value, HandlerError> + Send + Sync,
{
    fn handle(&self, payload: &Value) -> Result<Value, HandlerError> {
        self(payload)
    }
}

/// Pins a closure to the handler signature so its types can be inferred.
pub const fn handler_fn<F>(handler: F) -> F
where
    F: Fn(&Value) -> Result<Value, HandlerError> + Send + Sync,
{
    handler
}

/// Errors raised while building a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Tag is empty or carries surrounding whitespace.
    #[error("invalid type tag '{tag}': tags must be non-empty and unpadded")]
    InvalidTag {
        /// Rejected tag.
        tag: String,
    },
    /// A handler is already registered under this tag.
    #[error("duplicate handler for type tag '{tag}'")]
    DuplicateTag {
        /// Tag registered twice.
        tag: String,
    },
}

/// Validated request type-tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeTag(String);

impl TypeTag {
    /// Validates a tag.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidTag` for empty or whitespace-padded
    /// values, since such tags could never be matched reliably.
    pub fn new(value: impl Into<String>) -> Result<Self, RegistryError> {
        let tag = value.into();
        if tag.is_empty() || tag.trim() != tag {
            return Err(RegistryError::InvalidTag { tag });
        }
        Ok(Self(tag))
    }

    /// Tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TypeTag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accumulates handlers before freezing them into a [`HandlerRegistry`].
#[derive(Default)]
pub struct RegistryBuilder {
    handlers: BTreeMap<TypeTag, Arc<dyn Handler>>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under a tag.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidTag` for malformed tags and
    /// `RegistryError::DuplicateTag` when the tag is already taken.
    pub fn register(
        mut self,
        tag: &str,
        handler: impl Handler + 'static,
    ) -> Result<Self, RegistryError> {
        let tag = TypeTag::new(tag)?;
        if self.handlers.contains_key(&tag) {
            return Err(RegistryError::DuplicateTag { tag: tag.0 });
        }
        self.handlers.insert(tag, Arc::new(handler));
        Ok(self)
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry {
            handlers: self.handlers,
        }
    }
}

/// Immutable mapping from type-tag to handler.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<TypeTag, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    /// Starts building a registry.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Handler registered under `tag`.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&dyn Handler> {
        self.handlers.get(tag).map(|handler| &**handler)
    }

    /// Returns `true` if a handler is registered under `tag`.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.handlers.contains_key(tag)
    }

    /// Registered tags in sorted order.
    pub fn tags(&self) -> impl Iterator<Item = &TypeTag> {
        self.handlers.keys()
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}
