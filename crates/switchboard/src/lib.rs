//! Request/reply dispatcher for a single-socket service.
//!
//! The [`dispatch`] module is the core: it validates decoded requests, routes
//! them by their `type` field to a registered handler, and wraps every outcome
//! in a uniform `{status, payload}` reply. It performs no I/O and never lets a
//! failure escape.
//!
//! Around the core the crate ships the pieces the `switchboard` binary needs:
//! structured [`telemetry`], a handful of [`builtin`] handlers, and a JSONL
//! [`serve`] loop that answers one reply per request line.

pub mod builtin;
pub mod dispatch;
pub mod serve;
pub mod telemetry;

use std::io::{BufRead, Write};
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use switchboard_config::{Config, OrthoConfig, OrthoError};

use crate::dispatch::{Dispatcher, HandlerRegistry, RegistryError, RequiredFields};
use crate::serve::{ServeError, ServeSummary};
use crate::telemetry::TelemetryError;

pub use crate::dispatch::{DispatchError, HandlerError, Reply, Request};

/// Errors that end a `switchboard` run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {0}")]
    Configuration(#[source] Arc<OrthoError>),
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {0}")]
    Telemetry(#[from] TelemetryError),
    /// The handler registry could not be built.
    #[error("failed to build handler registry: {0}")]
    Registry(#[from] RegistryError),
    /// The serving loop stopped on an I/O failure.
    #[error("serving failed: {0}")]
    Serve(#[from] ServeError),
}

/// Builds a dispatcher over `registry` using the configured required fields.
#[must_use]
pub fn build_dispatcher(config: &Config, registry: HandlerRegistry) -> Dispatcher {
    let required_fields: RequiredFields = config.required_fields().iter().cloned().collect();
    Dispatcher::new(registry, required_fields)
}

/// Serves builtin handlers over the given streams using a resolved
/// configuration.
///
/// # Errors
///
/// Returns a [`RunError`] if telemetry cannot be initialised or the streams
/// fail.
pub fn run_with<R, W>(config: &Config, input: R, output: W) -> Result<ServeSummary, RunError>
where
    R: BufRead,
    W: Write,
{
    telemetry::initialise(config)?;
    let dispatcher = build_dispatcher(config, builtin::registry()?);
    info!(
        tags = ?dispatcher.registry(),
        required_fields = ?config.required_fields(),
        "serving requests"
    );
    serve::serve_lines(input, output, &dispatcher, config.max_request_bytes())
        .map_err(RunError::from)
}

/// Loads configuration from the process environment and serves stdin to
/// stdout.
///
/// # Errors
///
/// Returns a [`RunError`] on configuration, telemetry, or I/O failure.
pub fn run() -> Result<ServeSummary, RunError> {
    let config = Config::load().map_err(RunError::Configuration)?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_with(&config, stdin.lock(), stdout.lock())
}

#[cfg(test)]
mod tests;
