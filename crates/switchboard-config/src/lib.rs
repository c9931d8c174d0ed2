//! Shared configuration for the switchboard dispatcher.
//!
//! Configuration is layered by [`ortho_config`]: built-in defaults, then an
//! optional configuration file, then `SWITCHBOARD_*` environment variables,
//! and finally command-line flags. Later layers win.
//!
//! The dispatcher only consumes the resolved [`Config`]; it never reads the
//! environment itself.

mod defaults;
mod logging;

use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_MAX_REQUEST_BYTES, DEFAULT_REQUIRED_FIELDS, default_log_filter,
    default_log_filter_string, default_log_format, default_max_request_bytes,
    default_required_fields,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use ortho_config::{OrthoConfig, OrthoError};

/// Resolved runtime configuration for the dispatcher binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "SWITCHBOARD")]
pub struct Config {
    /// `tracing` filter expression applied to emitted events.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for log events.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Ordered names of fields every request must carry.
    ///
    /// The highest-precedence layer that sets the list replaces it whole, so
    /// the configured order is the check order.
    #[serde(default = "default_required_fields")]
    #[ortho_config(default = default_required_fields(), merge_strategy = "replace")]
    pub required_fields: Vec<String>,
    /// Largest request line the serving loop accepts, in bytes.
    #[serde(default = "default_max_request_bytes")]
    #[ortho_config(default = default_max_request_bytes())]
    pub max_request_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            required_fields: default_required_fields(),
            max_request_bytes: default_max_request_bytes(),
        }
    }
}

impl Config {
    /// Filter expression for the telemetry subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Output format for the telemetry subscriber.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Required field names in configured order.
    #[must_use]
    pub fn required_fields(&self) -> &[String] {
        &self.required_fields
    }

    /// Request size limit for the serving loop.
    #[must_use]
    pub const fn max_request_bytes(&self) -> usize {
        self.max_request_bytes
    }
}
