use crate::logging::LogFormat;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Fields every request must carry unless the configuration says otherwise.
pub const DEFAULT_REQUIRED_FIELDS: &[&str] = &["type", "payload"];

/// Largest request line accepted by the serving loop, in bytes.
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 1024 * 1024;

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Owned copy of [`DEFAULT_REQUIRED_FIELDS`].
#[must_use]
pub fn default_required_fields() -> Vec<String> {
    DEFAULT_REQUIRED_FIELDS
        .iter()
        .map(|field| (*field).to_owned())
        .collect()
}

/// Default request size limit for the serving loop.
#[must_use]
pub const fn default_max_request_bytes() -> usize {
    DEFAULT_MAX_REQUEST_BYTES
}
