//! Error types for cursor-harvest
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! The variants fall into four families, which the harvest driver treats
//! differently:
//! - configuration errors are fatal before any request is made
//! - transport errors abort the page loop and trigger the emergency export
//! - decode errors on a page body are handled like transport errors
//! - output errors are surfaced to the operator and never retried

use std::time::Duration;
use thiserror::Error;

/// The main error type for cursor-harvest
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing credential: environment variable {variable} is not set")]
    MissingCredential { variable: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus {
        status: u16,
        body: String,
        /// Server-requested wait from a `Retry-After` header
        retry_after: Option<Duration>,
    },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    // ============================================================================
    // Export Errors
    // ============================================================================
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Output error: {message}")]
    Output { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing credential error
    pub fn missing_credential(variable: impl Into<String>) -> Self {
        Self::MissingCredential {
            variable: variable.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
            retry_after: None,
        }
    }

    /// Attach a server-requested wait to an HTTP status error
    #[must_use]
    pub fn with_retry_after(mut self, wait: Option<Duration>) -> Self {
        if let Self::HttpStatus { retry_after, .. } = &mut self {
            *retry_after = wait;
        }
        self
    }

    /// Wait requested by the server before retrying, if any
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::HttpStatus { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(e) => e.is_connect() || e.is_timeout(),
            Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }

    /// Check if this error came from the page transport
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Http(_)
                | Error::HttpStatus { .. }
                | Error::Timeout { .. }
        )
    }

    /// Check if this error is a fatal configuration problem
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::Config { .. }
                | Error::MissingCredential { .. }
                | Error::InvalidConfigValue { .. }
                | Error::YamlParse(_)
                | Error::InvalidUrl(_)
        )
    }
}

/// Check if an HTTP status code is worth retrying
///
/// Rate limiting, gateway/availability faults and the Cloudflare 52x
/// family (origin unreachable or timed out).
pub fn is_retryable_status(status: u16) -> bool {
    matches!(
        status,
        429 | 500 | 502 | 503 | 504 | 520 | 521 | 522 | 523 | 524
    )
}

/// Result type alias for cursor-harvest
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_credential("JWT_TOKEN");
        assert_eq!(
            err.to_string(),
            "Missing credential: environment variable JWT_TOKEN is not set"
        );

        let err = Error::http_status(404, "Not found");
        assert_eq!(err.to_string(), "HTTP 404: Not found");
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::Timeout { timeout_ms: 1000 }.is_retryable());
        assert!(Error::http_status(429, "").is_retryable());
        assert!(Error::http_status(500, "").is_retryable());
        assert!(Error::http_status(503, "").is_retryable());
        assert!(Error::http_status(522, "").is_retryable());
        assert!(Error::http_status(524, "").is_retryable());

        assert!(!Error::http_status(400, "").is_retryable());
        assert!(!Error::http_status(401, "").is_retryable());
        assert!(!Error::http_status(404, "").is_retryable());
        assert!(!Error::http_status(501, "").is_retryable());
        assert!(!Error::config("test").is_retryable());
    }

    #[test]
    fn test_retry_after_only_on_status_errors() {
        let err = Error::http_status(429, "slow down").with_retry_after(Some(Duration::from_secs(2)));
        assert_eq!(err.retry_after(), Some(Duration::from_secs(2)));
        assert_eq!(err.to_string(), "HTTP 429: slow down");

        let err = Error::decode("bad").with_retry_after(Some(Duration::from_secs(2)));
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn test_error_families() {
        assert!(Error::http_status(502, "bad gateway").is_transport());
        assert!(Error::Timeout { timeout_ms: 10 }.is_transport());
        assert!(!Error::decode("garbage").is_transport());

        assert!(Error::missing_credential("JWT_TOKEN").is_config());
        assert!(Error::invalid_value("page_size", "must be positive").is_config());
        assert!(!Error::output("disk full").is_config());
    }
}
