//! Genreal error types

use std::time::Duration;

/// Genreal error types
#[derive(Debug, thiserror::Error)]
pub enum GenrealError {
    // Client errors
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    // Upstream errors
    #[error("upstream timed out after {0:?}")]
    Timeout(Duration),

    /// The upstream answered with a non-2xx status.
    #[error("upstream error ({status}): {status_text}")]
    Upstream {
        status: u16,
        status_text: String,
        body: serde_json::Value,
    },

    /// No response was received (connection refused, DNS, reset).
    #[error("upstream unreachable: {0}")]
    Unreachable(String),

    #[error("HTTP error: {0}")]
    Http(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GenrealError {
    /// Classify a reqwest error raised while sending or reading a request.
    ///
    /// `timeout` is the deadline that was configured for the call, reported
    /// back in [`GenrealError::Timeout`].
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            GenrealError::Timeout(timeout)
        } else if err.is_builder() {
            GenrealError::Http(err.to_string())
        } else if let Some(status) = err.status() {
            GenrealError::Upstream {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                body: serde_json::Value::Null,
            }
        } else {
            GenrealError::Unreachable(err.to_string())
        }
    }
}

/// Result type alias for Genreal operations
pub type Result<T> = std::result::Result<T, GenrealError>;
