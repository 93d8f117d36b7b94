//! Error handling for the access layer
//!
//! This module defines all error types surfaced by the client. Cache and
//! statistics failures are absorbed by the orchestrator and only logged;
//! rate-limit and terminal errors propagate to callers as typed variants.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for the access layer
pub type Result<T> = std::result::Result<T, ApiClientError>;

/// Main error type for the access layer
#[derive(Error, Debug)]
pub enum ApiClientError {
    /// Configuration errors, raised at construction time
    #[error("Configuration error: {0}")]
    Config(String),

    /// The rate-limit acquisition deadline expired before a permit was issued
    #[error("Rate limit acquisition timed out after {waited:?}")]
    RateLimitTimeout {
        /// How long the caller waited before giving up
        waited: Duration,
    },

    /// All retry attempts were exhausted
    #[error("Retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Total network attempts performed
        attempts: u32,
        /// The last underlying failure
        last: Box<ApiClientError>,
    },

    /// Terminal client error (HTTP 4xx other than 429), never retried
    #[error("Client error (HTTP {status}): {message}")]
    Client {
        /// HTTP status code
        status: u16,
        /// Response body or status description
        message: String,
    },

    /// Server error (HTTP 5xx)
    #[error("Server error (HTTP {status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Response body or status description
        message: String,
    },

    /// The remote service reported its rate limit was exceeded (HTTP 429)
    #[error("Rate limit exceeded upstream: {0}")]
    RateLimit(String),

    /// Transport-level errors
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Network errors not tied to a reqwest error value
    #[error("Network error: {0}")]
    Network(String),

    /// Cache read/write errors; absorbed by the orchestrator, never fatal
    #[error("Cache error: {0}")]
    Cache(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_attempt_count() {
        let err = ApiClientError::RetriesExhausted {
            attempts: 5,
            last: Box::new(ApiClientError::Server {
                status: 503,
                message: "unavailable".to_string(),
            }),
        };
        let text = err.to_string();
        assert!(text.contains("5 attempts"));
        assert!(text.contains("503"));
    }

    #[test]
    fn client_error_display() {
        let err = ApiClientError::Client {
            status: 404,
            message: "no such record".to_string(),
        };
        assert_eq!(err.to_string(), "Client error (HTTP 404): no such record");
    }
}
