//! Retry decisions and backoff arithmetic
//!
//! The policy is a pure decision type: classification and delay math only,
//! no I/O. The orchestrator consults it between attempts, so the retry
//! state machine is unit-testable without provoking real failures.

use crate::config::RetryConfig;
use crate::error::{ApiClientError, Result};
use reqwest::StatusCode;
use std::time::Duration;

/// Classified failure of one network attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transient transport failure (timeout, connection reset)
    Network,
    /// HTTP 429; may carry the server-requested delay
    RateLimited {
        /// Parsed `Retry-After` value, when the response carried one
        retry_after: Option<Duration>,
    },
    /// HTTP 5xx
    Server {
        /// HTTP status code
        status: u16,
    },
    /// Any other non-success status; terminal, never retried
    Client {
        /// HTTP status code
        status: u16,
    },
}

impl ErrorKind {
    /// Classify an HTTP status code; `None` for success statuses
    pub fn from_status(status: StatusCode, retry_after: Option<Duration>) -> Option<Self> {
        if status.is_success() {
            return None;
        }
        Some(match status.as_u16() {
            429 => ErrorKind::RateLimited { retry_after },
            s if (500..=599).contains(&s) => ErrorKind::Server { status: s },
            s => ErrorKind::Client { status: s },
        })
    }

    /// Classify a transport-level failure
    pub fn from_transport(_err: &reqwest::Error) -> Self {
        ErrorKind::Network
    }

    /// Whether this failure kind is worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::Network | ErrorKind::RateLimited { .. } | ErrorKind::Server { .. }
        )
    }
}

/// Exponential backoff with jitter and a bounded attempt budget
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy from configuration
    pub fn new(config: &RetryConfig) -> Result<Self> {
        if config.max_attempts == 0 {
            return Err(ApiClientError::Config(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if config.base_delay_ms == 0 {
            return Err(ApiClientError::Config(
                "base_delay_ms must be greater than 0".to_string(),
            ));
        }
        if config.max_delay_ms < config.base_delay_ms {
            return Err(ApiClientError::Config(
                "max_delay_ms must not be smaller than base_delay_ms".to_string(),
            ));
        }
        Ok(Self {
            max_attempts: config.max_attempts,
            base_delay: config.base_delay(),
            max_delay: config.max_delay(),
        })
    }

    /// Maximum total network attempts for one logical request
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Un-jittered backoff for an attempt: `base * 2^attempt`, capped at
    /// the configured maximum
    pub fn unjittered_delay(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as f64;
        let exponential = base_ms * 2f64.powi(attempt.min(1024) as i32);
        let capped = exponential.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    /// Jittered backoff delay, uniform in [0.5x, 1.0x] of the un-jittered
    /// value, so synchronized callers spread out
    pub fn next_delay(&self, attempt: u32) -> Duration {
        let factor = 0.5 + 0.5 * rand::random::<f64>();
        self.unjittered_delay(attempt).mul_f64(factor)
    }

    /// Whether another attempt should follow the failure of `attempt`
    /// (zero-based)
    pub fn should_retry(&self, kind: &ErrorKind, attempt: u32) -> bool {
        kind.is_retryable() && attempt + 1 < self.max_attempts
    }

    /// Delay before the next attempt
    ///
    /// A server-provided `Retry-After` overrides the computed backoff for
    /// that one attempt.
    pub fn delay_for(&self, kind: &ErrorKind, attempt: u32) -> Duration {
        if let ErrorKind::RateLimited {
            retry_after: Some(delay),
        } = kind
        {
            return *delay;
        }
        self.next_delay(attempt)
    }
}

/// Parse a `Retry-After` value: integer seconds or an HTTP-date
///
/// Unparseable values yield `None`, falling back to computed backoff
/// rather than failing the request.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    if let Ok(when) = chrono::DateTime::parse_from_rfc2822(value) {
        let delta = when.with_timezone(&chrono::Utc) - chrono::Utc::now();
        return Some(delta.to_std().unwrap_or(Duration::ZERO));
    }
    None
}
