//! Limiter statistics and server feedback types

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Advisory snapshot of the server-reported rate budget, refreshed from
/// `X-RateLimit-*` response headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServerRateSnapshot {
    /// Server-reported request ceiling for the current window
    pub limit: u64,
    /// Server-reported remaining budget
    pub remaining: u64,
    /// Unix timestamp at which the budget resets, when reported
    pub reset_epoch: Option<u64>,
}

/// Lock-free counters updated on the acquisition hot path
#[derive(Debug, Default)]
pub(crate) struct AtomicLimiterStats {
    /// Permit requests issued (blocking and non-blocking)
    pub total_requests: AtomicU64,
    /// Acquisitions that had to wait for replenishment
    pub blocked_waits: AtomicU64,
    /// Cumulative time spent waiting, in milliseconds
    pub total_wait_ms: AtomicU64,
    /// Acquisitions abandoned at their deadline
    pub timeouts: AtomicU64,
    /// Low-budget warnings issued from server feedback
    pub warnings: AtomicU64,
}

impl AtomicLimiterStats {
    /// Create a snapshot of current stats
    pub fn snapshot(&self) -> LimiterStats {
        LimiterStats {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            blocked_waits: self.blocked_waits.load(Ordering::Relaxed),
            total_wait_ms: self.total_wait_ms.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            warnings: self.warnings.load(Ordering::Relaxed),
        }
    }
}

/// Limiter statistics snapshot (returned to callers)
#[derive(Debug, Default, Clone, Serialize)]
pub struct LimiterStats {
    /// Permit requests issued (blocking and non-blocking)
    pub total_requests: u64,
    /// Acquisitions that had to wait for replenishment
    pub blocked_waits: u64,
    /// Cumulative time spent waiting, in milliseconds
    pub total_wait_ms: u64,
    /// Acquisitions abandoned at their deadline
    pub timeouts: u64,
    /// Low-budget warnings issued from server feedback
    pub warnings: u64,
}

impl LimiterStats {
    /// Cumulative time spent waiting for permits
    pub fn total_wait(&self) -> Duration {
        Duration::from_millis(self.total_wait_ms)
    }
}
