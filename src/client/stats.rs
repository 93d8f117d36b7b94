//! Client statistics

use crate::cache::CacheStats;
use crate::limiter::LimiterStats;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters updated as requests progress
#[derive(Debug, Default)]
pub(crate) struct AtomicClientStats {
    /// Logical requests received from callers
    pub requests: AtomicU64,
    /// Requests served from the disk cache
    pub cache_hits: AtomicU64,
    /// Requests that had to go to the network
    pub cache_misses: AtomicU64,
    /// Network attempts performed, retries included
    pub network_calls: AtomicU64,
    /// Attempts that were retried
    pub retries: AtomicU64,
}

impl AtomicClientStats {
    /// Assemble the combined snapshot
    pub fn snapshot(&self, limiter: LimiterStats, cache: CacheStats) -> StatsSnapshot {
        StatsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            network_calls: self.network_calls.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            limiter,
            cache,
        }
    }
}

/// Combined statistics snapshot
///
/// Enough for an operator to tell "slow because throttled" (limiter waits)
/// from "slow because retrying" (retries) from "fast because cached"
/// (cache hits).
#[derive(Debug, Default, Clone, Serialize)]
pub struct StatsSnapshot {
    /// Logical requests received from callers
    pub requests: u64,
    /// Requests served from the disk cache
    pub cache_hits: u64,
    /// Requests that had to go to the network
    pub cache_misses: u64,
    /// Network attempts performed, retries included
    pub network_calls: u64,
    /// Attempts that were retried
    pub retries: u64,
    /// Rate limiter counters
    pub limiter: LimiterStats,
    /// Disk cache counters
    pub cache: CacheStats,
}
