//! Blocking token-bucket limiter shared by concurrent callers

use super::bucket::TokenBucket;
use super::types::{AtomicLimiterStats, LimiterStats, ServerRateSnapshot};
use crate::config::{PacingMode, RateLimitConfig};
use crate::error::{ApiClientError, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

/// Token-bucket rate limiter with blocking acquisition
///
/// One limiter instance is shared by every caller of a client. The mutex
/// covers only the read-modify-write of bucket state; waiting for
/// replenishment happens outside it, so lock hold time is O(1) no matter
/// how long any caller sleeps.
pub struct TokenBucketLimiter {
    bucket: Mutex<TokenBucket>,
    stats: AtomicLimiterStats,
    snapshot: Mutex<Option<ServerRateSnapshot>>,
    /// Refill rate derived from configuration; adaptive pacing never goes
    /// below 10% of this and never above it
    configured_rate: f64,
    warn_threshold: f64,
    pacing: PacingMode,
    /// Latched while the server-reported budget is below the warn
    /// threshold, so each depletion episode warns once
    low_budget: AtomicBool,
}

impl TokenBucketLimiter {
    /// Create a limiter from configuration
    ///
    /// Fails with a configuration error when the derived rate or burst
    /// capacity is not positive.
    pub fn new(config: &RateLimitConfig) -> Result<Self> {
        let rate = config.effective_rpm() as f64 / 60.0;
        let capacity = config.burst_capacity() as f64;
        let bucket = TokenBucket::new(capacity, rate, Instant::now())?;

        Ok(Self {
            bucket: Mutex::new(bucket),
            stats: AtomicLimiterStats::default(),
            snapshot: Mutex::new(None),
            configured_rate: rate,
            warn_threshold: config.warn_threshold,
            pacing: config.pacing,
            low_budget: AtomicBool::new(false),
        })
    }

    /// Block until `n` tokens are available or `timeout` elapses
    ///
    /// A caller that times out has deducted nothing.
    pub async fn acquire(&self, n: u32, timeout: Duration) -> Result<()> {
        self.stats.total_requests.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();
        let deadline = start + timeout;
        let need = n as f64;
        let mut waited = false;

        loop {
            // Keep the critical section to the bucket arithmetic only.
            let wait = {
                let mut bucket = self.bucket.lock();
                let now = Instant::now();
                if bucket.try_acquire(need, now) {
                    break;
                }
                bucket.wait_for(need, now)
            };

            let now = Instant::now();
            if now >= deadline {
                self.stats.timeouts.fetch_add(1, Ordering::Relaxed);
                return Err(ApiClientError::RateLimitTimeout {
                    waited: now.duration_since(start),
                });
            }
            if !waited {
                waited = true;
                self.stats.blocked_waits.fetch_add(1, Ordering::Relaxed);
                debug!("rate limiter saturated, waiting up to {:?}", wait);
            }
            sleep(wait.min(deadline.duration_since(now))).await;
        }

        if waited {
            let wait_ms = start.elapsed().as_millis() as u64;
            self.stats.total_wait_ms.fetch_add(wait_ms, Ordering::Relaxed);
        }
        Ok(())
    }

    /// Consume `n` tokens if immediately available
    pub fn try_acquire(&self, n: u32) -> bool {
        self.stats.total_requests.fetch_add(1, Ordering::Relaxed);
        self.bucket.lock().try_acquire(n as f64, Instant::now())
    }

    /// Record advisory server feedback
    ///
    /// Warns once per depletion episode when the remaining budget falls
    /// below the configured fraction of the reported limit. Never reduces
    /// burst capacity: a misbehaving or stale header must not starve
    /// legitimate local traffic.
    pub fn update_from_headers(&self, snapshot: ServerRateSnapshot) {
        *self.snapshot.lock() = Some(snapshot);

        if snapshot.limit > 0 {
            let low = (snapshot.remaining as f64) < self.warn_threshold * snapshot.limit as f64;
            if low {
                if !self.low_budget.swap(true, Ordering::Relaxed) {
                    self.stats.warnings.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        "server rate budget low: {}/{} remaining",
                        snapshot.remaining, snapshot.limit
                    );
                }
            } else {
                self.low_budget.store(false, Ordering::Relaxed);
            }
        }

        if self.pacing == PacingMode::Adaptive {
            self.apply_adaptive_pacing(&snapshot);
        }
    }

    /// Slow the local refill toward the server-observed rate
    ///
    /// Clamped to [10% of configured rate, configured rate]; capacity is
    /// never touched.
    fn apply_adaptive_pacing(&self, snapshot: &ServerRateSnapshot) {
        let Some(reset_epoch) = snapshot.reset_epoch else {
            return;
        };
        let now_epoch = chrono::Utc::now().timestamp().max(0) as u64;
        let window = reset_epoch.saturating_sub(now_epoch);
        let observed = if window == 0 {
            0.0
        } else {
            snapshot.remaining as f64 / window as f64
        };

        let floor = self.configured_rate * 0.1;
        let target = observed.clamp(floor, self.configured_rate);
        self.bucket.lock().set_refill_rate(target, Instant::now());
        debug!("adaptive pacing: refill rate set to {:.3} tokens/sec", target);
    }

    /// Statistics snapshot
    pub fn stats(&self) -> LimiterStats {
        self.stats.snapshot()
    }

    /// Latest server-reported budget, if any response carried one
    pub fn server_snapshot(&self) -> Option<ServerRateSnapshot> {
        *self.snapshot.lock()
    }

    /// Current token balance
    pub fn available(&self) -> f64 {
        self.bucket.lock().available(Instant::now())
    }

    /// Burst ceiling
    pub fn capacity(&self) -> f64 {
        self.bucket.lock().capacity()
    }
}
