//! Token bucket state and arithmetic
//!
//! The bucket holds up to `capacity` tokens and refills continuously at
//! `refill_rate` tokens per second. Clock readings are passed in by the
//! caller, so the arithmetic is testable without sleeping.

use crate::error::{ApiClientError, Result};
use std::time::Duration;
use tokio::time::Instant;

/// Token bucket state
///
/// Invariant: `0.0 <= tokens <= capacity` after every operation.
#[derive(Debug)]
pub(crate) struct TokenBucket {
    /// Maximum tokens the bucket can hold (burst ceiling)
    capacity: f64,
    /// Current available tokens
    tokens: f64,
    /// Tokens added per second
    refill_rate: f64,
    /// Clock reading of the last balance update
    last_refill: Instant,
}

impl TokenBucket {
    /// Create a full bucket
    ///
    /// Invalid parameters are a configuration error reported here, never a
    /// failure deferred to first use.
    pub fn new(capacity: f64, refill_rate: f64, now: Instant) -> Result<Self> {
        if !capacity.is_finite() || capacity <= 0.0 {
            return Err(ApiClientError::Config(format!(
                "bucket capacity must be positive, got {}",
                capacity
            )));
        }
        if !refill_rate.is_finite() || refill_rate <= 0.0 {
            return Err(ApiClientError::Config(format!(
                "refill rate must be positive, got {}",
                refill_rate
            )));
        }
        Ok(Self {
            capacity,
            tokens: capacity,
            refill_rate,
            last_refill: now,
        })
    }

    /// Credit tokens for the time elapsed since the last update
    fn refill(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.last_refill);
        if elapsed.is_zero() {
            return;
        }
        let credit = elapsed.as_secs_f64() * self.refill_rate;
        self.tokens = (self.tokens + credit).min(self.capacity);
        self.last_refill = now;
    }

    /// Consume `n` tokens if available. Non-blocking.
    pub fn try_acquire(&mut self, n: f64, now: Instant) -> bool {
        self.refill(now);
        if self.tokens >= n {
            self.tokens -= n;
            true
        } else {
            false
        }
    }

    /// How long until `n` tokens are available, assuming no other consumer
    pub fn wait_for(&mut self, n: f64, now: Instant) -> Duration {
        self.refill(now);
        let deficit = n - self.tokens;
        if deficit <= 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(deficit / self.refill_rate)
        }
    }

    /// Current balance
    pub fn available(&mut self, now: Instant) -> f64 {
        self.refill(now);
        self.tokens
    }

    /// Burst ceiling
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Current refill rate (tokens per second)
    pub fn refill_rate(&self) -> f64 {
        self.refill_rate
    }

    /// Change the refill rate, crediting elapsed time at the old rate first.
    /// Non-positive rates are ignored; capacity is untouched.
    pub fn set_refill_rate(&mut self, rate: f64, now: Instant) {
        if !rate.is_finite() || rate <= 0.0 {
            return;
        }
        self.refill(now);
        self.refill_rate = rate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(base: Instant, secs: f64) -> Instant {
        base + Duration::from_secs_f64(secs)
    }

    #[test]
    fn starts_full() {
        let t0 = Instant::now();
        let mut bucket = TokenBucket::new(10.0, 5.0, t0).unwrap();
        assert!((bucket.available(t0) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_invalid_parameters() {
        let t0 = Instant::now();
        assert!(TokenBucket::new(0.0, 1.0, t0).is_err());
        assert!(TokenBucket::new(-1.0, 1.0, t0).is_err());
        assert!(TokenBucket::new(10.0, 0.0, t0).is_err());
        assert!(TokenBucket::new(10.0, -4.0, t0).is_err());
        assert!(TokenBucket::new(f64::NAN, 1.0, t0).is_err());
    }

    #[test]
    fn acquire_depletes_then_denies() {
        let t0 = Instant::now();
        let mut bucket = TokenBucket::new(3.0, 1.0, t0).unwrap();
        assert!(bucket.try_acquire(1.0, t0));
        assert!(bucket.try_acquire(1.0, t0));
        assert!(bucket.try_acquire(1.0, t0));
        assert!(!bucket.try_acquire(1.0, t0));
    }

    #[test]
    fn refills_at_configured_rate() {
        let t0 = Instant::now();
        let mut bucket = TokenBucket::new(10.0, 4.0, t0).unwrap();
        assert!(bucket.try_acquire(10.0, t0));

        // 0.5s at 4 tokens/sec credits 2 tokens.
        assert!((bucket.available(at(t0, 0.5)) - 2.0).abs() < 1e-9);
        assert!(bucket.try_acquire(2.0, at(t0, 0.5)));
        assert!(!bucket.try_acquire(1.0, at(t0, 0.5)));
    }

    #[test]
    fn refill_caps_at_capacity() {
        let t0 = Instant::now();
        let mut bucket = TokenBucket::new(5.0, 100.0, t0).unwrap();
        bucket.try_acquire(5.0, t0);
        assert!((bucket.available(at(t0, 3600.0)) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn replenishes_exactly_to_capacity_from_empty() {
        let t0 = Instant::now();
        let mut bucket = TokenBucket::new(240.0, 4.0, t0).unwrap();
        assert!(bucket.try_acquire(240.0, t0));

        // capacity / rate seconds later the bucket is full again.
        let full_at = at(t0, 240.0 / 4.0);
        assert!((bucket.available(full_at) - 240.0).abs() < 1e-6);
    }

    #[test]
    fn balance_stays_within_bounds() {
        let t0 = Instant::now();
        let mut bucket = TokenBucket::new(4.0, 2.0, t0).unwrap();
        let mut clock = 0.0;
        for step in 0..200 {
            clock += 0.05 * (step % 7) as f64;
            let now = at(t0, clock);
            bucket.try_acquire((step % 3) as f64, now);
            let balance = bucket.available(now);
            assert!((0.0..=4.0).contains(&balance), "balance {} out of bounds", balance);
        }
    }

    #[test]
    fn wait_for_reports_deficit_time() {
        let t0 = Instant::now();
        let mut bucket = TokenBucket::new(10.0, 2.0, t0).unwrap();
        assert_eq!(bucket.wait_for(1.0, t0), Duration::ZERO);

        bucket.try_acquire(10.0, t0);
        // 5 tokens at 2 tokens/sec is a 2.5s wait.
        let wait = bucket.wait_for(5.0, t0);
        assert!((wait.as_secs_f64() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn rate_change_credits_elapsed_time_first() {
        let t0 = Instant::now();
        let mut bucket = TokenBucket::new(10.0, 2.0, t0).unwrap();
        bucket.try_acquire(10.0, t0);

        // 1s at the old rate earns 2 tokens before the switch.
        bucket.set_refill_rate(8.0, at(t0, 1.0));
        assert!((bucket.available(at(t0, 1.0)) - 2.0).abs() < 1e-9);

        // Another second at the new rate earns 8 more.
        assert!((bucket.available(at(t0, 2.0)) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn non_positive_rate_change_is_ignored() {
        let t0 = Instant::now();
        let mut bucket = TokenBucket::new(10.0, 2.0, t0).unwrap();
        bucket.set_refill_rate(0.0, t0);
        assert!((bucket.refill_rate() - 2.0).abs() < f64::EPSILON);
    }
}
