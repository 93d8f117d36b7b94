//! Token-bucket rate limiting
//!
//! Enforces a requests-per-minute ceiling with burst capacity. The bucket
//! arithmetic lives in a pure struct; the async limiter wraps it with a
//! mutex whose hold time is O(1), sleeping outside the critical section.

mod bucket;
pub mod limiter;
pub mod types;

#[cfg(test)]
mod tests;

pub use limiter::TokenBucketLimiter;
pub use types::{LimiterStats, ServerRateSnapshot};
