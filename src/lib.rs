//! # recordgate
//!
//! Resilient access layer for rate-limited, occasionally-unreliable JSON
//! APIs. Three pieces compose into one client:
//!
//! - **Token-bucket rate limiting**: a requests-per-minute ceiling with
//!   burst capacity, enforced locally before any request leaves the
//!   process. Callers block (with a deadline) rather than hammer the
//!   remote service.
//! - **Retry with jittered exponential backoff**: transient network
//!   failures, HTTP 429, and HTTP 5xx are retried on a capped, jittered
//!   schedule; a server-provided `Retry-After` always wins. Other 4xx
//!   responses are terminal.
//! - **Integrity-checked disk cache**: responses are stored
//!   content-addressed with a SHA-256 checksum verified on every read.
//!   Corruption, unreadable entries, and elapsed TTLs degrade to cache
//!   misses, never errors.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use recordgate::{ApiClient, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_file("config/recordgate.yaml").await?;
//!     let client = ApiClient::new(config)?;
//!
//!     let response = client
//!         .get("records/search", &[("q", "effluent limits"), ("page", "1")])
//!         .await?;
//!     println!("{}", response.text());
//!
//!     // Enough to tell throttle-slow from retry-slow from cache-fast.
//!     eprintln!("{:?}", client.stats());
//!     Ok(())
//! }
//! ```
//!
//! Every concurrent caller shares one [`ApiClient`]; its limiter, cache,
//! and statistics are internally synchronized. Rate limiting is
//! per-process: each client owns the limiter it is constructed with.

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod limiter;
pub mod retry;

// Re-export the main types
pub use cache::{CacheKey, CacheStats, IntegrityCache};
pub use client::{ApiClient, ApiResponse, StatsSnapshot};
pub use config::{
    AuthConfig, CacheConfig, ClientConfig, HttpConfig, KeyPlacement, PacingMode, RateLimitConfig,
    RateTier, RetryConfig,
};
pub use error::{ApiClientError, Result};
pub use limiter::{LimiterStats, ServerRateSnapshot, TokenBucketLimiter};
pub use retry::{ErrorKind, RetryPolicy};
