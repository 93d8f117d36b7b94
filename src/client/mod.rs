//! Orchestrating API client
//!
//! For each logical request: cache lookup, rate-limit permit acquisition,
//! the network call, the retry loop on failure, and cache/limiter state
//! updates on completion.

pub mod client;
mod headers;
pub mod stats;
pub mod types;


pub use client::ApiClient;
pub use stats::StatsSnapshot;
pub use types::ApiResponse;
