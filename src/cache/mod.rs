//! Integrity-checked response cache
//!
//! Responses are stored content-addressed on disk, each entry carrying a
//! checksum recomputed on every read. Any anomaly — missing file,
//! checksum mismatch, undecodable envelope, elapsed TTL — degrades to a
//! miss rather than an error, so a damaged cache can slow the client down
//! but never break it.

pub mod key;
pub mod store;
pub mod types;


pub use key::CacheKey;
pub use store::IntegrityCache;
pub use types::CacheStats;
