//! Cache entry envelope and statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// On-disk entry envelope
///
/// One JSON document per entry: payload bytes are base64-embedded next to
/// their checksum and expiry inputs, so the whole entry lands in a single
/// atomic rename and there is never a metadata/payload pair to tear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredEntry {
    /// SHA-256 hex digest of the raw payload bytes
    pub checksum: String,
    /// Write timestamp
    pub created_at: DateTime<Utc>,
    /// Time-to-live in seconds
    pub ttl_secs: u64,
    /// Base64-encoded payload bytes
    pub payload: String,
}

impl StoredEntry {
    /// Whether the entry has aged out
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let ttl = chrono::Duration::seconds(self.ttl_secs.min(i64::MAX as u64) as i64);
        now >= self.created_at + ttl
    }
}

/// Lock-free counters updated on the lookup hot path
#[derive(Debug, Default)]
pub(crate) struct AtomicCacheStats {
    /// Verified, unexpired lookups
    pub hits: AtomicU64,
    /// Lookups that found nothing usable
    pub misses: AtomicU64,
    /// Misses caused by expiry
    pub expired: AtomicU64,
    /// Entries deleted after failing verification
    pub corruption_evictions: AtomicU64,
    /// Writes that failed and were absorbed
    pub write_failures: AtomicU64,
}

impl AtomicCacheStats {
    /// Create a snapshot of current stats
    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            corruption_evictions: self.corruption_evictions.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
        }
    }
}

/// Cache statistics snapshot (returned to callers)
#[derive(Debug, Default, Clone, Serialize)]
pub struct CacheStats {
    /// Verified, unexpired lookups
    pub hits: u64,
    /// Lookups that found nothing usable
    pub misses: u64,
    /// Misses caused by expiry
    pub expired: u64,
    /// Entries deleted after failing verification
    pub corruption_evictions: u64,
    /// Writes that failed and were absorbed
    pub write_failures: u64,
}

impl CacheStats {
    /// Fraction of lookups served from disk
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
