//! Checksum-verified, TTL-bound persistent store

use super::key::CacheKey;
use super::types::{AtomicCacheStats, CacheStats, StoredEntry};
use crate::error::{ApiClientError, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Content-addressed disk cache with integrity checking
///
/// Entries are immutable once written; a refresh is a whole-file atomic
/// replace. Readers never take a lock: the temp-file-then-rename write
/// discipline means a concurrent `get` observes either the complete old
/// entry or the complete new one.
pub struct IntegrityCache {
    dir: PathBuf,
    stats: AtomicCacheStats,
}

impl IntegrityCache {
    /// Open a cache rooted at `dir`, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            ApiClientError::Cache(format!("failed to create cache dir {:?}: {}", dir, e))
        })?;
        Ok(Self {
            dir,
            stats: AtomicCacheStats::default(),
        })
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_hex()))
    }

    /// Look up an entry
    ///
    /// An entry is served only when its stored checksum matches a freshly
    /// computed digest of the payload and its TTL has not elapsed.
    /// Absence, unreadable files, corruption, and expiry all degrade to a
    /// miss; corrupted entries are deleted so they are not re-read on
    /// every lookup.
    pub fn get(&self, key: &CacheKey) -> Option<Vec<u8>> {
        let path = self.entry_path(key);
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
            Err(e) => {
                warn!("cache entry {:?} unreadable: {}", path, e);
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        let entry: StoredEntry = match serde_json::from_slice(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("cache entry {:?} undecodable: {}", path, e);
                self.discard_corrupt(&path);
                return None;
            }
        };

        let payload = match BASE64.decode(entry.payload.as_bytes()) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("cache entry {:?} has malformed payload encoding: {}", path, e);
                self.discard_corrupt(&path);
                return None;
            }
        };

        let digest = hex::encode(Sha256::digest(&payload));
        if digest != entry.checksum {
            warn!("cache entry {:?} failed checksum verification", path);
            self.discard_corrupt(&path);
            return None;
        }

        if entry.is_expired(Utc::now()) {
            // Intact but stale; left in place for the next overwrite.
            debug!("cache entry {:?} expired", path);
            self.stats.expired.fetch_add(1, Ordering::Relaxed);
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        self.stats.hits.fetch_add(1, Ordering::Relaxed);
        Some(payload)
    }

    fn discard_corrupt(&self, path: &Path) {
        self.stats.corruption_evictions.fetch_add(1, Ordering::Relaxed);
        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        if let Err(e) = fs::remove_file(path) {
            warn!("failed to remove corrupted cache entry {:?}: {}", path, e);
        }
    }

    /// Store an entry
    ///
    /// The envelope is written to a temp file in the cache directory and
    /// renamed into place, so no reader ever observes a partial write.
    /// Failures are reported to the caller but must never abort the
    /// request whose response was being cached.
    pub fn put(&self, key: &CacheKey, payload: &[u8], ttl: Duration) -> Result<()> {
        let entry = StoredEntry {
            checksum: hex::encode(Sha256::digest(payload)),
            created_at: Utc::now(),
            ttl_secs: ttl.as_secs(),
            payload: BASE64.encode(payload),
        };
        let bytes = match serde_json::to_vec(&entry) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.stats.write_failures.fetch_add(1, Ordering::Relaxed);
                return Err(ApiClientError::Cache(format!(
                    "failed to encode cache entry: {}",
                    e
                )));
            }
        };

        let path = self.entry_path(key);
        let tmp = self
            .dir
            .join(format!(".{}.{:08x}.tmp", key.as_hex(), rand::random::<u32>()));
        let written = fs::write(&tmp, &bytes).and_then(|_| fs::rename(&tmp, &path));
        if let Err(e) = written {
            self.stats.write_failures.fetch_add(1, Ordering::Relaxed);
            let _ = fs::remove_file(&tmp);
            return Err(ApiClientError::Cache(format!(
                "failed to write cache entry {:?}: {}",
                path, e
            )));
        }

        debug!("cached {} bytes under {}", payload.len(), key);
        Ok(())
    }

    /// Remove one entry; removing an absent entry is not an error
    pub fn invalidate(&self, key: &CacheKey) -> Result<()> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ApiClientError::Cache(format!(
                "failed to invalidate cache entry: {}",
                e
            ))),
        }
    }

    /// Remove every entry
    pub fn clear(&self) -> Result<()> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| ApiClientError::Cache(format!("failed to list cache dir: {}", e)))?;
        for dir_entry in entries {
            let dir_entry = dir_entry
                .map_err(|e| ApiClientError::Cache(format!("failed to list cache dir: {}", e)))?;
            let path = dir_entry.path();
            if path.is_file() {
                fs::remove_file(&path).map_err(|e| {
                    ApiClientError::Cache(format!("failed to remove {:?}: {}", path, e))
                })?;
            }
        }
        info!("cache cleared");
        Ok(())
    }

    /// Delete expired entries eagerly, returning how many were removed
    ///
    /// Expiry is otherwise checked lazily on read; this sweep exists for
    /// callers that want to bound disk usage.
    pub fn purge_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let mut removed = 0;
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| ApiClientError::Cache(format!("failed to list cache dir: {}", e)))?;
        for dir_entry in entries {
            let Ok(dir_entry) = dir_entry else { continue };
            let path = dir_entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Ok(raw) = fs::read(&path) else { continue };
            let Ok(entry) = serde_json::from_slice::<StoredEntry>(&raw) else {
                continue;
            };
            if entry.is_expired(now) && fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
        if removed > 0 {
            info!("purged {} expired cache entries", removed);
        }
        Ok(removed)
    }

    /// Statistics snapshot
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// Cache directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
