//! Content-addressed cache keys

use sha2::{Digest, Sha256};
use std::fmt;

/// Deterministic digest of an endpoint and its normalized parameter set
///
/// Parameters are sorted before hashing, so the same logical request maps
/// to the same entry regardless of argument order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for a request
    pub fn new(endpoint: &str, params: &[(&str, &str)]) -> Self {
        let mut sorted: Vec<(&str, &str)> = params.to_vec();
        sorted.sort_unstable();

        let mut hasher = Sha256::new();
        hasher.update(endpoint.as_bytes());
        for (name, value) in &sorted {
            // NUL separators keep ("ab", "c") distinct from ("a", "bc").
            hasher.update([0u8]);
            hasher.update(name.as_bytes());
            hasher.update([0u8]);
            hasher.update(value.as_bytes());
        }
        Self(hex::encode(hasher.finalize()))
    }

    /// Hex digest used as the on-disk file stem
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
