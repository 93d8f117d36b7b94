//! Client-facing response types

use crate::error::Result;
use serde::de::DeserializeOwned;

/// Response returned by [`ApiClient::get`](super::ApiClient::get)
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Raw response body bytes
    pub payload: Vec<u8>,
    /// HTTP status of the successful attempt (200 for cache hits)
    pub status: u16,
    /// Network attempts performed (0 for cache hits)
    pub attempts: u32,
    /// Whether the payload was served from the disk cache
    pub from_cache: bool,
}

impl ApiResponse {
    /// Deserialize the payload as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.payload)?)
    }

    /// Payload as text, with invalid UTF-8 replaced
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}
