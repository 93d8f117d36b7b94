//! Configuration management for the access layer
//!
//! This module handles loading and validation of client configuration from
//! a YAML settings file or from the environment.

pub mod auth;
pub mod cache;
pub mod defaults;
pub mod http;
pub mod rate_limit;
pub mod retry;


pub use auth::{API_KEY_ENV, AuthConfig, KeyPlacement};
pub use cache::CacheConfig;
pub use http::HttpConfig;
pub use rate_limit::{PacingMode, RateLimitConfig, RateTier};
pub use retry::RetryConfig;

use crate::error::{ApiClientError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::{debug, info};

/// Environment variable naming the remote service's base URL
pub const BASE_URL_ENV: &str = "RECORDGATE_BASE_URL";

/// Top-level client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the remote JSON API
    pub base_url: String,
    /// Credential configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// Local rate limiting
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Retry/backoff behavior
    #[serde(default)]
    pub retry: RetryConfig,
    /// Response disk cache
    #[serde(default)]
    pub cache: CacheConfig,
    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,
}

impl ClientConfig {
    /// Create a configuration with defaults for everything but the base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth: AuthConfig::default(),
            rate_limit: RateLimitConfig::default(),
            retry: RetryConfig::default(),
            cache: CacheConfig::default(),
            http: HttpConfig::default(),
        }
    }

    /// Load configuration from a YAML settings file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ApiClientError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config: ClientConfig = serde_yaml::from_str(&content)
            .map_err(|e| ApiClientError::Config(format!("Failed to parse config: {}", e)))?;

        config.auth.fill_from_env();
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let base_url = env::var(BASE_URL_ENV).map_err(|_| {
            ApiClientError::Config(format!("{} environment variable not set", BASE_URL_ENV))
        })?;

        let mut config = Self::new(base_url);
        config.auth.fill_from_env();
        config.validate()?;
        Ok(config)
    }

    /// Check every construction-time invariant
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| ApiClientError::Config(format!("Invalid base URL: {}", e)))?;
        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(ApiClientError::Config(format!(
                    "Unsupported URL scheme '{}'. Only http and https are supported",
                    scheme
                )));
            }
        }

        if self.rate_limit.effective_rpm() == 0 {
            return Err(ApiClientError::Config(
                "requests_per_minute must be greater than 0".to_string(),
            ));
        }
        if self.rate_limit.burst_capacity() == 0 {
            return Err(ApiClientError::Config(
                "burst capacity must be greater than 0".to_string(),
            ));
        }
        if self.rate_limit.acquire_timeout_secs == 0 {
            return Err(ApiClientError::Config(
                "acquire_timeout_secs must be greater than 0".to_string(),
            ));
        }
        let threshold = self.rate_limit.warn_threshold;
        if !threshold.is_finite() || threshold <= 0.0 || threshold > 1.0 {
            return Err(ApiClientError::Config(
                "warn_threshold must be within (0, 1]".to_string(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(ApiClientError::Config(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.retry.base_delay_ms == 0 {
            return Err(ApiClientError::Config(
                "base_delay_ms must be greater than 0".to_string(),
            ));
        }
        if self.retry.max_delay_ms < self.retry.base_delay_ms {
            return Err(ApiClientError::Config(
                "max_delay_ms must not be smaller than base_delay_ms".to_string(),
            ));
        }

        if self.cache.enabled {
            if self.cache.ttl_secs == 0 {
                return Err(ApiClientError::Config(
                    "cache ttl_secs must be greater than 0".to_string(),
                ));
            }
            if self.cache.dir.as_os_str().is_empty() {
                return Err(ApiClientError::Config(
                    "cache dir must not be empty".to_string(),
                ));
            }
        }

        if self.http.timeout_secs == 0 {
            return Err(ApiClientError::Config(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.http.user_agent.is_empty() {
            return Err(ApiClientError::Config(
                "user_agent must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
