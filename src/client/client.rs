//! Orchestrating client composing the limiter, retry policy, and cache

use super::headers;
use super::stats::{AtomicClientStats, StatsSnapshot};
use super::types::ApiResponse;
use crate::cache::{CacheKey, IntegrityCache};
use crate::config::{ClientConfig, KeyPlacement};
use crate::error::{ApiClientError, Result};
use crate::limiter::TokenBucketLimiter;
use crate::retry::{ErrorKind, RetryPolicy};
use reqwest::StatusCode;
use std::sync::atomic::Ordering;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Resilient JSON API client
///
/// One instance is shared by every concurrent caller; the limiter, cache,
/// and statistics it composes are internally synchronized. Each client
/// owns its limiter, so independent clients never share rate state.
pub struct ApiClient {
    config: ClientConfig,
    http: reqwest::Client,
    limiter: TokenBucketLimiter,
    policy: RetryPolicy,
    cache: IntegrityCache,
    stats: AtomicClientStats,
}

/// One successful network attempt
struct FetchOutcome {
    payload: Vec<u8>,
    status: u16,
}

impl ApiClient {
    /// Build a client from configuration
    ///
    /// All parameter validation happens here; a constructed client cannot
    /// fail later for configuration reasons.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.http.timeout())
            .user_agent(&config.http.user_agent)
            .build()
            .map_err(|e| ApiClientError::Config(format!("failed to build HTTP client: {}", e)))?;

        let limiter = TokenBucketLimiter::new(&config.rate_limit)?;
        let policy = RetryPolicy::new(&config.retry)?;
        let cache = IntegrityCache::new(&config.cache.dir)?;

        info!(
            "client ready: {} rpm toward {}",
            config.rate_limit.effective_rpm(),
            config.base_url
        );

        Ok(Self {
            config,
            http,
            limiter,
            policy,
            cache,
            stats: AtomicClientStats::default(),
        })
    }

    /// Fetch `endpoint` with the given query parameters
    ///
    /// Sequence: cache lookup (a hit consumes no rate-limit token), then
    /// permit acquisition, then the network attempt with retries. A retry
    /// is a fresh request from the limiter's perspective and re-acquires
    /// a token. Cache write failures are logged and absorbed; data that
    /// arrived from the network always reaches the caller.
    pub async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<ApiResponse> {
        self.stats.requests.fetch_add(1, Ordering::Relaxed);

        let cache_key = CacheKey::new(endpoint, params);
        if self.config.cache.enabled {
            if let Some(payload) = self.cache.get(&cache_key) {
                self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
                debug!("cache hit for {}", endpoint);
                return Ok(ApiResponse {
                    payload,
                    status: StatusCode::OK.as_u16(),
                    attempts: 0,
                    from_cache: true,
                });
            }
            self.stats.cache_misses.fetch_add(1, Ordering::Relaxed);
        }

        let url = self.endpoint_url(endpoint);
        let mut attempt: u32 = 0;

        loop {
            self.limiter
                .acquire(1, self.config.rate_limit.acquire_timeout())
                .await?;

            self.stats.network_calls.fetch_add(1, Ordering::Relaxed);
            match self.attempt_fetch(&url, params).await {
                Ok(outcome) => {
                    if self.config.cache.enabled {
                        if let Err(e) =
                            self.cache
                                .put(&cache_key, &outcome.payload, self.config.cache.ttl())
                        {
                            warn!("cache write failed: {}", e);
                        }
                    }
                    return Ok(ApiResponse {
                        payload: outcome.payload,
                        status: outcome.status,
                        attempts: attempt + 1,
                        from_cache: false,
                    });
                }
                Err((kind, error)) => {
                    if self.policy.should_retry(&kind, attempt) {
                        let delay = self.policy.delay_for(&kind, attempt);
                        warn!(
                            "attempt {} for {} failed ({}), retrying in {:?}",
                            attempt + 1,
                            endpoint,
                            error,
                            delay
                        );
                        self.stats.retries.fetch_add(1, Ordering::Relaxed);
                        sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(match kind {
                        ErrorKind::Client { .. } => error,
                        _ => ApiClientError::RetriesExhausted {
                            attempts: attempt + 1,
                            last: Box::new(error),
                        },
                    });
                }
            }
        }
    }

    /// One network attempt; failures come back classified for the policy
    async fn attempt_fetch(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> std::result::Result<FetchOutcome, (ErrorKind, ApiClientError)> {
        let mut request = self.http.get(url).query(params);
        if let Some(api_key) = &self.config.auth.api_key {
            request = match self.config.auth.placement {
                KeyPlacement::Header => {
                    request.header(self.config.auth.header_name.as_str(), api_key.as_str())
                }
                KeyPlacement::Query => {
                    request.query(&[(self.config.auth.query_param.as_str(), api_key.as_str())])
                }
            };
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Err((ErrorKind::from_transport(&e), ApiClientError::Http(e))),
        };

        let status = response.status();
        if let Some(snapshot) = headers::rate_limit_snapshot(response.headers()) {
            self.limiter.update_from_headers(snapshot);
        }

        if status.is_success() {
            let payload = match response.bytes().await {
                Ok(bytes) => bytes.to_vec(),
                Err(e) => return Err((ErrorKind::Network, ApiClientError::Http(e))),
            };
            return Ok(FetchOutcome {
                payload,
                status: status.as_u16(),
            });
        }

        let retry_after = headers::retry_after(response.headers());
        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        let kind = ErrorKind::from_status(status, retry_after).unwrap_or(ErrorKind::Client {
            status: status.as_u16(),
        });
        let error = match &kind {
            ErrorKind::RateLimited { .. } => {
                ApiClientError::RateLimit(format!("HTTP 429: {}", message))
            }
            ErrorKind::Server { status } => ApiClientError::Server {
                status: *status,
                message,
            },
            ErrorKind::Client { status } => ApiClientError::Client {
                status: *status,
                message,
            },
            ErrorKind::Network => ApiClientError::Network(message),
        };
        Err((kind, error))
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Combined statistics snapshot
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.limiter.stats(), self.cache.stats())
    }

    /// The limiter governing this client's request pacing
    pub fn limiter(&self) -> &TokenBucketLimiter {
        &self.limiter
    }

    /// The disk cache backing this client
    pub fn cache(&self) -> &IntegrityCache {
        &self.cache
    }

    /// Configuration this client was built from
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string()
    } else {
        body.chars().take(200).collect()
    }
}
