//! Rate limiting configuration types

use super::defaults::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Named requests-per-minute presets matching the remote service's tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateTier {
    /// Anonymous access
    #[default]
    Unauthenticated,
    /// Keyed access, higher ceiling
    Authenticated,
}

impl RateTier {
    /// Requests per minute granted by this tier
    pub fn requests_per_minute(self) -> u32 {
        match self {
            RateTier::Unauthenticated => 60,
            RateTier::Authenticated => 240,
        }
    }
}

/// How server rate-limit feedback is applied to local pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacingMode {
    /// Record header snapshots and warn when the remaining budget runs low
    #[default]
    WarnOnly,
    /// Additionally slow the local refill toward the server-observed rate.
    /// Never reduces burst capacity, and never drops the refill rate below
    /// 10% of the configured rate.
    Adaptive,
}

/// Rate limiter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Rate tier preset
    #[serde(default)]
    pub tier: RateTier,
    /// Explicit requests-per-minute override; takes precedence over `tier`
    #[serde(default)]
    pub requests_per_minute: Option<u32>,
    /// Burst ceiling in tokens; defaults to one minute's worth of requests
    #[serde(default)]
    pub burst: Option<u32>,
    /// How long a request may wait for a permit before failing
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
    /// Warn when the server-reported remaining budget drops below this
    /// fraction of the reported limit
    #[serde(default = "default_warn_threshold")]
    pub warn_threshold: f64,
    /// Pacing strategy for server feedback
    #[serde(default)]
    pub pacing: PacingMode,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            tier: RateTier::default(),
            requests_per_minute: None,
            burst: None,
            acquire_timeout_secs: default_acquire_timeout_secs(),
            warn_threshold: default_warn_threshold(),
            pacing: PacingMode::default(),
        }
    }
}

impl RateLimitConfig {
    /// The requests-per-minute ceiling in effect
    pub fn effective_rpm(&self) -> u32 {
        self.requests_per_minute
            .unwrap_or_else(|| self.tier.requests_per_minute())
    }

    /// The burst ceiling in effect
    pub fn burst_capacity(&self) -> u32 {
        self.burst.unwrap_or_else(|| self.effective_rpm())
    }

    /// Permit acquisition deadline
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}
