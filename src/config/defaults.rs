//! Default value functions for configuration

use std::path::PathBuf;

pub fn default_true() -> bool {
    true
}

pub fn default_max_attempts() -> u32 {
    5
}

pub fn default_base_delay_ms() -> u64 {
    1000
}

pub fn default_max_delay_ms() -> u64 {
    60_000
}

pub fn default_acquire_timeout_secs() -> u64 {
    30
}

pub fn default_warn_threshold() -> f64 {
    0.1
}

pub fn default_cache_dir() -> PathBuf {
    PathBuf::from(".recordgate-cache")
}

pub fn default_cache_ttl_secs() -> u64 {
    604_800
}

pub fn default_timeout_secs() -> u64 {
    30
}

pub fn default_user_agent() -> String {
    format!("recordgate/{}", env!("CARGO_PKG_VERSION"))
}

pub fn default_api_key_header() -> String {
    "X-Api-Key".to_string()
}

pub fn default_api_key_param() -> String {
    "api_key".to_string()
}
