//! API credential configuration
//!
//! The key is attached to every request as a header or query parameter.
//! It is sourced from the settings file or the `RECORDGATE_API_KEY`
//! environment variable, and is never logged or echoed.

use super::defaults::*;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

/// Environment variable consulted when the settings file carries no key
pub const API_KEY_ENV: &str = "RECORDGATE_API_KEY";

/// Where the API key is attached on each request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPlacement {
    /// Sent as a request header
    #[default]
    Header,
    /// Sent as a query parameter
    Query,
}

/// API credential configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// The API key; `RECORDGATE_API_KEY` is consulted when absent
    #[serde(default)]
    pub api_key: Option<String>,
    /// Where the key is attached
    #[serde(default)]
    pub placement: KeyPlacement,
    /// Header name used when `placement` is `header`
    #[serde(default = "default_api_key_header")]
    pub header_name: String,
    /// Query parameter name used when `placement` is `query`
    #[serde(default = "default_api_key_param")]
    pub query_param: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            placement: KeyPlacement::default(),
            header_name: default_api_key_header(),
            query_param: default_api_key_param(),
        }
    }
}

// The key must never leak through Debug output or logs.
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("placement", &self.placement)
            .field("header_name", &self.header_name)
            .field("query_param", &self.query_param)
            .finish()
    }
}

impl AuthConfig {
    /// Fill the key from the environment when the settings file has none
    pub fn fill_from_env(&mut self) {
        if self.api_key.is_none() {
            if let Ok(key) = env::var(API_KEY_ENV) {
                if !key.is_empty() {
                    self.api_key = Some(key);
                }
            }
        }
    }
}
