//! Rate-limit response header parsing
//!
//! Header names are matched case-insensitively by the header map itself.

use crate::limiter::ServerRateSnapshot;
use crate::retry::parse_retry_after;
use reqwest::header::HeaderMap;
use std::time::Duration;

const LIMIT: &str = "x-ratelimit-limit";
const REMAINING: &str = "x-ratelimit-remaining";
const RESET: &str = "x-ratelimit-reset";
const RETRY_AFTER: &str = "retry-after";

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

/// Extract the advisory rate budget, when the response carries one
pub(crate) fn rate_limit_snapshot(headers: &HeaderMap) -> Option<ServerRateSnapshot> {
    let limit = header_u64(headers, LIMIT)?;
    let remaining = header_u64(headers, REMAINING)?;
    Some(ServerRateSnapshot {
        limit,
        remaining,
        reset_epoch: header_u64(headers, RESET),
    })
}

/// Extract the server-requested retry delay, when present and parseable
pub(crate) fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    parse_retry_after(headers.get(RETRY_AFTER)?.to_str().ok()?)
}
