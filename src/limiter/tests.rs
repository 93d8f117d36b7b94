use super::*;
use crate::config::{PacingMode, RateLimitConfig};
use crate::error::ApiClientError;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn config(rpm: u32, burst: u32) -> RateLimitConfig {
    RateLimitConfig {
        requests_per_minute: Some(rpm),
        burst: Some(burst),
        ..Default::default()
    }
}

fn limiter(rpm: u32, burst: u32) -> TokenBucketLimiter {
    TokenBucketLimiter::new(&config(rpm, burst)).unwrap()
}

// ==================== Construction ====================

#[tokio::test]
async fn rejects_zero_rate_at_construction() {
    let result = TokenBucketLimiter::new(&config(0, 10));
    assert!(matches!(result, Err(ApiClientError::Config(_))));
}

#[tokio::test]
async fn rejects_zero_burst_at_construction() {
    let result = TokenBucketLimiter::new(&config(60, 0));
    assert!(matches!(result, Err(ApiClientError::Config(_))));
}

// ==================== Burst and blocking ====================

#[tokio::test(start_paused = true)]
async fn burst_capacity_then_blocks_for_next_token() {
    // 240 rpm is 4 tokens/sec; a full bucket grants 240 immediately and
    // the 241st caller waits roughly a quarter second.
    let limiter = limiter(240, 240);

    for i in 0..240 {
        assert!(limiter.try_acquire(1), "acquisition {} should succeed", i);
    }
    assert!(!limiter.try_acquire(1));

    let start = Instant::now();
    limiter
        .acquire(1, Duration::from_secs(5))
        .await
        .expect("acquisition should succeed after replenishment");
    let waited = start.elapsed();
    assert!(
        waited >= Duration::from_millis(240) && waited <= Duration::from_millis(400),
        "expected ~250ms wait, got {:?}",
        waited
    );

    let stats = limiter.stats();
    assert_eq!(stats.blocked_waits, 1);
    assert!(stats.total_wait_ms >= 240);
}

#[tokio::test(start_paused = true)]
async fn no_over_issuance_under_concurrency() {
    // 1 rpm makes replenishment negligible within the test window.
    let limiter = Arc::new(limiter(1, 5));

    let mut handles = Vec::new();
    for _ in 0..20 {
        let limiter = Arc::clone(&limiter);
        handles.push(tokio::spawn(async move { limiter.try_acquire(1) }));
    }

    let mut granted = 0;
    for handle in handles {
        if handle.await.unwrap() {
            granted += 1;
        }
    }
    assert_eq!(granted, 5);

    // The rest block rather than over-issue.
    let result = limiter.acquire(1, Duration::from_millis(500)).await;
    assert!(matches!(
        result,
        Err(ApiClientError::RateLimitTimeout { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn replenishes_to_capacity_and_no_further() {
    let limiter = limiter(240, 240);
    for _ in 0..240 {
        assert!(limiter.try_acquire(1));
    }

    // capacity / rate elapsed: full again, and over-waiting does not
    // overfill.
    tokio::time::advance(Duration::from_secs(60)).await;
    assert!((limiter.available() - 240.0).abs() < 1e-6);

    tokio::time::advance(Duration::from_secs(600)).await;
    assert!(limiter.available() <= 240.0 + 1e-9);
}

// ==================== Timeout semantics ====================

#[tokio::test(start_paused = true)]
async fn timed_out_caller_deducts_nothing() {
    let limiter = limiter(60, 1);
    assert!(limiter.try_acquire(1));

    let start = Instant::now();
    let result = limiter.acquire(1, Duration::from_millis(300)).await;
    assert!(matches!(
        result,
        Err(ApiClientError::RateLimitTimeout { waited }) if waited >= Duration::from_millis(300)
    ));
    assert!(start.elapsed() < Duration::from_millis(400));

    // The abandoned wait consumed no tokens: ~0.3 tokens accrued during it.
    let available = limiter.available();
    assert!(
        (available - 0.3).abs() < 0.05,
        "expected ~0.3 tokens, got {}",
        available
    );

    // A patient caller gets the token once replenishment completes.
    limiter.acquire(1, Duration::from_secs(2)).await.unwrap();

    let stats = limiter.stats();
    assert_eq!(stats.timeouts, 1);
    assert_eq!(stats.blocked_waits, 2);
}

#[tokio::test(start_paused = true)]
async fn zero_timeout_succeeds_only_when_tokens_are_free() {
    let limiter = limiter(60, 1);
    limiter.acquire(1, Duration::ZERO).await.unwrap();

    let result = limiter.acquire(1, Duration::ZERO).await;
    assert!(matches!(
        result,
        Err(ApiClientError::RateLimitTimeout { .. })
    ));
}

// ==================== Server feedback ====================

#[tokio::test]
async fn records_latest_server_snapshot() {
    let limiter = limiter(60, 60);
    assert!(limiter.server_snapshot().is_none());

    let snapshot = ServerRateSnapshot {
        limit: 1000,
        remaining: 900,
        reset_epoch: Some(1_900_000_000),
    };
    limiter.update_from_headers(snapshot);
    assert_eq!(limiter.server_snapshot(), Some(snapshot));
}

#[tokio::test]
async fn warns_once_per_depletion_episode() {
    let limiter = limiter(60, 60);

    limiter.update_from_headers(ServerRateSnapshot {
        limit: 100,
        remaining: 5,
        reset_epoch: None,
    });
    limiter.update_from_headers(ServerRateSnapshot {
        limit: 100,
        remaining: 4,
        reset_epoch: None,
    });
    assert_eq!(limiter.stats().warnings, 1);

    // Budget recovers, then depletes again: a fresh warning.
    limiter.update_from_headers(ServerRateSnapshot {
        limit: 100,
        remaining: 80,
        reset_epoch: None,
    });
    limiter.update_from_headers(ServerRateSnapshot {
        limit: 100,
        remaining: 3,
        reset_epoch: None,
    });
    assert_eq!(limiter.stats().warnings, 2);
}

#[tokio::test(start_paused = true)]
async fn warn_only_feedback_never_changes_pacing() {
    let limiter = limiter(60, 60);
    for _ in 0..60 {
        assert!(limiter.try_acquire(1));
    }

    limiter.update_from_headers(ServerRateSnapshot {
        limit: 60,
        remaining: 0,
        reset_epoch: Some(chrono::Utc::now().timestamp() as u64 + 60),
    });

    // Still refilling at the configured 1 token/sec.
    tokio::time::advance(Duration::from_secs(10)).await;
    let available = limiter.available();
    assert!(
        (available - 10.0).abs() < 0.05,
        "expected ~10 tokens, got {}",
        available
    );
}

#[tokio::test(start_paused = true)]
async fn feedback_never_reduces_capacity() {
    let limiter = limiter(60, 60);
    limiter.update_from_headers(ServerRateSnapshot {
        limit: 10,
        remaining: 0,
        reset_epoch: None,
    });

    tokio::time::advance(Duration::from_secs(600)).await;
    assert!((limiter.available() - 60.0).abs() < 1e-6);
    assert!((limiter.capacity() - 60.0).abs() < f64::EPSILON);
}

// ==================== Adaptive pacing ====================

#[tokio::test(start_paused = true)]
async fn adaptive_pacing_clamps_to_rate_floor() {
    let mut cfg = config(60, 60);
    cfg.pacing = PacingMode::Adaptive;
    let limiter = TokenBucketLimiter::new(&cfg).unwrap();
    for _ in 0..60 {
        assert!(limiter.try_acquire(1));
    }

    // Exhausted server budget: refill drops to the 10% floor, not zero.
    limiter.update_from_headers(ServerRateSnapshot {
        limit: 60,
        remaining: 0,
        reset_epoch: Some(chrono::Utc::now().timestamp() as u64 + 60),
    });

    tokio::time::advance(Duration::from_secs(10)).await;
    let available = limiter.available();
    assert!(
        (available - 1.0).abs() < 0.05,
        "expected ~1 token at floor rate, got {}",
        available
    );
}

#[tokio::test(start_paused = true)]
async fn adaptive_pacing_never_exceeds_configured_rate() {
    let mut cfg = config(60, 60);
    cfg.pacing = PacingMode::Adaptive;
    let limiter = TokenBucketLimiter::new(&cfg).unwrap();
    for _ in 0..60 {
        assert!(limiter.try_acquire(1));
    }

    // A generous server budget must not speed up the local limiter.
    limiter.update_from_headers(ServerRateSnapshot {
        limit: 1_000_000,
        remaining: 1_000_000,
        reset_epoch: Some(chrono::Utc::now().timestamp() as u64 + 10),
    });

    tokio::time::advance(Duration::from_secs(5)).await;
    let available = limiter.available();
    assert!(
        (available - 5.0).abs() < 0.05,
        "expected ~5 tokens at configured rate, got {}",
        available
    );
}
