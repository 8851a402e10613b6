//! Per-IP rate limiting through the full middleware stack.
//!
//! Run with: `cargo test -p venuehub-api --test rate_limit_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use helpers::{relaxed_limits, setup_test_app_with_limits};
use serde_json::{json, Value};
use std::time::Duration;
use venuehub_core::{RateLimitRule, RateLimitSettings};

fn strict_auth() -> RateLimitSettings {
    RateLimitSettings {
        auth: RateLimitRule::new(2, 900),
        ..relaxed_limits()
    }
}

#[tokio::test]
async fn test_auth_limit_rejects_third_attempt() {
    let app = setup_test_app_with_limits(strict_auth()).await;
    let client = app.client();
    let login = json!({ "email": "nobody@venuehub.test", "password": "WrongPass123!" });

    for _ in 0..2 {
        let response = client.post("/api/auth/login").json(&login).await;
        assert_eq!(response.status_code(), 401);
        assert_eq!(response.headers()["x-ratelimit-limit"], "2");
    }

    let response = client.post("/api/auth/login").json(&login).await;
    assert_eq!(response.status_code(), 429);

    let retry_after: u64 = response.headers()["retry-after"]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=900).contains(&retry_after));
    assert_eq!(response.headers()["x-ratelimit-remaining"], "0");

    let body: Value = response.json();
    assert!(body["error"].is_string());
    assert_eq!(body["retryAfter"].as_u64(), Some(retry_after));
}

#[tokio::test]
async fn test_limit_families_counted_separately() {
    let app = setup_test_app_with_limits(strict_auth()).await;
    let client = app.client();
    let login = json!({ "email": "nobody@venuehub.test", "password": "WrongPass123!" });

    for _ in 0..3 {
        client.post("/api/auth/login").json(&login).await;
    }

    let response = client.get("/api/listings").await;
    assert_eq!(response.status_code(), 200);
    let remaining: u32 = response.headers()["x-ratelimit-remaining"]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(remaining, 9_999);
}

#[tokio::test]
async fn test_health_is_never_limited() {
    let app = setup_test_app_with_limits(RateLimitSettings {
        api: RateLimitRule::new(1, 60),
        ..relaxed_limits()
    })
    .await;

    for _ in 0..3 {
        let response = app.client().get("/health").await;
        assert_eq!(response.status_code(), 200);
        assert!(response.headers().get("x-ratelimit-limit").is_none());
    }
}

#[tokio::test]
async fn test_rejection_is_audited() {
    let app = setup_test_app_with_limits(strict_auth()).await;
    let client = app.client();
    let login = json!({ "email": "nobody@venuehub.test", "password": "WrongPass123!" });

    for _ in 0..3 {
        client.post("/api/auth/login").json(&login).await;
    }

    // Audit records are written off the request path.
    let mut count = 0i64;
    for _ in 0..20 {
        count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM audit_logs WHERE event_type = 'rate_limit_exceeded'",
        )
        .fetch_one(app.pool())
        .await
        .unwrap();
        if count > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(count, 1);
}
