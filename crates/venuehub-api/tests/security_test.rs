//! Authentication, CSRF and response hardening.
//!
//! Run with: `cargo test -p venuehub-api --test security_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use helpers::auth::{register_user, TEST_PASSWORD};
use helpers::setup_test_app;
use serde_json::{json, Value};

#[tokio::test]
async fn test_protected_route_requires_session() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/auth/me").await;
    assert_eq!(response.status_code(), 401);

    let response = app
        .client()
        .get("/api/auth/me")
        .add_header("Authorization", "Bearer not-a-jwt")
        .await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_bearer_session_resolves_user() {
    let app = setup_test_app().await;
    let user = register_user(app.client(), "me@venuehub.test").await;

    let response = app
        .client()
        .get("/api/auth/me")
        .add_header("Authorization", user.bearer())
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["email"], "me@venuehub.test");
    assert_eq!(body["role"], "customer");
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_login_with_wrong_password_rejected() {
    let app = setup_test_app().await;
    register_user(app.client(), "login@venuehub.test").await;

    let bad = app
        .client()
        .post("/api/auth/login")
        .json(&json!({ "email": "login@venuehub.test", "password": "Wrong-password-1" }))
        .await;
    assert_eq!(bad.status_code(), 401);

    let good = app
        .client()
        .post("/api/auth/login")
        .json(&json!({ "email": "login@venuehub.test", "password": TEST_PASSWORD }))
        .await;
    assert_eq!(good.status_code(), 200);
}

#[tokio::test]
async fn test_cookie_session_write_requires_csrf_token() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_user(client, "cookie@venuehub.test").await;
    let session = format!("session-token={}", user.token);

    // Reads ride on the cookie alone.
    let response = client
        .get("/api/auth/me")
        .add_header("Cookie", session.clone())
        .await;
    assert_eq!(response.status_code(), 200);

    let response = client
        .post("/api/notifications/read-all")
        .add_header("Cookie", session.clone())
        .await;
    assert_eq!(response.status_code(), 403);
    let body: Value = response.json();
    assert_eq!(body["code"], "CSRF_FAILED");

    let token: Value = client.get("/api/csrf-token").await.json();
    let token = token["token"].as_str().unwrap().to_string();

    let response = client
        .post("/api/notifications/read-all")
        .add_header("Cookie", format!("{}; csrf-token={}", session, token))
        .add_header("X-CSRF-Token", token.clone())
        .await;
    assert_eq!(response.status_code(), 200);

    // Bearer clients are exempt.
    let response = client
        .post("/api/notifications/read-all")
        .add_header("Authorization", user.bearer())
        .await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_customer_cannot_reach_admin_routes() {
    let app = setup_test_app().await;
    let user = register_user(app.client(), "nosy@venuehub.test").await;

    let response = app
        .client()
        .get("/api/admin/tenants")
        .add_header("Authorization", user.bearer())
        .await;
    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = setup_test_app().await;

    let live = app.client().get("/health").await;
    assert_eq!(live.status_code(), 200);
    let live: Value = live.json();
    assert_eq!(live["status"], "alive");

    let ready = app.client().get("/health/ready").await;
    assert_eq!(ready.status_code(), 200);
    let ready: Value = ready.json();
    assert_eq!(ready["database"], "ready");
}

#[tokio::test]
async fn test_responses_carry_security_headers_and_request_id() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/listings").await;
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("content-security-policy"));
    assert!(headers.contains_key("x-request-id"));
    // Not a production environment.
    assert!(!headers.contains_key("strict-transport-security"));

    let response = app
        .client()
        .get("/api/listings")
        .add_header("X-Request-ID", "trace-me-123")
        .await;
    assert_eq!(response.headers()["x-request-id"], "trace-me-123");
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/openapi.json").await;
    assert_eq!(response.status_code(), 200);
    let doc: Value = response.json();
    assert_eq!(doc["info"]["title"], "VenueHub API");
    assert!(doc["paths"]["/api/bookings"].is_object());
}
