//! CSRF enforcement for cookie-authenticated writes

use crate::middleware::audit::AuditLogger;
use crate::utils::ip_extraction::ClientIp;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use venuehub_core::models::{AuditEvent, AuditEventType};
use venuehub_infra::middleware::CsrfOutcome;
use venuehub_infra::{CsrfConfig, ErrorResponse};

#[derive(Clone)]
pub struct CsrfState {
    pub config: CsrfConfig,
    pub audit: AuditLogger,
}

/// Login and registration establish the session, so they cannot carry a token yet.
fn is_exempt_path(path: &str) -> bool {
    matches!(
        path.trim_end_matches('/'),
        "/api/auth/login" | "/api/auth/register"
    )
}

pub async fn csrf_middleware(
    State(state): State<Arc<CsrfState>>,
    request: Request,
    next: Next,
) -> Response {
    if is_exempt_path(request.uri().path()) {
        return next.run(request).await;
    }

    let outcome = state.config.check(request.method(), request.headers());
    if outcome.is_allowed() {
        return next.run(request).await;
    }

    let reason = match outcome {
        CsrfOutcome::Missing => "missing",
        _ => "invalid",
    };
    let mut event = AuditEvent::new(AuditEventType::CsrfFailure, false).details(
        serde_json::json!({
            "method": request.method().as_str(),
            "path": request.uri().path(),
            "reason": reason,
        }),
    );
    if let Some(ClientIp(ip)) = request.extensions().get::<ClientIp>() {
        event = event.ip(ip.clone());
    }
    state.audit.record(event);

    let body = ErrorResponse::new("CSRF token missing or invalid").with_code("CSRF_FAILED");
    (StatusCode::FORBIDDEN, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header, routing::post, Router};
    use tower::ServiceExt;

    fn app(config: CsrfConfig) -> Router {
        let state = Arc::new(CsrfState {
            config,
            audit: AuditLogger::tracing_only(),
        });
        Router::new()
            .route("/api/bookings", post(|| async { "created" }))
            .route("/api/auth/login", post(|| async { "logged in" }))
            .layer(axum::middleware::from_fn_with_state(state, csrf_middleware))
    }

    #[tokio::test]
    async fn cookie_session_without_token_is_rejected() {
        let config = CsrfConfig::new("test-secret-with-enough-length-000000", false);
        let request = Request::builder()
            .method("POST")
            .uri("/api/bookings")
            .header(header::COOKIE, "session-token=abc")
            .body(Body::empty())
            .unwrap();
        let response = app(config).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn matching_header_and_cookie_pass() {
        let config = CsrfConfig::new("test-secret-with-enough-length-000000", false);
        let token = config.generate_token();
        let request = Request::builder()
            .method("POST")
            .uri("/api/bookings")
            .header(
                header::COOKIE,
                format!("session-token=abc; csrf-token={}", token),
            )
            .header("X-CSRF-Token", token.as_str())
            .body(Body::empty())
            .unwrap();
        let response = app(config).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn bearer_and_login_requests_are_exempt() {
        let config = CsrfConfig::new("test-secret-with-enough-length-000000", false);
        let bearer = Request::builder()
            .method("POST")
            .uri("/api/bookings")
            .header(header::AUTHORIZATION, "Bearer token")
            .body(Body::empty())
            .unwrap();
        let response = app(config.clone()).oneshot(bearer).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let login = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(header::COOKIE, "session-token=stale")
            .body(Body::empty())
            .unwrap();
        let response = app(config).oneshot(login).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
