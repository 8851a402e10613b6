//! Per-IP HTTP rate limiting
//!
//! Each request is counted against one limit family chosen from its method
//! and path, keyed by `limitType:ip`. Counters live in the in-memory
//! [`RateLimiter`] and are not shared between processes.

use crate::middleware::audit::AuditLogger;
use crate::utils::ip_extraction::{extract_client_ip, ClientIp};
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::net::SocketAddr;
use std::sync::Arc;
use venuehub_infra::{ErrorResponse, LimitType, RateLimitDecision, RateLimiter};

#[derive(Clone)]
pub struct RateLimitState {
    pub limiter: RateLimiter,
    pub audit: AuditLogger,
    pub trusted_proxy_count: usize,
}

/// Limit family for a request, `None` for routes that are never limited.
pub fn limit_type_for(method: &Method, path: &str) -> Option<LimitType> {
    if !path.starts_with("/api/") {
        return None;
    }
    let path = path.trim_end_matches('/');
    if *method == Method::POST {
        match path {
            "/api/auth/login" | "/api/auth/register" => return Some(LimitType::Auth),
            "/api/bookings" | "/api/orders" => return Some(LimitType::Booking),
            "/api/reviews" => return Some(LimitType::Review),
            _ => {}
        }
    }
    Some(LimitType::Api)
}

fn header_value(value: impl ToString) -> Option<HeaderValue> {
    HeaderValue::from_str(&value.to_string()).ok()
}

pub async fn rate_limit_middleware(
    State(state): State<Arc<RateLimitState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let socket_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client_ip = extract_client_ip(
        request.headers(),
        socket_addr.as_ref(),
        state.trusted_proxy_count,
    );
    request
        .extensions_mut()
        .insert(ClientIp(client_ip.clone()));

    let Some(limit_type) = limit_type_for(request.method(), request.uri().path()) else {
        return next.run(request).await;
    };

    match state.limiter.check(limit_type, &client_ip).await {
        RateLimitDecision::Allowed { limit, remaining } => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            if let Some(value) = header_value(limit) {
                headers.insert("X-RateLimit-Limit", value);
            }
            if let Some(value) = header_value(remaining) {
                headers.insert("X-RateLimit-Remaining", value);
            }
            response
        }
        RateLimitDecision::Rejected {
            limit,
            retry_after_secs,
        } => {
            let path = request.uri().path().to_string();
            tracing::warn!(
                client_ip = %client_ip,
                limit_type = %limit_type,
                path = %path,
                limit,
                retry_after_secs,
                "Rate limit exceeded"
            );
            state
                .audit
                .rate_limit_exceeded(&client_ip, &path, limit_type.as_str(), limit);

            let mut body = ErrorResponse::new("Too many requests. Please try again later.")
                .with_code("RATE_LIMITED");
            body.retry_after = Some(retry_after_secs);

            let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
            let headers = response.headers_mut();
            if let Some(value) = header_value(retry_after_secs) {
                headers.insert(header::RETRY_AFTER, value);
            }
            if let Some(value) = header_value(limit) {
                headers.insert("X-RateLimit-Limit", value);
            }
            headers.insert("X-RateLimit-Remaining", HeaderValue::from_static("0"));
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get, Router};
    use tower::ServiceExt;
    use venuehub_core::{RateLimitRule, RateLimitSettings};

    #[test]
    fn routes_map_to_limit_types() {
        assert_eq!(
            limit_type_for(&Method::POST, "/api/auth/login"),
            Some(LimitType::Auth)
        );
        assert_eq!(
            limit_type_for(&Method::POST, "/api/auth/register"),
            Some(LimitType::Auth)
        );
        assert_eq!(
            limit_type_for(&Method::POST, "/api/bookings"),
            Some(LimitType::Booking)
        );
        assert_eq!(
            limit_type_for(&Method::POST, "/api/orders/"),
            Some(LimitType::Booking)
        );
        assert_eq!(
            limit_type_for(&Method::POST, "/api/reviews"),
            Some(LimitType::Review)
        );
        assert_eq!(
            limit_type_for(&Method::GET, "/api/bookings"),
            Some(LimitType::Api)
        );
        assert_eq!(limit_type_for(&Method::GET, "/health"), None);
        assert_eq!(limit_type_for(&Method::GET, "/docs"), None);
    }

    fn app(max_requests: u32) -> Router {
        let settings = RateLimitSettings {
            api: RateLimitRule::new(max_requests, 60),
            ..RateLimitSettings::default()
        };
        let state = Arc::new(RateLimitState {
            limiter: RateLimiter::new(settings),
            audit: AuditLogger::tracing_only(),
            trusted_proxy_count: 1,
        });
        Router::new()
            .route("/api/listings", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn_with_state(
                state,
                rate_limit_middleware,
            ))
    }

    fn request_from(ip: &str) -> Request {
        Request::builder()
            .uri("/api/listings")
            .header("x-real-ip", ip)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn rejects_request_over_limit() {
        let app = app(2);

        for expected_remaining in ["1", "0"] {
            let response = app.clone().oneshot(request_from("203.0.113.9")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()["X-RateLimit-Limit"], "2");
            assert_eq!(response.headers()["X-RateLimit-Remaining"], expected_remaining);
        }

        let response = app.clone().oneshot(request_from("203.0.113.9")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let retry_after: u64 = response.headers()[header::RETRY_AFTER]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!((1..=60).contains(&retry_after));

        // Another client has its own window.
        let response = app.oneshot(request_from("198.51.100.4")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
