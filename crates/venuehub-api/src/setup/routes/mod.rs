//! Route configuration and setup.
//!
//! Domain route groups live in [domains](domains); health checks in [health](health).

mod domains;
mod health;

use crate::auth::middleware::{session_auth_middleware, AuthState};
use crate::constants::{DEFAULT_HTTP_CONCURRENCY_LIMIT, MAX_REQUEST_BODY_BYTES};
use crate::middleware::{
    csrf_middleware, permission_audit_middleware, rate_limit_middleware, request_id_middleware,
    security_headers_middleware, CsrfState, RateLimitState,
};
use crate::state::AppState;
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use venuehub_core::Config;
use venuehub_infra::SecurityHeadersConfig;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let auth_state = Arc::new(AuthState {
        jwt: state.security.jwt.clone(),
        user_repository: state.db.users.clone(),
    });
    let csrf_state = Arc::new(CsrfState {
        config: state.security.csrf.clone(),
        audit: state.audit.clone(),
    });
    let rate_limit_state = Arc::new(RateLimitState {
        limiter: state.rate_limiter.clone(),
        audit: state.audit.clone(),
        trusted_proxy_count: config.trusted_proxy_count(),
    });
    let security_headers_config = Arc::new(SecurityHeadersConfig {
        hsts: config.is_production(),
    });

    // Layers run bottom-up: the session is resolved before CSRF and audit see the request.
    let protected_routes = protected_routes()
        .layer(axum::middleware::from_fn_with_state(
            csrf_state,
            csrf_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            Arc::new(state.audit.clone()),
            permission_audit_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            session_auth_middleware,
        ));

    let request_timeout_secs = config.request_timeout_secs().max(1);
    tracing::info!(
        http_concurrency_limit = DEFAULT_HTTP_CONCURRENCY_LIMIT,
        request_timeout_secs,
        "HTTP limits enabled"
    );

    let app = public_routes()
        .merge(protected_routes)
        .merge(
            utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"),
        )
        .layer(TimeoutLayer::new(Duration::from_secs(request_timeout_secs)))
        .layer(ConcurrencyLimitLayer::new(DEFAULT_HTTP_CONCURRENCY_LIMIT))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn_with_state(
            security_headers_config,
            security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit_state,
            rate_limit_middleware,
        ))
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.cors_origins().iter().any(|origin| origin == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        // Credentialed CORS cannot use wildcards, so headers are listed.
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([
                header::AUTHORIZATION,
                header::CONTENT_TYPE,
                HeaderName::from_static("x-csrf-token"),
                HeaderName::from_static("x-request-id"),
            ])
            .allow_credentials(true)
    };
    Ok(cors)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::liveness_check))
        .route("/health/ready", get(health::readiness_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .merge(domains::public_auth_routes())
        .merge(domains::public_marketplace_routes())
        .merge(domains::public_reference_routes())
}

fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(domains::account_routes())
        .merge(domains::booking_routes())
        .merge(domains::order_routes())
        .merge(domains::notification_routes())
        .merge(domains::organization_routes())
        .merge(domains::admin_tenant_routes())
        .merge(domains::admin_marketplace_routes())
        .merge(domains::admin_shop_routes())
        .merge(domains::admin_billing_routes())
        .merge(domains::admin_platform_routes())
}
