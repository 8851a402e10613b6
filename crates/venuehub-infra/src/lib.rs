//! VenueHub Infrastructure Library
//!
//! Shared HTTP infrastructure used by the API binary:
//! - Middleware (CSRF, request ID, security headers)
//! - Fixed-window rate limiting
//! - Tracing subscriber initialization
//! - Error response body

#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

pub mod error;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

// Re-export commonly used types
#[cfg(feature = "middleware")]
pub use middleware::{
    get_request_id, request_id_middleware, security_headers_middleware, CsrfConfig, RequestId,
    SecurityHeadersConfig,
};

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, LogFormat};

pub use error::ErrorResponse;

#[cfg(feature = "rate-limit")]
pub use rate_limit::{LimitType, RateLimitDecision, RateLimiter};
