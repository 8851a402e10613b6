//! Shared HTTP middleware

pub mod csrf;
pub mod request_id;
pub mod security_headers;

pub use csrf::{
    read_cookie, requires_csrf, CsrfConfig, CsrfOutcome, CsrfTokenResponse, CSRF_COOKIE,
    CSRF_HEADER, SESSION_COOKIE,
};
pub use request_id::{get_request_id, request_id_middleware, RequestId, REQUEST_ID_HEADER};
pub use security_headers::{security_headers_middleware, SecurityHeadersConfig};
