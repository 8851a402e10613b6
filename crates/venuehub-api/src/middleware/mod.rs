pub mod audit;
pub mod csrf;
pub mod rate_limit;

pub use audit::{permission_audit_middleware, AuditLogger};
pub use csrf::{csrf_middleware, CsrfState};
pub use rate_limit::{rate_limit_middleware, RateLimitState};
pub use venuehub_infra::{request_id_middleware, security_headers_middleware};
