//! HTTP error response body
//!
//! `IntoResponse` for `AppError` lives in the API crate: the orphan rule
//! forbids implementing axum's trait for a core type here.

use serde::Serialize;
use utoipa::ToSchema;

/// Standard error body for every non-2xx JSON response
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recoverable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    /// Seconds until a rate-limited client may retry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
            details: None,
            recoverable: None,
            suggested_action: None,
            retry_after: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omits_empty_fields() {
        let body = serde_json::to_value(ErrorResponse::new("Nope").with_code("FORBIDDEN")).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Nope", "code": "FORBIDDEN" }));
    }

    #[test]
    fn retry_after_is_camel_case() {
        let mut response = ErrorResponse::new("Too many requests");
        response.retry_after = Some(42);
        let body = serde_json::to_value(response).unwrap();
        assert_eq!(body["retryAfter"], 42);
    }
}
