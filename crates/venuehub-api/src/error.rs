//! HTTP error response conversion
//!
//! This module provides HTTP-specific error response conversion for AppError.
//!
//! **Preferred handler pattern:** Return `Result<impl IntoResponse, HttpAppError>`. Use
//! `AppError` (or types that implement `Into<AppError>`) for errors and `?` so they
//! become `HttpAppError` and render consistently (status, body, logging).

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;
use venuehub_core::{AppError, ErrorMetadata, LogLevel};
use venuehub_infra::ErrorResponse;

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from venuehub-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<validator::ValidationErrors> for HttpAppError {
    fn from(err: validator::ValidationErrors) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<sqlx::Error> for HttpAppError {
    fn from(err: sqlx::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

/// Convert JSON body deserialization failures into a 400 with our ErrorResponse format.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        let body_text = rejection.body_text();
        let message = if body_text.contains("expected a formatted UUID") {
            "Invalid request body: ids such as listingId must be UUID strings".to_string()
        } else {
            format!("Invalid request body: {}", body_text)
        };
        HttpAppError(AppError::InvalidInput(message))
    }
}

/// JSON body extractor that deserializes and then runs `validator` rules,
/// returning our ErrorResponse format (400 + JSON) on either failure.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        inner.validate()?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

/// Body for `error`; details are withheld in production and for sensitive errors.
pub fn error_body(app_error: &AppError, is_production: bool) -> ErrorResponse {
    let mut body = ErrorResponse::new(app_error.client_message()).with_code(app_error.error_code());
    body.recoverable = Some(app_error.is_recoverable());
    body.suggested_action = app_error.suggested_action().map(String::from);
    if !is_production && !app_error.is_sensitive() {
        body.details = Some(app_error.detailed_message());
    }
    if let AppError::RateLimited { retry_after_secs } = app_error {
        body.retry_after = Some(*retry_after_secs);
    }
    body
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = error_body(app_error, is_production_env());
        let mut response = (status, Json(body)).into_response();

        if let AppError::RateLimited { retry_after_secs } = app_error {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_metadata() {
        let response = HttpAppError(AppError::NotFound("Listing not found".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = HttpAppError(AppError::SlotUnavailable("full".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = HttpAppError(AppError::ModuleDisabled("gym".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn rate_limited_sets_retry_after() {
        let response =
            HttpAppError(AppError::RateLimited { retry_after_secs: 17 }).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).unwrap(),
            "17"
        );
    }

    #[test]
    fn production_hides_details() {
        let error = AppError::Conflict("Slug already taken".to_string());
        let body = serde_json::to_value(error_body(&error, true)).unwrap();
        assert_eq!(body["error"], "Slug already taken");
        assert!(body.get("details").is_none());

        let body = serde_json::to_value(error_body(&error, false)).unwrap();
        assert!(body["details"].as_str().unwrap().contains("Slug already taken"));
    }

    #[test]
    fn internal_errors_never_expose_details() {
        let error = AppError::Internal("connection string leaked".to_string());
        let body = serde_json::to_value(error_body(&error, false)).unwrap();
        assert_eq!(body["error"], "Internal server error");
        assert!(body.get("details").is_none());
    }

    #[test]
    fn retry_after_in_body() {
        let body = serde_json::to_value(error_body(
            &AppError::RateLimited { retry_after_secs: 5 },
            true,
        ))
        .unwrap();
        assert_eq!(body["retryAfter"], 5);
    }
}
