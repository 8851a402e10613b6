//! Registration, login and session handlers
//!
//! A successful login returns the token in the body for bearer clients and
//! also sets it as an HttpOnly `session-token` cookie for browsers, together
//! with a fresh CSRF cookie.

use crate::auth::password::{hash_password, verify_password};
use crate::auth::SessionContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use crate::utils::ip_extraction::ClientIp;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Json,
};
use std::sync::Arc;
use venuehub_core::models::{
    AuditEvent, AuditEventType, AuthResponse, LoginRequest, RegisterRequest, User, UserResponse,
    UserRole,
};
use venuehub_core::AppError;
use venuehub_db::db::control::NewUser;
use venuehub_infra::middleware::{CsrfTokenResponse, SESSION_COOKIE};
use venuehub_infra::ErrorResponse;

fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let secure_flag = if secure { "; Secure" } else { "" };
    format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax{}",
        SESSION_COOKIE, token, max_age_secs, secure_flag
    )
}

/// Token, cookies and body for a freshly authenticated user.
fn session_response(
    state: &AppState,
    user: User,
    status: StatusCode,
) -> Result<impl IntoResponse, HttpAppError> {
    let (token, expires_at) = state.security.jwt.issue(&user)?;
    let cookie = session_cookie(
        &token,
        state.security.jwt.expiry_seconds(),
        state.is_production,
    );
    let csrf_cookie = state
        .security
        .csrf
        .cookie(&state.security.csrf.generate_token());

    Ok((
        status,
        AppendHeaders([(header::SET_COOKIE, cookie), (header::SET_COOKIE, csrf_cookie)]),
        Json(AuthResponse {
            token,
            expires_at,
            user: UserResponse::from(user),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 429, description = "Too many attempts", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(email = %request.email))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    client_ip: ClientIp,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let email = request.email.trim().to_lowercase();
    let password_hash = hash_password(&request.password)?;

    let user = state
        .db
        .users
        .create(NewUser {
            email: &email,
            name: request.name.trim(),
            phone: request.phone.as_deref(),
            password_hash: &password_hash,
            role: UserRole::Customer,
            tenant_id: None,
        })
        .await?;

    state.audit.record(
        AuditEvent::new(AuditEventType::Registration, true)
            .actor(user.id)
            .ip(client_ip.as_str())
            .details(serde_json::json!({ "email": user.email })),
    );
    tracing::info!(user_id = %user.id, "User registered");

    session_response(&state, user, StatusCode::CREATED)
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 429, description = "Too many attempts", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    client_ip: ClientIp,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let email = request.email.trim().to_lowercase();
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let Some(user) = state.db.users.get_by_email(&email).await? else {
        state.audit.login(&email, None, client_ip.as_str(), false);
        return Err(invalid().into());
    };

    if !user.is_active || !verify_password(&request.password, &user.password_hash)? {
        state
            .audit
            .login(&email, Some(user.id), client_ip.as_str(), false);
        return Err(invalid().into());
    }

    state.db.users.touch_last_login(user.id).await?;
    state
        .audit
        .login(&email, Some(user.id), client_ip.as_str(), true);

    session_response(&state, user, StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses((status = 204, description = "Session cookie cleared"))
)]
pub async fn logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, session_cookie("", 0, state.is_production))],
    )
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx), fields(user_id = %ctx.user_id))]
pub async fn me(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let user = state
        .db
        .users
        .get_by_id(ctx.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/api/csrf-token",
    tag = "auth",
    responses((status = 200, description = "Fresh CSRF token, also set as a cookie", body = CsrfTokenResponse))
)]
pub async fn csrf_token(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let token = state.security.csrf.generate_token();
    let cookie = state.security.csrf.cookie(&token);
    ([(header::SET_COOKIE, cookie)], Json(CsrfTokenResponse { token }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_flags() {
        let cookie = session_cookie("abc", 3600, true);
        assert!(cookie.starts_with("session-token=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.ends_with("; Secure"));
        assert!(!session_cookie("abc", 3600, false).contains("Secure"));
    }
}
