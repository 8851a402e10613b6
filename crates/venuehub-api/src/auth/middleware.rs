use crate::auth::jwt::JwtService;
use crate::auth::models::SessionContext;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use venuehub_core::AppError;
use venuehub_db::UserRepository;
use venuehub_infra::middleware::{read_cookie, SESSION_COOKIE};

#[derive(Clone)]
pub struct AuthState {
    pub jwt: JwtService,
    pub user_repository: UserRepository,
}

/// Session token from `Authorization: Bearer` or the session cookie.
fn session_token(request: &Request) -> Option<String> {
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());
    bearer.or_else(|| read_cookie(request.headers(), SESSION_COOKIE))
}

async fn resolve_session(
    auth_state: &AuthState,
    token: Option<String>,
) -> Result<SessionContext, AppError> {
    let token = token
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;
    let claims = auth_state.jwt.verify(&token)?;

    let user = auth_state
        .user_repository
        .get_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;

    if !user.is_active {
        return Err(AppError::Unauthorized("Account is disabled".to_string()));
    }

    // Role and tenant come from the database so demotions apply immediately.
    Ok(SessionContext {
        user_id: user.id,
        email: user.email,
        role: user.role,
        tenant_id: user.tenant_id,
    })
}

/// Rejects requests without a valid session with 401.
pub async fn session_auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    // The request body is not Sync, so no borrow of the request may live across an await.
    let token = session_token(&request);
    match resolve_session(&auth_state, token).await {
        Ok(ctx) => {
            request.extensions_mut().insert(ctx);
            next.run(request).await
        }
        Err(err) => HttpAppError(err).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn bearer_wins_over_cookie() {
        let request = Request::builder()
            .header(header::AUTHORIZATION, "Bearer header-token")
            .header(header::COOKIE, "session-token=cookie-token")
            .body(Body::empty())
            .unwrap();
        assert_eq!(session_token(&request).as_deref(), Some("header-token"));
    }

    #[test]
    fn cookie_is_used_without_bearer() {
        let request = Request::builder()
            .header(header::COOKIE, "theme=dark; session-token=cookie-token")
            .body(Body::empty())
            .unwrap();
        assert_eq!(session_token(&request).as_deref(), Some("cookie-token"));
    }

    fn assert_send<T: Send>(_: &T) {}

    #[tokio::test]
    async fn middleware_future_is_send() {
        let state = Arc::new(AuthState {
            jwt: JwtService::new("test-secret-at-least-32-bytes-long!!", 24),
            user_repository: UserRepository::new(
                sqlx::postgres::PgPoolOptions::new()
                    .connect_lazy("postgres://localhost/venuehub")
                    .unwrap(),
            ),
        });
        let request = Request::builder().body(Body::empty()).unwrap();
        let future = resolve_session(&state, session_token(&request));
        assert_send(&future);
    }

    #[test]
    fn missing_token() {
        let request = Request::builder().body(Body::empty()).unwrap();
        assert!(session_token(&request).is_none());
    }
}
