//! User administration (super admin)

use crate::auth::SessionContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use venuehub_core::models::{AuditEventType, ListParams, Page, UpdateUserRequest, UserResponse};
use venuehub_core::AppError;
use venuehub_infra::ErrorResponse;

#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "admin",
    params(ListParams),
    responses(
        (status = 200, description = "Users", body = Page<UserResponse>),
        (status = 403, description = "Super admin only", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    let page = state.db.users.list(&params).await?;
    Ok(Json(page.map(UserResponse::from)))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    let user = state
        .db
        .users
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Cannot change own role", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    if id == ctx.user_id && (request.role.is_some() || request.is_active == Some(false)) {
        return Err(AppError::BadRequest(
            "You cannot change your own role or deactivate yourself".to_string(),
        )
        .into());
    }

    let user = state
        .db
        .users
        .update(id, &request)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    state
        .audit
        .admin_change(&ctx, AuditEventType::UserChange, "user", id, "update");
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    if id == ctx.user_id {
        return Err(AppError::BadRequest("You cannot delete yourself".to_string()).into());
    }
    if !state.db.users.delete(id).await? {
        return Err(AppError::NotFound("User not found".to_string()).into());
    }
    state
        .audit
        .admin_change(&ctx, AuditEventType::UserChange, "user", id, "delete");
    Ok(StatusCode::NO_CONTENT)
}
