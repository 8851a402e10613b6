//! In-app notifications and web-push subscriptions
//!
//! Clients poll `GET /api/notifications`; the response carries the interval
//! they should wait before the next poll.

use crate::auth::SessionContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use venuehub_core::models::{
    AuditEventType, CreateNotificationRequest, Notification, NotificationListResponse,
    NotificationQuery, PushSubscription, Recipient, SubscribePushRequest, UnsubscribePushRequest,
};
use venuehub_core::AppError;
use venuehub_infra::ErrorResponse;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "notifications",
    params(NotificationQuery),
    responses((status = 200, description = "Latest notifications with unread count", body = NotificationListResponse))
)]
#[tracing::instrument(skip(state, ctx), fields(user_id = %ctx.user_id))]
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Query(query): Query<NotificationQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let scope = ctx.notification_scope();
    let notifications = state
        .db
        .notifications
        .list(scope, query.unread_only, query.limit)
        .await?;
    let unread_count = state.db.notifications.unread_count(scope).await?;

    Ok(Json(NotificationListResponse {
        notifications,
        unread_count,
        poll_interval_seconds: state.config.notification_poll_interval_secs(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    tag = "notifications",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification marked read", body = Notification),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let notification = state
        .db
        .notifications
        .mark_read(ctx.notification_scope(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;
    Ok(Json(notification))
}

#[utoipa::path(
    post,
    path = "/api/notifications/read-all",
    tag = "notifications",
    responses((status = 200, description = "Number of notifications marked read", body = MarkAllReadResponse))
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let updated = state
        .db
        .notifications
        .mark_all_read(ctx.notification_scope())
        .await?;
    Ok(Json(MarkAllReadResponse { updated }))
}

#[utoipa::path(
    post,
    path = "/api/notifications/{id}/archive",
    tag = "notifications",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 204, description = "Archived"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn archive(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !state
        .db
        .notifications
        .archive(ctx.notification_scope(), id)
        .await?
    {
        return Err(AppError::NotFound("Notification not found".to_string()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/notifications/push/subscribe",
    tag = "notifications",
    request_body = SubscribePushRequest,
    responses(
        (status = 201, description = "Subscription stored", body = PushSubscription),
        (status = 400, description = "Invalid subscription", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn subscribe_push(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    ValidatedJson(request): ValidatedJson<SubscribePushRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let subscription = state
        .db
        .notifications
        .subscribe(ctx.user_id, &request)
        .await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

#[utoipa::path(
    post,
    path = "/api/notifications/push/unsubscribe",
    tag = "notifications",
    request_body = UnsubscribePushRequest,
    responses(
        (status = 204, description = "Subscription removed"),
        (status = 404, description = "Unknown endpoint", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn unsubscribe_push(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    ValidatedJson(request): ValidatedJson<UnsubscribePushRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !state
        .db
        .notifications
        .unsubscribe(ctx.user_id, &request.endpoint)
        .await?
    {
        return Err(AppError::NotFound("Push subscription not found".to_string()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Send a notification to one user or to a whole tenant. Tenant admins may
/// only address their own tenant.
#[utoipa::path(
    post,
    path = "/api/admin/notifications",
    tag = "admin",
    request_body = CreateNotificationRequest,
    responses(
        (status = 201, description = "Notification stored", body = Notification),
        (status = 400, description = "Need exactly one recipient", body = ErrorResponse),
        (status = 404, description = "Recipient not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn admin_send_notification(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    ValidatedJson(request): ValidatedJson<CreateNotificationRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let filter = ctx.admin_tenant_filter()?;
    let recipient = request.recipient()?;

    match (recipient, filter) {
        (Recipient::Tenant(tenant_id), Some(own)) if tenant_id != own => {
            return Err(AppError::NotFound("Tenant not found".to_string()).into());
        }
        (Recipient::User(_), Some(_)) => {
            return Err(AppError::Forbidden(
                "Tenant admins can only notify their own tenant".to_string(),
            )
            .into());
        }
        (Recipient::User(user_id), None) => {
            state
                .db
                .users
                .get_by_id(user_id)
                .await?
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        }
        (Recipient::Tenant(tenant_id), _) => {
            state
                .db
                .tenants
                .get_by_id(tenant_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))?;
        }
    }

    let notification = state
        .db
        .notifications
        .create(&request.into_new(recipient))
        .await?;
    state.audit.admin_change(
        &ctx,
        AuditEventType::UserChange,
        "notification",
        notification.id,
        "send",
    );
    Ok((StatusCode::CREATED, Json(notification)))
}
