//! Reviews: customer submission, public listing feed and moderation

use crate::auth::SessionContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::handlers::ensure_tenant_visible;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use venuehub_core::models::{
    AuditEventType, CreateReviewRequest, ModerateReviewRequest, NotificationKind, Page,
    ReplyReviewRequest, Review, ReviewQuery, ReviewResponse,
};
use venuehub_core::AppError;
use venuehub_db::db::marketplace::ReviewScope;
use venuehub_infra::ErrorResponse;

#[utoipa::path(
    get,
    path = "/api/listings/{id}/reviews",
    tag = "listings",
    params(("id" = Uuid, Path, description = "Listing ID"), ReviewQuery),
    responses((status = 200, description = "Approved reviews", body = Page<ReviewResponse>))
)]
#[tracing::instrument(skip(state))]
pub async fn list_listing_reviews(
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<Uuid>,
    Query(mut query): Query<ReviewQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    query.listing_id = Some(listing_id);
    query.status = None;
    let page = state.db.reviews.list(ReviewScope::Public, &query).await?;
    Ok(Json(page.map(ReviewResponse::from)))
}

#[utoipa::path(
    post,
    path = "/api/reviews",
    tag = "reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review submitted for moderation", body = ReviewResponse),
        (status = 400, description = "Booking not completed", body = ErrorResponse),
        (status = 403, description = "Not the caller's booking", body = ErrorResponse),
        (status = 404, description = "Booking not found", body = ErrorResponse),
        (status = 409, description = "Booking already reviewed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request), fields(user_id = %ctx.user_id, booking_id = %request.booking_id))]
pub async fn create_review(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    ValidatedJson(request): ValidatedJson<CreateReviewRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let review = state.db.reviews.create(ctx.user_id, &request).await?;
    tracing::info!(review_id = %review.id, rating = review.rating, "Review submitted");

    state
        .notifier
        .to_tenant(
            review.tenant_id,
            NotificationKind::Review,
            "New review",
            format!("A customer left a {}-star review", review.rating),
            Some(format!("/admin/reviews/{}", review.id)),
        )
        .await;

    Ok((StatusCode::CREATED, Json(ReviewResponse::from(review))))
}

#[utoipa::path(
    get,
    path = "/api/admin/reviews",
    tag = "admin",
    params(ReviewQuery),
    responses(
        (status = 200, description = "Reviews of the caller's tenant, or all for super admins", body = Page<ReviewResponse>),
        (status = 403, description = "Admin only", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn admin_list_reviews(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Query(query): Query<ReviewQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let scope = match ctx.admin_tenant_filter()? {
        Some(tenant_id) => ReviewScope::Tenant(tenant_id),
        None => ReviewScope::All,
    };
    let page = state.db.reviews.list(scope, &query).await?;
    Ok(Json(page.map(ReviewResponse::from)))
}

async fn load_visible_review(
    state: &AppState,
    ctx: &SessionContext,
    id: Uuid,
) -> Result<Review, AppError> {
    let filter = ctx.admin_tenant_filter()?;
    let review = state
        .db
        .reviews
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".to_string()))?;
    ensure_tenant_visible(filter, review.tenant_id, "Review")?;
    Ok(review)
}

#[utoipa::path(
    put,
    path = "/api/admin/reviews/{id}/moderate",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Review ID")),
    request_body = ModerateReviewRequest,
    responses(
        (status = 200, description = "Moderated review; listing rating refreshed", body = ReviewResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request), fields(status = ?request.status))]
pub async fn moderate_review(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<ModerateReviewRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    load_visible_review(&state, &ctx, id).await?;
    let review = state
        .db
        .reviews
        .moderate(id, request.status, request.note.as_deref())
        .await?;

    state.audit.admin_change(
        &ctx,
        AuditEventType::ReviewModeration,
        "review",
        id,
        "moderate",
    );
    Ok(Json(ReviewResponse::from(review)))
}

#[utoipa::path(
    post,
    path = "/api/admin/reviews/{id}/reply",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Review ID")),
    request_body = ReplyReviewRequest,
    responses(
        (status = 200, description = "Review with the tenant reply", body = ReviewResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn reply_review(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<ReplyReviewRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    load_visible_review(&state, &ctx, id).await?;
    let review = state
        .db
        .reviews
        .reply(id, ctx.user_id, request.message.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".to_string()))?;

    state
        .notifier
        .to_user(
            review.user_id,
            NotificationKind::Review,
            "The venue replied to your review",
            request.message.trim(),
            Some(format!("/listings/{}", review.listing_id)),
        )
        .await;
    Ok(Json(ReviewResponse::from(review)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/reviews/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 204, description = "Deleted; listing rating refreshed"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn delete_review(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    load_visible_review(&state, &ctx, id).await?;
    if !state.db.reviews.delete(id).await? {
        return Err(AppError::NotFound("Review not found".to_string()).into());
    }
    state.audit.admin_change(
        &ctx,
        AuditEventType::ReviewModeration,
        "review",
        id,
        "delete",
    );
    Ok(StatusCode::NO_CONTENT)
}
