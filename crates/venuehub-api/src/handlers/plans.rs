//! Subscription plans

use crate::auth::SessionContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;
use venuehub_core::models::{
    AuditEventType, CreatePlanRequest, ListParams, Page, SubscriptionPlan, UpdatePlanRequest,
};
use venuehub_core::AppError;
use venuehub_infra::ErrorResponse;

#[utoipa::path(
    get,
    path = "/api/plans",
    tag = "billing",
    responses((status = 200, description = "Active plans", body = Vec<SubscriptionPlan>))
)]
#[tracing::instrument(skip(state))]
pub async fn list_active_plans(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.db.plans.list_active().await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/plans",
    tag = "admin",
    params(ListParams),
    responses((status = 200, description = "All plans", body = Page<SubscriptionPlan>))
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_plans(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    Ok(Json(state.db.plans.list(&params).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/plans",
    tag = "admin",
    request_body = CreatePlanRequest,
    responses(
        (status = 201, description = "Plan created", body = SubscriptionPlan),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Code already used", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request), fields(code = %request.code))]
pub async fn create_plan(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    ValidatedJson(request): ValidatedJson<CreatePlanRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    request.check_prices()?;
    let plan = state.db.plans.create(&request).await?;
    state
        .audit
        .admin_change(&ctx, AuditEventType::PlanChange, "plan", plan.id, "create");
    Ok((StatusCode::CREATED, Json(plan)))
}

#[utoipa::path(
    get,
    path = "/api/admin/plans/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Plan ID")),
    responses(
        (status = 200, description = "Plan", body = SubscriptionPlan),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn get_plan(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    let plan = state
        .db
        .plans
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Plan not found".to_string()))?;
    Ok(Json(plan))
}

#[utoipa::path(
    put,
    path = "/api/admin/plans/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Plan ID")),
    request_body = UpdatePlanRequest,
    responses(
        (status = 200, description = "Updated plan", body = SubscriptionPlan),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn update_plan(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdatePlanRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    let negative = [request.price_monthly, request.price_yearly]
        .into_iter()
        .flatten()
        .any(|price: Decimal| price.is_sign_negative());
    if negative {
        return Err(AppError::InvalidInput("Plan prices cannot be negative".to_string()).into());
    }

    let plan = state
        .db
        .plans
        .update(id, &request)
        .await?
        .ok_or_else(|| AppError::NotFound("Plan not found".to_string()))?;
    state
        .audit
        .admin_change(&ctx, AuditEventType::PlanChange, "plan", id, "update");
    Ok(Json(plan))
}

#[utoipa::path(
    delete,
    path = "/api/admin/plans/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Plan ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn delete_plan(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    if !state.db.plans.delete(id).await? {
        return Err(AppError::NotFound("Plan not found".to_string()).into());
    }
    state
        .audit
        .admin_change(&ctx, AuditEventType::PlanChange, "plan", id, "delete");
    Ok(StatusCode::NO_CONTENT)
}
