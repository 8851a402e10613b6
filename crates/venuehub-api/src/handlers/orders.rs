//! Shop orders
//!
//! Stock is reserved when the order is placed and given back when a pending
//! or paid order is cancelled; both happen inside the repository transaction.

use crate::auth::SessionContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::handlers::require_module;
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
    CreateOrderRequest, NotificationKind, Order, OrderQuery, OrderStatus, Page, TenantModule,
    UpdateOrderStatusRequest,
};
use venuehub_core::AppError;
use venuehub_db::db::marketplace::OrderScope;
use venuehub_infra::ErrorResponse;

#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "shop",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed; stock reserved", body = Order),
        (status = 400, description = "Empty order, unknown product or insufficient stock", body = ErrorResponse),
        (status = 403, description = "Shop not enabled", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request), fields(user_id = %ctx.user_id, tenant_id = %request.tenant_id))]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    ValidatedJson(request): ValidatedJson<CreateOrderRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant = require_module(&state, request.tenant_id, TenantModule::Shop).await?;
    if !tenant.is_active() {
        return Err(AppError::BadRequest("Shop is not accepting orders".to_string()).into());
    }

    let order = state.db.orders.create(ctx.user_id, &request).await?;
    tracing::info!(order_id = %order.id, total = %order.total_amount, "Order placed");

    state
        .notifier
        .to_tenant(
            order.tenant_id,
            NotificationKind::Payment,
            "New order",
            format!(
                "Order of {} item(s) for {} {}",
                order.items.len(),
                order.total_amount,
                order.currency
            ),
            Some(format!("/admin/orders/{}", order.id)),
        )
        .await;

    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "shop",
    params(OrderQuery),
    responses((status = 200, description = "Caller's orders", body = Page<Order>))
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_my_orders(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Query(query): Query<OrderQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let page = state
        .db
        .orders
        .list(OrderScope::User(ctx.user_id), &query)
        .await?;
    Ok(Json(page))
}

async fn load_own_order(
    state: &AppState,
    ctx: &SessionContext,
    id: Uuid,
) -> Result<Order, AppError> {
    state
        .db
        .orders
        .get_by_id(id)
        .await?
        .filter(|order| order.user_id == ctx.user_id)
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "shop",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order", body = Order),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(load_own_order(&state, &ctx, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/cancel",
    tag = "shop",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Cancelled order; stock restored", body = Order),
        (status = 400, description = "Order can no longer be cancelled", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn cancel_order(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    load_own_order(&state, &ctx, id).await?;
    let order = state
        .db
        .orders
        .update_status(id, OrderStatus::Cancelled)
        .await?;
    Ok(Json(order))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    tag = "admin",
    params(OrderQuery),
    responses((status = 200, description = "Orders of the caller's tenant", body = Page<Order>))
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn admin_list_orders(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Query(query): Query<OrderQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant_id = ctx.require_tenant_admin()?;
    require_module(&state, tenant_id, TenantModule::Shop).await?;
    let page = state
        .db
        .orders
        .list(OrderScope::Tenant(tenant_id), &query)
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    put,
    path = "/api/admin/orders/{id}/status",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Updated order", body = Order),
        (status = 400, description = "Transition not allowed", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request), fields(next = request.status.as_str()))]
pub async fn update_order_status(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateOrderStatusRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant_id = ctx.require_tenant_admin()?;
    require_module(&state, tenant_id, TenantModule::Shop).await?;
    state
        .db
        .orders
        .get_by_id(id)
        .await?
        .filter(|order| order.tenant_id == tenant_id)
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    let order = state.db.orders.update_status(id, request.status).await?;
    state
        .notifier
        .to_user(
            order.user_id,
            NotificationKind::Payment,
            format!("Order {}", order.status.as_str()),
            format!("Your order is now {}", order.status.as_str()),
            Some(format!("/orders/{}", order.id)),
        )
        .await;
    Ok(Json(order))
}
