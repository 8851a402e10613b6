//! Shop catalogue, gated on the tenant's `shop` module

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
    ensure_price, CreateProductRequest, ListParams, Page, Product, TenantModule,
    UpdateProductRequest,
};
use venuehub_core::AppError;
use venuehub_infra::ErrorResponse;

#[utoipa::path(
    get,
    path = "/api/tenants/{id}/products",
    tag = "shop",
    params(("id" = Uuid, Path, description = "Tenant ID"), ListParams),
    responses(
        (status = 200, description = "Active products", body = Page<Product>),
        (status = 403, description = "Shop not enabled", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn public_products(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<Uuid>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant = require_module(&state, tenant_id, TenantModule::Shop).await?;
    if !tenant.is_active() {
        return Err(AppError::NotFound("Tenant not found".to_string()).into());
    }
    Ok(Json(state.db.products.list(tenant_id, true, &params).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/products",
    tag = "admin",
    params(ListParams),
    responses(
        (status = 200, description = "All products of the caller's tenant", body = Page<Product>),
        (status = 403, description = "Shop not enabled", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant_id = ctx.require_tenant_admin()?;
    require_module(&state, tenant_id, TenantModule::Shop).await?;
    Ok(Json(state.db.products.list(tenant_id, false, &params).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/products",
    tag = "admin",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "SKU already used", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request), fields(sku = %request.sku))]
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    ValidatedJson(request): ValidatedJson<CreateProductRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant_id = ctx.require_tenant_admin()?;
    require_module(&state, tenant_id, TenantModule::Shop).await?;
    ensure_price(request.price)?;
    let product = state.db.products.create(tenant_id, &request).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    get,
    path = "/api/admin/products/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product", body = Product),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant_id = ctx.require_tenant_admin()?;
    require_module(&state, tenant_id, TenantModule::Shop).await?;
    let product = state
        .db
        .products
        .get(tenant_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    Ok(Json(product))
}

#[utoipa::path(
    put,
    path = "/api/admin/products/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated product", body = Product),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateProductRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant_id = ctx.require_tenant_admin()?;
    require_module(&state, tenant_id, TenantModule::Shop).await?;
    if let Some(price) = request.price {
        ensure_price(price)?;
    }
    let product = state
        .db
        .products
        .update(tenant_id, id, &request)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    Ok(Json(product))
}

#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant_id = ctx.require_tenant_admin()?;
    require_module(&state, tenant_id, TenantModule::Shop).await?;
    if !state.db.products.delete(tenant_id, id).await? {
        return Err(AppError::NotFound("Product not found".to_string()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
