//! Listing search, availability and tenant-admin listing management
//!
//! Every admin operation is gated on the tenant module matching the
//! listing kind (`event` listings need the `events` module and so on).

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
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;
use venuehub_core::models::{
    occupancy, AvailabilityQuery, AvailabilityResponse, CreateListingRequest, ListParams, Listing,
    ListingKind, ListingQuery, Page, Tenant, TenantModule, UpdateListingRequest,
};
use venuehub_core::AppError;
use venuehub_infra::ErrorResponse;

/// Admin listing filter
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AdminListingQuery {
    pub kind: Option<ListingKind>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl AdminListingQuery {
    fn params(&self) -> ListParams {
        ListParams {
            search: self.search.clone(),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/listings",
    tag = "listings",
    params(ListingQuery),
    responses((status = 200, description = "Active listings of active tenants", body = Page<Listing>))
)]
#[tracing::instrument(skip(state))]
pub async fn search_listings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListingQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.db.listings.search(&query).await?))
}

async fn load_public_listing(state: &AppState, id: Uuid) -> Result<Listing, AppError> {
    state
        .db
        .listings
        .get_by_id(id)
        .await?
        .filter(|listing| listing.is_active)
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))
}

#[utoipa::path(
    get,
    path = "/api/listings/{id}",
    tag = "listings",
    params(("id" = Uuid, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Listing", body = Listing),
        (status = 404, description = "Not found or inactive", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_listing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(load_public_listing(&state, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/listings/{id}/availability",
    tag = "listings",
    params(("id" = Uuid, Path, description = "Listing ID"), AvailabilityQuery),
    responses(
        (status = 200, description = "Booked slots with remaining capacity", body = AvailabilityResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let listing = load_public_listing(&state, id).await?;
    let active = state.db.bookings.active_slots(id, query.date).await?;

    Ok(Json(AvailabilityResponse {
        listing_id: id,
        date: query.date,
        capacity: listing.capacity,
        slots: occupancy(&active, listing.capacity),
    }))
}

/// Fail once the tenant's plan listing quota is used up.
async fn ensure_listing_quota(state: &AppState, tenant: &Tenant) -> Result<(), AppError> {
    let Some(plan_id) = tenant.plan_id else {
        return Ok(());
    };
    let Some(plan) = state.db.plans.get_by_id(plan_id).await? else {
        return Ok(());
    };
    let existing = state
        .db
        .listings
        .list_for_tenant(
            tenant.id,
            None,
            &ListParams {
                limit: Some(1),
                ..ListParams::default()
            },
        )
        .await?
        .total;
    if existing >= i64::from(plan.limits.max_listings) {
        return Err(AppError::Forbidden(format!(
            "Plan '{}' allows at most {} listings",
            plan.name, plan.limits.max_listings
        )));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/admin/listings",
    tag = "admin",
    params(AdminListingQuery),
    responses(
        (status = 200, description = "Own tenant's listings", body = Page<Listing>),
        (status = 403, description = "Module not enabled", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn admin_list_listings(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Query(query): Query<AdminListingQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant_id = ctx.require_tenant_admin()?;
    if let Some(kind) = query.kind {
        require_module(&state, tenant_id, TenantModule::from(kind)).await?;
    }
    let page = state
        .db
        .listings
        .list_for_tenant(tenant_id, query.kind, &query.params())
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    post,
    path = "/api/admin/listings",
    tag = "admin",
    request_body = CreateListingRequest,
    responses(
        (status = 201, description = "Listing created", body = Listing),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Module not enabled or plan quota reached", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request), fields(kind = ?request.kind))]
pub async fn create_listing(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    ValidatedJson(request): ValidatedJson<CreateListingRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant_id = ctx.require_tenant_admin()?;
    let tenant = require_module(&state, tenant_id, TenantModule::from(request.kind)).await?;
    request.price_config.check_amounts()?;
    ensure_listing_quota(&state, &tenant).await?;

    let listing = state.db.listings.create(tenant_id, &request).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

/// Own-tenant listing whose module is still enabled.
async fn load_admin_listing(
    state: &AppState,
    tenant_id: Uuid,
    id: Uuid,
) -> Result<Listing, AppError> {
    let listing = state
        .db
        .listings
        .get_for_tenant(tenant_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;
    require_module(state, tenant_id, TenantModule::from(listing.kind)).await?;
    Ok(listing)
}

#[utoipa::path(
    get,
    path = "/api/admin/listings/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Listing", body = Listing),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn admin_get_listing(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant_id = ctx.require_tenant_admin()?;
    Ok(Json(load_admin_listing(&state, tenant_id, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/admin/listings/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Listing ID")),
    request_body = UpdateListingRequest,
    responses(
        (status = 200, description = "Updated listing", body = Listing),
        (status = 403, description = "Module not enabled", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn update_listing(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateListingRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant_id = ctx.require_tenant_admin()?;
    load_admin_listing(&state, tenant_id, id).await?;
    if let Some(price_config) = &request.price_config {
        price_config.check_amounts()?;
    }

    let listing = state
        .db
        .listings
        .update(tenant_id, id, &request)
        .await?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;
    Ok(Json(listing))
}

#[utoipa::path(
    delete,
    path = "/api/admin/listings/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Listing ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn delete_listing(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant_id = ctx.require_tenant_admin()?;
    load_admin_listing(&state, tenant_id, id).await?;
    if !state.db.listings.delete(tenant_id, id).await? {
        return Err(AppError::NotFound("Listing not found".to_string()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
