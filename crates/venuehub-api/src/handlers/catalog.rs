//! Platform reference data: amenities, currencies and pricing models
//!
//! Anyone may read the lists; only super admins change them.

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
use venuehub_core::models::{
    Amenity, CreateAmenityRequest, CreateCurrencyRequest, CreatePricingModelRequest, Currency,
    ListParams, Page, PricingModel, UpdateAmenityRequest, UpdateCurrencyRequest,
    UpdatePricingModelRequest,
};
use venuehub_core::AppError;
use venuehub_infra::ErrorResponse;

fn not_found(what: &str) -> HttpAppError {
    AppError::NotFound(format!("{} not found", what)).into()
}

// ----- Amenities -----

#[utoipa::path(
    get,
    path = "/api/catalog/amenities",
    tag = "catalog",
    params(ListParams),
    responses((status = 200, description = "Amenities", body = Page<Amenity>))
)]
#[tracing::instrument(skip(state))]
pub async fn list_amenities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.db.catalog.list_amenities(&params).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/amenities/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Amenity ID")),
    responses(
        (status = 200, description = "Amenity", body = Amenity),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn get_amenity(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    let amenity = state
        .db
        .catalog
        .get_amenity(id)
        .await?
        .ok_or_else(|| not_found("Amenity"))?;
    Ok(Json(amenity))
}

#[utoipa::path(
    post,
    path = "/api/admin/amenities",
    tag = "admin",
    request_body = CreateAmenityRequest,
    responses(
        (status = 201, description = "Amenity created", body = Amenity),
        (status = 409, description = "Name already used", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn create_amenity(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    ValidatedJson(request): ValidatedJson<CreateAmenityRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    let amenity = state.db.catalog.create_amenity(&request).await?;
    Ok((StatusCode::CREATED, Json(amenity)))
}

#[utoipa::path(
    put,
    path = "/api/admin/amenities/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Amenity ID")),
    request_body = UpdateAmenityRequest,
    responses(
        (status = 200, description = "Updated amenity", body = Amenity),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn update_amenity(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateAmenityRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    let amenity = state
        .db
        .catalog
        .update_amenity(id, &request)
        .await?
        .ok_or_else(|| not_found("Amenity"))?;
    Ok(Json(amenity))
}

#[utoipa::path(
    delete,
    path = "/api/admin/amenities/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Amenity ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn delete_amenity(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    if !state.db.catalog.delete_amenity(id).await? {
        return Err(not_found("Amenity"));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ----- Currencies -----

#[utoipa::path(
    get,
    path = "/api/catalog/currencies",
    tag = "catalog",
    params(ListParams),
    responses((status = 200, description = "Currencies", body = Page<Currency>))
)]
#[tracing::instrument(skip(state))]
pub async fn list_currencies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.db.catalog.list_currencies(&params).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/currencies/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Currency ID")),
    responses(
        (status = 200, description = "Currency", body = Currency),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn get_currency(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    let currency = state
        .db
        .catalog
        .get_currency(id)
        .await?
        .ok_or_else(|| not_found("Currency"))?;
    Ok(Json(currency))
}

#[utoipa::path(
    post,
    path = "/api/admin/currencies",
    tag = "admin",
    request_body = CreateCurrencyRequest,
    responses(
        (status = 201, description = "Currency created", body = Currency),
        (status = 409, description = "Code already used", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn create_currency(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    ValidatedJson(request): ValidatedJson<CreateCurrencyRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    let currency = state.db.catalog.create_currency(&request).await?;
    Ok((StatusCode::CREATED, Json(currency)))
}

#[utoipa::path(
    put,
    path = "/api/admin/currencies/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Currency ID")),
    request_body = UpdateCurrencyRequest,
    responses(
        (status = 200, description = "Updated currency", body = Currency),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn update_currency(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateCurrencyRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    let currency = state
        .db
        .catalog
        .update_currency(id, &request)
        .await?
        .ok_or_else(|| not_found("Currency"))?;
    Ok(Json(currency))
}

#[utoipa::path(
    delete,
    path = "/api/admin/currencies/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Currency ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn delete_currency(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    if !state.db.catalog.delete_currency(id).await? {
        return Err(not_found("Currency"));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ----- Pricing models -----

#[utoipa::path(
    get,
    path = "/api/catalog/pricing-models",
    tag = "catalog",
    params(ListParams),
    responses((status = 200, description = "Pricing models", body = Page<PricingModel>))
)]
#[tracing::instrument(skip(state))]
pub async fn list_pricing_models(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.db.catalog.list_pricing_models(&params).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/pricing-models/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Pricing model ID")),
    responses(
        (status = 200, description = "Pricing model", body = PricingModel),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn get_pricing_model(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    let model = state
        .db
        .catalog
        .get_pricing_model(id)
        .await?
        .ok_or_else(|| not_found("Pricing model"))?;
    Ok(Json(model))
}

#[utoipa::path(
    post,
    path = "/api/admin/pricing-models",
    tag = "admin",
    request_body = CreatePricingModelRequest,
    responses(
        (status = 201, description = "Pricing model created", body = PricingModel),
        (status = 409, description = "Code already used", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn create_pricing_model(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    ValidatedJson(request): ValidatedJson<CreatePricingModelRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    let model = state.db.catalog.create_pricing_model(&request).await?;
    Ok((StatusCode::CREATED, Json(model)))
}

#[utoipa::path(
    put,
    path = "/api/admin/pricing-models/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Pricing model ID")),
    request_body = UpdatePricingModelRequest,
    responses(
        (status = 200, description = "Updated pricing model", body = PricingModel),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn update_pricing_model(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdatePricingModelRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    let model = state
        .db
        .catalog
        .update_pricing_model(id, &request)
        .await?
        .ok_or_else(|| not_found("Pricing model"))?;
    Ok(Json(model))
}

#[utoipa::path(
    delete,
    path = "/api/admin/pricing-models/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Pricing model ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn delete_pricing_model(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    if !state.db.catalog.delete_pricing_model(id).await? {
        return Err(not_found("Pricing model"));
    }
    Ok(StatusCode::NO_CONTENT)
}
