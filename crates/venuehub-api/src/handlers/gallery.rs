//! Tenant photo gallery

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
    CreateGalleryItemRequest, GalleryItem, ListParams, Page, UpdateGalleryItemRequest,
};
use venuehub_core::AppError;
use venuehub_infra::ErrorResponse;

/// A gallery item may only point at a listing of the same tenant.
async fn ensure_own_listing(
    state: &AppState,
    tenant_id: Uuid,
    listing_id: Option<Uuid>,
) -> Result<(), AppError> {
    if let Some(listing_id) = listing_id {
        state
            .db
            .listings
            .get_for_tenant(tenant_id, listing_id)
            .await?
            .ok_or_else(|| AppError::InvalidInput("Unknown listingId".to_string()))?;
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/tenants/{id}/gallery",
    tag = "tenants",
    params(("id" = Uuid, Path, description = "Tenant ID"), ListParams),
    responses((status = 200, description = "Gallery items in display order", body = Page<GalleryItem>))
)]
#[tracing::instrument(skip(state))]
pub async fn public_gallery(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<Uuid>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.db.gallery.list(tenant_id, &params).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/gallery",
    tag = "admin",
    params(ListParams),
    responses((status = 200, description = "Own tenant's gallery", body = Page<GalleryItem>))
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_gallery(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant_id = ctx.require_tenant_admin()?;
    Ok(Json(state.db.gallery.list(tenant_id, &params).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/gallery",
    tag = "admin",
    request_body = CreateGalleryItemRequest,
    responses(
        (status = 201, description = "Gallery item created", body = GalleryItem),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn create_gallery_item(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    ValidatedJson(request): ValidatedJson<CreateGalleryItemRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant_id = ctx.require_tenant_admin()?;
    ensure_own_listing(&state, tenant_id, request.listing_id).await?;
    let item = state.db.gallery.create(tenant_id, &request).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    get,
    path = "/api/admin/gallery/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Gallery item ID")),
    responses(
        (status = 200, description = "Gallery item", body = GalleryItem),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn get_gallery_item(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant_id = ctx.require_tenant_admin()?;
    let item = state
        .db
        .gallery
        .get(tenant_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Gallery item not found".to_string()))?;
    Ok(Json(item))
}

#[utoipa::path(
    put,
    path = "/api/admin/gallery/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Gallery item ID")),
    request_body = UpdateGalleryItemRequest,
    responses(
        (status = 200, description = "Updated gallery item", body = GalleryItem),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn update_gallery_item(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateGalleryItemRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant_id = ctx.require_tenant_admin()?;
    ensure_own_listing(&state, tenant_id, request.listing_id).await?;
    let item = state
        .db
        .gallery
        .update(tenant_id, id, &request)
        .await?
        .ok_or_else(|| AppError::NotFound("Gallery item not found".to_string()))?;
    Ok(Json(item))
}

#[utoipa::path(
    delete,
    path = "/api/admin/gallery/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Gallery item ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn delete_gallery_item(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant_id = ctx.require_tenant_admin()?;
    if !state.db.gallery.delete(tenant_id, id).await? {
        return Err(AppError::NotFound("Gallery item not found".to_string()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
