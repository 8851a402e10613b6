//! Tenant management and white-label branding

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
    AuditEventType, CreateTenantRequest, ListParams, Page, Tenant, TenantBranding,
    UpdateTenantRequest, UpsertBrandingRequest,
};
use venuehub_core::AppError;
use venuehub_infra::ErrorResponse;

#[utoipa::path(
    post,
    path = "/api/admin/tenants",
    tag = "admin",
    request_body = CreateTenantRequest,
    responses(
        (status = 201, description = "Tenant created; owner promoted to tenant admin", body = Tenant),
        (status = 404, description = "Owner user not found", body = ErrorResponse),
        (status = 409, description = "Slug already taken", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request), fields(slug = %request.slug))]
pub async fn create_tenant(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    ValidatedJson(request): ValidatedJson<CreateTenantRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    if let Some(plan_id) = request.plan_id {
        state
            .db
            .plans
            .get_by_id(plan_id)
            .await?
            .ok_or_else(|| AppError::InvalidInput("Unknown planId".to_string()))?;
    }

    let tenant = state.db.tenants.create(&request).await?;
    state
        .audit
        .admin_change(&ctx, AuditEventType::TenantChange, "tenant", tenant.id, "create");
    Ok((StatusCode::CREATED, Json(tenant)))
}

#[utoipa::path(
    get,
    path = "/api/admin/tenants",
    tag = "admin",
    params(ListParams),
    responses((status = 200, description = "Tenants", body = Page<Tenant>))
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_tenants(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    Ok(Json(state.db.tenants.list(&params).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/tenants/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Tenant ID")),
    responses(
        (status = 200, description = "Tenant", body = Tenant),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn get_tenant(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    let tenant = state
        .db
        .tenants
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))?;
    Ok(Json(tenant))
}

#[utoipa::path(
    put,
    path = "/api/admin/tenants/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Tenant ID")),
    request_body = UpdateTenantRequest,
    responses(
        (status = 200, description = "Updated tenant", body = Tenant),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn update_tenant(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateTenantRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    let tenant = state
        .db
        .tenants
        .update(id, &request)
        .await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))?;
    state
        .audit
        .admin_change(&ctx, AuditEventType::TenantChange, "tenant", id, "update");
    Ok(Json(tenant))
}

#[utoipa::path(
    delete,
    path = "/api/admin/tenants/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Tenant ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn delete_tenant(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    if !state.db.tenants.delete(id).await? {
        return Err(AppError::NotFound("Tenant not found".to_string()).into());
    }
    state
        .audit
        .admin_change(&ctx, AuditEventType::TenantChange, "tenant", id, "delete");
    Ok(StatusCode::NO_CONTENT)
}

/// Tenant administered by the caller.
#[utoipa::path(
    get,
    path = "/api/admin/tenant",
    tag = "admin",
    responses(
        (status = 200, description = "Own tenant", body = Tenant),
        (status = 403, description = "Tenant admin only", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn get_own_tenant(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant_id = ctx.require_tenant_admin()?;
    let tenant = state
        .db
        .tenants
        .get_by_id(tenant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))?;
    Ok(Json(tenant))
}

#[utoipa::path(
    get,
    path = "/api/tenants/by-slug/{slug}",
    tag = "tenants",
    params(("slug" = String, Path, description = "Tenant slug")),
    responses(
        (status = 200, description = "Active tenant", body = Tenant),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_tenant_by_slug(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant = state
        .db
        .tenants
        .get_by_slug(&slug)
        .await?
        .filter(Tenant::is_active)
        .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))?;
    Ok(Json(tenant))
}

#[utoipa::path(
    get,
    path = "/api/tenants/{id}/branding",
    tag = "tenants",
    params(("id" = Uuid, Path, description = "Tenant ID")),
    responses((status = 200, description = "Branding, or platform defaults", body = TenantBranding))
)]
#[tracing::instrument(skip(state))]
pub async fn get_branding(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state
        .db
        .tenants
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))?;
    Ok(Json(state.db.branding.get_or_default(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/admin/branding",
    tag = "admin",
    request_body = UpsertBrandingRequest,
    responses(
        (status = 200, description = "Saved branding", body = TenantBranding),
        (status = 400, description = "Invalid colors or URLs", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn upsert_branding(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    ValidatedJson(request): ValidatedJson<UpsertBrandingRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant_id = ctx.require_tenant_admin()?;
    let branding = state.db.branding.upsert(tenant_id, &request).await?;
    state.audit.admin_change(
        &ctx,
        AuditEventType::TenantChange,
        "tenant_branding",
        tenant_id,
        "upsert",
    );
    Ok(Json(branding))
}
