//! B2B organizations and their members
//!
//! Any signed-in user may create an organization and becomes its owner.
//! Organizations are invisible (404) to non-members; super admins act with
//! owner rights everywhere.

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
    AddMemberRequest, CreateOrganizationRequest, Invoice, InvoiceQuery, ListParams, OrgRole,
    Organization, OrganizationDetail, OrganizationMember, Page, UpdateMemberRequest,
    UpdateOrganizationRequest,
};
use venuehub_core::AppError;
use venuehub_db::db::control::InvoiceOwner;
use venuehub_infra::ErrorResponse;

/// Caller's role in the organization; non-members get 404.
async fn caller_role(
    state: &AppState,
    ctx: &SessionContext,
    organization_id: Uuid,
) -> Result<OrgRole, AppError> {
    let not_found = || AppError::NotFound("Organization not found".to_string());
    if ctx.is_super_admin() {
        state
            .db
            .organizations
            .get_by_id(organization_id)
            .await?
            .ok_or_else(not_found)?;
        return Ok(OrgRole::Owner);
    }
    state
        .db
        .organizations
        .member_role(organization_id, ctx.user_id)
        .await?
        .ok_or_else(not_found)
}

async fn require_manager(
    state: &AppState,
    ctx: &SessionContext,
    organization_id: Uuid,
) -> Result<OrgRole, AppError> {
    let role = caller_role(state, ctx, organization_id).await?;
    if !role.can_manage_members() {
        return Err(AppError::Forbidden(
            "Organization owner or admin access required".to_string(),
        ));
    }
    Ok(role)
}

#[utoipa::path(
    post,
    path = "/api/organizations",
    tag = "organizations",
    request_body = CreateOrganizationRequest,
    responses(
        (status = 201, description = "Organization created; caller is owner", body = Organization),
        (status = 409, description = "Slug already taken", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request), fields(slug = %request.slug))]
pub async fn create_organization(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    ValidatedJson(request): ValidatedJson<CreateOrganizationRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    if request.plan_id.is_some() && !ctx.is_super_admin() {
        return Err(AppError::Forbidden(
            "Only platform admins can assign a plan".to_string(),
        )
        .into());
    }
    let organization = state
        .db
        .organizations
        .create(ctx.user_id, &request)
        .await?;
    tracing::info!(organization_id = %organization.id, "Organization created");
    Ok((StatusCode::CREATED, Json(organization)))
}

#[utoipa::path(
    get,
    path = "/api/organizations",
    tag = "organizations",
    responses((status = 200, description = "Organizations the caller belongs to", body = Vec<Organization>))
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_my_organizations(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(
        state.db.organizations.list_for_user(ctx.user_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/organizations",
    tag = "admin",
    params(ListParams),
    responses((status = 200, description = "All organizations", body = Page<Organization>))
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn admin_list_organizations(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    Ok(Json(state.db.organizations.list(&params).await?))
}

#[utoipa::path(
    get,
    path = "/api/organizations/{id}",
    tag = "organizations",
    params(("id" = Uuid, Path, description = "Organization ID")),
    responses(
        (status = 200, description = "Organization with members", body = OrganizationDetail),
        (status = 404, description = "Not found or not a member", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn get_organization(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    caller_role(&state, &ctx, id).await?;
    let organization = state
        .db
        .organizations
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;
    let members = state.db.organizations.list_members(id).await?;
    Ok(Json(OrganizationDetail {
        organization,
        members,
    }))
}

#[utoipa::path(
    put,
    path = "/api/organizations/{id}",
    tag = "organizations",
    params(("id" = Uuid, Path, description = "Organization ID")),
    request_body = UpdateOrganizationRequest,
    responses(
        (status = 200, description = "Updated organization", body = Organization),
        (status = 403, description = "Not an owner or admin", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn update_organization(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateOrganizationRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    require_manager(&state, &ctx, id).await?;
    let billing_change = request.plan_id.is_some() || request.subscription_status.is_some();
    if billing_change && !ctx.is_super_admin() {
        return Err(AppError::Forbidden(
            "Only platform admins can change the plan or subscription".to_string(),
        )
        .into());
    }

    let organization = state
        .db
        .organizations
        .update(id, &request)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;
    Ok(Json(organization))
}

#[utoipa::path(
    delete,
    path = "/api/organizations/{id}",
    tag = "organizations",
    params(("id" = Uuid, Path, description = "Organization ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Owner only", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn delete_organization(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    if caller_role(&state, &ctx, id).await? != OrgRole::Owner {
        return Err(AppError::Forbidden("Organization owner access required".to_string()).into());
    }
    if !state.db.organizations.delete(id).await? {
        return Err(AppError::NotFound("Organization not found".to_string()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/organizations/{id}/members",
    tag = "organizations",
    params(("id" = Uuid, Path, description = "Organization ID")),
    responses(
        (status = 200, description = "Members", body = Vec<OrganizationMember>),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    caller_role(&state, &ctx, id).await?;
    Ok(Json(state.db.organizations.list_members(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/organizations/{id}/members",
    tag = "organizations",
    params(("id" = Uuid, Path, description = "Organization ID")),
    request_body = AddMemberRequest,
    responses(
        (status = 201, description = "Member added", body = OrganizationMember),
        (status = 400, description = "Seat limit reached or role not assignable", body = ErrorResponse),
        (status = 404, description = "Organization or user not found", body = ErrorResponse),
        (status = 409, description = "Already a member", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn add_member(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<AddMemberRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    require_manager(&state, &ctx, id).await?;
    let member = state
        .db
        .organizations
        .add_member(id, &request.email.trim().to_lowercase(), request.role)
        .await?;
    Ok((StatusCode::CREATED, Json(member)))
}

#[utoipa::path(
    put,
    path = "/api/organizations/{id}/members/{user_id}",
    tag = "organizations",
    params(
        ("id" = Uuid, Path, description = "Organization ID"),
        ("user_id" = Uuid, Path, description = "Member user ID")
    ),
    request_body = UpdateMemberRequest,
    responses(
        (status = 204, description = "Role updated"),
        (status = 404, description = "Not a member", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn update_member(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(request): ValidatedJson<UpdateMemberRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    require_manager(&state, &ctx, id).await?;
    if !state
        .db
        .organizations
        .update_member_role(id, user_id, request.role)
        .await?
    {
        return Err(AppError::NotFound("Member not found".to_string()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Managers remove anyone but the owner; members may remove themselves.
#[utoipa::path(
    delete,
    path = "/api/organizations/{id}/members/{user_id}",
    tag = "organizations",
    params(
        ("id" = Uuid, Path, description = "Organization ID"),
        ("user_id" = Uuid, Path, description = "Member user ID")
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 400, description = "The owner cannot be removed", body = ErrorResponse),
        (status = 404, description = "Not a member", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, HttpAppError> {
    if user_id == ctx.user_id {
        caller_role(&state, &ctx, id).await?;
    } else {
        require_manager(&state, &ctx, id).await?;
    }
    if !state.db.organizations.remove_member(id, user_id).await? {
        return Err(AppError::NotFound("Member not found".to_string()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/organizations/{id}/invoices",
    tag = "organizations",
    params(("id" = Uuid, Path, description = "Organization ID"), InvoiceQuery),
    responses(
        (status = 200, description = "Organization invoices", body = Page<Invoice>),
        (status = 403, description = "Billing access required", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_organization_invoices(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
    Query(query): Query<InvoiceQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !caller_role(&state, &ctx, id).await?.can_view_billing() {
        return Err(AppError::Forbidden("Billing access required".to_string()).into());
    }
    let page = state
        .db
        .invoices
        .list(InvoiceOwner::Organization(id), &query)
        .await?;
    Ok(Json(page))
}
