//! Legal policy documents and user consent
//!
//! Documents are versioned per `(tenant, type)`. Platform documents have no
//! tenant and serve as the fallback for tenants without their own.

use crate::auth::SessionContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use crate::utils::ip_extraction::ClientIp;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use venuehub_core::models::{
    CreatePolicyRequest, CurrentPolicyQuery, PolicyDocument, PolicyQuery, RecordConsentRequest,
    UpdatePolicyRequest, UserConsent,
};
use venuehub_core::AppError;
use venuehub_infra::ErrorResponse;

const MAX_USER_AGENT_LEN: usize = 512;

#[utoipa::path(
    get,
    path = "/api/policies",
    tag = "policies",
    params(PolicyQuery),
    responses(
        (status = 200, description = "Documents in the requested scope", body = Vec<PolicyDocument>),
        (status = 400, description = "scope=tenant without tenantId", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn list_policies(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PolicyQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let documents = state
        .db
        .policies
        .list(query.filter()?, query.policy_type, query.active_only)
        .await?;
    Ok(Json(documents))
}

#[utoipa::path(
    get,
    path = "/api/policies/current",
    tag = "policies",
    params(CurrentPolicyQuery),
    responses(
        (status = 200, description = "Latest active version, tenant first then platform", body = PolicyDocument),
        (status = 404, description = "No active document of that type", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn current_policy(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CurrentPolicyQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let document = state
        .db
        .policies
        .current(query.policy_type, query.tenant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Policy not found".to_string()))?;
    Ok(Json(document))
}

#[utoipa::path(
    post,
    path = "/api/policies/consent",
    tag = "policies",
    request_body = RecordConsentRequest,
    responses(
        (status = 201, description = "Consent recorded with version and client IP", body = UserConsent),
        (status = 400, description = "Policy is not active", body = ErrorResponse),
        (status = 404, description = "Policy not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, headers, request), fields(policy_id = %request.policy_id))]
pub async fn record_consent(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    client_ip: ClientIp,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<RecordConsentRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let document = state
        .db
        .policies
        .get_by_id(request.policy_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Policy not found".to_string()))?;
    if !document.is_active {
        return Err(AppError::BadRequest("Policy is no longer active".to_string()).into());
    }

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(|ua| {
            let end = ua
                .char_indices()
                .nth(MAX_USER_AGENT_LEN)
                .map_or(ua.len(), |(i, _)| i);
            &ua[..end]
        });

    let consent = state
        .db
        .policies
        .record_consent(ctx.user_id, &document, client_ip.as_str(), user_agent)
        .await?;
    Ok((StatusCode::CREATED, Json(consent)))
}

#[utoipa::path(
    get,
    path = "/api/policies/consents",
    tag = "policies",
    responses((status = 200, description = "Caller's consents, newest first", body = Vec<UserConsent>))
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_my_consents(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.db.policies.list_consents(ctx.user_id).await?))
}

/// Super admins write platform documents, tenant admins their tenant's.
fn owning_tenant(ctx: &SessionContext) -> Result<Option<Uuid>, AppError> {
    if ctx.is_super_admin() {
        Ok(None)
    } else {
        ctx.require_tenant_admin().map(Some)
    }
}

async fn load_writable(
    state: &AppState,
    ctx: &SessionContext,
    id: Uuid,
) -> Result<PolicyDocument, AppError> {
    let owner = owning_tenant(ctx)?;
    state
        .db
        .policies
        .get_by_id(id)
        .await?
        .filter(|document| owner.is_none() || document.tenant_id == owner)
        .ok_or_else(|| AppError::NotFound("Policy not found".to_string()))
}

#[utoipa::path(
    post,
    path = "/api/admin/policies",
    tag = "admin",
    request_body = CreatePolicyRequest,
    responses(
        (status = 201, description = "New version created", body = PolicyDocument),
        (status = 403, description = "Admin only", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request), fields(policy_type = ?request.policy_type))]
pub async fn create_policy(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    ValidatedJson(request): ValidatedJson<CreatePolicyRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant_id = owning_tenant(&ctx)?;
    let document = state.db.policies.create(tenant_id, &request).await?;
    tracing::info!(
        policy_id = %document.id,
        version = document.version,
        tenant_id = ?document.tenant_id,
        "Policy version created"
    );
    Ok((StatusCode::CREATED, Json(document)))
}

#[utoipa::path(
    put,
    path = "/api/admin/policies/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Policy ID")),
    request_body = UpdatePolicyRequest,
    responses(
        (status = 200, description = "Updated document", body = PolicyDocument),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn update_policy(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdatePolicyRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    load_writable(&state, &ctx, id).await?;
    let document = state
        .db
        .policies
        .update(id, &request)
        .await?
        .ok_or_else(|| AppError::NotFound("Policy not found".to_string()))?;
    Ok(Json(document))
}

#[utoipa::path(
    delete,
    path = "/api/admin/policies/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Policy ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn delete_policy(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    load_writable(&state, &ctx, id).await?;
    if !state.db.policies.delete(id).await? {
        return Err(AppError::NotFound("Policy not found".to_string()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
