use crate::auth::SessionContext;
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use venuehub_core::models::{AuditLog, AuditLogQuery, Page};
use venuehub_infra::ErrorResponse;

#[utoipa::path(
    get,
    path = "/api/admin/audit-logs",
    tag = "admin",
    params(AuditLogQuery),
    responses(
        (status = 200, description = "Security audit trail, newest first", body = Page<AuditLog>),
        (status = 403, description = "Super admin only", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_audit_logs(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Query(query): Query<AuditLogQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    Ok(Json(state.db.audit_logs.list(&query).await?))
}
