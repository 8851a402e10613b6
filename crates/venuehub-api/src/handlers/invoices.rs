//! Invoices: issued by super admins, read by the billed tenant or organization

use crate::auth::SessionContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::handlers::ensure_tenant_visible;
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
    AuditEventType, CreateInvoiceRequest, Invoice, InvoiceQuery, Page, UpdateInvoiceStatusRequest,
};
use venuehub_core::AppError;
use venuehub_db::db::control::InvoiceOwner;
use venuehub_infra::ErrorResponse;

#[utoipa::path(
    get,
    path = "/api/admin/invoices",
    tag = "admin",
    params(InvoiceQuery),
    responses(
        (status = 200, description = "Own tenant's invoices, or any for super admins", body = Page<Invoice>),
        (status = 403, description = "Admin only", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_invoices(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Query(query): Query<InvoiceQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let owner = match ctx.admin_tenant_filter()? {
        Some(tenant_id) => InvoiceOwner::Tenant(tenant_id),
        None => InvoiceOwner::Any,
    };
    Ok(Json(state.db.invoices.list(owner, &query).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/invoices",
    tag = "admin",
    request_body = CreateInvoiceRequest,
    responses(
        (status = 201, description = "Invoice created with the next number", body = Invoice),
        (status = 400, description = "Invalid line items or billed party", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn create_invoice(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    ValidatedJson(request): ValidatedJson<CreateInvoiceRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    let invoice = state.db.invoices.create(&request).await?;
    tracing::info!(
        invoice_id = %invoice.id,
        invoice_number = %invoice.invoice_number,
        total = %invoice.total,
        "Invoice created"
    );
    state.audit.admin_change(
        &ctx,
        AuditEventType::PlanChange,
        "invoice",
        invoice.id,
        "create",
    );
    Ok((StatusCode::CREATED, Json(invoice)))
}

#[utoipa::path(
    get,
    path = "/api/admin/invoices/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice", body = Invoice),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn get_invoice(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let filter = ctx.admin_tenant_filter()?;
    let invoice = state
        .db
        .invoices
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Invoice not found".to_string()))?;

    match (filter, invoice.tenant_id) {
        (None, _) => {}
        (Some(_), Some(owner)) => ensure_tenant_visible(filter, owner, "Invoice")?,
        (Some(_), None) => return Err(AppError::NotFound("Invoice not found".to_string()).into()),
    }
    Ok(Json(invoice))
}

#[utoipa::path(
    put,
    path = "/api/admin/invoices/{id}/status",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    request_body = UpdateInvoiceStatusRequest,
    responses(
        (status = 200, description = "Updated invoice", body = Invoice),
        (status = 400, description = "Transition not allowed", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request), fields(next = request.status.as_str()))]
pub async fn update_invoice_status(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateInvoiceStatusRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_super_admin()?;
    let invoice = state.db.invoices.update_status(id, request.status).await?;
    state.audit.admin_change(
        &ctx,
        AuditEventType::PlanChange,
        "invoice",
        id,
        request.status.as_str(),
    );
    Ok(Json(invoice))
}
