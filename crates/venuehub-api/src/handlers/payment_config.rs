//! Tenant payment gateway credentials
//!
//! Secrets are encrypted with AES-256-GCM before they reach the database and
//! only ever leave the API masked.

use crate::auth::SessionContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use venuehub_core::models::{
    AuditEventType, PaymentConfig, PaymentConfigResponse, UpsertPaymentConfigRequest,
};
use venuehub_core::AppError;
use venuehub_db::db::control::EncryptedPaymentConfig;
use venuehub_infra::ErrorResponse;

fn masked(state: &AppState, config: PaymentConfig) -> Result<PaymentConfigResponse, AppError> {
    let secret = state
        .security
        .encryption
        .decrypt(&config.key_secret_encrypted)?;
    Ok(PaymentConfigResponse::from_config(config, &secret))
}

#[utoipa::path(
    get,
    path = "/api/admin/payment-config",
    tag = "admin",
    responses(
        (status = 200, description = "Gateway settings with the secret masked", body = PaymentConfigResponse),
        (status = 404, description = "Not configured", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn get_payment_config(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant_id = ctx.require_tenant_admin()?;
    let config = state
        .db
        .payment_configs
        .get(tenant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Payment configuration not found".to_string()))?;
    Ok(Json(masked(&state, config)?))
}

#[utoipa::path(
    put,
    path = "/api/admin/payment-config",
    tag = "admin",
    request_body = UpsertPaymentConfigRequest,
    responses(
        (status = 200, description = "Saved settings with the secret masked", body = PaymentConfigResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request), fields(gateway = ?request.gateway))]
pub async fn upsert_payment_config(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    ValidatedJson(request): ValidatedJson<UpsertPaymentConfigRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant_id = ctx.require_tenant_admin()?;
    let encryption = &state.security.encryption;

    let webhook_secret_encrypted = request
        .webhook_secret
        .as_deref()
        .filter(|secret| !secret.is_empty())
        .map(|secret| encryption.encrypt(secret))
        .transpose()?;

    let config = state
        .db
        .payment_configs
        .upsert(
            tenant_id,
            &EncryptedPaymentConfig {
                gateway: request.gateway,
                key_id: request.key_id.trim().to_string(),
                key_secret_encrypted: encryption.encrypt(&request.key_secret)?,
                webhook_secret_encrypted,
                is_live: request.is_live,
                is_active: request.is_active,
            },
        )
        .await?;

    state.audit.admin_change(
        &ctx,
        AuditEventType::PaymentConfigChange,
        "payment_config",
        tenant_id,
        "upsert",
    );
    Ok(Json(PaymentConfigResponse::from_config(
        config,
        &request.key_secret,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/admin/payment-config",
    tag = "admin",
    responses(
        (status = 204, description = "Removed"),
        (status = 404, description = "Not configured", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn delete_payment_config(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant_id = ctx.require_tenant_admin()?;
    if !state.db.payment_configs.delete(tenant_id).await? {
        return Err(AppError::NotFound("Payment configuration not found".to_string()).into());
    }
    state.audit.admin_change(
        &ctx,
        AuditEventType::PaymentConfigChange,
        "payment_config",
        tenant_id,
        "delete",
    );
    Ok(StatusCode::NO_CONTENT)
}
