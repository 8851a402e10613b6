use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::encryption::mask_secret;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "payment_gateway", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum PaymentGateway {
    Razorpay,
    Stripe,
    Paypal,
}

/// Per-tenant gateway credentials; secrets are stored encrypted.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PaymentConfig {
    pub tenant_id: Uuid,
    pub gateway: PaymentGateway,
    pub key_id: String,
    pub key_secret_encrypted: String,
    pub webhook_secret_encrypted: Option<String>,
    pub is_live: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Gateway settings as shown to tenant admins. Secrets never leave the server.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfigResponse {
    pub tenant_id: Uuid,
    pub gateway: PaymentGateway,
    pub key_id: String,
    pub key_secret_masked: String,
    pub has_webhook_secret: bool,
    pub is_live: bool,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl PaymentConfigResponse {
    pub fn from_config(config: PaymentConfig, plaintext_secret: &str) -> Self {
        Self {
            tenant_id: config.tenant_id,
            gateway: config.gateway,
            key_id: config.key_id,
            key_secret_masked: mask_secret(plaintext_secret),
            has_webhook_secret: config.webhook_secret_encrypted.is_some(),
            is_live: config.is_live,
            is_active: config.is_active,
            updated_at: config.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertPaymentConfigRequest {
    pub gateway: PaymentGateway,
    #[validate(length(min = 1, max = 255, message = "Key id is required"))]
    pub key_id: String,
    #[validate(length(min = 1, max = 512, message = "Key secret is required"))]
    pub key_secret: String,
    #[validate(length(max = 512))]
    pub webhook_secret: Option<String>,
    #[serde(default)]
    pub is_live: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}
