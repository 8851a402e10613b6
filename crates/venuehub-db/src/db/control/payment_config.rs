use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use venuehub_core::models::{PaymentConfig, PaymentGateway};
use venuehub_core::AppError;

/// Encrypted gateway settings ready to store
#[derive(Debug, Clone)]
pub struct EncryptedPaymentConfig {
    pub gateway: PaymentGateway,
    pub key_id: String,
    pub key_secret_encrypted: String,
    pub webhook_secret_encrypted: Option<String>,
    pub is_live: bool,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct PaymentConfigRepository {
    pool: PgPool,
}

impl PaymentConfigRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "payment_configs", db.operation = "select"))]
    pub async fn get(&self, tenant_id: Uuid) -> Result<Option<PaymentConfig>, AppError> {
        let config = sqlx::query_as::<Postgres, PaymentConfig>(
            "SELECT * FROM payment_configs WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(config)
    }

    #[tracing::instrument(skip(self, config), fields(db.table = "payment_configs", db.operation = "upsert"))]
    pub async fn upsert(
        &self,
        tenant_id: Uuid,
        config: &EncryptedPaymentConfig,
    ) -> Result<PaymentConfig, AppError> {
        let saved = sqlx::query_as::<Postgres, PaymentConfig>(
            r#"
            INSERT INTO payment_configs (
                tenant_id, gateway, key_id, key_secret_encrypted, webhook_secret_encrypted, is_live, is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (tenant_id) DO UPDATE SET
                gateway = EXCLUDED.gateway,
                key_id = EXCLUDED.key_id,
                key_secret_encrypted = EXCLUDED.key_secret_encrypted,
                webhook_secret_encrypted = EXCLUDED.webhook_secret_encrypted,
                is_live = EXCLUDED.is_live,
                is_active = EXCLUDED.is_active,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(config.gateway)
        .bind(&config.key_id)
        .bind(&config.key_secret_encrypted)
        .bind(&config.webhook_secret_encrypted)
        .bind(config.is_live)
        .bind(config.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, tenant_id = %tenant_id, "Failed to save payment config");
            AppError::from(e)
        })?;

        tracing::info!(tenant_id = %tenant_id, gateway = ?saved.gateway, "Payment config saved");
        Ok(saved)
    }

    #[tracing::instrument(skip(self), fields(db.table = "payment_configs", db.operation = "delete"))]
    pub async fn delete(&self, tenant_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM payment_configs WHERE tenant_id = $1")
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
