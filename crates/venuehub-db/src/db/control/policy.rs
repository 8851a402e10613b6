use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use venuehub_core::models::{
    CreatePolicyRequest, PolicyDocument, PolicyFilter, PolicyType, UpdatePolicyRequest,
    UserConsent,
};
use venuehub_core::AppError;

use crate::db::transaction::TransactionGuard;

#[derive(Clone)]
pub struct PolicyRepository {
    pool: PgPool,
}

impl PolicyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Documents of exactly one scope. A global lookup never includes
    /// tenant-scoped rows.
    #[tracing::instrument(skip(self), fields(db.table = "policy_documents", db.operation = "select"))]
    pub async fn list(
        &self,
        filter: PolicyFilter,
        policy_type: Option<PolicyType>,
        active_only: bool,
    ) -> Result<Vec<PolicyDocument>, AppError> {
        let tenant_id = match filter {
            PolicyFilter::GlobalOnly => None,
            PolicyFilter::TenantOnly(id) => Some(id),
        };

        let documents = sqlx::query_as::<Postgres, PolicyDocument>(
            r#"
            SELECT * FROM policy_documents
            WHERE (($1::uuid IS NULL AND tenant_id IS NULL) OR tenant_id = $1)
              AND ($2::policy_type IS NULL OR policy_type = $2)
              AND (NOT $3 OR is_active)
            ORDER BY policy_type, version DESC
            "#,
        )
        .bind(tenant_id)
        .bind(policy_type)
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(documents)
    }

    /// Active, already effective document of the highest version for the
    /// tenant, falling back to the global document.
    #[tracing::instrument(skip(self), fields(db.table = "policy_documents", db.operation = "select"))]
    pub async fn current(
        &self,
        policy_type: PolicyType,
        tenant_id: Option<Uuid>,
    ) -> Result<Option<PolicyDocument>, AppError> {
        let document = sqlx::query_as::<Postgres, PolicyDocument>(
            r#"
            SELECT * FROM policy_documents
            WHERE policy_type = $1
              AND is_active
              AND effective_from <= NOW()
              AND (tenant_id IS NULL OR tenant_id = $2)
            ORDER BY (tenant_id IS NULL), version DESC
            LIMIT 1
            "#,
        )
        .bind(policy_type)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(document)
    }

    #[tracing::instrument(skip(self), fields(db.table = "policy_documents", db.operation = "select"))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<PolicyDocument>, AppError> {
        let document = sqlx::query_as::<Postgres, PolicyDocument>(
            "SELECT * FROM policy_documents WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(document)
    }

    /// Publish a new version for `(tenant_id, type)`. Versions start at 1.
    #[tracing::instrument(skip(self, request), fields(db.table = "policy_documents", db.operation = "insert"))]
    pub async fn create(
        &self,
        tenant_id: Option<Uuid>,
        request: &CreatePolicyRequest,
    ) -> Result<PolicyDocument, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool, "create_policy").await?;

        let version = sqlx::query_scalar::<Postgres, i32>(
            r#"
            SELECT COALESCE(MAX(version), 0) + 1 FROM policy_documents
            WHERE policy_type = $1
              AND (($2::uuid IS NULL AND tenant_id IS NULL) OR tenant_id = $2)
            "#,
        )
        .bind(request.policy_type)
        .bind(tenant_id)
        .fetch_one(&mut **tx)
        .await?;

        let document = sqlx::query_as::<Postgres, PolicyDocument>(
            r#"
            INSERT INTO policy_documents (tenant_id, policy_type, version, title, content, is_active, effective_from)
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW()))
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(request.policy_type)
        .bind(version)
        .bind(&request.title)
        .bind(&request.content)
        .bind(request.is_active)
        .bind(request.effective_from)
        .fetch_one(&mut **tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            policy_id = %document.id,
            policy_type = ?document.policy_type,
            version = document.version,
            "Policy document published"
        );
        Ok(document)
    }

    #[tracing::instrument(skip(self, request), fields(db.table = "policy_documents", db.operation = "update"))]
    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdatePolicyRequest,
    ) -> Result<Option<PolicyDocument>, AppError> {
        let document = sqlx::query_as::<Postgres, PolicyDocument>(
            r#"
            UPDATE policy_documents
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                is_active = COALESCE($4, is_active),
                effective_from = COALESCE($5, effective_from),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.title)
        .bind(&request.content)
        .bind(request.is_active)
        .bind(request.effective_from)
        .fetch_optional(&self.pool)
        .await?;
        Ok(document)
    }

    #[tracing::instrument(skip(self), fields(db.table = "policy_documents", db.operation = "delete"))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM policy_documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record acceptance; accepting the same version again refreshes the record.
    #[tracing::instrument(skip(self, document, user_agent), fields(db.table = "user_consents", db.operation = "upsert"))]
    pub async fn record_consent(
        &self,
        user_id: Uuid,
        document: &PolicyDocument,
        ip_address: &str,
        user_agent: Option<&str>,
    ) -> Result<UserConsent, AppError> {
        let consent = sqlx::query_as::<Postgres, UserConsent>(
            r#"
            INSERT INTO user_consents (user_id, policy_id, policy_type, policy_version, tenant_id, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id, policy_id) DO UPDATE SET
                ip_address = EXCLUDED.ip_address,
                user_agent = EXCLUDED.user_agent,
                accepted_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(document.id)
        .bind(document.policy_type)
        .bind(document.version)
        .bind(document.tenant_id)
        .bind(ip_address)
        .bind(user_agent)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            user_id = %user_id,
            policy_id = %document.id,
            version = document.version,
            "Policy consent recorded"
        );
        Ok(consent)
    }

    #[tracing::instrument(skip(self), fields(db.table = "user_consents", db.operation = "select"))]
    pub async fn list_consents(&self, user_id: Uuid) -> Result<Vec<UserConsent>, AppError> {
        let consents = sqlx::query_as::<Postgres, UserConsent>(
            "SELECT * FROM user_consents WHERE user_id = $1 ORDER BY accepted_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(consents)
    }
}
