use sqlx::{PgPool, Postgres};
use venuehub_core::models::{AuditEvent, AuditLog, AuditLogQuery, ListParams, Page};
use venuehub_core::AppError;

#[derive(Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, event), fields(db.table = "audit_logs", db.operation = "insert", event_type = %event.event_type))]
    pub async fn insert(&self, event: &AuditEvent) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (
                event_type, actor_user_id, tenant_id, resource_type, resource_id, ip_address, success, details
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(event.event_type.as_str())
        .bind(event.actor_user_id)
        .bind(event.tenant_id)
        .bind(&event.resource_type)
        .bind(event.resource_id)
        .bind(&event.ip_address)
        .bind(event.success)
        .bind(&event.details)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "audit_logs", db.operation = "select"))]
    pub async fn list(&self, query: &AuditLogQuery) -> Result<Page<AuditLog>, AppError> {
        let params = ListParams {
            search: None,
            limit: query.limit,
            offset: query.offset,
        };

        let total = sqlx::query_scalar::<Postgres, i64>(
            r#"
            SELECT COUNT(*) FROM audit_logs
            WHERE ($1::text IS NULL OR event_type = $1)
              AND ($2::uuid IS NULL OR actor_user_id = $2)
              AND ($3::uuid IS NULL OR tenant_id = $3)
            "#,
        )
        .bind(&query.event_type)
        .bind(query.actor_user_id)
        .bind(query.tenant_id)
        .fetch_one(&self.pool)
        .await?;

        let logs = sqlx::query_as::<Postgres, AuditLog>(
            r#"
            SELECT * FROM audit_logs
            WHERE ($1::text IS NULL OR event_type = $1)
              AND ($2::uuid IS NULL OR actor_user_id = $2)
              AND ($3::uuid IS NULL OR tenant_id = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(&query.event_type)
        .bind(query.actor_user_id)
        .bind(query.tenant_id)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(logs, total, &params))
    }
}
