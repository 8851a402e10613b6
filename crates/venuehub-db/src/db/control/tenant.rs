use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use venuehub_core::models::{
    CreateTenantRequest, ListParams, Page, Tenant, TenantBranding, UpdateTenantRequest,
    UpsertBrandingRequest,
};
use venuehub_core::AppError;

use crate::db::search_pattern;
use crate::db::transaction::TransactionGuard;

#[derive(Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a tenant and promote its owner to `tenant_admin` in one
    /// transaction. Super admins keep their role.
    #[tracing::instrument(skip(self, request), fields(db.table = "tenants", db.operation = "insert"))]
    pub async fn create(&self, request: &CreateTenantRequest) -> Result<Tenant, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool, "create_tenant").await?;

        let owner = sqlx::query_scalar::<Postgres, Uuid>(
            "SELECT id FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(request.owner_user_id)
        .fetch_optional(&mut **tx)
        .await?;
        if owner.is_none() {
            return Err(AppError::NotFound("Owner user not found".to_string()));
        }

        let tenant = sqlx::query_as::<Postgres, Tenant>(
            r#"
            INSERT INTO tenants (name, slug, owner_user_id, modules, contact_email, contact_phone, plan_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.slug)
        .bind(request.owner_user_id)
        .bind(&request.modules)
        .bind(&request.contact_email)
        .bind(&request.contact_phone)
        .bind(request.plan_id)
        .fetch_one(&mut **tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE users
            SET role = CASE WHEN role = 'super_admin' THEN role ELSE 'tenant_admin'::user_role END,
                tenant_id = $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(request.owner_user_id)
        .bind(tenant.id)
        .execute(&mut **tx)
        .await?;

        tx.commit().await?;

        tracing::info!(tenant_id = %tenant.id, slug = %tenant.slug, "Tenant created");
        Ok(tenant)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tenants", db.operation = "select"))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<Postgres, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tenant)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tenants", db.operation = "select"))]
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<Postgres, Tenant>("SELECT * FROM tenants WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tenant)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tenants", db.operation = "select"))]
    pub async fn list(&self, params: &ListParams) -> Result<Page<Tenant>, AppError> {
        let pattern = search_pattern(params.search());

        let total = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM tenants WHERE ($1::text IS NULL OR name ILIKE $1 OR slug ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let tenants = sqlx::query_as::<Postgres, Tenant>(
            r#"
            SELECT * FROM tenants
            WHERE ($1::text IS NULL OR name ILIKE $1 OR slug ILIKE $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(tenants, total, params))
    }

    #[tracing::instrument(skip(self, request), fields(db.table = "tenants", db.operation = "update"))]
    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdateTenantRequest,
    ) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<Postgres, Tenant>(
            r#"
            UPDATE tenants
            SET name = COALESCE($2, name),
                modules = COALESCE($3, modules),
                status = COALESCE($4, status),
                contact_email = COALESCE($5, contact_email),
                contact_phone = COALESCE($6, contact_phone),
                plan_id = COALESCE($7, plan_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.modules)
        .bind(request.status)
        .bind(&request.contact_email)
        .bind(&request.contact_phone)
        .bind(request.plan_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(tenant) = &tenant {
            tracing::info!(tenant_id = %tenant.id, status = ?tenant.status, "Tenant updated");
        }
        Ok(tenant)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tenants", db.operation = "delete"))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tenants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(tenant_id = %id, "Tenant deleted");
        }
        Ok(deleted)
    }
}

/// White-label settings per tenant
#[derive(Clone)]
pub struct BrandingRepository {
    pool: PgPool,
}

impl BrandingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stored branding, or the platform default when none was saved.
    #[tracing::instrument(skip(self), fields(db.table = "tenant_branding", db.operation = "select"))]
    pub async fn get_or_default(&self, tenant_id: Uuid) -> Result<TenantBranding, AppError> {
        let branding = sqlx::query_as::<Postgres, TenantBranding>(
            "SELECT * FROM tenant_branding WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(branding.unwrap_or_else(|| TenantBranding::default_for(tenant_id)))
    }

    #[tracing::instrument(skip(self, request), fields(db.table = "tenant_branding", db.operation = "upsert"))]
    pub async fn upsert(
        &self,
        tenant_id: Uuid,
        request: &UpsertBrandingRequest,
    ) -> Result<TenantBranding, AppError> {
        let branding = sqlx::query_as::<Postgres, TenantBranding>(
            r#"
            INSERT INTO tenant_branding (
                tenant_id, logo_url, favicon_url, primary_color, secondary_color, custom_domain, tagline
            )
            VALUES ($1, $2, $3, UPPER($4), UPPER($5), LOWER($6), $7)
            ON CONFLICT (tenant_id) DO UPDATE SET
                logo_url = EXCLUDED.logo_url,
                favicon_url = EXCLUDED.favicon_url,
                primary_color = EXCLUDED.primary_color,
                secondary_color = EXCLUDED.secondary_color,
                custom_domain = EXCLUDED.custom_domain,
                tagline = EXCLUDED.tagline,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(&request.logo_url)
        .bind(&request.favicon_url)
        .bind(&request.primary_color)
        .bind(&request.secondary_color)
        .bind(&request.custom_domain)
        .bind(&request.tagline)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(tenant_id = %tenant_id, "Tenant branding saved");
        Ok(branding)
    }
}
