use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use venuehub_core::models::{
    ensure_assignable_role, ensure_seat_available, ensure_seat_limit_covers,
    CreateOrganizationRequest, ListParams, OrgRole, Organization, OrganizationMember, Page,
    UpdateOrganizationRequest,
};
use venuehub_core::AppError;

use crate::db::search_pattern;
use crate::db::transaction::TransactionGuard;

const MEMBER_COLUMNS: &str = r#"
    m.organization_id, m.user_id, m.role, u.email, u.name, m.joined_at
"#;

#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an organization owned by `owner_user_id`; the owner takes the first seat.
    #[tracing::instrument(skip(self, request), fields(db.table = "organizations", db.operation = "insert"))]
    pub async fn create(
        &self,
        owner_user_id: Uuid,
        request: &CreateOrganizationRequest,
    ) -> Result<Organization, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool, "create_organization").await?;

        let organization = sqlx::query_as::<Postgres, Organization>(
            r#"
            INSERT INTO organizations (name, slug, owner_user_id, billing_email, plan_id, seat_limit)
            VALUES ($1, $2, $3, LOWER($4), $5, $6)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.slug)
        .bind(owner_user_id)
        .bind(&request.billing_email)
        .bind(request.plan_id)
        .bind(request.seat_limit)
        .fetch_one(&mut **tx)
        .await?;

        sqlx::query(
            "INSERT INTO organization_members (organization_id, user_id, role) VALUES ($1, $2, 'owner')",
        )
        .bind(organization.id)
        .bind(owner_user_id)
        .execute(&mut **tx)
        .await?;

        tx.commit().await?;

        tracing::info!(organization_id = %organization.id, "Organization created");
        Ok(organization)
    }

    #[tracing::instrument(skip(self), fields(db.table = "organizations", db.operation = "select"))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Organization>, AppError> {
        let organization =
            sqlx::query_as::<Postgres, Organization>("SELECT * FROM organizations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(organization)
    }

    /// All organizations (super admin view).
    #[tracing::instrument(skip(self), fields(db.table = "organizations", db.operation = "select"))]
    pub async fn list(&self, params: &ListParams) -> Result<Page<Organization>, AppError> {
        let pattern = search_pattern(params.search());

        let total = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM organizations WHERE ($1::text IS NULL OR name ILIKE $1 OR slug ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let organizations = sqlx::query_as::<Postgres, Organization>(
            r#"
            SELECT * FROM organizations
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

        Ok(Page::new(organizations, total, params))
    }

    /// Organizations the user belongs to.
    #[tracing::instrument(skip(self), fields(db.table = "organizations", db.operation = "select"))]
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Organization>, AppError> {
        let organizations = sqlx::query_as::<Postgres, Organization>(
            r#"
            SELECT o.* FROM organizations o
            JOIN organization_members m ON m.organization_id = o.id
            WHERE m.user_id = $1
            ORDER BY o.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(organizations)
    }

    /// Partial update. A lowered seat limit must still cover the current
    /// members; the row is locked so no member is added in between.
    #[tracing::instrument(skip(self, request), fields(db.table = "organizations", db.operation = "update"))]
    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdateOrganizationRequest,
    ) -> Result<Option<Organization>, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool, "update_organization").await?;

        let exists = sqlx::query_scalar::<Postgres, Uuid>(
            "SELECT id FROM organizations WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
        if exists.is_none() {
            return Ok(None);
        }

        if let Some(seat_limit) = request.seat_limit {
            let current = sqlx::query_scalar::<Postgres, i64>(
                "SELECT COUNT(*) FROM organization_members WHERE organization_id = $1",
            )
            .bind(id)
            .fetch_one(&mut **tx)
            .await?;
            ensure_seat_limit_covers(current, seat_limit)?;
        }

        let organization = sqlx::query_as::<Postgres, Organization>(
            r#"
            UPDATE organizations
            SET name = COALESCE($2, name),
                billing_email = COALESCE(LOWER($3), billing_email),
                plan_id = COALESCE($4, plan_id),
                subscription_status = COALESCE($5, subscription_status),
                seat_limit = COALESCE($6, seat_limit),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.billing_email)
        .bind(request.plan_id)
        .bind(request.subscription_status)
        .bind(request.seat_limit)
        .fetch_one(&mut **tx)
        .await?;

        tx.commit().await?;
        Ok(Some(organization))
    }

    #[tracing::instrument(skip(self), fields(db.table = "organizations", db.operation = "delete"))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "organization_members", db.operation = "select"))]
    pub async fn list_members(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<OrganizationMember>, AppError> {
        let members = sqlx::query_as::<Postgres, OrganizationMember>(&format!(
            r#"
            SELECT {MEMBER_COLUMNS}
            FROM organization_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.organization_id = $1
            ORDER BY m.joined_at
            "#
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    /// Role of `user_id` inside the organization, if a member.
    #[tracing::instrument(skip(self), fields(db.table = "organization_members", db.operation = "select"))]
    pub async fn member_role(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<OrgRole>, AppError> {
        let role = sqlx::query_scalar::<Postgres, OrgRole>(
            "SELECT role FROM organization_members WHERE organization_id = $1 AND user_id = $2",
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(role)
    }

    /// Add an existing user by email. The organization row is locked so
    /// concurrent additions cannot exceed the seat limit.
    #[tracing::instrument(skip(self, email), fields(db.table = "organization_members", db.operation = "insert"))]
    pub async fn add_member(
        &self,
        organization_id: Uuid,
        email: &str,
        role: OrgRole,
    ) -> Result<OrganizationMember, AppError> {
        ensure_assignable_role(role)?;

        let mut tx = TransactionGuard::begin(&self.pool, "add_organization_member").await?;

        let seat_limit = sqlx::query_scalar::<Postgres, i32>(
            "SELECT seat_limit FROM organizations WHERE id = $1 FOR UPDATE",
        )
        .bind(organization_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

        let current = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM organization_members WHERE organization_id = $1",
        )
        .bind(organization_id)
        .fetch_one(&mut **tx)
        .await?;
        ensure_seat_available(current, seat_limit)?;

        let user_id = sqlx::query_scalar::<Postgres, Uuid>(
            "SELECT id FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email.trim())
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("No user with that email".to_string()))?;

        sqlx::query(
            "INSERT INTO organization_members (organization_id, user_id, role) VALUES ($1, $2, $3)",
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(role)
        .execute(&mut **tx)
        .await?;

        let member = sqlx::query_as::<Postgres, OrganizationMember>(&format!(
            r#"
            SELECT {MEMBER_COLUMNS}
            FROM organization_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.organization_id = $1 AND m.user_id = $2
            "#
        ))
        .bind(organization_id)
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            organization_id = %organization_id,
            user_id = %user_id,
            "Organization member added"
        );
        Ok(member)
    }

    /// Change a member's role. The owner row is never touched.
    #[tracing::instrument(skip(self), fields(db.table = "organization_members", db.operation = "update"))]
    pub async fn update_member_role(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        role: OrgRole,
    ) -> Result<bool, AppError> {
        ensure_assignable_role(role)?;
        self.ensure_not_owner(organization_id, user_id).await?;

        let result = sqlx::query(
            r#"
            UPDATE organization_members SET role = $3
            WHERE organization_id = $1 AND user_id = $2 AND role <> 'owner'
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(role)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "organization_members", db.operation = "delete"))]
    pub async fn remove_member(&self, organization_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        self.ensure_not_owner(organization_id, user_id).await?;

        let result = sqlx::query(
            r#"
            DELETE FROM organization_members
            WHERE organization_id = $1 AND user_id = $2 AND role <> 'owner'
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ensure_not_owner(&self, organization_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        if self.member_role(organization_id, user_id).await? == Some(OrgRole::Owner) {
            return Err(AppError::BadRequest(
                "The organization owner cannot be removed or demoted".to_string(),
            ));
        }
        Ok(())
    }
}
