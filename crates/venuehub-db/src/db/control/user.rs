use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use venuehub_core::models::{ListParams, Page, UpdateUserRequest, User, UserRole};
use venuehub_core::AppError;

use crate::db::search_pattern;

/// New account row; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub phone: Option<&'a str>,
    pub password_hash: &'a str,
    pub role: UserRole,
    pub tenant_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a user. Emails are stored lowercase; duplicates map to `Conflict`.
    #[tracing::instrument(skip(self, user), fields(db.table = "users", db.operation = "insert"))]
    pub async fn create(&self, user: NewUser<'_>) -> Result<User, AppError> {
        let created = sqlx::query_as::<Postgres, User>(
            r#"
            INSERT INTO users (email, name, phone, password_hash, role, tenant_id)
            VALUES (LOWER($1), $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user.email.trim())
        .bind(user.name)
        .bind(user.phone)
        .bind(user.password_hash)
        .bind(user.role)
        .bind(user.tenant_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Failed to create user");
            AppError::from(e)
        })?;

        tracing::info!(user_id = %created.id, role = %created.role, "User created");
        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    #[tracing::instrument(skip(self, email), fields(db.table = "users", db.operation = "select"))]
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>(
            "SELECT * FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// List users, optionally filtered by name/email substring.
    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    pub async fn list(&self, params: &ListParams) -> Result<Page<User>, AppError> {
        let pattern = search_pattern(params.search());

        let total = sqlx::query_scalar::<Postgres, i64>(
            r#"
            SELECT COUNT(*) FROM users
            WHERE ($1::text IS NULL OR email ILIKE $1 OR name ILIKE $1)
            "#,
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let users = sqlx::query_as::<Postgres, User>(
            r#"
            SELECT * FROM users
            WHERE ($1::text IS NULL OR email ILIKE $1 OR name ILIKE $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(users, total, params))
    }

    /// Update role, tenant assignment or active flag.
    #[tracing::instrument(skip(self, request), fields(db.table = "users", db.operation = "update"))]
    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdateUserRequest,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>(
            r#"
            UPDATE users
            SET role = COALESCE($2, role),
                tenant_id = COALESCE($3, tenant_id),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.role)
        .bind(request.tenant_id)
        .bind(request.is_active)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(user) = &user {
            tracing::info!(user_id = %user.id, role = %user.role, "User updated");
        }
        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "delete"))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "update"))]
    pub async fn touch_last_login(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, user_id = %id, "Failed to update last_login_at");
                AppError::from(e)
            })?;
        Ok(())
    }
}
