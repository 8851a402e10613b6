use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use venuehub_core::models::{
    CreatePlanRequest, ListParams, Page, SubscriptionPlan, UpdatePlanRequest,
};
use venuehub_core::AppError;

use crate::db::search_pattern;

#[derive(Clone)]
pub struct PlanRepository {
    pool: PgPool,
}

impl PlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, request), fields(db.table = "subscription_plans", db.operation = "insert"))]
    pub async fn create(&self, request: &CreatePlanRequest) -> Result<SubscriptionPlan, AppError> {
        let plan = sqlx::query_as::<Postgres, SubscriptionPlan>(
            r#"
            INSERT INTO subscription_plans (
                code, name, description, price_monthly, price_yearly, currency, limits, features
            )
            VALUES ($1, $2, $3, $4, $5, UPPER($6), $7, $8)
            RETURNING *
            "#,
        )
        .bind(&request.code)
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.price_monthly)
        .bind(request.price_yearly)
        .bind(&request.currency)
        .bind(Json(&request.limits))
        .bind(&request.features)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(plan_id = %plan.id, code = %plan.code, "Subscription plan created");
        Ok(plan)
    }

    #[tracing::instrument(skip(self), fields(db.table = "subscription_plans", db.operation = "select"))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<SubscriptionPlan>, AppError> {
        let plan = sqlx::query_as::<Postgres, SubscriptionPlan>(
            "SELECT * FROM subscription_plans WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(plan)
    }

    #[tracing::instrument(skip(self), fields(db.table = "subscription_plans", db.operation = "select"))]
    pub async fn get_by_code(&self, code: &str) -> Result<Option<SubscriptionPlan>, AppError> {
        let plan = sqlx::query_as::<Postgres, SubscriptionPlan>(
            "SELECT * FROM subscription_plans WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(plan)
    }

    /// Active plans for the public pricing page, cheapest first.
    #[tracing::instrument(skip(self), fields(db.table = "subscription_plans", db.operation = "select"))]
    pub async fn list_active(&self) -> Result<Vec<SubscriptionPlan>, AppError> {
        let plans = sqlx::query_as::<Postgres, SubscriptionPlan>(
            "SELECT * FROM subscription_plans WHERE is_active ORDER BY price_monthly, name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(plans)
    }

    #[tracing::instrument(skip(self), fields(db.table = "subscription_plans", db.operation = "select"))]
    pub async fn list(&self, params: &ListParams) -> Result<Page<SubscriptionPlan>, AppError> {
        let pattern = search_pattern(params.search());

        let total = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM subscription_plans WHERE ($1::text IS NULL OR name ILIKE $1 OR code ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let plans = sqlx::query_as::<Postgres, SubscriptionPlan>(
            r#"
            SELECT * FROM subscription_plans
            WHERE ($1::text IS NULL OR name ILIKE $1 OR code ILIKE $1)
            ORDER BY price_monthly, name
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(plans, total, params))
    }

    #[tracing::instrument(skip(self, request), fields(db.table = "subscription_plans", db.operation = "update"))]
    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdatePlanRequest,
    ) -> Result<Option<SubscriptionPlan>, AppError> {
        let plan = sqlx::query_as::<Postgres, SubscriptionPlan>(
            r#"
            UPDATE subscription_plans
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                price_monthly = COALESCE($4, price_monthly),
                price_yearly = COALESCE($5, price_yearly),
                limits = COALESCE($6, limits),
                features = COALESCE($7, features),
                is_active = COALESCE($8, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.price_monthly)
        .bind(request.price_yearly)
        .bind(request.limits.as_ref().map(Json))
        .bind(&request.features)
        .bind(request.is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(plan)
    }

    #[tracing::instrument(skip(self), fields(db.table = "subscription_plans", db.operation = "delete"))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM subscription_plans WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
