//! Amenities, currencies and pricing models.

use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use venuehub_core::models::{
    Amenity, CreateAmenityRequest, CreateCurrencyRequest, CreatePricingModelRequest, Currency,
    ListParams, Page, PricingModel, UpdateAmenityRequest, UpdateCurrencyRequest,
    UpdatePricingModelRequest,
};
use venuehub_core::AppError;

use crate::db::search_pattern;

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "amenities", db.operation = "select"))]
    pub async fn list_amenities(&self, params: &ListParams) -> Result<Page<Amenity>, AppError> {
        let pattern = search_pattern(params.search());
        let total = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM amenities WHERE ($1::text IS NULL OR name ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;
        let items = sqlx::query_as::<Postgres, Amenity>(
            r#"
            SELECT * FROM amenities
            WHERE ($1::text IS NULL OR name ILIKE $1)
            ORDER BY name
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(Page::new(items, total, params))
    }

    #[tracing::instrument(skip(self), fields(db.table = "amenities", db.operation = "select"))]
    pub async fn get_amenity(&self, id: Uuid) -> Result<Option<Amenity>, AppError> {
        let amenity = sqlx::query_as::<Postgres, Amenity>("SELECT * FROM amenities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(amenity)
    }

    #[tracing::instrument(skip(self, request), fields(db.table = "amenities", db.operation = "insert"))]
    pub async fn create_amenity(&self, request: &CreateAmenityRequest) -> Result<Amenity, AppError> {
        let amenity = sqlx::query_as::<Postgres, Amenity>(
            "INSERT INTO amenities (name, icon) VALUES ($1, $2) RETURNING *",
        )
        .bind(request.name.trim())
        .bind(&request.icon)
        .fetch_one(&self.pool)
        .await?;
        Ok(amenity)
    }

    /// Insert unless an amenity with the same name exists. Returns whether a row was added.
    #[tracing::instrument(skip(self), fields(db.table = "amenities", db.operation = "insert"))]
    pub async fn ensure_amenity(&self, name: &str, icon: Option<&str>) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT INTO amenities (name, icon) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(name)
        .bind(icon)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self, request), fields(db.table = "amenities", db.operation = "update"))]
    pub async fn update_amenity(
        &self,
        id: Uuid,
        request: &UpdateAmenityRequest,
    ) -> Result<Option<Amenity>, AppError> {
        let amenity = sqlx::query_as::<Postgres, Amenity>(
            r#"
            UPDATE amenities
            SET name = COALESCE($2, name), icon = COALESCE($3, icon), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.icon)
        .fetch_optional(&self.pool)
        .await?;
        Ok(amenity)
    }

    #[tracing::instrument(skip(self), fields(db.table = "amenities", db.operation = "delete"))]
    pub async fn delete_amenity(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM amenities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "currencies", db.operation = "select"))]
    pub async fn list_currencies(&self, params: &ListParams) -> Result<Page<Currency>, AppError> {
        let pattern = search_pattern(params.search());
        let total = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM currencies WHERE ($1::text IS NULL OR code ILIKE $1 OR name ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;
        let items = sqlx::query_as::<Postgres, Currency>(
            r#"
            SELECT * FROM currencies
            WHERE ($1::text IS NULL OR code ILIKE $1 OR name ILIKE $1)
            ORDER BY code
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(Page::new(items, total, params))
    }

    #[tracing::instrument(skip(self), fields(db.table = "currencies", db.operation = "select"))]
    pub async fn get_currency(&self, id: Uuid) -> Result<Option<Currency>, AppError> {
        let currency =
            sqlx::query_as::<Postgres, Currency>("SELECT * FROM currencies WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(currency)
    }

    #[tracing::instrument(skip(self, request), fields(db.table = "currencies", db.operation = "insert"))]
    pub async fn create_currency(
        &self,
        request: &CreateCurrencyRequest,
    ) -> Result<Currency, AppError> {
        let currency = sqlx::query_as::<Postgres, Currency>(
            r#"
            INSERT INTO currencies (code, symbol, name, is_active)
            VALUES (UPPER($1), $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&request.code)
        .bind(&request.symbol)
        .bind(&request.name)
        .bind(request.is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(currency)
    }

    #[tracing::instrument(skip(self), fields(db.table = "currencies", db.operation = "insert"))]
    pub async fn ensure_currency(&self, code: &str, symbol: &str, name: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO currencies (code, symbol, name)
            VALUES (UPPER($1), $2, $3)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(code)
        .bind(symbol)
        .bind(name)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self, request), fields(db.table = "currencies", db.operation = "update"))]
    pub async fn update_currency(
        &self,
        id: Uuid,
        request: &UpdateCurrencyRequest,
    ) -> Result<Option<Currency>, AppError> {
        let currency = sqlx::query_as::<Postgres, Currency>(
            r#"
            UPDATE currencies
            SET symbol = COALESCE($2, symbol),
                name = COALESCE($3, name),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.symbol)
        .bind(&request.name)
        .bind(request.is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(currency)
    }

    #[tracing::instrument(skip(self), fields(db.table = "currencies", db.operation = "delete"))]
    pub async fn delete_currency(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM currencies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "pricing_models", db.operation = "select"))]
    pub async fn list_pricing_models(
        &self,
        params: &ListParams,
    ) -> Result<Page<PricingModel>, AppError> {
        let pattern = search_pattern(params.search());
        let total = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM pricing_models WHERE ($1::text IS NULL OR code ILIKE $1 OR name ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;
        let items = sqlx::query_as::<Postgres, PricingModel>(
            r#"
            SELECT * FROM pricing_models
            WHERE ($1::text IS NULL OR code ILIKE $1 OR name ILIKE $1)
            ORDER BY name
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(Page::new(items, total, params))
    }

    #[tracing::instrument(skip(self), fields(db.table = "pricing_models", db.operation = "select"))]
    pub async fn get_pricing_model(&self, id: Uuid) -> Result<Option<PricingModel>, AppError> {
        let model =
            sqlx::query_as::<Postgres, PricingModel>("SELECT * FROM pricing_models WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(model)
    }

    #[tracing::instrument(skip(self, request), fields(db.table = "pricing_models", db.operation = "insert"))]
    pub async fn create_pricing_model(
        &self,
        request: &CreatePricingModelRequest,
    ) -> Result<PricingModel, AppError> {
        let model = sqlx::query_as::<Postgres, PricingModel>(
            "INSERT INTO pricing_models (code, name, description) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&request.code)
        .bind(&request.name)
        .bind(&request.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(model)
    }

    #[tracing::instrument(skip(self), fields(db.table = "pricing_models", db.operation = "insert"))]
    pub async fn ensure_pricing_model(
        &self,
        code: &str,
        name: &str,
        description: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO pricing_models (code, name, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(code)
        .bind(name)
        .bind(description)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self, request), fields(db.table = "pricing_models", db.operation = "update"))]
    pub async fn update_pricing_model(
        &self,
        id: Uuid,
        request: &UpdatePricingModelRequest,
    ) -> Result<Option<PricingModel>, AppError> {
        let model = sqlx::query_as::<Postgres, PricingModel>(
            r#"
            UPDATE pricing_models
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.description)
        .fetch_optional(&self.pool)
        .await?;
        Ok(model)
    }

    #[tracing::instrument(skip(self), fields(db.table = "pricing_models", db.operation = "delete"))]
    pub async fn delete_pricing_model(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM pricing_models WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
