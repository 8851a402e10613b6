use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use venuehub_core::models::{
    CreateProductRequest, ListParams, Page, Product, UpdateProductRequest,
};
use venuehub_core::AppError;

use crate::db::search_pattern;

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, request), fields(db.table = "products", db.operation = "insert"))]
    pub async fn create(
        &self,
        tenant_id: Uuid,
        request: &CreateProductRequest,
    ) -> Result<Product, AppError> {
        let product = sqlx::query_as::<Postgres, Product>(
            r#"
            INSERT INTO products (tenant_id, name, sku, description, price, currency, stock, category, images)
            VALUES ($1, $2, $3, $4, $5, UPPER($6), $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(&request.name)
        .bind(&request.sku)
        .bind(&request.description)
        .bind(request.price)
        .bind(&request.currency)
        .bind(request.stock)
        .bind(&request.category)
        .bind(&request.images)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(product_id = %product.id, sku = %product.sku, "Product created");
        Ok(product)
    }

    #[tracing::instrument(skip(self), fields(db.table = "products", db.operation = "select"))]
    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<Postgres, Product>(
            "SELECT * FROM products WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    /// Tenant catalogue; `active_only` hides drafts from shoppers.
    #[tracing::instrument(skip(self), fields(db.table = "products", db.operation = "select"))]
    pub async fn list(
        &self,
        tenant_id: Uuid,
        active_only: bool,
        params: &ListParams,
    ) -> Result<Page<Product>, AppError> {
        let pattern = search_pattern(params.search());

        let filter = r#"
            FROM products
            WHERE tenant_id = $1
              AND (NOT $2 OR is_active)
              AND ($3::text IS NULL OR name ILIKE $3 OR sku ILIKE $3 OR category ILIKE $3)
        "#;

        let total = sqlx::query_scalar::<Postgres, i64>(&format!("SELECT COUNT(*) {filter}"))
            .bind(tenant_id)
            .bind(active_only)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        let products = sqlx::query_as::<Postgres, Product>(&format!(
            "SELECT * {filter} ORDER BY name LIMIT $4 OFFSET $5"
        ))
        .bind(tenant_id)
        .bind(active_only)
        .bind(&pattern)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(products, total, params))
    }

    #[tracing::instrument(skip(self, request), fields(db.table = "products", db.operation = "update"))]
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        request: &UpdateProductRequest,
    ) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<Postgres, Product>(
            r#"
            UPDATE products
            SET name = COALESCE($3, name),
                description = COALESCE($4, description),
                price = COALESCE($5, price),
                stock = COALESCE($6, stock),
                category = COALESCE($7, category),
                images = COALESCE($8, images),
                is_active = COALESCE($9, is_active),
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.price)
        .bind(request.stock)
        .bind(&request.category)
        .bind(&request.images)
        .bind(request.is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    #[tracing::instrument(skip(self), fields(db.table = "products", db.operation = "delete"))]
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
