use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use venuehub_core::models::{
    CreateGalleryItemRequest, GalleryItem, ListParams, Page, UpdateGalleryItemRequest,
};
use venuehub_core::AppError;

use crate::db::search_pattern;

#[derive(Clone)]
pub struct GalleryRepository {
    pool: PgPool,
}

impl GalleryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "gallery_items", db.operation = "select"))]
    pub async fn list(
        &self,
        tenant_id: Uuid,
        params: &ListParams,
    ) -> Result<Page<GalleryItem>, AppError> {
        let pattern = search_pattern(params.search());

        let total = sqlx::query_scalar::<Postgres, i64>(
            r#"
            SELECT COUNT(*) FROM gallery_items
            WHERE tenant_id = $1 AND ($2::text IS NULL OR title ILIKE $2 OR caption ILIKE $2)
            "#,
        )
        .bind(tenant_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<Postgres, GalleryItem>(
            r#"
            SELECT * FROM gallery_items
            WHERE tenant_id = $1 AND ($2::text IS NULL OR title ILIKE $2 OR caption ILIKE $2)
            ORDER BY sort_order, created_at
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(tenant_id)
        .bind(&pattern)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(items, total, params))
    }

    #[tracing::instrument(skip(self), fields(db.table = "gallery_items", db.operation = "select"))]
    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<GalleryItem>, AppError> {
        let item = sqlx::query_as::<Postgres, GalleryItem>(
            "SELECT * FROM gallery_items WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    /// Add an item. A `listing_id` must belong to the same tenant.
    #[tracing::instrument(skip(self, request), fields(db.table = "gallery_items", db.operation = "insert"))]
    pub async fn create(
        &self,
        tenant_id: Uuid,
        request: &CreateGalleryItemRequest,
    ) -> Result<GalleryItem, AppError> {
        let item = sqlx::query_as::<Postgres, GalleryItem>(
            r#"
            INSERT INTO gallery_items (tenant_id, listing_id, title, image_url, caption, sort_order)
            SELECT $1, $2, $3, $4, $5, $6
            WHERE $2::uuid IS NULL
               OR EXISTS (SELECT 1 FROM listings WHERE id = $2 AND tenant_id = $1)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(request.listing_id)
        .bind(&request.title)
        .bind(&request.image_url)
        .bind(&request.caption)
        .bind(request.sort_order)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;
        Ok(item)
    }

    #[tracing::instrument(skip(self, request), fields(db.table = "gallery_items", db.operation = "update"))]
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        request: &UpdateGalleryItemRequest,
    ) -> Result<Option<GalleryItem>, AppError> {
        let item = sqlx::query_as::<Postgres, GalleryItem>(
            r#"
            UPDATE gallery_items
            SET listing_id = COALESCE($3, listing_id),
                title = COALESCE($4, title),
                image_url = COALESCE($5, image_url),
                caption = COALESCE($6, caption),
                sort_order = COALESCE($7, sort_order),
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
              AND ($3::uuid IS NULL OR EXISTS (SELECT 1 FROM listings WHERE id = $3 AND tenant_id = $2))
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(request.listing_id)
        .bind(&request.title)
        .bind(&request.image_url)
        .bind(&request.caption)
        .bind(request.sort_order)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    #[tracing::instrument(skip(self), fields(db.table = "gallery_items", db.operation = "delete"))]
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM gallery_items WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
