use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use venuehub_core::models::{
    CreateListingRequest, ListParams, Listing, ListingKind, ListingQuery, Page,
    UpdateListingRequest,
};
use venuehub_core::AppError;

use crate::db::search_pattern;

#[derive(Clone)]
pub struct ListingRepository {
    pool: PgPool,
}

impl ListingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, request), fields(db.table = "listings", db.operation = "insert"))]
    pub async fn create(
        &self,
        tenant_id: Uuid,
        request: &CreateListingRequest,
    ) -> Result<Listing, AppError> {
        let listing = sqlx::query_as::<Postgres, Listing>(
            r#"
            INSERT INTO listings (
                tenant_id, kind, title, description, price_config, location, capacity, images, amenities
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(request.kind)
        .bind(&request.title)
        .bind(&request.description)
        .bind(Json(&request.price_config))
        .bind(Json(&request.location))
        .bind(request.capacity)
        .bind(&request.images)
        .bind(&request.amenities)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, tenant_id = %tenant_id, "Failed to create listing");
            AppError::from(e)
        })?;

        tracing::info!(
            listing_id = %listing.id,
            tenant_id = %tenant_id,
            kind = ?listing.kind,
            "Listing created"
        );
        Ok(listing)
    }

    #[tracing::instrument(skip(self), fields(db.table = "listings", db.operation = "select"))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Listing>, AppError> {
        let listing = sqlx::query_as::<Postgres, Listing>("SELECT * FROM listings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(listing)
    }

    /// Tenant-scoped lookup; another tenant's listing reads as missing.
    #[tracing::instrument(skip(self), fields(db.table = "listings", db.operation = "select"))]
    pub async fn get_for_tenant(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Listing>, AppError> {
        let listing = sqlx::query_as::<Postgres, Listing>(
            "SELECT * FROM listings WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(listing)
    }

    /// Public search over active listings of active tenants.
    #[tracing::instrument(skip(self), fields(db.table = "listings", db.operation = "select"))]
    pub async fn search(&self, query: &ListingQuery) -> Result<Page<Listing>, AppError> {
        let params = ListParams {
            search: query.search.clone(),
            limit: query.limit,
            offset: query.offset,
        };
        let pattern = search_pattern(params.search());
        let city = query
            .city
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());

        let filter = r#"
            FROM listings l
            JOIN tenants t ON t.id = l.tenant_id
            WHERE l.is_active
              AND t.status = 'active'
              AND ($1::listing_kind IS NULL OR l.kind = $1)
              AND ($2::text IS NULL OR LOWER(l.location ->> 'city') = LOWER($2))
              AND ($3::uuid IS NULL OR l.tenant_id = $3)
              AND ($4::text IS NULL OR l.title ILIKE $4 OR l.description ILIKE $4)
              AND ($5::numeric IS NULL OR (l.price_config ->> 'basePrice')::numeric >= $5)
              AND ($6::numeric IS NULL OR (l.price_config ->> 'basePrice')::numeric <= $6)
        "#;

        let total = sqlx::query_scalar::<Postgres, i64>(&format!("SELECT COUNT(*) {filter}"))
            .bind(query.kind)
            .bind(city)
            .bind(query.tenant_id)
            .bind(&pattern)
            .bind(query.min_price)
            .bind(query.max_price)
            .fetch_one(&self.pool)
            .await?;

        let listings = sqlx::query_as::<Postgres, Listing>(&format!(
            "SELECT l.* {filter} ORDER BY l.rating_average DESC, l.created_at DESC LIMIT $7 OFFSET $8"
        ))
        .bind(query.kind)
        .bind(city)
        .bind(query.tenant_id)
        .bind(&pattern)
        .bind(query.min_price)
        .bind(query.max_price)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(listings, total, &params))
    }

    /// Admin list for one tenant, optionally restricted to a kind.
    #[tracing::instrument(skip(self), fields(db.table = "listings", db.operation = "select"))]
    pub async fn list_for_tenant(
        &self,
        tenant_id: Uuid,
        kind: Option<ListingKind>,
        params: &ListParams,
    ) -> Result<Page<Listing>, AppError> {
        let pattern = search_pattern(params.search());

        let total = sqlx::query_scalar::<Postgres, i64>(
            r#"
            SELECT COUNT(*) FROM listings
            WHERE tenant_id = $1
              AND ($2::listing_kind IS NULL OR kind = $2)
              AND ($3::text IS NULL OR title ILIKE $3 OR description ILIKE $3)
            "#,
        )
        .bind(tenant_id)
        .bind(kind)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let listings = sqlx::query_as::<Postgres, Listing>(
            r#"
            SELECT * FROM listings
            WHERE tenant_id = $1
              AND ($2::listing_kind IS NULL OR kind = $2)
              AND ($3::text IS NULL OR title ILIKE $3 OR description ILIKE $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(tenant_id)
        .bind(kind)
        .bind(&pattern)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(listings, total, params))
    }

    #[tracing::instrument(skip(self, request), fields(db.table = "listings", db.operation = "update"))]
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        request: &UpdateListingRequest,
    ) -> Result<Option<Listing>, AppError> {
        let listing = sqlx::query_as::<Postgres, Listing>(
            r#"
            UPDATE listings
            SET title = COALESCE($3, title),
                description = COALESCE($4, description),
                price_config = COALESCE($5, price_config),
                location = COALESCE($6, location),
                capacity = COALESCE($7, capacity),
                images = COALESCE($8, images),
                amenities = COALESCE($9, amenities),
                is_active = COALESCE($10, is_active),
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.price_config.as_ref().map(Json))
        .bind(request.location.as_ref().map(Json))
        .bind(request.capacity)
        .bind(&request.images)
        .bind(&request.amenities)
        .bind(request.is_active)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(listing) = &listing {
            tracing::info!(listing_id = %listing.id, "Listing updated");
        }
        Ok(listing)
    }

    #[tracing::instrument(skip(self), fields(db.table = "listings", db.operation = "delete"))]
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM listings WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;
        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(listing_id = %id, tenant_id = %tenant_id, "Listing deleted");
        }
        Ok(deleted)
    }
}
