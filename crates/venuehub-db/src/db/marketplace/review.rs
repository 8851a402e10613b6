use sqlx::{PgConnection, PgPool, Postgres};
use uuid::Uuid;
use venuehub_core::models::{
    check_review_eligibility, Booking, CreateReviewRequest, ListParams, Page, Review,
    ReviewQuery, ReviewStatus,
};
use venuehub_core::AppError;

use crate::db::transaction::TransactionGuard;

/// Whose reviews a list call returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewScope {
    /// Approved reviews only
    Public,
    Tenant(Uuid),
    All,
}

#[derive(Clone)]
pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a review for a completed booking owned by `user_id`.
    ///
    /// The booking row is locked while eligibility is checked, and the unique
    /// index on `reviews.booking_id` rejects any duplicate that slips past.
    #[tracing::instrument(skip(self, request), fields(db.table = "reviews", db.operation = "insert", booking_id = %request.booking_id))]
    pub async fn create(
        &self,
        user_id: Uuid,
        request: &CreateReviewRequest,
    ) -> Result<Review, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool, "create_review").await?;

        let booking = sqlx::query_as::<Postgres, Booking>(
            "SELECT * FROM bookings WHERE id = $1 FOR UPDATE",
        )
        .bind(request.booking_id)
        .fetch_optional(&mut **tx)
        .await?;

        let exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM reviews WHERE booking_id = $1)",
        )
        .bind(request.booking_id)
        .fetch_one(&mut **tx)
        .await?;

        let booking = check_review_eligibility(booking.as_ref(), user_id, exists)?;

        let review = sqlx::query_as::<Postgres, Review>(
            r#"
            INSERT INTO reviews (tenant_id, listing_id, booking_id, user_id, rating, title, comment)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(booking.tenant_id)
        .bind(booking.listing_id)
        .bind(booking.id)
        .bind(user_id)
        .bind(request.rating)
        .bind(&request.title)
        .bind(&request.comment)
        .fetch_one(&mut **tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            review_id = %review.id,
            listing_id = %review.listing_id,
            rating = review.rating,
            "Review created"
        );
        Ok(review)
    }

    #[tracing::instrument(skip(self), fields(db.table = "reviews", db.operation = "select"))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Review>, AppError> {
        let review = sqlx::query_as::<Postgres, Review>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(review)
    }

    #[tracing::instrument(skip(self), fields(db.table = "reviews", db.operation = "select"))]
    pub async fn list(&self, scope: ReviewScope, query: &ReviewQuery) -> Result<Page<Review>, AppError> {
        let (tenant_id, status) = match scope {
            ReviewScope::Public => (None, Some(ReviewStatus::Approved)),
            ReviewScope::Tenant(id) => (Some(id), query.status),
            ReviewScope::All => (None, query.status),
        };
        let params = ListParams {
            search: query.search.clone(),
            limit: query.limit,
            offset: query.offset,
        };
        let pattern = crate::db::search_pattern(params.search());

        let filter = r#"
            FROM reviews
            WHERE ($1::uuid IS NULL OR tenant_id = $1)
              AND ($2::review_status IS NULL OR status = $2)
              AND ($3::uuid IS NULL OR listing_id = $3)
              AND ($4::text IS NULL OR comment ILIKE $4 OR title ILIKE $4)
        "#;

        let total = sqlx::query_scalar::<Postgres, i64>(&format!("SELECT COUNT(*) {filter}"))
            .bind(tenant_id)
            .bind(status)
            .bind(query.listing_id)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        let reviews = sqlx::query_as::<Postgres, Review>(&format!(
            "SELECT * {filter} ORDER BY created_at DESC LIMIT $5 OFFSET $6"
        ))
        .bind(tenant_id)
        .bind(status)
        .bind(query.listing_id)
        .bind(&pattern)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(reviews, total, &params))
    }

    /// Set the moderation status and refresh the listing's rating in the same transaction.
    #[tracing::instrument(skip(self, note), fields(db.table = "reviews", db.operation = "update"))]
    pub async fn moderate(
        &self,
        id: Uuid,
        status: ReviewStatus,
        note: Option<&str>,
    ) -> Result<Review, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool, "moderate_review").await?;

        let review = sqlx::query_as::<Postgres, Review>(
            r#"
            UPDATE reviews
            SET status = $2, moderation_note = COALESCE($3, moderation_note), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(note)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".to_string()))?;

        refresh_listing_rating(&mut tx, review.listing_id).await?;
        tx.commit().await?;

        tracing::info!(review_id = %id, status = ?status, "Review moderated");
        Ok(review)
    }

    /// Store the tenant's public reply, replacing any earlier one.
    #[tracing::instrument(skip(self, message), fields(db.table = "reviews", db.operation = "update"))]
    pub async fn reply(
        &self,
        id: Uuid,
        replied_by: Uuid,
        message: &str,
    ) -> Result<Option<Review>, AppError> {
        let review = sqlx::query_as::<Postgres, Review>(
            r#"
            UPDATE reviews
            SET reply_message = $2, replied_by = $3, replied_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(message)
        .bind(replied_by)
        .fetch_optional(&self.pool)
        .await?;
        Ok(review)
    }

    #[tracing::instrument(skip(self), fields(db.table = "reviews", db.operation = "delete"))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool, "delete_review").await?;

        let listing_id = sqlx::query_scalar::<Postgres, Uuid>(
            "DELETE FROM reviews WHERE id = $1 RETURNING listing_id",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        let Some(listing_id) = listing_id else {
            return Ok(false);
        };
        refresh_listing_rating(&mut tx, listing_id).await?;
        tx.commit().await?;
        Ok(true)
    }
}

/// Recompute `rating_average` and `review_count` from approved reviews.
async fn refresh_listing_rating(conn: &mut PgConnection, listing_id: Uuid) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE listings
        SET rating_average = COALESCE(stats.average, 0),
            review_count = stats.count,
            updated_at = NOW()
        FROM (
            SELECT ROUND(AVG(rating)::numeric, 2)::float8 AS average, COUNT(*)::int AS count
            FROM reviews
            WHERE listing_id = $1 AND status = 'approved'
        ) AS stats
        WHERE listings.id = $1
        "#,
    )
    .bind(listing_id)
    .execute(conn)
    .await?;
    Ok(())
}
