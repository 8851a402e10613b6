use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool, Postgres};
use uuid::Uuid;
use venuehub_core::models::{
    ensure_available, Booking, BookingQuery, BookingStatus, ListParams, Page, PaymentStatus,
    TimeSlot,
};
use venuehub_core::AppError;

use crate::db::transaction::TransactionGuard;

/// Priced booking ready to insert
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub listing_id: Uuid,
    pub user_id: Uuid,
    pub booking_date: NaiveDate,
    pub time_slots: Vec<TimeSlot>,
    pub guests: i32,
    pub total_amount: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub final_amount: Decimal,
    pub currency: String,
    pub notes: Option<String>,
}

/// Whose bookings a list call returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingScope {
    User(Uuid),
    Tenant(Uuid),
    All,
}

/// Requested lifecycle change
#[derive(Debug, Clone)]
pub struct BookingTransition {
    pub next: BookingStatus,
    pub payment_status: Option<PaymentStatus>,
    pub reason: Option<String>,
}

#[derive(sqlx::FromRow)]
struct ListingSlotLock {
    tenant_id: Uuid,
    capacity: i32,
    is_active: bool,
}

#[derive(Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a `pending` booking. The listing row is locked for the duration
    /// of the transaction so two requests cannot both take the last seat.
    #[tracing::instrument(skip(self, booking), fields(db.table = "bookings", db.operation = "insert", listing_id = %booking.listing_id))]
    pub async fn create(&self, booking: &NewBooking) -> Result<Booking, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool, "create_booking").await?;

        let listing = sqlx::query_as::<Postgres, ListingSlotLock>(
            "SELECT tenant_id, capacity, is_active FROM listings WHERE id = $1 FOR UPDATE",
        )
        .bind(booking.listing_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;

        if !listing.is_active {
            return Err(AppError::BadRequest(
                "Listing is not accepting bookings".to_string(),
            ));
        }

        let active =
            Self::fetch_active_slots(&mut **tx, booking.listing_id, booking.booking_date).await?;
        ensure_available(&booking.time_slots, &active, listing.capacity)?;

        let created = sqlx::query_as::<Postgres, Booking>(
            r#"
            INSERT INTO bookings (
                tenant_id, listing_id, user_id, booking_date, time_slots, guests,
                total_amount, discount_amount, tax_amount, final_amount, currency, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(listing.tenant_id)
        .bind(booking.listing_id)
        .bind(booking.user_id)
        .bind(booking.booking_date)
        .bind(Json(&booking.time_slots))
        .bind(booking.guests)
        .bind(booking.total_amount)
        .bind(booking.discount_amount)
        .bind(booking.tax_amount)
        .bind(booking.final_amount)
        .bind(&booking.currency)
        .bind(&booking.notes)
        .fetch_one(&mut **tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            booking_id = %created.id,
            user_id = %created.user_id,
            date = %created.booking_date,
            amount = %created.final_amount,
            "Booking created"
        );
        Ok(created)
    }

    async fn fetch_active_slots<'e, E: PgExecutor<'e>>(
        executor: E,
        listing_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Vec<TimeSlot>>, AppError> {
        let rows = sqlx::query_scalar::<Postgres, Json<Vec<TimeSlot>>>(
            r#"
            SELECT time_slots FROM bookings
            WHERE listing_id = $1 AND booking_date = $2 AND status IN ('pending', 'confirmed')
            "#,
        )
        .bind(listing_id)
        .bind(date)
        .fetch_all(executor)
        .await?;
        Ok(rows.into_iter().map(|Json(slots)| slots).collect())
    }

    /// Slot sets of every booking still holding capacity on `date`.
    #[tracing::instrument(skip(self), fields(db.table = "bookings", db.operation = "select"))]
    pub async fn active_slots(
        &self,
        listing_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Vec<TimeSlot>>, AppError> {
        Self::fetch_active_slots(&self.pool, listing_id, date).await
    }

    #[tracing::instrument(skip(self), fields(db.table = "bookings", db.operation = "select"))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<Postgres, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(booking)
    }

    #[tracing::instrument(skip(self), fields(db.table = "bookings", db.operation = "select"))]
    pub async fn list(
        &self,
        scope: BookingScope,
        query: &BookingQuery,
    ) -> Result<Page<Booking>, AppError> {
        let (user_id, tenant_id) = match scope {
            BookingScope::User(id) => (Some(id), None),
            BookingScope::Tenant(id) => (None, Some(id)),
            BookingScope::All => (None, None),
        };
        let params = ListParams {
            search: None,
            limit: query.limit,
            offset: query.offset,
        };

        let filter = r#"
            FROM bookings
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::uuid IS NULL OR tenant_id = $2)
              AND ($3::booking_status IS NULL OR status = $3)
              AND ($4::uuid IS NULL OR listing_id = $4)
              AND ($5::date IS NULL OR booking_date >= $5)
              AND ($6::date IS NULL OR booking_date <= $6)
        "#;

        let total = sqlx::query_scalar::<Postgres, i64>(&format!("SELECT COUNT(*) {filter}"))
            .bind(user_id)
            .bind(tenant_id)
            .bind(query.status)
            .bind(query.listing_id)
            .bind(query.from)
            .bind(query.to)
            .fetch_one(&self.pool)
            .await?;

        let bookings = sqlx::query_as::<Postgres, Booking>(&format!(
            "SELECT * {filter} ORDER BY booking_date DESC, created_at DESC LIMIT $7 OFFSET $8"
        ))
        .bind(user_id)
        .bind(tenant_id)
        .bind(query.status)
        .bind(query.listing_id)
        .bind(query.from)
        .bind(query.to)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(bookings, total, &params))
    }

    /// Apply a lifecycle transition under a row lock. Transitions outside the
    /// lifecycle fail with `InvalidStatusTransition`.
    #[tracing::instrument(skip(self, transition), fields(db.table = "bookings", db.operation = "update", next = transition.next.as_str()))]
    pub async fn transition(
        &self,
        id: Uuid,
        transition: &BookingTransition,
    ) -> Result<Booking, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool, "transition_booking").await?;

        let current = sqlx::query_scalar::<Postgres, BookingStatus>(
            "SELECT status FROM bookings WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
        current.ensure_transition(transition.next)?;

        let cancelling = transition.next == BookingStatus::Cancelled;
        let booking = sqlx::query_as::<Postgres, Booking>(
            r#"
            UPDATE bookings
            SET status = $2,
                payment_status = COALESCE($3, payment_status),
                cancellation_reason = CASE WHEN $4 THEN $5 ELSE cancellation_reason END,
                cancelled_at = CASE WHEN $4 THEN NOW() ELSE cancelled_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(transition.next)
        .bind(transition.payment_status)
        .bind(cancelling)
        .bind(&transition.reason)
        .fetch_one(&mut **tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            booking_id = %id,
            from = current.as_str(),
            to = transition.next.as_str(),
            "Booking status changed"
        );
        Ok(booking)
    }
}
