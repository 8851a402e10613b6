//! Booking quotes, customer bookings and tenant-admin status changes

use crate::auth::SessionContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::handlers::{ensure_tenant_visible, require_module};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;
use venuehub_core::models::{
    quote_booking, Booking, BookingQuery, BookingQuote, BookingStatus, CancelBookingRequest,
    CreateBookingRequest, Listing, NotificationKind, Page, TenantModule,
    UpdateBookingStatusRequest,
};
use venuehub_core::AppError;
use venuehub_db::db::marketplace::{BookingScope, BookingTransition, NewBooking};
use venuehub_infra::ErrorResponse;

/// Validate the request against the listing and price it.
///
/// Past dates, inactive listings and inactive tenants are rejected with 400;
/// a tenant without the listing's module with 403.
async fn price_request(
    state: &AppState,
    request: &CreateBookingRequest,
) -> Result<(Listing, BookingQuote), AppError> {
    if request.booking_date < Utc::now().date_naive() {
        return Err(AppError::BadRequest(
            "Booking date cannot be in the past".to_string(),
        ));
    }

    let listing = state
        .db
        .listings
        .get_by_id(request.listing_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;
    if !listing.is_active {
        return Err(AppError::BadRequest(
            "Listing is not accepting bookings".to_string(),
        ));
    }

    let tenant = require_module(state, listing.tenant_id, TenantModule::from(listing.kind)).await?;
    if !tenant.is_active() {
        return Err(AppError::BadRequest(
            "Venue is not accepting bookings".to_string(),
        ));
    }

    let quote = quote_booking(
        &listing.price_config,
        request.booking_date,
        &request.time_slots,
        request.guests,
        Decimal::ZERO,
    )?;
    Ok((listing, quote))
}

#[utoipa::path(
    post,
    path = "/api/bookings/quote",
    tag = "bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 200, description = "Price breakdown; nothing is reserved", body = BookingQuote),
        (status = 400, description = "Invalid date, slots or listing", body = ErrorResponse),
        (status = 404, description = "Listing not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(listing_id = %request.listing_id))]
pub async fn quote(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateBookingRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (_, quote) = price_request(&state, &request).await?;
    Ok(Json(quote))
}

#[utoipa::path(
    post,
    path = "/api/bookings",
    tag = "bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created as pending", body = Booking),
        (status = 400, description = "Invalid date, slots or listing", body = ErrorResponse),
        (status = 403, description = "Module not enabled", body = ErrorResponse),
        (status = 409, description = "Slot fully booked", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request), fields(user_id = %ctx.user_id, listing_id = %request.listing_id))]
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    ValidatedJson(request): ValidatedJson<CreateBookingRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (listing, quote) = price_request(&state, &request).await?;

    let booking = state
        .db
        .bookings
        .create(&NewBooking {
            listing_id: listing.id,
            user_id: ctx.user_id,
            booking_date: request.booking_date,
            time_slots: request.time_slots.clone(),
            guests: request.guests,
            total_amount: quote.total_amount,
            discount_amount: quote.discount_amount,
            tax_amount: quote.tax_amount,
            final_amount: quote.final_amount,
            currency: quote.currency,
            notes: request.notes.clone(),
        })
        .await?;

    tracing::info!(booking_id = %booking.id, "Booking created");
    state
        .notifier
        .to_tenant(
            booking.tenant_id,
            NotificationKind::Booking,
            "New booking",
            format!(
                "{} booked for {} ({} {})",
                listing.title, booking.booking_date, booking.final_amount, booking.currency
            ),
            Some(format!("/admin/bookings/{}", booking.id)),
        )
        .await;

    Ok((StatusCode::CREATED, Json(booking)))
}

#[utoipa::path(
    get,
    path = "/api/bookings",
    tag = "bookings",
    params(BookingQuery),
    responses((status = 200, description = "Caller's bookings", body = Page<Booking>))
)]
#[tracing::instrument(skip(state, ctx), fields(user_id = %ctx.user_id))]
pub async fn list_my_bookings(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Query(query): Query<BookingQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let page = state
        .db
        .bookings
        .list(BookingScope::User(ctx.user_id), &query)
        .await?;
    Ok(Json(page))
}

/// Booking owned by the caller; anyone else's reads as missing.
async fn load_own_booking(
    state: &AppState,
    ctx: &SessionContext,
    id: Uuid,
) -> Result<Booking, AppError> {
    state
        .db
        .bookings
        .get_by_id(id)
        .await?
        .filter(|booking| booking.user_id == ctx.user_id)
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
}

#[utoipa::path(
    get,
    path = "/api/bookings/{id}",
    tag = "bookings",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking", body = Booking),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(load_own_booking(&state, &ctx, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/bookings/{id}/cancel",
    tag = "bookings",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = CancelBookingRequest,
    responses(
        (status = 200, description = "Cancelled booking", body = Booking),
        (status = 400, description = "Booking can no longer be cancelled", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<CancelBookingRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let booking = load_own_booking(&state, &ctx, id).await?;
    let cancelled = state
        .db
        .bookings
        .transition(
            id,
            &BookingTransition {
                next: BookingStatus::Cancelled,
                payment_status: None,
                reason: request.reason,
            },
        )
        .await?;

    state
        .notifier
        .to_tenant(
            booking.tenant_id,
            NotificationKind::Booking,
            "Booking cancelled",
            format!("Booking for {} was cancelled by the customer", booking.booking_date),
            Some(format!("/admin/bookings/{}", id)),
        )
        .await;
    Ok(Json(cancelled))
}

#[utoipa::path(
    get,
    path = "/api/admin/bookings",
    tag = "admin",
    params(BookingQuery),
    responses(
        (status = 200, description = "Bookings of the caller's tenant, or all for super admins", body = Page<Booking>),
        (status = 403, description = "Admin only", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn admin_list_bookings(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Query(query): Query<BookingQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let scope = match ctx.admin_tenant_filter()? {
        Some(tenant_id) => BookingScope::Tenant(tenant_id),
        None => BookingScope::All,
    };
    Ok(Json(state.db.bookings.list(scope, &query).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/bookings/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking", body = Booking),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn admin_get_booking(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let filter = ctx.admin_tenant_filter()?;
    let booking = state
        .db
        .bookings
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
    ensure_tenant_visible(filter, booking.tenant_id, "Booking")?;
    Ok(Json(booking))
}

#[utoipa::path(
    put,
    path = "/api/admin/bookings/{id}/status",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = UpdateBookingStatusRequest,
    responses(
        (status = 200, description = "Updated booking", body = Booking),
        (status = 400, description = "Transition not allowed", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request), fields(next = request.status.as_str()))]
pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateBookingStatusRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let filter = ctx.admin_tenant_filter()?;
    let booking = state
        .db
        .bookings
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
    ensure_tenant_visible(filter, booking.tenant_id, "Booking")?;

    let updated = state
        .db
        .bookings
        .transition(
            id,
            &BookingTransition {
                next: request.status,
                payment_status: request.payment_status,
                reason: request.reason,
            },
        )
        .await?;

    state
        .notifier
        .to_user(
            updated.user_id,
            NotificationKind::Booking,
            format!("Booking {}", updated.status.as_str()),
            format!(
                "Your booking for {} is now {}",
                updated.booking_date,
                updated.status.as_str()
            ),
            Some(format!("/bookings/{}", updated.id)),
        )
        .await;
    Ok(Json(updated))
}
