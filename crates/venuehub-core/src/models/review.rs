use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::booking::{Booking, BookingStatus};
use crate::AppError;

/// Moderation status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "review_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
    Flagged,
}

/// Review row; the tenant reply is stored flat and exposed nested.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Review {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub listing_id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub rating: i16,
    pub title: Option<String>,
    pub comment: String,
    pub status: ReviewStatus,
    pub moderation_note: Option<String>,
    pub reply_message: Option<String>,
    pub replied_by: Option<Uuid>,
    pub replied_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReply {
    pub message: String,
    pub replied_by: Uuid,
    pub replied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub listing_id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub rating: i16,
    pub title: Option<String>,
    pub comment: String,
    pub status: ReviewStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderation_note: Option<String>,
    pub reply: Option<ReviewReply>,
    pub created_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        let reply = match (review.reply_message, review.replied_by, review.replied_at) {
            (Some(message), Some(replied_by), Some(replied_at)) => Some(ReviewReply {
                message,
                replied_by,
                replied_at,
            }),
            _ => None,
        };
        Self {
            id: review.id,
            tenant_id: review.tenant_id,
            listing_id: review.listing_id,
            booking_id: review.booking_id,
            user_id: review.user_id,
            rating: review.rating,
            title: review.title,
            comment: review.comment,
            status: review.status,
            moderation_note: review.moderation_note,
            reply,
            created_at: review.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub booking_id: Uuid,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i16,
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 5000, message = "Comment must be 1-5000 characters"))]
    pub comment: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModerateReviewRequest {
    pub status: ReviewStatus,
    #[validate(length(max = 1000))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplyReviewRequest {
    #[validate(length(min = 1, max = 2000, message = "Reply must be 1-2000 characters"))]
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReviewQuery {
    pub status: Option<ReviewStatus>,
    pub listing_id: Option<Uuid>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A review may be written only for the requester's own completed booking,
/// and only once per booking.
pub fn check_review_eligibility(
    booking: Option<&Booking>,
    user_id: Uuid,
    review_exists: bool,
) -> Result<&Booking, AppError> {
    let booking = booking.ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
    if booking.user_id != user_id {
        return Err(AppError::Forbidden(
            "You can only review your own bookings".to_string(),
        ));
    }
    if booking.status != BookingStatus::Completed {
        return Err(AppError::BadRequest(
            "Only completed bookings can be reviewed".to_string(),
        ));
    }
    if review_exists {
        return Err(AppError::Conflict(
            "A review already exists for this booking".to_string(),
        ));
    }
    Ok(booking)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::{PaymentStatus, TimeSlot};
    use crate::ErrorMetadata;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn booking(user_id: Uuid, status: BookingStatus) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            listing_id: Uuid::new_v4(),
            user_id,
            booking_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            time_slots: vec![TimeSlot::new("10:00", "11:00")],
            guests: 1,
            total_amount: Decimal::from(100),
            discount_amount: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            final_amount: Decimal::from(100),
            currency: "INR".to_string(),
            status,
            payment_status: PaymentStatus::Paid,
            notes: None,
            cancellation_reason: None,
            cancelled_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn completed_own_booking_is_eligible() {
        let user = Uuid::new_v4();
        let b = booking(user, BookingStatus::Completed);
        assert!(check_review_eligibility(Some(&b), user, false).is_ok());
    }

    #[test]
    fn missing_booking_is_not_found() {
        let err = check_review_eligibility(None, Uuid::new_v4(), false).unwrap_err();
        assert_eq!(err.http_status_code(), 404);
    }

    #[test]
    fn other_users_booking_is_forbidden() {
        let b = booking(Uuid::new_v4(), BookingStatus::Completed);
        let err = check_review_eligibility(Some(&b), Uuid::new_v4(), false).unwrap_err();
        assert_eq!(err.http_status_code(), 403);
    }

    #[test]
    fn non_completed_statuses_are_rejected() {
        let user = Uuid::new_v4();
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
        ] {
            let b = booking(user, status);
            let err = check_review_eligibility(Some(&b), user, false).unwrap_err();
            assert_eq!(err.http_status_code(), 400, "status {:?}", status);
        }
    }

    #[test]
    fn second_review_conflicts() {
        let user = Uuid::new_v4();
        let b = booking(user, BookingStatus::Completed);
        let err = check_review_eligibility(Some(&b), user, true).unwrap_err();
        assert_eq!(err.http_status_code(), 409);
    }

    #[test]
    fn reply_is_nested_only_when_complete() {
        let now = Utc::now();
        let review = Review {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            listing_id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            rating: 5,
            title: None,
            comment: "Great pitch".to_string(),
            status: ReviewStatus::Approved,
            moderation_note: None,
            reply_message: Some("Thanks!".to_string()),
            replied_by: Some(Uuid::new_v4()),
            replied_at: Some(now),
            created_at: now,
            updated_at: now,
        };
        let response = ReviewResponse::from(review.clone());
        assert_eq!(response.reply.unwrap().message, "Thanks!");

        let response = ReviewResponse::from(Review {
            replied_at: None,
            ..review
        });
        assert!(response.reply.is_none());
    }
}
