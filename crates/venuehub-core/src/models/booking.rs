use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::listing::{round_money, PriceConfig, PricingUnit};
use crate::validation::{clock_minutes, validate_clock_time};
use crate::AppError;

pub const MAX_SLOTS_PER_BOOKING: usize = 24;

/// Booking lifecycle: `pending → confirmed → completed`, with
/// `pending|confirmed → cancelled`. `completed` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "booking_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        )
    }

    pub fn ensure_transition(&self, next: BookingStatus) -> Result<(), AppError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(AppError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            })
        }
    }

    /// Whether the booking still occupies its slots.
    pub fn holds_capacity(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "payment_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
    Failed,
}

/// Half-open `[start, end)` interval within a day, `HH:MM` strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate, ToSchema)]
pub struct TimeSlot {
    #[validate(custom(function = "validate_clock_time"))]
    pub start: String,
    #[validate(custom(function = "validate_clock_time"))]
    pub end: String,
}

impl TimeSlot {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// `(start, end)` in minutes since midnight, `None` if malformed or empty.
    pub fn minutes(&self) -> Option<(u32, u32)> {
        let start = clock_minutes(&self.start)?;
        let end = clock_minutes(&self.end)?;
        (start < end).then_some((start, end))
    }

    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        match (self.minutes(), other.minutes()) {
            (Some((a_start, a_end)), Some((b_start, b_end))) => {
                a_start < b_end && b_start < a_end
            }
            _ => false,
        }
    }
}

/// Reject empty, malformed, inverted or self-overlapping slot sets.
pub fn validate_slots(slots: &[TimeSlot]) -> Result<(), AppError> {
    if slots.is_empty() {
        return Err(AppError::InvalidInput(
            "At least one time slot is required".to_string(),
        ));
    }
    if slots.len() > MAX_SLOTS_PER_BOOKING {
        return Err(AppError::InvalidInput(format!(
            "At most {} time slots per booking",
            MAX_SLOTS_PER_BOOKING
        )));
    }
    for slot in slots {
        if slot.minutes().is_none() {
            return Err(AppError::InvalidInput(format!(
                "Invalid time slot {}-{}: start must be before end",
                slot.start, slot.end
            )));
        }
    }
    for (i, a) in slots.iter().enumerate() {
        if slots[i + 1..].iter().any(|b| a.overlaps(b)) {
            return Err(AppError::InvalidInput(format!(
                "Time slot {}-{} overlaps another slot in the same booking",
                a.start, a.end
            )));
        }
    }
    Ok(())
}

/// Computed amounts for a booking request
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingQuote {
    pub unit_price: Decimal,
    pub quantity: Decimal,
    pub total_amount: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub final_amount: Decimal,
    pub currency: String,
}

/// Price a booking: `total = unit × quantity`, tax on the full total,
/// `final = total - discount + tax`.
pub fn quote_booking(
    price: &PriceConfig,
    date: NaiveDate,
    slots: &[TimeSlot],
    guests: i32,
    discount: Decimal,
) -> Result<BookingQuote, AppError> {
    validate_slots(slots)?;
    price.check_amounts()?;

    let quantity = match price.unit {
        PricingUnit::PerSlot => Decimal::from(slots.len() as u64),
        PricingUnit::PerHour => {
            let minutes: u32 = slots
                .iter()
                .filter_map(TimeSlot::minutes)
                .map(|(start, end)| end - start)
                .sum();
            Decimal::from(minutes) / Decimal::from(60)
        }
        PricingUnit::PerDay => Decimal::ONE,
        PricingUnit::PerPerson => Decimal::from(guests.max(1)),
    };

    let unit_price = price.unit_price_on(date);
    let total_amount = round_money(unit_price * quantity);

    if discount.is_sign_negative() || discount > total_amount {
        return Err(AppError::InvalidInput(
            "Discount must be between 0 and the booking total".to_string(),
        ));
    }

    let tax_amount = round_money(total_amount * price.tax_percent / Decimal::from(100));
    let final_amount = round_money(total_amount - discount + tax_amount);

    Ok(BookingQuote {
        unit_price,
        quantity,
        total_amount,
        discount_amount: round_money(discount),
        tax_amount,
        final_amount,
        currency: price.currency.clone(),
    })
}

/// Reservation of a listing by a user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub listing_id: Uuid,
    pub user_id: Uuid,
    pub booking_date: NaiveDate,
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub time_slots: Vec<TimeSlot>,
    pub guests: i32,
    pub total_amount: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub final_amount: Decimal,
    pub currency: String,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub listing_id: Uuid,
    pub booking_date: NaiveDate,
    #[validate(nested)]
    pub time_slots: Vec<TimeSlot>,
    #[validate(range(min = 1, max = 1000, message = "Guests must be at least 1"))]
    #[serde(default = "default_guests")]
    pub guests: i32,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

fn default_guests() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
    pub payment_status: Option<PaymentStatus>,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelBookingRequest {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BookingQuery {
    pub status: Option<BookingStatus>,
    pub listing_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
}

/// Occupancy of one booked interval
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlotOccupancy {
    pub slot: TimeSlot,
    pub booked: i64,
    pub remaining: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub listing_id: Uuid,
    pub date: NaiveDate,
    pub capacity: i32,
    pub slots: Vec<SlotOccupancy>,
}

/// Number of active bookings (each a slot set) overlapping `slot`.
pub fn overlapping_count(slot: &TimeSlot, active: &[Vec<TimeSlot>]) -> i64 {
    active
        .iter()
        .filter(|booked| booked.iter().any(|b| b.overlaps(slot)))
        .count() as i64
}

/// Fail with `SlotUnavailable` if any requested slot is already at capacity.
pub fn ensure_available(
    requested: &[TimeSlot],
    active: &[Vec<TimeSlot>],
    capacity: i32,
) -> Result<(), AppError> {
    for slot in requested {
        if overlapping_count(slot, active) >= i64::from(capacity) {
            return Err(AppError::SlotUnavailable(format!(
                "Time slot {}-{} is fully booked",
                slot.start, slot.end
            )));
        }
    }
    Ok(())
}

/// Occupancy per distinct booked slot, sorted by start time.
pub fn occupancy(active: &[Vec<TimeSlot>], capacity: i32) -> Vec<SlotOccupancy> {
    let mut distinct: Vec<TimeSlot> = Vec::new();
    for slot in active.iter().flatten() {
        if !distinct.contains(slot) {
            distinct.push(slot.clone());
        }
    }
    distinct.sort_by_key(|s| s.minutes().map(|(start, _)| start).unwrap_or(0));
    distinct
        .into_iter()
        .map(|slot| {
            let booked = overlapping_count(&slot, active);
            SlotOccupancy {
                remaining: (i64::from(capacity) - booked).max(0),
                booked,
                slot,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn slot(start: &str, end: &str) -> TimeSlot {
        TimeSlot::new(start, end)
    }

    fn price(unit: PricingUnit) -> PriceConfig {
        PriceConfig {
            base_price: d("1200"),
            currency: "INR".to_string(),
            unit,
            weekend_price: Some(d("1500")),
            tax_percent: d("18"),
        }
    }

    fn weekday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 21).unwrap()
    }

    #[test]
    fn lifecycle_transitions() {
        use BookingStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(!Confirmed.can_transition_to(Pending));
        assert!(Completed.ensure_transition(Pending).is_err());
    }

    #[test]
    fn slot_overlap_is_half_open() {
        assert!(slot("10:00", "11:00").overlaps(&slot("10:30", "11:30")));
        assert!(!slot("10:00", "11:00").overlaps(&slot("11:00", "12:00")));
        assert!(slot("09:00", "12:00").overlaps(&slot("10:00", "10:30")));
    }

    #[test]
    fn slot_validation() {
        assert!(validate_slots(&[]).is_err());
        assert!(validate_slots(&[slot("11:00", "10:00")]).is_err());
        assert!(validate_slots(&[slot("10:00", "10:00")]).is_err());
        assert!(validate_slots(&[slot("10:00", "11:00"), slot("10:30", "11:30")]).is_err());
        assert!(validate_slots(&[slot("10:00", "11:00"), slot("11:00", "12:00")]).is_ok());
    }

    #[test]
    fn per_hour_quote_with_tax() {
        let q = quote_booking(
            &price(PricingUnit::PerHour),
            weekday(),
            &[slot("18:00", "19:30")],
            4,
            Decimal::ZERO,
        )
        .unwrap();
        assert_eq!(q.quantity, d("1.5"));
        assert_eq!(q.total_amount, d("1800"));
        assert_eq!(q.tax_amount, d("324"));
        assert_eq!(q.final_amount, d("2124"));
    }

    #[test]
    fn per_slot_weekend_quote_with_discount() {
        let saturday = NaiveDate::from_ymd_opt(2026, 10, 24).unwrap();
        let q = quote_booking(
            &price(PricingUnit::PerSlot),
            saturday,
            &[slot("06:00", "07:00"), slot("07:00", "08:00")],
            1,
            d("500"),
        )
        .unwrap();
        assert_eq!(q.unit_price, d("1500"));
        assert_eq!(q.total_amount, d("3000"));
        assert_eq!(q.discount_amount, d("500"));
        // discount does not reduce the taxable base
        assert_eq!(q.tax_amount, d("540"));
        assert_eq!(q.final_amount, d("3040"));
    }

    #[test]
    fn per_person_and_per_day_quantities() {
        let per_person = quote_booking(
            &price(PricingUnit::PerPerson),
            weekday(),
            &[slot("10:00", "12:00")],
            3,
            Decimal::ZERO,
        )
        .unwrap();
        assert_eq!(per_person.quantity, Decimal::from(3));

        let per_day = quote_booking(
            &price(PricingUnit::PerDay),
            weekday(),
            &[slot("00:00", "23:59")],
            3,
            Decimal::ZERO,
        )
        .unwrap();
        assert_eq!(per_day.total_amount, d("1200"));
    }

    #[test]
    fn discount_above_total_rejected() {
        let err = quote_booking(
            &price(PricingUnit::PerSlot),
            weekday(),
            &[slot("10:00", "11:00")],
            1,
            d("5000"),
        );
        assert!(err.is_err());
    }

    #[test]
    fn availability_respects_capacity() {
        let active = vec![
            vec![slot("10:00", "11:00")],
            vec![slot("10:30", "12:00")],
        ];
        assert_eq!(overlapping_count(&slot("10:45", "11:15"), &active), 2);
        assert!(ensure_available(&[slot("10:00", "11:00")], &active, 2).is_err());
        assert!(ensure_available(&[slot("10:00", "11:00")], &active, 3).is_ok());
        assert!(ensure_available(&[slot("12:00", "13:00")], &active, 1).is_ok());
    }

    #[test]
    fn occupancy_lists_distinct_slots_in_order() {
        let active = vec![
            vec![slot("14:00", "15:00")],
            vec![slot("10:00", "11:00")],
            vec![slot("10:00", "11:00")],
        ];
        let occ = occupancy(&active, 2);
        assert_eq!(occ.len(), 2);
        assert_eq!(occ[0].slot.start, "10:00");
        assert_eq!(occ[0].booked, 2);
        assert_eq!(occ[0].remaining, 0);
        assert_eq!(occ[1].remaining, 1);
    }
}
