use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_currency_code;

/// Kind of bookable unit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "listing_kind", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Turf,
    Hotel,
    Event,
    Gym,
    Wellness,
}

/// What one unit of `basePrice` buys
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PricingUnit {
    PerSlot,
    PerHour,
    PerDay,
    PerPerson,
}

/// Price configuration stored as JSON on the listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceConfig {
    pub base_price: Decimal,
    #[validate(custom(function = "validate_currency_code"))]
    pub currency: String,
    pub unit: PricingUnit,
    /// Replaces `basePrice` on Saturdays and Sundays
    pub weekend_price: Option<Decimal>,
    #[serde(default)]
    pub tax_percent: Decimal,
}

impl PriceConfig {
    /// Unit price applicable on `date`.
    pub fn unit_price_on(&self, date: NaiveDate) -> Decimal {
        match (date.weekday(), self.weekend_price) {
            (Weekday::Sat | Weekday::Sun, Some(weekend)) => weekend,
            _ => self.base_price,
        }
    }

    pub fn check_amounts(&self) -> Result<(), crate::AppError> {
        if self.base_price.is_sign_negative()
            || self.weekend_price.is_some_and(|p| p.is_sign_negative())
        {
            return Err(crate::AppError::InvalidInput(
                "Prices cannot be negative".to_string(),
            ));
        }
        if self.tax_percent.is_sign_negative() || self.tax_percent > Decimal::from(100) {
            return Err(crate::AppError::InvalidInput(
                "Tax percent must be between 0 and 100".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[validate(length(min = 1, max = 500, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, max = 120, message = "City is required"))]
    pub city: String,
    pub state: Option<String>,
    #[validate(length(min = 2, max = 120))]
    pub country: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

/// Bookable unit owned by a tenant
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub kind: ListingKind,
    pub title: String,
    pub description: String,
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub price_config: PriceConfig,
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub location: Location,
    pub capacity: i32,
    pub images: Vec<String>,
    pub amenities: Vec<String>,
    pub is_active: bool,
    pub rating_average: f64,
    pub review_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    pub kind: ListingKind,
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    #[serde(default)]
    pub description: String,
    #[validate(nested)]
    pub price_config: PriceConfig,
    #[validate(nested)]
    pub location: Location,
    #[validate(range(min = 1, max = 10000, message = "Capacity must be at least 1"))]
    pub capacity: i32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListingRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(nested)]
    pub price_config: Option<PriceConfig>,
    #[validate(nested)]
    pub location: Option<Location>,
    #[validate(range(min = 1, max = 10000, message = "Capacity must be at least 1"))]
    pub capacity: Option<i32>,
    pub images: Option<Vec<String>>,
    pub amenities: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

/// Public listing search
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListingQuery {
    pub kind: Option<ListingKind>,
    pub city: Option<String>,
    pub tenant_id: Option<Uuid>,
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Money rounding used for every computed amount.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn price(weekend: Option<Decimal>) -> PriceConfig {
        PriceConfig {
            base_price: d("1000"),
            currency: "INR".to_string(),
            unit: PricingUnit::PerHour,
            weekend_price: weekend,
            tax_percent: d("18"),
        }
    }

    #[test]
    fn weekend_price_applies_on_saturday_and_sunday() {
        let config = price(Some(d("1500")));
        let friday = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(config.unit_price_on(friday), d("1000"));
        assert_eq!(config.unit_price_on(saturday), d("1500"));
        assert_eq!(config.unit_price_on(sunday), d("1500"));
    }

    #[test]
    fn weekend_without_override_uses_base_price() {
        let saturday = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert_eq!(price(None).unit_price_on(saturday), d("1000"));
    }

    #[test]
    fn negative_and_excessive_amounts_rejected() {
        let mut config = price(None);
        config.base_price = d("-1");
        assert!(config.check_amounts().is_err());
        let mut config = price(None);
        config.tax_percent = d("101");
        assert!(config.check_amounts().is_err());
        assert!(price(None).check_amounts().is_ok());
    }

    #[test]
    fn money_rounds_half_away_from_zero() {
        assert_eq!(round_money(d("10.005")), d("10.01"));
        assert_eq!(round_money(d("10.004")), d("10.00"));
    }
}
