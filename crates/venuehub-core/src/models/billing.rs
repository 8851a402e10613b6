use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::listing::round_money;
use crate::validation::{validate_currency_code, validate_slug};
use crate::AppError;

/// Hard limits granted by a plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    #[validate(range(min = 0))]
    pub max_listings: i32,
    #[validate(range(min = 0))]
    pub max_bookings_per_month: i32,
    #[validate(range(min = 0))]
    pub max_staff_users: i32,
}

/// Platform subscription plan
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub price_monthly: Decimal,
    pub price_yearly: Decimal,
    pub currency: String,
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub limits: PlanLimits,
    pub features: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanRequest {
    #[validate(custom(function = "validate_slug"))]
    pub code: String,
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub price_monthly: Decimal,
    pub price_yearly: Decimal,
    #[validate(custom(function = "validate_currency_code"))]
    pub currency: String,
    #[validate(nested)]
    pub limits: PlanLimits,
    #[serde(default)]
    pub features: Vec<String>,
}

impl CreatePlanRequest {
    pub fn check_prices(&self) -> Result<(), AppError> {
        if self.price_monthly.is_sign_negative() || self.price_yearly.is_sign_negative() {
            return Err(AppError::InvalidInput(
                "Plan prices cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlanRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub price_monthly: Option<Decimal>,
    pub price_yearly: Option<Decimal>,
    #[validate(nested)]
    pub limits: Option<PlanLimits>,
    pub features: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

/// Invoice lifecycle: `draft → issued → paid|overdue|void`, `overdue → paid|void`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "invoice_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Issued,
    Paid,
    Void,
    Overdue,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Issued => "issued",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Void => "void",
            InvoiceStatus::Overdue => "overdue",
        }
    }

    pub fn ensure_transition(&self, next: InvoiceStatus) -> Result<(), AppError> {
        use InvoiceStatus::*;
        let allowed = matches!(
            (self, next),
            (Draft, Issued)
                | (Draft, Void)
                | (Issued, Paid)
                | (Issued, Overdue)
                | (Issued, Void)
                | (Overdue, Paid)
                | (Overdue, Void)
        );
        if allowed {
            Ok(())
        } else {
            Err(AppError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            })
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLineItem {
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub unit_price: Decimal,
    /// Filled in by the server
    #[serde(default)]
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,
    pub invoice_number: String,
    pub tenant_id: Option<Uuid>,
    pub organization_id: Option<Uuid>,
    pub plan_id: Option<Uuid>,
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub line_items: Vec<InvoiceLineItem>,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub currency: String,
    pub status: InvoiceStatus,
    pub issued_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    pub tenant_id: Option<Uuid>,
    pub organization_id: Option<Uuid>,
    pub plan_id: Option<Uuid>,
    #[validate(nested)]
    pub line_items: Vec<InvoiceLineItem>,
    #[serde(default)]
    pub tax_percent: Decimal,
    #[validate(custom(function = "validate_currency_code"))]
    pub currency: String,
    #[validate(range(min = 0, max = 365))]
    #[serde(default = "default_due_days")]
    pub due_in_days: i64,
    #[serde(default)]
    pub issue: bool,
}

fn default_due_days() -> i64 {
    14
}

impl CreateInvoiceRequest {
    /// Exactly one billed party.
    pub fn billed_party(&self) -> Result<(), AppError> {
        match (self.tenant_id, self.organization_id) {
            (Some(_), None) | (None, Some(_)) => Ok(()),
            _ => Err(AppError::InvalidInput(
                "Exactly one of tenantId or organizationId is required".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoiceStatusRequest {
    pub status: InvoiceStatus,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct InvoiceQuery {
    pub status: Option<InvoiceStatus>,
    pub tenant_id: Option<Uuid>,
    pub organization_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceTotals {
    pub line_items: Vec<InvoiceLineItem>,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

/// Recompute line amounts and totals from quantities and unit prices.
pub fn compute_invoice_totals(
    items: &[InvoiceLineItem],
    tax_percent: Decimal,
) -> Result<InvoiceTotals, AppError> {
    if tax_percent.is_sign_negative() || tax_percent > Decimal::from(100) {
        return Err(AppError::InvalidInput(
            "Tax percent must be between 0 and 100".to_string(),
        ));
    }
    if items.is_empty() {
        return Err(AppError::InvalidInput(
            "At least one line item is required".to_string(),
        ));
    }
    let mut line_items = Vec::with_capacity(items.len());
    let mut subtotal = Decimal::ZERO;
    for item in items {
        if item.unit_price.is_sign_negative() {
            return Err(AppError::InvalidInput(
                "Line item prices cannot be negative".to_string(),
            ));
        }
        let amount = round_money(item.unit_price * Decimal::from(item.quantity));
        subtotal += amount;
        line_items.push(InvoiceLineItem {
            amount,
            ..item.clone()
        });
    }
    let tax_amount = round_money(subtotal * tax_percent / Decimal::from(100));
    Ok(InvoiceTotals {
        line_items,
        subtotal,
        tax_amount,
        total: subtotal + tax_amount,
    })
}

/// `INV-{year}-{seq}` with the sequence zero-padded to five digits.
pub fn format_invoice_number(year: i32, seq: i64) -> String {
    format!("INV-{}-{:05}", year, seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    #[test]
    fn invoice_number_format() {
        assert_eq!(format_invoice_number(2026, 1), "INV-2026-00001");
        assert_eq!(format_invoice_number(2026, 12345), "INV-2026-12345");
        assert_eq!(format_invoice_number(2027, 123456), "INV-2027-123456");
    }

    #[test]
    fn totals_are_recomputed() {
        let items = vec![
            InvoiceLineItem {
                description: "Pro plan".to_string(),
                quantity: 1,
                unit_price: d("2999"),
                amount: d("1"),
            },
            InvoiceLineItem {
                description: "Extra seats".to_string(),
                quantity: 3,
                unit_price: d("199.50"),
                amount: Decimal::ZERO,
            },
        ];
        let totals = compute_invoice_totals(&items, d("18")).unwrap();
        assert_eq!(totals.line_items[0].amount, d("2999"));
        assert_eq!(totals.line_items[1].amount, d("598.50"));
        assert_eq!(totals.subtotal, d("3597.50"));
        assert_eq!(totals.tax_amount, d("647.55"));
        assert_eq!(totals.total, d("4245.05"));
    }

    #[test]
    fn status_transitions() {
        use InvoiceStatus::*;
        assert!(Draft.ensure_transition(Issued).is_ok());
        assert!(Issued.ensure_transition(Paid).is_ok());
        assert!(Overdue.ensure_transition(Paid).is_ok());
        assert!(Paid.ensure_transition(Void).is_err());
        assert!(Void.ensure_transition(Issued).is_err());
        assert!(Draft.ensure_transition(Paid).is_err());
    }

    #[test]
    fn billed_party_must_be_unique() {
        let mut req = CreateInvoiceRequest {
            tenant_id: Some(Uuid::new_v4()),
            organization_id: Some(Uuid::new_v4()),
            plan_id: None,
            line_items: vec![],
            tax_percent: Decimal::ZERO,
            currency: "INR".to_string(),
            due_in_days: 14,
            issue: true,
        };
        assert!(req.billed_party().is_err());
        req.organization_id = None;
        assert!(req.billed_party().is_ok());
        req.tenant_id = None;
        assert!(req.billed_party().is_err());
    }
}
