use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::listing::round_money;
use crate::validation::validate_currency_code;
use crate::AppError;

pub const MAX_ORDER_ITEMS: usize = 50;

/// Shop product owned by a tenant
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub currency: String,
    pub stock: i32,
    pub category: Option<String>,
    pub images: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 64, message = "SKU must be 1-64 characters"))]
    pub sku: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub price: Decimal,
    #[validate(custom(function = "validate_currency_code"))]
    pub currency: String,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    #[serde(default)]
    pub stock: i32,
    #[validate(length(max = 120))]
    pub category: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub price: Option<Decimal>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i32>,
    #[validate(length(max = 120))]
    pub category: Option<String>,
    pub images: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

pub fn ensure_price(price: Decimal) -> Result<(), AppError> {
    if price.is_sign_negative() {
        return Err(AppError::InvalidInput(
            "Price cannot be negative".to_string(),
        ));
    }
    Ok(())
}

/// Order lifecycle: `pending → paid → shipped → delivered`, with
/// `pending|paid → cancelled`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "order_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn ensure_transition(&self, next: OrderStatus) -> Result<(), AppError> {
        use OrderStatus::*;
        let allowed = matches!(
            (self, next),
            (Pending, Paid)
                | (Pending, Cancelled)
                | (Paid, Shipped)
                | (Paid, Cancelled)
                | (Shipped, Delivered)
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

    /// Cancelling from these states puts stock back.
    pub fn restores_stock_on_cancel(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Paid)
    }
}

/// Line of an order, priced at the moment of purchase
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub currency: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, max = 1000, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub tenant_id: Uuid,
    #[validate(nested)]
    pub items: Vec<OrderLineRequest>,
}

impl CreateOrderRequest {
    /// Merge duplicate product lines and bound the item count.
    pub fn merged_lines(&self) -> Result<Vec<(Uuid, i32)>, AppError> {
        if self.items.is_empty() {
            return Err(AppError::InvalidInput(
                "An order needs at least one item".to_string(),
            ));
        }
        if self.items.len() > MAX_ORDER_ITEMS {
            return Err(AppError::InvalidInput(format!(
                "At most {} items per order",
                MAX_ORDER_ITEMS
            )));
        }
        let mut lines: Vec<(Uuid, i32)> = Vec::new();
        for item in &self.items {
            match lines.iter_mut().find(|(id, _)| *id == item.product_id) {
                Some((_, quantity)) => *quantity += item.quantity,
                None => lines.push((item.product_id, item.quantity)),
            }
        }
        Ok(lines)
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub fn order_total(items: &[OrderItem]) -> Decimal {
    round_money(
        items
            .iter()
            .map(|item| item.unit_price * Decimal::from(item.quantity))
            .sum(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_transitions() {
        use OrderStatus::*;
        assert!(Pending.ensure_transition(Paid).is_ok());
        assert!(Paid.ensure_transition(Shipped).is_ok());
        assert!(Shipped.ensure_transition(Delivered).is_ok());
        assert!(Paid.ensure_transition(Cancelled).is_ok());
        assert!(Shipped.ensure_transition(Cancelled).is_err());
        assert!(Delivered.ensure_transition(Pending).is_err());
        assert!(Cancelled.ensure_transition(Paid).is_err());
    }

    #[test]
    fn duplicate_lines_are_merged() {
        let product = Uuid::new_v4();
        let other = Uuid::new_v4();
        let request = CreateOrderRequest {
            tenant_id: Uuid::new_v4(),
            items: vec![
                OrderLineRequest {
                    product_id: product,
                    quantity: 2,
                },
                OrderLineRequest {
                    product_id: other,
                    quantity: 1,
                },
                OrderLineRequest {
                    product_id: product,
                    quantity: 3,
                },
            ],
        };
        assert_eq!(
            request.merged_lines().unwrap(),
            vec![(product, 5), (other, 1)]
        );
    }

    #[test]
    fn empty_order_rejected() {
        let request = CreateOrderRequest {
            tenant_id: Uuid::new_v4(),
            items: vec![],
        };
        assert!(request.merged_lines().is_err());
    }

    #[test]
    fn total_sums_lines() {
        let items = vec![
            OrderItem {
                product_id: Uuid::new_v4(),
                name: "Grip socks".to_string(),
                quantity: 3,
                unit_price: "149.99".parse().unwrap(),
            },
            OrderItem {
                product_id: Uuid::new_v4(),
                name: "Water bottle".to_string(),
                quantity: 1,
                unit_price: "350".parse().unwrap(),
            },
        ];
        assert_eq!(order_total(&items), "799.97".parse::<Decimal>().unwrap());
    }
}
