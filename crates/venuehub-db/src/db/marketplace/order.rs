use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use venuehub_core::models::{
    order_total, CreateOrderRequest, ListParams, Order, OrderItem, OrderQuery, OrderStatus, Page,
};
use venuehub_core::AppError;

use crate::db::transaction::TransactionGuard;

/// Whose orders a list call returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    User(Uuid),
    Tenant(Uuid),
}

#[derive(sqlx::FromRow)]
struct ReservedLine {
    name: String,
    price: Decimal,
    currency: String,
}

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Place an order. Stock is decremented line by line with a guarded
    /// update, so the whole order fails if any product runs short.
    #[tracing::instrument(skip(self, request), fields(db.table = "orders", db.operation = "insert", tenant_id = %request.tenant_id))]
    pub async fn create(
        &self,
        user_id: Uuid,
        request: &CreateOrderRequest,
    ) -> Result<Order, AppError> {
        let lines = request.merged_lines()?;
        let mut tx = TransactionGuard::begin(&self.pool, "create_order").await?;

        let mut items = Vec::with_capacity(lines.len());
        let mut currency: Option<String> = None;
        for (product_id, quantity) in lines {
            let reserved = sqlx::query_as::<Postgres, ReservedLine>(
                r#"
                UPDATE products
                SET stock = stock - $3, updated_at = NOW()
                WHERE id = $1 AND tenant_id = $2 AND is_active AND stock >= $3
                RETURNING name, price, currency
                "#,
            )
            .bind(product_id)
            .bind(request.tenant_id)
            .bind(quantity)
            .fetch_optional(&mut **tx)
            .await?;

            let reserved = match reserved {
                Some(line) => line,
                None => {
                    let name = sqlx::query_scalar::<Postgres, String>(
                        "SELECT name FROM products WHERE id = $1 AND tenant_id = $2 AND is_active",
                    )
                    .bind(product_id)
                    .bind(request.tenant_id)
                    .fetch_optional(&mut **tx)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(format!("Product {} not found", product_id))
                    })?;
                    return Err(AppError::InsufficientStock {
                        product: name,
                        requested: quantity,
                    });
                }
            };

            match &currency {
                Some(code) if *code != reserved.currency => {
                    return Err(AppError::InvalidInput(
                        "All products in an order must share one currency".to_string(),
                    ));
                }
                Some(_) => {}
                None => currency = Some(reserved.currency.clone()),
            }

            items.push(OrderItem {
                product_id,
                name: reserved.name,
                quantity,
                unit_price: reserved.price,
            });
        }

        let currency = currency
            .ok_or_else(|| AppError::InvalidInput("An order needs at least one item".to_string()))?;
        let total = order_total(&items);

        let order = sqlx::query_as::<Postgres, Order>(
            r#"
            INSERT INTO orders (tenant_id, user_id, items, total_amount, currency)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(request.tenant_id)
        .bind(user_id)
        .bind(Json(&items))
        .bind(total)
        .bind(&currency)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %user_id, "Failed to insert order");
            AppError::from(e)
        })?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            user_id = %user_id,
            total = %order.total_amount,
            lines = order.items.len(),
            "Order placed"
        );
        Ok(order)
    }

    #[tracing::instrument(skip(self), fields(db.table = "orders", db.operation = "select"))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Order>, AppError> {
        let order = sqlx::query_as::<Postgres, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    #[tracing::instrument(skip(self), fields(db.table = "orders", db.operation = "select"))]
    pub async fn list(&self, scope: OrderScope, query: &OrderQuery) -> Result<Page<Order>, AppError> {
        let (user_id, tenant_id) = match scope {
            OrderScope::User(id) => (Some(id), None),
            OrderScope::Tenant(id) => (None, Some(id)),
        };
        let params = ListParams {
            search: None,
            limit: query.limit,
            offset: query.offset,
        };

        let filter = r#"
            FROM orders
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::uuid IS NULL OR tenant_id = $2)
              AND ($3::order_status IS NULL OR status = $3)
        "#;

        let total = sqlx::query_scalar::<Postgres, i64>(&format!("SELECT COUNT(*) {filter}"))
            .bind(user_id)
            .bind(tenant_id)
            .bind(query.status)
            .fetch_one(&self.pool)
            .await?;

        let orders = sqlx::query_as::<Postgres, Order>(&format!(
            "SELECT * {filter} ORDER BY created_at DESC LIMIT $4 OFFSET $5"
        ))
        .bind(user_id)
        .bind(tenant_id)
        .bind(query.status)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(orders, total, &params))
    }

    /// Move an order along its lifecycle. Cancelling a pending or paid order
    /// returns its quantities to stock in the same transaction.
    #[tracing::instrument(skip(self), fields(db.table = "orders", db.operation = "update", next = next.as_str()))]
    pub async fn update_status(&self, id: Uuid, next: OrderStatus) -> Result<Order, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool, "update_order_status").await?;

        let current = sqlx::query_as::<Postgres, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
        current.status.ensure_transition(next)?;

        if next == OrderStatus::Cancelled && current.status.restores_stock_on_cancel() {
            for item in &current.items {
                sqlx::query(
                    "UPDATE products SET stock = stock + $2, updated_at = NOW() WHERE id = $1",
                )
                .bind(item.product_id)
                .bind(item.quantity)
                .execute(&mut **tx)
                .await?;
            }
        }

        let order = sqlx::query_as::<Postgres, Order>(
            "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(next)
        .fetch_one(&mut **tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %id,
            from = current.status.as_str(),
            to = next.as_str(),
            "Order status changed"
        );
        Ok(order)
    }
}
