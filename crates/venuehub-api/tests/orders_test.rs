//! Shop orders: stock reservation and release.
//!
//! Run with: `cargo test -p venuehub-api --test orders_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use axum_test::TestServer;
use helpers::auth::{register_user, TestUser};
use helpers::fixtures::{create_tenant, id_of, setup_marketplace};
use helpers::setup_test_app;
use serde_json::{json, Value};
use uuid::Uuid;

async fn create_product(client: &TestServer, owner: &TestUser, sku: &str, stock: i32) -> Uuid {
    let response = client
        .post("/api/admin/products")
        .add_header("Authorization", owner.bearer())
        .json(&json!({
            "name": format!("Product {}", sku),
            "sku": sku,
            "price": 250,
            "currency": "INR",
            "stock": stock,
        }))
        .await;
    assert_eq!(response.status_code(), 201, "create product {}", sku);
    id_of(&response.json())
}

async fn stock_of(client: &TestServer, owner: &TestUser, product_id: Uuid) -> i64 {
    let product: Value = client
        .get(&format!("/api/admin/products/{}", product_id))
        .add_header("Authorization", owner.bearer())
        .await
        .json();
    product["stock"].as_i64().unwrap()
}

#[tokio::test]
async fn test_order_exceeding_stock_rejected_without_side_effects() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;
    let client = app.client();
    let balls = create_product(client, &market.owner, "BALL-5", 5).await;
    let bibs = create_product(client, &market.owner, "BIB-SET", 1).await;

    let response = client
        .post("/api/orders")
        .add_header("Authorization", market.customer.bearer())
        .json(&json!({
            "tenantId": market.tenant_id,
            "items": [
                { "productId": balls, "quantity": 2 },
                { "productId": bibs, "quantity": 3 }
            ],
        }))
        .await;
    assert_eq!(response.status_code(), 400);

    // The first line must not stay reserved.
    assert_eq!(stock_of(client, &market.owner, balls).await, 5);
    assert_eq!(stock_of(client, &market.owner, bibs).await, 1);
}

#[tokio::test]
async fn test_order_reserves_and_cancel_restores_stock() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;
    let client = app.client();
    let balls = create_product(client, &market.owner, "BALL-5", 5).await;

    let response = client
        .post("/api/orders")
        .add_header("Authorization", market.customer.bearer())
        .json(&json!({
            "tenantId": market.tenant_id,
            "items": [
                { "productId": balls, "quantity": 1 },
                { "productId": balls, "quantity": 2 }
            ],
        }))
        .await;
    assert_eq!(response.status_code(), 201);
    let order: Value = response.json();
    assert_eq!(order["status"], "pending");
    assert_eq!(order["items"].as_array().unwrap().len(), 1);
    assert_eq!(order["items"][0]["quantity"], 3);
    assert_eq!(order["totalAmount"].as_f64(), Some(750.0));
    assert_eq!(stock_of(client, &market.owner, balls).await, 2);

    let cancelled = client
        .post(&format!("/api/orders/{}/cancel", id_of(&order)))
        .add_header("Authorization", market.customer.bearer())
        .await;
    assert_eq!(cancelled.status_code(), 200);
    let cancelled: Value = cancelled.json();
    assert_eq!(cancelled["status"], "cancelled");
    assert_eq!(stock_of(client, &market.owner, balls).await, 5);
}

#[tokio::test]
async fn test_order_requires_shop_module() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;
    let client = app.client();

    let other_owner = register_user(client, "turf-only@venuehub.test").await;
    let tenant = create_tenant(client, &market.admin, &other_owner, "turf-only", &["turf"]).await;

    let response = client
        .post("/api/orders")
        .add_header("Authorization", market.customer.bearer())
        .json(&json!({
            "tenantId": id_of(&tenant),
            "items": [{ "productId": Uuid::new_v4(), "quantity": 1 }],
        }))
        .await;
    assert_eq!(response.status_code(), 403);

    let response = client
        .get("/api/admin/products")
        .add_header("Authorization", other_owner.bearer())
        .await;
    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn test_orders_are_private_to_the_buyer() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;
    let client = app.client();
    let balls = create_product(client, &market.owner, "BALL-5", 5).await;

    let order: Value = client
        .post("/api/orders")
        .add_header("Authorization", market.customer.bearer())
        .json(&json!({
            "tenantId": market.tenant_id,
            "items": [{ "productId": balls, "quantity": 1 }],
        }))
        .await
        .json();

    let response = client
        .get(&format!("/api/orders/{}", id_of(&order)))
        .add_header("Authorization", market.owner.bearer())
        .await;
    assert_eq!(response.status_code(), 404);
}
