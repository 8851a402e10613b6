//! Invoice issuing and numbering.
//!
//! Run with: `cargo test -p venuehub-api --test invoices_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use axum_test::TestServer;
use chrono::{Datelike, Utc};
use helpers::auth::TestUser;
use helpers::fixtures::setup_marketplace;
use helpers::setup_test_app;
use serde_json::{json, Value};
use uuid::Uuid;

async fn issue_invoice(client: &TestServer, admin: &TestUser, tenant_id: Uuid) -> Value {
    let response = client
        .post("/api/admin/invoices")
        .add_header("Authorization", admin.bearer())
        .json(&json!({
            "tenantId": tenant_id,
            "lineItems": [
                { "description": "Marketplace plan", "quantity": 2, "unitPrice": 500 }
            ],
            "taxPercent": 18,
            "currency": "inr",
            "issue": true,
        }))
        .await;
    assert_eq!(response.status_code(), 201);
    response.json()
}

#[tokio::test]
async fn test_invoice_numbers_are_consecutive_within_the_year() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;
    let client = app.client();
    let year = Utc::now().year();

    let first = issue_invoice(client, &market.admin, market.tenant_id).await;
    let second = issue_invoice(client, &market.admin, market.tenant_id).await;

    assert_eq!(first["invoiceNumber"], format!("INV-{}-00001", year));
    assert_eq!(second["invoiceNumber"], format!("INV-{}-00002", year));
    assert_eq!(first["status"], "issued");
    assert_eq!(first["currency"], "INR");
    assert_eq!(first["subtotal"].as_f64(), Some(1000.0));
    assert_eq!(first["taxAmount"].as_f64(), Some(180.0));
    assert_eq!(first["total"].as_f64(), Some(1180.0));
}

#[tokio::test]
async fn test_invoice_counter_is_kept_per_year() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;
    let client = app.client();
    let year = Utc::now().year();

    sqlx::query("INSERT INTO invoice_sequences (year, last_value) VALUES ($1, 41)")
        .bind(year - 1)
        .execute(app.pool())
        .await
        .unwrap();

    let invoice = issue_invoice(client, &market.admin, market.tenant_id).await;
    assert_eq!(invoice["invoiceNumber"], format!("INV-{}-00001", year));

    let last_year: i64 =
        sqlx::query_scalar("SELECT last_value FROM invoice_sequences WHERE year = $1")
            .bind(year - 1)
            .fetch_one(app.pool())
            .await
            .unwrap();
    assert_eq!(last_year, 41);
}

#[tokio::test]
async fn test_invoice_requires_exactly_one_billed_party() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;

    let response = app
        .client()
        .post("/api/admin/invoices")
        .add_header("Authorization", market.admin.bearer())
        .json(&json!({
            "lineItems": [
                { "description": "Marketplace plan", "quantity": 1, "unitPrice": 500 }
            ],
            "currency": "INR",
        }))
        .await;
    assert_eq!(response.status_code(), 400);

    let used: Option<i64> = sqlx::query_scalar("SELECT MAX(last_value) FROM invoice_sequences")
        .fetch_one(app.pool())
        .await
        .unwrap();
    assert_eq!(used, None);
}

#[tokio::test]
async fn test_tenant_admin_reads_but_cannot_issue() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;
    let client = app.client();
    issue_invoice(client, &market.admin, market.tenant_id).await;

    let response = client
        .post("/api/admin/invoices")
        .add_header("Authorization", market.owner.bearer())
        .json(&json!({
            "tenantId": market.tenant_id,
            "lineItems": [
                { "description": "Free month", "quantity": 1, "unitPrice": 0 }
            ],
            "currency": "INR",
        }))
        .await;
    assert_eq!(response.status_code(), 403);

    let page: Value = client
        .get("/api/admin/invoices")
        .add_header("Authorization", market.owner.bearer())
        .await
        .json();
    assert_eq!(page["total"], 1);
}
