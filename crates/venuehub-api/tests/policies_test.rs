//! Policy scopes, current-version fallback and consent.
//!
//! Run with: `cargo test -p venuehub-api --test policies_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use helpers::auth::TestUser;
use helpers::fixtures::{id_of, setup_marketplace};
use helpers::setup_test_app;
use axum_test::TestServer;
use serde_json::{json, Value};

async fn create_policy(client: &TestServer, author: &TestUser, kind: &str, title: &str) -> Value {
    let response = client
        .post("/api/admin/policies")
        .add_header("Authorization", author.bearer())
        .json(&json!({
            "policyType": kind,
            "title": title,
            "content": format!("{} content", title),
        }))
        .await;
    assert_eq!(response.status_code(), 201, "create policy {}", title);
    response.json()
}

#[tokio::test]
async fn test_scopes_separate_platform_and_tenant_documents() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;
    let client = app.client();

    create_policy(client, &market.admin, "terms", "Platform terms").await;
    let tenant_terms = create_policy(client, &market.owner, "terms", "Court terms").await;
    assert_eq!(tenant_terms["tenantId"], market.tenant_id.to_string());

    let global: Value = client
        .get("/api/policies")
        .add_query_param("scope", "global")
        .await
        .json();
    let global = global.as_array().unwrap();
    assert_eq!(global.len(), 1);
    assert_eq!(global[0]["title"], "Platform terms");

    let tenant: Value = client
        .get("/api/policies")
        .add_query_param("scope", "tenant")
        .add_query_param("tenantId", market.tenant_id)
        .await
        .json();
    let tenant = tenant.as_array().unwrap();
    assert_eq!(tenant.len(), 1);
    assert_eq!(tenant[0]["title"], "Court terms");

    let missing_tenant = client
        .get("/api/policies")
        .add_query_param("scope", "tenant")
        .await;
    assert_eq!(missing_tenant.status_code(), 400);
}

#[tokio::test]
async fn test_current_falls_back_to_platform_document() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;
    let client = app.client();

    create_policy(client, &market.admin, "privacy", "Platform privacy v1").await;
    create_policy(client, &market.admin, "privacy", "Platform privacy v2").await;

    let current: Value = client
        .get("/api/policies/current")
        .add_query_param("type", "privacy")
        .add_query_param("tenantId", market.tenant_id)
        .await
        .json();
    assert_eq!(current["title"], "Platform privacy v2");
    assert_eq!(current["version"], 2);
    assert!(current["tenantId"].is_null());

    create_policy(client, &market.owner, "privacy", "Court privacy").await;
    let current: Value = client
        .get("/api/policies/current")
        .add_query_param("type", "privacy")
        .add_query_param("tenantId", market.tenant_id)
        .await
        .json();
    assert_eq!(current["title"], "Court privacy");
    assert_eq!(current["version"], 1);

    let none = client
        .get("/api/policies/current")
        .add_query_param("type", "refund")
        .await;
    assert_eq!(none.status_code(), 404);
}

#[tokio::test]
async fn test_consent_records_version() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;
    let client = app.client();

    create_policy(client, &market.admin, "terms", "Terms v1").await;
    let latest = create_policy(client, &market.admin, "terms", "Terms v2").await;

    let response = client
        .post("/api/policies/consent")
        .add_header("Authorization", market.customer.bearer())
        .add_header("User-Agent", "venuehub-tests")
        .json(&json!({ "policyId": id_of(&latest) }))
        .await;
    assert_eq!(response.status_code(), 201);
    let consent: Value = response.json();
    assert_eq!(consent["policyVersion"], 2);
    assert_eq!(consent["policyType"], "terms");
    assert_eq!(consent["userAgent"], "venuehub-tests");
    assert!(consent["ipAddress"].is_string());

    let consents: Value = client
        .get("/api/policies/consents")
        .add_header("Authorization", market.customer.bearer())
        .await
        .json();
    assert_eq!(consents.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_customer_cannot_write_policies() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;

    let response = app
        .client()
        .post("/api/admin/policies")
        .add_header("Authorization", market.customer.bearer())
        .json(&json!({ "policyType": "terms", "title": "Mine", "content": "..." }))
        .await;
    assert_eq!(response.status_code(), 403);
}
