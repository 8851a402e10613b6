//! Organizations: seat limits and owner protection.
//!
//! Run with: `cargo test -p venuehub-api --test organizations_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use axum_test::TestServer;
use helpers::auth::{register_user, TestUser};
use helpers::fixtures::id_of;
use helpers::setup_test_app;
use serde_json::{json, Value};
use uuid::Uuid;

async fn create_organization(client: &TestServer, owner: &TestUser, seat_limit: i32) -> Uuid {
    let response = client
        .post("/api/organizations")
        .add_header("Authorization", owner.bearer())
        .json(&json!({
            "name": "Acme Sports",
            "slug": "acme-sports",
            "billingEmail": "billing@acme.test",
            "seatLimit": seat_limit,
        }))
        .await;
    assert_eq!(response.status_code(), 201);
    id_of(&response.json())
}

async fn add_member(
    client: &TestServer,
    manager: &TestUser,
    organization_id: Uuid,
    email: &str,
) -> axum_test::TestResponse {
    client
        .post(&format!("/api/organizations/{}/members", organization_id))
        .add_header("Authorization", manager.bearer())
        .json(&json!({ "email": email, "role": "member" }))
        .await
}

#[tokio::test]
async fn test_members_cannot_exceed_seat_limit() {
    let app = setup_test_app().await;
    let client = app.client();
    let owner = register_user(client, "owner@acme.test").await;
    let coach = register_user(client, "coach@acme.test").await;
    let analyst = register_user(client, "analyst@acme.test").await;
    let org_id = create_organization(client, &owner, 2).await;

    let response = add_member(client, &owner, org_id, &coach.email).await;
    assert_eq!(response.status_code(), 201);
    let member: Value = response.json();
    assert_eq!(member["role"], "member");

    // owner plus coach fill both seats
    let response = add_member(client, &owner, org_id, &analyst.email).await;
    assert_eq!(response.status_code(), 400);

    let members: Vec<Value> = client
        .get(&format!("/api/organizations/{}/members", org_id))
        .add_header("Authorization", owner.bearer())
        .await
        .json();
    assert_eq!(members.len(), 2);
}

#[tokio::test]
async fn test_seat_limit_cannot_drop_below_members() {
    let app = setup_test_app().await;
    let client = app.client();
    let owner = register_user(client, "owner@acme.test").await;
    let coach = register_user(client, "coach@acme.test").await;
    let analyst = register_user(client, "analyst@acme.test").await;
    let org_id = create_organization(client, &owner, 2).await;
    assert_eq!(add_member(client, &owner, org_id, &coach.email).await.status_code(), 201);

    let response = client
        .put(&format!("/api/organizations/{}", org_id))
        .add_header("Authorization", owner.bearer())
        .json(&json!({ "seatLimit": 1 }))
        .await;
    assert_eq!(response.status_code(), 400);

    let response = client
        .put(&format!("/api/organizations/{}", org_id))
        .add_header("Authorization", owner.bearer())
        .json(&json!({ "seatLimit": 3 }))
        .await;
    assert_eq!(response.status_code(), 200);
    let organization: Value = response.json();
    assert_eq!(organization["seatLimit"], 3);

    assert_eq!(add_member(client, &owner, org_id, &analyst.email).await.status_code(), 201);
}

#[tokio::test]
async fn test_owner_cannot_be_removed_or_demoted() {
    let app = setup_test_app().await;
    let client = app.client();
    let owner = register_user(client, "owner@acme.test").await;
    let manager = register_user(client, "manager@acme.test").await;
    let org_id = create_organization(client, &owner, 5).await;

    let response = client
        .post(&format!("/api/organizations/{}/members", org_id))
        .add_header("Authorization", owner.bearer())
        .json(&json!({ "email": manager.email, "role": "admin" }))
        .await;
    assert_eq!(response.status_code(), 201);

    let response = client
        .delete(&format!("/api/organizations/{}/members/{}", org_id, owner.id))
        .add_header("Authorization", manager.bearer())
        .await;
    assert_eq!(response.status_code(), 400);

    let response = client
        .delete(&format!("/api/organizations/{}/members/{}", org_id, owner.id))
        .add_header("Authorization", owner.bearer())
        .await;
    assert_eq!(response.status_code(), 400);

    let response = client
        .put(&format!("/api/organizations/{}/members/{}", org_id, owner.id))
        .add_header("Authorization", manager.bearer())
        .json(&json!({ "role": "member" }))
        .await;
    assert_eq!(response.status_code(), 400);

    // ownership is never handed out through membership
    let response = client
        .post(&format!("/api/organizations/{}/members", org_id))
        .add_header("Authorization", manager.bearer())
        .json(&json!({ "email": "someone@acme.test", "role": "owner" }))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_members_leave_and_outsiders_see_nothing() {
    let app = setup_test_app().await;
    let client = app.client();
    let owner = register_user(client, "owner@acme.test").await;
    let coach = register_user(client, "coach@acme.test").await;
    let outsider = register_user(client, "outsider@rival.test").await;
    let org_id = create_organization(client, &owner, 5).await;
    assert_eq!(add_member(client, &owner, org_id, &coach.email).await.status_code(), 201);

    let response = client
        .get(&format!("/api/organizations/{}", org_id))
        .add_header("Authorization", outsider.bearer())
        .await;
    assert_eq!(response.status_code(), 404);

    let response = add_member(client, &coach, org_id, &outsider.email).await;
    assert_eq!(response.status_code(), 403);

    let response = client
        .delete(&format!("/api/organizations/{}/members/{}", org_id, coach.id))
        .add_header("Authorization", coach.bearer())
        .await;
    assert_eq!(response.status_code(), 204);

    let organizations: Vec<Value> = client
        .get("/api/organizations")
        .add_header("Authorization", coach.bearer())
        .await
        .json();
    assert!(organizations.is_empty());
}
