//! Review eligibility and moderation.
//!
//! Run with: `cargo test -p venuehub-api --test reviews_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use helpers::auth::register_user;
use helpers::fixtures::{
    completed_booking, create_booking, future_date, id_of, setup_marketplace,
};
use helpers::setup_test_app;
use serde_json::{json, Value};
use uuid::Uuid;

fn review_body(booking_id: Uuid) -> Value {
    json!({
        "bookingId": booking_id,
        "rating": 5,
        "title": "Great pitch",
        "comment": "Well maintained turf and friendly staff.",
    })
}

#[tokio::test]
async fn test_review_requires_existing_booking() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;

    let response = app
        .client()
        .post("/api/reviews")
        .add_header("Authorization", market.customer.bearer())
        .json(&review_body(Uuid::new_v4()))
        .await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_review_rejected_until_booking_completed() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;
    let client = app.client();

    let response = create_booking(client, &market.customer, market.listing_id, future_date(2)).await;
    assert_eq!(response.status_code(), 201);
    let booking_id = id_of(&response.json());

    let response = client
        .post("/api/reviews")
        .add_header("Authorization", market.customer.bearer())
        .json(&review_body(booking_id))
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_review_rejected_for_someone_elses_booking() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;
    let booking_id = completed_booking(&app, &market).await;
    let stranger = register_user(app.client(), "stranger@venuehub.test").await;

    let response = app
        .client()
        .post("/api/reviews")
        .add_header("Authorization", stranger.bearer())
        .json(&review_body(booking_id))
        .await;

    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn test_one_review_per_booking() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;
    let booking_id = completed_booking(&app, &market).await;
    let client = app.client();

    let first = client
        .post("/api/reviews")
        .add_header("Authorization", market.customer.bearer())
        .json(&review_body(booking_id))
        .await;
    assert_eq!(first.status_code(), 201);
    let review: Value = first.json();
    assert_eq!(review["status"], "pending");
    assert_eq!(review["listingId"], market.listing_id.to_string());

    let second = client
        .post("/api/reviews")
        .add_header("Authorization", market.customer.bearer())
        .json(&review_body(booking_id))
        .await;
    assert_eq!(second.status_code(), 409);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE booking_id = $1")
        .bind(booking_id)
        .fetch_one(app.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_pending_review_hidden_until_approved() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;
    let booking_id = completed_booking(&app, &market).await;
    let client = app.client();

    let created = client
        .post("/api/reviews")
        .add_header("Authorization", market.customer.bearer())
        .json(&review_body(booking_id))
        .await;
    let review_id = id_of(&created.json());

    let public_path = format!("/api/listings/{}/reviews", market.listing_id);
    let before: Value = client.get(&public_path).await.json();
    assert_eq!(before["total"], 0);

    let moderated = client
        .put(&format!("/api/admin/reviews/{}/moderate", review_id))
        .add_header("Authorization", market.owner.bearer())
        .json(&json!({ "status": "approved" }))
        .await;
    assert_eq!(moderated.status_code(), 200);

    let after: Value = client.get(&public_path).await.json();
    assert_eq!(after["total"], 1);
    assert_eq!(after["items"][0]["id"], review_id.to_string());
}

#[tokio::test]
async fn test_new_review_notifies_tenant() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;
    let booking_id = completed_booking(&app, &market).await;
    let client = app.client();

    client
        .post("/api/reviews")
        .add_header("Authorization", market.customer.bearer())
        .json(&review_body(booking_id))
        .await;

    let list: Value = client
        .get("/api/notifications")
        .add_header("Authorization", market.owner.bearer())
        .await
        .json();
    let kinds: Vec<&str> = list["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|n| n["kind"].as_str())
        .collect();
    assert!(kinds.contains(&"review"), "kinds: {:?}", kinds);
}
