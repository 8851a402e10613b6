//! Booking pricing, availability and lifecycle.
//!
//! Run with: `cargo test -p venuehub-api --test bookings_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use helpers::auth::register_user;
use helpers::fixtures::{
    create_booking, create_tenant, create_turf, future_date, id_of, set_booking_status,
    setup_marketplace,
};
use helpers::setup_test_app;
use serde_json::{json, Value};

#[tokio::test]
async fn test_booking_in_the_past_rejected() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;

    let response = create_booking(app.client(), &market.customer, market.listing_id, future_date(-1)).await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_quote_prices_slot_with_tax() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;

    let response = app
        .client()
        .post("/api/bookings/quote")
        .json(&json!({
            "listingId": market.listing_id,
            "bookingDate": future_date(1),
            "timeSlots": [
                { "start": "10:00", "end": "11:00" },
                { "start": "11:00", "end": "12:00" }
            ],
        }))
        .await;

    assert_eq!(response.status_code(), 200);
    let quote: Value = response.json();
    assert_eq!(quote["totalAmount"].as_f64(), Some(2000.0));
    assert_eq!(quote["taxAmount"].as_f64(), Some(360.0));
    assert_eq!(quote["finalAmount"].as_f64(), Some(2360.0));
    assert_eq!(quote["currency"], "INR");
}

#[tokio::test]
async fn test_booking_created_pending_and_reduces_availability() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;
    let client = app.client();
    let date = future_date(4);

    let response = create_booking(client, &market.customer, market.listing_id, date).await;
    assert_eq!(response.status_code(), 201);
    let booking: Value = response.json();
    assert_eq!(booking["status"], "pending");
    assert_eq!(booking["finalAmount"].as_f64(), Some(1180.0));

    let availability: Value = client
        .get(&format!("/api/listings/{}/availability", market.listing_id))
        .add_query_param("date", date)
        .await
        .json();
    assert_eq!(availability["capacity"], 10);
    let slots = availability["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0]["booked"], 1);
    assert_eq!(slots[0]["remaining"], 9);
}

#[tokio::test]
async fn test_fully_booked_slot_conflicts() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;
    let client = app.client();
    let small = create_turf(client, &market.owner, 1).await;
    let date = future_date(5);

    let first = create_booking(client, &market.customer, id_of(&small), date).await;
    assert_eq!(first.status_code(), 201);

    let second = create_booking(client, &market.customer, id_of(&small), date).await;
    assert_eq!(second.status_code(), 409);
}

#[tokio::test]
async fn test_invalid_status_transition_rejected() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;
    let client = app.client();

    let response = create_booking(client, &market.customer, market.listing_id, future_date(2)).await;
    let booking_id = id_of(&response.json());

    let skipped = set_booking_status(client, &market.owner, booking_id, "completed").await;
    assert_eq!(skipped.status_code(), 400);

    let confirmed = set_booking_status(client, &market.owner, booking_id, "confirmed").await;
    assert_eq!(confirmed.status_code(), 200);
    let body: Value = confirmed.json();
    assert_eq!(body["status"], "confirmed");
}

#[tokio::test]
async fn test_customer_cancels_booking() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;
    let client = app.client();

    let response = create_booking(client, &market.customer, market.listing_id, future_date(2)).await;
    let booking_id = id_of(&response.json());

    let cancelled = client
        .post(&format!("/api/bookings/{}/cancel", booking_id))
        .add_header("Authorization", market.customer.bearer())
        .json(&json!({ "reason": "Plans changed" }))
        .await;
    assert_eq!(cancelled.status_code(), 200);
    let body: Value = cancelled.json();
    assert_eq!(body["status"], "cancelled");

    let again = client
        .post(&format!("/api/bookings/{}/cancel", booking_id))
        .add_header("Authorization", market.customer.bearer())
        .json(&json!({}))
        .await;
    assert_eq!(again.status_code(), 400);
}

#[tokio::test]
async fn test_other_tenant_admin_cannot_see_booking() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;
    let client = app.client();

    let response = create_booking(client, &market.customer, market.listing_id, future_date(2)).await;
    let booking_id = id_of(&response.json());

    let rival = register_user(client, "rival@venuehub.test").await;
    create_tenant(client, &market.admin, &rival, "rival-arena", &["turf"]).await;

    let response = client
        .get(&format!("/api/admin/bookings/{}", booking_id))
        .add_header("Authorization", rival.bearer())
        .await;
    assert_eq!(response.status_code(), 404);

    let response = client
        .get(&format!("/api/admin/bookings/{}", booking_id))
        .add_header("Authorization", market.owner.bearer())
        .await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_inactive_listing_not_bookable() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;
    let client = app.client();

    let response = client
        .put(&format!("/api/admin/listings/{}", market.listing_id))
        .add_header("Authorization", market.owner.bearer())
        .json(&json!({ "isActive": false }))
        .await;
    assert_eq!(response.status_code(), 200);

    let response = create_booking(client, &market.customer, market.listing_id, future_date(2)).await;
    assert_eq!(response.status_code(), 400);
}
