//! Marketplace fixtures built through the public API.

use super::auth::{make_super_admin, register_user, TestUser};
use super::TestApp;
use axum_test::TestServer;
use chrono::{Duration, NaiveDate, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

/// A tenant with one active turf listing, its owner, a platform admin and a customer.
pub struct Marketplace {
    pub admin: TestUser,
    pub owner: TestUser,
    pub customer: TestUser,
    pub tenant_id: Uuid,
    pub listing_id: Uuid,
}

pub fn id_of(value: &Value) -> Uuid {
    value["id"]
        .as_str()
        .and_then(|id| id.parse().ok())
        .expect("id field")
}

pub fn future_date(days: i64) -> NaiveDate {
    Utc::now().date_naive() + Duration::days(days)
}

pub async fn create_tenant(
    client: &TestServer,
    admin: &TestUser,
    owner: &TestUser,
    slug: &str,
    modules: &[&str],
) -> Value {
    let response = client
        .post("/api/admin/tenants")
        .add_header("Authorization", admin.bearer())
        .json(&json!({
            "name": format!("Tenant {}", slug),
            "slug": slug,
            "ownerUserId": owner.id,
            "modules": modules,
        }))
        .await;
    assert_eq!(response.status_code(), 201, "create tenant {}", slug);
    response.json()
}

pub async fn create_turf(client: &TestServer, owner: &TestUser, capacity: i32) -> Value {
    let response = client
        .post("/api/admin/listings")
        .add_header("Authorization", owner.bearer())
        .json(&json!({
            "kind": "turf",
            "title": "Centre Court Turf",
            "description": "Floodlit five-a-side turf",
            "priceConfig": {
                "basePrice": 1000,
                "currency": "INR",
                "unit": "per_slot",
                "taxPercent": 18
            },
            "location": {
                "address": "1 Stadium Road",
                "city": "Pune",
                "country": "India"
            },
            "capacity": capacity,
        }))
        .await;
    assert_eq!(response.status_code(), 201, "create listing");
    response.json()
}

pub async fn create_booking(
    client: &TestServer,
    customer: &TestUser,
    listing_id: Uuid,
    date: NaiveDate,
) -> axum_test::TestResponse {
    client
        .post("/api/bookings")
        .add_header("Authorization", customer.bearer())
        .json(&json!({
            "listingId": listing_id,
            "bookingDate": date,
            "timeSlots": [{ "start": "10:00", "end": "11:00" }],
            "guests": 2,
        }))
        .await
}

pub async fn set_booking_status(
    client: &TestServer,
    admin: &TestUser,
    booking_id: Uuid,
    status: &str,
) -> axum_test::TestResponse {
    client
        .put(&format!("/api/admin/bookings/{}/status", booking_id))
        .add_header("Authorization", admin.bearer())
        .json(&json!({ "status": status }))
        .await
}

/// Book the listing and walk the booking to `completed`.
pub async fn completed_booking(app: &TestApp, market: &Marketplace) -> Uuid {
    let client = app.client();
    let response = create_booking(client, &market.customer, market.listing_id, future_date(3)).await;
    assert_eq!(response.status_code(), 201);
    let booking_id = id_of(&response.json());

    for status in ["confirmed", "completed"] {
        let response = set_booking_status(client, &market.owner, booking_id, status).await;
        assert_eq!(response.status_code(), 200, "transition to {}", status);
    }
    booking_id
}

pub async fn setup_marketplace(app: &TestApp) -> Marketplace {
    let client = app.client();
    let admin = register_user(client, "admin@venuehub.test").await;
    make_super_admin(app.pool(), &admin).await;
    let owner = register_user(client, "owner@venuehub.test").await;
    let customer = register_user(client, "customer@venuehub.test").await;

    let tenant = create_tenant(client, &admin, &owner, "centre-court", &["turf", "shop"]).await;
    let listing = create_turf(client, &owner, 10).await;

    Marketplace {
        admin,
        owner,
        customer,
        tenant_id: id_of(&tenant),
        listing_id: id_of(&listing),
    }
}
