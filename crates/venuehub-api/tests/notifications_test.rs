//! Notification polling, read state and archiving.
//!
//! Run with: `cargo test -p venuehub-api --test notifications_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use helpers::fixtures::{create_booking, future_date, id_of, setup_marketplace};
use helpers::setup_test_app;
use serde_json::Value;

#[tokio::test]
async fn test_booking_notifies_tenant_admin() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;
    let client = app.client();

    let response = create_booking(client, &market.customer, market.listing_id, future_date(2)).await;
    assert_eq!(response.status_code(), 201);

    let list: Value = client
        .get("/api/notifications")
        .add_header("Authorization", market.owner.bearer())
        .await
        .json();
    assert_eq!(list["unreadCount"], 1);
    assert_eq!(list["pollIntervalSeconds"], 30);
    assert_eq!(list["notifications"][0]["kind"], "booking");
    assert_eq!(list["notifications"][0]["tenantId"], market.tenant_id.to_string());

    // Tenant notifications stay out of the customer's feed.
    let customer_list: Value = client
        .get("/api/notifications")
        .add_header("Authorization", market.customer.bearer())
        .await
        .json();
    assert_eq!(customer_list["unreadCount"], 0);
}

#[tokio::test]
async fn test_mark_read_and_read_all() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;
    let client = app.client();

    create_booking(client, &market.customer, market.listing_id, future_date(2)).await;
    create_booking(client, &market.customer, market.listing_id, future_date(3)).await;

    let list: Value = client
        .get("/api/notifications")
        .add_header("Authorization", market.owner.bearer())
        .await
        .json();
    assert_eq!(list["unreadCount"], 2);
    let first = id_of(&list["notifications"][0]);

    let read = client
        .post(&format!("/api/notifications/{}/read", first))
        .add_header("Authorization", market.owner.bearer())
        .await;
    assert_eq!(read.status_code(), 200);
    let read: Value = read.json();
    assert_eq!(read["isRead"], true);

    let unread: Value = client
        .get("/api/notifications")
        .add_query_param("unreadOnly", true)
        .add_header("Authorization", market.owner.bearer())
        .await
        .json();
    assert_eq!(unread["unreadCount"], 1);
    assert_eq!(unread["notifications"].as_array().unwrap().len(), 1);

    let all: Value = client
        .post("/api/notifications/read-all")
        .add_header("Authorization", market.owner.bearer())
        .await
        .json();
    assert_eq!(all["updated"], 1);

    let after: Value = client
        .get("/api/notifications")
        .add_header("Authorization", market.owner.bearer())
        .await
        .json();
    assert_eq!(after["unreadCount"], 0);
}

#[tokio::test]
async fn test_archive_hides_notification() {
    let app = setup_test_app().await;
    let market = setup_marketplace(&app).await;
    let client = app.client();

    create_booking(client, &market.customer, market.listing_id, future_date(2)).await;
    let list: Value = client
        .get("/api/notifications")
        .add_header("Authorization", market.owner.bearer())
        .await
        .json();
    let id = id_of(&list["notifications"][0]);

    // Someone outside the tenant cannot touch it.
    let foreign = client
        .post(&format!("/api/notifications/{}/archive", id))
        .add_header("Authorization", market.customer.bearer())
        .await;
    assert_eq!(foreign.status_code(), 404);

    let archived = client
        .post(&format!("/api/notifications/{}/archive", id))
        .add_header("Authorization", market.owner.bearer())
        .await;
    assert_eq!(archived.status_code(), 204);

    let after: Value = client
        .get("/api/notifications")
        .add_header("Authorization", market.owner.bearer())
        .await
        .json();
    assert_eq!(after["unreadCount"], 0);
    assert!(after["notifications"].as_array().unwrap().is_empty());
}
