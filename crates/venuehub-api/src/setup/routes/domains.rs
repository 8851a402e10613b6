//! Domain route groups (listings, bookings, shop, billing, etc.).
//!
//! `public_*` groups are mounted without a session; everything else sits
//! behind session authentication and CSRF enforcement.

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use axum::routing::{delete, get, post, put};
use axum::Router;
use std::sync::Arc;

fn api(path: &str) -> String {
    format!("{}{}", API_PREFIX, path)
}

// ----- Public -----

pub fn public_auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(&api("/auth/register"), post(handlers::auth::register))
        .route(&api("/auth/login"), post(handlers::auth::login))
        .route(&api("/auth/logout"), post(handlers::auth::logout))
        .route(&api("/csrf-token"), get(handlers::auth::csrf_token))
}

pub fn public_marketplace_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(&api("/listings"), get(handlers::listings::search_listings))
        .route(&api("/listings/{id}"), get(handlers::listings::get_listing))
        .route(
            &api("/listings/{id}/availability"),
            get(handlers::listings::get_availability),
        )
        .route(
            &api("/listings/{id}/reviews"),
            get(handlers::reviews::list_listing_reviews),
        )
        .route(&api("/bookings/quote"), post(handlers::bookings::quote))
        .route(
            &api("/tenants/by-slug/{slug}"),
            get(handlers::tenants::get_tenant_by_slug),
        )
        .route(
            &api("/tenants/{id}/branding"),
            get(handlers::tenants::get_branding),
        )
        .route(
            &api("/tenants/{id}/gallery"),
            get(handlers::gallery::public_gallery),
        )
        .route(
            &api("/tenants/{id}/products"),
            get(handlers::products::public_products),
        )
}

pub fn public_reference_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(&api("/plans"), get(handlers::plans::list_active_plans))
        .route(&api("/policies"), get(handlers::policies::list_policies))
        .route(
            &api("/policies/current"),
            get(handlers::policies::current_policy),
        )
        .route(
            &api("/catalog/amenities"),
            get(handlers::catalog::list_amenities),
        )
        .route(
            &api("/catalog/currencies"),
            get(handlers::catalog::list_currencies),
        )
        .route(
            &api("/catalog/pricing-models"),
            get(handlers::catalog::list_pricing_models),
        )
}

// ----- Signed-in users -----

pub fn account_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(&api("/auth/me"), get(handlers::auth::me))
        .route(
            &api("/policies/consent"),
            post(handlers::policies::record_consent),
        )
        .route(
            &api("/policies/consents"),
            get(handlers::policies::list_my_consents),
        )
}

pub fn booking_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &api("/bookings"),
            post(handlers::bookings::create_booking).get(handlers::bookings::list_my_bookings),
        )
        .route(&api("/bookings/{id}"), get(handlers::bookings::get_booking))
        .route(
            &api("/bookings/{id}/cancel"),
            post(handlers::bookings::cancel_booking),
        )
        .route(&api("/reviews"), post(handlers::reviews::create_review))
}

pub fn order_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &api("/orders"),
            post(handlers::orders::create_order).get(handlers::orders::list_my_orders),
        )
        .route(&api("/orders/{id}"), get(handlers::orders::get_order))
        .route(
            &api("/orders/{id}/cancel"),
            post(handlers::orders::cancel_order),
        )
}

pub fn notification_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &api("/notifications"),
            get(handlers::notifications::list_notifications),
        )
        .route(
            &api("/notifications/read-all"),
            post(handlers::notifications::mark_all_read),
        )
        .route(
            &api("/notifications/{id}/read"),
            post(handlers::notifications::mark_read),
        )
        .route(
            &api("/notifications/{id}/archive"),
            post(handlers::notifications::archive),
        )
        .route(
            &api("/notifications/push/subscribe"),
            post(handlers::notifications::subscribe_push),
        )
        .route(
            &api("/notifications/push/unsubscribe"),
            post(handlers::notifications::unsubscribe_push),
        )
}

pub fn organization_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &api("/organizations"),
            post(handlers::organizations::create_organization)
                .get(handlers::organizations::list_my_organizations),
        )
        .route(
            &api("/organizations/{id}"),
            get(handlers::organizations::get_organization)
                .put(handlers::organizations::update_organization)
                .delete(handlers::organizations::delete_organization),
        )
        .route(
            &api("/organizations/{id}/members"),
            get(handlers::organizations::list_members).post(handlers::organizations::add_member),
        )
        .route(
            &api("/organizations/{id}/members/{user_id}"),
            put(handlers::organizations::update_member)
                .delete(handlers::organizations::remove_member),
        )
        .route(
            &api("/organizations/{id}/invoices"),
            get(handlers::organizations::list_organization_invoices),
        )
}

// ----- Admin -----

pub fn admin_tenant_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &api("/admin/tenants"),
            get(handlers::tenants::list_tenants).post(handlers::tenants::create_tenant),
        )
        .route(
            &api("/admin/tenants/{id}"),
            get(handlers::tenants::get_tenant)
                .put(handlers::tenants::update_tenant)
                .delete(handlers::tenants::delete_tenant),
        )
        .route(&api("/admin/tenant"), get(handlers::tenants::get_own_tenant))
        .route(
            &api("/admin/branding"),
            put(handlers::tenants::upsert_branding),
        )
        .route(
            &api("/admin/payment-config"),
            get(handlers::payment_config::get_payment_config)
                .put(handlers::payment_config::upsert_payment_config)
                .delete(handlers::payment_config::delete_payment_config),
        )
        .route(
            &api("/admin/gallery"),
            get(handlers::gallery::list_gallery).post(handlers::gallery::create_gallery_item),
        )
        .route(
            &api("/admin/gallery/{id}"),
            get(handlers::gallery::get_gallery_item)
                .put(handlers::gallery::update_gallery_item)
                .delete(handlers::gallery::delete_gallery_item),
        )
        .route(&api("/admin/users"), get(handlers::users::list_users))
        .route(
            &api("/admin/users/{id}"),
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
}

pub fn admin_marketplace_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &api("/admin/listings"),
            get(handlers::listings::admin_list_listings).post(handlers::listings::create_listing),
        )
        .route(
            &api("/admin/listings/{id}"),
            get(handlers::listings::admin_get_listing)
                .put(handlers::listings::update_listing)
                .delete(handlers::listings::delete_listing),
        )
        .route(
            &api("/admin/bookings"),
            get(handlers::bookings::admin_list_bookings),
        )
        .route(
            &api("/admin/bookings/{id}"),
            get(handlers::bookings::admin_get_booking),
        )
        .route(
            &api("/admin/bookings/{id}/status"),
            put(handlers::bookings::update_booking_status),
        )
        .route(
            &api("/admin/reviews"),
            get(handlers::reviews::admin_list_reviews),
        )
        .route(
            &api("/admin/reviews/{id}"),
            delete(handlers::reviews::delete_review),
        )
        .route(
            &api("/admin/reviews/{id}/moderate"),
            put(handlers::reviews::moderate_review),
        )
        .route(
            &api("/admin/reviews/{id}/reply"),
            post(handlers::reviews::reply_review),
        )
        .route(
            &api("/admin/notifications"),
            post(handlers::notifications::admin_send_notification),
        )
}

pub fn admin_shop_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &api("/admin/products"),
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            &api("/admin/products/{id}"),
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )
        .route(&api("/admin/orders"), get(handlers::orders::admin_list_orders))
        .route(
            &api("/admin/orders/{id}/status"),
            put(handlers::orders::update_order_status),
        )
}

pub fn admin_billing_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &api("/admin/plans"),
            get(handlers::plans::list_plans).post(handlers::plans::create_plan),
        )
        .route(
            &api("/admin/plans/{id}"),
            get(handlers::plans::get_plan)
                .put(handlers::plans::update_plan)
                .delete(handlers::plans::delete_plan),
        )
        .route(
            &api("/admin/invoices"),
            get(handlers::invoices::list_invoices).post(handlers::invoices::create_invoice),
        )
        .route(
            &api("/admin/invoices/{id}"),
            get(handlers::invoices::get_invoice),
        )
        .route(
            &api("/admin/invoices/{id}/status"),
            put(handlers::invoices::update_invoice_status),
        )
        .route(
            &api("/admin/organizations"),
            get(handlers::organizations::admin_list_organizations),
        )
}

pub fn admin_platform_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &api("/admin/policies"),
            post(handlers::policies::create_policy),
        )
        .route(
            &api("/admin/policies/{id}"),
            put(handlers::policies::update_policy).delete(handlers::policies::delete_policy),
        )
        .route(
            &api("/admin/amenities"),
            post(handlers::catalog::create_amenity),
        )
        .route(
            &api("/admin/amenities/{id}"),
            get(handlers::catalog::get_amenity)
                .put(handlers::catalog::update_amenity)
                .delete(handlers::catalog::delete_amenity),
        )
        .route(
            &api("/admin/currencies"),
            post(handlers::catalog::create_currency),
        )
        .route(
            &api("/admin/currencies/{id}"),
            get(handlers::catalog::get_currency)
                .put(handlers::catalog::update_currency)
                .delete(handlers::catalog::delete_currency),
        )
        .route(
            &api("/admin/pricing-models"),
            post(handlers::catalog::create_pricing_model),
        )
        .route(
            &api("/admin/pricing-models/{id}"),
            get(handlers::catalog::get_pricing_model)
                .put(handlers::catalog::update_pricing_model)
                .delete(handlers::catalog::delete_pricing_model),
        )
        .route(
            &api("/admin/audit-logs"),
            get(handlers::audit_logs::list_audit_logs),
        )
}
