//! OpenAPI documentation.
//!
//! Served as JSON at `/api/openapi.json` and rendered by RapiDoc at `/docs`.
//! Schemas referenced from handler annotations are collected automatically;
//! the list below only names the ones worth browsing on their own.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;
use venuehub_core::models;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

struct SessionSecurity;

impl Modify for SessionSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("session-token"))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "VenueHub API",
        version = "0.1.0",
        description = "Multi-tenant marketplace for venues, services and experiences: listings, bookings, reviews, notifications, shop, billing and legal policies. Authenticated requests carry a session token as a Bearer header or the session-token cookie; cookie sessions must echo the CSRF token in X-CSRF-Token."
    ),
    modifiers(&SessionSecurity),
    paths(
        // Auth
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::me,
        handlers::auth::csrf_token,
        // Listings
        handlers::listings::search_listings,
        handlers::listings::get_listing,
        handlers::listings::get_availability,
        handlers::listings::admin_list_listings,
        handlers::listings::create_listing,
        handlers::listings::admin_get_listing,
        handlers::listings::update_listing,
        handlers::listings::delete_listing,
        // Bookings
        handlers::bookings::quote,
        handlers::bookings::create_booking,
        handlers::bookings::list_my_bookings,
        handlers::bookings::get_booking,
        handlers::bookings::cancel_booking,
        handlers::bookings::admin_list_bookings,
        handlers::bookings::admin_get_booking,
        handlers::bookings::update_booking_status,
        // Reviews
        handlers::reviews::list_listing_reviews,
        handlers::reviews::create_review,
        handlers::reviews::admin_list_reviews,
        handlers::reviews::moderate_review,
        handlers::reviews::reply_review,
        handlers::reviews::delete_review,
        // Notifications
        handlers::notifications::list_notifications,
        handlers::notifications::mark_read,
        handlers::notifications::mark_all_read,
        handlers::notifications::archive,
        handlers::notifications::subscribe_push,
        handlers::notifications::unsubscribe_push,
        handlers::notifications::admin_send_notification,
        // Tenants
        handlers::tenants::create_tenant,
        handlers::tenants::list_tenants,
        handlers::tenants::get_tenant,
        handlers::tenants::update_tenant,
        handlers::tenants::delete_tenant,
        handlers::tenants::get_own_tenant,
        handlers::tenants::get_tenant_by_slug,
        handlers::tenants::get_branding,
        handlers::tenants::upsert_branding,
        handlers::gallery::public_gallery,
        handlers::gallery::list_gallery,
        handlers::gallery::create_gallery_item,
        handlers::gallery::get_gallery_item,
        handlers::gallery::update_gallery_item,
        handlers::gallery::delete_gallery_item,
        handlers::payment_config::get_payment_config,
        handlers::payment_config::upsert_payment_config,
        handlers::payment_config::delete_payment_config,
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::delete_user,
        // Shop
        handlers::products::public_products,
        handlers::products::list_products,
        handlers::products::create_product,
        handlers::products::get_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::orders::create_order,
        handlers::orders::list_my_orders,
        handlers::orders::get_order,
        handlers::orders::cancel_order,
        handlers::orders::admin_list_orders,
        handlers::orders::update_order_status,
        // Billing
        handlers::plans::list_active_plans,
        handlers::plans::list_plans,
        handlers::plans::create_plan,
        handlers::plans::get_plan,
        handlers::plans::update_plan,
        handlers::plans::delete_plan,
        handlers::invoices::list_invoices,
        handlers::invoices::create_invoice,
        handlers::invoices::get_invoice,
        handlers::invoices::update_invoice_status,
        // Organizations
        handlers::organizations::create_organization,
        handlers::organizations::list_my_organizations,
        handlers::organizations::admin_list_organizations,
        handlers::organizations::get_organization,
        handlers::organizations::update_organization,
        handlers::organizations::delete_organization,
        handlers::organizations::list_members,
        handlers::organizations::add_member,
        handlers::organizations::update_member,
        handlers::organizations::remove_member,
        handlers::organizations::list_organization_invoices,
        // Policies
        handlers::policies::list_policies,
        handlers::policies::current_policy,
        handlers::policies::record_consent,
        handlers::policies::list_my_consents,
        handlers::policies::create_policy,
        handlers::policies::update_policy,
        handlers::policies::delete_policy,
        // Catalog
        handlers::catalog::list_amenities,
        handlers::catalog::get_amenity,
        handlers::catalog::create_amenity,
        handlers::catalog::update_amenity,
        handlers::catalog::delete_amenity,
        handlers::catalog::list_currencies,
        handlers::catalog::get_currency,
        handlers::catalog::create_currency,
        handlers::catalog::update_currency,
        handlers::catalog::delete_currency,
        handlers::catalog::list_pricing_models,
        handlers::catalog::get_pricing_model,
        handlers::catalog::create_pricing_model,
        handlers::catalog::update_pricing_model,
        handlers::catalog::delete_pricing_model,
        // Audit
        handlers::audit_logs::list_audit_logs,
    ),
    components(
        schemas(
            models::UserRole,
            models::ListingKind,
            models::PriceConfig,
            models::BookingStatus,
            models::PaymentStatus,
            models::ReviewStatus,
            models::NotificationKind,
            models::TenantModule,
            models::OrderStatus,
            models::InvoiceStatus,
            models::PolicyType,
            models::AuditEventType,
            models::PushPayload,
            venuehub_infra::ErrorResponse,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and session"),
        (name = "listings", description = "Public marketplace search and availability"),
        (name = "bookings", description = "Quotes, bookings and cancellation"),
        (name = "reviews", description = "Reviews from completed bookings"),
        (name = "notifications", description = "In-app notifications and push subscriptions"),
        (name = "tenants", description = "Public tenant storefront data"),
        (name = "shop", description = "Products and orders"),
        (name = "billing", description = "Subscription plans"),
        (name = "organizations", description = "B2B organizations and members"),
        (name = "policies", description = "Legal documents and consent"),
        (name = "catalog", description = "Platform reference data"),
        (name = "admin", description = "Tenant and platform administration")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_uses_brace_path_parameters() {
        let spec = get_openapi_spec();
        assert!(spec.paths.paths.contains_key("/api/listings/{id}/availability"));
        assert!(spec.paths.paths.contains_key("/api/admin/bookings/{id}/status"));
        assert!(spec.paths.paths.keys().all(|path| !path.contains("/:")));
    }

    #[test]
    fn security_schemes_registered() {
        let spec = get_openapi_spec();
        let components = spec.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
        assert!(components.security_schemes.contains_key("session_cookie"));
    }
}
