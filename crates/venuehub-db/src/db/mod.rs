//! Database repositories for data access layer
//!
//! Repositories are organized into control/ (accounts, tenants, billing,
//! policies, catalog, audit) and marketplace/ (listings, bookings, reviews,
//! gallery, shop, notifications). Each repository owns one table family and
//! exposes CRUD plus the specialised queries its handlers need.

// Accounts, tenants, billing and platform data
pub mod control;

// Venue marketplace and shop
pub mod marketplace;

// Transaction utilities
pub mod transaction;

pub use control::{
    AuditLogRepository, BrandingRepository, CatalogRepository, InvoiceRepository,
    OrganizationRepository, PaymentConfigRepository, PlanRepository, PolicyRepository,
    TenantRepository, UserRepository,
};
pub use marketplace::{
    BookingRepository, GalleryRepository, ListingRepository, NotificationRepository,
    OrderRepository, ProductRepository, ReviewRepository,
};

use venuehub_core::validation::like_pattern;

/// `ILIKE` pattern for an optional search term.
pub(crate) fn search_pattern(search: Option<&str>) -> Option<String> {
    search.map(like_pattern)
}
