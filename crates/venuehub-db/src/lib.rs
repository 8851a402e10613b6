//! VenueHub Database Layer
//!
//! This crate provides database repositories and data access functionality
//! over PostgreSQL.

// Module declarations
pub mod db;

// Re-exports: Control repositories
pub use db::{
    AuditLogRepository, BrandingRepository, CatalogRepository, InvoiceRepository,
    OrganizationRepository, PaymentConfigRepository, PlanRepository, PolicyRepository,
    TenantRepository, UserRepository,
};

// Re-exports: Marketplace repositories
pub use db::{
    BookingRepository, GalleryRepository, ListingRepository, NotificationRepository,
    OrderRepository, ProductRepository, ReviewRepository,
};

// Re-exports: Transaction utilities
pub use db::transaction::TransactionGuard;
