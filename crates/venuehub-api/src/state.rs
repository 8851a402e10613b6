//! Application state and sub-state extractors.
//!
//! AppState is split into domain sub-states so handlers can extract only what they need
//! via Axum's `FromRef`.

use crate::auth::JwtService;
use crate::middleware::AuditLogger;
use crate::services::Notifier;
use sqlx::PgPool;
use std::sync::Arc;
use venuehub_core::{Config, EncryptionService};
use venuehub_db::{
    AuditLogRepository, BookingRepository, BrandingRepository, CatalogRepository,
    GalleryRepository, InvoiceRepository, ListingRepository, NotificationRepository,
    OrderRepository, OrganizationRepository, PaymentConfigRepository, PlanRepository,
    PolicyRepository, ProductRepository, ReviewRepository, TenantRepository, UserRepository,
};
use venuehub_infra::{CsrfConfig, RateLimiter};

// ----- Sub-state types -----

/// Pool and one repository per table family.
#[derive(Clone)]
pub struct DbState {
    pub pool: PgPool,
    pub users: UserRepository,
    pub tenants: TenantRepository,
    pub branding: BrandingRepository,
    pub listings: ListingRepository,
    pub bookings: BookingRepository,
    pub reviews: ReviewRepository,
    pub gallery: GalleryRepository,
    pub notifications: NotificationRepository,
    pub products: ProductRepository,
    pub orders: OrderRepository,
    pub plans: PlanRepository,
    pub invoices: InvoiceRepository,
    pub organizations: OrganizationRepository,
    pub payment_configs: PaymentConfigRepository,
    pub policies: PolicyRepository,
    pub catalog: CatalogRepository,
    pub audit_logs: AuditLogRepository,
}

impl DbState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            tenants: TenantRepository::new(pool.clone()),
            branding: BrandingRepository::new(pool.clone()),
            listings: ListingRepository::new(pool.clone()),
            bookings: BookingRepository::new(pool.clone()),
            reviews: ReviewRepository::new(pool.clone()),
            gallery: GalleryRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool.clone()),
            products: ProductRepository::new(pool.clone()),
            orders: OrderRepository::new(pool.clone()),
            plans: PlanRepository::new(pool.clone()),
            invoices: InvoiceRepository::new(pool.clone()),
            organizations: OrganizationRepository::new(pool.clone()),
            payment_configs: PaymentConfigRepository::new(pool.clone()),
            policies: PolicyRepository::new(pool.clone()),
            catalog: CatalogRepository::new(pool.clone()),
            audit_logs: AuditLogRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Token signing, CSRF and secret encryption.
#[derive(Clone)]
pub struct SecurityState {
    pub jwt: JwtService,
    pub csrf: CsrfConfig,
    pub encryption: Arc<EncryptionService>,
}

// ----- AppState -----

/// Main application state: aggregates sub-states for dependency injection.
#[derive(Clone)]
pub struct AppState {
    pub db: DbState,
    pub security: SecurityState,
    pub audit: AuditLogger,
    pub notifier: Notifier,
    pub rate_limiter: RateLimiter,
    pub config: Config,
    pub is_production: bool,
}

// ----- FromRef for sub-state extraction -----

impl axum::extract::FromRef<Arc<AppState>> for DbState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for SecurityState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.security.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for AuditLogger {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.audit.clone()
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
