pub mod audit;
pub mod catalog;
pub mod invoice;
pub mod organization;
pub mod payment_config;
pub mod plan;
pub mod policy;
pub mod tenant;
pub mod user;

pub use audit::AuditLogRepository;
pub use catalog::CatalogRepository;
pub use invoice::{InvoiceOwner, InvoiceRepository};
pub use organization::OrganizationRepository;
pub use payment_config::{EncryptedPaymentConfig, PaymentConfigRepository};
pub use plan::PlanRepository;
pub use policy::PolicyRepository;
pub use tenant::{BrandingRepository, TenantRepository};
pub use user::{NewUser, UserRepository};
