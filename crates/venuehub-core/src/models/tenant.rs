use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::listing::ListingKind;
use crate::validation::{validate_hex_color, validate_slug};

/// Tenant status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "tenant_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    Active,
    Suspended,
    Pending,
}

/// Feature module enabled on a tenant. Gates which listing kinds (and the
/// shop) the tenant's admins may manage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "tenant_module", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum TenantModule {
    Turf,
    Hotel,
    Events,
    Gym,
    Wellness,
    Shop,
}

impl TenantModule {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantModule::Turf => "turf",
            TenantModule::Hotel => "hotel",
            TenantModule::Events => "events",
            TenantModule::Gym => "gym",
            TenantModule::Wellness => "wellness",
            TenantModule::Shop => "shop",
        }
    }
}

impl From<ListingKind> for TenantModule {
    fn from(kind: ListingKind) -> Self {
        match kind {
            ListingKind::Turf => TenantModule::Turf,
            ListingKind::Hotel => TenantModule::Hotel,
            ListingKind::Event => TenantModule::Events,
            ListingKind::Gym => TenantModule::Gym,
            ListingKind::Wellness => TenantModule::Wellness,
        }
    }
}

/// Venue-operator account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub owner_user_id: Uuid,
    pub modules: Vec<TenantModule>,
    pub status: TenantStatus,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub plan_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    pub fn has_module(&self, module: TenantModule) -> bool {
        self.modules.contains(&module)
    }

    pub fn is_active(&self) -> bool {
        self.status == TenantStatus::Active
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,
    /// Existing user promoted to tenant admin
    pub owner_user_id: Uuid,
    #[serde(default)]
    pub modules: Vec<TenantModule>,
    #[validate(email(message = "Contact email must be valid"))]
    pub contact_email: Option<String>,
    #[validate(length(max = 32))]
    pub contact_phone: Option<String>,
    pub plan_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTenantRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,
    pub modules: Option<Vec<TenantModule>>,
    pub status: Option<TenantStatus>,
    #[validate(email(message = "Contact email must be valid"))]
    pub contact_email: Option<String>,
    #[validate(length(max = 32))]
    pub contact_phone: Option<String>,
    pub plan_id: Option<Uuid>,
}

/// White-label settings, one row per tenant
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct TenantBranding {
    pub tenant_id: Uuid,
    pub logo_url: Option<String>,
    pub favicon_url: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub custom_domain: Option<String>,
    pub tagline: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl TenantBranding {
    pub const DEFAULT_PRIMARY: &'static str = "#16A34A";
    pub const DEFAULT_SECONDARY: &'static str = "#0F172A";

    /// Branding served when a tenant never customised theirs.
    pub fn default_for(tenant_id: Uuid) -> Self {
        Self {
            tenant_id,
            logo_url: None,
            favicon_url: None,
            primary_color: Self::DEFAULT_PRIMARY.to_string(),
            secondary_color: Self::DEFAULT_SECONDARY.to_string(),
            custom_domain: None,
            tagline: None,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertBrandingRequest {
    #[validate(url(message = "Logo URL must be valid"))]
    pub logo_url: Option<String>,
    #[validate(url(message = "Favicon URL must be valid"))]
    pub favicon_url: Option<String>,
    #[validate(custom(function = "validate_hex_color"))]
    pub primary_color: String,
    #[validate(custom(function = "validate_hex_color"))]
    pub secondary_color: String,
    #[validate(length(max = 253))]
    pub custom_domain: Option<String>,
    #[validate(length(max = 200))]
    pub tagline: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // modules is a tenant_module[] column
    #[cfg(feature = "sqlx")]
    #[test]
    fn module_arrays_bind_as_postgres_arrays() {
        fn binds_as_array<T: sqlx::postgres::PgHasArrayType>() {}
        binds_as_array::<TenantModule>();
    }

    fn tenant(modules: Vec<TenantModule>) -> Tenant {
        Tenant {
            id: Uuid::new_v4(),
            name: "Green Arena".to_string(),
            slug: "green-arena".to_string(),
            owner_user_id: Uuid::new_v4(),
            modules,
            status: TenantStatus::Active,
            contact_email: None,
            contact_phone: None,
            plan_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn module_gating_follows_listing_kind() {
        let t = tenant(vec![TenantModule::Turf, TenantModule::Events]);
        assert!(t.has_module(ListingKind::Turf.into()));
        assert!(t.has_module(ListingKind::Event.into()));
        assert!(!t.has_module(ListingKind::Gym.into()));
        assert!(!t.has_module(TenantModule::Shop));
    }

    #[test]
    fn create_request_validates_slug() {
        let req = CreateTenantRequest {
            name: "Arena".to_string(),
            slug: "Bad Slug".to_string(),
            owner_user_id: Uuid::new_v4(),
            modules: vec![],
            contact_email: None,
            contact_phone: None,
            plan_id: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn branding_request_validates_colors() {
        let req = UpsertBrandingRequest {
            logo_url: None,
            favicon_url: None,
            primary_color: "#00FF00".to_string(),
            secondary_color: "green".to_string(),
            custom_domain: None,
            tagline: None,
        };
        assert!(req.validate().is_err());
    }
}
