//! HTTP handlers, one module per resource.

pub mod audit_logs;
pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod gallery;
pub mod invoices;
pub mod listings;
pub mod notifications;
pub mod orders;
pub mod organizations;
pub mod payment_config;
pub mod plans;
pub mod policies;
pub mod products;
pub mod reviews;
pub mod tenants;
pub mod users;

use crate::state::AppState;
use uuid::Uuid;
use venuehub_core::models::{Tenant, TenantModule};
use venuehub_core::AppError;

/// Records of another tenant read as missing to tenant admins.
pub(crate) fn ensure_tenant_visible(
    admin_filter: Option<Uuid>,
    owner_tenant_id: Uuid,
    resource: &str,
) -> Result<(), AppError> {
    match admin_filter {
        Some(tenant_id) if tenant_id != owner_tenant_id => {
            Err(AppError::NotFound(format!("{} not found", resource)))
        }
        _ => Ok(()),
    }
}

/// Load a tenant and fail with `ModuleDisabled` unless `module` is enabled.
pub(crate) async fn require_module(
    state: &AppState,
    tenant_id: Uuid,
    module: TenantModule,
) -> Result<Tenant, AppError> {
    let tenant = state
        .db
        .tenants
        .get_by_id(tenant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))?;
    if !tenant.has_module(module) {
        return Err(AppError::ModuleDisabled(module.as_str().to_string()));
    }
    Ok(tenant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_tenants_records_are_hidden() {
        let mine = Uuid::new_v4();
        let theirs = Uuid::new_v4();
        assert!(ensure_tenant_visible(Some(mine), mine, "Listing").is_ok());
        assert!(matches!(
            ensure_tenant_visible(Some(mine), theirs, "Listing"),
            Err(AppError::NotFound(_))
        ));
        // Super admins are unrestricted.
        assert!(ensure_tenant_visible(None, theirs, "Listing").is_ok());
    }
}
