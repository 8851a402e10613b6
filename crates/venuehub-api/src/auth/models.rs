use crate::error::HttpAppError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;
use venuehub_core::models::{NotificationScope, UserRole};
use venuehub_core::AppError;

/// Authenticated caller, resolved from the session token and stored in
/// request extensions by the session middleware.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub tenant_id: Option<Uuid>,
}

impl SessionContext {
    pub fn is_super_admin(&self) -> bool {
        self.role == UserRole::SuperAdmin
    }

    pub fn require_super_admin(&self) -> Result<(), AppError> {
        if self.is_super_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Super admin access required".to_string(),
            ))
        }
    }

    /// Tenant the caller administers.
    pub fn require_tenant_admin(&self) -> Result<Uuid, AppError> {
        match (self.role, self.tenant_id) {
            (UserRole::TenantAdmin, Some(tenant_id)) => Ok(tenant_id),
            (UserRole::SuperAdmin, Some(tenant_id)) => Ok(tenant_id),
            _ => Err(AppError::Forbidden(
                "Tenant admin access required".to_string(),
            )),
        }
    }

    /// Either a super admin (no tenant restriction) or the admin of one tenant.
    pub fn admin_tenant_filter(&self) -> Result<Option<Uuid>, AppError> {
        if self.is_super_admin() {
            Ok(None)
        } else {
            self.require_tenant_admin().map(Some)
        }
    }

    /// Notifications visible to the caller: their own, plus their tenant's
    /// when they administer one.
    pub fn notification_scope(&self) -> NotificationScope {
        let tenant_id = if self.role.is_admin() {
            self.tenant_id
        } else {
            None
        };
        NotificationScope {
            user_id: self.user_id,
            tenant_id,
        }
    }
}

// Extract directly from request parts so handlers can take the context as an argument
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionContext>()
            .cloned()
            .ok_or_else(|| {
                HttpAppError(AppError::Unauthorized(
                    "Authentication required".to_string(),
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: UserRole, tenant_id: Option<Uuid>) -> SessionContext {
        SessionContext {
            user_id: Uuid::new_v4(),
            email: "someone@venuehub.test".to_string(),
            role,
            tenant_id,
        }
    }

    #[test]
    fn tenant_admin_guard() {
        let tenant = Uuid::new_v4();
        assert_eq!(
            ctx(UserRole::TenantAdmin, Some(tenant))
                .require_tenant_admin()
                .unwrap(),
            tenant
        );
        assert!(ctx(UserRole::Customer, Some(tenant))
            .require_tenant_admin()
            .is_err());
        assert!(ctx(UserRole::TenantAdmin, None)
            .require_tenant_admin()
            .is_err());
    }

    #[test]
    fn super_admin_filter_is_unrestricted() {
        assert_eq!(
            ctx(UserRole::SuperAdmin, None).admin_tenant_filter().unwrap(),
            None
        );
        assert!(ctx(UserRole::Customer, None).admin_tenant_filter().is_err());
    }

    #[test]
    fn customers_only_see_their_own_notifications() {
        let tenant = Uuid::new_v4();
        let customer = ctx(UserRole::Customer, Some(tenant));
        assert_eq!(customer.notification_scope().tenant_id, None);
        let admin = ctx(UserRole::TenantAdmin, Some(tenant));
        assert_eq!(admin.notification_scope().tenant_id, Some(tenant));
    }
}
