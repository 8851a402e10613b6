use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_slug;
use crate::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "subscription_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Trialing,
    Active,
    PastDue,
    Cancelled,
}

/// Member role inside an organization
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "org_role", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum OrgRole {
    Owner,
    Admin,
    Billing,
    Member,
}

impl OrgRole {
    pub fn can_manage_members(&self) -> bool {
        matches!(self, OrgRole::Owner | OrgRole::Admin)
    }

    pub fn can_view_billing(&self) -> bool {
        matches!(self, OrgRole::Owner | OrgRole::Admin | OrgRole::Billing)
    }
}

/// B2B account grouping users for enterprise billing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub owner_user_id: Uuid,
    pub billing_email: String,
    pub plan_id: Option<Uuid>,
    pub subscription_status: SubscriptionStatus,
    pub seat_limit: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct OrganizationMember {
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub role: OrgRole,
    pub email: String,
    pub name: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationDetail {
    #[serde(flatten)]
    pub organization: Organization,
    pub members: Vec<OrganizationMember>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,
    #[validate(email(message = "Billing email must be valid"))]
    pub billing_email: String,
    pub plan_id: Option<Uuid>,
    #[validate(range(min = 1, max = 10000))]
    #[serde(default = "default_seat_limit")]
    pub seat_limit: i32,
}

fn default_seat_limit() -> i32 {
    10
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizationRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(email)]
    pub billing_email: Option<String>,
    pub plan_id: Option<Uuid>,
    pub subscription_status: Option<SubscriptionStatus>,
    #[validate(range(min = 1, max = 10000))]
    pub seat_limit: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    #[validate(email(message = "Member email must be valid"))]
    pub email: String,
    pub role: OrgRole,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRequest {
    pub role: OrgRole,
}

/// Roles other than the single owner are assignable; the owner seat is fixed.
pub fn ensure_assignable_role(role: OrgRole) -> Result<(), AppError> {
    if role == OrgRole::Owner {
        return Err(AppError::BadRequest(
            "Ownership cannot be assigned through membership changes".to_string(),
        ));
    }
    Ok(())
}

pub fn ensure_seat_available(current_members: i64, seat_limit: i32) -> Result<(), AppError> {
    if current_members >= i64::from(seat_limit) {
        return Err(AppError::BadRequest(format!(
            "Organization seat limit of {} reached",
            seat_limit
        )));
    }
    Ok(())
}

/// A seat limit may not drop below the seats already taken.
pub fn ensure_seat_limit_covers(current_members: i64, seat_limit: i32) -> Result<(), AppError> {
    if i64::from(seat_limit) < current_members {
        return Err(AppError::BadRequest(format!(
            "Seat limit {} is below the {} current members",
            seat_limit, current_members
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_permissions() {
        assert!(OrgRole::Owner.can_manage_members());
        assert!(OrgRole::Admin.can_manage_members());
        assert!(!OrgRole::Billing.can_manage_members());
        assert!(OrgRole::Billing.can_view_billing());
        assert!(!OrgRole::Member.can_view_billing());
    }

    #[test]
    fn owner_role_not_assignable() {
        assert!(ensure_assignable_role(OrgRole::Owner).is_err());
        assert!(ensure_assignable_role(OrgRole::Member).is_ok());
    }

    #[test]
    fn seat_limit_enforced() {
        assert!(ensure_seat_available(4, 5).is_ok());
        assert!(ensure_seat_available(5, 5).is_err());
        assert!(ensure_seat_limit_covers(3, 3).is_ok());
        assert!(ensure_seat_limit_covers(4, 3).is_err());
    }
}
