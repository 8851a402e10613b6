use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "policy_type", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum PolicyType {
    Terms,
    Privacy,
    Refund,
    Cancellation,
    Cookie,
}

/// Lookup scope for policy documents
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PolicyScope {
    #[default]
    Global,
    Tenant,
}

/// Versioned legal document. `tenant_id = None` marks a platform-wide document.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct PolicyDocument {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub policy_type: PolicyType,
    pub version: i32,
    pub title: String,
    pub content: String,
    pub is_active: bool,
    pub effective_from: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PolicyQuery {
    #[serde(default)]
    pub scope: PolicyScope,
    pub tenant_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub policy_type: Option<PolicyType>,
    #[serde(default)]
    pub active_only: bool,
}

/// Resolved tenant filter for a policy lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyFilter {
    GlobalOnly,
    TenantOnly(Uuid),
}

impl PolicyQuery {
    pub fn filter(&self) -> Result<PolicyFilter, AppError> {
        match self.scope {
            PolicyScope::Global => Ok(PolicyFilter::GlobalOnly),
            PolicyScope::Tenant => {
                self.tenant_id
                    .map(PolicyFilter::TenantOnly)
                    .ok_or_else(|| {
                        AppError::InvalidInput(
                            "tenantId is required when scope=tenant".to_string(),
                        )
                    })
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CurrentPolicyQuery {
    #[serde(rename = "type")]
    pub policy_type: PolicyType,
    pub tenant_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePolicyRequest {
    pub policy_type: PolicyType,
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    pub effective_from: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePolicyRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    pub is_active: Option<bool>,
    pub effective_from: Option<DateTime<Utc>>,
}

/// Acceptance of one policy version by one user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct UserConsent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub policy_id: Uuid,
    pub policy_type: PolicyType,
    pub policy_version: i32,
    pub tenant_id: Option<Uuid>,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub accepted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordConsentRequest {
    pub policy_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_scope_ignores_tenant_id() {
        let query = PolicyQuery {
            scope: PolicyScope::Global,
            tenant_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert_eq!(query.filter().unwrap(), PolicyFilter::GlobalOnly);
    }

    #[test]
    fn tenant_scope_requires_tenant_id() {
        let query = PolicyQuery {
            scope: PolicyScope::Tenant,
            ..Default::default()
        };
        assert!(query.filter().is_err());

        let tenant = Uuid::new_v4();
        let query = PolicyQuery {
            scope: PolicyScope::Tenant,
            tenant_id: Some(tenant),
            ..Default::default()
        };
        assert_eq!(query.filter().unwrap(), PolicyFilter::TenantOnly(tenant));
    }

    #[test]
    fn query_string_shape() {
        let query: PolicyQuery =
            serde_json::from_str(r#"{"scope":"tenant","type":"refund","activeOnly":true}"#)
                .unwrap();
        assert_eq!(query.scope, PolicyScope::Tenant);
        assert_eq!(query.policy_type, Some(PolicyType::Refund));
        assert!(query.active_only);
    }
}
