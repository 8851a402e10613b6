use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Security-relevant event kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    LoginSuccess,
    LoginFailure,
    Registration,
    RateLimitExceeded,
    CsrfFailure,
    PermissionDenied,
    TenantChange,
    PlanChange,
    PaymentConfigChange,
    ReviewModeration,
    UserChange,
}

impl AuditEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventType::LoginSuccess => "login_success",
            AuditEventType::LoginFailure => "login_failure",
            AuditEventType::Registration => "registration",
            AuditEventType::RateLimitExceeded => "rate_limit_exceeded",
            AuditEventType::CsrfFailure => "csrf_failure",
            AuditEventType::PermissionDenied => "permission_denied",
            AuditEventType::TenantChange => "tenant_change",
            AuditEventType::PlanChange => "plan_change",
            AuditEventType::PaymentConfigChange => "payment_config_change",
            AuditEventType::ReviewModeration => "review_moderation",
            AuditEventType::UserChange => "user_change",
        }
    }
}

impl std::fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit event before persistence
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub event_type: AuditEventType,
    pub actor_user_id: Option<Uuid>,
    pub tenant_id: Option<Uuid>,
    pub resource_type: Option<String>,
    pub resource_id: Option<Uuid>,
    pub ip_address: Option<String>,
    pub success: bool,
    pub details: serde_json::Value,
}

impl AuditEvent {
    pub fn new(event_type: AuditEventType, success: bool) -> Self {
        Self {
            event_type,
            actor_user_id: None,
            tenant_id: None,
            resource_type: None,
            resource_id: None,
            ip_address: None,
            success,
            details: serde_json::Value::Object(Default::default()),
        }
    }

    pub fn actor(mut self, user_id: Uuid) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    pub fn tenant(mut self, tenant_id: Option<Uuid>) -> Self {
        self.tenant_id = tenant_id;
        self
    }

    pub fn resource(mut self, resource_type: &str, resource_id: Uuid) -> Self {
        self.resource_type = Some(resource_type.to_string());
        self.resource_id = Some(resource_id);
        self
    }

    pub fn ip(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}

/// Persisted audit record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: Uuid,
    pub event_type: String,
    pub actor_user_id: Option<Uuid>,
    pub tenant_id: Option<Uuid>,
    pub resource_type: Option<String>,
    pub resource_id: Option<Uuid>,
    pub ip_address: Option<String>,
    pub success: bool,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AuditLogQuery {
    pub event_type: Option<String>,
    pub actor_user_id: Option<Uuid>,
    pub tenant_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_fields() {
        let actor = Uuid::new_v4();
        let resource = Uuid::new_v4();
        let event = AuditEvent::new(AuditEventType::PlanChange, true)
            .actor(actor)
            .resource("plan", resource)
            .ip("203.0.113.7")
            .details(serde_json::json!({ "action": "update" }));
        assert_eq!(event.actor_user_id, Some(actor));
        assert_eq!(event.resource_type.as_deref(), Some("plan"));
        assert_eq!(event.resource_id, Some(resource));
        assert_eq!(event.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(event.details["action"], "update");
    }

    #[test]
    fn event_type_wire_name_matches_as_str() {
        let json = serde_json::to_value(AuditEventType::RateLimitExceeded).unwrap();
        assert_eq!(json, AuditEventType::RateLimitExceeded.as_str());
    }
}
