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
    sqlx(type_name = "notification_kind", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Booking,
    Review,
    Payment,
    System,
    Promotion,
}

/// Per-user or per-tenant message. Archiving also marks the record read.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub tenant_id: Option<Uuid>,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

/// Addressee of a notification: exactly one user or one tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    User(Uuid),
    Tenant(Uuid),
}

impl Recipient {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Recipient::User(id) => Some(*id),
            Recipient::Tenant(_) => None,
        }
    }

    pub fn tenant_id(&self) -> Option<Uuid> {
        match self {
            Recipient::Tenant(id) => Some(*id),
            Recipient::User(_) => None,
        }
    }
}

/// Notification to be stored
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub recipient: Recipient,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
}

/// Who is reading: the user plus, for tenant admins, their tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationScope {
    pub user_id: Uuid,
    pub tenant_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListResponse {
    pub notifications: Vec<Notification>,
    pub unread_count: i64,
    pub poll_interval_seconds: u64,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    pub user_id: Option<Uuid>,
    pub tenant_id: Option<Uuid>,
    pub kind: NotificationKind,
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 2000, message = "Message must be 1-2000 characters"))]
    pub message: String,
    #[validate(length(max = 2048))]
    pub link: Option<String>,
}

impl CreateNotificationRequest {
    pub fn recipient(&self) -> Result<Recipient, AppError> {
        match (self.user_id, self.tenant_id) {
            (Some(user), None) => Ok(Recipient::User(user)),
            (None, Some(tenant)) => Ok(Recipient::Tenant(tenant)),
            _ => Err(AppError::InvalidInput(
                "Exactly one of userId or tenantId is required".to_string(),
            )),
        }
    }

    pub fn into_new(self, recipient: Recipient) -> NewNotification {
        NewNotification {
            recipient,
            kind: self.kind,
            title: self.title,
            message: self.message,
            link: self.link,
        }
    }
}

/// Stored Web Push subscription
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PushSubscriptionKeys {
    #[validate(length(min = 1, max = 255))]
    pub p256dh: String,
    #[validate(length(min = 1, max = 255))]
    pub auth: String,
}

/// Browser `PushSubscription.toJSON()` shape
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SubscribePushRequest {
    #[validate(url(message = "Endpoint must be a URL"))]
    pub endpoint: String,
    #[validate(nested)]
    pub keys: PushSubscriptionKeys,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UnsubscribePushRequest {
    #[validate(length(min = 1, max = 2048, message = "Endpoint is required"))]
    pub endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PushAction {
    pub action: String,
    pub title: String,
}

/// Payload a service worker renders for a push message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    pub url: String,
    pub actions: Vec<PushAction>,
}

impl PushPayload {
    pub fn from_notification(notification: &Notification) -> Self {
        Self {
            title: notification.title.clone(),
            body: notification.message.clone(),
            url: notification
                .link
                .clone()
                .unwrap_or_else(|| "/notifications".to_string()),
            actions: vec![
                PushAction {
                    action: "open".to_string(),
                    title: "View".to_string(),
                },
                PushAction {
                    action: "dismiss".to_string(),
                    title: "Dismiss".to_string(),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(user: Option<Uuid>, tenant: Option<Uuid>) -> CreateNotificationRequest {
        CreateNotificationRequest {
            user_id: user,
            tenant_id: tenant,
            kind: NotificationKind::System,
            title: "Maintenance".to_string(),
            message: "Down at midnight".to_string(),
            link: None,
        }
    }

    #[test]
    fn recipient_must_be_single() {
        let user = Uuid::new_v4();
        assert_eq!(
            request(Some(user), None).recipient().unwrap(),
            Recipient::User(user)
        );
        assert!(request(None, None).recipient().is_err());
        assert!(request(Some(user), Some(Uuid::new_v4()))
            .recipient()
            .is_err());
    }

    #[test]
    fn push_payload_defaults_url() {
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: Some(Uuid::new_v4()),
            tenant_id: None,
            kind: NotificationKind::Booking,
            title: "Booking confirmed".to_string(),
            message: "See you Saturday".to_string(),
            link: None,
            is_read: false,
            is_archived: false,
            created_at: Utc::now(),
            read_at: None,
        };
        let payload = PushPayload::from_notification(&notification);
        assert_eq!(payload.url, "/notifications");
        assert_eq!(payload.body, "See you Saturday");
        assert_eq!(payload.actions.len(), 2);
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("title").is_some() && json.get("actions").is_some());
    }
}
