//! Best-effort notification fan-out
//!
//! Notifications raised as a side effect of another operation (a booking, a
//! status change, a review) must never fail that operation, so errors are
//! logged and swallowed here.

use uuid::Uuid;
use venuehub_core::models::{
    NewNotification, Notification, NotificationKind, PushPayload, Recipient,
};
use venuehub_db::NotificationRepository;

#[derive(Clone)]
pub struct Notifier {
    repository: NotificationRepository,
}

impl Notifier {
    pub fn new(repository: NotificationRepository) -> Self {
        Self { repository }
    }

    /// Store a notification, returning it when the write succeeded.
    pub async fn send(&self, notification: NewNotification) -> Option<Notification> {
        match self.repository.create(&notification).await {
            Ok(stored) => {
                self.prepare_push(&stored).await;
                Some(stored)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    recipient = ?notification.recipient,
                    kind = ?notification.kind,
                    "Failed to store notification"
                );
                None
            }
        }
    }

    pub async fn to_user(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        link: Option<String>,
    ) -> Option<Notification> {
        self.send(NewNotification {
            recipient: Recipient::User(user_id),
            kind,
            title: title.into(),
            message: message.into(),
            link,
        })
        .await
    }

    pub async fn to_tenant(
        &self,
        tenant_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        link: Option<String>,
    ) -> Option<Notification> {
        self.send(NewNotification {
            recipient: Recipient::Tenant(tenant_id),
            kind,
            title: title.into(),
            message: message.into(),
            link,
        })
        .await
    }

    /// Build the push payload for each of the user's subscriptions. Clients
    /// poll for notifications; the payload is logged for the push worker.
    async fn prepare_push(&self, notification: &Notification) {
        let Some(user_id) = notification.user_id else {
            return;
        };
        let subscriptions = match self.repository.push_subscriptions(user_id).await {
            Ok(subscriptions) => subscriptions,
            Err(e) => {
                tracing::warn!(error = %e, user_id = %user_id, "Failed to load push subscriptions");
                return;
            }
        };
        if subscriptions.is_empty() {
            return;
        }

        let payload = PushPayload::from_notification(notification);
        for subscription in subscriptions {
            tracing::debug!(
                target: "push",
                notification_id = %notification.id,
                endpoint = %subscription.endpoint,
                title = %payload.title,
                url = %payload.url,
                "Push payload prepared"
            );
        }
    }
}
