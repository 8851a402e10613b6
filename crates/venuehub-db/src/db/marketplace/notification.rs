use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use venuehub_core::models::{
    NewNotification, Notification, NotificationScope, PushSubscription, SubscribePushRequest,
};
use venuehub_core::AppError;

const MAX_LIST_LIMIT: i64 = 100;

/// Notifications plus the Web Push subscriptions used to deliver them.
#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, notification), fields(db.table = "notifications", db.operation = "insert"))]
    pub async fn create(&self, notification: &NewNotification) -> Result<Notification, AppError> {
        let created = sqlx::query_as::<Postgres, Notification>(
            r#"
            INSERT INTO notifications (user_id, tenant_id, kind, title, message, link)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(notification.recipient.user_id())
        .bind(notification.recipient.tenant_id())
        .bind(notification.kind)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(&notification.link)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(notification_id = %created.id, "Notification stored");
        Ok(created)
    }

    /// Newest first, archived entries excluded.
    #[tracing::instrument(skip(self), fields(db.table = "notifications", db.operation = "select"))]
    pub async fn list(
        &self,
        scope: NotificationScope,
        unread_only: bool,
        limit: Option<i64>,
    ) -> Result<Vec<Notification>, AppError> {
        let limit = limit.unwrap_or(50).clamp(1, MAX_LIST_LIMIT);
        let notifications = sqlx::query_as::<Postgres, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE NOT is_archived
              AND (user_id = $1 OR ($2::uuid IS NOT NULL AND tenant_id = $2))
              AND (NOT $3 OR NOT is_read)
            ORDER BY created_at DESC
            LIMIT $4
            "#,
        )
        .bind(scope.user_id)
        .bind(scope.tenant_id)
        .bind(unread_only)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }

    #[tracing::instrument(skip(self), fields(db.table = "notifications", db.operation = "select"))]
    pub async fn unread_count(&self, scope: NotificationScope) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<Postgres, i64>(
            r#"
            SELECT COUNT(*) FROM notifications
            WHERE NOT is_read AND NOT is_archived
              AND (user_id = $1 OR ($2::uuid IS NOT NULL AND tenant_id = $2))
            "#,
        )
        .bind(scope.user_id)
        .bind(scope.tenant_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Returns `None` when the notification is not visible in `scope`.
    #[tracing::instrument(skip(self), fields(db.table = "notifications", db.operation = "update"))]
    pub async fn mark_read(
        &self,
        scope: NotificationScope,
        id: Uuid,
    ) -> Result<Option<Notification>, AppError> {
        let notification = sqlx::query_as::<Postgres, Notification>(
            r#"
            UPDATE notifications
            SET is_read = TRUE, read_at = COALESCE(read_at, NOW())
            WHERE id = $1
              AND (user_id = $2 OR ($3::uuid IS NOT NULL AND tenant_id = $3))
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(scope.user_id)
        .bind(scope.tenant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(notification)
    }

    #[tracing::instrument(skip(self), fields(db.table = "notifications", db.operation = "update"))]
    pub async fn mark_all_read(&self, scope: NotificationScope) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = TRUE, read_at = NOW()
            WHERE NOT is_read
              AND (user_id = $1 OR ($2::uuid IS NOT NULL AND tenant_id = $2))
            "#,
        )
        .bind(scope.user_id)
        .bind(scope.tenant_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self), fields(db.table = "notifications", db.operation = "update"))]
    pub async fn archive(&self, scope: NotificationScope, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET is_archived = TRUE, is_read = TRUE, read_at = COALESCE(read_at, NOW())
            WHERE id = $1
              AND (user_id = $2 OR ($3::uuid IS NOT NULL AND tenant_id = $3))
            "#,
        )
        .bind(id)
        .bind(scope.user_id)
        .bind(scope.tenant_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Register a browser endpoint. Re-subscribing moves the endpoint to the
    /// calling user and refreshes its keys.
    #[tracing::instrument(skip(self, request), fields(db.table = "push_subscriptions", db.operation = "upsert"))]
    pub async fn subscribe(
        &self,
        user_id: Uuid,
        request: &SubscribePushRequest,
    ) -> Result<PushSubscription, AppError> {
        let subscription = sqlx::query_as::<Postgres, PushSubscription>(
            r#"
            INSERT INTO push_subscriptions (user_id, endpoint, p256dh, auth)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (endpoint) DO UPDATE
            SET user_id = EXCLUDED.user_id, p256dh = EXCLUDED.p256dh, auth = EXCLUDED.auth
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&request.endpoint)
        .bind(&request.keys.p256dh)
        .bind(&request.keys.auth)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id = %user_id, subscription_id = %subscription.id, "Push subscription saved");
        Ok(subscription)
    }

    #[tracing::instrument(skip(self, endpoint), fields(db.table = "push_subscriptions", db.operation = "delete"))]
    pub async fn unsubscribe(&self, user_id: Uuid, endpoint: &str) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM push_subscriptions WHERE user_id = $1 AND endpoint = $2")
                .bind(user_id)
                .bind(endpoint)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "push_subscriptions", db.operation = "select"))]
    pub async fn push_subscriptions(&self, user_id: Uuid) -> Result<Vec<PushSubscription>, AppError> {
        let subscriptions = sqlx::query_as::<Postgres, PushSubscription>(
            "SELECT * FROM push_subscriptions WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(subscriptions)
    }
}
