use super::rows::NotificationRow;
use super::Store;
use crate::error::{Error, Result};
use crate::notification::{NewNotification, Notification, NotificationKind};
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};
use uuid::Uuid;

impl Store {
    /// Append a notification to the user's inbox
    #[instrument(skip(self, notification), fields(kind = notification.kind.as_str()))]
    pub async fn create_notification(
        &self,
        user_id: Uuid,
        notification: &NewNotification,
        now: DateTime<Utc>,
    ) -> Result<Notification> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, kind, title, message, link, is_read, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)
            "#,
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(&notification.link)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!("Created notification {id} for {user_id}");
        Ok(Notification {
            id,
            user_id,
            kind: notification.kind,
            title: notification.title.clone(),
            message: notification.message.clone(),
            link: notification.link.clone(),
            is_read: false,
            created_at: now,
        })
    }

    /// Most recent notifications first
    #[instrument(skip(self))]
    pub async fn list_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
        limit: u32,
    ) -> Result<Vec<Notification>> {
        let rows: Vec<NotificationRow> = sqlx::query_as(
            r#"
            SELECT * FROM notifications
            WHERE user_id = ?1 AND (?2 = 0 OR is_read = 0)
            ORDER BY created_at DESC, id ASC
            LIMIT ?3
            "#,
        )
        .bind(user_id.to_string())
        .bind(unread_only)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Notification::try_from).collect()
    }

    /// Count unread notifications
    #[instrument(skip(self))]
    pub async fn unread_count(&self, user_id: Uuid) -> Result<u32> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ?1 AND is_read = 0",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        super::to_u32(count, "unread")
    }

    /// Mark one notification read. Someone else's notification is reported
    /// as not found.
    #[instrument(skip(self))]
    pub async fn mark_notification_read(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ?1 AND user_id = ?2")
                .bind(id.to_string())
                .bind(user_id.to_string())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotificationNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Mark everything read; returns how many changed
    #[instrument(skip(self))]
    pub async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = ?1 AND is_read = 0")
                .bind(user_id.to_string())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    /// Whether a notification of `kind` was sent at or after `since`
    #[instrument(skip(self))]
    pub async fn has_notification_since(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        since: DateTime<Utc>,
    ) -> Result<bool> {
        let exists: i64 = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM notifications
                WHERE user_id = ?1 AND kind = ?2 AND created_at >= ?3
            )
            "#,
        )
        .bind(user_id.to_string())
        .bind(kind.as_str())
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists != 0)
    }
}
