use async_trait::async_trait;
use despacho_domain::entities::{NewNotification, Notification};
use despacho_domain::repositories::NotificationRepository;
use despacho_domain::value_objects::NotificationPayload;
use despacho_errors::DispatchResult;
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

/// Mailbox store: the UNIQUE(professional_id) constraint plus the upsert
/// keeps exactly one live row per professional.
pub struct SqliteNotificationRepository {
    pool: SqlitePool,
}

const NOTIFICATION_COLUMNS: &str =
    "id, professional_id, kind, message, payload, is_read, created_at";

impl SqliteNotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_notification(row: &sqlx::sqlite::SqliteRow) -> DispatchResult<Notification> {
        let payload_json: String = row.try_get("payload")?;
        let payload: NotificationPayload = serde_json::from_str(&payload_json)?;

        Ok(Notification {
            id: row.try_get("id")?,
            professional_id: row.try_get("professional_id")?,
            kind: row.try_get("kind")?,
            message: row.try_get("message")?,
            payload,
            read: row.try_get("is_read")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl NotificationRepository for SqliteNotificationRepository {
    #[instrument(skip(self, notification), fields(
        professional_id = %notification.professional_id,
        kind = %notification.kind.as_str(),
    ))]
    async fn upsert(&self, notification: &NewNotification) -> DispatchResult<Notification> {
        let payload_json = serde_json::to_string(&notification.payload)?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO notifications (professional_id, kind, message, payload, is_read, created_at)
            VALUES ($1, $2, $3, $4, 0, datetime('now'))
            ON CONFLICT(professional_id) DO UPDATE SET
                kind = excluded.kind,
                message = excluded.message,
                payload = excluded.payload,
                is_read = 0,
                created_at = excluded.created_at
            RETURNING {NOTIFICATION_COLUMNS}
            "#,
        ))
        .bind(&notification.professional_id)
        .bind(notification.kind)
        .bind(&notification.message)
        .bind(payload_json)
        .fetch_one(&self.pool)
        .await?;

        let stored = Self::row_to_notification(&row)?;
        debug!("notification stored");
        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn drain(&self, professional_id: &str) -> DispatchResult<Option<Notification>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE notifications SET is_read = 1
            WHERE professional_id = $1 AND is_read = 0
            RETURNING {NOTIFICATION_COLUMNS}
            "#,
        ))
        .bind(professional_id)
        .fetch_optional(&self.pool)
        .await?;

        // RETURNING reflects the post-update row, already marked read.
        row.as_ref().map(Self::row_to_notification).transpose()
    }

    async fn ack(&self, professional_id: &str) -> DispatchResult<bool> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE professional_id = $1 AND is_read = 0")
                .bind(professional_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_pending(&self, professional_id: &str) -> DispatchResult<Option<Notification>> {
        let row = sqlx::query(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications
             WHERE professional_id = $1 AND is_read = 0",
        ))
        .bind(professional_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_notification).transpose()
    }
}
