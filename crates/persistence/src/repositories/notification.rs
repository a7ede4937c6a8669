//! Notification repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::NotificationEntity;
use crate::metrics::{record_rows_written, QueryTimer, Table};

/// Repository for notification delivery records.
#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Creates a new NotificationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Claim the delivery of `event` to `uniq_id` for the window opening at
    /// `window_start`.
    ///
    /// Inserts the record, or bumps it when the last send predates the
    /// window. Returns `None` when it was already sent in this window. The
    /// row lock taken by the upsert serializes concurrent claims.
    pub async fn claim(
        &self,
        event: &str,
        uniq_id: &str,
        owner_id: Uuid,
        window_start: DateTime<Utc>,
    ) -> Result<Option<NotificationEntity>, sqlx::Error> {
        let timer = QueryTimer::new(Table::Notifications, "claim");

        let result = sqlx::query_as::<_, NotificationEntity>(
            r#"
            INSERT INTO notifications (event, uniq_id, owner_id, last_send_at, total_send)
            VALUES ($1, $2, $3, NOW(), 1)
            ON CONFLICT (event, uniq_id) DO UPDATE SET
                owner_id = EXCLUDED.owner_id,
                last_send_at = EXCLUDED.last_send_at,
                total_send = notifications.total_send + 1
            WHERE notifications.last_send_at < $4
            RETURNING event, uniq_id, owner_id, last_send_at, total_send
            "#,
        )
        .bind(event)
        .bind(uniq_id)
        .bind(owner_id)
        .bind(window_start)
        .fetch_optional(&self.pool)
        .await;

        let claimed = timer.finish(result)?;
        if claimed.is_some() {
            record_rows_written(Table::Notifications, 1);
        }
        Ok(claimed)
    }

    /// Undo a claim made at `claimed_at` so the window is open again.
    ///
    /// A no-op when another claim has replaced it since.
    pub async fn release(
        &self,
        event: &str,
        uniq_id: &str,
        claimed_at: DateTime<Utc>,
        window_start: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new(Table::Notifications, "release");

        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET last_send_at = $4 - INTERVAL '1 second',
                total_send = GREATEST(total_send - 1, 0)
            WHERE event = $1 AND uniq_id = $2 AND last_send_at = $3
            "#,
        )
        .bind(event)
        .bind(uniq_id)
        .bind(claimed_at)
        .bind(window_start)
        .execute(&self.pool)
        .await;

        let released = timer.finish(result)?.rows_affected();
        record_rows_written(Table::Notifications, released);
        Ok(released > 0)
    }
}
