//! Notification entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the notifications table.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationEntity {
    pub event: String,
    pub uniq_id: String,
    pub owner_id: Uuid,
    pub last_send_at: DateTime<Utc>,
    pub total_send: i64,
}
