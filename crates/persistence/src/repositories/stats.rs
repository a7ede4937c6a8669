//! Stats repository for database operations.

use domain::models::StatEvent;
use sqlx::PgPool;

use crate::metrics::{record_rows_written, QueryTimer, Table};

/// Repository for the append-only stats table.
#[derive(Clone)]
pub struct StatsRepository {
    pool: PgPool,
}

impl StatsRepository {
    /// Creates a new StatsRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert stat events in a single transaction.
    pub async fn insert_batch(&self, events: &[StatEvent]) -> Result<usize, sqlx::Error> {
        if events.is_empty() {
            return Ok(0);
        }

        let timer = QueryTimer::new(Table::Stats, "insert_batch");
        let inserted = timer.finish(self.insert_in_transaction(events).await)?;
        record_rows_written(Table::Stats, inserted);
        Ok(inserted as usize)
    }

    async fn insert_in_transaction(&self, events: &[StatEvent]) -> Result<u64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0u64;

        for event in events {
            let result = sqlx::query(
                r#"
                INSERT INTO stats (platform, device_id, action, app_id, version_build, version)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(&event.platform)
            .bind(&event.device_id)
            .bind(&event.action)
            .bind(&event.app_id)
            .bind(&event.version_build)
            .bind(event.version)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }
}
