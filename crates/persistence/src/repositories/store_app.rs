//! Store app repository for database operations.

use chrono::Utc;
use domain::models::CatalogEntry;
use sqlx::PgPool;

use crate::metrics::{record_rows_written, QueryTimer, Table};

/// Repository for the store_apps table.
#[derive(Clone)]
pub struct StoreAppRepository {
    pool: PgPool,
}

impl StoreAppRepository {
    /// Creates a new StoreAppRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upsert catalog entries keyed by app id, within a transaction.
    ///
    /// Self-hosted flags and the update counter are left untouched.
    pub async fn upsert_catalog_batch(&self, entries: &[CatalogEntry]) -> Result<u64, sqlx::Error> {
        if entries.is_empty() {
            return Ok(0);
        }

        let timer = QueryTimer::new(Table::StoreApps, "upsert_catalog_batch");
        let written = timer.finish(self.upsert_in_transaction(entries).await)?;
        record_rows_written(Table::StoreApps, written);
        Ok(written)
    }

    async fn upsert_in_transaction(&self, entries: &[CatalogEntry]) -> Result<u64, sqlx::Error> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut written = 0u64;

        for entry in entries {
            let result = sqlx::query(
                r#"
                INSERT INTO store_apps (
                    app_id, url, title, summary, developer, developer_email, icon,
                    score, free, category, collection, rank, installs, created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $14)
                ON CONFLICT (app_id) DO UPDATE SET
                    url = EXCLUDED.url,
                    title = EXCLUDED.title,
                    summary = EXCLUDED.summary,
                    developer = EXCLUDED.developer,
                    developer_email = EXCLUDED.developer_email,
                    icon = EXCLUDED.icon,
                    score = EXCLUDED.score,
                    free = EXCLUDED.free,
                    category = EXCLUDED.category,
                    collection = EXCLUDED.collection,
                    rank = EXCLUDED.rank,
                    installs = EXCLUDED.installs,
                    updated_at = EXCLUDED.updated_at
                "#,
            )
            .bind(&entry.app_id)
            .bind(&entry.url)
            .bind(&entry.title)
            .bind(&entry.summary)
            .bind(&entry.developer)
            .bind(&entry.developer_email)
            .bind(&entry.icon)
            .bind(entry.score)
            .bind(entry.free)
            .bind(&entry.category)
            .bind(&entry.collection)
            .bind(entry.rank)
            .bind(entry.installs)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            written += result.rows_affected();
        }

        tx.commit().await?;
        Ok(written)
    }

    /// Mark an app as a self-hosted Capacitor app.
    pub async fn upsert_onprem_placeholder(&self, app_id: &str) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new(Table::StoreApps, "upsert_onprem_placeholder");

        let result = sqlx::query(
            r#"
            INSERT INTO store_apps (app_id, onprem, capacitor, capgo)
            VALUES ($1, true, true, true)
            ON CONFLICT (app_id) DO UPDATE SET
                onprem = true,
                capacitor = true,
                capgo = true,
                updated_at = NOW()
            "#,
        )
        .bind(app_id)
        .execute(&self.pool)
        .await;

        let result = timer.finish(result)?;
        record_rows_written(Table::StoreApps, result.rows_affected());
        Ok(())
    }

    /// Add to the update counter of a store app.
    pub async fn increment_updates(&self, app_id: &str, updates: i64) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new(Table::StoreApps, "increment_updates");

        let result = sqlx::query(
            r#"
            UPDATE store_apps
            SET updates = updates + $2, updated_at = NOW()
            WHERE app_id = $1
            "#,
        )
        .bind(app_id)
        .bind(updates)
        .execute(&self.pool)
        .await;

        let updated = timer.finish(result)?.rows_affected();
        record_rows_written(Table::StoreApps, updated);
        Ok(updated)
    }
}
