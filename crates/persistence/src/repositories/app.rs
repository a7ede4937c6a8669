//! App repository for database operations.

use sqlx::PgPool;

use crate::entities::{AppOwnerEntity, AppVersionEntity};
use crate::metrics::{QueryTimer, Table};

/// Repository for app and app version lookups.
#[derive(Clone)]
pub struct AppRepository {
    pool: PgPool,
}

impl AppRepository {
    /// Creates a new AppRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the owner of a registered app.
    pub async fn find_owner(&self, app_id: &str) -> Result<Option<AppOwnerEntity>, sqlx::Error> {
        let timer = QueryTimer::new(Table::Apps, "find_owner");

        let result = sqlx::query_as::<_, AppOwnerEntity>(
            r#"
            SELECT app_id, user_id
            FROM apps
            WHERE app_id = $1
            "#,
        )
        .bind(app_id)
        .fetch_optional(&self.pool)
        .await;

        timer.finish(result)
    }

    /// Find a version of an app by its name.
    pub async fn find_version_by_name(
        &self,
        app_id: &str,
        name: &str,
    ) -> Result<Option<AppVersionEntity>, sqlx::Error> {
        let timer = QueryTimer::new(Table::AppVersions, "find_by_name");

        let result = sqlx::query_as::<_, AppVersionEntity>(
            r#"
            SELECT id, user_id
            FROM app_versions
            WHERE app_id = $1 AND name = $2
            "#,
        )
        .bind(app_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await;

        timer.finish(result)
    }
}
