//! Device repository for database operations.

use chrono::Utc;
use domain::models::Device;
use sqlx::PgPool;

use crate::entities::DeviceEntity;
use crate::metrics::{record_rows_written, QueryTimer, Table};

/// Repository for device database operations.
#[derive(Clone)]
pub struct DeviceRepository {
    pool: PgPool,
}

impl DeviceRepository {
    /// Creates a new DeviceRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a device by its app and device identifiers.
    pub async fn find_by_app_and_device(
        &self,
        app_id: &str,
        device_id: &str,
    ) -> Result<Option<DeviceEntity>, sqlx::Error> {
        let timer = QueryTimer::new(Table::Devices, "find_by_app_and_device");

        let result = sqlx::query_as::<_, DeviceEntity>(
            r#"
            SELECT app_id, device_id, platform, plugin_version, os_version, version,
                   is_emulator, is_prod, custom_id, created_at, updated_at
            FROM devices
            WHERE app_id = $1 AND device_id = $2
            "#,
        )
        .bind(app_id)
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await;

        timer.finish(result)
    }

    /// Upsert a device keyed by `(app_id, device_id)`.
    ///
    /// Callers pass resolved devices; an unresolved version would be
    /// written as NULL.
    pub async fn upsert(&self, device: &Device) -> Result<DeviceEntity, sqlx::Error> {
        let timer = QueryTimer::new(Table::Devices, "upsert");
        let now = Utc::now();

        let result = sqlx::query_as::<_, DeviceEntity>(
            r#"
            INSERT INTO devices (
                app_id, device_id, platform, plugin_version, os_version, version,
                is_emulator, is_prod, custom_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            ON CONFLICT (app_id, device_id) DO UPDATE SET
                platform = EXCLUDED.platform,
                plugin_version = EXCLUDED.plugin_version,
                os_version = EXCLUDED.os_version,
                version = EXCLUDED.version,
                is_emulator = EXCLUDED.is_emulator,
                is_prod = EXCLUDED.is_prod,
                custom_id = COALESCE(EXCLUDED.custom_id, devices.custom_id),
                updated_at = EXCLUDED.updated_at
            RETURNING app_id, device_id, platform, plugin_version, os_version, version,
                      is_emulator, is_prod, custom_id, created_at, updated_at
            "#,
        )
        .bind(&device.app_id)
        .bind(&device.device_id)
        .bind(&device.platform)
        .bind(&device.plugin_version)
        .bind(&device.os_version)
        .bind(device.version.id())
        .bind(device.is_emulator)
        .bind(device.is_prod)
        .bind(&device.custom_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await;

        let device = timer.finish(result)?;
        record_rows_written(Table::Devices, 1);
        Ok(device)
    }
}
