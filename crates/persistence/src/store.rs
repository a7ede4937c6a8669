//! PostgreSQL implementation of the domain datastore ports.

use async_trait::async_trait;
use domain::models::{AppOwner, AppVersion, CatalogEntry, Device, DeviceSnapshot, StatEvent};
use domain::services::{CatalogStore, StatsStore, StoreError};
use sqlx::PgPool;

use crate::metrics::{record_pool_metrics, QueryTimer, Table};
use crate::repositories::{
    AppRepository, DeviceRepository, StatsRepository, StoreAppRepository,
};

/// Datastore backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    apps: AppRepository,
    devices: DeviceRepository,
    stats: StatsRepository,
    store_apps: StoreAppRepository,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            apps: AppRepository::new(pool.clone()),
            devices: DeviceRepository::new(pool.clone()),
            stats: StatsRepository::new(pool.clone()),
            store_apps: StoreAppRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl StatsStore for PgStore {
    async fn find_app_owner(&self, app_id: &str) -> Result<Option<AppOwner>, StoreError> {
        Ok(self.apps.find_owner(app_id).await?.map(Into::into))
    }

    async fn register_onprem_app(&self, app_id: &str) -> Result<(), StoreError> {
        Ok(self.store_apps.upsert_onprem_placeholder(app_id).await?)
    }

    async fn increment_onprem_updates(&self, app_id: &str, updates: i64) -> Result<(), StoreError> {
        let affected = self.store_apps.increment_updates(app_id, updates).await?;
        if affected == 0 {
            tracing::debug!(app_id = %app_id, "No store app row to count updates against");
        }
        Ok(())
    }

    async fn find_app_version(
        &self,
        app_id: &str,
        version_name: &str,
    ) -> Result<Option<AppVersion>, StoreError> {
        Ok(self
            .apps
            .find_version_by_name(app_id, version_name)
            .await?
            .map(Into::into))
    }

    async fn find_device(
        &self,
        app_id: &str,
        device_id: &str,
    ) -> Result<Option<DeviceSnapshot>, StoreError> {
        Ok(self
            .devices
            .find_by_app_and_device(app_id, device_id)
            .await?
            .map(Into::into))
    }

    async fn upsert_device(&self, device: &Device) -> Result<(), StoreError> {
        self.devices.upsert(device).await?;
        Ok(())
    }

    async fn insert_events(&self, events: &[StatEvent]) -> Result<(), StoreError> {
        self.stats.insert_batch(events).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let timer = QueryTimer::new(Table::None, "ping");
        let result = sqlx::query("SELECT 1").execute(&self.pool).await;
        record_pool_metrics(&self.pool);
        timer.finish(result)?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn upsert_store_apps(&self, entries: &[CatalogEntry]) -> Result<u64, StoreError> {
        Ok(self.store_apps.upsert_catalog_batch(entries).await?)
    }
}
