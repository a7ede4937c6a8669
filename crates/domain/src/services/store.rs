//! Datastore ports.
//!
//! The ingestion and refresh services only talk to storage through these
//! traits. The PostgreSQL implementation lives in the persistence crate and
//! an in-memory one in [`crate::services::memory`].

use thiserror::Error;

use crate::models::{AppOwner, AppVersion, CatalogEntry, Device, DeviceSnapshot, StatEvent};

/// Errors returned by datastore implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Storage used by stats ingestion.
#[async_trait::async_trait]
pub trait StatsStore: Send + Sync {
    /// Find the owner of a registered app.
    async fn find_app_owner(&self, app_id: &str) -> Result<Option<AppOwner>, StoreError>;

    /// Register an unknown app as a self-hosted store app.
    async fn register_onprem_app(&self, app_id: &str) -> Result<(), StoreError>;

    /// Add `updates` to the usage counter of a self-hosted app.
    async fn increment_onprem_updates(&self, app_id: &str, updates: i64) -> Result<(), StoreError>;

    /// Find a version of an app by its name.
    async fn find_app_version(
        &self,
        app_id: &str,
        version_name: &str,
    ) -> Result<Option<AppVersion>, StoreError>;

    /// Find the stored state of a device.
    async fn find_device(
        &self,
        app_id: &str,
        device_id: &str,
    ) -> Result<Option<DeviceSnapshot>, StoreError>;

    /// Insert or update a device keyed by `(app_id, device_id)`.
    async fn upsert_device(&self, device: &Device) -> Result<(), StoreError>;

    /// Append stat events.
    async fn insert_events(&self, events: &[StatEvent]) -> Result<(), StoreError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Storage used by catalog refresh.
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Insert or update store apps keyed by app id. Returns the number of rows written.
    async fn upsert_store_apps(&self, entries: &[CatalogEntry]) -> Result<u64, StoreError>;
}
