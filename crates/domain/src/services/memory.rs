//! In-memory datastore for development and testing.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use crate::models::{
    AppOwner, AppVersion, CatalogEntry, Device, DeviceSnapshot, DeviceVersion, StatEvent,
};
use crate::services::store::{CatalogStore, StatsStore, StoreError};

/// A call received by [`InMemoryStore`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    FindAppOwner(String),
    RegisterOnpremApp(String),
    IncrementOnpremUpdates(String, i64),
    FindAppVersion(String, String),
    FindDevice(String, String),
    UpsertDevice(String),
    InsertEvents(usize),
    UpsertStoreApps(usize),
}

impl StoreCall {
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            StoreCall::RegisterOnpremApp(_)
                | StoreCall::IncrementOnpremUpdates(_, _)
                | StoreCall::UpsertDevice(_)
                | StoreCall::InsertEvents(_)
                | StoreCall::UpsertStoreApps(_)
        )
    }
}

#[derive(Debug, Default)]
struct State {
    apps: HashMap<String, AppOwner>,
    versions: HashMap<(String, String), AppVersion>,
    devices: HashMap<(String, String), Device>,
    events: Vec<StatEvent>,
    store_apps: HashMap<String, CatalogEntry>,
    onprem_updates: HashMap<String, i64>,
    calls: Vec<StoreCall>,
}

/// Datastore keeping every table in memory and logging each call.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    fail_reads: bool,
    fail_writes: bool,
    fail_on: Option<fn(&StoreCall) -> bool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose lookups fail.
    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    /// Store whose writes fail.
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Fail only the calls matching `predicate`.
    pub fn failing_on(mut self, predicate: fn(&StoreCall) -> bool) -> Self {
        self.fail_on = Some(predicate);
        self
    }

    /// Register an app owned by `user_id`.
    pub fn with_app(self, app_id: &str, user_id: Uuid) -> Self {
        self.state().apps.insert(
            app_id.to_string(),
            AppOwner {
                app_id: app_id.to_string(),
                user_id,
            },
        );
        self
    }

    /// Register version `name` of an app with id `id`.
    pub fn with_version(self, app_id: &str, name: &str, id: i64, user_id: Uuid) -> Self {
        self.state().versions.insert(
            (app_id.to_string(), name.to_string()),
            AppVersion { id, user_id },
        );
        self
    }

    /// Seed a device currently on version `version`.
    pub fn with_device(self, app_id: &str, device_id: &str, version: i64) -> Self {
        self.state().devices.insert(
            (app_id.to_string(), device_id.to_string()),
            Device {
                platform: "ios".to_string(),
                device_id: device_id.to_string(),
                app_id: app_id.to_string(),
                plugin_version: crate::models::DEFAULT_PLUGIN_VERSION.to_string(),
                os_version: "17.0".to_string(),
                version: DeviceVersion::Resolved(version),
                is_emulator: false,
                is_prod: true,
                custom_id: None,
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.state().calls.clone()
    }

    pub fn device(&self, app_id: &str, device_id: &str) -> Option<Device> {
        self.state()
            .devices
            .get(&(app_id.to_string(), device_id.to_string()))
            .cloned()
    }

    pub fn events(&self) -> Vec<StatEvent> {
        self.state().events.clone()
    }

    pub fn store_apps(&self) -> HashMap<String, CatalogEntry> {
        self.state().store_apps.clone()
    }

    /// Usage counter of a self-hosted app, if it was registered.
    pub fn onprem_updates(&self, app_id: &str) -> Option<i64> {
        self.state().onprem_updates.get(app_id).copied()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: StoreCall) -> Result<MutexGuard<'_, State>, StoreError> {
        let failing_kind = if call.is_write() {
            self.fail_writes
        } else {
            self.fail_reads
        };
        let failing = failing_kind || self.fail_on.is_some_and(|predicate| predicate(&call));
        let mut state = self.state();
        state.calls.push(call);
        if failing {
            return Err(StoreError::Unavailable("in-memory store failure".to_string()));
        }
        Ok(state)
    }
}

#[async_trait::async_trait]
impl StatsStore for InMemoryStore {
    async fn find_app_owner(&self, app_id: &str) -> Result<Option<AppOwner>, StoreError> {
        let state = self.record(StoreCall::FindAppOwner(app_id.to_string()))?;
        Ok(state.apps.get(app_id).cloned())
    }

    async fn register_onprem_app(&self, app_id: &str) -> Result<(), StoreError> {
        let mut state = self.record(StoreCall::RegisterOnpremApp(app_id.to_string()))?;
        state.onprem_updates.entry(app_id.to_string()).or_insert(0);
        Ok(())
    }

    async fn increment_onprem_updates(&self, app_id: &str, updates: i64) -> Result<(), StoreError> {
        let mut state =
            self.record(StoreCall::IncrementOnpremUpdates(app_id.to_string(), updates))?;
        *state.onprem_updates.entry(app_id.to_string()).or_insert(0) += updates;
        Ok(())
    }

    async fn find_app_version(
        &self,
        app_id: &str,
        version_name: &str,
    ) -> Result<Option<AppVersion>, StoreError> {
        let state = self.record(StoreCall::FindAppVersion(
            app_id.to_string(),
            version_name.to_string(),
        ))?;
        Ok(state
            .versions
            .get(&(app_id.to_string(), version_name.to_string()))
            .cloned())
    }

    async fn find_device(
        &self,
        app_id: &str,
        device_id: &str,
    ) -> Result<Option<DeviceSnapshot>, StoreError> {
        let state = self.record(StoreCall::FindDevice(
            app_id.to_string(),
            device_id.to_string(),
        ))?;
        Ok(state
            .devices
            .get(&(app_id.to_string(), device_id.to_string()))
            .map(|device| DeviceSnapshot {
                version: device.version.id(),
            }))
    }

    async fn upsert_device(&self, device: &Device) -> Result<(), StoreError> {
        let mut state = self.record(StoreCall::UpsertDevice(device.device_id.clone()))?;
        state.devices.insert(
            (device.app_id.clone(), device.device_id.clone()),
            device.clone(),
        );
        Ok(())
    }

    async fn insert_events(&self, events: &[StatEvent]) -> Result<(), StoreError> {
        let mut state = self.record(StoreCall::InsertEvents(events.len()))?;
        state.events.extend_from_slice(events);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.fail_reads {
            return Err(StoreError::Unavailable("in-memory store failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryStore {
    async fn upsert_store_apps(&self, entries: &[CatalogEntry]) -> Result<u64, StoreError> {
        let mut state = self.record(StoreCall::UpsertStoreApps(entries.len()))?;
        for entry in entries {
            state
                .store_apps
                .insert(entry.app_id.clone(), entry.clone());
        }
        Ok(entries.len() as u64)
    }
}
