//! Device entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the devices table.
#[derive(Debug, Clone, FromRow)]
pub struct DeviceEntity {
    pub app_id: String,
    pub device_id: String,
    pub platform: String,
    pub plugin_version: String,
    pub os_version: String,
    pub version: Option<i64>,
    pub is_emulator: bool,
    pub is_prod: bool,
    pub custom_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DeviceEntity> for domain::models::DeviceSnapshot {
    fn from(entity: DeviceEntity) -> Self {
        Self {
            version: entity.version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_device_entity() -> DeviceEntity {
        DeviceEntity {
            app_id: "com.example.app".to_string(),
            device_id: "6aa6b1a8-0d9e-4c5f-8f3b-2a1e7c9d0b11".to_string(),
            platform: "android".to_string(),
            plugin_version: "5.2.0".to_string(),
            os_version: "14".to_string(),
            version: Some(7),
            is_emulator: false,
            is_prod: true,
            custom_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_device_entity_to_snapshot() {
        let snapshot: domain::models::DeviceSnapshot = create_test_device_entity().into();
        assert_eq!(snapshot.version, Some(7));
    }

    #[test]
    fn test_device_entity_without_version() {
        let mut entity = create_test_device_entity();
        entity.version = None;
        let snapshot: domain::models::DeviceSnapshot = entity.into();
        assert!(snapshot.version.is_none());
    }
}
