//! App and app version entities (database row mappings).

use sqlx::FromRow;
use uuid::Uuid;

/// Owner columns of the apps table.
#[derive(Debug, Clone, FromRow)]
pub struct AppOwnerEntity {
    pub app_id: String,
    pub user_id: Uuid,
}

impl From<AppOwnerEntity> for domain::models::AppOwner {
    fn from(entity: AppOwnerEntity) -> Self {
        Self {
            app_id: entity.app_id,
            user_id: entity.user_id,
        }
    }
}

/// Identity columns of the app_versions table.
#[derive(Debug, Clone, FromRow)]
pub struct AppVersionEntity {
    pub id: i64,
    pub user_id: Uuid,
}

impl From<AppVersionEntity> for domain::models::AppVersion {
    fn from(entity: AppVersionEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
        }
    }
}
