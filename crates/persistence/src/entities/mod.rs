//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod app;
pub mod device;
pub mod notification;

pub use app::{AppOwnerEntity, AppVersionEntity};
pub use device::DeviceEntity;
pub use notification::NotificationEntity;
