//! Repository implementations for database operations.

pub mod app;
pub mod device;
pub mod notification;
pub mod stats;
pub mod store_app;

pub use app::AppRepository;
pub use device::DeviceRepository;
pub use notification::NotificationRepository;
pub use stats::StatsRepository;
pub use store_app::StoreAppRepository;
