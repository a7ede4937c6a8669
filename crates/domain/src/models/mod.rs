//! Domain models for the app stats backend.

pub mod app;
pub mod stats;
pub mod store_app;

pub use app::{app_id_to_url, AppOwner, AppVersion};
pub use stats::{
    Device, DeviceSnapshot, DeviceVersion, StatEvent, StatsReport, DEFAULT_IS_EMULATOR,
    DEFAULT_IS_PROD, DEFAULT_PLUGIN_VERSION, UNINSTALL_ACTION, UNKNOWN_VERSION,
};
pub use store_app::{
    AppDetail, CatalogEntry, CatalogListing, CatalogQuery, RefreshCatalogRequest,
    DEFAULT_CATEGORY, DEFAULT_COLLECTION, DEFAULT_LIMIT, DEFAULT_SKIP,
};
