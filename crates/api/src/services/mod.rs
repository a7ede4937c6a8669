//! External service integrations.

pub mod catalog_client;
pub mod logsnag;
pub mod notifications;

pub use catalog_client::HttpCatalogClient;
pub use logsnag::LogSnagTracker;
pub use notifications::{EventNotificationDispatcher, NotificationLog};
