//! Domain services for the app stats backend.
//!
//! Services contain business logic that operates on domain models, and the
//! ports they use to reach storage and external services.

pub mod action;
pub mod analytics;
pub mod catalog;
pub mod memory;
pub mod notification;
pub mod stats_ingestion;
pub mod store;

pub use action::{classify_action, is_fail_action, ActionDecision, FAIL_ACTIONS};
pub use analytics::{EventTracker, MockEventTracker, TrackError, TrackedEvent};
pub use catalog::{
    fetch_catalog, CatalogError, CatalogRefreshService, CatalogService, MockCatalogService,
    RefreshSummary,
};
pub use memory::{InMemoryStore, StoreCall};
pub use notification::{
    MockNotificationDispatcher, NotificationColor, NotificationDispatcher, NotificationError,
    NotificationRequest, NotificationSchedule, UpdateFailPayload, UPDATE_FAIL_TOPIC,
    WEEKLY_SCHEDULE,
};
pub use stats_ingestion::{IngestOutcome, StatsIngestionService};
pub use store::{CatalogStore, StatsStore, StoreError};
