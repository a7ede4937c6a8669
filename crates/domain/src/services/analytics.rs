//! Product analytics events.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An event sent to the analytics service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedEvent {
    pub channel: String,
    pub event: String,
    pub icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub notify: bool,
}

impl TrackedEvent {
    /// Event recorded after an owner was notified about a failed update.
    pub fn update_fail(user_id: impl Into<String>) -> Self {
        Self {
            channel: "updates".to_string(),
            event: "update fail".to_string(),
            icon: "⚠️".to_string(),
            user_id: Some(user_id.into()),
            notify: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("Analytics request failed: {0}")]
    Request(String),
}

/// Fire-and-forget analytics sink.
#[async_trait::async_trait]
pub trait EventTracker: Send + Sync {
    async fn track(&self, event: TrackedEvent) -> Result<(), TrackError>;
}

/// Mock tracker recording events in memory.
#[derive(Debug, Clone, Default)]
pub struct MockEventTracker {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
    events: Arc<Mutex<Vec<TrackedEvent>>>,
}

impl MockEventTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<TrackedEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl EventTracker for MockEventTracker {
    async fn track(&self, event: TrackedEvent) -> Result<(), TrackError> {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
        if self.simulate_failure {
            return Err(TrackError::Request("Simulated failure".to_string()));
        }
        Ok(())
    }
}
