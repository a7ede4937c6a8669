//! LogSnag event tracker.

use std::time::Duration;

use async_trait::async_trait;
use domain::services::{EventTracker, TrackError, TrackedEvent};
use reqwest::Client;
use serde::Serialize;

use crate::config::AnalyticsConfig;

const LOGSNAG_URL: &str = "https://api.logsnag.com/v1/log";

#[derive(Debug, Serialize)]
struct LogSnagEvent<'a> {
    project: &'a str,
    #[serde(flatten)]
    event: &'a TrackedEvent,
}

/// Tracker posting events to LogSnag, or logging them when disabled.
#[derive(Clone)]
pub struct LogSnagTracker {
    client: Client,
    token: Option<String>,
    project: String,
}

impl LogSnagTracker {
    pub fn new(config: &AnalyticsConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            token: (config.enabled && !config.token.is_empty()).then(|| config.token.clone()),
            project: config.project.clone(),
        })
    }
}

#[async_trait]
impl EventTracker for LogSnagTracker {
    async fn track(&self, event: TrackedEvent) -> Result<(), TrackError> {
        let Some(token) = &self.token else {
            tracing::info!(
                channel = %event.channel,
                event = %event.event,
                "Analytics disabled, event not sent"
            );
            return Ok(());
        };

        let body = LogSnagEvent {
            project: &self.project,
            event: &event,
        };

        let response = self
            .client
            .post(LOGSNAG_URL)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| TrackError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TrackError::Request(format!(
                "LogSnag returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_body_is_flattened() {
        let event = TrackedEvent::update_fail("user-1");
        let body = LogSnagEvent {
            project: "capgo",
            event: &event,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["project"], "capgo");
        assert_eq!(json["channel"], "updates");
        assert_eq!(json["event"], "update fail");
        assert_eq!(json["user_id"], "user-1");
        assert_eq!(json["notify"], true);
    }

    #[tokio::test]
    async fn test_disabled_tracker_succeeds_without_network() {
        let tracker = LogSnagTracker::new(&AnalyticsConfig::default()).unwrap();
        assert!(tracker.token.is_none());
        assert!(tracker
            .track(TrackedEvent::update_fail("user-1"))
            .await
            .is_ok());
    }
}
