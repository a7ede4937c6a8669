//! Owner notification delivery.
//!
//! A notification is sent at most once per schedule window for each
//! `(topic, recipient)` pair. The window is claimed in the notifications
//! table before delivery and released again if delivery fails.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::services::{
    NotificationDispatcher, NotificationError, NotificationRequest, StoreError,
};
use persistence::repositories::NotificationRepository;
use reqwest::Client;
use serde::Serialize;
use uuid::Uuid;

use crate::config::NotificationsConfig;

/// Delivery record storage.
#[async_trait]
pub trait NotificationLog: Send + Sync {
    /// Atomically mark `event` as sent to `uniq_id` unless it was already
    /// sent since `window_start`. Returns the claim time when claimed.
    async fn claim(
        &self,
        event: &str,
        uniq_id: &str,
        owner_id: Uuid,
        window_start: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, StoreError>;

    /// Reopen the window of a claim whose delivery failed.
    async fn release(
        &self,
        event: &str,
        uniq_id: &str,
        claimed_at: DateTime<Utc>,
        window_start: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}

#[async_trait]
impl NotificationLog for NotificationRepository {
    async fn claim(
        &self,
        event: &str,
        uniq_id: &str,
        owner_id: Uuid,
        window_start: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(NotificationRepository::claim(self, event, uniq_id, owner_id, window_start)
            .await?
            .map(|record| record.last_send_at))
    }

    async fn release(
        &self,
        event: &str,
        uniq_id: &str,
        claimed_at: DateTime<Utc>,
        window_start: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        NotificationRepository::release(self, event, uniq_id, claimed_at, window_start).await?;
        Ok(())
    }
}

/// Body posted to the event endpoint.
#[derive(Debug, Serialize)]
struct EventDelivery<'a> {
    event: &'a str,
    user_id: Uuid,
    color: String,
    cron: &'a str,
    payload: &'a serde_json::Value,
}

/// Dispatcher posting due notifications to an HTTP event endpoint.
///
/// Without an endpoint, due notifications are only logged.
#[derive(Clone)]
pub struct EventNotificationDispatcher {
    log: Arc<dyn NotificationLog>,
    client: Client,
    endpoint: Option<String>,
    api_key: Option<String>,
}

impl EventNotificationDispatcher {
    pub fn new(
        log: Arc<dyn NotificationLog>,
        config: &NotificationsConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        let endpoint = (config.enabled && !config.endpoint.is_empty())
            .then(|| config.endpoint.clone());
        let api_key = (!config.api_key.is_empty()).then(|| config.api_key.clone());

        Ok(Self {
            log,
            client,
            endpoint,
            api_key,
        })
    }

    async fn deliver(&self, request: &NotificationRequest) -> Result<(), NotificationError> {
        let Some(endpoint) = &self.endpoint else {
            tracing::info!(
                topic = %request.topic,
                recipient_id = %request.recipient_id,
                color = %request.color,
                "Notification delivery not configured, logging only"
            );
            return Ok(());
        };

        let body = EventDelivery {
            event: &request.topic,
            user_id: request.recipient_id,
            color: request.color.to_string(),
            cron: request.schedule.as_str(),
            payload: &request.payload,
        };

        let mut builder = self.client.post(endpoint).json(&body);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| NotificationError::Delivery(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(NotificationError::Delivery(format!(
                "event endpoint returned {}: {}",
                status, text
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl NotificationDispatcher for EventNotificationDispatcher {
    async fn send(&self, request: NotificationRequest) -> Result<bool, NotificationError> {
        let uniq_id = request.recipient_id.to_string();
        // Without an occurrence in range only a first send can claim.
        let window_start = request
            .schedule
            .window_start(Utc::now())
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let Some(claimed_at) = self
            .log
            .claim(&request.topic, &uniq_id, request.recipient_id, window_start)
            .await?
        else {
            tracing::debug!(
                topic = %request.topic,
                recipient_id = %request.recipient_id,
                "Notification already sent in this window"
            );
            return Ok(false);
        };

        if let Err(e) = self.deliver(&request).await {
            if let Err(release_err) = self
                .log
                .release(&request.topic, &uniq_id, claimed_at, window_start)
                .await
            {
                tracing::error!(
                    topic = %request.topic,
                    recipient_id = %request.recipient_id,
                    error = %release_err,
                    "Failed to release notification claim"
                );
            }
            return Err(e);
        }

        tracing::info!(
            topic = %request.topic,
            recipient_id = %request.recipient_id,
            "Notification sent"
        );
        Ok(true)
    }
}
