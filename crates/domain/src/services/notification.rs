//! Notification service for app owner notifications.
//!
//! Provides abstractions for notifying the owner of an app when devices
//! report failures, with schedule-based de-duplication.

use std::str::FromStr;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Datelike, Days, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::services::store::StoreError;

/// Topic sent to owners when a device fails to install an update.
pub const UPDATE_FAIL_TOPIC: &str = "user:update_fail";

/// Schedule allowing one notification per week, Mondays at midnight UTC.
pub const WEEKLY_SCHEDULE: &str = "0 0 * * 1";

/// Color tag attached to a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationColor {
    Orange,
    Red,
    Green,
    Blue,
}

impl std::fmt::Display for NotificationColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationColor::Orange => write!(f, "orange"),
            NotificationColor::Red => write!(f, "red"),
            NotificationColor::Green => write!(f, "green"),
            NotificationColor::Blue => write!(f, "blue"),
        }
    }
}

/// Payload of an update failure notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateFailPayload {
    pub current_app_id: String,
    pub current_device_id: String,
    pub current_version_id: i64,
    pub current_app_id_url: String,
}

/// Errors that can occur while dispatching a notification.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Recurring schedule limiting how often one notification is sent.
///
/// Supports the cron subset `M H * * D` where `D` is `*` or a day of week
/// (`0`/`7` Sunday through `6` Saturday).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSchedule {
    expression: String,
    time: NaiveTime,
    weekday: Option<Weekday>,
}

impl NotificationSchedule {
    pub fn weekly() -> Self {
        Self {
            expression: WEEKLY_SCHEDULE.to_string(),
            time: NaiveTime::MIN,
            weekday: Some(Weekday::Mon),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.expression
    }

    /// Latest occurrence at or before `now`, where the current window opens.
    pub fn window_start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let today = now.date_naive();
        (0..8)
            .filter_map(|back| today.checked_sub_days(Days::new(back)))
            .map(|date| (date, date.and_time(self.time).and_utc()))
            .find(|(date, candidate)| {
                *candidate <= now && self.weekday.map_or(true, |w| date.weekday() == w)
            })
            .map(|(_, candidate)| candidate)
    }
}

impl FromStr for NotificationSchedule {
    type Err = NotificationError;

    fn from_str(expression: &str) -> Result<Self, Self::Err> {
        let invalid = || NotificationError::InvalidSchedule(expression.to_string());
        let fields: Vec<&str> = expression.split_whitespace().collect();
        let [minute, hour, day, month, weekday] = fields.as_slice() else {
            return Err(invalid());
        };
        if *day != "*" || *month != "*" {
            return Err(invalid());
        }

        let minute: u32 = minute.parse().map_err(|_| invalid())?;
        let hour: u32 = hour.parse().map_err(|_| invalid())?;
        let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)?;
        let weekday = match *weekday {
            "*" => None,
            value => Some(match value.parse::<u8>().map_err(|_| invalid())? {
                0 | 7 => Weekday::Sun,
                1 => Weekday::Mon,
                2 => Weekday::Tue,
                3 => Weekday::Wed,
                4 => Weekday::Thu,
                5 => Weekday::Fri,
                6 => Weekday::Sat,
                _ => return Err(invalid()),
            }),
        };

        Ok(Self {
            expression: expression.to_string(),
            time,
            weekday,
        })
    }
}

/// A notification addressed to one user.
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    pub topic: String,
    pub payload: serde_json::Value,
    pub recipient_id: Uuid,
    pub schedule: NotificationSchedule,
    pub color: NotificationColor,
}

/// Notification dispatcher trait.
#[async_trait::async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Send a notification unless its schedule suppresses it.
    ///
    /// Returns `true` when the notification was actually delivered.
    async fn send(&self, request: NotificationRequest) -> Result<bool, NotificationError>;
}

/// Mock notification dispatcher for development and testing.
///
/// Records every request and answers with a fixed outcome.
#[derive(Debug, Clone, Default)]
pub struct MockNotificationDispatcher {
    /// Whether requests are reported as suppressed instead of delivered.
    pub suppress: bool,
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
    requests: Arc<Mutex<Vec<NotificationRequest>>>,
}

impl MockNotificationDispatcher {
    /// Create a dispatcher that delivers everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dispatcher that suppresses everything.
    pub fn suppressing() -> Self {
        Self {
            suppress: true,
            ..Self::default()
        }
    }

    /// Create a dispatcher that simulates failures.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<NotificationRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl NotificationDispatcher for MockNotificationDispatcher {
    async fn send(&self, request: NotificationRequest) -> Result<bool, NotificationError> {
        tracing::info!(
            topic = %request.topic,
            recipient_id = %request.recipient_id,
            schedule = %request.schedule.as_str(),
            color = %request.color,
            "Mock: Would send notification"
        );
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        if self.simulate_failure {
            return Err(NotificationError::Delivery("Simulated failure".to_string()));
        }
        Ok(!self.suppress)
    }
}
