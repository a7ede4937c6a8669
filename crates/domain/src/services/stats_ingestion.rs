//! Stats ingestion service.
//!
//! Resolves the app and version a usage report refers to, reconciles the
//! stored device state and records the report as stat events. Failure
//! reports notify the owner of the version.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::models::{app_id_to_url, AppVersion, Device, DeviceVersion, StatEvent, StatsReport};
use crate::services::action::{classify_action, ActionDecision, GET_ACTION};
use crate::services::analytics::{EventTracker, TrackedEvent};
use crate::services::notification::{
    NotificationColor, NotificationDispatcher, NotificationRequest, NotificationSchedule,
    UpdateFailPayload, UPDATE_FAIL_TOPIC,
};
use crate::services::store::{StatsStore, StoreError};

/// Outcome of an ingested report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Device upserted and `events` stat rows appended.
    Recorded { events: usize },
    /// The app is not registered; it was recorded as self-hosted.
    AppNotFound,
    /// The app is registered but the reported version is not.
    VersionNotFound,
}

/// Service ingesting usage reports.
#[derive(Clone)]
pub struct StatsIngestionService {
    store: Arc<dyn StatsStore>,
    notifier: Arc<dyn NotificationDispatcher>,
    tracker: Arc<dyn EventTracker>,
}

impl StatsIngestionService {
    pub fn new(
        store: Arc<dyn StatsStore>,
        notifier: Arc<dyn NotificationDispatcher>,
        tracker: Arc<dyn EventTracker>,
    ) -> Self {
        Self {
            store,
            notifier,
            tracker,
        }
    }

    /// Ingest a validated report.
    ///
    /// Store, notification and tracking failures are logged and do not
    /// abort the report. A failed lookup counts as a missing row.
    pub async fn ingest(&self, mut report: StatsReport) -> IngestOutcome {
        let owner = absent_on_error(
            "find_app_owner",
            &report.app_id,
            self.store.find_app_owner(&report.app_id).await,
        );
        if owner.is_none() {
            self.record_onprem_usage(&report).await;
            return IngestOutcome::AppNotFound;
        }

        report.normalize_version();
        let mut device = Device::from_report(&report);
        let mut stat = StatEvent::from_report(&report);
        let mut events = Vec::with_capacity(2);

        let Some(version) = absent_on_error(
            "find_app_version",
            &report.app_id,
            self.store
                .find_app_version(&report.app_id, &report.version_name)
                .await,
        ) else {
            warn!(
                app_id = %report.app_id,
                version_name = %report.version_name,
                "Reported version not found"
            );
            return IngestOutcome::VersionNotFound;
        };

        stat.version = version.id;
        device.version = DeviceVersion::Resolved(version.id);

        match classify_action(report.action(), device.is_emulator, device.is_prod) {
            ActionDecision::CheckDowngrade => {
                let previous = absent_on_error(
                    "find_device",
                    &report.app_id,
                    self.store
                        .find_device(&report.app_id, &report.device_id)
                        .await,
                )
                .and_then(|snapshot| snapshot.version);
                if let Some(previous) = previous.filter(|previous| *previous != version.id) {
                    debug!(
                        device_id = %report.device_id,
                        from = previous,
                        to = version.id,
                        "Device switched version"
                    );
                    events.push(stat.uninstall_of(previous));
                }
            }
            ActionDecision::NotifyFailure => self.notify_failure(&report, &version).await,
            ActionDecision::NoOp => {}
        }

        events.push(stat);
        self.persist(&device, &events).await;

        metrics::counter!("stats_reports_total", "action" => report.action().to_string())
            .increment(1);

        IngestOutcome::Recorded {
            events: events.len(),
        }
    }

    async fn record_onprem_usage(&self, report: &StatsReport) {
        info!(app_id = %report.app_id, "App not found, recording as self-hosted");

        if let Err(e) = self.store.register_onprem_app(&report.app_id).await {
            error!(app_id = %report.app_id, error = %e, "Failed to register self-hosted app");
        }
        if report.action() == GET_ACTION {
            if let Err(e) = self.store.increment_onprem_updates(&report.app_id, 1).await {
                error!(app_id = %report.app_id, error = %e, "Failed to count self-hosted update");
            }
        }
    }

    async fn notify_failure(&self, report: &StatsReport, version: &AppVersion) {
        let payload = UpdateFailPayload {
            current_app_id: report.app_id.clone(),
            current_device_id: report.device_id.clone(),
            current_version_id: version.id,
            current_app_id_url: app_id_to_url(&report.app_id),
        };
        let payload = match serde_json::to_value(&payload) {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, "Failed to serialize update failure payload");
                return;
            }
        };

        let request = NotificationRequest {
            topic: UPDATE_FAIL_TOPIC.to_string(),
            payload,
            recipient_id: version.user_id,
            schedule: NotificationSchedule::weekly(),
            color: NotificationColor::Orange,
        };

        match self.notifier.send(request).await {
            Ok(true) => {
                info!(
                    app_id = %report.app_id,
                    user_id = %version.user_id,
                    "Update failure notification sent"
                );
                if let Err(e) = self
                    .tracker
                    .track(TrackedEvent::update_fail(version.user_id.to_string()))
                    .await
                {
                    debug!(error = %e, "Failed to track update failure");
                }
            }
            Ok(false) => {
                debug!(user_id = %version.user_id, "Update failure notification suppressed");
            }
            Err(e) => {
                warn!(user_id = %version.user_id, error = %e, "Failed to send update failure notification");
            }
        }
    }

    /// Device state is written before the events referring to it.
    async fn persist(&self, device: &Device, events: &[StatEvent]) {
        if let Err(e) = self.store.upsert_device(device).await {
            error!(
                app_id = %device.app_id,
                device_id = %device.device_id,
                error = %e,
                "Failed to upsert device"
            );
        }
        if let Err(e) = self.store.insert_events(events).await {
            error!(
                app_id = %device.app_id,
                device_id = %device.device_id,
                error = %e,
                "Failed to insert stat events"
            );
        }
    }
}

/// Logs a failed lookup and treats it as a missing row.
fn absent_on_error<T>(
    lookup: &'static str,
    app_id: &str,
    result: Result<Option<T>, StoreError>,
) -> Option<T> {
    result.unwrap_or_else(|e| {
        error!(lookup, app_id = %app_id, error = %e, "Lookup failed");
        metrics::counter!("store_lookup_failures_total", "lookup" => lookup).increment(1);
        None
    })
}
