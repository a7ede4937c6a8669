//! Stats report, device and stat event models.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Plugin version assumed for clients that do not report one.
pub const DEFAULT_PLUGIN_VERSION: &str = "2.3.3";

/// Devices are assumed to be physical unless they say otherwise.
pub const DEFAULT_IS_EMULATOR: bool = false;

/// Devices are assumed to run production builds unless they say otherwise.
pub const DEFAULT_IS_PROD: bool = true;

/// Placeholder carried while a device version is not yet resolved.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Action recorded when a device leaves a version.
pub const UNINSTALL_ACTION: &str = "uninstall";

/// Usage report sent by the updater plugin.
///
/// iOS clients send every field while Android clients omit some of the
/// optional ones. Unknown fields are accepted and ignored.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StatsReport {
    #[validate(custom(function = "shared::validation::validate_reverse_domain"))]
    pub app_id: String,

    #[validate(length(
        max = 36,
        message = "Device ID must be at most 36 characters"
    ))]
    #[validate(custom(function = "shared::validation::validate_device_id"))]
    pub device_id: String,

    pub platform: String,
    pub version_name: String,
    pub version_os: String,

    #[serde(default)]
    pub version_code: Option<String>,
    #[serde(default)]
    pub version_build: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub plugin_version: Option<String>,
    #[serde(default)]
    pub is_emulator: Option<bool>,
    #[serde(default)]
    pub is_prod: Option<bool>,
}

impl StatsReport {
    /// Reported action, or an empty string when none was sent.
    pub fn action(&self) -> &str {
        self.action.as_deref().unwrap_or_default()
    }

    pub fn is_emulator(&self) -> bool {
        self.is_emulator.unwrap_or(DEFAULT_IS_EMULATOR)
    }

    pub fn is_prod(&self) -> bool {
        self.is_prod.unwrap_or(DEFAULT_IS_PROD)
    }

    /// Canonicalizes `version_build` and fills an empty `version_name` from it.
    ///
    /// A build that cannot be coerced is kept verbatim.
    pub fn normalize_version(&mut self) {
        if let Some(coerced) = self
            .version_build
            .as_deref()
            .and_then(shared::version::coerce)
        {
            self.version_build = Some(coerced.to_string());
        }

        if self.version_name.is_empty() {
            self.version_name = self.version_build.clone().unwrap_or_default();
        }
    }
}

/// Version recorded on a device row.
///
/// A device starts `Unresolved` and ingestion only writes it once the
/// version is `Resolved`, so the placeholder never reaches the devices
/// table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceVersion {
    /// Id of the matching `app_versions` row.
    Resolved(i64),
    /// Reported version name, or `"unknown"`, held in memory until matched.
    Unresolved(String),
}

impl DeviceVersion {
    /// The stored version id; `None` while unresolved.
    pub fn id(&self) -> Option<i64> {
        match self {
            DeviceVersion::Resolved(id) => Some(*id),
            DeviceVersion::Unresolved(_) => None,
        }
    }
}

impl std::fmt::Display for DeviceVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceVersion::Resolved(id) => write!(f, "{}", id),
            DeviceVersion::Unresolved(name) => write!(f, "{}", name),
        }
    }
}

/// Device state upserted on every accepted report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub platform: String,
    pub device_id: String,
    pub app_id: String,
    pub plugin_version: String,
    pub os_version: String,
    pub version: DeviceVersion,
    pub is_emulator: bool,
    pub is_prod: bool,
    pub custom_id: Option<String>,
}

impl Device {
    /// Builds the device row for a (normalized) report.
    pub fn from_report(report: &StatsReport) -> Self {
        let version = if report.version_name.is_empty() {
            DeviceVersion::Unresolved(UNKNOWN_VERSION.to_string())
        } else {
            DeviceVersion::Unresolved(report.version_name.clone())
        };

        Self {
            platform: report.platform.clone(),
            device_id: report.device_id.clone(),
            app_id: report.app_id.clone(),
            plugin_version: report
                .plugin_version
                .clone()
                .unwrap_or_else(|| DEFAULT_PLUGIN_VERSION.to_string()),
            os_version: report.version_os.clone(),
            version,
            is_emulator: report.is_emulator(),
            is_prod: report.is_prod(),
            custom_id: report.custom_id.clone(),
        }
    }
}

/// Previously stored device state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSnapshot {
    pub version: Option<i64>,
}

/// Append-only stat event row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatEvent {
    pub platform: String,
    pub device_id: String,
    pub action: Option<String>,
    pub app_id: String,
    pub version_build: Option<String>,
    pub version: i64,
}

impl StatEvent {
    /// Builds the primary event for a (normalized) report; version is 0 until resolved.
    pub fn from_report(report: &StatsReport) -> Self {
        Self {
            platform: report.platform.clone(),
            device_id: report.device_id.clone(),
            action: report.action.clone(),
            app_id: report.app_id.clone(),
            version_build: report.version_build.clone(),
            version: 0,
        }
    }

    /// Copy of this event recording that the device left `previous_version`.
    pub fn uninstall_of(&self, previous_version: i64) -> Self {
        Self {
            action: Some(UNINSTALL_ACTION.to_string()),
            version: previous_version,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report() -> StatsReport {
        serde_json::from_value(json!({
            "app_id": "com.example.app",
            "device_id": "6aa6b1a8-0d9e-4c5f-8f3b-2a1e7c9d0b11",
            "platform": "ios",
            "version_name": "1.0.0",
            "version_os": "17.1",
        }))
        .unwrap()
    }

    #[test]
    fn test_report_valid() {
        assert!(report().validate().is_ok());
    }

    #[test]
    fn test_report_valid_with_generated_fields() {
        use fake::faker::lorem::en::Word;
        use fake::{uuid::UUIDv4, Fake};

        for _ in 0..20 {
            let mut r = report();
            let device_id: uuid::Uuid = UUIDv4.fake();
            let word: String = Word().fake();
            r.device_id = device_id.to_string();
            r.app_id = format!("com.{}.app", word.to_lowercase());
            assert!(r.validate().is_ok(), "rejected {}", r.app_id);
        }
    }

    #[test]
    fn test_report_invalid_app_id() {
        let mut r = report();
        r.app_id = "example".to_string();
        let errors = r.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("app_id"));
    }

    #[test]
    fn test_report_device_id_too_long() {
        let mut r = report();
        r.device_id = format!("{}0", r.device_id);
        let errors = r.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("device_id"));
    }

    #[test]
    fn test_report_missing_required_field() {
        let result = serde_json::from_value::<StatsReport>(json!({
            "app_id": "com.example.app",
            "device_id": "6aa6b1a8-0d9e-4c5f-8f3b-2a1e7c9d0b11",
            "platform": "ios",
            "version_os": "17.1",
        }));
        assert!(result.unwrap_err().to_string().contains("version_name"));
    }

    #[test]
    fn test_report_wrong_type() {
        let result = serde_json::from_value::<StatsReport>(json!({
            "app_id": "com.example.app",
            "device_id": "6aa6b1a8-0d9e-4c5f-8f3b-2a1e7c9d0b11",
            "platform": "ios",
            "version_name": "1.0.0",
            "version_os": "17.1",
            "is_prod": "yes",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_report_ignores_unknown_fields() {
        let r: StatsReport = serde_json::from_value(json!({
            "app_id": "com.example.app",
            "device_id": "6aa6b1a8-0d9e-4c5f-8f3b-2a1e7c9d0b11",
            "platform": "android",
            "version_name": "1.0.0",
            "version_os": "14",
            "locale": "en_US",
        }))
        .unwrap();
        assert_eq!(r.platform, "android");
    }

    #[test]
    fn test_normalize_version_coerces_build() {
        let mut r = report();
        r.version_build = Some("v2.1".to_string());
        r.normalize_version();
        assert_eq!(r.version_build.as_deref(), Some("2.1.0"));
        assert_eq!(r.version_name, "1.0.0");
    }

    #[test]
    fn test_normalize_version_fills_empty_name() {
        let mut r = report();
        r.version_name = String::new();
        r.version_build = Some("3.4.5-rc.1".to_string());
        r.normalize_version();
        assert_eq!(r.version_name, "3.4.5");
    }

    #[test]
    fn test_normalize_version_keeps_uncoercible_build() {
        let mut r = report();
        r.version_name = String::new();
        r.version_build = Some("builtin".to_string());
        r.normalize_version();
        assert_eq!(r.version_build.as_deref(), Some("builtin"));
        assert_eq!(r.version_name, "builtin");
    }

    #[test]
    fn test_device_defaults() {
        let device = Device::from_report(&report());
        assert_eq!(device.plugin_version, DEFAULT_PLUGIN_VERSION);
        assert!(!device.is_emulator);
        assert!(device.is_prod);
        assert_eq!(device.custom_id, None);
        assert_eq!(device.version, DeviceVersion::Unresolved("1.0.0".to_string()));
    }

    #[test]
    fn test_device_unknown_version_placeholder() {
        let mut r = report();
        r.version_name = String::new();
        let device = Device::from_report(&r);
        assert_eq!(device.version.to_string(), UNKNOWN_VERSION);
        assert_eq!(device.version.id(), None);
    }

    #[test]
    fn test_device_carries_reported_flags() {
        let mut r = report();
        r.is_emulator = Some(true);
        r.is_prod = Some(false);
        r.custom_id = Some("user-42".to_string());
        r.plugin_version = Some("5.0.0".to_string());
        let device = Device::from_report(&r);
        assert!(device.is_emulator);
        assert!(!device.is_prod);
        assert_eq!(device.custom_id.as_deref(), Some("user-42"));
        assert_eq!(device.plugin_version, "5.0.0");
    }

    #[test]
    fn test_uninstall_event() {
        let mut r = report();
        r.action = Some("set".to_string());
        let mut event = StatEvent::from_report(&r);
        event.version = 12;
        let uninstall = event.uninstall_of(7);
        assert_eq!(uninstall.action.as_deref(), Some(UNINSTALL_ACTION));
        assert_eq!(uninstall.version, 7);
        assert_eq!(uninstall.device_id, event.device_id);
    }
}
