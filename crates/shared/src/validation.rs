//! Common validation utilities.

use validator::ValidationError;

lazy_static::lazy_static! {
    /// Reverse-domain application identifier, e.g. `com.example.app`.
    pub static ref REVERSE_DOMAIN_REGEX: regex::Regex =
        regex::Regex::new(r"(?i)^[a-z0-9]+(\.[\w-]+)+$").unwrap();

    /// Hyphenated UUID, any version, case-insensitive.
    pub static ref DEVICE_ID_REGEX: regex::Regex = regex::Regex::new(
        r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$"
    )
    .unwrap();
}

/// Validates that an app id is a reverse-domain string.
pub fn validate_reverse_domain(app_id: &str) -> Result<(), ValidationError> {
    if REVERSE_DOMAIN_REGEX.is_match(app_id) {
        Ok(())
    } else {
        let mut err = ValidationError::new("reverse_domain");
        err.message = Some("App ID name must be a reverse domain string".into());
        Err(err)
    }
}

/// Validates that a device id is a UUID string.
pub fn validate_device_id(device_id: &str) -> Result<(), ValidationError> {
    if DEVICE_ID_REGEX.is_match(device_id) {
        Ok(())
    } else {
        let mut err = ValidationError::new("device_id_format");
        err.message = Some("Device ID must be a valid UUID string".into());
        Err(err)
    }
}
