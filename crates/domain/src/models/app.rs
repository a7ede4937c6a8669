//! Registered app and app version models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Owner of a registered app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppOwner {
    pub app_id: String,
    pub user_id: Uuid,
}

/// A published version of a registered app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppVersion {
    pub id: i64,
    pub user_id: Uuid,
}

/// Converts an app id into the path segment used by the web console.
///
/// Dots are not allowed in console routes, so each one becomes `--`.
pub fn app_id_to_url(app_id: &str) -> String {
    app_id.replace('.', "--")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_id_to_url() {
        assert_eq!(app_id_to_url("com.example.app"), "com--example--app");
        assert_eq!(app_id_to_url("single"), "single");
    }
}
