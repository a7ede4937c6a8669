//! Classification of reported actions.

/// Actions reporting a client-side failure that the app owner should hear about.
pub const FAIL_ACTIONS: [&str; 3] = ["set_fail", "update_fail", "download_fail"];

/// Action reported when a device switches to a bundle.
pub const SET_ACTION: &str = "set";

/// Action reported when a device polls for an update.
pub const GET_ACTION: &str = "get";

/// What to do with a report once its version is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionDecision {
    /// Compare with the stored device version and record an uninstall on change.
    CheckDowngrade,
    /// Notify the version owner about a failed update.
    NotifyFailure,
    NoOp,
}

/// Decides how a resolved report is handled.
///
/// Version tracking only applies to physical production devices; failure
/// notifications apply to any device.
pub fn classify_action(action: &str, is_emulator: bool, is_prod: bool) -> ActionDecision {
    if action == SET_ACTION && !is_emulator && is_prod {
        ActionDecision::CheckDowngrade
    } else if is_fail_action(action) {
        ActionDecision::NotifyFailure
    } else {
        ActionDecision::NoOp
    }
}

pub fn is_fail_action(action: &str) -> bool {
    FAIL_ACTIONS.contains(&action)
}
