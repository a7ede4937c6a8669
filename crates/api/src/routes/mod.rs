//! Route handlers.

pub mod health;
pub mod stats;
pub mod store_apps;
