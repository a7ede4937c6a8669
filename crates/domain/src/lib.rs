//! Domain layer for the app stats backend.
//!
//! This crate contains:
//! - Domain models (stats reports, devices, stat events, store apps)
//! - Ports for the datastore, catalog, notification and analytics services
//! - Business logic services (stats ingestion, catalog refresh)

pub mod models;
pub mod services;
