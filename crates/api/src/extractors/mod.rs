//! Custom Axum extractors.
//!
//! Extractors for parsing and validating request data.

pub mod payload;

pub use payload::MethodPayload;
