//! Shared utilities and common types for the app stats backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Identifier validation (reverse-domain app ids, device UUIDs)
//! - Loose semantic version coercion

pub mod validation;
pub mod version;
