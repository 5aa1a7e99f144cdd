//! # qdesk_core
//!
//! Core domain logic for qdesk.

pub mod auth;
pub mod lifecycle;
pub mod migrate;
pub mod models;
pub mod store;
pub mod uuid;
pub mod validation;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
