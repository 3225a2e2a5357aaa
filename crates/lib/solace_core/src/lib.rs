//! # solace_core
//!
//! Core domain logic for Solace: the entry store and the completion client.

pub mod completion;
pub mod db;
pub mod entries;
pub mod migrate;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
