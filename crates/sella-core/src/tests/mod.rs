//! Test module for integration and determinism tests.
//!
//! - `integration.rs`: end-to-end tests of the session tick pipeline
//! - `determinism.rs`: identical inputs must produce identical outputs
//! - `helpers.rs`: shared setup utilities

mod helpers;

pub use helpers::*;
