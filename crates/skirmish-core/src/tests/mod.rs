//! Encounter-level tests.
//!
//! # Test Structure
//!
//! - `integration.rs`: scripted encounters through the public orchestrator API
//! - `determinism.rs`: identical inputs give identical event streams
//! - `properties.rs`: proptest properties over random inputs
//! - `helpers.rs`: arena builders and update loops

mod helpers;
mod integration;
