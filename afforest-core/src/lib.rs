//! Domain types for the afforestation carbon sequestration engine.
//!
//! This crate holds everything the engine and its adapters share:
//! project inputs, species records, result records, validation, configuration
//! and the analytics sink interface. It performs no calculation beyond input
//! defaulting, so both the calculation components and the I/O layers can
//! depend on it without referring back to each other.

pub mod analytics;
pub mod config;
pub mod constants;
pub mod errors;
pub mod format;
pub mod inputs;
#[cfg(feature = "python")]
pub mod python;
pub mod results;
pub mod species;
pub mod validation;

/// Floating point type used for every physical quantity.
pub type FloatValue = f64;

/// Year index within a project, starting at 1.
pub type Year = u32;
