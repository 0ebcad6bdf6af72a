//! Calculation components of the afforestation carbon sequestration engine.
//!
//! The pipeline is layered leaves first:
//!
//! 1. [`components::growth`]: annual volume increment from a rise-decline curve
//! 2. [`components::site`] and [`components::risk`]: growth modifiers and project risk rate
//! 3. [`components::sequestration`]: volume to biomass to carbon to CO2e for one species
//! 4. [`components::aggregate`]: per-species runs reduced to project totals
//! 5. [`components::enhanced`] and [`components::green_cover`]: credits, revenue and green cover
//! 6. [`components::cost`]: cost per tonne
//!
//! [`engine::Engine`] ties the stages together, validates inputs at the
//! boundary and reports to an optional analytics sink.

pub mod components;
pub mod engine;
#[cfg(feature = "python")]
pub mod python;

pub use components::aggregate::{
    calculate_sequestration, calculate_sequestration_multi_species,
    calculate_sequestration_multi_species_with_config, calculate_sequestration_with_config,
};
pub use components::cost::calculate_forest_cost_analysis;
pub use components::enhanced::{compute_enhanced, EnhancedInputs};
pub use components::green_cover::{compute_green_cover, GreenCoverInputs};
pub use engine::{CalculationHandle, EnhancedKnobs, Engine};
