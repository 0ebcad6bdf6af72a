//! Afforestation carbon sequestration engine.
//!
//! Projects the CO2e sequestered by a tree planting project year by year from
//! species growth curves, site conditions and biomass conversion factors, and
//! derives cost effectiveness, carbon credit and green cover figures from the
//! result.
//!
//! ```
//! use afforest::{Engine, ProjectInputs, SpeciesKey};
//!
//! let inputs = ProjectInputs::new(10.0).with_species_key(SpeciesKey::TeakModerate);
//! let handle = Engine::default().run(&inputs, None)?;
//! assert_eq!(handle.total_results().len(), 20);
//! # Ok::<(), afforest::AfforestError>(())
//! ```

pub use afforest_components::components::risk::{calculate_risk_rate, RiskContext};
pub use afforest_components::components::site::{get_site_modifiers, SiteModifiers};
pub use afforest_components::{
    calculate_forest_cost_analysis, calculate_sequestration, calculate_sequestration_multi_species,
    calculate_sequestration_multi_species_with_config, calculate_sequestration_with_config,
    compute_enhanced, compute_green_cover, CalculationHandle, EnhancedInputs, EnhancedKnobs,
    Engine, GreenCoverInputs,
};
pub use afforest_core::analytics::{AnalyticsSink, EventPayload, MemorySink};
pub use afforest_core::config::{EngineConfig, ProjectDefaults};
pub use afforest_core::errors::{AfforestError, AfforestResult, FieldError};
pub use afforest_core::format::{format_number, format_percent};
pub use afforest_core::inputs::{ProjectInputs, ProjectType, Rainfall, SiteQuality, SoilType};
pub use afforest_core::results::{
    AnnualResult, CalculationResult, CostAnalysis, CostStatus, EnhancedMetrics,
    GreenCoverMetrics, MultiSpeciesResult, SpeciesResult, Summary,
};
pub use afforest_core::species::{SpeciesGrowthParams, SpeciesKey, SpeciesRecord, SpeciesTraits};
pub use afforest_core::validation::{validate_project_inputs, validate_range};
pub use afforest_core::{FloatValue, Year};

#[cfg(feature = "python")]
mod python;
