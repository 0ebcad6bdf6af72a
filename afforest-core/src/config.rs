//! Engine configuration.
//!
//! Configuration is plain data with documented defaults. It can be built in
//! code or read from a TOML document; every table and key is optional.
//!
//! ```
//! use afforest_core::config::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str(
//!     r#"
//!     apply_site_modifiers = false
//!
//!     [defaults]
//!     wood_density = 0.6
//!     "#,
//! )
//! .unwrap();
//!
//! assert!(!config.apply_site_modifiers);
//! assert_eq!(config.defaults.wood_density, 0.6);
//! assert_eq!(config.defaults.bef, 1.5);
//! ```

use crate::constants;
use crate::errors::{AfforestError, AfforestResult};
use crate::inputs::ProjectType;
use crate::FloatValue;
use serde::{Deserialize, Serialize};

/// Values substituted when a project or species input is missing or out of range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectDefaults {
    /// unit: trees / ha
    pub planting_density: FloatValue,
    /// unit: years
    pub project_duration: u32,
    /// unit: tCO2e / ha / yr
    pub baseline_rate_per_ha: FloatValue,
    pub survival_rate: FloatValue,
    /// unit: t dry matter / m^3
    pub wood_density: FloatValue,
    pub bef: FloatValue,
    pub rsr: FloatValue,
    /// IPCC default carbon fraction of dry biomass
    pub carbon_fraction: FloatValue,
}

impl Default for ProjectDefaults {
    fn default() -> Self {
        Self {
            planting_density: 1600.0,
            project_duration: 20,
            baseline_rate_per_ha: 0.0,
            survival_rate: 0.85,
            wood_density: 0.5,
            bef: 1.5,
            rsr: 0.25,
            carbon_fraction: 0.47,
        }
    }
}

/// Engine wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub defaults: ProjectDefaults,
    /// Multiply the annual volume increment by the site growth modifier.
    pub apply_site_modifiers: bool,
    pub project_type: ProjectType,
    /// Risk rate used by the credit calculation when neither the caller nor the
    /// species records provide one.
    pub default_credit_risk_rate: FloatValue,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            defaults: ProjectDefaults::default(),
            apply_site_modifiers: true,
            project_type: ProjectType::Forest,
            default_credit_risk_rate: constants::DEFAULT_CREDIT_RISK_RATE,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration document and check that the defaults it declares
    /// are themselves within the documented ranges.
    pub fn from_toml_str(document: &str) -> AfforestResult<Self> {
        let config: EngineConfig = toml::from_str(document)?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> AfforestResult<()> {
        let d = &self.defaults;
        let checks = [
            ("planting_density", d.planting_density, &constants::PLANTING_DENSITY),
            ("survival_rate", d.survival_rate, &constants::SURVIVAL_RATE),
            ("wood_density", d.wood_density, &constants::WOOD_DENSITY),
            ("bef", d.bef, &constants::BEF),
            ("rsr", d.rsr, &constants::ROOT_SHOOT_RATIO),
            ("carbon_fraction", d.carbon_fraction, &constants::CARBON_FRACTION),
            (
                "default_credit_risk_rate",
                self.default_credit_risk_rate,
                &constants::RISK_RATE,
            ),
        ];

        for (name, value, range) in checks {
            if !range.contains(&value) {
                return Err(AfforestError::Config(format!(
                    "{name} = {value} is outside {}..={}",
                    range.start(),
                    range.end()
                )));
            }
        }
        if !constants::PROJECT_DURATION.contains(&d.project_duration) {
            return Err(AfforestError::Config(format!(
                "project_duration = {} is outside {}..={}",
                d.project_duration,
                constants::PROJECT_DURATION.start(),
                constants::PROJECT_DURATION.end()
            )));
        }
        if !(d.baseline_rate_per_ha.is_finite() && d.baseline_rate_per_ha >= 0.0) {
            return Err(AfforestError::Config(format!(
                "baseline_rate_per_ha = {} must be a non-negative number",
                d.baseline_rate_per_ha
            )));
        }
        Ok(())
    }
}
