//! Project level inputs.

use crate::config::ProjectDefaults;
use crate::errors::AfforestResult;
use crate::species::{SpeciesKey, SpeciesTraits};
use crate::FloatValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualitative site productivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SiteQuality {
    #[serde(alias = "good", alias = "GOOD")]
    Good,
    #[default]
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "poor", alias = "POOR")]
    Poor,
}

/// Average annual rainfall class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rainfall {
    #[serde(alias = "high", alias = "HIGH")]
    High,
    #[default]
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "low", alias = "LOW")]
    Low,
}

/// Dominant soil type of the planting site.
///
/// Importers sometimes label loam as "Medium"; both spellings map to [`SoilType::Loam`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SoilType {
    #[default]
    #[serde(alias = "loam", alias = "Medium", alias = "medium")]
    Loam,
    #[serde(alias = "sandy", alias = "Sand", alias = "sand")]
    Sandy,
    #[serde(alias = "clay")]
    Clay,
    #[serde(alias = "degraded")]
    Degraded,
}

/// Kind of project. Only forest projects receive site and diversity risk adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    #[default]
    Forest,
    Water,
    Other,
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProjectType::Forest => "forest",
            ProjectType::Water => "water",
            ProjectType::Other => "other",
        };
        write!(f, "{name}")
    }
}

/// Site conditions shared by the growth modifier and the risk rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SiteConditions {
    pub site_quality: SiteQuality,
    pub avg_rainfall: Rainfall,
    pub soil_type: SoilType,
}

/// Caller supplied description of one afforestation project.
///
/// Inputs are immutable for the duration of a calculation. Missing fields take
/// the documented defaults when deserialised; `project_area` has no meaningful
/// default and is rejected by validation until it is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectInputs {
    /// unit: ha
    pub project_area: FloatValue,
    /// unit: trees / ha
    pub planting_density: FloatValue,
    /// unit: years
    pub project_duration: u32,
    /// Sequestration that would have happened without the project.
    /// unit: tCO2e / ha / yr
    pub baseline_rate_per_ha: FloatValue,
    /// Fraction of planted trees expected to survive.
    pub survival_rate: FloatValue,

    // Biomass factors used when a species does not provide its own
    /// unit: t dry matter / m^3
    pub wood_density: FloatValue,
    pub bef: FloatValue,
    pub rsr: FloatValue,
    pub carbon_fraction: FloatValue,

    pub site_quality: SiteQuality,
    pub avg_rainfall: Rainfall,
    pub soil_type: SoilType,

    pub species_key: Option<SpeciesKey>,
    pub species_name: Option<String>,
    /// Traits of the single species planted when no species records are supplied.
    pub traits: SpeciesTraits,

    pub project_cost: Option<FloatValue>,
    /// unit: %
    pub dead_attribute_pct: Option<FloatValue>,
    pub carbon_price_per_tonne: Option<FloatValue>,
    /// Replaces the computed risk rate for every species (fraction).
    pub risk_rate_override: Option<FloatValue>,
    /// unit: ha
    pub initial_green_cover: Option<FloatValue>,
    /// unit: ha
    pub total_geographical_area: Option<FloatValue>,
}

impl Default for ProjectInputs {
    fn default() -> Self {
        Self::from_defaults(0.0, &ProjectDefaults::default())
    }
}

impl ProjectInputs {
    /// Inputs for a project of `project_area` hectares with every other value at its default.
    pub fn new(project_area: FloatValue) -> Self {
        Self {
            project_area,
            ..Self::default()
        }
    }

    /// Inputs built from a configured set of defaults.
    pub fn from_defaults(project_area: FloatValue, defaults: &ProjectDefaults) -> Self {
        Self {
            project_area,
            planting_density: defaults.planting_density,
            project_duration: defaults.project_duration,
            baseline_rate_per_ha: defaults.baseline_rate_per_ha,
            survival_rate: defaults.survival_rate,
            wood_density: defaults.wood_density,
            bef: defaults.bef,
            rsr: defaults.rsr,
            carbon_fraction: defaults.carbon_fraction,
            site_quality: SiteQuality::default(),
            avg_rainfall: Rainfall::default(),
            soil_type: SoilType::default(),
            species_key: None,
            species_name: None,
            traits: SpeciesTraits::default(),
            project_cost: None,
            dead_attribute_pct: None,
            carbon_price_per_tonne: None,
            risk_rate_override: None,
            initial_green_cover: None,
            total_geographical_area: None,
        }
    }

    /// Parse inputs from a TOML document.
    pub fn from_toml_str(document: &str) -> AfforestResult<Self> {
        Ok(toml::from_str(document)?)
    }

    pub fn with_species_key(self, species_key: SpeciesKey) -> Self {
        Self {
            species_key: Some(species_key),
            ..self
        }
    }

    pub fn with_duration(self, project_duration: u32) -> Self {
        Self {
            project_duration,
            ..self
        }
    }

    pub fn site(&self) -> SiteConditions {
        SiteConditions {
            site_quality: self.site_quality,
            avg_rainfall: self.avg_rainfall,
            soil_type: self.soil_type,
        }
    }

    /// Baseline sequestration of the whole project for one year.
    /// unit: tCO2e / yr
    pub fn baseline_per_year(&self) -> FloatValue {
        self.baseline_rate_per_ha * self.project_area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_documented_defaults() {
        let inputs = ProjectInputs::new(12.5);
        assert_eq!(inputs.project_area, 12.5);
        assert_eq!(inputs.planting_density, 1600.0);
        assert_eq!(inputs.project_duration, 20);
        assert_eq!(inputs.survival_rate, 0.85);
        assert_eq!(inputs.carbon_fraction, 0.47);
        assert_eq!(inputs.site(), SiteConditions::default());
    }

    #[test]
    fn parses_partial_toml() {
        let inputs = ProjectInputs::from_toml_str(
            r#"
            project_area = 10.0
            project_duration = 30
            species_key = "eucalyptus_fast"
            site_quality = "Good"
            soil_type = "Medium"

            [traits]
            drought_tolerant = true
            "#,
        )
        .unwrap();

        assert_eq!(inputs.project_duration, 30);
        assert_eq!(inputs.species_key, Some(SpeciesKey::EucalyptusFast));
        assert_eq!(inputs.site_quality, SiteQuality::Good);
        assert_eq!(inputs.soil_type, SoilType::Loam);
        assert!(inputs.traits.drought_tolerant);
        assert_eq!(inputs.planting_density, 1600.0);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = ProjectInputs::from_toml_str("project_area = \"ten\"").unwrap_err();
        assert!(matches!(err, crate::errors::AfforestError::Config(_)));
    }

    #[test]
    fn lowercase_site_classes_are_accepted() {
        let site: SiteConditions = serde_json::from_str(
            r#"{"site_quality": "poor", "avg_rainfall": "low", "soil_type": "degraded"}"#,
        )
        .unwrap();
        assert_eq!(site.site_quality, SiteQuality::Poor);
        assert_eq!(site.avg_rainfall, Rainfall::Low);
        assert_eq!(site.soil_type, SoilType::Degraded);
    }
}
