//! Species identifiers, growth parameters and species records.

use crate::inputs::{Rainfall, SiteQuality, SoilType};
use crate::FloatValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Built-in species growth classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeciesKey {
    EucalyptusFast,
    TeakModerate,
    NativeSlow,
    /// Reserved for species without a known growth class.
    Custom,
}

impl SpeciesKey {
    pub const ALL: [SpeciesKey; 4] = [
        SpeciesKey::EucalyptusFast,
        SpeciesKey::TeakModerate,
        SpeciesKey::NativeSlow,
        SpeciesKey::Custom,
    ];

    pub fn identifier(self) -> &'static str {
        match self {
            SpeciesKey::EucalyptusFast => "eucalyptus_fast",
            SpeciesKey::TeakModerate => "teak_moderate",
            SpeciesKey::NativeSlow => "native_slow",
            SpeciesKey::Custom => "custom",
        }
    }

    pub fn from_identifier(identifier: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.identifier().eq_ignore_ascii_case(identifier.trim()))
    }

    /// Growth parameters of the built-in table.
    pub fn growth_params(self) -> SpeciesGrowthParams {
        match self {
            SpeciesKey::EucalyptusFast => SpeciesGrowthParams::new(25.0, 10.0),
            SpeciesKey::TeakModerate => SpeciesGrowthParams::new(12.0, 15.0),
            SpeciesKey::NativeSlow => SpeciesGrowthParams::new(8.0, 20.0),
            SpeciesKey::Custom => SpeciesGrowthParams::FALLBACK,
        }
    }

    /// Infer a growth class from a free text species name.
    pub fn infer_from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        if name.contains("eucalyptus") || name.contains("acacia") {
            Some(SpeciesKey::EucalyptusFast)
        } else if name.contains("teak") {
            Some(SpeciesKey::TeakModerate)
        } else if name.contains("native") {
            Some(SpeciesKey::NativeSlow)
        } else {
            None
        }
    }
}

impl fmt::Display for SpeciesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

/// Parameters of the rise-decline growth curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeciesGrowthParams {
    /// Peak mean annual increment
    /// unit: m^3 / ha / yr
    pub peak_mai: FloatValue,
    /// Stand age at which the mean annual increment peaks
    /// unit: years
    pub age_at_peak_mai: FloatValue,
}

impl SpeciesGrowthParams {
    /// Used when neither the record, the built-in table nor the name identify the species.
    pub const FALLBACK: SpeciesGrowthParams = SpeciesGrowthParams {
        peak_mai: 10.0,
        age_at_peak_mai: 15.0,
    };

    pub const fn new(peak_mai: FloatValue, age_at_peak_mai: FloatValue) -> Self {
        Self {
            peak_mai,
            age_at_peak_mai,
        }
    }

    /// Resolve growth parameters field by field.
    ///
    /// Each field is taken from the first source that provides it: the explicit
    /// value, the built-in table for `key`, the class inferred from `name`, and
    /// finally [`SpeciesGrowthParams::FALLBACK`]. Explicit values are expected to
    /// have been range checked by the caller.
    pub fn resolve(
        explicit_peak_mai: Option<FloatValue>,
        explicit_age_at_peak: Option<FloatValue>,
        key: Option<SpeciesKey>,
        name: Option<&str>,
    ) -> Self {
        let table = key
            .or_else(|| name.and_then(SpeciesKey::infer_from_name))
            .map(SpeciesKey::growth_params)
            .unwrap_or(Self::FALLBACK);

        Self {
            peak_mai: explicit_peak_mai.unwrap_or(table.peak_mai),
            age_at_peak_mai: explicit_age_at_peak.unwrap_or(table.age_at_peak_mai),
        }
    }
}

impl Default for SpeciesGrowthParams {
    fn default() -> Self {
        Self::FALLBACK
    }
}

/// Species traits that adjust the site growth modifier and the risk rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeciesTraits {
    pub drought_tolerant: bool,
    pub water_sensitive: bool,
    pub prefers_sandy: bool,
}

/// One species of a multi-species project.
///
/// Field names follow the column headers used by spreadsheet importers. Every
/// field other than the name is optional and falls back to the project value
/// when the record is merged with the project inputs. Unknown columns are ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpeciesRecord {
    #[serde(rename = "Species Name", default)]
    pub species_name: String,
    #[serde(rename = "Number of Trees", default)]
    pub number_of_trees: Option<FloatValue>,
    /// Peak mean annual increment
    #[serde(rename = "Growth Rate (m³/ha/yr)", alias = "Growth Rate (m3/ha/yr)", default)]
    pub growth_rate: Option<FloatValue>,
    #[serde(rename = "Wood Density (tdm/m³)", alias = "Wood Density (tdm/m3)", default)]
    pub wood_density: Option<FloatValue>,
    #[serde(rename = "BEF", default)]
    pub bef: Option<FloatValue>,
    #[serde(rename = "Root-Shoot Ratio", default)]
    pub rsr: Option<FloatValue>,
    #[serde(rename = "Carbon Fraction", default)]
    pub carbon_fraction: Option<FloatValue>,
    #[serde(rename = "Survival Rate (%)", default)]
    pub survival_rate_pct: Option<FloatValue>,
    #[serde(rename = "Age at Peak MAI", default)]
    pub age_at_peak_mai: Option<FloatValue>,
    #[serde(rename = "Site Quality", default)]
    pub site_quality: Option<SiteQuality>,
    #[serde(rename = "Average Rainfall", default)]
    pub avg_rainfall: Option<Rainfall>,
    #[serde(rename = "Soil Type", default)]
    pub soil_type: Option<SoilType>,
    #[serde(rename = "Drought Tolerance", default)]
    pub drought_tolerance: Option<String>,
    #[serde(rename = "Water Sensitivity", default)]
    pub water_sensitivity: Option<String>,
    #[serde(rename = "Soil Preference", default)]
    pub soil_preference: Option<String>,
    #[serde(rename = "Risk Rate (%)", default)]
    pub risk_rate_pct: Option<FloatValue>,
    #[serde(rename = "Initial Green Cover (ha)", default)]
    pub initial_green_cover: Option<FloatValue>,
    #[serde(rename = "Total Geographical Area (ha)", default)]
    pub total_geographical_area: Option<FloatValue>,
    #[serde(rename = "Dead Attribute (%)", default)]
    pub dead_attribute_pct: Option<FloatValue>,
}

fn is_affirmative(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "high" | "yes" | "y" | "true" | "1"
    )
}

impl SpeciesRecord {
    pub fn new(species_name: impl Into<String>) -> Self {
        Self {
            species_name: species_name.into(),
            ..Self::default()
        }
    }

    pub fn with_trees(self, number_of_trees: FloatValue) -> Self {
        Self {
            number_of_trees: Some(number_of_trees),
            ..self
        }
    }

    pub fn with_growth_rate(self, growth_rate: FloatValue) -> Self {
        Self {
            growth_rate: Some(growth_rate),
            ..self
        }
    }

    /// Built-in growth class matching the species name, if any.
    ///
    /// Records may carry an identifier such as `teak_moderate` directly in the
    /// name column.
    pub fn species_key(&self) -> Option<SpeciesKey> {
        SpeciesKey::from_identifier(&self.species_name)
            .or_else(|| SpeciesKey::infer_from_name(&self.species_name))
    }

    /// Number of trees when the record states a usable count.
    pub fn tree_count(&self) -> Option<FloatValue> {
        self.number_of_trees.filter(|n| n.is_finite() && *n > 0.0)
    }

    /// Species traits stated by the record, falling back to `defaults` for missing columns.
    pub fn traits(&self, defaults: SpeciesTraits) -> SpeciesTraits {
        SpeciesTraits {
            drought_tolerant: self
                .drought_tolerance
                .as_deref()
                .map(is_affirmative)
                .unwrap_or(defaults.drought_tolerant),
            water_sensitive: self
                .water_sensitivity
                .as_deref()
                .map(is_affirmative)
                .unwrap_or(defaults.water_sensitive),
            prefers_sandy: self
                .soil_preference
                .as_deref()
                .map(|p| p.to_lowercase().contains("sand"))
                .unwrap_or(defaults.prefers_sandy),
        }
    }

    /// Explicit risk rate as a fraction, if the record states one.
    pub fn risk_rate(&self) -> Option<FloatValue> {
        self.risk_rate_pct
            .filter(|pct| pct.is_finite() && *pct >= 0.0)
            .map(|pct| pct / 100.0)
    }

    /// Explicit survival rate as a fraction, if the record states one.
    pub fn survival_rate(&self) -> Option<FloatValue> {
        self.survival_rate_pct.map(|pct| pct / 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_table() {
        assert_eq!(
            SpeciesKey::EucalyptusFast.growth_params(),
            SpeciesGrowthParams::new(25.0, 10.0)
        );
        assert_eq!(
            SpeciesKey::TeakModerate.growth_params(),
            SpeciesGrowthParams::new(12.0, 15.0)
        );
        assert_eq!(
            SpeciesKey::NativeSlow.growth_params(),
            SpeciesGrowthParams::new(8.0, 20.0)
        );
        assert_eq!(SpeciesKey::Custom.growth_params(), SpeciesGrowthParams::FALLBACK);
    }

    #[test]
    fn resolution_priority() {
        // Explicit values win over the table
        let params = SpeciesGrowthParams::resolve(
            Some(30.0),
            None,
            Some(SpeciesKey::TeakModerate),
            Some("Eucalyptus grandis"),
        );
        assert_eq!(params, SpeciesGrowthParams::new(30.0, 15.0));

        // Key wins over the name
        let params =
            SpeciesGrowthParams::resolve(None, None, Some(SpeciesKey::NativeSlow), Some("Teak"));
        assert_eq!(params, SpeciesKey::NativeSlow.growth_params());

        // Name inference
        let params = SpeciesGrowthParams::resolve(None, None, None, Some("Eucalyptus grandis"));
        assert_eq!(params, SpeciesKey::EucalyptusFast.growth_params());

        // Fallback
        let params = SpeciesGrowthParams::resolve(None, None, None, Some("Quercus robur"));
        assert_eq!(params, SpeciesGrowthParams::FALLBACK);
    }

    #[test]
    fn identifiers_round_trip() {
        for key in SpeciesKey::ALL {
            assert_eq!(SpeciesKey::from_identifier(key.identifier()), Some(key));
        }
        assert_eq!(SpeciesKey::from_identifier("unknown"), None);
    }

    #[test]
    fn record_uses_importer_column_names() {
        let record: SpeciesRecord = serde_json::from_str(
            r#"{
                "Species Name": "Tectona grandis (teak)",
                "Number of Trees": 500,
                "Growth Rate (m³/ha/yr)": 14.5,
                "Survival Rate (%)": 90,
                "Site Quality": "Good",
                "Drought Tolerance": "High",
                "Water Sensitivity": "Low",
                "Soil Preference": "Sandy loam",
                "Risk Rate (%)": 12,
                "Notes": "ignored"
            }"#,
        )
        .unwrap();

        assert_eq!(record.tree_count(), Some(500.0));
        assert_eq!(record.growth_rate, Some(14.5));
        assert_eq!(record.survival_rate(), Some(0.9));
        assert_eq!(record.site_quality, Some(SiteQuality::Good));
        assert_eq!(record.risk_rate(), Some(0.12));
        assert_eq!(record.species_key(), Some(SpeciesKey::TeakModerate));
        assert_eq!(
            record.traits(SpeciesTraits::default()),
            SpeciesTraits {
                drought_tolerant: true,
                water_sensitive: false,
                prefers_sandy: true,
            }
        );
    }

    #[test]
    fn missing_traits_fall_back() {
        let defaults = SpeciesTraits {
            drought_tolerant: true,
            water_sensitive: true,
            prefers_sandy: false,
        };
        assert_eq!(SpeciesRecord::new("Oak").traits(defaults), defaults);
    }

    #[test]
    fn unusable_tree_counts_are_ignored() {
        assert_eq!(SpeciesRecord::new("a").with_trees(0.0).tree_count(), None);
        assert_eq!(
            SpeciesRecord::new("a").with_trees(FloatValue::NAN).tree_count(),
            None
        );
        assert_eq!(SpeciesRecord::new("a").tree_count(), None);
    }
}
