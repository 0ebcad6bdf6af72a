//! Per-species sequestration
//!
//! Converts the yearly volume increment of one species into CO2e:
//!
//! ```text
//! volume --wood density--> stem biomass --BEF--> above ground
//!        --(1 + RSR)--> total biomass --carbon fraction x trees--> carbon
//!        --(1 - risk)--> net carbon --44/12--> CO2e
//! ```
//!
//! Inputs are clamped to their documented ranges before use. A value outside
//! its range is replaced by the project value, and the project value by the
//! configured default.

use crate::components::growth::{GrowthCurve, RiseDeclineCurve};
use crate::components::risk::{calculate_risk_rate, clamp_risk_rate, RiskContext};
use crate::components::site::get_site_modifiers;
use afforest_core::config::{EngineConfig, ProjectDefaults};
use afforest_core::constants::{self, CO2_PER_CARBON};
use afforest_core::errors::{AfforestError, AfforestResult};
use afforest_core::inputs::{ProjectInputs, SiteConditions};
use afforest_core::results::{AnnualResult, SpeciesResult};
use afforest_core::species::{SpeciesGrowthParams, SpeciesKey, SpeciesRecord, SpeciesTraits};
use afforest_core::validation::validate_in;
use afforest_core::FloatValue;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Factors converting stem volume to carbon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiomassFactors {
    /// unit: t dry matter / m^3
    pub wood_density: FloatValue,
    /// Biomass expansion factor, above ground biomass / stem biomass
    pub bef: FloatValue,
    /// Root-to-shoot ratio, below ground biomass / above ground biomass
    pub rsr: FloatValue,
    /// unit: t C / t dry matter
    pub carbon_fraction: FloatValue,
}

impl BiomassFactors {
    /// Factors of the project, each replaced by the configured default when out of range.
    pub fn from_project(inputs: &ProjectInputs, defaults: &ProjectDefaults) -> Self {
        Self {
            wood_density: validate_in(
                Some(inputs.wood_density),
                defaults.wood_density,
                &constants::WOOD_DENSITY,
            ),
            bef: validate_in(Some(inputs.bef), defaults.bef, &constants::BEF),
            rsr: validate_in(Some(inputs.rsr), defaults.rsr, &constants::ROOT_SHOOT_RATIO),
            carbon_fraction: validate_in(
                Some(inputs.carbon_fraction),
                defaults.carbon_fraction,
                &constants::CARBON_FRACTION,
            ),
        }
    }

    /// Factors stated by a species record, falling back to `self` field by field.
    pub fn merge(&self, record: &SpeciesRecord) -> Self {
        Self {
            wood_density: validate_in(
                record.wood_density,
                self.wood_density,
                &constants::WOOD_DENSITY,
            ),
            bef: validate_in(record.bef, self.bef, &constants::BEF),
            rsr: validate_in(record.rsr, self.rsr, &constants::ROOT_SHOOT_RATIO),
            carbon_fraction: validate_in(
                record.carbon_fraction,
                self.carbon_fraction,
                &constants::CARBON_FRACTION,
            ),
        }
    }

    /// Re-apply the documented ranges.
    fn clamped(&self, defaults: &ProjectDefaults) -> Self {
        Self {
            wood_density: validate_in(
                Some(self.wood_density),
                defaults.wood_density,
                &constants::WOOD_DENSITY,
            ),
            bef: validate_in(Some(self.bef), defaults.bef, &constants::BEF),
            rsr: validate_in(Some(self.rsr), defaults.rsr, &constants::ROOT_SHOOT_RATIO),
            carbon_fraction: validate_in(
                Some(self.carbon_fraction),
                defaults.carbon_fraction,
                &constants::CARBON_FRACTION,
            ),
        }
    }

    /// Carbon held in the total biomass grown per cubic metre of stem volume.
    /// unit: t C / m^3
    pub fn carbon_per_volume(&self) -> FloatValue {
        let stem_biomass = self.wood_density;
        let above_ground = stem_biomass * self.bef;
        let below_ground = above_ground * self.rsr;
        (above_ground + below_ground) * self.carbon_fraction
    }
}

/// Fully merged inputs for one species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesInputs {
    pub species_name: String,
    pub species_key: Option<SpeciesKey>,
    /// Trees planted as reported. When absent the planting density is applied to `area`.
    pub number_of_trees: Option<FloatValue>,
    /// Share of the project area apportioned to this species.
    /// unit: ha
    pub area: FloatValue,
    /// Area stocked at the planting density: the project area split equally
    /// between species.
    /// unit: ha
    pub species_area: FloatValue,
    /// unit: trees / ha
    pub planting_density: FloatValue,
    /// unit: years
    pub project_duration: u32,
    pub survival_rate: FloatValue,
    pub biomass: BiomassFactors,
    /// Explicit peak MAI, if stated
    /// unit: m^3 / ha / yr
    pub peak_mai: Option<FloatValue>,
    /// Explicit age of peak MAI, if stated
    /// unit: years
    pub age_at_peak_mai: Option<FloatValue>,
    pub site: SiteConditions,
    pub traits: SpeciesTraits,
    /// Explicit risk rate. The computed rate is used when absent.
    pub risk_rate: Option<FloatValue>,
    /// Number of species in the project, used for the diversity bonus.
    pub species_count: usize,
}

/// Drop an explicit value outside `range` so that resolution falls through to the next source.
fn explicit_in(
    field: &str,
    species: &str,
    value: Option<FloatValue>,
    range: &std::ops::RangeInclusive<FloatValue>,
) -> Option<FloatValue> {
    match value {
        Some(v) if v.is_finite() && range.contains(&v) => Some(v),
        Some(v) => {
            warn!("Ignoring {field} = {v} for species {species}: outside {range:?}");
            None
        }
        None => None,
    }
}

impl SpeciesInputs {
    /// The single species of a project planted without species records.
    pub fn from_project(inputs: &ProjectInputs, config: &EngineConfig) -> Self {
        let defaults = &config.defaults;
        let species_key = inputs.species_key.or_else(|| {
            inputs
                .species_name
                .as_deref()
                .and_then(SpeciesKey::infer_from_name)
        });
        let species_name = inputs
            .species_name
            .clone()
            .or_else(|| species_key.map(|k| k.identifier().to_string()))
            .unwrap_or_else(|| "Project species".to_string());

        Self {
            species_name,
            species_key,
            number_of_trees: None,
            area: inputs.project_area,
            species_area: inputs.project_area,
            planting_density: validate_in(
                Some(inputs.planting_density),
                defaults.planting_density,
                &constants::PLANTING_DENSITY,
            ),
            project_duration: inputs.project_duration,
            survival_rate: validate_in(
                Some(inputs.survival_rate),
                defaults.survival_rate,
                &constants::SURVIVAL_RATE,
            ),
            biomass: BiomassFactors::from_project(inputs, defaults),
            peak_mai: None,
            age_at_peak_mai: None,
            site: inputs.site(),
            traits: inputs.traits,
            risk_rate: inputs.risk_rate_override,
            species_count: 1,
        }
    }

    /// Merge a species record with the project inputs.
    ///
    /// Fields stated by the record take precedence; everything else comes from
    /// the project.
    pub fn merge(
        project: &ProjectInputs,
        record: &SpeciesRecord,
        area_share: FloatValue,
        species_count: usize,
        config: &EngineConfig,
    ) -> Self {
        let base = Self::from_project(project, config);
        let species_name = if record.species_name.trim().is_empty() {
            base.species_name.clone()
        } else {
            record.species_name.clone()
        };
        let site = SiteConditions {
            site_quality: record.site_quality.unwrap_or(base.site.site_quality),
            avg_rainfall: record.avg_rainfall.unwrap_or(base.site.avg_rainfall),
            soil_type: record.soil_type.unwrap_or(base.site.soil_type),
        };

        Self {
            species_key: record.species_key(),
            number_of_trees: record.tree_count(),
            area: area_share,
            species_area: base.area / species_count.max(1) as FloatValue,
            survival_rate: validate_in(
                record.survival_rate(),
                base.survival_rate,
                &constants::SURVIVAL_RATE,
            ),
            biomass: base.biomass.merge(record),
            peak_mai: explicit_in(
                "growth rate",
                &species_name,
                record.growth_rate,
                &constants::PEAK_MAI,
            ),
            age_at_peak_mai: explicit_in(
                "age at peak MAI",
                &species_name,
                record.age_at_peak_mai,
                &constants::AGE_AT_PEAK_MAI,
            ),
            site,
            traits: record.traits(base.traits),
            risk_rate: record.risk_rate().or(base.risk_rate),
            species_count,
            species_name,
            ..base
        }
    }
}

/// Project duration to use, substituting the default for durations outside
/// the documented range. A zero duration cannot be recovered from.
pub(crate) fn resolve_duration(duration: u32, defaults: &ProjectDefaults) -> AfforestResult<u32> {
    if duration == 0 {
        return Err(AfforestError::invalid(
            "project_duration",
            "must be a positive number of years",
        ));
    }
    if constants::PROJECT_DURATION.contains(&duration) {
        Ok(duration)
    } else {
        warn!(
            "Project duration {duration} is outside {:?}, using {} years",
            constants::PROJECT_DURATION,
            defaults.project_duration
        );
        Ok(defaults.project_duration)
    }
}

/// Sequestration of one species together with the values it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesSequestration {
    pub species_name: String,
    pub number_of_trees: FloatValue,
    /// unit: ha
    pub area: FloatValue,
    pub effective_trees: u64,
    pub growth_params: SpeciesGrowthParams,
    pub growth_modifier: FloatValue,
    pub risk_rate: FloatValue,
    pub results: Vec<AnnualResult>,
}

impl SpeciesSequestration {
    pub fn calculate(inputs: &SpeciesInputs, config: &EngineConfig) -> AfforestResult<Self> {
        let defaults = &config.defaults;

        let planted = |area: FloatValue| area.is_finite() && area > 0.0;
        if !(planted(inputs.area) && planted(inputs.species_area)) {
            return Err(AfforestError::invalid(
                "project_area",
                format!("species {} has no planted area", inputs.species_name),
            ));
        }
        let duration = resolve_duration(inputs.project_duration, defaults)?;
        let density = validate_in(
            Some(inputs.planting_density),
            defaults.planting_density,
            &constants::PLANTING_DENSITY,
        );
        let survival_rate = validate_in(
            Some(inputs.survival_rate),
            defaults.survival_rate,
            &constants::SURVIVAL_RATE,
        );
        let biomass = inputs.biomass.clamped(defaults);

        let growth_params = SpeciesGrowthParams::resolve(
            inputs.peak_mai,
            inputs.age_at_peak_mai,
            inputs.species_key,
            Some(&inputs.species_name),
        );

        // Stated tree counts only apportion area and are reported as planted;
        // stocking always follows the planting density.
        let number_of_trees = inputs
            .number_of_trees
            .filter(|n| n.is_finite() && *n > 0.0)
            .unwrap_or(density * inputs.area);
        let effective_trees = (density * inputs.species_area * survival_rate).round() as u64;

        let growth_modifier = if config.apply_site_modifiers {
            get_site_modifiers(&inputs.site, &inputs.traits).combined()
        } else {
            1.0
        };

        let risk_rate = match inputs.risk_rate {
            Some(rate) => clamp_risk_rate(rate),
            None => calculate_risk_rate(&RiskContext {
                project_type: config.project_type,
                site: inputs.site,
                species_count: inputs.species_count,
                traits: inputs.traits,
            }),
        };

        debug!(
            "Species {}: peak MAI {} at age {}, {} effective trees, modifier {:.3}, risk {:.3}",
            inputs.species_name,
            growth_params.peak_mai,
            growth_params.age_at_peak_mai,
            effective_trees,
            growth_modifier,
            risk_rate
        );

        let curve = RiseDeclineCurve::from_parameters(growth_params);
        let total_duration = duration as FloatValue;
        let trees = effective_trees as FloatValue;
        let mut cumulative = 0.0;

        let results = (1..=duration)
            .map(|year| {
                let volume_increment =
                    curve.annual_increment(year as FloatValue, total_duration) * growth_modifier;

                let stem_biomass = volume_increment * biomass.wood_density;
                let above_ground = stem_biomass * biomass.bef;
                let below_ground = above_ground * biomass.rsr;
                let total_biomass = above_ground + below_ground;
                let carbon_stock = total_biomass * biomass.carbon_fraction * trees;
                let net_carbon = carbon_stock * (1.0 - risk_rate);
                let net_annual_co2e = net_carbon * CO2_PER_CARBON;

                cumulative += net_annual_co2e;
                AnnualResult {
                    year,
                    age: year,
                    volume_increment,
                    net_annual_co2e,
                    cumulative_net_co2e: cumulative,
                }
            })
            .collect();

        Ok(Self {
            species_name: inputs.species_name.clone(),
            number_of_trees,
            area: inputs.area,
            effective_trees,
            growth_params,
            growth_modifier,
            risk_rate,
            results,
        })
    }

    pub fn into_species_result(self) -> SpeciesResult {
        SpeciesResult {
            species_name: self.species_name,
            number_of_trees: self.number_of_trees,
            area_share: self.area,
            effective_trees: self.effective_trees,
            growth_params: self.growth_params,
            growth_modifier: self.growth_modifier,
            risk_rate: self.risk_rate,
            results: self.results,
        }
    }
}

/// Annual sequestration of one species.
pub fn calculate_species_sequestration(
    inputs: &SpeciesInputs,
    config: &EngineConfig,
) -> AfforestResult<Vec<AnnualResult>> {
    SpeciesSequestration::calculate(inputs, config).map(|run| run.results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use afforest_core::inputs::{Rainfall, SiteQuality};
    use is_close::is_close;

    fn reference_inputs() -> SpeciesInputs {
        SpeciesInputs {
            species_name: "Reference".to_string(),
            species_key: None,
            number_of_trees: Some(100.0),
            area: 1.0,
            species_area: 1.0,
            planting_density: 100.0,
            project_duration: 10,
            survival_rate: 1.0,
            biomass: BiomassFactors {
                wood_density: 0.5,
                bef: 1.5,
                rsr: 0.25,
                carbon_fraction: 0.5,
            },
            peak_mai: Some(10.0),
            age_at_peak_mai: Some(10.0),
            site: SiteConditions::default(),
            traits: SpeciesTraits::default(),
            risk_rate: Some(0.10),
            species_count: 1,
        }
    }

    #[test]
    fn converts_volume_to_co2e() {
        let results =
            calculate_species_sequestration(&reference_inputs(), &EngineConfig::default())
                .unwrap();
        assert_eq!(results.len(), 10);

        // Year 10 is the peak: PAI = 18 m3/ha/yr
        // 18 * 0.5 * 1.5 * 1.25 * 0.5 * 100 trees * 0.9 * 44/12
        let last = results[9];
        assert!(is_close!(last.volume_increment, 18.0));
        assert!(is_close!(last.net_annual_co2e, 2784.375));
    }

    #[test]
    fn cumulative_is_running_sum() {
        let results =
            calculate_species_sequestration(&reference_inputs(), &EngineConfig::default())
                .unwrap();
        let mut running = 0.0;
        for (i, r) in results.iter().enumerate() {
            running += r.net_annual_co2e;
            assert_eq!(r.year as usize, i + 1);
            assert_eq!(r.age, r.year);
            assert!(is_close!(r.cumulative_net_co2e, running));
        }
    }

    #[test]
    fn effective_trees_use_density_without_tree_count() {
        let inputs = SpeciesInputs {
            number_of_trees: None,
            area: 10.0,
            species_area: 10.0,
            planting_density: 1600.0,
            survival_rate: 0.85,
            ..reference_inputs()
        };
        let run = SpeciesSequestration::calculate(&inputs, &EngineConfig::default()).unwrap();
        assert_eq!(run.effective_trees, 13_600);
        assert_eq!(run.number_of_trees, 16_000.0);
    }

    #[test]
    fn stated_tree_count_does_not_change_stocking() {
        let inputs = SpeciesInputs {
            number_of_trees: Some(500.0),
            area: 5.0,
            species_area: 5.0,
            planting_density: 1600.0,
            survival_rate: 0.85,
            ..reference_inputs()
        };
        let run = SpeciesSequestration::calculate(&inputs, &EngineConfig::default()).unwrap();
        assert_eq!(run.number_of_trees, 500.0);
        assert_eq!(run.effective_trees, 6_800);
    }

    #[test]
    fn stocking_uses_equal_split_not_area_share() {
        let inputs = SpeciesInputs {
            area: 7.5,
            species_area: 5.0,
            planting_density: 1600.0,
            survival_rate: 1.0,
            ..reference_inputs()
        };
        let run = SpeciesSequestration::calculate(&inputs, &EngineConfig::default()).unwrap();
        assert_eq!(run.area, 7.5);
        assert_eq!(run.effective_trees, 8_000);
    }

    #[test]
    fn densities_above_ten_thousand_are_kept() {
        let inputs = SpeciesInputs {
            planting_density: 20_000.0,
            survival_rate: 1.0,
            ..reference_inputs()
        };
        let run = SpeciesSequestration::calculate(&inputs, &EngineConfig::default()).unwrap();
        assert_eq!(run.effective_trees, 20_000);
    }

    #[test]
    fn out_of_range_values_are_replaced() {
        let inputs = SpeciesInputs {
            survival_rate: 0.2,
            biomass: BiomassFactors {
                wood_density: 9.0,
                ..reference_inputs().biomass
            },
            ..reference_inputs()
        };
        let config = EngineConfig::default();
        let run = SpeciesSequestration::calculate(&inputs, &config).unwrap();
        // 100 trees at the default survival rate of 0.85
        assert_eq!(run.effective_trees, 85);

        let reference = SpeciesInputs {
            survival_rate: 0.85,
            biomass: BiomassFactors {
                wood_density: config.defaults.wood_density,
                ..reference_inputs().biomass
            },
            ..reference_inputs()
        };
        let expected = SpeciesSequestration::calculate(&reference, &config).unwrap();
        assert_eq!(run.results, expected.results);
    }

    #[test]
    fn site_modifier_scales_volume() {
        let good = SpeciesInputs {
            site: SiteConditions {
                site_quality: SiteQuality::Good,
                avg_rainfall: Rainfall::Medium,
                ..SiteConditions::default()
            },
            ..reference_inputs()
        };
        let config = EngineConfig::default();
        let run = SpeciesSequestration::calculate(&good, &config).unwrap();
        assert!(is_close!(run.growth_modifier, 1.2));
        assert!(is_close!(run.results[9].volume_increment, 18.0 * 1.2));

        let unmodified = EngineConfig {
            apply_site_modifiers: false,
            ..EngineConfig::default()
        };
        let run = SpeciesSequestration::calculate(&good, &unmodified).unwrap();
        assert_eq!(run.growth_modifier, 1.0);
        assert!(is_close!(run.results[9].volume_increment, 18.0));
    }

    #[test]
    fn explicit_risk_is_clipped() {
        let inputs = SpeciesInputs {
            risk_rate: Some(0.9),
            ..reference_inputs()
        };
        let run = SpeciesSequestration::calculate(&inputs, &EngineConfig::default()).unwrap();
        assert_eq!(run.risk_rate, 0.25);
    }

    #[test]
    fn computed_risk_without_explicit_rate() {
        let inputs = SpeciesInputs {
            risk_rate: None,
            ..reference_inputs()
        };
        let run = SpeciesSequestration::calculate(&inputs, &EngineConfig::default()).unwrap();
        assert!(is_close!(run.risk_rate, 0.09));
    }

    #[test]
    fn zero_duration_is_invalid() {
        let inputs = SpeciesInputs {
            project_duration: 0,
            ..reference_inputs()
        };
        let err = calculate_species_sequestration(&inputs, &EngineConfig::default()).unwrap_err();
        assert_eq!(err.field_errors()[0].field, "project_duration");
    }

    #[test]
    fn out_of_range_duration_uses_default() {
        let inputs = SpeciesInputs {
            project_duration: 80,
            ..reference_inputs()
        };
        let results =
            calculate_species_sequestration(&inputs, &EngineConfig::default()).unwrap();
        assert_eq!(results.len(), 20);
    }

    #[test]
    fn non_positive_area_is_invalid() {
        let inputs = SpeciesInputs {
            area: 0.0,
            ..reference_inputs()
        };
        assert!(calculate_species_sequestration(&inputs, &EngineConfig::default()).is_err());

        let inputs = SpeciesInputs {
            species_area: FloatValue::NAN,
            ..reference_inputs()
        };
        assert!(calculate_species_sequestration(&inputs, &EngineConfig::default()).is_err());
    }

    #[test]
    fn merge_prefers_record_values() {
        let project = ProjectInputs {
            risk_rate_override: Some(0.2),
            ..ProjectInputs::new(10.0)
        };
        let record = SpeciesRecord {
            species_name: "Eucalyptus camaldulensis".to_string(),
            number_of_trees: Some(400.0),
            wood_density: Some(0.65),
            bef: Some(7.0),
            survival_rate_pct: Some(95.0),
            age_at_peak_mai: Some(8.0),
            site_quality: Some(SiteQuality::Poor),
            ..SpeciesRecord::default()
        };

        let merged = SpeciesInputs::merge(&project, &record, 5.0, 2, &EngineConfig::default());
        assert_eq!(merged.species_key, Some(SpeciesKey::EucalyptusFast));
        assert_eq!(merged.number_of_trees, Some(400.0));
        assert_eq!(merged.area, 5.0);
        assert_eq!(merged.species_area, 5.0);
        assert_eq!(merged.survival_rate, 0.95);
        assert_eq!(merged.biomass.wood_density, 0.65);
        // Out of range BEF falls back to the project value
        assert_eq!(merged.biomass.bef, project.bef);
        assert_eq!(merged.age_at_peak_mai, Some(8.0));
        assert_eq!(merged.peak_mai, None);
        assert_eq!(merged.site.site_quality, SiteQuality::Poor);
        assert_eq!(merged.site.avg_rainfall, project.avg_rainfall);
        assert_eq!(merged.risk_rate, Some(0.2));
        assert_eq!(merged.species_count, 2);
        assert_eq!(merged.project_duration, project.project_duration);
    }

    #[test]
    fn out_of_range_growth_rate_falls_back_to_table() {
        let record = SpeciesRecord::new("Teak").with_growth_rate(500.0);
        let merged = SpeciesInputs::merge(
            &ProjectInputs::new(1.0),
            &record,
            1.0,
            1,
            &EngineConfig::default(),
        );
        assert_eq!(merged.peak_mai, None);
        let run = SpeciesSequestration::calculate(&merged, &EngineConfig::default()).unwrap();
        assert_eq!(run.growth_params, SpeciesKey::TeakModerate.growth_params());
    }

    #[test]
    fn carbon_per_volume() {
        let factors = reference_inputs().biomass;
        assert!(is_close!(factors.carbon_per_volume(), 0.5 * 1.5 * 1.25 * 0.5));
    }
}
