//! Project level aggregation
//!
//! Each species is run independently over its share of the project area. The
//! per-year net CO2e of every species is summed, the project baseline is
//! subtracted once per year and a single running sum produces the project
//! cumulative series.

use crate::components::sequestration::{resolve_duration, SpeciesInputs, SpeciesSequestration};
use afforest_core::config::EngineConfig;
use afforest_core::errors::{AfforestError, AfforestResult};
use afforest_core::inputs::ProjectInputs;
use afforest_core::results::{AnnualResult, MultiSpeciesResult};
use afforest_core::species::SpeciesRecord;
use afforest_core::validation::validate_range;
use afforest_core::{FloatValue, Year};
use log::{debug, info};

/// Project values shared by every species run.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ResolvedProject {
    area: FloatValue,
    duration: u32,
    /// unit: tCO2e / yr
    baseline_per_year: FloatValue,
}

impl ResolvedProject {
    fn resolve(inputs: &ProjectInputs, config: &EngineConfig) -> AfforestResult<Self> {
        let area = inputs.project_area;
        if !(area.is_finite() && area > 0.0) {
            return Err(AfforestError::invalid(
                "project_area",
                "must be a finite number greater than 0",
            ));
        }
        let duration = resolve_duration(inputs.project_duration, &config.defaults)?;
        let baseline_rate = validate_range(
            Some(inputs.baseline_rate_per_ha),
            config.defaults.baseline_rate_per_ha,
            0.0,
            FloatValue::MAX,
        );

        Ok(Self {
            area,
            duration,
            baseline_per_year: baseline_rate * area,
        })
    }
}

/// Split the project area between species.
///
/// Shares are proportional to the number of trees when every record states a
/// usable count. Otherwise the area is split equally.
pub fn area_shares(project_area: FloatValue, species: &[SpeciesRecord]) -> Vec<FloatValue> {
    if species.is_empty() {
        return vec![];
    }

    let counts: Option<Vec<FloatValue>> = species.iter().map(SpeciesRecord::tree_count).collect();
    match counts {
        Some(counts) => {
            let total: FloatValue = counts.iter().sum();
            counts.iter().map(|n| project_area * n / total).collect()
        }
        None => {
            let share = project_area / species.len() as FloatValue;
            vec![share; species.len()]
        }
    }
}

/// Sum the species series year by year, subtract the baseline and accumulate.
fn reduce(project: &ResolvedProject, runs: &[SpeciesSequestration]) -> Vec<AnnualResult> {
    let mut cumulative = 0.0;
    (1..=project.duration)
        .map(|year: Year| {
            let index = (year - 1) as usize;
            let (volume_increment, gross) = runs
                .iter()
                .filter_map(|run| run.results.get(index))
                .fold((0.0, 0.0), |(volume, co2e), r| {
                    (volume + r.volume_increment, co2e + r.net_annual_co2e)
                });
            let net_annual_co2e = gross - project.baseline_per_year;
            cumulative += net_annual_co2e;

            AnnualResult {
                year,
                age: year,
                volume_increment,
                net_annual_co2e,
                cumulative_net_co2e: cumulative,
            }
        })
        .collect()
}

fn into_result(project: &ResolvedProject, runs: Vec<SpeciesSequestration>) -> MultiSpeciesResult {
    let total_results = reduce(project, &runs);
    MultiSpeciesResult {
        total_results,
        species_results: runs
            .into_iter()
            .map(SpeciesSequestration::into_species_result)
            .collect(),
    }
}

/// Sequestration of a mixed planting.
///
/// Fails with [`AfforestError::EmptyDataset`] when `species` is empty and with
/// [`AfforestError::InvalidInput`] when the project area is not positive or the
/// duration is zero. Other out of range values are replaced by defaults.
pub fn calculate_sequestration_multi_species_with_config(
    inputs: &ProjectInputs,
    species: &[SpeciesRecord],
    config: &EngineConfig,
) -> AfforestResult<MultiSpeciesResult> {
    if species.is_empty() {
        return Err(AfforestError::EmptyDataset);
    }
    let project = ResolvedProject::resolve(inputs, config)?;
    let inputs = ProjectInputs {
        project_duration: project.duration,
        ..inputs.clone()
    };

    let runs = species
        .iter()
        .zip(area_shares(project.area, species))
        .map(|(record, share)| {
            let merged = SpeciesInputs::merge(&inputs, record, share, species.len(), config);
            SpeciesSequestration::calculate(&merged, config)
        })
        .collect::<AfforestResult<Vec<_>>>()?;

    let result = into_result(&project, runs);
    info!(
        "Calculated {} species over {} years: {:.2} tCO2e net",
        species.len(),
        project.duration,
        result.total_net_co2e()
    );
    Ok(result)
}

/// [`calculate_sequestration_multi_species_with_config`] with the default configuration.
pub fn calculate_sequestration_multi_species(
    inputs: &ProjectInputs,
    species: &[SpeciesRecord],
) -> AfforestResult<MultiSpeciesResult> {
    calculate_sequestration_multi_species_with_config(inputs, species, &EngineConfig::default())
}

/// Sequestration of a single species planting.
///
/// The result has the same shape as the multi-species path, with one entry in
/// `species_results`.
pub fn calculate_sequestration_with_config(
    inputs: &ProjectInputs,
    config: &EngineConfig,
) -> AfforestResult<MultiSpeciesResult> {
    let project = ResolvedProject::resolve(inputs, config)?;
    let species = SpeciesInputs {
        project_duration: project.duration,
        ..SpeciesInputs::from_project(inputs, config)
    };
    let run = SpeciesSequestration::calculate(&species, config)?;
    debug!(
        "Single species {} over {} years",
        run.species_name, project.duration
    );
    Ok(into_result(&project, vec![run]))
}

/// Annual project sequestration of a single species planting with the default configuration.
pub fn calculate_sequestration(inputs: &ProjectInputs) -> AfforestResult<Vec<AnnualResult>> {
    calculate_sequestration_with_config(inputs, &EngineConfig::default())
        .map(|result| result.total_results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use afforest_core::species::SpeciesKey;
    use approx::assert_relative_eq;

    fn project() -> ProjectInputs {
        ProjectInputs {
            baseline_rate_per_ha: 0.0,
            ..ProjectInputs::new(10.0).with_duration(10)
        }
    }

    #[test]
    fn shares_follow_tree_counts() {
        let species = [
            SpeciesRecord::new("A").with_trees(300.0),
            SpeciesRecord::new("B").with_trees(100.0),
        ];
        assert_eq!(area_shares(8.0, &species), vec![6.0, 2.0]);
    }

    #[test]
    fn shares_are_equal_without_counts() {
        let species = [
            SpeciesRecord::new("A").with_trees(300.0),
            SpeciesRecord::new("B"),
            SpeciesRecord::new("C"),
        ];
        let shares = area_shares(9.0, &species);
        assert_eq!(shares, vec![3.0, 3.0, 3.0]);
    }

    #[test]
    fn empty_species_is_rejected() {
        let err = calculate_sequestration_multi_species(&project(), &[]).unwrap_err();
        assert_eq!(err, AfforestError::EmptyDataset);
    }

    #[test]
    fn non_positive_area_is_rejected() {
        let inputs = ProjectInputs::new(0.0);
        let err = calculate_sequestration(&inputs).unwrap_err();
        assert_eq!(err.field_errors()[0].field, "project_area");

        let inputs = ProjectInputs::new(FloatValue::NAN);
        assert!(calculate_sequestration(&inputs).is_err());
    }

    #[test]
    fn totals_are_sum_of_species() {
        let species = [
            SpeciesRecord::new("Eucalyptus").with_trees(1000.0),
            SpeciesRecord::new("Teak").with_trees(500.0),
        ];
        let result = calculate_sequestration_multi_species(&project(), &species).unwrap();
        assert_eq!(result.species_results.len(), 2);
        assert_eq!(result.total_results.len(), 10);

        for (i, total) in result.total_results.iter().enumerate() {
            let expected: FloatValue = result
                .species_results
                .iter()
                .map(|s| s.results[i].net_annual_co2e)
                .sum();
            assert_relative_eq!(total.net_annual_co2e, expected, max_relative = 1e-12);
            let volume: FloatValue = result
                .species_results
                .iter()
                .map(|s| s.results[i].volume_increment)
                .sum();
            assert_relative_eq!(total.volume_increment, volume, max_relative = 1e-12);
        }
        assert_relative_eq!(
            result.total_net_co2e(),
            result.gross_total_co2e(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn baseline_is_subtracted_once_per_year() {
        let species = [
            SpeciesRecord::new("Eucalyptus").with_trees(1000.0),
            SpeciesRecord::new("Teak").with_trees(500.0),
        ];
        let without = calculate_sequestration_multi_species(&project(), &species).unwrap();
        let inputs = ProjectInputs {
            baseline_rate_per_ha: 2.0,
            ..project()
        };
        let with = calculate_sequestration_multi_species(&inputs, &species).unwrap();

        // 2 tCO2e/ha/yr over 10 ha, once per year regardless of species count
        for (a, b) in without.total_results.iter().zip(&with.total_results) {
            assert_relative_eq!(a.net_annual_co2e - b.net_annual_co2e, 20.0, epsilon = 1e-9);
        }
        assert_relative_eq!(
            without.total_net_co2e() - with.total_net_co2e(),
            200.0,
            epsilon = 1e-6
        );
        assert_eq!(without.species_results, with.species_results);
    }

    #[test]
    fn single_species_has_one_breakdown() {
        let inputs = project().with_species_key(SpeciesKey::TeakModerate);
        let result = calculate_sequestration_with_config(&inputs, &EngineConfig::default()).unwrap();
        assert_eq!(result.species_results.len(), 1);
        let species = &result.species_results[0];
        assert_eq!(species.species_name, "teak_moderate");
        assert_eq!(species.number_of_trees, 16_000.0);
        assert_eq!(species.growth_params, SpeciesKey::TeakModerate.growth_params());
        assert_eq!(
            result.total_results,
            calculate_sequestration(&inputs).unwrap()
        );
    }

    #[test]
    fn species_duration_follows_resolved_project_duration() {
        let inputs = ProjectInputs::new(5.0).with_duration(200);
        let species = [SpeciesRecord::new("Native mix")];
        let result = calculate_sequestration_multi_species(&inputs, &species).unwrap();
        assert_eq!(result.total_results.len(), 20);
        assert_eq!(result.species_results[0].results.len(), 20);
    }
}
