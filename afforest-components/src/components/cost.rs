//! Cost effectiveness

use afforest_core::errors::{AfforestError, AfforestResult, FieldError};
use afforest_core::results::{AnnualResult, CostAnalysis, CostStatus};
use afforest_core::FloatValue;
use log::warn;

/// Cost per hectare and per tonne of CO2e sequestered over the project.
///
/// The tonnes are the final cumulative net CO2e of `total_results`. When that
/// is not positive the per tonne figures are reported as not applicable rather
/// than failing. An invalid cost or area is rejected.
pub fn calculate_forest_cost_analysis(
    total_results: &[AnnualResult],
    project_area: FloatValue,
    total_cost: FloatValue,
) -> AfforestResult<CostAnalysis> {
    let mut errors = vec![];
    if !(total_cost.is_finite() && total_cost >= 0.0) {
        errors.push(FieldError::new(
            "project_cost",
            "must be a finite number of at least 0",
        ));
    }
    if !(project_area.is_finite() && project_area > 0.0) {
        errors.push(FieldError::new(
            "project_area",
            "must be a finite number greater than 0",
        ));
    }
    if !errors.is_empty() {
        return Err(AfforestError::InvalidInput(errors));
    }

    let total_net_co2e = total_results
        .last()
        .map(|r| r.cumulative_net_co2e)
        .unwrap_or(0.0);
    let cost_per_hectare = total_cost / project_area;

    if !(total_net_co2e.is_finite() && total_net_co2e > 0.0) {
        warn!("Cost per tonne is not applicable: net sequestration is {total_net_co2e}");
        return Ok(CostAnalysis {
            total_cost,
            project_area,
            total_net_co2e,
            cost_per_hectare,
            cost_per_tonne: None,
            cost_per_hectare_per_tonne: None,
            status: CostStatus::NotApplicable,
            note: Some(
                "The project does not sequester a positive amount of CO2e, \
                 so no cost per tonne can be given"
                    .to_string(),
            ),
        });
    }

    let cost_per_tonne = total_cost / total_net_co2e;
    Ok(CostAnalysis {
        total_cost,
        project_area,
        total_net_co2e,
        cost_per_hectare,
        cost_per_tonne: Some(cost_per_tonne),
        cost_per_hectare_per_tonne: Some(cost_per_tonne / project_area),
        status: CostStatus::Applicable,
        note: None,
    })
}
