//! Green cover change
//!
//! Surviving planted area added to the vegetated area of the region, expressed
//! in hectares and as a share of the reference area.

use afforest_core::config::ProjectDefaults;
use afforest_core::constants::SURVIVAL_RATE;
use afforest_core::results::GreenCoverMetrics;
use afforest_core::validation::{validate_in, validate_range};
use afforest_core::FloatValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreenCoverInputs {
    /// unit: ha
    #[serde(default)]
    pub initial_green_cover: FloatValue,
    /// Area the percentages are relative to. The project area is used when absent.
    /// unit: ha
    #[serde(default)]
    pub total_geographical_area: Option<FloatValue>,
    /// unit: ha
    pub project_area: FloatValue,
    pub survival_rate: FloatValue,
}

fn share_pct(area: FloatValue, reference_area: FloatValue) -> FloatValue {
    if reference_area > 0.0 {
        area / reference_area * 100.0
    } else {
        0.0
    }
}

pub fn compute_green_cover(inputs: &GreenCoverInputs) -> GreenCoverMetrics {
    let survival_rate = validate_in(
        Some(inputs.survival_rate),
        ProjectDefaults::default().survival_rate,
        &SURVIVAL_RATE,
    );
    let initial_green_cover =
        validate_range(Some(inputs.initial_green_cover), 0.0, 0.0, FloatValue::MAX);
    let project_area = validate_range(Some(inputs.project_area), 0.0, 0.0, FloatValue::MAX);

    let absolute_increase = project_area * survival_rate;
    let final_green_cover = initial_green_cover + absolute_increase;
    let reference_area = inputs
        .total_geographical_area
        .filter(|a| a.is_finite() && *a > 0.0)
        .unwrap_or(project_area);

    let initial_pct = share_pct(initial_green_cover, reference_area);
    let final_pct = share_pct(final_green_cover, reference_area);

    GreenCoverMetrics {
        initial_green_cover,
        absolute_increase,
        final_green_cover,
        reference_area,
        initial_pct,
        final_pct,
        percentage_point_increase: final_pct - initial_pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn regional_green_cover() {
        let metrics = compute_green_cover(&GreenCoverInputs {
            initial_green_cover: 5.0,
            total_geographical_area: Some(100.0),
            project_area: 20.0,
            survival_rate: 0.9,
        });
        assert_relative_eq!(metrics.absolute_increase, 18.0);
        assert_relative_eq!(metrics.final_green_cover, 23.0);
        assert_relative_eq!(metrics.initial_pct, 5.0);
        assert_relative_eq!(metrics.final_pct, 23.0, epsilon = 1e-9);
        assert_relative_eq!(metrics.percentage_point_increase, 18.0, epsilon = 1e-9);
        assert_eq!(metrics.final_pct_display(), "23.00%");
    }

    #[test]
    fn project_area_is_reference_without_region() {
        let metrics = compute_green_cover(&GreenCoverInputs {
            initial_green_cover: 0.0,
            total_geographical_area: None,
            project_area: 10.0,
            survival_rate: 0.8,
        });
        assert_eq!(metrics.reference_area, 10.0);
        assert_relative_eq!(metrics.final_pct, 80.0);
    }

    #[test]
    fn invalid_values_are_replaced() {
        let metrics = compute_green_cover(&GreenCoverInputs {
            initial_green_cover: -4.0,
            total_geographical_area: Some(-1.0),
            project_area: 10.0,
            survival_rate: 0.1,
        });
        assert_eq!(metrics.initial_green_cover, 0.0);
        assert_eq!(metrics.reference_area, 10.0);
        // Survival below 50% falls back to 85%
        assert_relative_eq!(metrics.absolute_increase, 8.5);
    }
}
