//! Input validation and defaulting.
//!
//! Two flavours are provided. [`validate_range`] silently substitutes a default
//! and is used inside the engine, where a bad species column should degrade
//! rather than abort the calculation. [`validate_project_inputs`] is used at the
//! API boundary and reports every offending field at once.

use crate::constants;
use crate::errors::{AfforestError, AfforestResult, FieldError};
use crate::inputs::ProjectInputs;
use crate::FloatValue;
use std::ops::RangeInclusive;

/// Returns `value` when it is present, finite and within `[min, max]`,
/// otherwise `default`.
pub fn validate_range(
    value: Option<FloatValue>,
    default: FloatValue,
    min: FloatValue,
    max: FloatValue,
) -> FloatValue {
    match value {
        Some(v) if v.is_finite() && v >= min && v <= max => v,
        _ => default,
    }
}

/// [`validate_range`] against one of the ranges in [`crate::constants`].
pub fn validate_in(
    value: Option<FloatValue>,
    default: FloatValue,
    range: &RangeInclusive<FloatValue>,
) -> FloatValue {
    validate_range(value, default, *range.start(), *range.end())
}

/// Collects field errors so a caller sees every problem in one report.
#[derive(Debug, Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn finite(&mut self, field: &str, value: FloatValue) -> bool {
        if value.is_finite() {
            true
        } else {
            self.errors
                .push(FieldError::new(field, "must be a finite number"));
            false
        }
    }

    fn positive(&mut self, field: &str, value: FloatValue) {
        if self.finite(field, value) && value <= 0.0 {
            self.errors
                .push(FieldError::new(field, "must be greater than 0"));
        }
    }

    fn non_negative(&mut self, field: &str, value: FloatValue) {
        if self.finite(field, value) && value < 0.0 {
            self.errors.push(FieldError::new(field, "must not be negative"));
        }
    }

    fn at_least(&mut self, field: &str, value: FloatValue, min: FloatValue) {
        if self.finite(field, value) && value < min {
            self.errors
                .push(FieldError::new(field, format!("must be at least {min}")));
        }
    }

    fn within(&mut self, field: &str, value: FloatValue, range: &RangeInclusive<FloatValue>) {
        if self.finite(field, value) && !range.contains(&value) {
            self.errors.push(FieldError::new(
                field,
                format!("must be between {} and {}", range.start(), range.end()),
            ));
        }
    }

    fn finish(self) -> AfforestResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AfforestError::InvalidInput(self.errors))
        }
    }
}

/// Validate caller supplied project inputs.
///
/// Returns `InvalidInput` listing every field that violates its declared range.
pub fn validate_project_inputs(inputs: &ProjectInputs) -> AfforestResult<()> {
    let mut check = Checker::default();

    check.positive("project_area", inputs.project_area);
    check.at_least(
        "planting_density",
        inputs.planting_density,
        *constants::PLANTING_DENSITY.start(),
    );
    if !constants::PROJECT_DURATION.contains(&inputs.project_duration) {
        check.errors.push(FieldError::new(
            "project_duration",
            format!(
                "must be a whole number of years between {} and {}",
                constants::PROJECT_DURATION.start(),
                constants::PROJECT_DURATION.end()
            ),
        ));
    }
    check.non_negative("baseline_rate_per_ha", inputs.baseline_rate_per_ha);
    check.within("survival_rate", inputs.survival_rate, &constants::SURVIVAL_RATE);
    check.within("wood_density", inputs.wood_density, &constants::WOOD_DENSITY);
    check.within("bef", inputs.bef, &constants::BEF);
    check.within("rsr", inputs.rsr, &constants::ROOT_SHOOT_RATIO);
    check.within(
        "carbon_fraction",
        inputs.carbon_fraction,
        &constants::CARBON_FRACTION,
    );

    if let Some(cost) = inputs.project_cost {
        check.non_negative("project_cost", cost);
    }
    if let Some(pct) = inputs.dead_attribute_pct {
        check.within("dead_attribute_pct", pct, &constants::PERCENT);
    }
    if let Some(price) = inputs.carbon_price_per_tonne {
        check.non_negative("carbon_price_per_tonne", price);
    }
    if let Some(rate) = inputs.risk_rate_override {
        check.within("risk_rate_override", rate, &(0.0..=1.0));
    }
    if let Some(cover) = inputs.initial_green_cover {
        check.non_negative("initial_green_cover", cover);
    }
    if let Some(area) = inputs.total_geographical_area {
        // Non-positive areas fall back to the project area
        check.finite("total_geographical_area", area);
    }

    check.finish()
}
