//! Physical constants and documented input ranges.
//!
//! Ranges are inclusive. Values outside a range are either rejected at the API
//! boundary (see [`crate::validation::validate_project_inputs`]) or silently
//! replaced with a default inside the engine (see
//! [`crate::validation::validate_range`]).

use crate::FloatValue;
use std::ops::RangeInclusive;

/// Mass ratio of CO2 to elemental carbon (44/12).
pub const CO2_PER_CARBON: FloatValue = 44.0 / 12.0;

/// Project duration in whole years.
pub const PROJECT_DURATION: RangeInclusive<u32> = 4..=50;

/// Only bounded below.
/// unit: trees / ha
pub const PLANTING_DENSITY: RangeInclusive<FloatValue> = 100.0..=FloatValue::MAX;

/// unit: fraction of planted trees
pub const SURVIVAL_RATE: RangeInclusive<FloatValue> = 0.5..=1.0;

/// unit: t dry matter / m^3
pub const WOOD_DENSITY: RangeInclusive<FloatValue> = 0.1..=1.5;

/// Biomass expansion factor.
pub const BEF: RangeInclusive<FloatValue> = 1.0..=3.0;

/// Root-to-shoot ratio.
pub const ROOT_SHOOT_RATIO: RangeInclusive<FloatValue> = 0.1..=0.8;

/// unit: t C / t dry matter
pub const CARBON_FRACTION: RangeInclusive<FloatValue> = 0.4..=0.6;

/// Peak mean annual increment accepted from species records.
/// unit: m^3 / ha / yr
pub const PEAK_MAI: RangeInclusive<FloatValue> = 0.1..=100.0;

/// unit: years
pub const AGE_AT_PEAK_MAI: RangeInclusive<FloatValue> = 1.0..=100.0;

/// Percentages (dead attribute, survival and risk columns of species records).
pub const PERCENT: RangeInclusive<FloatValue> = 0.0..=100.0;

/// Effective project risk rate after all adjustments.
pub const RISK_RATE: RangeInclusive<FloatValue> = 0.05..=0.25;

/// Combined site growth modifier.
pub const GROWTH_MODIFIER: RangeInclusive<FloatValue> = 0.1..=1.5;

/// Risk rate assumed by the credit calculation when nothing else is known.
pub const DEFAULT_CREDIT_RISK_RATE: FloatValue = 0.10;
