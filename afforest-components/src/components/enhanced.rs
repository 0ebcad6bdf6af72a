//! Carbon credit metrics
//!
//! Turns the gross sequestration of a project into verified emission
//! reductions (VERs) and revenue:
//!
//! ```text
//! non_additional = gross * dead_attribute / 100
//! net_before_risk = gross - baseline - non_additional
//! risk_buffer = max(0, net_before_risk * risk_rate)
//! VERs = max(0, net_before_risk - risk_buffer)
//! revenue = VERs * price
//! ```

use crate::components::risk::clamp_risk_rate;
use afforest_core::constants::PERCENT;
use afforest_core::results::EnhancedMetrics;
use afforest_core::validation::validate_range;
use afforest_core::FloatValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnhancedInputs {
    /// Project sequestration before the baseline is subtracted.
    /// unit: tCO2e
    pub gross_total: FloatValue,
    /// Baseline over the whole project duration.
    /// unit: tCO2e
    pub baseline_total: FloatValue,
    /// Share of the gross sequestration that is not additional.
    /// unit: %
    #[serde(default)]
    pub dead_attribute_pct: FloatValue,
    #[serde(default)]
    pub carbon_price_per_tonne: FloatValue,
    pub risk_rate: FloatValue,
}

/// Credit metrics for a project.
///
/// Dead attribute is clamped to [0, 100], a negative or non-finite price is
/// treated as zero and the risk rate is clipped to the documented range.
pub fn compute_enhanced(inputs: &EnhancedInputs) -> EnhancedMetrics {
    let gross_total = if inputs.gross_total.is_finite() {
        inputs.gross_total
    } else {
        0.0
    };
    let baseline_total = validate_range(Some(inputs.baseline_total), 0.0, 0.0, FloatValue::MAX);
    let dead_attribute_pct = if inputs.dead_attribute_pct.is_finite() {
        inputs
            .dead_attribute_pct
            .clamp(*PERCENT.start(), *PERCENT.end())
    } else {
        0.0
    };
    let carbon_price_per_tonne = validate_range(
        Some(inputs.carbon_price_per_tonne),
        0.0,
        0.0,
        FloatValue::MAX,
    );
    let risk_rate = clamp_risk_rate(inputs.risk_rate);

    let non_additional = gross_total * dead_attribute_pct / 100.0;
    let net_before_risk = gross_total - baseline_total - non_additional;
    let risk_buffer = (net_before_risk * risk_rate).max(0.0);
    let verified_emission_reductions = (net_before_risk - risk_buffer).max(0.0);

    EnhancedMetrics {
        gross_total,
        baseline_total,
        dead_attribute_pct,
        non_additional,
        net_before_risk,
        risk_rate,
        risk_buffer,
        verified_emission_reductions,
        carbon_price_per_tonne,
        revenue: verified_emission_reductions * carbon_price_per_tonne,
    }
}
