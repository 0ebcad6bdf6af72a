//! Result records returned by the engine.
//!
//! All values are kept as raw numbers for downstream arithmetic. The
//! `formatted` helpers produce display strings when a caller needs them.

use crate::errors::{AfforestError, AfforestResult};
use crate::format::{format_number, format_percent, NOT_APPLICABLE};
use crate::species::SpeciesGrowthParams;
use crate::{FloatValue, Year};
use serde::{Deserialize, Serialize};

/// Sequestration for one project year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualResult {
    pub year: Year,
    /// Stand age in years. Planting happens in year 1, so age equals year.
    pub age: Year,
    /// unit: m^3 / ha / yr
    pub volume_increment: FloatValue,
    /// unit: tCO2e / yr
    pub net_annual_co2e: FloatValue,
    /// unit: tCO2e
    pub cumulative_net_co2e: FloatValue,
}

/// Display strings for an [`AnnualResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedAnnualResult {
    pub year: String,
    pub age: String,
    pub volume_increment: String,
    pub net_annual_co2e: String,
    pub cumulative_net_co2e: String,
}

impl AnnualResult {
    pub fn formatted(&self) -> FormattedAnnualResult {
        FormattedAnnualResult {
            year: self.year.to_string(),
            age: self.age.to_string(),
            volume_increment: format_number(self.volume_increment, 2),
            net_annual_co2e: format_number(self.net_annual_co2e, 2),
            cumulative_net_co2e: format_number(self.cumulative_net_co2e, 2),
        }
    }
}

/// Per-species breakdown of a multi-species calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesResult {
    pub species_name: String,
    /// Trees planted for this species.
    pub number_of_trees: FloatValue,
    /// unit: ha
    pub area_share: FloatValue,
    /// Trees expected to survive, rounded to whole trees.
    pub effective_trees: u64,
    pub growth_params: SpeciesGrowthParams,
    pub growth_modifier: FloatValue,
    pub risk_rate: FloatValue,
    pub results: Vec<AnnualResult>,
}

impl SpeciesResult {
    /// Cumulative CO2e of this species in the final year.
    pub fn total_co2e(&self) -> FloatValue {
        self.results
            .last()
            .map(|r| r.cumulative_net_co2e)
            .unwrap_or(0.0)
    }
}

/// Totals time series together with the per-species breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiSpeciesResult {
    pub total_results: Vec<AnnualResult>,
    pub species_results: Vec<SpeciesResult>,
}

impl MultiSpeciesResult {
    /// Sum of species cumulative CO2e before the baseline is subtracted.
    pub fn gross_total_co2e(&self) -> FloatValue {
        self.species_results.iter().map(SpeciesResult::total_co2e).sum()
    }

    /// Net cumulative CO2e of the project in the final year.
    pub fn total_net_co2e(&self) -> FloatValue {
        self.total_results
            .last()
            .map(|r| r.cumulative_net_co2e)
            .unwrap_or(0.0)
    }
}

/// Aggregate figures for a calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// unit: ha
    pub project_area: FloatValue,
    /// unit: years
    pub project_duration: u32,
    pub species_count: usize,
    pub trees_planted: FloatValue,
    pub effective_trees: u64,
    /// Species CO2e before the baseline is subtracted.
    /// unit: tCO2e
    pub gross_total_co2e: FloatValue,
    /// unit: tCO2e
    pub baseline_total_co2e: FloatValue,
    /// unit: tCO2e
    pub total_net_co2e: FloatValue,
    /// unit: tCO2e / yr
    pub average_annual_co2e: FloatValue,
    /// Year with the largest total volume increment.
    pub peak_increment_year: Option<Year>,
    /// Tree weighted mean of the species risk rates.
    pub mean_risk_rate: FloatValue,
}

/// Whether a cost per tonne could be derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostStatus {
    Applicable,
    NotApplicable,
}

/// Cost effectiveness of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostAnalysis {
    pub total_cost: FloatValue,
    /// unit: ha
    pub project_area: FloatValue,
    /// Final cumulative net CO2e the costs are spread over.
    /// unit: tCO2e
    pub total_net_co2e: FloatValue,
    /// unit: money / ha
    pub cost_per_hectare: FloatValue,
    /// unit: money / tCO2e
    pub cost_per_tonne: Option<FloatValue>,
    /// unit: money / ha / tCO2e
    pub cost_per_hectare_per_tonne: Option<FloatValue>,
    pub status: CostStatus,
    /// Explanation shown when the cost per tonne is not applicable.
    pub note: Option<String>,
}

impl CostAnalysis {
    pub fn is_applicable(&self) -> bool {
        self.status == CostStatus::Applicable
    }

    /// Cost per tonne, or `NonPositiveSequestration` when it is not applicable.
    pub fn require_applicable(&self) -> AfforestResult<FloatValue> {
        self.cost_per_tonne
            .ok_or(AfforestError::NonPositiveSequestration(self.total_net_co2e))
    }

    pub fn cost_per_tonne_display(&self) -> String {
        self.cost_per_tonne
            .map(|v| format_number(v, 2))
            .unwrap_or_else(|| NOT_APPLICABLE.to_string())
    }

    pub fn cost_per_hectare_per_tonne_display(&self) -> String {
        self.cost_per_hectare_per_tonne
            .map(|v| format_number(v, 4))
            .unwrap_or_else(|| NOT_APPLICABLE.to_string())
    }
}

/// Carbon credit projection after non-additionality and risk buffering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedMetrics {
    /// unit: tCO2e
    pub gross_total: FloatValue,
    /// unit: tCO2e
    pub baseline_total: FloatValue,
    /// unit: %
    pub dead_attribute_pct: FloatValue,
    /// unit: tCO2e
    pub non_additional: FloatValue,
    /// unit: tCO2e
    pub net_before_risk: FloatValue,
    pub risk_rate: FloatValue,
    /// unit: tCO2e
    pub risk_buffer: FloatValue,
    /// unit: tCO2e
    pub verified_emission_reductions: FloatValue,
    pub carbon_price_per_tonne: FloatValue,
    pub revenue: FloatValue,
}

/// Change in vegetated area attributable to the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreenCoverMetrics {
    /// unit: ha
    pub initial_green_cover: FloatValue,
    /// Surviving planted area.
    /// unit: ha
    pub absolute_increase: FloatValue,
    /// unit: ha
    pub final_green_cover: FloatValue,
    /// Area the percentages are relative to.
    /// unit: ha
    pub reference_area: FloatValue,
    /// unit: %
    pub initial_pct: FloatValue,
    /// unit: %
    pub final_pct: FloatValue,
    pub percentage_point_increase: FloatValue,
}

impl GreenCoverMetrics {
    pub fn initial_pct_display(&self) -> String {
        format_percent(self.initial_pct)
    }

    pub fn final_pct_display(&self) -> String {
        format_percent(self.final_pct)
    }
}

/// Everything produced by one calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub total_results: Vec<AnnualResult>,
    pub species_results: Vec<SpeciesResult>,
    pub summary: Summary,
    pub cost_analysis: Option<CostAnalysis>,
    pub enhanced: Option<EnhancedMetrics>,
    pub green_cover: Option<GreenCoverMetrics>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn not_applicable() -> CostAnalysis {
        CostAnalysis {
            total_cost: 100_000.0,
            project_area: 10.0,
            total_net_co2e: -50.0,
            cost_per_hectare: 10_000.0,
            cost_per_tonne: None,
            cost_per_hectare_per_tonne: None,
            status: CostStatus::NotApplicable,
            note: None,
        }
    }

    #[test]
    fn formatted_annual_result() {
        let result = AnnualResult {
            year: 3,
            age: 3,
            volume_increment: 12.3456,
            net_annual_co2e: 12_345.678,
            cumulative_net_co2e: 1_234_567.0,
        };
        let formatted = result.formatted();
        assert_eq!(formatted.year, "3");
        assert_eq!(formatted.volume_increment, "12.35");
        assert_eq!(formatted.net_annual_co2e, "12,345.68");
        assert_eq!(formatted.cumulative_net_co2e, "1,234,567.00");
    }

    #[test]
    fn not_applicable_cost_markers() {
        let cost = not_applicable();
        assert!(!cost.is_applicable());
        assert_eq!(cost.cost_per_tonne_display(), NOT_APPLICABLE);
        assert_eq!(cost.cost_per_hectare_per_tonne_display(), NOT_APPLICABLE);
        assert_eq!(
            cost.require_applicable(),
            Err(AfforestError::NonPositiveSequestration(-50.0))
        );
    }

    #[test]
    fn cost_status_serialises_as_marker() {
        let json = serde_json::to_value(not_applicable()).unwrap();
        assert_eq!(json["status"], "not_applicable");
        assert!(json["cost_per_tonne"].is_null());
    }
}
