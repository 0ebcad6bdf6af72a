//! Calculation engine
//!
//! [`Engine`] is the boundary used by callers. It validates the project
//! inputs, runs the single or multi-species path, derives the summary and the
//! optional cost, credit and green cover figures, and reports progress to an
//! optional analytics sink.

use crate::components::aggregate::{
    calculate_sequestration_multi_species_with_config, calculate_sequestration_with_config,
};
use crate::components::cost::calculate_forest_cost_analysis;
use crate::components::enhanced::{compute_enhanced, EnhancedInputs};
use crate::components::green_cover::{compute_green_cover, GreenCoverInputs};
use crate::components::risk::clamp_risk_rate;
use afforest_core::analytics::{
    emit_guarded, event_name, AnalyticsSink, CalculationKind, EventPayload, EventPhase,
};
use afforest_core::config::{EngineConfig, ProjectDefaults};
use afforest_core::constants::SURVIVAL_RATE;
use afforest_core::errors::{AfforestError, AfforestResult};
use afforest_core::inputs::ProjectInputs;
use afforest_core::results::{
    AnnualResult, CalculationResult, EnhancedMetrics, GreenCoverMetrics, MultiSpeciesResult,
    Summary,
};
use afforest_core::species::SpeciesRecord;
use afforest_core::validation::{validate_in, validate_project_inputs};
use afforest_core::{FloatValue, Year};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Overrides for a credit recalculation. Absent values keep those of the calculation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancedKnobs {
    /// unit: %
    pub dead_attribute_pct: Option<FloatValue>,
    pub carbon_price_per_tonne: Option<FloatValue>,
    pub risk_rate: Option<FloatValue>,
}

#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
    sink: Option<Arc<dyn AnalyticsSink + Send + Sync>>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config, sink: None }
    }

    /// Report calculation events to `sink`.
    pub fn with_sink(self, sink: Arc<dyn AnalyticsSink + Send + Sync>) -> Self {
        Self {
            sink: Some(sink),
            ..self
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn emit(&self, kind: CalculationKind, phase: EventPhase, payload: EventPayload) {
        let sink = self
            .sink
            .as_deref()
            .map(|sink| sink as &dyn AnalyticsSink);
        emit_guarded(sink, &event_name(kind, phase), &payload);
    }

    /// Run a calculation.
    ///
    /// Without `species` the project is treated as a single species planting.
    /// The inputs are validated first and every offending field is reported in
    /// one [`AfforestError::InvalidInput`].
    pub fn run(
        &self,
        inputs: &ProjectInputs,
        species: Option<&[SpeciesRecord]>,
    ) -> AfforestResult<CalculationHandle> {
        let kind = match species {
            Some(_) => CalculationKind::Multi,
            None => CalculationKind::Single,
        };
        let payload = EventPayload {
            species_count: species.map_or(1, <[SpeciesRecord]>::len),
            ..EventPayload::default()
        };

        self.emit(kind, EventPhase::Start, payload.clone());
        let started = Instant::now();
        let outcome = self.calculate(inputs, species);
        let elapsed_ms = Some(started.elapsed().as_secs_f64() * 1000.0);

        match &outcome {
            Ok(handle) => {
                let summary = &handle.result().summary;
                info!(
                    "Calculation complete: {} species over {} years, {:.2} tCO2e net",
                    summary.species_count, summary.project_duration, summary.total_net_co2e
                );
                self.emit(
                    kind,
                    EventPhase::Complete,
                    EventPayload {
                        result_count: Some(handle.total_results().len()),
                        elapsed_ms,
                        ..payload
                    },
                );
            }
            Err(e) => {
                warn!("Calculation failed: {e}");
                self.emit(
                    kind,
                    EventPhase::Error,
                    EventPayload {
                        error_count: Some(e.field_errors().len().max(1)),
                        elapsed_ms,
                        ..payload
                    },
                );
            }
        }
        outcome
    }

    fn calculate(
        &self,
        inputs: &ProjectInputs,
        species: Option<&[SpeciesRecord]>,
    ) -> AfforestResult<CalculationHandle> {
        validate_project_inputs(inputs)?;

        let breakdown = match species {
            Some(records) => {
                calculate_sequestration_multi_species_with_config(inputs, records, &self.config)?
            }
            None => calculate_sequestration_with_config(inputs, &self.config)?,
        };
        let records = species.unwrap_or_default();
        let inputs = with_record_values(inputs, records);
        let credit_risk_rate = credit_risk_rate(&inputs, records, &self.config);

        CalculationHandle::new(inputs, breakdown, credit_risk_rate, &self.config.defaults)
    }
}

fn first_stated(
    records: &[SpeciesRecord],
    value: impl Fn(&SpeciesRecord) -> Option<FloatValue>,
) -> Option<FloatValue> {
    records.iter().find_map(value)
}

/// Project inputs with the project wide columns of species records filled in
/// where the caller left them unset.
fn with_record_values(inputs: &ProjectInputs, records: &[SpeciesRecord]) -> ProjectInputs {
    ProjectInputs {
        initial_green_cover: inputs
            .initial_green_cover
            .or_else(|| first_stated(records, |r| r.initial_green_cover)),
        total_geographical_area: inputs
            .total_geographical_area
            .or_else(|| first_stated(records, |r| r.total_geographical_area)),
        dead_attribute_pct: inputs
            .dead_attribute_pct
            .or_else(|| first_stated(records, |r| r.dead_attribute_pct)),
        ..inputs.clone()
    }
}

/// Risk rate applied by the credit calculation when no knob overrides it.
///
/// The mean of the rates stated by species records is preferred, then the
/// project override, then the configured default.
fn credit_risk_rate(
    inputs: &ProjectInputs,
    records: &[SpeciesRecord],
    config: &EngineConfig,
) -> FloatValue {
    let stated: Vec<FloatValue> = records
        .iter()
        .filter_map(SpeciesRecord::risk_rate)
        .map(clamp_risk_rate)
        .collect();

    if !stated.is_empty() {
        stated.iter().sum::<FloatValue>() / stated.len() as FloatValue
    } else {
        clamp_risk_rate(
            inputs
                .risk_rate_override
                .unwrap_or(config.default_credit_risk_rate),
        )
    }
}

fn peak_increment_year(total_results: &[AnnualResult]) -> Option<Year> {
    total_results
        .iter()
        .fold(None, |best: Option<&AnnualResult>, r| match best {
            Some(b) if b.volume_increment >= r.volume_increment => Some(b),
            _ => Some(r),
        })
        .map(|r| r.year)
}

fn summarise(inputs: &ProjectInputs, breakdown: &MultiSpeciesResult) -> Summary {
    let species = &breakdown.species_results;
    let project_duration = breakdown.total_results.len() as u32;
    let trees_planted = species.iter().map(|s| s.number_of_trees).sum();
    let effective_trees: u64 = species.iter().map(|s| s.effective_trees).sum();
    let gross_total_co2e = breakdown.gross_total_co2e();
    let total_net_co2e = breakdown.total_net_co2e();

    let mean_risk_rate = if effective_trees > 0 {
        species
            .iter()
            .map(|s| s.risk_rate * s.effective_trees as FloatValue)
            .sum::<FloatValue>()
            / effective_trees as FloatValue
    } else {
        species.iter().map(|s| s.risk_rate).sum::<FloatValue>() / species.len().max(1) as FloatValue
    };

    Summary {
        project_area: inputs.project_area,
        project_duration,
        species_count: species.len(),
        trees_planted,
        effective_trees,
        gross_total_co2e,
        baseline_total_co2e: inputs.baseline_per_year() * project_duration as FloatValue,
        total_net_co2e,
        average_annual_co2e: if project_duration > 0 {
            total_net_co2e / project_duration as FloatValue
        } else {
            0.0
        },
        peak_increment_year: peak_increment_year(&breakdown.total_results),
        mean_risk_rate,
    }
}

/// A completed calculation.
///
/// Keeps the inputs it was run with so that the credit metrics can be
/// recomputed for other prices or risk assumptions without rerunning the
/// sequestration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationHandle {
    inputs: ProjectInputs,
    result: CalculationResult,
    credit_risk_rate: FloatValue,
    default_survival_rate: FloatValue,
}

impl CalculationHandle {
    fn new(
        inputs: ProjectInputs,
        breakdown: MultiSpeciesResult,
        credit_risk_rate: FloatValue,
        defaults: &ProjectDefaults,
    ) -> AfforestResult<Self> {
        let summary = summarise(&inputs, &breakdown);
        let cost_analysis = inputs
            .project_cost
            .map(|cost| {
                calculate_forest_cost_analysis(&breakdown.total_results, inputs.project_area, cost)
            })
            .transpose()?;

        let mut handle = Self {
            result: CalculationResult {
                total_results: breakdown.total_results,
                species_results: breakdown.species_results,
                summary,
                cost_analysis,
                enhanced: None,
                green_cover: None,
            },
            credit_risk_rate,
            default_survival_rate: defaults.survival_rate,
            inputs,
        };

        if handle.inputs.dead_attribute_pct.is_some()
            || handle.inputs.carbon_price_per_tonne.is_some()
        {
            handle.result.enhanced = Some(handle.recompute_enhanced(&EnhancedKnobs::default()));
        }
        if handle.inputs.initial_green_cover.is_some()
            || handle.inputs.total_geographical_area.is_some()
        {
            handle.result.green_cover = Some(handle.green_cover());
        }
        Ok(handle)
    }

    pub fn inputs(&self) -> &ProjectInputs {
        &self.inputs
    }

    pub fn result(&self) -> &CalculationResult {
        &self.result
    }

    pub fn into_result(self) -> CalculationResult {
        self.result
    }

    pub fn total_results(&self) -> &[AnnualResult] {
        &self.result.total_results
    }

    /// Risk rate used for the credit metrics when no knob overrides it.
    pub fn credit_risk_rate(&self) -> FloatValue {
        self.credit_risk_rate
    }

    /// Credit metrics for the given overrides.
    pub fn recompute_enhanced(&self, knobs: &EnhancedKnobs) -> EnhancedMetrics {
        let summary = &self.result.summary;
        compute_enhanced(&EnhancedInputs {
            gross_total: summary.gross_total_co2e,
            baseline_total: summary.baseline_total_co2e,
            dead_attribute_pct: knobs
                .dead_attribute_pct
                .or(self.inputs.dead_attribute_pct)
                .unwrap_or(0.0),
            carbon_price_per_tonne: knobs
                .carbon_price_per_tonne
                .or(self.inputs.carbon_price_per_tonne)
                .unwrap_or(0.0),
            risk_rate: knobs.risk_rate.unwrap_or(self.credit_risk_rate),
        })
    }

    /// Green cover change of the project.
    pub fn green_cover(&self) -> GreenCoverMetrics {
        compute_green_cover(&GreenCoverInputs {
            initial_green_cover: self.inputs.initial_green_cover.unwrap_or(0.0),
            total_geographical_area: self.inputs.total_geographical_area,
            project_area: self.inputs.project_area,
            survival_rate: validate_in(
                Some(self.inputs.survival_rate),
                self.default_survival_rate,
                &SURVIVAL_RATE,
            ),
        })
    }

    /// Cost per tonne, failing when the project does not sequester a positive amount.
    pub fn cost_per_tonne(&self) -> AfforestResult<FloatValue> {
        match &self.result.cost_analysis {
            Some(analysis) => analysis.require_applicable(),
            None => Err(AfforestError::invalid("project_cost", "was not provided")),
        }
    }
}
