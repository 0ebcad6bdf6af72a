//! Python bindings for the calculation engine.
//!
//! Inputs and results cross the boundary as plain Python dictionaries using the
//! serde field names of the Rust types. Species records use the spreadsheet
//! column names, e.g. `{"Species Name": "Teak", "Number of Trees": 400}`.

use crate::components::aggregate;
use crate::components::cost;
use crate::components::enhanced::{self, EnhancedInputs};
use crate::components::green_cover::{self, GreenCoverInputs};
use crate::engine::{CalculationHandle, EnhancedKnobs, Engine};
use afforest_core::analytics::{AnalyticsSink, EventPayload};
use afforest_core::config::EngineConfig;
use afforest_core::errors::{AfforestError, AfforestResult};
use afforest_core::format;
use afforest_core::inputs::ProjectInputs;
use afforest_core::results::AnnualResult;
use afforest_core::species::SpeciesRecord;
use afforest_core::FloatValue;
use pyo3::prelude::*;
use pythonize::{depythonize_bound, pythonize};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

fn from_py<T: DeserializeOwned>(value: &Bound<'_, PyAny>) -> PyResult<T> {
    Ok(depythonize_bound(value.clone())?)
}

fn to_py<T: Serialize>(py: Python<'_>, value: &T) -> PyResult<PyObject> {
    Ok(pythonize(py, value)?)
}

fn config_from_py(config: Option<&Bound<'_, PyAny>>) -> PyResult<EngineConfig> {
    config
        .map(from_py)
        .transpose()
        .map(Option::unwrap_or_default)
}

/// Python callable receiving `(event_name, payload)`.
struct PySink(PyObject);

impl AnalyticsSink for PySink {
    fn emit(&self, event: &str, payload: &EventPayload) -> AfforestResult<()> {
        Python::with_gil(|py| {
            let payload =
                pythonize(py, payload).map_err(|e| AfforestError::SinkFailure(e.to_string()))?;
            self.0
                .call1(py, (event, payload))
                .map(|_| ())
                .map_err(|e| AfforestError::SinkFailure(e.to_string()))
        })
    }
}

#[pyclass]
#[pyo3(name = "Calculation")]
#[derive(Debug, Clone)]
pub struct PyCalculation(pub CalculationHandle);

#[pymethods]
impl PyCalculation {
    /// Full result as a dictionary
    #[getter]
    fn result(&self, py: Python<'_>) -> PyResult<PyObject> {
        to_py(py, self.0.result())
    }

    #[getter]
    fn total_results(&self, py: Python<'_>) -> PyResult<PyObject> {
        to_py(py, &self.0.total_results())
    }

    #[getter]
    fn credit_risk_rate(&self) -> FloatValue {
        self.0.credit_risk_rate()
    }

    /// Recompute the credit metrics with new knobs, e.g. `{"carbon_price_per_tonne": 15.0}`
    #[pyo3(signature = (knobs=None))]
    fn recompute_enhanced(
        &self,
        py: Python<'_>,
        knobs: Option<&Bound<'_, PyAny>>,
    ) -> PyResult<PyObject> {
        let knobs: EnhancedKnobs = knobs.map(from_py).transpose()?.unwrap_or_default();
        to_py(py, &self.0.recompute_enhanced(&knobs))
    }

    fn green_cover(&self, py: Python<'_>) -> PyResult<PyObject> {
        to_py(py, &self.0.green_cover())
    }

    fn cost_per_tonne(&self) -> PyResult<FloatValue> {
        Ok(self.0.cost_per_tonne()?)
    }

    fn __repr__(&self) -> String {
        let summary = &self.0.result().summary;
        format!(
            "Calculation(species={}, years={}, total_net_co2e={})",
            summary.species_count,
            summary.project_duration,
            format::format_number(summary.total_net_co2e, 2)
        )
    }
}

/// Validate and run a calculation.
#[pyfunction]
#[pyo3(signature = (inputs, species=None, config=None, sink=None))]
fn run(
    inputs: &Bound<'_, PyAny>,
    species: Option<&Bound<'_, PyAny>>,
    config: Option<&Bound<'_, PyAny>>,
    sink: Option<PyObject>,
) -> PyResult<PyCalculation> {
    let inputs: ProjectInputs = from_py(inputs)?;
    let species: Option<Vec<SpeciesRecord>> = species.map(from_py).transpose()?;
    let mut engine = Engine::new(config_from_py(config)?);
    if let Some(sink) = sink {
        engine = engine.with_sink(Arc::new(PySink(sink)));
    }

    let handle = engine.run(&inputs, species.as_deref())?;
    Ok(PyCalculation(handle))
}

#[pyfunction]
#[pyo3(signature = (inputs, config=None))]
fn calculate_sequestration(
    py: Python<'_>,
    inputs: &Bound<'_, PyAny>,
    config: Option<&Bound<'_, PyAny>>,
) -> PyResult<PyObject> {
    let inputs: ProjectInputs = from_py(inputs)?;
    let result = aggregate::calculate_sequestration_with_config(&inputs, &config_from_py(config)?)?;
    to_py(py, &result.total_results)
}

#[pyfunction]
#[pyo3(signature = (inputs, species, config=None))]
fn calculate_sequestration_multi_species(
    py: Python<'_>,
    inputs: &Bound<'_, PyAny>,
    species: &Bound<'_, PyAny>,
    config: Option<&Bound<'_, PyAny>>,
) -> PyResult<PyObject> {
    let inputs: ProjectInputs = from_py(inputs)?;
    let species: Vec<SpeciesRecord> = from_py(species)?;
    let result = aggregate::calculate_sequestration_multi_species_with_config(
        &inputs,
        &species,
        &config_from_py(config)?,
    )?;
    to_py(py, &result)
}

#[pyfunction]
fn calculate_forest_cost_analysis(
    py: Python<'_>,
    total_results: &Bound<'_, PyAny>,
    project_area: FloatValue,
    total_cost: FloatValue,
) -> PyResult<PyObject> {
    let total_results: Vec<AnnualResult> = from_py(total_results)?;
    let analysis = cost::calculate_forest_cost_analysis(&total_results, project_area, total_cost)?;
    to_py(py, &analysis)
}

#[pyfunction]
fn compute_enhanced(py: Python<'_>, inputs: &Bound<'_, PyAny>) -> PyResult<PyObject> {
    let inputs: EnhancedInputs = from_py(inputs)?;
    to_py(py, &enhanced::compute_enhanced(&inputs))
}

#[pyfunction]
fn compute_green_cover(py: Python<'_>, inputs: &Bound<'_, PyAny>) -> PyResult<PyObject> {
    let inputs: GreenCoverInputs = from_py(inputs)?;
    to_py(py, &green_cover::compute_green_cover(&inputs))
}

#[pyfunction]
#[pyo3(signature = (value, decimals=2))]
fn format_number(value: FloatValue, decimals: usize) -> String {
    format::format_number(value, decimals)
}

#[pymodule]
pub fn engine(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyCalculation>()?;
    m.add_function(wrap_pyfunction!(run, m)?)?;
    m.add_function(wrap_pyfunction!(calculate_sequestration, m)?)?;
    m.add_function(wrap_pyfunction!(calculate_sequestration_multi_species, m)?)?;
    m.add_function(wrap_pyfunction!(calculate_forest_cost_analysis, m)?)?;
    m.add_function(wrap_pyfunction!(compute_enhanced, m)?)?;
    m.add_function(wrap_pyfunction!(compute_green_cover, m)?)?;
    m.add_function(wrap_pyfunction!(format_number, m)?)?;
    Ok(())
}
