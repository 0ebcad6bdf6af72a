//! Python conversions for core types.

use crate::errors::AfforestError;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::PyErr;

impl From<AfforestError> for PyErr {
    fn from(value: AfforestError) -> Self {
        match value {
            AfforestError::InvalidInput(_)
            | AfforestError::EmptyDataset
            | AfforestError::NonPositiveSequestration(_)
            | AfforestError::Config(_) => PyValueError::new_err(value.to_string()),
            AfforestError::SinkFailure(_) => PyRuntimeError::new_err(value.to_string()),
        }
    }
}
