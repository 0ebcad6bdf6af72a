use crate::FloatValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single offending input field and why it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Error type for the sequestration engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AfforestError {
    #[error("Invalid input: {}", join_field_errors(.0))]
    InvalidInput(Vec<FieldError>),
    #[error("Multi-species calculation requires at least one species record")]
    EmptyDataset,
    #[error("Cost analysis is not applicable: final cumulative sequestration is {0} tCO2e")]
    NonPositiveSequestration(FloatValue),
    #[error("Analytics sink failed: {0}")]
    SinkFailure(String),
    #[error("Could not parse configuration: {0}")]
    Config(String),
}

impl AfforestError {
    /// Shorthand for an `InvalidInput` carrying a single field.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AfforestError::InvalidInput(vec![FieldError::new(field, reason)])
    }

    /// Offending fields of an `InvalidInput`, empty for every other variant.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            AfforestError::InvalidInput(errors) => errors,
            _ => &[],
        }
    }
}

impl From<toml::de::Error> for AfforestError {
    fn from(value: toml::de::Error) -> Self {
        AfforestError::Config(value.to_string())
    }
}

/// Convenience type for `Result<T, AfforestError>`.
pub type AfforestResult<T> = Result<T, AfforestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_lists_every_field() {
        let err = AfforestError::InvalidInput(vec![
            FieldError::new("project_area", "must be greater than 0"),
            FieldError::new("survival_rate", "must be between 0.5 and 1"),
        ]);
        let message = err.to_string();
        assert!(message.contains("project_area: must be greater than 0"));
        assert!(message.contains("survival_rate: must be between 0.5 and 1"));
        assert_eq!(err.field_errors().len(), 2);
    }

    #[test]
    fn other_variants_have_no_field_errors() {
        assert!(AfforestError::EmptyDataset.field_errors().is_empty());
    }
}
