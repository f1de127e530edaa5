use crate::{types::SimYear, validation::ValidationFailure};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid config: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("Invalid census: {reason}")]
    InvalidCensus { reason: String },

    #[error("Prior-year snapshot missing for year {year}")]
    MissingPriorSnapshot { year: SimYear },

    #[error("Prior-year snapshot for year {year} is malformed: {reason}")]
    MalformedSnapshot { year: SimYear, reason: String },

    #[error("No prior plan state for continuing employee '{employee_id}' in year {year}")]
    MissingPriorState { year: SimYear, employee_id: String },

    #[error("Year {year} failed validation: {}", summarize(.failures))]
    ValidationFailed {
        year: SimYear,
        failures: Vec<ValidationFailure>,
    },

    #[error("Invalid driver transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Simulation cancelled during year {year}")]
    Cancelled { year: SimYear },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn summarize(failures: &[ValidationFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type SimResult<T> = Result<T, SimError>;

pub(crate) fn config_err(field: &str, reason: impl Into<String>) -> SimError {
    SimError::InvalidConfig {
        field: field.to_string(),
        reason: reason.into(),
    }
}
