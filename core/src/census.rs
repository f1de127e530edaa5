//! Starting census: the immutable employee input, read once at year 1.

use crate::{
    error::{SimError, SimResult},
    types::EmployeeId,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CensusRecord {
    pub employee_id: EmployeeId,
    /// Null hire dates are excluded from the simulation and flagged.
    pub hire_date: Option<NaiveDate>,
    pub birth_date: NaiveDate,
    pub job_level: u32,
    pub base_compensation: f64,
    /// May be fractional, e.g. 0.013 for 1.3%.
    #[serde(default)]
    pub initial_deferral_rate: f64,
    #[serde(default)]
    pub enrollment_date: Option<NaiveDate>,
}

impl CensusRecord {
    /// A census employee counts as already enrolled when the census carries
    /// an enrollment date or a positive deferral rate.
    pub fn is_enrolled(&self) -> bool {
        self.enrollment_date.is_some() || self.initial_deferral_rate > 0.0
    }
}

/// Read a census from a JSON array file.
pub fn load_census(path: &str) -> anyhow::Result<Vec<CensusRecord>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
    let records: Vec<CensusRecord> = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
    log::info!("census: loaded {} records from {path}", records.len());
    Ok(records)
}

/// Structural checks that make the whole census unusable.
/// Per-record problems (null hire date) are handled downstream.
pub fn validate_census(records: &[CensusRecord]) -> SimResult<()> {
    if records.is_empty() {
        return Err(SimError::InvalidCensus { reason: "census is empty".into() });
    }
    let mut seen = BTreeSet::new();
    for r in records {
        if r.employee_id.trim().is_empty() {
            return Err(SimError::InvalidCensus { reason: "blank employee_id".into() });
        }
        if !seen.insert(r.employee_id.as_str()) {
            return Err(SimError::InvalidCensus {
                reason: format!("duplicate employee_id '{}'", r.employee_id),
            });
        }
        if !(0.0..=1.0).contains(&r.initial_deferral_rate) {
            return Err(SimError::InvalidCensus {
                reason: format!(
                    "employee '{}' has deferral rate {} outside [0, 1]",
                    r.employee_id, r.initial_deferral_rate
                ),
            });
        }
    }
    Ok(())
}
