//! Workforce snapshot rows: the finalized per-employee, per-year fact.
//!
//! A snapshot is written once per simulation year and never patched.
//! The prior year's snapshot is the only workforce input the next
//! year's generators may read.

use crate::{
    census::CensusRecord,
    error::{SimError, SimResult},
    event::TerminationReason,
    types::{whole_years_between, year_end, EmployeeId, SimYear},
    validation::{DataQualityIssue, IssueKind},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    Active,
    Terminated,
}

impl EmploymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Terminated => "terminated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "terminated" => Some(Self::Terminated),
            _ => None,
        }
    }
}

/// Status refined by whether the employee was hired this year.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DetailedStatus {
    ContinuousActive,
    NewHireActive,
    ExperiencedTermination,
    NewHireTermination,
}

impl DetailedStatus {
    pub fn classify(status: EmploymentStatus, hired_this_year: bool) -> Self {
        match (status, hired_this_year) {
            (EmploymentStatus::Active, false) => Self::ContinuousActive,
            (EmploymentStatus::Active, true) => Self::NewHireActive,
            (EmploymentStatus::Terminated, false) => Self::ExperiencedTermination,
            (EmploymentStatus::Terminated, true) => Self::NewHireTermination,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContinuousActive => "continuous_active",
            Self::NewHireActive => "new_hire_active",
            Self::ExperiencedTermination => "experienced_termination",
            Self::NewHireTermination => "new_hire_termination",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "continuous_active" => Self::ContinuousActive,
            "new_hire_active" => Self::NewHireActive,
            "experienced_termination" => Self::ExperiencedTermination,
            "new_hire_termination" => Self::NewHireTermination,
            _ => return None,
        })
    }
}

/// Current compensation compared with the employee's own baseline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CompensationQualityFlag {
    Normal,
    HighGrowth,
    ExtremeGrowth,
    Decline,
    NonPositive,
    MissingBaseline,
}

/// Growth above this multiple of baseline is flagged.
pub const HIGH_GROWTH_RATIO: f64 = 2.0;
pub const EXTREME_GROWTH_RATIO: f64 = 5.0;

impl CompensationQualityFlag {
    pub fn classify(current: f64, baseline: Option<f64>) -> Self {
        let Some(baseline) = baseline else {
            return Self::MissingBaseline;
        };
        if current <= 0.0 || baseline <= 0.0 {
            return Self::NonPositive;
        }
        let ratio = current / baseline;
        if ratio > EXTREME_GROWTH_RATIO {
            Self::ExtremeGrowth
        } else if ratio > HIGH_GROWTH_RATIO {
            Self::HighGrowth
        } else if ratio < 1.0 {
            Self::Decline
        } else {
            Self::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::HighGrowth => "high_growth",
            Self::ExtremeGrowth => "extreme_growth",
            Self::Decline => "decline",
            Self::NonPositive => "non_positive",
            Self::MissingBaseline => "missing_baseline",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "normal" => Self::Normal,
            "high_growth" => Self::HighGrowth,
            "extreme_growth" => Self::ExtremeGrowth,
            "decline" => Self::Decline,
            "non_positive" => Self::NonPositive,
            "missing_baseline" => Self::MissingBaseline,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkforceSnapshotRow {
    pub employee_id: EmployeeId,
    pub simulation_year: SimYear,
    pub hire_date: NaiveDate,
    pub birth_date: NaiveDate,
    pub termination_date: Option<NaiveDate>,
    pub termination_reason: Option<TerminationReason>,
    pub employment_status: EmploymentStatus,
    pub detailed_status: DetailedStatus,
    pub job_level: u32,
    pub current_age: u32,
    pub current_tenure: u32,
    pub age_band: String,
    pub tenure_band: String,
    pub starting_compensation: f64,
    pub current_compensation: f64,
    pub prorated_compensation: f64,
    pub compensation_quality_flag: CompensationQualityFlag,
    pub is_enrolled: bool,
    pub enrollment_date: Option<NaiveDate>,
    pub current_deferral_rate: f64,
    pub escalations_received: u32,
    pub employee_contribution: f64,
    pub employer_match: f64,
    pub employer_core: f64,
}

impl WorkforceSnapshotRow {
    pub fn is_active(&self) -> bool {
        self.employment_status == EmploymentStatus::Active
    }
}

/// The read-only workforce input to a year's generators: the finalized
/// snapshot of year N-1, or for the first year a baseline derived from
/// the census as of Dec 31 of the preceding year.
#[derive(Debug, Clone)]
pub struct PriorSnapshot {
    pub year: SimYear,
    pub rows: Vec<WorkforceSnapshotRow>,
    pub is_census_baseline: bool,
}

impl PriorSnapshot {
    /// Build the year-0 baseline from the census. Records with no hire
    /// date are excluded and returned as data-quality issues.
    pub fn from_census(
        census: &[CensusRecord],
        start_year: SimYear,
    ) -> (Self, Vec<DataQualityIssue>) {
        let baseline_year = start_year - 1;
        let as_of = year_end(baseline_year);
        let mut rows = Vec::with_capacity(census.len());
        let mut issues = Vec::new();

        for r in census {
            let Some(hire_date) = r.hire_date else {
                log::warn!(
                    "year={start_year} census: {} has no hire_date, excluded",
                    r.employee_id
                );
                issues.push(DataQualityIssue {
                    employee_id: r.employee_id.clone(),
                    simulation_year: start_year,
                    kind: IssueKind::MissingHireDate,
                    detail: "census record has null hire_date".into(),
                });
                continue;
            };
            let status = EmploymentStatus::Active;
            rows.push(WorkforceSnapshotRow {
                employee_id: r.employee_id.clone(),
                simulation_year: baseline_year,
                hire_date,
                birth_date: r.birth_date,
                termination_date: None,
                termination_reason: None,
                employment_status: status,
                detailed_status: DetailedStatus::classify(status, false),
                job_level: r.job_level,
                current_age: whole_years_between(r.birth_date, as_of),
                current_tenure: whole_years_between(hire_date, as_of),
                age_band: String::new(),
                tenure_band: String::new(),
                starting_compensation: r.base_compensation,
                current_compensation: r.base_compensation,
                prorated_compensation: r.base_compensation,
                compensation_quality_flag: CompensationQualityFlag::classify(
                    r.base_compensation,
                    Some(r.base_compensation),
                ),
                is_enrolled: r.is_enrolled(),
                enrollment_date: r.enrollment_date,
                current_deferral_rate: r.initial_deferral_rate,
                escalations_received: 0,
                employee_contribution: 0.0,
                employer_match: 0.0,
                employer_core: 0.0,
            });
        }
        rows.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));

        (
            Self { year: baseline_year, rows, is_census_baseline: true },
            issues,
        )
    }

    /// Wrap a finalized snapshot read back from the store.
    pub fn finalized(year: SimYear, rows: Vec<WorkforceSnapshotRow>) -> SimResult<Self> {
        let snapshot = Self { year, rows, is_census_baseline: false };
        snapshot.check_shape()?;
        Ok(snapshot)
    }

    /// A prior snapshot that is empty, mixes years or repeats an
    /// employee cannot drive generation.
    pub fn check_shape(&self) -> SimResult<()> {
        if self.rows.is_empty() {
            return Err(SimError::MissingPriorSnapshot { year: self.year + 1 });
        }
        let mut seen = BTreeSet::new();
        for row in &self.rows {
            if row.simulation_year != self.year {
                return Err(SimError::MalformedSnapshot {
                    year: self.year,
                    reason: format!(
                        "row for '{}' belongs to year {}",
                        row.employee_id, row.simulation_year
                    ),
                });
            }
            if !seen.insert(row.employee_id.as_str()) {
                return Err(SimError::MalformedSnapshot {
                    year: self.year,
                    reason: format!("duplicate row for '{}'", row.employee_id),
                });
            }
        }
        Ok(())
    }

    /// Employees still employed at the end of the prior year.
    pub fn active(&self) -> impl Iterator<Item = &WorkforceSnapshotRow> {
        self.rows.iter().filter(|r| r.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }
}
