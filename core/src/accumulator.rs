//! Temporal state accumulator.
//!
//! accumulate(prior_state, current_year_events) → current_state
//!
//! RULE: year N reads only year N-1's finalized plan state and year N's
//! finalized event log. It never reads a year-N snapshot.
//!
//! Deferral-rate resolution order (first match wins):
//!   1. Escalation state: a rate already moved by escalation, plus any
//!      escalation event this year.
//!   2. An enrollment event in this year's log.
//!   3. The carried-forward / baseline rate (0.0 when never enrolled).

use crate::{
    error::{SimError, SimResult},
    event::{EventPayload, EventType, YearlyEventLog},
    types::{round_rate, EmployeeId, SimYear},
    validation::{DataQualityIssue, IssueKind},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Which source set the current deferral rate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    Baseline,
    Enrollment,
    Escalation,
}

impl RateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Enrollment => "enrollment",
            Self::Escalation => "escalation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "baseline" => Some(Self::Baseline),
            "enrollment" => Some(Self::Enrollment),
            "escalation" => Some(Self::Escalation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanStateRow {
    pub employee_id: EmployeeId,
    pub simulation_year: SimYear,
    pub is_enrolled: bool,
    pub enrollment_date: Option<NaiveDate>,
    pub current_deferral_rate: f64,
    pub escalations_received: u32,
    pub total_escalation_amount: f64,
    pub last_escalation_year: Option<SimYear>,
    pub rate_source: RateSource,
}

impl PlanStateRow {
    /// The state of an employee with no history.
    pub fn baseline(employee_id: &str, simulation_year: SimYear) -> Self {
        Self {
            employee_id: employee_id.to_string(),
            simulation_year,
            is_enrolled: false,
            enrollment_date: None,
            current_deferral_rate: 0.0,
            escalations_received: 0,
            total_escalation_amount: 0.0,
            last_escalation_year: None,
            rate_source: RateSource::Baseline,
        }
    }
}

/// The accumulator's view of year N-1.
#[derive(Debug, Clone)]
pub enum PriorState {
    /// First simulation year: everyone starts from baseline.
    Baseline,
    /// Year N-1's finalized plan state, keyed by employee.
    Finalized(BTreeMap<EmployeeId, PlanStateRow>),
}

impl PriorState {
    pub fn get(&self, employee_id: &str) -> Option<&PlanStateRow> {
        match self {
            Self::Baseline => None,
            Self::Finalized(map) => map.get(employee_id),
        }
    }

    pub fn from_rows(rows: Vec<PlanStateRow>) -> Self {
        Self::Finalized(
            rows.into_iter()
                .map(|r| (r.employee_id.clone(), r))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccumulatorOutput {
    pub rows: Vec<PlanStateRow>,
    pub issues: Vec<DataQualityIssue>,
}

/// Produce year N's plan state.
///
/// `continuing` is the set of employees active at the end of year N-1.
/// Output covers every employee in prior_state ∪ continuing ∪ this year's
/// hires, one row each, ordered by employee_id.
pub fn accumulate(
    year: SimYear,
    prior: &PriorState,
    continuing: &[&str],
    events: &YearlyEventLog,
    tolerate_partial_failures: bool,
) -> SimResult<AccumulatorOutput> {
    let mut out = AccumulatorOutput::default();
    let mut state: BTreeMap<EmployeeId, PlanStateRow> = BTreeMap::new();

    if let PriorState::Finalized(rows) = prior {
        for (id, row) in rows {
            state.insert(id.clone(), PlanStateRow { simulation_year: year, ..row.clone() });
        }
    }

    let mut skipped: BTreeSet<&str> = BTreeSet::new();
    for id in continuing {
        if state.contains_key(*id) {
            continue;
        }
        match prior {
            PriorState::Baseline => {
                state.insert(id.to_string(), PlanStateRow::baseline(id, year));
            }
            PriorState::Finalized(_) => {
                if !tolerate_partial_failures {
                    return Err(SimError::MissingPriorState {
                        year,
                        employee_id: id.to_string(),
                    });
                }
                log::warn!("year={year} accumulator: no prior state for {id}, skipped");
                out.issues.push(DataQualityIssue {
                    employee_id: id.to_string(),
                    simulation_year: year,
                    kind: IssueKind::MissingPriorState,
                    detail: format!("no plan state for year {}", year - 1),
                });
                skipped.insert(*id);
            }
        }
    }

    for hire in events.of_type(EventType::Hire) {
        state
            .entry(hire.employee_id.clone())
            .or_insert_with(|| PlanStateRow::baseline(&hire.employee_id, year));
    }

    for (employee_id, employee_events) in events.by_employee() {
        if skipped.contains(&employee_id) {
            continue;
        }
        let Some(row) = state.get_mut(employee_id) else {
            continue;
        };

        for event in employee_events {
            match &event.payload {
                EventPayload::Enrollment { deferral_rate, .. } => {
                    if row.is_enrolled {
                        log::debug!(
                            "year={year} accumulator: {employee_id} already enrolled, enrollment ignored"
                        );
                        continue;
                    }
                    row.is_enrolled = true;
                    row.enrollment_date = Some(event.effective_date);
                    if row.rate_source != RateSource::Escalation {
                        row.current_deferral_rate = *deferral_rate;
                        row.rate_source = RateSource::Enrollment;
                    }
                }
                EventPayload::Escalation { increment, .. } => {
                    if !row.is_enrolled {
                        continue;
                    }
                    row.current_deferral_rate = round_rate(row.current_deferral_rate + increment);
                    row.escalations_received += 1;
                    row.total_escalation_amount = round_rate(row.total_escalation_amount + increment);
                    row.last_escalation_year = Some(year);
                    row.rate_source = RateSource::Escalation;
                }
                _ => {}
            }
        }
    }

    out.rows = state.into_values().collect();
    log::debug!(
        "year={year} accumulator: {} rows ({} enrolled)",
        out.rows.len(),
        out.rows.iter().filter(|r| r.is_enrolled).count()
    );
    Ok(out)
}
