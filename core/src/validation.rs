//! Post-generation data-quality validation.
//!
//! Temporal invariants are prevented by construction in the generators
//! and re-checked here. Any failure halts the driver before the year is
//! committed; nothing is silently corrected.

use crate::{
    accumulator::{PlanStateRow, PriorState},
    event::{DataQualityFlag, EventPayload, EventType, YearlyEventLog},
    snapshot::{DetailedStatus, EmploymentStatus, WorkforceSnapshotRow},
    types::{whole_years_between, year_end, year_start, EmployeeId, SimYear},
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Tolerance for rate comparisons.
const RATE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ValidationRule {
    // ── Event log ──────────────────────────────────
    EventYearMismatch,
    EventOutsideYear,
    UnknownEmployee,
    DuplicateEventKey,
    TerminationBeforeHire,
    TerminationAfterYearEnd,
    EnrollmentBeforeHire,
    EscalationBeforeHire,
    MultipleTerminations,
    MultipleEnrollments,
    MultipleEscalations,
    EscalationAboveCap,

    // ── Snapshot / plan state ──────────────────────
    DuplicateSnapshotRow,
    SnapshotYearMismatch,
    TenureMismatch,
    TerminatedMarkedActive,
    DetailedStatusMismatch,
    MissingPlanState,
    DeferralRateDecreased,
    EscalationCountExceeded,
    DeferralRateAboveCap,
}

impl ValidationRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EventYearMismatch => "event_year_mismatch",
            Self::EventOutsideYear => "event_outside_year",
            Self::UnknownEmployee => "unknown_employee",
            Self::DuplicateEventKey => "duplicate_event_key",
            Self::TerminationBeforeHire => "termination_before_hire",
            Self::TerminationAfterYearEnd => "termination_after_year_end",
            Self::EnrollmentBeforeHire => "enrollment_before_hire",
            Self::EscalationBeforeHire => "escalation_before_hire",
            Self::MultipleTerminations => "multiple_terminations",
            Self::MultipleEnrollments => "multiple_enrollments",
            Self::MultipleEscalations => "multiple_escalations",
            Self::EscalationAboveCap => "escalation_above_cap",
            Self::DuplicateSnapshotRow => "duplicate_snapshot_row",
            Self::SnapshotYearMismatch => "snapshot_year_mismatch",
            Self::TenureMismatch => "tenure_mismatch",
            Self::TerminatedMarkedActive => "terminated_marked_active",
            Self::DetailedStatusMismatch => "detailed_status_mismatch",
            Self::MissingPlanState => "missing_plan_state",
            Self::DeferralRateDecreased => "deferral_rate_decreased",
            Self::EscalationCountExceeded => "escalation_count_exceeded",
            Self::DeferralRateAboveCap => "deferral_rate_above_cap",
        }
    }
}

/// One violated rule, with every offending employee and the first
/// offender's expected vs. actual values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationFailure {
    pub rule: ValidationRule,
    pub employee_ids: Vec<EmployeeId>,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} employee(s), first={}): expected {}, actual {}",
            self.rule.as_str(),
            self.employee_ids.len(),
            self.employee_ids.first().map(String::as_str).unwrap_or("-"),
            self.expected,
            self.actual,
        )
    }
}

/// A per-employee problem that excludes the employee but does not halt
/// the run. Persisted for audit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataQualityIssue {
    pub employee_id: EmployeeId,
    pub simulation_year: SimYear,
    pub kind: IssueKind,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingHireDate,
    MissingPriorState,
    NoTerminationWindow,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingHireDate => "missing_hire_date",
            Self::MissingPriorState => "missing_prior_state",
            Self::NoTerminationWindow => "no_termination_window",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "missing_hire_date" => Some(Self::MissingHireDate),
            "missing_prior_state" => Some(Self::MissingPriorState),
            "no_termination_window" => Some(Self::NoTerminationWindow),
            _ => None,
        }
    }
}

/// Groups offenders by rule, keeping the first example of each.
#[derive(Default)]
struct FailureCollector {
    by_rule: BTreeMap<ValidationRule, ValidationFailure>,
}

impl FailureCollector {
    fn push(&mut self, rule: ValidationRule, employee_id: &str, expected: String, actual: String) {
        self.by_rule
            .entry(rule)
            .or_insert_with(|| ValidationFailure {
                rule,
                employee_ids: Vec::new(),
                expected,
                actual,
            })
            .employee_ids
            .push(employee_id.to_string());
    }

    fn finish(self) -> Vec<ValidationFailure> {
        self.by_rule.into_values().collect()
    }
}

/// Check the assembled event log for temporal and cardinality invariants.
///
/// `hire_dates` must cover every employee who can appear in the log:
/// the prior year's active population plus this year's hires.
pub fn validate_event_log(
    log: &YearlyEventLog,
    hire_dates: &BTreeMap<EmployeeId, NaiveDate>,
    escalation_cap: f64,
) -> Vec<ValidationFailure> {
    let year = log.simulation_year;
    let (start, end) = (year_start(year), year_end(year));
    let mut failures = FailureCollector::default();
    let mut keys = BTreeSet::new();
    let mut counts: BTreeMap<(&str, EventType), usize> = BTreeMap::new();

    for e in &log.events {
        let id = e.employee_id.as_str();
        if e.simulation_year != year {
            failures.push(
                ValidationRule::EventYearMismatch,
                id,
                year.to_string(),
                e.simulation_year.to_string(),
            );
        }
        if !keys.insert((id, e.event_sequence)) {
            failures.push(
                ValidationRule::DuplicateEventKey,
                id,
                "unique (employee_id, event_sequence)".into(),
                format!("sequence {} repeated", e.event_sequence),
            );
        }
        *counts.entry((id, e.event_type)).or_insert(0) += 1;

        let backfill = e.data_quality_flag == DataQualityFlag::SyntheticBackfill;
        if !backfill && (e.effective_date < start || e.effective_date > end) {
            failures.push(
                ValidationRule::EventOutsideYear,
                id,
                format!("{start}..={end}"),
                e.effective_date.to_string(),
            );
        }

        let Some(hire_date) = hire_dates.get(id) else {
            failures.push(
                ValidationRule::UnknownEmployee,
                id,
                "employee in prior snapshot or hired this year".into(),
                format!("{} event for unknown employee", e.event_type.as_str()),
            );
            continue;
        };

        match e.event_type {
            EventType::Termination => {
                if e.effective_date < *hire_date {
                    failures.push(
                        ValidationRule::TerminationBeforeHire,
                        id,
                        format!(">= {hire_date}"),
                        e.effective_date.to_string(),
                    );
                }
                if e.effective_date > end {
                    failures.push(
                        ValidationRule::TerminationAfterYearEnd,
                        id,
                        format!("<= {end}"),
                        e.effective_date.to_string(),
                    );
                }
            }
            EventType::Enrollment if e.effective_date < *hire_date => {
                failures.push(
                    ValidationRule::EnrollmentBeforeHire,
                    id,
                    format!(">= {hire_date}"),
                    e.effective_date.to_string(),
                );
            }
            EventType::Escalation => {
                if e.effective_date < *hire_date {
                    failures.push(
                        ValidationRule::EscalationBeforeHire,
                        id,
                        format!(">= {hire_date}"),
                        e.effective_date.to_string(),
                    );
                }
                if let EventPayload::Escalation { new_rate, .. } = &e.payload {
                    if *new_rate > escalation_cap + RATE_EPSILON {
                        failures.push(
                            ValidationRule::EscalationAboveCap,
                            id,
                            format!("<= {escalation_cap}"),
                            new_rate.to_string(),
                        );
                    }
                }
            }
            _ => {}
        }
    }

    for ((id, event_type), n) in counts {
        let rule = match event_type {
            EventType::Termination => ValidationRule::MultipleTerminations,
            EventType::Enrollment => ValidationRule::MultipleEnrollments,
            EventType::Escalation => ValidationRule::MultipleEscalations,
            _ => continue,
        };
        if n > 1 {
            failures.push(rule, id, "at most 1".into(), n.to_string());
        }
    }

    failures.finish()
}

/// Limits the snapshot checks need from the plan design.
#[derive(Debug, Clone, Copy)]
pub struct EscalationLimits {
    pub max_escalations: u32,
    pub max_rate: f64,
}

/// Check a built snapshot and its plan state against the event log and
/// year N-1's plan state.
pub fn validate_snapshot(
    year: SimYear,
    rows: &[WorkforceSnapshotRow],
    log: &YearlyEventLog,
    plan_state: &[PlanStateRow],
    prior_state: &PriorState,
    limits: EscalationLimits,
) -> Vec<ValidationFailure> {
    let mut failures = FailureCollector::default();
    let mut seen = BTreeSet::new();
    let terminated_in_log: BTreeSet<&str> = log
        .of_type(EventType::Termination)
        .map(|e| e.employee_id.as_str())
        .collect();
    let state_ids: BTreeSet<&str> = plan_state.iter().map(|r| r.employee_id.as_str()).collect();

    for row in rows {
        let id = row.employee_id.as_str();
        if !seen.insert(id) {
            failures.push(
                ValidationRule::DuplicateSnapshotRow,
                id,
                "one row per employee".into(),
                "duplicate".into(),
            );
        }
        if row.simulation_year != year {
            failures.push(
                ValidationRule::SnapshotYearMismatch,
                id,
                year.to_string(),
                row.simulation_year.to_string(),
            );
        }

        let end_date = row.termination_date.unwrap_or_else(|| year_end(year));
        let expected_tenure = whole_years_between(row.hire_date, end_date);
        if row.current_tenure != expected_tenure {
            failures.push(
                ValidationRule::TenureMismatch,
                id,
                expected_tenure.to_string(),
                row.current_tenure.to_string(),
            );
        }
        if let Some(term) = row.termination_date {
            if term < row.hire_date {
                failures.push(
                    ValidationRule::TerminationBeforeHire,
                    id,
                    format!(">= {}", row.hire_date),
                    term.to_string(),
                );
            }
        }

        let should_be_terminated = terminated_in_log.contains(id) || row.termination_date.is_some();
        if should_be_terminated && row.employment_status != EmploymentStatus::Terminated {
            failures.push(
                ValidationRule::TerminatedMarkedActive,
                id,
                "terminated".into(),
                row.employment_status.as_str().into(),
            );
        }

        let hired_this_year = row.hire_date.year() == year;
        let expected_detail = DetailedStatus::classify(row.employment_status, hired_this_year);
        if row.detailed_status != expected_detail {
            failures.push(
                ValidationRule::DetailedStatusMismatch,
                id,
                expected_detail.as_str().into(),
                row.detailed_status.as_str().into(),
            );
        }

        if !state_ids.contains(id) {
            failures.push(
                ValidationRule::MissingPlanState,
                id,
                "plan state row".into(),
                "none".into(),
            );
        }
    }

    for state in plan_state {
        let id = state.employee_id.as_str();
        if let Some(prior) = prior_state.get(id) {
            if prior.is_enrolled
                && state.current_deferral_rate + RATE_EPSILON < prior.current_deferral_rate
            {
                failures.push(
                    ValidationRule::DeferralRateDecreased,
                    id,
                    format!(">= {}", prior.current_deferral_rate),
                    state.current_deferral_rate.to_string(),
                );
            }
        }
        if state.escalations_received > limits.max_escalations {
            failures.push(
                ValidationRule::EscalationCountExceeded,
                id,
                format!("<= {}", limits.max_escalations),
                state.escalations_received.to_string(),
            );
        }
        if state.escalations_received > 0
            && state.current_deferral_rate > limits.max_rate + RATE_EPSILON
        {
            failures.push(
                ValidationRule::DeferralRateAboveCap,
                id,
                format!("<= {}", limits.max_rate),
                state.current_deferral_rate.to_string(),
            );
        }
    }

    failures.finish()
}
