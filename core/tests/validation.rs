//! Event-log validation, and the driver halting on a failed year.

use chrono::{Datelike, NaiveDate};
use plansim_core::{
    accumulator::{PlanStateRow, PriorState, RateSource},
    census::CensusRecord,
    config::SimConfig,
    engine::SimEngine,
    error::{SimError, SimResult},
    event::{
        EnrollmentMethod, EventPayload, EventSource, TerminationReason, WorkforceEvent,
        YearlyEventLog,
    },
    generator::{EventGenerator, GeneratorContext, GeneratorOutput},
    snapshot::{CompensationQualityFlag, DetailedStatus, EmploymentStatus, WorkforceSnapshotRow},
    store::{RunStatus, SimStore},
    types::{whole_years_between, year_end},
    validation::{validate_event_log, validate_snapshot, EscalationLimits, ValidationRule},
};
use std::collections::BTreeMap;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn termination(id: &str, date: NaiveDate) -> WorkforceEvent {
    WorkforceEvent::new(
        id,
        date.year(),
        date,
        EventSource::Termination,
        EventPayload::Termination { reason: TerminationReason::Involuntary, probability: 1.0 },
    )
}

fn rules(log: &YearlyEventLog, hire_dates: &BTreeMap<String, NaiveDate>) -> Vec<ValidationRule> {
    validate_event_log(log, hire_dates, 0.10).into_iter().map(|f| f.rule).collect()
}

#[test]
fn termination_before_hire_is_caught() {
    let hire_dates = BTreeMap::from([("E1".to_string(), d(2025, 6, 1))]);
    let log = YearlyEventLog::assemble(2025, vec![vec![termination("E1", d(2025, 3, 1))]]);
    assert_eq!(rules(&log, &hire_dates), vec![ValidationRule::TerminationBeforeHire]);
}

#[test]
fn events_for_unknown_employees_are_caught() {
    let log = YearlyEventLog::assemble(2025, vec![vec![termination("GHOST", d(2025, 3, 1))]]);
    assert_eq!(rules(&log, &BTreeMap::new()), vec![ValidationRule::UnknownEmployee]);
}

#[test]
fn two_enrollments_in_one_year_are_caught() {
    let enroll = |date| {
        WorkforceEvent::new(
            "E1",
            2025,
            date,
            EventSource::Enrollment,
            EventPayload::Enrollment { deferral_rate: 0.04, method: EnrollmentMethod::Voluntary },
        )
    };
    let hire_dates = BTreeMap::from([("E1".to_string(), d(2010, 1, 1))]);
    let log = YearlyEventLog::assemble(2025, vec![vec![enroll(d(2025, 2, 1)), enroll(d(2025, 8, 1))]]);
    assert_eq!(rules(&log, &hire_dates), vec![ValidationRule::MultipleEnrollments]);
}

#[test]
fn escalation_past_the_cap_is_caught() {
    let hire_dates = BTreeMap::from([("E1".to_string(), d(2010, 1, 1))]);
    let event = WorkforceEvent::new(
        "E1",
        2025,
        d(2025, 1, 1),
        EventSource::Escalation,
        EventPayload::Escalation { increment: 0.02, previous_rate: 0.09, new_rate: 0.11 },
    );
    let log = YearlyEventLog::assemble(2025, vec![vec![event]]);
    let failures = validate_event_log(&log, &hire_dates, 0.10);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].rule, ValidationRule::EscalationAboveCap);
    assert_eq!(failures[0].employee_ids, vec!["E1".to_string()]);
    assert_eq!(failures[0].actual, "0.11");
}

#[test]
fn a_clean_log_passes() {
    let hire_dates = BTreeMap::from([("E1".to_string(), d(2010, 1, 1))]);
    let log = YearlyEventLog::assemble(2025, vec![vec![termination("E1", d(2025, 5, 5))]]);
    assert!(validate_event_log(&log, &hire_dates, 0.10).is_empty());
}

const LIMITS: EscalationLimits = EscalationLimits { max_escalations: 4, max_rate: 0.10 };

/// A consistent 2025 row for an employee hired in 2010.
fn snapshot_row(id: &str) -> WorkforceSnapshotRow {
    let hire_date = d(2010, 1, 1);
    WorkforceSnapshotRow {
        employee_id: id.into(),
        simulation_year: 2025,
        hire_date,
        birth_date: d(1980, 4, 4),
        termination_date: None,
        termination_reason: None,
        employment_status: EmploymentStatus::Active,
        detailed_status: DetailedStatus::ContinuousActive,
        job_level: 2,
        current_age: 45,
        current_tenure: whole_years_between(hire_date, year_end(2025)),
        age_band: "45-54".into(),
        tenure_band: "10-19".into(),
        starting_compensation: 60_000.0,
        current_compensation: 60_000.0,
        prorated_compensation: 60_000.0,
        compensation_quality_flag: CompensationQualityFlag::Normal,
        is_enrolled: false,
        enrollment_date: None,
        current_deferral_rate: 0.0,
        escalations_received: 0,
        employee_contribution: 0.0,
        employer_match: 0.0,
        employer_core: 0.0,
    }
}

fn enrolled_state(id: &str, rate: f64, escalations: u32) -> PlanStateRow {
    PlanStateRow {
        is_enrolled: true,
        enrollment_date: Some(d(2015, 1, 1)),
        current_deferral_rate: rate,
        escalations_received: escalations,
        rate_source: if escalations > 0 { RateSource::Escalation } else { RateSource::Enrollment },
        ..PlanStateRow::baseline(id, 2025)
    }
}

fn snapshot_rules(
    rows: &[WorkforceSnapshotRow],
    log: &YearlyEventLog,
    state: &[PlanStateRow],
    prior: &PriorState,
) -> Vec<ValidationRule> {
    validate_snapshot(2025, rows, log, state, prior, LIMITS)
        .into_iter()
        .map(|f| f.rule)
        .collect()
}

fn empty_log() -> YearlyEventLog {
    YearlyEventLog::assemble(2025, vec![])
}

#[test]
fn a_consistent_snapshot_passes() {
    let rows = vec![snapshot_row("E1")];
    let state = vec![PlanStateRow::baseline("E1", 2025)];
    assert!(snapshot_rules(&rows, &empty_log(), &state, &PriorState::Baseline).is_empty());
}

#[test]
fn tenure_carried_over_from_last_year_is_caught() {
    let mut row = snapshot_row("E1");
    row.current_tenure -= 1;
    let state = vec![PlanStateRow::baseline("E1", 2025)];
    let failures = validate_snapshot(2025, &[row], &empty_log(), &state, &PriorState::Baseline, LIMITS);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].rule, ValidationRule::TenureMismatch);
    assert_eq!(failures[0].expected, whole_years_between(d(2010, 1, 1), year_end(2025)).to_string());
}

#[test]
fn terminated_employee_left_active_is_caught() {
    // The log terminates E1 but the row never picked it up.
    let log = YearlyEventLog::assemble(2025, vec![vec![termination("E1", d(2025, 5, 5))]]);
    let rows = vec![snapshot_row("E1")];
    let state = vec![PlanStateRow::baseline("E1", 2025)];
    assert_eq!(
        snapshot_rules(&rows, &log, &state, &PriorState::Baseline),
        vec![ValidationRule::TerminatedMarkedActive]
    );
}

#[test]
fn detailed_status_disagreeing_with_hire_year_is_caught() {
    let mut row = snapshot_row("E1");
    row.detailed_status = DetailedStatus::NewHireActive;
    let state = vec![PlanStateRow::baseline("E1", 2025)];
    assert_eq!(
        snapshot_rules(&[row], &empty_log(), &state, &PriorState::Baseline),
        vec![ValidationRule::DetailedStatusMismatch]
    );
}

#[test]
fn deferral_rate_dropping_below_last_year_is_caught() {
    let prior = PriorState::from_rows(vec![PlanStateRow {
        simulation_year: 2024,
        ..enrolled_state("E1", 0.08, 2)
    }]);
    let state = vec![enrolled_state("E1", 0.06, 2)];
    assert_eq!(
        snapshot_rules(&[snapshot_row("E1")], &empty_log(), &state, &prior),
        vec![ValidationRule::DeferralRateDecreased]
    );
}

#[test]
fn too_many_escalations_are_caught() {
    let state = vec![enrolled_state("E1", 0.09, LIMITS.max_escalations + 1)];
    assert_eq!(
        snapshot_rules(&[snapshot_row("E1")], &empty_log(), &state, &PriorState::Baseline),
        vec![ValidationRule::EscalationCountExceeded]
    );
}

#[test]
fn escalated_rate_above_the_cap_is_caught() {
    let state = vec![enrolled_state("E1", 0.12, 1)];
    let failures = validate_snapshot(
        2025,
        &[snapshot_row("E1")],
        &empty_log(),
        &state,
        &PriorState::Baseline,
        LIMITS,
    );
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].rule, ValidationRule::DeferralRateAboveCap);
    assert_eq!(failures[0].actual, "0.12");
}

#[test]
fn census_rate_above_the_cap_without_escalations_passes() {
    let state = vec![enrolled_state("E1", 0.12, 0)];
    assert!(snapshot_rules(&[snapshot_row("E1")], &empty_log(), &state, &PriorState::Baseline)
        .is_empty());
}

/// Terminates E1 on a fixed date regardless of its hire date.
struct RogueTermination;

impl EventGenerator for RogueTermination {
    fn source(&self) -> EventSource {
        EventSource::Termination
    }

    fn generate(&self, ctx: &GeneratorContext<'_>) -> SimResult<GeneratorOutput> {
        Ok(GeneratorOutput {
            events: vec![termination("E1", d(ctx.simulation_year, 3, 1))],
            issues: Vec::new(),
        })
    }
}

#[test]
fn a_failed_year_halts_the_run_and_commits_nothing() {
    let census = vec![CensusRecord {
        employee_id: "E1".into(),
        hire_date: Some(d(2025, 6, 1)),
        birth_date: d(1990, 1, 1),
        job_level: 1,
        base_compensation: 50_000.0,
        initial_deferral_rate: 0.0,
        enrollment_date: None,
    }];
    let mut engine = SimEngine::new("halt", SimConfig::default_test(), SimStore::in_memory().unwrap())
        .unwrap();
    engine.store().migrate().unwrap();
    engine.register(Box::new(RogueTermination));

    match engine.run(&census) {
        Err(SimError::ValidationFailed { year, failures }) => {
            assert_eq!(year, 2025);
            assert!(failures.iter().any(|f| f.rule == ValidationRule::TerminationBeforeHire
                && f.employee_ids == vec!["E1".to_string()]));
        }
        other => panic!("expected ValidationFailed, got {other:?}"),
    }

    let store = engine.store();
    assert!(store.completed_years("halt").unwrap().is_empty());
    assert_eq!(store.row_count("event_log", "halt").unwrap(), 0);
    assert_eq!(store.row_count("workforce_snapshot", "halt").unwrap(), 0);
    assert_eq!(store.run_status("halt").unwrap(), Some(RunStatus::Halted));
    assert!(engine.clock.is_terminal());
}
