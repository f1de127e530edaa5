//! Plan-state accumulation from year N-1's state and year N's log.

use chrono::NaiveDate;
use plansim_core::{
    accumulator::{accumulate, PlanStateRow, PriorState, RateSource},
    error::SimError,
    event::{DataQualityFlag, EnrollmentMethod, EventPayload, EventSource, WorkforceEvent, YearlyEventLog},
    validation::IssueKind,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn enrollment(id: &str, year: i32, date: NaiveDate, rate: f64) -> WorkforceEvent {
    WorkforceEvent::new(
        id,
        year,
        date,
        EventSource::Enrollment,
        EventPayload::Enrollment { deferral_rate: rate, method: EnrollmentMethod::Voluntary },
    )
}

fn escalation(id: &str, year: i32, previous_rate: f64, increment: f64) -> WorkforceEvent {
    WorkforceEvent::new(
        id,
        year,
        d(year, 1, 1),
        EventSource::Escalation,
        EventPayload::Escalation { increment, previous_rate, new_rate: previous_rate + increment },
    )
}

fn hire(id: &str, year: i32, date: NaiveDate) -> WorkforceEvent {
    WorkforceEvent::new(
        id,
        year,
        date,
        EventSource::Hire,
        EventPayload::Hire { job_level: 1, compensation: 50_000.0, birth_date: d(1999, 1, 1) },
    )
}

fn enrolled_state(id: &str, year: i32, rate: f64, escalations: u32) -> PlanStateRow {
    PlanStateRow {
        is_enrolled: true,
        enrollment_date: Some(d(2020, 1, 1)),
        current_deferral_rate: rate,
        escalations_received: escalations,
        rate_source: if escalations > 0 { RateSource::Escalation } else { RateSource::Enrollment },
        ..PlanStateRow::baseline(id, year)
    }
}

fn log(year: i32, events: Vec<WorkforceEvent>) -> YearlyEventLog {
    YearlyEventLog::assemble(year, vec![events])
}

fn find<'a>(rows: &'a [PlanStateRow], id: &str) -> &'a PlanStateRow {
    rows.iter().find(|r| r.employee_id == id).expect("row present")
}

#[test]
fn enrollment_sets_rate_over_baseline() {
    let prior = PriorState::from_rows(vec![PlanStateRow::baseline("E1", 2025)]);
    let events = log(2026, vec![enrollment("E1", 2026, d(2026, 4, 1), 0.05)]);
    let out = accumulate(2026, &prior, &["E1"], &events, false).unwrap();

    let row = find(&out.rows, "E1");
    assert!(row.is_enrolled);
    assert_eq!(row.enrollment_date, Some(d(2026, 4, 1)));
    assert_eq!(row.current_deferral_rate, 0.05);
    assert_eq!(row.rate_source, RateSource::Enrollment);
    assert_eq!(row.simulation_year, 2026);
}

#[test]
fn escalated_rate_is_not_overwritten_by_a_later_enrollment() {
    let prior = PriorState::from_rows(vec![enrolled_state("E1", 2025, 0.08, 2)]);
    let events = log(2026, vec![enrollment("E1", 2026, d(2026, 6, 1), 0.03)]);
    let out = accumulate(2026, &prior, &["E1"], &events, false).unwrap();

    let row = find(&out.rows, "E1");
    assert_eq!(row.current_deferral_rate, 0.08);
    assert_eq!(row.escalations_received, 2);
    assert_eq!(row.enrollment_date, Some(d(2020, 1, 1)));
    assert_eq!(row.rate_source, RateSource::Escalation);
}

#[test]
fn state_carries_forward_without_events() {
    let prior = PriorState::from_rows(vec![
        enrolled_state("E1", 2025, 0.06, 1),
        PlanStateRow::baseline("E2", 2025),
    ]);
    let out = accumulate(2026, &prior, &["E1", "E2"], &YearlyEventLog::default(), false).unwrap();

    assert_eq!(out.rows.len(), 2);
    let e1 = find(&out.rows, "E1");
    assert_eq!(e1.current_deferral_rate, 0.06);
    assert_eq!(e1.escalations_received, 1);
    assert_eq!(e1.simulation_year, 2026);
    assert!(!find(&out.rows, "E2").is_enrolled);
}

#[test]
fn enrollment_and_escalation_in_the_same_year_both_apply() {
    let events = log(
        2025,
        vec![
            enrollment("E1", 2025, d(2022, 5, 1), 0.04).with_flag(DataQualityFlag::SyntheticBackfill),
            escalation("E1", 2025, 0.04, 0.01),
        ],
    );
    let out = accumulate(2025, &PriorState::Baseline, &["E1"], &events, false).unwrap();

    let row = find(&out.rows, "E1");
    assert!(row.is_enrolled);
    assert_eq!(row.enrollment_date, Some(d(2022, 5, 1)));
    assert!((row.current_deferral_rate - 0.05).abs() < 1e-12);
    assert_eq!(row.escalations_received, 1);
    assert_eq!(row.last_escalation_year, Some(2025));
    assert_eq!(row.rate_source, RateSource::Escalation);
}

#[test]
fn escalation_for_a_non_participant_is_ignored() {
    let prior = PriorState::from_rows(vec![PlanStateRow::baseline("E1", 2025)]);
    let events = log(2026, vec![escalation("E1", 2026, 0.0, 0.01)]);
    let out = accumulate(2026, &prior, &["E1"], &events, false).unwrap();

    let row = find(&out.rows, "E1");
    assert!(!row.is_enrolled);
    assert_eq!(row.current_deferral_rate, 0.0);
    assert_eq!(row.escalations_received, 0);
}

#[test]
fn hires_start_from_baseline() {
    let prior = PriorState::from_rows(vec![PlanStateRow::baseline("E1", 2025)]);
    let events = log(2026, vec![hire("NH_2026_000001", 2026, d(2026, 3, 3))]);
    let out = accumulate(2026, &prior, &["E1"], &events, false).unwrap();

    let ids: Vec<&str> = out.rows.iter().map(|r| r.employee_id.as_str()).collect();
    assert_eq!(ids, vec!["E1", "NH_2026_000001"]);
    let hire_row = find(&out.rows, "NH_2026_000001");
    assert_eq!(hire_row.rate_source, RateSource::Baseline);
    assert!(!hire_row.is_enrolled);
}

#[test]
fn missing_prior_state_is_fatal_by_default() {
    let prior = PriorState::from_rows(vec![PlanStateRow::baseline("E1", 2025)]);
    let err = accumulate(2026, &prior, &["E1", "E2"], &YearlyEventLog::default(), false)
        .unwrap_err();
    match err {
        SimError::MissingPriorState { year, employee_id } => {
            assert_eq!(year, 2026);
            assert_eq!(employee_id, "E2");
        }
        other => panic!("expected MissingPriorState, got {other:?}"),
    }
}

#[test]
fn missing_prior_state_is_skipped_when_tolerated() {
    let prior = PriorState::from_rows(vec![PlanStateRow::baseline("E1", 2025)]);
    let events = log(2026, vec![enrollment("E2", 2026, d(2026, 2, 1), 0.04)]);
    let out = accumulate(2026, &prior, &["E1", "E2"], &events, true).unwrap();

    assert_eq!(out.rows.len(), 1);
    assert_eq!(out.rows[0].employee_id, "E1");
    assert_eq!(out.issues.len(), 1);
    assert_eq!(out.issues[0].employee_id, "E2");
    assert_eq!(out.issues[0].kind, IssueKind::MissingPriorState);
}

#[test]
fn tolerated_skips_do_not_affect_other_employees() {
    let prior = PriorState::from_rows(vec![PlanStateRow::baseline("E1", 2025)]);
    let events = log(
        2026,
        vec![
            enrollment("E1", 2026, d(2026, 3, 1), 0.05),
            enrollment("E2", 2026, d(2026, 2, 1), 0.04),
            enrollment("E3", 2026, d(2026, 4, 1), 0.06),
        ],
    );
    let out = accumulate(2026, &prior, &["E1", "E2", "E3"], &events, true).unwrap();

    assert_eq!(out.rows.len(), 1);
    assert!(out.rows[0].is_enrolled);
    assert!((out.rows[0].current_deferral_rate - 0.05).abs() < 1e-12);
    let skipped: Vec<_> = out.issues.iter().map(|i| i.employee_id.as_str()).collect();
    assert_eq!(skipped, vec!["E2", "E3"]);
}

#[test]
fn first_year_seeds_every_continuing_employee() {
    let out = accumulate(2025, &PriorState::Baseline, &["A", "B", "C"], &YearlyEventLog::default(), false)
        .unwrap();
    assert_eq!(out.rows.len(), 3);
    assert!(out.rows.iter().all(|r| r.rate_source == RateSource::Baseline));
    assert!(out.issues.is_empty());
}
