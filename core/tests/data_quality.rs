//! Data-quality issues, checkpoints, and census persistence on the
//! bundled sample census.

use plansim_core::{
    census::load_census,
    engine::SimEngine,
    validation::IssueKind,
};

const SCENARIO: &str = "sample";

fn sample_census_path() -> String {
    format!("{}/../data/census.json", env!("CARGO_MANIFEST_DIR"))
}

fn run_sample() -> SimEngine {
    let census = load_census(&sample_census_path()).expect("sample census");
    let mut engine = SimEngine::build_test(SCENARIO).expect("engine");
    engine.run(&census).expect("run");
    engine
}

#[test]
fn null_hire_date_is_flagged_and_excluded() {
    let engine = run_sample();
    let issues = engine.store().data_quality_issues(SCENARIO).unwrap();
    let missing: Vec<_> = issues.iter().filter(|i| i.kind == IssueKind::MissingHireDate).collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].employee_id, "EMP09999");
    assert_eq!(missing[0].simulation_year, 2025);

    for year in 2025..=2027 {
        let rows = engine.store().snapshot_for_year(SCENARIO, year, None).unwrap();
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|r| r.employee_id != "EMP09999"), "year {year}");
        let events = engine.store().events_for_year(SCENARIO, year).unwrap();
        assert!(events.iter().all(|e| e.employee_id != "EMP09999"), "year {year}");
    }
}

#[test]
fn checkpoints_match_committed_rows() {
    let engine = run_sample();
    assert_eq!(engine.store().completed_years(SCENARIO).unwrap(), vec![2025, 2026, 2027]);

    for year in 2025..=2027 {
        let checkpoint = engine.store().checkpoint(SCENARIO, year).unwrap().expect("checkpoint");
        let rows = engine.store().snapshot_for_year(SCENARIO, year, None).unwrap();
        let events = engine.store().events_for_year(SCENARIO, year).unwrap();
        assert_eq!(checkpoint.simulation_year, year);
        assert_eq!(checkpoint.snapshot_rows, rows.len());
        assert_eq!(checkpoint.event_count, events.len());
        assert_eq!(checkpoint.active_count, rows.iter().filter(|r| r.is_active()).count());
    }
    assert!(engine.store().checkpoint(SCENARIO, 2028).unwrap().is_none());
}

#[test]
fn census_is_stored_as_given() {
    let engine = run_sample();
    let mut expected = load_census(&sample_census_path()).unwrap();
    let mut stored = engine.store().census(SCENARIO).unwrap();
    expected.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));
    stored.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));
    assert_eq!(stored, expected);
}

#[test]
fn every_employee_has_a_compensation_baseline() {
    let engine = run_sample();
    let baselines = engine.store().compensation_baselines(SCENARIO).unwrap();
    for year in 2025..=2027 {
        for row in engine.store().snapshot_for_year(SCENARIO, year, None).unwrap() {
            assert!(baselines.contains_key(&row.employee_id), "{} has no baseline", row.employee_id);
        }
    }
    assert!(!baselines.contains_key("EMP09999"));
}
