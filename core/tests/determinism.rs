//! THE MOST IMPORTANT TEST IN THE PROJECT.
//!
//! Two engines, same seed, same census.
//! They must produce identical event logs and snapshots, year by year.
//! Any divergence is a blocker. Do not merge until fixed.

use chrono::NaiveDate;
use plansim_core::{census::CensusRecord, config::SimConfig, engine::SimEngine};

fn census(n: usize) -> Vec<CensusRecord> {
    (0..n)
        .map(|i| {
            let hire_year = 2000 + (i % 24) as i32;
            CensusRecord {
                employee_id: format!("EMP{i:05}"),
                hire_date: NaiveDate::from_ymd_opt(hire_year, 1 + (i % 12) as u32, 1 + (i % 28) as u32),
                birth_date: NaiveDate::from_ymd_opt(hire_year - 22 - (i % 20) as i32, 6, 15).unwrap(),
                job_level: 1 + (i % 5) as u32,
                base_compensation: 50_000.0 + i as f64 * 750.0,
                initial_deferral_rate: if i % 2 == 0 { 0.03 + (i % 4) as f64 * 0.01 } else { 0.0 },
                enrollment_date: None,
            }
        })
        .collect()
}

fn run(scenario_id: &str, seed: u64) -> SimEngine {
    let mut config = SimConfig::default_test();
    config.simulation.random_seed = seed;
    let mut engine = SimEngine::build_with_config(scenario_id, config).expect("engine");
    engine.run(&census(200)).expect("run");
    engine
}

#[test]
fn same_seed_produces_identical_event_logs_and_snapshots() {
    const SEED: u64 = 0xDEAD_BEEF_CAFE_1234;
    let engine_a = run("det", SEED);
    let engine_b = run("det", SEED);

    for year in 2025..=2027 {
        let log_a = engine_a.store().events_for_year("det", year).unwrap();
        let log_b = engine_b.store().events_for_year("det", year).unwrap();
        assert!(!log_a.is_empty(), "year {year} produced no events");
        assert_eq!(log_a.len(), log_b.len(), "Event log lengths differ in {year}");
        for (i, (a, b)) in log_a.iter().zip(log_b.iter()).enumerate() {
            assert_eq!(a, b, "Event log diverged in {year} at entry {i}:\n  A: {a:?}\n  B: {b:?}");
        }

        let snap_a = engine_a.store().snapshot_for_year("det", year, None).unwrap();
        let snap_b = engine_b.store().snapshot_for_year("det", year, None).unwrap();
        assert_eq!(snap_a, snap_b, "Snapshot diverged in {year}");
    }
}

#[test]
fn rerunning_a_scenario_replaces_its_results() {
    let mut engine = run("rerun", 7);
    let first = engine.store().snapshot_for_year("rerun", 2027, None).unwrap();
    let first_events = engine.store().row_count("event_log", "rerun").unwrap();

    engine.run(&census(200)).expect("second run");
    let second = engine.store().snapshot_for_year("rerun", 2027, None).unwrap();
    assert_eq!(first, second);
    assert_eq!(engine.store().row_count("event_log", "rerun").unwrap(), first_events);
    assert_eq!(engine.store().completed_years("rerun").unwrap(), vec![2025, 2026, 2027]);
}

#[test]
fn different_seeds_produce_different_logs() {
    let engine_a = run("seed", 42);
    let engine_b = run("seed", 99);

    let log_a = engine_a.store().events_for_year("seed", 2025).unwrap();
    let log_b = engine_b.store().events_for_year("seed", 2025).unwrap();
    assert_ne!(log_a, log_b, "Different seeds produced identical logs; seed is not being used");
}

#[test]
fn scenarios_with_the_same_seed_share_outcomes() {
    // The scenario id is not part of the draw key.
    let engine_a = run("scenario-a", 5);
    let engine_b = run("scenario-b", 5);
    let a = engine_a.store().snapshot_for_year("scenario-a", 2026, None).unwrap();
    let b = engine_b.store().snapshot_for_year("scenario-b", 2026, None).unwrap();
    assert_eq!(a, b);
}
