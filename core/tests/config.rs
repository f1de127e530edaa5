//! Layered configuration: merge order, validation, and load errors.

use plansim_core::{
    config::{AutoEnrollmentScope, SimConfig},
    engine::SimEngine,
    error::SimError,
    store::SimStore,
};
use serde_json::json;

fn data_dir() -> String {
    format!("{}/../data", env!("CARGO_MANIFEST_DIR"))
}

fn expect_invalid(result: Result<SimConfig, SimError>, field_prefix: &str) {
    match result {
        Err(SimError::InvalidConfig { field, .. }) => {
            assert!(field.starts_with(field_prefix), "wrong field: {field}")
        }
        Err(other) => panic!("expected InvalidConfig for {field_prefix}, got {other}"),
        Ok(_) => panic!("expected InvalidConfig for {field_prefix}, config accepted"),
    }
}

#[test]
fn later_layers_win_key_by_key() {
    let workspace = json!({ "simulation": { "num_years": 7 }, "plan": { "eligibility_waiting_days": 90 } });
    let scenario = json!({ "simulation": { "random_seed": 99 }, "plan": { "eligibility_waiting_days": 0 } });
    let config = SimConfig::layered(&SimConfig::default(), Some(&workspace), Some(&scenario)).unwrap();

    assert_eq!(config.simulation.num_years, 7);
    assert_eq!(config.simulation.random_seed, 99);
    assert_eq!(config.plan.eligibility_waiting_days, 0);
    // Untouched siblings survive the merge.
    assert_eq!(config.simulation.start_year, SimConfig::default().simulation.start_year);
    assert!(config.plan.auto_enrollment.enabled);
}

#[test]
fn arrays_are_replaced_not_merged() {
    let scenario = json!({
        "plan": { "voluntary_enrollment": { "deferral_rates": [0.07] } }
    });
    let config = SimConfig::layered(&SimConfig::default(), None, Some(&scenario)).unwrap();
    assert_eq!(config.plan.voluntary_enrollment.deferral_rates, vec![0.07]);
}

#[test]
fn escalation_increment_outside_range_is_rejected() {
    let scenario = json!({ "plan": { "escalation": { "increment": 0.5 } } });
    expect_invalid(
        SimConfig::layered(&SimConfig::default(), None, Some(&scenario)),
        "plan.escalation.increment",
    );
}

#[test]
fn non_contiguous_bands_are_rejected() {
    let scenario = json!({
        "bands": { "age_bands": [
            { "label": "<30", "min": 0.0, "max": 30.0 },
            { "label": "35+", "min": 35.0, "max": null }
        ] }
    });
    expect_invalid(SimConfig::layered(&SimConfig::default(), None, Some(&scenario)), "bands.age_bands");
}

#[test]
fn unbounded_band_must_be_last() {
    let mut config = SimConfig::default_test();
    config.bands.tenure_bands[1].max = None;
    match config.validate() {
        Err(SimError::InvalidConfig { field, .. }) => assert_eq!(field, "bands.tenure_bands"),
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
}

#[test]
fn probabilities_outside_unit_interval_are_rejected() {
    let scenario = json!({ "hazards": { "termination": { "base_rate": 1.5 } } });
    expect_invalid(
        SimConfig::layered(&SimConfig::default(), None, Some(&scenario)),
        "hazards.termination.base_rate",
    );
}

#[test]
fn engine_refuses_an_invalid_config_before_any_year() {
    let mut config = SimConfig::default_test();
    config.simulation.num_years = 0;
    let store = SimStore::in_memory().unwrap();
    match SimEngine::build("bad", config, store) {
        Err(SimError::InvalidConfig { field, .. }) => assert_eq!(field, "simulation.num_years"),
        Err(other) => panic!("expected InvalidConfig, got {other}"),
        Ok(_) => panic!("engine accepted a zero-year config"),
    }
}

#[test]
fn negative_catch_up_limit_is_rejected_at_startup() {
    let mut config = SimConfig::default_test();
    for limits in &mut config.irs_limits {
        limits.catch_up_limit = -1.0;
    }
    match SimEngine::build("bad", config, SimStore::in_memory().unwrap()) {
        Err(SimError::InvalidConfig { field, .. }) => assert_eq!(field, "irs_limits.catch_up_limit"),
        Err(other) => panic!("expected InvalidConfig, got {other}"),
        Ok(_) => panic!("engine accepted a negative catch-up limit"),
    }
}

#[test]
fn non_finite_irs_limit_is_rejected() {
    let mut config = SimConfig::default_test();
    config.irs_limits[0].deferral_limit = f64::INFINITY;
    match config.validate() {
        Err(SimError::InvalidConfig { field, .. }) => assert_eq!(field, "irs_limits"),
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
}

#[test]
fn load_resolves_workspace_and_scenario_files() {
    let config = SimConfig::load(&data_dir(), Some("auto_enroll_all")).unwrap();
    assert_eq!(config.simulation.num_years, 5);
    assert_eq!(config.plan.eligibility_waiting_days, 60);
    assert_eq!(config.plan.auto_enrollment.scope, AutoEnrollmentScope::AllEligible);
    assert_eq!(config.plan.auto_enrollment.default_deferral_rate, 0.06);
    assert_eq!(config.plan.employer_match.tiers.len(), 1);
    assert_eq!(config.plan.escalation.max_rate, 0.15);
}

#[test]
fn load_without_a_scenario_uses_workspace_only() {
    let config = SimConfig::load(&data_dir(), None).unwrap();
    assert_eq!(config.plan.eligibility_waiting_days, 60);
    assert_eq!(config.plan.auto_enrollment.scope, AutoEnrollmentScope::NewHiresOnly);
}

#[test]
fn missing_scenario_file_is_an_error() {
    let err = SimConfig::load(&data_dir(), Some("does_not_exist")).unwrap_err();
    assert!(err.to_string().contains("does_not_exist"), "{err}");
}
