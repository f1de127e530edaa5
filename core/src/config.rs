//! Scenario configuration.
//!
//! Three layers, resolved once at scenario start:
//!   global defaults → workspace overrides → scenario overrides.
//! Later layers win key-by-key; arrays are replaced wholesale.
//! The resolved config is validated before any year executes.

use crate::{
    error::{config_err, SimResult},
    types::SimYear,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

// ── Simulation control ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    pub start_year: SimYear,
    pub num_years: u32,
    pub random_seed: u64,
    /// When false (default), a data-completeness failure for any
    /// employee is fatal for the whole year.
    pub tolerate_partial_failures: bool,
}

impl SimulationConfig {
    pub fn end_year(&self) -> SimYear {
        self.start_year + self.num_years as SimYear - 1
    }
}

// ── Workforce dynamics ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LevelWeight {
    pub level: u32,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompensationRange {
    pub level: u32,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkforceConfig {
    /// Net headcount growth per year, e.g. 0.03 = +3%.
    pub target_growth_rate: f64,
    /// Probability a new hire terminates within their hire year.
    pub new_hire_termination_rate: f64,
    /// Share of terminations classified involuntary.
    pub involuntary_share: f64,
    pub new_hire_levels: Vec<LevelWeight>,
    pub new_hire_age_min: u32,
    pub new_hire_age_max: u32,
    pub compensation_by_level: Vec<CompensationRange>,
}

// ── Hazards ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TerminationHazard {
    pub base_rate: f64,
    /// Keyed by age band label; a missing band means 1.0.
    pub age_multipliers: BTreeMap<String, f64>,
    /// Keyed by tenure band label; a missing band means 1.0.
    pub tenure_multipliers: BTreeMap<String, f64>,
    /// Keyed by job level; a missing level means 1.0.
    pub level_multipliers: BTreeMap<u32, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromotionHazard {
    pub base_rate: f64,
    pub age_multipliers: BTreeMap<String, f64>,
    pub tenure_multipliers: BTreeMap<String, f64>,
    /// Probability shrinks by this fraction per level above 1.
    pub level_dampener: f64,
    pub max_level: u32,
    pub min_increase_pct: f64,
    pub max_increase_pct: f64,
    pub effective_month: u32,
    pub effective_day: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeritHazard {
    /// Probability an active employee receives a merit raise.
    pub eligibility_rate: f64,
    /// Keyed by job level; overrides `eligibility_rate`.
    #[serde(default)]
    pub level_eligibility: BTreeMap<u32, f64>,
    pub cola_rate: f64,
    pub mean_raise_pct: f64,
    pub std_dev_pct: f64,
    pub floor_pct: f64,
    pub cap_pct: f64,
    pub effective_month: u32,
    pub effective_day: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HazardConfig {
    pub version: String,
    pub termination: TerminationHazard,
    pub promotion: PromotionHazard,
    pub merit: MeritHazard,
}

// ── Bands ──────────────────────────────────────────────────────────

/// A half-open band `[min, max)`. `max = None` is unbounded above.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Band {
    pub label: String,
    pub min: f64,
    pub max: Option<f64>,
}

impl Band {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && self.max.map_or(true, |max| value < max)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BandConfig {
    pub age_bands: Vec<Band>,
    pub tenure_bands: Vec<Band>,
}

// ── Plan design ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AutoEnrollmentScope {
    NewHiresOnly,
    AllEligible,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutoEnrollmentConfig {
    pub enabled: bool,
    pub default_deferral_rate: f64,
    pub opt_out_rate: f64,
    pub scope: AutoEnrollmentScope,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoluntaryEnrollmentConfig {
    pub enabled: bool,
    pub annual_rate: f64,
    pub deferral_rates: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EscalationConfig {
    pub enabled: bool,
    pub increment: f64,
    pub max_rate: f64,
    pub max_escalations: u32,
    pub first_escalation_delay_years: u32,
    pub min_tenure_years: u32,
    pub min_age: u32,
    /// Increments below this are suppressed.
    pub materiality_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchTier {
    /// Deferral range `[employee_min, employee_max)` this tier matches.
    pub employee_min: f64,
    pub employee_max: f64,
    pub match_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchFormula {
    pub tiers: Vec<MatchTier>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoreContributionConfig {
    pub enabled: bool,
    pub rate: f64,
    pub min_tenure_years: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanDesignConfig {
    pub eligibility_waiting_days: u32,
    pub auto_enrollment: AutoEnrollmentConfig,
    pub voluntary_enrollment: VoluntaryEnrollmentConfig,
    pub escalation: EscalationConfig,
    pub employer_match: MatchFormula,
    pub employer_core: CoreContributionConfig,
}

// ── IRS limits ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IrsLimits {
    pub plan_year: SimYear,
    /// §401(a)(17) compensation cap.
    pub compensation_limit: f64,
    /// §402(g) elective deferral cap.
    pub deferral_limit: f64,
    pub catch_up_limit: f64,
    pub catch_up_age: u32,
    /// §415(c) annual additions limit.
    pub annual_additions_limit: f64,
}

// ── Root ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimConfig {
    pub simulation: SimulationConfig,
    pub workforce: WorkforceConfig,
    pub hazards: HazardConfig,
    pub bands: BandConfig,
    pub plan: PlanDesignConfig,
    pub irs_limits: Vec<IrsLimits>,
}

impl SimConfig {
    /// Load and resolve the three config layers from `data_dir`.
    ///
    /// - `{data_dir}/global.json`              (optional, full config)
    /// - `{data_dir}/workspace.json`           (optional, partial overrides)
    /// - `{data_dir}/scenarios/{scenario}.json` (required when `scenario` is set)
    ///
    /// In tests, use SimConfig::default_test().
    pub fn load(data_dir: &str, scenario: Option<&str>) -> anyhow::Result<Self> {
        let global_path = format!("{data_dir}/global.json");
        let global = match read_json_opt(&global_path)? {
            Some(v) => serde_json::from_value(v)
                .map_err(|e| anyhow::anyhow!("Cannot parse {global_path}: {e}"))?,
            None => SimConfig::default(),
        };

        let workspace = read_json_opt(&format!("{data_dir}/workspace.json"))?;

        let scenario_layer = match scenario {
            Some(name) => {
                let path = format!("{data_dir}/scenarios/{name}.json");
                Some(
                    read_json_opt(&path)?
                        .ok_or_else(|| anyhow::anyhow!("Cannot read {path}: not found"))?,
                )
            }
            None => None,
        };

        let config = Self::layered(&global, workspace.as_ref(), scenario_layer.as_ref())?;
        log::info!(
            "config: resolved (workspace={}, scenario={})",
            workspace.is_some(),
            scenario.unwrap_or("-"),
        );
        Ok(config)
    }

    /// Merge overrides onto `global` in order and validate the result.
    pub fn layered(
        global: &SimConfig,
        workspace: Option<&Value>,
        scenario: Option<&Value>,
    ) -> SimResult<Self> {
        let mut merged = serde_json::to_value(global)?;
        for layer in [workspace, scenario].into_iter().flatten() {
            merge_json(&mut merged, layer);
        }
        let config: SimConfig = serde_json::from_value(merged)?;
        config.validate()?;
        Ok(config)
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        let mut c = Self::default();
        c.simulation.start_year = 2025;
        c.simulation.num_years = 3;
        c.simulation.random_seed = 42;
        c
    }

    /// Reject malformed or out-of-range parameters.
    pub fn validate(&self) -> SimResult<()> {
        let s = &self.simulation;
        if s.num_years == 0 {
            return Err(config_err("simulation.num_years", "must be at least 1"));
        }

        let w = &self.workforce;
        check_unit("workforce.new_hire_termination_rate", w.new_hire_termination_rate)?;
        if w.new_hire_termination_rate >= 1.0 {
            return Err(config_err("workforce.new_hire_termination_rate", "must be below 1"));
        }
        check_unit("workforce.involuntary_share", w.involuntary_share)?;
        if w.target_growth_rate <= -1.0 || w.target_growth_rate > 1.0 {
            return Err(config_err("workforce.target_growth_rate", "must be in (-1, 1]"));
        }
        if w.new_hire_levels.is_empty() || w.new_hire_levels.iter().all(|l| l.weight <= 0.0) {
            return Err(config_err("workforce.new_hire_levels", "needs a positive weight"));
        }
        if w.new_hire_levels.iter().any(|l| l.weight < 0.0) {
            return Err(config_err("workforce.new_hire_levels", "weights must be non-negative"));
        }
        if w.new_hire_age_min > w.new_hire_age_max {
            return Err(config_err("workforce.new_hire_age_min", "exceeds new_hire_age_max"));
        }
        for lw in &w.new_hire_levels {
            match w.compensation_by_level.iter().find(|c| c.level == lw.level) {
                Some(range) if range.min <= range.max && range.min >= 0.0 => {}
                Some(_) => {
                    return Err(config_err(
                        "workforce.compensation_by_level",
                        format!("level {} has an invalid range", lw.level),
                    ))
                }
                None => {
                    return Err(config_err(
                        "workforce.compensation_by_level",
                        format!("no range for new-hire level {}", lw.level),
                    ))
                }
            }
        }

        let h = &self.hazards;
        if h.version.trim().is_empty() {
            return Err(config_err("hazards.version", "must not be empty"));
        }
        check_unit("hazards.termination.base_rate", h.termination.base_rate)?;
        check_multipliers("hazards.termination.age_multipliers", h.termination.age_multipliers.values())?;
        check_multipliers("hazards.termination.tenure_multipliers", h.termination.tenure_multipliers.values())?;
        check_multipliers("hazards.termination.level_multipliers", h.termination.level_multipliers.values())?;
        check_unit("hazards.promotion.base_rate", h.promotion.base_rate)?;
        check_unit("hazards.promotion.level_dampener", h.promotion.level_dampener)?;
        check_multipliers("hazards.promotion.age_multipliers", h.promotion.age_multipliers.values())?;
        check_multipliers("hazards.promotion.tenure_multipliers", h.promotion.tenure_multipliers.values())?;
        if h.promotion.min_increase_pct < 0.0 || h.promotion.min_increase_pct > h.promotion.max_increase_pct {
            return Err(config_err("hazards.promotion.min_increase_pct", "must be in [0, max_increase_pct]"));
        }
        check_month_day("hazards.promotion", h.promotion.effective_month, h.promotion.effective_day)?;
        check_unit("hazards.merit.eligibility_rate", h.merit.eligibility_rate)?;
        for rate in h.merit.level_eligibility.values() {
            check_unit("hazards.merit.level_eligibility", *rate)?;
        }
        if h.merit.std_dev_pct < 0.0 {
            return Err(config_err("hazards.merit.std_dev_pct", "must be non-negative"));
        }
        if h.merit.floor_pct > h.merit.cap_pct {
            return Err(config_err("hazards.merit.floor_pct", "exceeds cap_pct"));
        }
        check_month_day("hazards.merit", h.merit.effective_month, h.merit.effective_day)?;

        check_bands("bands.age_bands", &self.bands.age_bands)?;
        check_bands("bands.tenure_bands", &self.bands.tenure_bands)?;

        let p = &self.plan;
        check_unit("plan.auto_enrollment.default_deferral_rate", p.auto_enrollment.default_deferral_rate)?;
        check_unit("plan.auto_enrollment.opt_out_rate", p.auto_enrollment.opt_out_rate)?;
        check_unit("plan.voluntary_enrollment.annual_rate", p.voluntary_enrollment.annual_rate)?;
        if p.voluntary_enrollment.enabled && p.voluntary_enrollment.deferral_rates.is_empty() {
            return Err(config_err("plan.voluntary_enrollment.deferral_rates", "must not be empty"));
        }
        for rate in &p.voluntary_enrollment.deferral_rates {
            check_unit("plan.voluntary_enrollment.deferral_rates", *rate)?;
        }
        let e = &p.escalation;
        if !(0.001..=0.1).contains(&e.increment) {
            return Err(config_err("plan.escalation.increment", format!("{} outside [0.001, 0.1]", e.increment)));
        }
        if e.max_rate <= 0.0 || e.max_rate > 1.0 {
            return Err(config_err("plan.escalation.max_rate", "must be in (0, 1]"));
        }
        check_unit("plan.escalation.materiality_threshold", e.materiality_threshold)?;
        let mut prev_max = 0.0;
        for tier in &p.employer_match.tiers {
            if tier.employee_min < prev_max || tier.employee_max <= tier.employee_min {
                return Err(config_err("plan.employer_match.tiers", "tiers must be ordered and non-overlapping"));
            }
            check_unit("plan.employer_match.tiers.match_rate", tier.match_rate)?;
            prev_max = tier.employee_max;
        }
        check_unit("plan.employer_core.rate", p.employer_core.rate)?;

        if self.irs_limits.is_empty() {
            return Err(config_err("irs_limits", "at least one plan year is required"));
        }
        let mut years: Vec<_> = self.irs_limits.iter().map(|l| l.plan_year).collect();
        years.sort_unstable();
        years.dedup();
        if years.len() != self.irs_limits.len() {
            return Err(config_err("irs_limits", "duplicate plan_year"));
        }
        for l in &self.irs_limits {
            let positive = [l.compensation_limit, l.deferral_limit, l.annual_additions_limit];
            if positive.iter().any(|v| !v.is_finite() || *v <= 0.0) {
                return Err(config_err("irs_limits", format!("plan year {} has a non-positive limit", l.plan_year)));
            }
            if !l.catch_up_limit.is_finite() || l.catch_up_limit < 0.0 {
                return Err(config_err(
                    "irs_limits.catch_up_limit",
                    format!("plan year {} must be a non-negative amount", l.plan_year),
                ));
            }
        }
        Ok(())
    }
}

/// Deep-merge `overlay` into `base`. Objects merge key-by-key;
/// every other value (arrays included) replaces the base value.
pub fn merge_json(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

fn read_json_opt(path: &str) -> anyhow::Result<Option<Value>> {
    if !Path::new(path).exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
    let value = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
    Ok(Some(value))
}

fn check_unit(field: &str, value: f64) -> SimResult<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(config_err(field, format!("{value} outside [0, 1]")))
    }
}

fn check_multipliers<'a>(field: &str, values: impl Iterator<Item = &'a f64>) -> SimResult<()> {
    for v in values {
        if !v.is_finite() || *v < 0.0 {
            return Err(config_err(field, format!("multiplier {v} must be finite and non-negative")));
        }
    }
    Ok(())
}

fn check_month_day(field: &str, month: u32, day: u32) -> SimResult<()> {
    if (1..=12).contains(&month) && (1..=31).contains(&day) {
        Ok(())
    } else {
        Err(config_err(field, format!("invalid effective date {month:02}-{day:02}")))
    }
}

/// Bands must start at 0, be contiguous and sorted, and only the last
/// band may be unbounded.
fn check_bands(field: &str, bands: &[Band]) -> SimResult<()> {
    let Some(first) = bands.first() else {
        return Err(config_err(field, "at least one band is required"));
    };
    if first.min != 0.0 {
        return Err(config_err(field, "first band must start at 0"));
    }
    for (i, band) in bands.iter().enumerate() {
        let is_last = i + 1 == bands.len();
        match (band.max, is_last) {
            (None, true) => {}
            (None, false) => {
                return Err(config_err(field, format!("band '{}' is unbounded but not last", band.label)))
            }
            (Some(_), true) => {
                return Err(config_err(field, format!("last band '{}' must be unbounded", band.label)))
            }
            (Some(max), false) => {
                if max <= band.min {
                    return Err(config_err(field, format!("band '{}' is empty", band.label)));
                }
                if bands[i + 1].min != max {
                    return Err(config_err(field, format!("gap or overlap after band '{}'", band.label)));
                }
            }
        }
    }
    Ok(())
}

fn band(label: &str, min: f64, max: Option<f64>) -> Band {
    Band { label: label.into(), min, max }
}

fn labelled(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Global defaults, the bottom config layer.
impl Default for SimConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig {
                start_year: 2025,
                num_years: 5,
                random_seed: 42,
                tolerate_partial_failures: false,
            },
            workforce: WorkforceConfig {
                target_growth_rate: 0.03,
                new_hire_termination_rate: 0.25,
                involuntary_share: 0.2,
                new_hire_levels: vec![
                    LevelWeight { level: 1, weight: 0.50 },
                    LevelWeight { level: 2, weight: 0.30 },
                    LevelWeight { level: 3, weight: 0.15 },
                    LevelWeight { level: 4, weight: 0.05 },
                ],
                new_hire_age_min: 22,
                new_hire_age_max: 45,
                compensation_by_level: vec![
                    CompensationRange { level: 1, min: 45_000.0, max: 65_000.0 },
                    CompensationRange { level: 2, min: 60_000.0, max: 90_000.0 },
                    CompensationRange { level: 3, min: 85_000.0, max: 130_000.0 },
                    CompensationRange { level: 4, min: 120_000.0, max: 180_000.0 },
                    CompensationRange { level: 5, min: 170_000.0, max: 300_000.0 },
                ],
            },
            hazards: HazardConfig {
                version: "2025.1".into(),
                termination: TerminationHazard {
                    base_rate: 0.12,
                    age_multipliers: labelled(&[
                        ("<25", 1.4),
                        ("25-34", 1.1),
                        ("35-44", 0.9),
                        ("45-54", 0.8),
                        ("55-64", 1.0),
                        ("65+", 1.6),
                    ]),
                    tenure_multipliers: labelled(&[
                        ("<2", 1.5),
                        ("2-4", 1.0),
                        ("5-9", 0.7),
                        ("10-19", 0.5),
                        ("20+", 0.4),
                    ]),
                    level_multipliers: [(1, 1.2), (2, 1.0), (3, 0.8), (4, 0.7), (5, 0.6)].into(),
                },
                promotion: PromotionHazard {
                    base_rate: 0.10,
                    age_multipliers: labelled(&[
                        ("<25", 1.2),
                        ("25-34", 1.3),
                        ("35-44", 1.0),
                        ("45-54", 0.6),
                        ("55-64", 0.3),
                        ("65+", 0.1),
                    ]),
                    tenure_multipliers: labelled(&[
                        ("<2", 0.5),
                        ("2-4", 1.2),
                        ("5-9", 1.0),
                        ("10-19", 0.6),
                        ("20+", 0.3),
                    ]),
                    level_dampener: 0.15,
                    max_level: 5,
                    min_increase_pct: 0.08,
                    max_increase_pct: 0.15,
                    effective_month: 2,
                    effective_day: 1,
                },
                merit: MeritHazard {
                    eligibility_rate: 0.90,
                    level_eligibility: BTreeMap::new(),
                    cola_rate: 0.01,
                    mean_raise_pct: 0.03,
                    std_dev_pct: 0.01,
                    floor_pct: 0.0,
                    cap_pct: 0.10,
                    effective_month: 7,
                    effective_day: 15,
                },
            },
            bands: BandConfig {
                age_bands: vec![
                    band("<25", 0.0, Some(25.0)),
                    band("25-34", 25.0, Some(35.0)),
                    band("35-44", 35.0, Some(45.0)),
                    band("45-54", 45.0, Some(55.0)),
                    band("55-64", 55.0, Some(65.0)),
                    band("65+", 65.0, None),
                ],
                tenure_bands: vec![
                    band("<2", 0.0, Some(2.0)),
                    band("2-4", 2.0, Some(5.0)),
                    band("5-9", 5.0, Some(10.0)),
                    band("10-19", 10.0, Some(20.0)),
                    band("20+", 20.0, None),
                ],
            },
            plan: PlanDesignConfig {
                eligibility_waiting_days: 30,
                auto_enrollment: AutoEnrollmentConfig {
                    enabled: true,
                    default_deferral_rate: 0.03,
                    opt_out_rate: 0.10,
                    scope: AutoEnrollmentScope::NewHiresOnly,
                },
                voluntary_enrollment: VoluntaryEnrollmentConfig {
                    enabled: true,
                    annual_rate: 0.05,
                    deferral_rates: vec![0.02, 0.04, 0.06, 0.10],
                },
                escalation: EscalationConfig {
                    enabled: true,
                    increment: 0.01,
                    max_rate: 0.10,
                    max_escalations: 5,
                    first_escalation_delay_years: 1,
                    min_tenure_years: 0,
                    min_age: 0,
                    materiality_threshold: 0.001,
                },
                employer_match: MatchFormula {
                    tiers: vec![
                        MatchTier { employee_min: 0.0, employee_max: 0.03, match_rate: 1.0 },
                        MatchTier { employee_min: 0.03, employee_max: 0.05, match_rate: 0.5 },
                    ],
                },
                employer_core: CoreContributionConfig {
                    enabled: true,
                    rate: 0.02,
                    min_tenure_years: 1,
                },
            },
            irs_limits: vec![
                IrsLimits {
                    plan_year: 2024,
                    compensation_limit: 345_000.0,
                    deferral_limit: 23_000.0,
                    catch_up_limit: 7_500.0,
                    catch_up_age: 50,
                    annual_additions_limit: 69_000.0,
                },
                IrsLimits {
                    plan_year: 2025,
                    compensation_limit: 350_000.0,
                    deferral_limit: 23_500.0,
                    catch_up_limit: 7_500.0,
                    catch_up_age: 50,
                    annual_additions_limit: 70_000.0,
                },
                IrsLimits {
                    plan_year: 2026,
                    compensation_limit: 360_000.0,
                    deferral_limit: 24_500.0,
                    catch_up_limit: 8_000.0,
                    catch_up_age: 50,
                    annual_additions_limit: 72_000.0,
                },
            ],
        }
    }
}
