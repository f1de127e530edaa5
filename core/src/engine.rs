//! The simulation driver.
//!
//! EXECUTION ORDER within a year (fixed, documented, never reordered):
//!   Stage 1, in parallel:  hire, termination, promotion, merit
//!   ── barrier ──
//!   Stage 2, in parallel:  new-hire termination, enrollment, escalation
//!   ── barrier ──
//!   1. Assemble and validate the yearly event log
//!   2. Accumulate plan state from year N-1's state + year N's log
//!   3. Build and validate the snapshot
//!   4. Commit the year in one transaction
//!
//! RULES:
//!   - Years run strictly in order; year N reads only year N-1's
//!     committed output, read back from the store.
//!   - All randomness flows through EmployeeRng.
//!   - A validation failure halts the driver; the failing year is never
//!     committed.
//!   - Cancellation is checked between stages and before commit.

use crate::{
    accumulator::{accumulate, PriorState},
    analytics::{year_summary, YearSummary},
    census::{validate_census, CensusRecord},
    clock::{DriverClock, DriverPhase},
    config::SimConfig,
    enrollment_generator::EnrollmentGenerator,
    error::{SimError, SimResult},
    escalation_generator::EscalationGenerator,
    event::{EventPayload, WorkforceEvent, YearlyEventLog},
    generator::{EventGenerator, GeneratorContext, GeneratorOutput, GeneratorStage},
    hazard::HazardTables,
    hire_generator::HireGenerator,
    merit_generator::MeritGenerator,
    new_hire_termination_generator::NewHireTerminationGenerator,
    promotion_generator::PromotionGenerator,
    snapshot::PriorSnapshot,
    snapshot_builder::{build_snapshot, SnapshotInput},
    store::{RunStatus, ScenarioRun, SimStore, YearCommit},
    termination_generator::TerminationGenerator,
    types::{EmployeeId, ScenarioId, SimYear},
    validation::{validate_event_log, validate_snapshot, DataQualityIssue, EscalationLimits},
};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

/// Coarse-grained cancellation shared with callers on other threads.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub scenario_id: ScenarioId,
    pub seed: u64,
    pub years: Vec<YearSummary>,
    pub data_quality_issues: usize,
}

/// What a committed year hands to the next one.
struct YearOutcome {
    summary: YearSummary,
    issues: usize,
}

pub struct SimEngine {
    pub scenario_id: ScenarioId,
    pub clock: DriverClock,
    config: SimConfig,
    hazards: HazardTables,
    generators: Vec<Box<dyn EventGenerator>>,
    store: SimStore,
    cancel: CancelToken,
}

impl SimEngine {
    /// Validate the config and materialise hazard tables. Configuration
    /// errors surface here, before any year executes.
    pub fn new(scenario_id: impl Into<ScenarioId>, config: SimConfig, store: SimStore) -> SimResult<Self> {
        config.validate()?;
        let hazards = HazardTables::from_config(&config)?;
        let clock = DriverClock::new(config.simulation.start_year, config.simulation.end_year());
        Ok(Self {
            scenario_id: scenario_id.into(),
            clock,
            config,
            hazards,
            generators: Vec::new(),
            store,
            cancel: CancelToken::default(),
        })
    }

    /// Build a fully wired engine with every generator registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(scenario_id: impl Into<ScenarioId>, config: SimConfig, store: SimStore) -> SimResult<Self> {
        let mut engine = Self::new(scenario_id, config, store)?;

        // REGISTRATION ORDER is fixed. Merge order follows it.
        // Stage 1:
        engine.register(Box::new(HireGenerator));
        engine.register(Box::new(TerminationGenerator));
        engine.register(Box::new(PromotionGenerator));
        engine.register(Box::new(MeritGenerator));
        // Stage 2:
        engine.register(Box::new(NewHireTerminationGenerator));
        engine.register(Box::new(EnrollmentGenerator));
        engine.register(Box::new(EscalationGenerator));
        engine.store.migrate()?;
        Ok(engine)
    }

    /// Register a generator. Call in the documented execution order.
    pub fn register(&mut self, generator: Box<dyn EventGenerator>) {
        self.generators.push(generator);
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn hazards(&self) -> &HazardTables {
        &self.hazards
    }

    pub fn store(&self) -> &SimStore {
        &self.store
    }

    /// Run every configured year from the census. Any previous results
    /// for this scenario are deleted first.
    pub fn run(&mut self, census: &[CensusRecord]) -> SimResult<RunSummary> {
        validate_census(census)?;
        let scenario_id = self.scenario_id.clone();
        let sim = self.config.simulation.clone();
        self.clock = DriverClock::new(sim.start_year, sim.end_year());

        self.store.clear_scenario(&scenario_id)?;
        self.store.insert_run(&ScenarioRun {
            scenario_id: scenario_id.clone(),
            seed: sim.random_seed,
            hazard_version: self.hazards.version.clone(),
            start_year: sim.start_year,
            num_years: sim.num_years,
            config_json: serde_json::to_string(&self.config)?,
        })?;
        self.store.insert_census(&scenario_id, census)?;
        log::info!(
            "scenario={scenario_id} run: {} census records, years {}..={}, seed {}",
            census.len(),
            sim.start_year,
            sim.end_year(),
            sim.random_seed
        );

        match self.run_years(census) {
            Ok(summary) => {
                self.store.set_run_status(&scenario_id, RunStatus::Complete)?;
                Ok(summary)
            }
            Err(err) => {
                self.clock.halt();
                let status = match err {
                    SimError::Cancelled { .. } => RunStatus::Cancelled,
                    _ => RunStatus::Halted,
                };
                log::error!("scenario={scenario_id} run: {} ({err})", self.clock.phase);
                self.store.set_run_status(&scenario_id, status)?;
                Err(err)
            }
        }
    }

    fn run_years(&mut self, census: &[CensusRecord]) -> SimResult<RunSummary> {
        let sim = self.config.simulation.clone();
        let (baseline, mut pending_issues) = PriorSnapshot::from_census(census, sim.start_year);
        baseline.check_shape()?;

        // The census is the first observation of every employee's pay.
        let mut pending_baselines: Vec<(EmployeeId, f64)> = baseline
            .rows
            .iter()
            .map(|r| (r.employee_id.clone(), r.current_compensation))
            .collect();
        let mut baselines: BTreeMap<EmployeeId, f64> = pending_baselines.iter().cloned().collect();

        let mut prior = baseline;
        let mut prior_state = PriorState::Baseline;
        let mut summary = RunSummary {
            scenario_id: self.scenario_id.clone(),
            seed: sim.random_seed,
            years: Vec::new(),
            data_quality_issues: 0,
        };

        for year in sim.start_year..=sim.end_year() {
            let outcome = self.run_year(
                year,
                &prior,
                &prior_state,
                &mut baselines,
                std::mem::take(&mut pending_issues),
                std::mem::take(&mut pending_baselines),
            )?;
            summary.data_quality_issues += outcome.issues;
            summary.years.push(outcome.summary);

            prior = PriorSnapshot::finalized(
                year,
                self.store.snapshot_for_year(&self.scenario_id, year, None)?,
            )?;
            prior_state = PriorState::from_rows(self.store.plan_state_for_year(&self.scenario_id, year)?);
        }

        self.clock.advance(DriverPhase::Complete)?;
        log::info!(
            "scenario={} run: complete ({} years, {} data-quality issues)",
            self.scenario_id,
            summary.years.len(),
            summary.data_quality_issues
        );
        Ok(summary)
    }

    /// Generate, accumulate, build, validate and commit one year.
    fn run_year(
        &mut self,
        year: SimYear,
        prior: &PriorSnapshot,
        prior_state: &PriorState,
        baselines: &mut BTreeMap<EmployeeId, f64>,
        mut issues: Vec<DataQualityIssue>,
        mut new_baselines: Vec<(EmployeeId, f64)>,
    ) -> SimResult<YearOutcome> {
        self.check_cancelled(year)?;
        self.clock.advance(DriverPhase::Generating(year))?;
        let log = self.generate_events(year, prior, prior_state, &mut issues)?;

        let mut hire_dates: BTreeMap<EmployeeId, NaiveDate> = prior
            .active()
            .map(|r| (r.employee_id.clone(), r.hire_date))
            .collect();
        for e in &log.events {
            if let EventPayload::Hire { .. } = e.payload {
                hire_dates.insert(e.employee_id.clone(), e.effective_date);
            }
        }
        let esc = &self.config.plan.escalation;
        let failures = validate_event_log(&log, &hire_dates, esc.max_rate);
        if !failures.is_empty() {
            return Err(SimError::ValidationFailed { year, failures });
        }

        self.clock.advance(DriverPhase::Accumulating(year))?;
        let continuing: Vec<&str> = prior.active().map(|r| r.employee_id.as_str()).collect();
        let accumulated = accumulate(
            year,
            prior_state,
            &continuing,
            &log,
            self.config.simulation.tolerate_partial_failures,
        )?;
        issues.extend(accumulated.issues);

        self.clock.advance(DriverPhase::Snapshot(year))?;
        let snapshot = build_snapshot(&SnapshotInput {
            simulation_year: year,
            prior,
            events: &log,
            plan_state: &accumulated.rows,
            hazards: &self.hazards,
            plan: &self.config.plan,
            baselines: &*baselines,
        })?;
        let limits = EscalationLimits { max_escalations: esc.max_escalations, max_rate: esc.max_rate };
        let failures = validate_snapshot(year, &snapshot.rows, &log, &accumulated.rows, prior_state, limits);
        if !failures.is_empty() {
            return Err(SimError::ValidationFailed { year, failures });
        }

        self.check_cancelled(year)?;
        new_baselines.extend(snapshot.new_baselines);
        self.store.commit_year(&YearCommit {
            scenario_id: &self.scenario_id,
            simulation_year: year,
            events: &log,
            plan_state: &accumulated.rows,
            snapshot: &snapshot.rows,
            issues: &issues,
            baselines: &new_baselines,
        })?;
        baselines.extend(new_baselines);

        let summary = year_summary(year, &snapshot.rows);
        log::info!(
            "year={year} driver: committed {} events, {} active, {} new hires, {} terminations, participation {:.1}%",
            log.len(),
            summary.active,
            summary.new_hires,
            summary.experienced_terminations + summary.new_hire_terminations,
            summary.participation_rate * 100.0,
        );
        Ok(YearOutcome { summary, issues: issues.len() })
    }

    /// Run both generator stages and merge their output into the
    /// canonical yearly log.
    fn generate_events(
        &self,
        year: SimYear,
        prior: &PriorSnapshot,
        prior_state: &PriorState,
        issues: &mut Vec<DataQualityIssue>,
    ) -> SimResult<YearlyEventLog> {
        let mut ctx = GeneratorContext {
            simulation_year: year,
            scenario_seed: self.config.simulation.random_seed,
            config: &self.config,
            hazards: &self.hazards,
            prior,
            prior_state,
            stage_one: &[],
        };

        let stage_one = self.run_stage(GeneratorStage::Independent, &ctx)?;
        self.check_cancelled(year)?;

        let stage_one_events: Vec<WorkforceEvent> =
            stage_one.iter().flat_map(|o| o.events.iter().cloned()).collect();
        ctx.stage_one = &stage_one_events;
        let stage_two = self.run_stage(GeneratorStage::Dependent, &ctx)?;
        self.check_cancelled(year)?;

        let mut batches = Vec::with_capacity(self.generators.len());
        for output in stage_one.into_iter().chain(stage_two) {
            issues.extend(output.issues);
            batches.push(output.events);
        }
        let log = YearlyEventLog::assemble(year, batches);
        if log.dropped_after_termination > 0 {
            log::debug!(
                "year={year} merge: dropped {} events dated after termination",
                log.dropped_after_termination
            );
        }
        Ok(log)
    }

    /// Run one stage's generators concurrently. Results come back in
    /// registration order.
    fn run_stage(&self, stage: GeneratorStage, ctx: &GeneratorContext<'_>) -> SimResult<Vec<GeneratorOutput>> {
        self.generators
            .par_iter()
            .filter(|g| g.stage() == stage)
            .map(|g| g.generate(ctx))
            .collect()
    }

    fn check_cancelled(&self, year: SimYear) -> SimResult<()> {
        if self.cancel.is_cancelled() {
            log::warn!("year={year} driver: cancellation requested, year discarded");
            return Err(SimError::Cancelled { year });
        }
        Ok(())
    }
}

impl SimEngine {
    /// In-memory engine on the test config, migrated and ready to run.
    pub fn build_test(scenario_id: &str) -> SimResult<Self> {
        Self::build_with_config(scenario_id, SimConfig::default_test())
    }

    pub fn build_with_config(scenario_id: &str, config: SimConfig) -> SimResult<Self> {
        Self::build(scenario_id, config, SimStore::in_memory()?)
    }
}
