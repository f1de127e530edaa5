//! Event generator trait.
//!
//! RULE: Every generator implements EventGenerator.
//! A generator reads only the prior year's finalized snapshot, the prior
//! year's plan state, the hazard tables and (for dependent generators)
//! the independent generators' output for the same year.
//! Same inputs ⇒ byte-identical outputs. All randomness flows through
//! EmployeeRng keyed by (seed, employee, year, purpose).

use crate::{
    accumulator::PriorState,
    config::SimConfig,
    error::SimResult,
    event::{EventSource, EventType, WorkforceEvent},
    hazard::{HazardKey, HazardTables},
    rng::{EmployeeRng, SamplingPurpose},
    snapshot::{PriorSnapshot, WorkforceSnapshotRow},
    types::{whole_years_between, year_start, SimYear},
    validation::DataQualityIssue,
};
use chrono::NaiveDate;

/// When a generator runs within a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorStage {
    /// Reads only year N-1; runs concurrently with the other
    /// independent generators.
    Independent,
    /// Also reads the independent generators' events; runs after the
    /// first barrier.
    Dependent,
}

pub struct GeneratorContext<'a> {
    pub simulation_year: SimYear,
    pub scenario_seed: u64,
    pub config: &'a SimConfig,
    pub hazards: &'a HazardTables,
    pub prior: &'a PriorSnapshot,
    pub prior_state: &'a PriorState,
    /// Independent-stage events for this year; empty during that stage.
    pub stage_one: &'a [WorkforceEvent],
}

impl GeneratorContext<'_> {
    pub fn rng(&self, employee_id: &str, purpose: SamplingPurpose) -> EmployeeRng {
        EmployeeRng::new(self.scenario_seed, employee_id, self.simulation_year, purpose)
    }

    /// True when the prior snapshot is the census baseline.
    pub fn is_first_year(&self) -> bool {
        self.prior.is_census_baseline
    }

    /// Age and tenure as of Jan 1 of the simulation year.
    pub fn age_and_tenure(&self, row: &WorkforceSnapshotRow) -> (u32, u32) {
        let jan_1 = year_start(self.simulation_year);
        (
            whole_years_between(row.birth_date, jan_1),
            whole_years_between(row.hire_date, jan_1),
        )
    }

    pub fn hazard_key(&self, row: &WorkforceSnapshotRow) -> HazardKey {
        let (age, tenure) = self.age_and_tenure(row);
        self.hazards.key_for(age, tenure, row.job_level)
    }

    /// Plan enrollment carried into this year. In the first year this
    /// comes from the census baseline row, afterwards from year N-1's
    /// finalized plan state.
    pub fn prior_enrollment(&self, row: &WorkforceSnapshotRow) -> Option<PriorEnrollment> {
        if self.is_first_year() {
            return row.is_enrolled.then(|| PriorEnrollment {
                enrollment_date: row.enrollment_date.unwrap_or(row.hire_date).max(row.hire_date),
                deferral_rate: row.current_deferral_rate,
                escalations_received: row.escalations_received,
            });
        }
        let state = self.prior_state.get(&row.employee_id)?;
        state.is_enrolled.then(|| PriorEnrollment {
            enrollment_date: state.enrollment_date.unwrap_or(row.hire_date),
            deferral_rate: state.current_deferral_rate,
            escalations_received: state.escalations_received,
        })
    }

    /// Hire events produced by the independent stage.
    pub fn stage_one_hires(&self) -> impl Iterator<Item = &WorkforceEvent> {
        self.stage_one
            .iter()
            .filter(|e| e.event_type == EventType::Hire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorEnrollment {
    pub enrollment_date: NaiveDate,
    pub deferral_rate: f64,
    pub escalations_received: u32,
}

#[derive(Debug, Clone, Default)]
pub struct GeneratorOutput {
    pub events: Vec<WorkforceEvent>,
    pub issues: Vec<DataQualityIssue>,
}

/// The contract every event generator must fulfill.
pub trait EventGenerator: Send + Sync {
    /// Stable source tag written to every event this generator emits.
    fn source(&self) -> EventSource;

    fn stage(&self) -> GeneratorStage {
        GeneratorStage::Independent
    }

    /// Emit zero or one event per eligible employee for the year.
    fn generate(&self, ctx: &GeneratorContext<'_>) -> SimResult<GeneratorOutput>;
}
