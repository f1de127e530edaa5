//! Snapshot builder.
//!
//! build(prior population, this year's events, accumulated plan state)
//!   → one immutable row per (employee, year)
//!
//! Population = employees active at the end of year N-1 ∪ this year's
//! hires. Job level, compensation, termination and every derived figure
//! are recomputed here from the event log; nothing is passed through
//! from an earlier stage unchecked.
//!
//! A termination event always wins over the default active status,
//! including for employees hired and terminated in the same year.

use crate::{
    accumulator::PlanStateRow,
    config::PlanDesignConfig,
    contributions::{self, ContributionInput},
    error::SimResult,
    event::{EventPayload, TerminationReason, WorkforceEvent, YearlyEventLog},
    hazard::HazardTables,
    snapshot::{
        CompensationQualityFlag, DetailedStatus, EmploymentStatus, PriorSnapshot,
        WorkforceSnapshotRow,
    },
    types::{days_in_year, round_cents, whole_years_between, year_end, year_start, EmployeeId, SimYear},
};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

pub struct SnapshotInput<'a> {
    pub simulation_year: SimYear,
    pub prior: &'a PriorSnapshot,
    pub events: &'a YearlyEventLog,
    pub plan_state: &'a [PlanStateRow],
    pub hazards: &'a HazardTables,
    pub plan: &'a PlanDesignConfig,
    /// Each employee's first observed compensation, joined once up front.
    pub baselines: &'a BTreeMap<EmployeeId, f64>,
}

#[derive(Debug, Clone, Default)]
pub struct SnapshotOutput {
    pub rows: Vec<WorkforceSnapshotRow>,
    /// Compensation baselines first observed this year (new hires).
    pub new_baselines: Vec<(EmployeeId, f64)>,
}

/// Everything known about an employee before this year's changes apply.
struct Seed {
    hire_date: NaiveDate,
    birth_date: NaiveDate,
    job_level: u32,
    compensation: f64,
}

pub fn build_snapshot(input: &SnapshotInput<'_>) -> SimResult<SnapshotOutput> {
    let year = input.simulation_year;
    let mut seeds: BTreeMap<&str, Seed> = input
        .prior
        .active()
        .map(|r| {
            (
                r.employee_id.as_str(),
                Seed {
                    hire_date: r.hire_date,
                    birth_date: r.birth_date,
                    job_level: r.job_level,
                    compensation: r.current_compensation,
                },
            )
        })
        .collect();

    let mut out = SnapshotOutput::default();
    for e in &input.events.events {
        if let EventPayload::Hire { job_level, compensation, birth_date } = &e.payload {
            seeds.insert(
                e.employee_id.as_str(),
                Seed {
                    hire_date: e.effective_date,
                    birth_date: *birth_date,
                    job_level: *job_level,
                    compensation: *compensation,
                },
            );
            if !input.baselines.contains_key(&e.employee_id) {
                out.new_baselines.push((e.employee_id.clone(), *compensation));
            }
        }
    }

    let plan_state: BTreeMap<&str, &PlanStateRow> = input
        .plan_state
        .iter()
        .map(|r| (r.employee_id.as_str(), r))
        .collect();
    let events = input.events.by_employee();
    let limits = input.hazards.irs_limits(year);
    let new_baselines: BTreeMap<&str, f64> = out
        .new_baselines
        .iter()
        .map(|(id, comp)| (id.as_str(), *comp))
        .collect();

    for (employee_id, seed) in &seeds {
        let Some(state) = plan_state.get(employee_id) else {
            log::debug!("year={year} snapshot: {employee_id} has no plan state, row skipped");
            continue;
        };
        let employee_events = events.get(employee_id).map(Vec::as_slice).unwrap_or(&[]);
        let history = replay(year, seed, employee_events);

        let status = if history.termination_date.is_some() {
            EmploymentStatus::Terminated
        } else {
            EmploymentStatus::Active
        };
        let as_of = history.termination_date.unwrap_or_else(|| year_end(year));
        let current_age = whole_years_between(seed.birth_date, as_of);
        let current_tenure = whole_years_between(seed.hire_date, as_of);

        let baseline = input
            .baselines
            .get(*employee_id)
            .copied()
            .or_else(|| new_baselines.get(employee_id).copied());

        let contributions = contributions::compute(
            ContributionInput {
                compensation: history.prorated_compensation,
                deferral_rate: state.current_deferral_rate,
                is_enrolled: state.is_enrolled,
                age: current_age,
                tenure: current_tenure,
            },
            limits,
            input.plan,
        );

        out.rows.push(WorkforceSnapshotRow {
            employee_id: employee_id.to_string(),
            simulation_year: year,
            hire_date: seed.hire_date,
            birth_date: seed.birth_date,
            termination_date: history.termination_date,
            termination_reason: history.termination_reason,
            employment_status: status,
            detailed_status: DetailedStatus::classify(status, seed.hire_date.year() == year),
            job_level: history.job_level,
            current_age,
            current_tenure,
            age_band: input.hazards.age_band_label(current_age).to_string(),
            tenure_band: input.hazards.tenure_band_label(current_tenure).to_string(),
            starting_compensation: seed.compensation,
            current_compensation: history.compensation,
            prorated_compensation: history.prorated_compensation,
            compensation_quality_flag: CompensationQualityFlag::classify(history.compensation, baseline),
            is_enrolled: state.is_enrolled,
            enrollment_date: state.enrollment_date,
            current_deferral_rate: state.current_deferral_rate,
            escalations_received: state.escalations_received,
            employee_contribution: contributions.employee_deferral,
            employer_match: contributions.employer_match,
            employer_core: contributions.employer_core,
        });
    }

    let terminated = out.rows.iter().filter(|r| !r.is_active()).count();
    log::debug!(
        "year={year} snapshot: {} rows ({} active, {terminated} terminated)",
        out.rows.len(),
        out.rows.len() - terminated
    );
    Ok(out)
}

struct YearHistory {
    job_level: u32,
    compensation: f64,
    prorated_compensation: f64,
    termination_date: Option<NaiveDate>,
    termination_reason: Option<TerminationReason>,
}

/// Apply one employee's events in log order. Pay is prorated over the
/// days employed, segment by segment across each pay change.
fn replay(year: SimYear, seed: &Seed, events: &[&WorkforceEvent]) -> YearHistory {
    let mut h = YearHistory {
        job_level: seed.job_level,
        compensation: seed.compensation,
        prorated_compensation: 0.0,
        termination_date: None,
        termination_reason: None,
    };
    let mut segment_start = seed.hire_date.max(year_start(year));
    let mut earned = 0.0;

    for e in events {
        match &e.payload {
            EventPayload::Promotion { to_level, increase_pct, .. } => {
                earned += h.compensation * days_between(segment_start, e.effective_date) as f64;
                segment_start = segment_start.max(e.effective_date);
                h.job_level = *to_level;
                h.compensation = round_cents(h.compensation * (1.0 + increase_pct));
            }
            EventPayload::Merit { raise_pct, .. } => {
                earned += h.compensation * days_between(segment_start, e.effective_date) as f64;
                segment_start = segment_start.max(e.effective_date);
                h.compensation = round_cents(h.compensation * (1.0 + raise_pct));
            }
            EventPayload::Termination { reason, .. } => {
                h.termination_date = Some(e.effective_date);
                h.termination_reason = Some(*reason);
            }
            _ => {}
        }
    }

    // The termination day itself counts as a day worked.
    let last_day = h.termination_date.unwrap_or_else(|| year_end(year));
    earned += h.compensation * (days_between(segment_start, last_day) + 1).max(0) as f64;
    h.prorated_compensation = round_cents(earned / days_in_year(year) as f64);
    h
}

fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventSource, WorkforceEvent};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn seed(hire: NaiveDate) -> Seed {
        Seed { hire_date: hire, birth_date: d(1980, 1, 1), job_level: 2, compensation: 36_500.0 }
    }

    #[test]
    fn full_year_without_events_earns_full_pay() {
        let h = replay(2025, &seed(d(2015, 3, 1)), &[]);
        assert_eq!(h.prorated_compensation, 36_500.0);
        assert_eq!(h.compensation, 36_500.0);
    }

    #[test]
    fn mid_year_hire_is_prorated_from_hire_date() {
        // Jul 2 .. Dec 31 is 183 days of 365.
        let h = replay(2025, &seed(d(2025, 7, 2)), &[]);
        assert_eq!(h.prorated_compensation, round_cents(36_500.0 * 183.0 / 365.0));
    }

    #[test]
    fn termination_ends_the_last_segment() {
        let term = WorkforceEvent::new(
            "E1",
            2025,
            d(2025, 1, 10),
            EventSource::Termination,
            EventPayload::Termination { reason: TerminationReason::Voluntary, probability: 0.1 },
        );
        let h = replay(2025, &seed(d(2015, 3, 1)), &[&term]);
        assert_eq!(h.termination_date, Some(d(2025, 1, 10)));
        assert_eq!(h.prorated_compensation, round_cents(36_500.0 * 10.0 / 365.0));
    }

    #[test]
    fn raise_applies_from_its_effective_date() {
        let merit = WorkforceEvent::new(
            "E1",
            2025,
            d(2025, 7, 2),
            EventSource::Merit,
            EventPayload::Merit { raise_pct: 0.10, previous_compensation: 36_500.0 },
        );
        let h = replay(2025, &seed(d(2015, 3, 1)), &[&merit]);
        assert_eq!(h.compensation, 40_150.0);
        let expected = (36_500.0 * 182.0 + 40_150.0 * 183.0) / 365.0;
        assert_eq!(h.prorated_compensation, round_cents(expected));
    }
}
