//! Experienced termination generator.
//!
//! One Bernoulli trial per employee active at the end of year N-1, at
//! the hazard-table probability for their (age band, tenure band, level).
//! The date comes from the shared window in `date_window`.

use crate::{
    config::WorkforceConfig,
    date_window::sample_termination_date,
    error::SimResult,
    event::{EventPayload, EventSource, TerminationReason, WorkforceEvent},
    generator::{EventGenerator, GeneratorContext, GeneratorOutput},
    rng::{EmployeeRng, SamplingPurpose},
    types::SimYear,
    validation::{DataQualityIssue, IssueKind},
};
use chrono::NaiveDate;

pub struct TerminationGenerator;

impl EventGenerator for TerminationGenerator {
    fn source(&self) -> EventSource {
        EventSource::Termination
    }

    fn generate(&self, ctx: &GeneratorContext<'_>) -> SimResult<GeneratorOutput> {
        let year = ctx.simulation_year;
        let mut out = GeneratorOutput::default();

        for row in ctx.prior.active() {
            let probability = ctx.hazards.termination.probability(ctx.hazard_key(row));
            let mut rng = ctx.rng(&row.employee_id, SamplingPurpose::Termination);
            if !rng.chance(probability) {
                continue;
            }
            let Some(date) = sample_termination_date(row.hire_date, year, &mut rng) else {
                log::warn!(
                    "year={year} termination: {} has no valid window (hired {}), excluded",
                    row.employee_id, row.hire_date
                );
                out.issues.push(no_window_issue(&row.employee_id, year, row.hire_date));
                continue;
            };
            out.events.push(WorkforceEvent::new(
                row.employee_id.clone(),
                year,
                date,
                EventSource::Termination,
                EventPayload::Termination {
                    reason: draw_reason(&ctx.config.workforce, &mut rng),
                    probability,
                },
            ));
        }

        log::debug!(
            "year={year} termination: {} events ({} excluded)",
            out.events.len(),
            out.issues.len()
        );
        Ok(out)
    }
}

pub(crate) fn draw_reason(w: &WorkforceConfig, rng: &mut EmployeeRng) -> TerminationReason {
    if rng.chance(w.involuntary_share) {
        TerminationReason::Involuntary
    } else {
        TerminationReason::Voluntary
    }
}

pub(crate) fn no_window_issue(employee_id: &str, year: SimYear, hire_date: NaiveDate) -> DataQualityIssue {
    DataQualityIssue {
        employee_id: employee_id.to_string(),
        simulation_year: year,
        kind: IssueKind::NoTerminationWindow,
        detail: format!("hired {hire_date}, no day left in {year} for a termination"),
    }
}
