//! Deferral escalation generator.
//!
//! At most one escalation per enrolled employee per year, effective
//! Jan 1 (or the enrollment date when later). Eligibility:
//!   - enrolled at the end of year N-1 (census state in the first year)
//!   - at least `first_escalation_delay_years` since the enrollment year
//!   - tenure and age thresholds met as of Jan 1
//!   - fewer than `max_escalations` received
//!
//! The increment is clamped so the new rate never exceeds `max_rate`.
//! An increment below the materiality threshold is suppressed.

use crate::{
    error::SimResult,
    event::{EventPayload, EventSource, WorkforceEvent},
    generator::{EventGenerator, GeneratorContext, GeneratorOutput, GeneratorStage},
    types::{round_rate, year_start},
};
use chrono::Datelike;

pub struct EscalationGenerator;

impl EventGenerator for EscalationGenerator {
    fn source(&self) -> EventSource {
        EventSource::Escalation
    }

    fn stage(&self) -> GeneratorStage {
        GeneratorStage::Dependent
    }

    fn generate(&self, ctx: &GeneratorContext<'_>) -> SimResult<GeneratorOutput> {
        let year = ctx.simulation_year;
        let e = &ctx.config.plan.escalation;
        let mut out = GeneratorOutput::default();
        if !e.enabled {
            return Ok(out);
        }
        let mut suppressed = 0usize;

        for row in ctx.prior.active() {
            let Some(prior) = ctx.prior_enrollment(row) else {
                continue;
            };
            let years_enrolled = year - prior.enrollment_date.year();
            if years_enrolled < e.first_escalation_delay_years as i32 {
                continue;
            }
            let (age, tenure) = ctx.age_and_tenure(row);
            if tenure < e.min_tenure_years || age < e.min_age {
                continue;
            }
            if prior.escalations_received >= e.max_escalations {
                continue;
            }

            let new_rate = round_rate((prior.deferral_rate + e.increment).min(e.max_rate));
            let increment = round_rate(new_rate - prior.deferral_rate);
            if increment < e.materiality_threshold || increment <= 0.0 {
                suppressed += 1;
                continue;
            }

            out.events.push(WorkforceEvent::new(
                row.employee_id.clone(),
                year,
                year_start(year).max(prior.enrollment_date),
                EventSource::Escalation,
                EventPayload::Escalation {
                    increment,
                    previous_rate: prior.deferral_rate,
                    new_rate,
                },
            ));
        }

        log::debug!(
            "year={year} escalation: {} events ({suppressed} below materiality or at cap)",
            out.events.len()
        );
        Ok(out)
    }
}
