//! New-hire termination generator.
//!
//! Applies the flat new-hire termination rate to this year's hires.
//! Uses the same date window as experienced terminations, so the window
//! opens on the hire date rather than Jan 1.

use crate::{
    date_window::sample_termination_date,
    error::SimResult,
    event::{EventPayload, EventSource, WorkforceEvent},
    generator::{EventGenerator, GeneratorContext, GeneratorOutput, GeneratorStage},
    rng::SamplingPurpose,
    termination_generator::{draw_reason, no_window_issue},
};

pub struct NewHireTerminationGenerator;

impl EventGenerator for NewHireTerminationGenerator {
    fn source(&self) -> EventSource {
        EventSource::NewHireTermination
    }

    fn stage(&self) -> GeneratorStage {
        GeneratorStage::Dependent
    }

    fn generate(&self, ctx: &GeneratorContext<'_>) -> SimResult<GeneratorOutput> {
        let year = ctx.simulation_year;
        let w = &ctx.config.workforce;
        let probability = w.new_hire_termination_rate;
        let mut out = GeneratorOutput::default();

        for hire in ctx.stage_one_hires() {
            let mut rng = ctx.rng(&hire.employee_id, SamplingPurpose::NewHireTermination);
            if !rng.chance(probability) {
                continue;
            }
            let Some(date) = sample_termination_date(hire.effective_date, year, &mut rng) else {
                log::warn!(
                    "year={year} new_hire_termination: {} hired {} has no valid window, excluded",
                    hire.employee_id, hire.effective_date
                );
                out.issues.push(no_window_issue(&hire.employee_id, year, hire.effective_date));
                continue;
            };
            out.events.push(WorkforceEvent::new(
                hire.employee_id.clone(),
                year,
                date,
                EventSource::NewHireTermination,
                EventPayload::Termination { reason: draw_reason(w, &mut rng), probability },
            ));
        }

        log::debug!(
            "year={year} new_hire_termination: {} events ({} excluded)",
            out.events.len(),
            out.issues.len()
        );
        Ok(out)
    }
}
