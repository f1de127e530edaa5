//! Merit raise generator.
//!
//! Eligibility comes from the merit hazard table (per-level overrides
//! already applied). The raise is `cola + Normal(mean, sd)` clamped to
//! [floor_pct, cap_pct].

use crate::{
    error::SimResult,
    event::{EventPayload, EventSource, WorkforceEvent},
    generator::{EventGenerator, GeneratorContext, GeneratorOutput},
    rng::SamplingPurpose,
    types::{date_in_year, round_rate},
};

pub struct MeritGenerator;

impl EventGenerator for MeritGenerator {
    fn source(&self) -> EventSource {
        EventSource::Merit
    }

    fn generate(&self, ctx: &GeneratorContext<'_>) -> SimResult<GeneratorOutput> {
        let year = ctx.simulation_year;
        let m = &ctx.config.hazards.merit;
        let scheduled = date_in_year(year, m.effective_month, m.effective_day);
        let mut out = GeneratorOutput::default();

        for row in ctx.prior.active() {
            let probability = ctx.hazards.merit.probability(ctx.hazard_key(row));
            let mut rng = ctx.rng(&row.employee_id, SamplingPurpose::Merit);
            if !rng.chance(probability) {
                continue;
            }
            let raise = m.cola_rate + rng.normal(m.mean_raise_pct, m.std_dev_pct);
            out.events.push(WorkforceEvent::new(
                row.employee_id.clone(),
                year,
                scheduled.max(row.hire_date),
                EventSource::Merit,
                EventPayload::Merit {
                    raise_pct: round_rate(raise.clamp(m.floor_pct, m.cap_pct)),
                    previous_compensation: row.current_compensation,
                },
            ));
        }

        log::debug!("year={year} merit: {} events", out.events.len());
        Ok(out)
    }
}
