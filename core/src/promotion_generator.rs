//! Promotion generator.
//!
//! p = base × age_mult × tenure_mult × max(0, 1 − dampener × (level − 1)),
//! materialised in the promotion hazard table. Employees already at
//! `max_level` are never promoted. A promotion moves one level and raises
//! pay by a uniform draw in [min_increase_pct, max_increase_pct].

use crate::{
    error::SimResult,
    event::{EventPayload, EventSource, WorkforceEvent},
    generator::{EventGenerator, GeneratorContext, GeneratorOutput},
    rng::SamplingPurpose,
    types::{date_in_year, round_rate},
};

pub struct PromotionGenerator;

impl EventGenerator for PromotionGenerator {
    fn source(&self) -> EventSource {
        EventSource::Promotion
    }

    fn generate(&self, ctx: &GeneratorContext<'_>) -> SimResult<GeneratorOutput> {
        let year = ctx.simulation_year;
        let params = &ctx.config.hazards.promotion;
        let scheduled = date_in_year(year, params.effective_month, params.effective_day);
        let mut out = GeneratorOutput::default();

        for row in ctx.prior.active() {
            if row.job_level >= params.max_level {
                continue;
            }
            let probability = ctx.hazards.promotion.probability(ctx.hazard_key(row));
            let mut rng = ctx.rng(&row.employee_id, SamplingPurpose::Promotion);
            if !rng.chance(probability) {
                continue;
            }
            let increase_pct =
                round_rate(rng.uniform(params.min_increase_pct, params.max_increase_pct));
            out.events.push(WorkforceEvent::new(
                row.employee_id.clone(),
                year,
                scheduled.max(row.hire_date),
                EventSource::Promotion,
                EventPayload::Promotion {
                    from_level: row.job_level,
                    to_level: row.job_level + 1,
                    increase_pct,
                    previous_compensation: row.current_compensation,
                },
            ));
        }

        log::debug!("year={year} promotion: {} events", out.events.len());
        Ok(out)
    }
}
