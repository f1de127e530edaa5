//! Hire generator.
//!
//! Sizes the year's hiring from the prior snapshot alone so it can run
//! alongside the other independent generators:
//!
//!   hires = ceil((Σ p_term + active × growth) / (1 − new_hire_term_rate))
//!
//! Σ p_term is the expected number of experienced terminations, summed
//! from the hazard table without sampling. Dividing by the survival rate
//! replaces the new hires that will themselves leave this year.

use crate::{
    config::{LevelWeight, WorkforceConfig},
    date_window::sample_day_in_year,
    error::SimResult,
    event::{EventPayload, EventSource, WorkforceEvent},
    generator::{EventGenerator, GeneratorContext, GeneratorOutput},
    rng::{EmployeeRng, SamplingPurpose},
    types::{round_cents, SimYear, DAYS_PER_YEAR},
};
use chrono::Duration;

pub struct HireGenerator;

impl HireGenerator {
    /// Stable identifier of the `index`th (1-based) hire of `year`.
    pub fn employee_id(year: SimYear, index: usize) -> String {
        format!("NH_{year}_{index:06}")
    }

    /// Expected experienced terminations for the year.
    pub fn expected_terminations(ctx: &GeneratorContext<'_>) -> f64 {
        ctx.prior
            .active()
            .map(|row| ctx.hazards.termination.probability(ctx.hazard_key(row)))
            .sum()
    }

    pub fn hires_needed(ctx: &GeneratorContext<'_>) -> usize {
        let w = &ctx.config.workforce;
        let active = ctx.prior.active_count() as f64;
        let net = Self::expected_terminations(ctx) + active * w.target_growth_rate;
        if net <= 0.0 {
            return 0;
        }
        (net / (1.0 - w.new_hire_termination_rate)).ceil() as usize
    }
}

impl EventGenerator for HireGenerator {
    fn source(&self) -> EventSource {
        EventSource::Hire
    }

    fn generate(&self, ctx: &GeneratorContext<'_>) -> SimResult<GeneratorOutput> {
        let year = ctx.simulation_year;
        let w = &ctx.config.workforce;
        let count = Self::hires_needed(ctx);
        let mut out = GeneratorOutput::default();

        for index in 1..=count {
            let employee_id = Self::employee_id(year, index);
            let mut rng = ctx.rng(&employee_id, SamplingPurpose::Hire);

            let hire_date = sample_day_in_year(year, &mut rng);
            let job_level = pick_level(&w.new_hire_levels, &mut rng);
            let age_span = u64::from(w.new_hire_age_max - w.new_hire_age_min) + 1;
            let age = w.new_hire_age_min + rng.next_u64_below(age_span) as u32;
            let birth_date = hire_date
                - Duration::days((f64::from(age) * DAYS_PER_YEAR).ceil() as i64)
                - Duration::days(rng.next_u64_below(365) as i64);
            let compensation = starting_compensation(w, job_level, &mut rng);

            out.events.push(WorkforceEvent::new(
                employee_id,
                year,
                hire_date,
                EventSource::Hire,
                EventPayload::Hire { job_level, compensation, birth_date },
            ));
        }

        log::debug!(
            "year={year} hire: {} events (active={}, growth={:.3})",
            out.events.len(),
            ctx.prior.active_count(),
            w.target_growth_rate,
        );
        Ok(out)
    }
}

fn pick_level(levels: &[LevelWeight], rng: &mut EmployeeRng) -> u32 {
    let total: f64 = levels.iter().map(|l| l.weight).sum();
    let mut roll = rng.next_f64() * total;
    for l in levels {
        if roll < l.weight {
            return l.level;
        }
        roll -= l.weight;
    }
    levels.last().map_or(1, |l| l.level)
}

fn starting_compensation(w: &WorkforceConfig, job_level: u32, rng: &mut EmployeeRng) -> f64 {
    match w.compensation_by_level.iter().find(|c| c.level == job_level) {
        Some(range) => round_cents(rng.uniform(range.min, range.max)),
        None => 0.0,
    }
}
