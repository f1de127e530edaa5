//! Enrollment generator.
//!
//! At most one enrollment per employee per year, from one of:
//!
//!   1. Census backfill (first year only): employees the census already
//!      shows as enrolled get a synthetic event so every participant's
//!      enrollment is present in the log.
//!   2. Auto-enrollment: this year's hires after the eligibility wait,
//!      unless they opt out. With scope `all_eligible`, non-enrolled
//!      census employees are also auto-enrolled in the first year.
//!   3. Voluntary: non-enrolled employees active at the end of year N-1
//!      elect a rate from the configured list.
//!
//! Enrollments dated after a same-year termination are dropped when the
//! yearly log is assembled.

use crate::{
    config::AutoEnrollmentScope,
    error::SimResult,
    event::{DataQualityFlag, EnrollmentMethod, EventPayload, EventSource, WorkforceEvent},
    generator::{EventGenerator, GeneratorContext, GeneratorOutput, GeneratorStage},
    rng::SamplingPurpose,
    types::{year_end, year_start},
};
use chrono::Duration;

pub struct EnrollmentGenerator;

impl EventGenerator for EnrollmentGenerator {
    fn source(&self) -> EventSource {
        EventSource::Enrollment
    }

    fn stage(&self) -> GeneratorStage {
        GeneratorStage::Dependent
    }

    fn generate(&self, ctx: &GeneratorContext<'_>) -> SimResult<GeneratorOutput> {
        let year = ctx.simulation_year;
        let plan = &ctx.config.plan;
        let auto = &plan.auto_enrollment;
        let voluntary = &plan.voluntary_enrollment;
        let wait = Duration::days(i64::from(plan.eligibility_waiting_days));
        let mut out = GeneratorOutput::default();
        let (mut backfilled, mut auto_enrolled, mut opted_out, mut elected) = (0, 0, 0, 0);

        for row in ctx.prior.active() {
            if let Some(prior) = ctx.prior_enrollment(row) {
                if ctx.is_first_year() {
                    out.events.push(
                        WorkforceEvent::new(
                            row.employee_id.clone(),
                            year,
                            prior.enrollment_date,
                            EventSource::CensusBackfill,
                            EventPayload::Enrollment {
                                deferral_rate: prior.deferral_rate,
                                method: EnrollmentMethod::Census,
                            },
                        )
                        .with_flag(DataQualityFlag::SyntheticBackfill),
                    );
                    backfilled += 1;
                }
                continue;
            }

            let mut rng = ctx.rng(&row.employee_id, SamplingPurpose::Enrollment);
            let earliest = year_start(year).max(row.hire_date);

            if auto.enabled && auto.scope == AutoEnrollmentScope::AllEligible && ctx.is_first_year() {
                let eligible = (row.hire_date + wait).max(year_start(year));
                if eligible <= year_end(year) {
                    if rng.chance(auto.opt_out_rate) {
                        opted_out += 1;
                    } else {
                        out.events.push(WorkforceEvent::new(
                            row.employee_id.clone(),
                            year,
                            eligible,
                            EventSource::Enrollment,
                            EventPayload::Enrollment {
                                deferral_rate: auto.default_deferral_rate,
                                method: EnrollmentMethod::Auto,
                            },
                        ));
                        auto_enrolled += 1;
                    }
                    continue;
                }
            }

            if voluntary.enabled && !voluntary.deferral_rates.is_empty() && rng.chance(voluntary.annual_rate) {
                let pick = rng.next_u64_below(voluntary.deferral_rates.len() as u64) as usize;
                out.events.push(WorkforceEvent::new(
                    row.employee_id.clone(),
                    year,
                    earliest,
                    EventSource::Enrollment,
                    EventPayload::Enrollment {
                        deferral_rate: voluntary.deferral_rates[pick],
                        method: EnrollmentMethod::Voluntary,
                    },
                ));
                elected += 1;
            }
        }

        if auto.enabled {
            for hire in ctx.stage_one_hires() {
                let mut rng = ctx.rng(&hire.employee_id, SamplingPurpose::Enrollment);
                if rng.chance(auto.opt_out_rate) {
                    opted_out += 1;
                    continue;
                }
                out.events.push(WorkforceEvent::new(
                    hire.employee_id.clone(),
                    year,
                    (hire.effective_date + wait).min(year_end(year)),
                    EventSource::Enrollment,
                    EventPayload::Enrollment {
                        deferral_rate: auto.default_deferral_rate,
                        method: EnrollmentMethod::Auto,
                    },
                ));
                auto_enrolled += 1;
            }
        }

        log::debug!(
            "year={year} enrollment: {} events (backfill={backfilled}, auto={auto_enrolled}, \
             voluntary={elected}, opted_out={opted_out})",
            out.events.len()
        );
        Ok(out)
    }
}
