//! Plan contributions for one employee-year.
//!
//! Compensation is capped at the 401(a)(17) limit before any formula is
//! applied. Employee deferrals are capped at the 402(g) limit, raised by
//! the catch-up limit from the catch-up age. Employer match follows the
//! tiered formula on the effective (post-cap) deferral rate. Employer
//! core needs the tenure threshold. The 415(c) annual-additions limit
//! trims core first, then match.
//!
//! Zero or negative compensation yields zero everywhere.

use crate::{
    config::{IrsLimits, MatchFormula, PlanDesignConfig},
    types::round_cents,
};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Contributions {
    pub capped_compensation: f64,
    pub employee_deferral: f64,
    pub employer_match: f64,
    pub employer_core: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct ContributionInput {
    pub compensation: f64,
    pub deferral_rate: f64,
    pub is_enrolled: bool,
    pub age: u32,
    pub tenure: u32,
}

pub fn compute(input: ContributionInput, limits: &IrsLimits, plan: &PlanDesignConfig) -> Contributions {
    if input.compensation <= 0.0 || !input.compensation.is_finite() {
        return Contributions::default();
    }
    let capped = input.compensation.min(limits.compensation_limit);

    let (deferral, catch_up) = if input.is_enrolled && input.deferral_rate > 0.0 {
        let elected = capped * input.deferral_rate;
        let regular = elected.min(limits.deferral_limit);
        let catch_up = if input.age >= limits.catch_up_age {
            (elected - regular).min(limits.catch_up_limit).max(0.0)
        } else {
            0.0
        };
        (regular, catch_up)
    } else {
        (0.0, 0.0)
    };

    let effective_rate = (deferral + catch_up) / capped;
    let mut employer_match = if input.is_enrolled {
        capped * match_rate(&plan.employer_match, effective_rate)
    } else {
        0.0
    };

    let core = &plan.employer_core;
    let mut employer_core = if core.enabled && input.tenure >= core.min_tenure_years {
        capped * core.rate
    } else {
        0.0
    };

    // 415(c) excludes catch-up deferrals.
    let mut excess = (deferral + employer_match + employer_core - limits.annual_additions_limit).max(0.0);
    let trimmed = excess.min(employer_core);
    employer_core -= trimmed;
    excess -= trimmed;
    employer_match -= excess.min(employer_match);

    Contributions {
        capped_compensation: round_cents(capped),
        employee_deferral: round_cents(deferral + catch_up),
        employer_match: round_cents(employer_match),
        employer_core: round_cents(employer_core),
    }
}

/// Match as a fraction of pay for an effective deferral rate.
pub fn match_rate(formula: &MatchFormula, deferral_rate: f64) -> f64 {
    formula
        .tiers
        .iter()
        .map(|t| {
            let covered = deferral_rate.min(t.employee_max) - t.employee_min;
            covered.max(0.0) * t.match_rate
        })
        .sum()
}
