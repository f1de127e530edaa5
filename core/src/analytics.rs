//! Read-side analytics over finalized snapshots.
//!
//! Every function here is pure over snapshot rows; the store supplies
//! the rows for a (scenario, year).

use crate::{
    snapshot::{DetailedStatus, WorkforceSnapshotRow},
    types::SimYear,
};
use serde::{Deserialize, Serialize};

/// Deferral-rate buckets as (label, exclusive upper bound).
/// Every rate lands in exactly one bucket.
pub const DEFERRAL_BUCKETS: [(&str, f64); 5] = [
    ("0%", 0.0),
    ("0-3%", 0.03),
    ("3-6%", 0.06),
    ("6-10%", 0.10),
    ("10%+", f64::INFINITY),
];

const RATE_EPSILON: f64 = 1e-9;

pub fn bucket_index(rate: f64) -> usize {
    if rate <= RATE_EPSILON {
        return 0;
    }
    DEFERRAL_BUCKETS
        .iter()
        .skip(1)
        .position(|(_, upper)| rate < upper - RATE_EPSILON)
        .map_or(DEFERRAL_BUCKETS.len() - 1, |i| i + 1)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DistributionBucket {
    pub label: String,
    pub employees: usize,
    pub percentage: f64,
}

/// Share of enrolled active employees in each deferral bucket.
/// Empty when nobody participates.
pub fn deferral_distribution(rows: &[WorkforceSnapshotRow]) -> Vec<DistributionBucket> {
    let mut counts = [0usize; DEFERRAL_BUCKETS.len()];
    let mut total = 0usize;
    for r in rows.iter().filter(|r| r.is_active() && r.is_enrolled) {
        counts[bucket_index(r.current_deferral_rate)] += 1;
        total += 1;
    }
    if total == 0 {
        return Vec::new();
    }
    DEFERRAL_BUCKETS
        .iter()
        .zip(counts)
        .map(|((label, _), employees)| DistributionBucket {
            label: label.to_string(),
            employees,
            percentage: employees as f64 * 100.0 / total as f64,
        })
        .collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct YearSummary {
    pub simulation_year: SimYear,
    pub active: usize,
    pub new_hires: usize,
    pub experienced_terminations: usize,
    pub new_hire_terminations: usize,
    pub enrolled_active: usize,
    pub participation_rate: f64,
    pub average_deferral_rate: f64,
    pub total_compensation: f64,
    pub employee_contributions: f64,
    pub employer_contributions: f64,
}

pub fn year_summary(year: SimYear, rows: &[WorkforceSnapshotRow]) -> YearSummary {
    let mut s = YearSummary { simulation_year: year, ..Default::default() };
    let mut deferral_sum = 0.0;
    for r in rows {
        match r.detailed_status {
            DetailedStatus::ContinuousActive => s.active += 1,
            DetailedStatus::NewHireActive => {
                s.active += 1;
                s.new_hires += 1;
            }
            DetailedStatus::ExperiencedTermination => s.experienced_terminations += 1,
            DetailedStatus::NewHireTermination => {
                s.new_hires += 1;
                s.new_hire_terminations += 1;
            }
        }
        if r.is_active() && r.is_enrolled {
            s.enrolled_active += 1;
            deferral_sum += r.current_deferral_rate;
        }
        s.total_compensation += r.prorated_compensation;
        s.employee_contributions += r.employee_contribution;
        s.employer_contributions += r.employer_match + r.employer_core;
    }
    s.participation_rate = ratio(s.enrolled_active as f64, s.active as f64);
    s.average_deferral_rate = ratio(deferral_sum, s.enrolled_active as f64);
    s
}

/// Zero when the denominator is zero.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
