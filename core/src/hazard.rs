//! Hazard model store: versioned probability tables and IRS limits.
//!
//! Tables are materialised once per scenario from the resolved config,
//! keyed by (age_band, tenure_band, job_level). Generators only look up;
//! nothing here is mutated during a run.

use crate::{
    config::{Band, IrsLimits, SimConfig},
    error::{config_err, SimResult},
    types::SimYear,
};
use std::collections::BTreeMap;

/// Index of a band inside its band list.
pub type BandIndex = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HazardKey {
    pub age_band: BandIndex,
    pub tenure_band: BandIndex,
    pub job_level: u32,
}

/// Find the band containing `value`. Bands are half-open `[min, max)`;
/// the topmost band is unbounded. Values below the first band clamp to it.
pub fn band_index(bands: &[Band], value: f64) -> BandIndex {
    bands
        .iter()
        .position(|b| b.contains(value))
        .unwrap_or(0)
}

#[derive(Debug, Clone)]
pub struct HazardTable {
    entries: BTreeMap<HazardKey, f64>,
}

impl HazardTable {
    /// Probability for a key. Levels outside the table fall back to the
    /// nearest tabulated level for the same age/tenure band.
    pub fn probability(&self, key: HazardKey) -> f64 {
        if let Some(p) = self.entries.get(&key) {
            return *p;
        }
        self.entries
            .range(
                HazardKey { job_level: 0, ..key }..=HazardKey { job_level: u32::MAX, ..key },
            )
            .min_by_key(|(k, _)| k.job_level.abs_diff(key.job_level))
            .map(|(_, p)| *p)
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All lookup data for one scenario.
#[derive(Debug, Clone)]
pub struct HazardTables {
    pub version: String,
    age_bands: Vec<Band>,
    tenure_bands: Vec<Band>,
    pub termination: HazardTable,
    pub promotion: HazardTable,
    pub merit: HazardTable,
    irs_limits: BTreeMap<SimYear, IrsLimits>,
    earliest_limits: IrsLimits,
}

impl HazardTables {
    pub fn from_config(config: &SimConfig) -> SimResult<Self> {
        let age_bands = config.bands.age_bands.clone();
        let tenure_bands = config.bands.tenure_bands.clone();
        let h = &config.hazards;

        let mut levels: Vec<u32> = config
            .workforce
            .compensation_by_level
            .iter()
            .map(|c| c.level)
            .chain(h.termination.level_multipliers.keys().copied())
            .chain(1..=h.promotion.max_level.max(1))
            .collect();
        levels.sort_unstable();
        levels.dedup();

        let mut termination = BTreeMap::new();
        let mut promotion = BTreeMap::new();
        let mut merit = BTreeMap::new();

        for (ai, age) in age_bands.iter().enumerate() {
            for (ti, tenure) in tenure_bands.iter().enumerate() {
                for &level in &levels {
                    let key = HazardKey { age_band: ai, tenure_band: ti, job_level: level };

                    let t = h.termination.base_rate
                        * multiplier(&h.termination.age_multipliers, &age.label)
                        * multiplier(&h.termination.tenure_multipliers, &tenure.label)
                        * h.termination.level_multipliers.get(&level).copied().unwrap_or(1.0);
                    termination.insert(key, t.clamp(0.0, 1.0));

                    let p = if level >= h.promotion.max_level {
                        0.0
                    } else {
                        let dampening =
                            (1.0 - h.promotion.level_dampener * level.saturating_sub(1) as f64).max(0.0);
                        h.promotion.base_rate
                            * multiplier(&h.promotion.age_multipliers, &age.label)
                            * multiplier(&h.promotion.tenure_multipliers, &tenure.label)
                            * dampening
                    };
                    promotion.insert(key, p.clamp(0.0, 1.0));

                    let m = h
                        .merit
                        .level_eligibility
                        .get(&level)
                        .copied()
                        .unwrap_or(h.merit.eligibility_rate);
                    merit.insert(key, m.clamp(0.0, 1.0));
                }
            }
        }

        let irs_limits: BTreeMap<SimYear, IrsLimits> = config
            .irs_limits
            .iter()
            .map(|l| (l.plan_year, l.clone()))
            .collect();
        let earliest_limits = irs_limits
            .values()
            .next()
            .cloned()
            .ok_or_else(|| config_err("irs_limits", "at least one plan year is required"))?;

        log::debug!(
            "hazards: version={} built {} cells per table",
            h.version,
            termination.len()
        );

        Ok(Self {
            version: h.version.clone(),
            age_bands,
            tenure_bands,
            termination: HazardTable { entries: termination },
            promotion: HazardTable { entries: promotion },
            merit: HazardTable { entries: merit },
            irs_limits,
            earliest_limits,
        })
    }

    pub fn key_for(&self, age: u32, tenure: u32, job_level: u32) -> HazardKey {
        HazardKey {
            age_band: band_index(&self.age_bands, age as f64),
            tenure_band: band_index(&self.tenure_bands, tenure as f64),
            job_level,
        }
    }

    pub fn age_band_label(&self, age: u32) -> &str {
        &self.age_bands[band_index(&self.age_bands, age as f64)].label
    }

    pub fn tenure_band_label(&self, tenure: u32) -> &str {
        &self.tenure_bands[band_index(&self.tenure_bands, tenure as f64)].label
    }

    /// IRS limits for a plan year: the latest tabulated year not after
    /// `year`, or the earliest tabulated year when `year` precedes them all.
    pub fn irs_limits(&self, year: SimYear) -> &IrsLimits {
        self.irs_limits
            .range(..=year)
            .next_back()
            .map(|(_, l)| l)
            .unwrap_or(&self.earliest_limits)
    }
}

fn multiplier(map: &BTreeMap<String, f64>, label: &str) -> f64 {
    map.get(label).copied().unwrap_or(1.0)
}
