//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! Every random draw is a pure function of
//! (scenario_seed, employee_id, simulation_year, purpose).
//!
//! Each draw key seeds its own short PCG stream. This means:
//!   - The order in which employees are visited never changes an outcome.
//!   - Generators can run on any thread, in any order.
//!   - Adding a new sampling purpose never changes existing streams.

use crate::types::SimYear;
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Stable 64-bit FNV-1a over a byte slice, continuing from `state`.
/// Platform- and release-independent, unlike `std::hash`.
fn fnv1a(mut state: u64, bytes: &[u8]) -> u64 {
    for b in bytes {
        state ^= u64::from(*b);
        state = state.wrapping_mul(FNV_PRIME);
    }
    state
}

/// Derive the stream seed for one draw key.
pub fn draw_seed(scenario_seed: u64, employee_id: &str, year: SimYear, purpose: SamplingPurpose) -> u64 {
    let mut h = fnv1a(FNV_OFFSET, employee_id.as_bytes());
    h = fnv1a(h, &[0xff]);
    h = fnv1a(h, &year.to_le_bytes());
    h = fnv1a(h, &(purpose as u64).to_le_bytes());
    h ^ scenario_seed.wrapping_mul(0x9e37_79b9_7f4a_7c15)
}

/// A deterministic RNG stream for a single (employee, year, purpose).
pub struct EmployeeRng {
    inner: Pcg64Mcg,
}

impl EmployeeRng {
    pub fn new(scenario_seed: u64, employee_id: &str, year: SimYear, purpose: SamplingPurpose) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(draw_seed(scenario_seed, employee_id, year, purpose)),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform float in [lo, hi). Returns `lo` when the range is empty.
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            return lo;
        }
        lo + (hi - lo) * self.next_f64()
    }

    /// Normal sample via Box-Muller. Consumes two draws.
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-12);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
        mean + std_dev * z
    }
}

/// Stable sampling purposes.
/// NEVER reorder or remove entries, only append.
/// Reordering changes every stream's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u64)]
pub enum SamplingPurpose {
    Termination = 0,
    NewHireTermination = 1,
    Promotion = 2,
    Merit = 3,
    Hire = 4,
    Enrollment = 5,
    Escalation = 6,
    // Add new purposes here, append only.
}
