//! Driver clock. Owns the year cursor and the phase state machine.
//!
//! Initialized → Generating(y) → Accumulating(y) → Snapshot(y)
//!   → Generating(y+1) … → Complete
//!
//! Any phase may move to Halted(y). Nothing leaves Complete or Halted.

use crate::{
    error::{SimError, SimResult},
    types::SimYear,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "phase", content = "year")]
pub enum DriverPhase {
    Initialized,
    Generating(SimYear),
    Accumulating(SimYear),
    Snapshot(SimYear),
    Complete,
    Halted(SimYear),
}

impl fmt::Display for DriverPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initialized => write!(f, "initialized"),
            Self::Generating(y) => write!(f, "generating({y})"),
            Self::Accumulating(y) => write!(f, "accumulating({y})"),
            Self::Snapshot(y) => write!(f, "snapshot({y})"),
            Self::Complete => write!(f, "complete"),
            Self::Halted(y) => write!(f, "halted({y})"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriverClock {
    pub start_year: SimYear,
    pub end_year: SimYear,
    pub phase: DriverPhase,
}

impl DriverClock {
    pub fn new(start_year: SimYear, end_year: SimYear) -> Self {
        Self { start_year, end_year, phase: DriverPhase::Initialized }
    }

    /// The year currently being processed, if any.
    pub fn current_year(&self) -> Option<SimYear> {
        match self.phase {
            DriverPhase::Generating(y)
            | DriverPhase::Accumulating(y)
            | DriverPhase::Snapshot(y)
            | DriverPhase::Halted(y) => Some(y),
            DriverPhase::Initialized | DriverPhase::Complete => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, DriverPhase::Complete | DriverPhase::Halted(_))
    }

    /// Move to `next`, rejecting anything but the documented edges.
    pub fn advance(&mut self, next: DriverPhase) -> SimResult<()> {
        use DriverPhase::*;
        let allowed = match (self.phase, next) {
            (Complete, _) | (Halted(_), _) => false,
            (_, Halted(_)) => true,
            (Initialized, Generating(y)) => y == self.start_year,
            (Snapshot(prev), Generating(y)) => y == prev + 1 && y <= self.end_year,
            (Generating(a), Accumulating(b)) => a == b,
            (Accumulating(a), Snapshot(b)) => a == b,
            (Snapshot(y), Complete) => y == self.end_year,
            _ => false,
        };
        if !allowed {
            return Err(SimError::InvalidTransition {
                from: self.phase.to_string(),
                to: next.to_string(),
            });
        }
        log::trace!("driver: {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Halt from whatever year is in progress (or the first year when
    /// nothing has started).
    pub fn halt(&mut self) {
        if self.is_terminal() {
            return;
        }
        let year = self.current_year().unwrap_or(self.start_year);
        self.phase = DriverPhase::Halted(year);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_every_year_in_order() {
        let mut c = DriverClock::new(2025, 2026);
        for y in 2025..=2026 {
            c.advance(DriverPhase::Generating(y)).unwrap();
            c.advance(DriverPhase::Accumulating(y)).unwrap();
            c.advance(DriverPhase::Snapshot(y)).unwrap();
        }
        c.advance(DriverPhase::Complete).unwrap();
        assert!(c.is_terminal());
    }

    #[test]
    fn cannot_skip_a_year() {
        let mut c = DriverClock::new(2025, 2027);
        c.advance(DriverPhase::Generating(2025)).unwrap();
        c.advance(DriverPhase::Accumulating(2025)).unwrap();
        c.advance(DriverPhase::Snapshot(2025)).unwrap();
        let err = c.advance(DriverPhase::Generating(2027)).unwrap_err();
        assert!(matches!(err, SimError::InvalidTransition { .. }));
    }

    #[test]
    fn cannot_snapshot_before_accumulating() {
        let mut c = DriverClock::new(2025, 2025);
        c.advance(DriverPhase::Generating(2025)).unwrap();
        assert!(c.advance(DriverPhase::Snapshot(2025)).is_err());
    }

    #[test]
    fn halted_is_final() {
        let mut c = DriverClock::new(2025, 2025);
        c.advance(DriverPhase::Generating(2025)).unwrap();
        c.halt();
        assert_eq!(c.phase, DriverPhase::Halted(2025));
        assert!(c.advance(DriverPhase::Accumulating(2025)).is_err());
    }
}
