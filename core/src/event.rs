//! Workforce events and the yearly event log.
//!
//! RULE: Events are immutable and append-only.
//! Generators emit events; nothing downstream ever edits one.
//! All state (plan state, snapshots) is derived from the log.

use crate::{
    error::{SimError, SimResult},
    types::{EmployeeId, ScenarioId, SimYear},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Hire,
    Termination,
    Promotion,
    Merit,
    Enrollment,
    Escalation,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hire => "hire",
            Self::Termination => "termination",
            Self::Promotion => "promotion",
            Self::Merit => "merit",
            Self::Enrollment => "enrollment",
            Self::Escalation => "escalation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "hire" => Self::Hire,
            "termination" => Self::Termination,
            "promotion" => Self::Promotion,
            "merit" => Self::Merit,
            "enrollment" => Self::Enrollment,
            "escalation" => Self::Escalation,
            _ => return None,
        })
    }

    /// Tie-break order for events on the same date.
    /// Termination is always last so same-day changes precede it.
    pub fn ordering_priority(&self) -> u8 {
        match self {
            Self::Hire => 0,
            Self::Enrollment => 1,
            Self::Escalation => 2,
            Self::Promotion => 3,
            Self::Merit => 4,
            Self::Termination => 5,
        }
    }
}

/// Which generator produced an event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    Hire,
    Termination,
    NewHireTermination,
    Promotion,
    Merit,
    Enrollment,
    CensusBackfill,
    Escalation,
}

impl EventSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hire => "hire",
            Self::Termination => "termination",
            Self::NewHireTermination => "new_hire_termination",
            Self::Promotion => "promotion",
            Self::Merit => "merit",
            Self::Enrollment => "enrollment",
            Self::CensusBackfill => "census_backfill",
            Self::Escalation => "escalation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "hire" => Self::Hire,
            "termination" => Self::Termination,
            "new_hire_termination" => Self::NewHireTermination,
            "promotion" => Self::Promotion,
            "merit" => Self::Merit,
            "enrollment" => Self::Enrollment,
            "census_backfill" => Self::CensusBackfill,
            "escalation" => Self::Escalation,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DataQualityFlag {
    Valid,
    /// Synthesised from census state rather than observed in-simulation.
    SyntheticBackfill,
}

impl DataQualityFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::SyntheticBackfill => "synthetic_backfill",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "valid" => Some(Self::Valid),
            "synthetic_backfill" => Some(Self::SyntheticBackfill),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    Voluntary,
    Involuntary,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Voluntary => "voluntary",
            Self::Involuntary => "involuntary",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "voluntary" => Some(Self::Voluntary),
            "involuntary" => Some(Self::Involuntary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentMethod {
    Census,
    Auto,
    Voluntary,
}

/// Type-specific event data, persisted as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    Hire {
        job_level: u32,
        compensation: f64,
        birth_date: NaiveDate,
    },
    Termination {
        reason: TerminationReason,
        probability: f64,
    },
    Promotion {
        from_level: u32,
        to_level: u32,
        increase_pct: f64,
        previous_compensation: f64,
    },
    Merit {
        raise_pct: f64,
        previous_compensation: f64,
    },
    Enrollment {
        deferral_rate: f64,
        method: EnrollmentMethod,
    },
    Escalation {
        increment: f64,
        previous_rate: f64,
        new_rate: f64,
    },
}

impl EventPayload {
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Hire { .. } => EventType::Hire,
            Self::Termination { .. } => EventType::Termination,
            Self::Promotion { .. } => EventType::Promotion,
            Self::Merit { .. } => EventType::Merit,
            Self::Enrollment { .. } => EventType::Enrollment,
            Self::Escalation { .. } => EventType::Escalation,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkforceEvent {
    pub employee_id: EmployeeId,
    pub event_type: EventType,
    pub effective_date: NaiveDate,
    pub simulation_year: SimYear,
    pub payload: EventPayload,
    /// 1-based order of this event among the employee's events for the
    /// year. Zero until the yearly log is assembled.
    pub event_sequence: u32,
    pub source: EventSource,
    pub data_quality_flag: DataQualityFlag,
}

impl WorkforceEvent {
    pub fn new(
        employee_id: impl Into<EmployeeId>,
        simulation_year: SimYear,
        effective_date: NaiveDate,
        source: EventSource,
        payload: EventPayload,
    ) -> Self {
        Self {
            employee_id: employee_id.into(),
            event_type: payload.event_type(),
            effective_date,
            simulation_year,
            payload,
            event_sequence: 0,
            source,
            data_quality_flag: DataQualityFlag::Valid,
        }
    }

    pub fn with_flag(mut self, flag: DataQualityFlag) -> Self {
        self.data_quality_flag = flag;
        self
    }
}

/// The append-only union of every generator's output for one year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearlyEventLog {
    pub simulation_year: SimYear,
    pub events: Vec<WorkforceEvent>,
    /// Events discarded because they fell after the employee's
    /// termination date in the same year.
    pub dropped_after_termination: usize,
}

impl YearlyEventLog {
    /// Merge generator batches into the canonical ordered log.
    ///
    /// Order: employee_id, effective_date, event-type priority, source.
    /// Events dated after the employee's termination are dropped, then
    /// `event_sequence` is numbered 1..k per employee.
    pub fn assemble(simulation_year: SimYear, batches: Vec<Vec<WorkforceEvent>>) -> Self {
        let mut events: Vec<WorkforceEvent> = batches.into_iter().flatten().collect();

        let termination_dates: BTreeMap<EmployeeId, NaiveDate> = events
            .iter()
            .filter(|e| e.event_type == EventType::Termination)
            .map(|e| (e.employee_id.clone(), e.effective_date))
            .collect();

        let before = events.len();
        events.retain(|e| {
            e.event_type == EventType::Termination
                || termination_dates
                    .get(&e.employee_id)
                    .map_or(true, |term| e.effective_date <= *term)
        });
        let dropped_after_termination = before - events.len();

        events.sort_by(|a, b| {
            a.employee_id
                .cmp(&b.employee_id)
                .then(a.effective_date.cmp(&b.effective_date))
                .then(a.event_type.ordering_priority().cmp(&b.event_type.ordering_priority()))
                .then(a.source.cmp(&b.source))
        });

        let mut sequence = 0u32;
        let mut current: Option<EmployeeId> = None;
        for event in &mut events {
            if current.as_deref() != Some(event.employee_id.as_str()) {
                current = Some(event.employee_id.clone());
                sequence = 0;
            }
            sequence += 1;
            event.event_sequence = sequence;
        }

        Self { simulation_year, events, dropped_after_termination }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn of_type(&self, event_type: EventType) -> impl Iterator<Item = &WorkforceEvent> {
        self.events.iter().filter(move |e| e.event_type == event_type)
    }

    /// Events grouped by employee, in log order.
    pub fn by_employee(&self) -> BTreeMap<&str, Vec<&WorkforceEvent>> {
        let mut map: BTreeMap<&str, Vec<&WorkforceEvent>> = BTreeMap::new();
        for e in &self.events {
            map.entry(e.employee_id.as_str()).or_default().push(e);
        }
        map
    }

    pub fn count_by_type(&self) -> BTreeMap<EventType, usize> {
        let mut counts = BTreeMap::new();
        for e in &self.events {
            *counts.entry(e.event_type).or_insert(0) += 1;
        }
        counts
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventLogEntry {
    pub scenario_id: ScenarioId,
    pub employee_id: EmployeeId,
    pub simulation_year: SimYear,
    pub event_sequence: u32,
    pub event_type: String,
    pub effective_date: String,
    pub source: String,
    pub data_quality_flag: String,
    pub payload: String, // JSON-serialized EventPayload
}

impl EventLogEntry {
    pub fn from_event(scenario_id: &str, event: &WorkforceEvent) -> serde_json::Result<Self> {
        Ok(Self {
            scenario_id: scenario_id.to_string(),
            employee_id: event.employee_id.clone(),
            simulation_year: event.simulation_year,
            event_sequence: event.event_sequence,
            event_type: event.event_type.as_str().to_string(),
            effective_date: event.effective_date.to_string(),
            source: event.source.as_str().to_string(),
            data_quality_flag: event.data_quality_flag.as_str().to_string(),
            payload: serde_json::to_string(&event.payload)?,
        })
    }

    /// Decode back into a typed event. Unknown tags are reported as
    /// malformed rather than guessed.
    pub fn to_event(&self) -> SimResult<WorkforceEvent> {
        let malformed = |what: &str| SimError::MalformedSnapshot {
            year: self.simulation_year,
            reason: format!("event log row for '{}' has {what}", self.employee_id),
        };
        let payload: EventPayload = serde_json::from_str(&self.payload)?;
        Ok(WorkforceEvent {
            employee_id: self.employee_id.clone(),
            event_type: EventType::parse(&self.event_type)
                .ok_or_else(|| malformed("an unknown event_type"))?,
            effective_date: self
                .effective_date
                .parse()
                .map_err(|_| malformed("an unparseable effective_date"))?,
            simulation_year: self.simulation_year,
            payload,
            event_sequence: self.event_sequence,
            source: EventSource::parse(&self.source).ok_or_else(|| malformed("an unknown source"))?,
            data_quality_flag: DataQualityFlag::parse(&self.data_quality_flag)
                .ok_or_else(|| malformed("an unknown data_quality_flag"))?,
        })
    }
}
