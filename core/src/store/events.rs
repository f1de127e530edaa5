//! Store methods for the event log.

use super::SimStore;
use crate::{
    error::SimResult,
    event::{EventLogEntry, WorkforceEvent, YearlyEventLog},
    types::SimYear,
};
use rusqlite::{params, Connection};

pub(super) fn insert_events(conn: &Connection, scenario_id: &str, log: &YearlyEventLog) -> SimResult<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO event_log (
            scenario_id, employee_id, simulation_year, event_sequence, event_type,
            effective_date, source, data_quality_flag, payload
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;
    for event in &log.events {
        let e = EventLogEntry::from_event(scenario_id, event)?;
        stmt.execute(params![
            e.scenario_id,
            e.employee_id,
            e.simulation_year,
            e.event_sequence,
            e.event_type,
            e.effective_date,
            e.source,
            e.data_quality_flag,
            e.payload,
        ])?;
    }
    Ok(())
}

impl SimStore {
    /// Event log rows for a year in canonical order
    /// (employee, sequence).
    pub fn events_for_year(&self, scenario_id: &str, year: SimYear) -> SimResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT scenario_id, employee_id, simulation_year, event_sequence, event_type,
                    effective_date, source, data_quality_flag, payload
             FROM event_log WHERE scenario_id = ?1 AND simulation_year = ?2
             ORDER BY employee_id ASC, event_sequence ASC",
        )?;
        let entries = stmt
            .query_map(params![scenario_id, year], |row| {
                Ok(EventLogEntry {
                    scenario_id: row.get(0)?,
                    employee_id: row.get(1)?,
                    simulation_year: row.get(2)?,
                    event_sequence: row.get(3)?,
                    event_type: row.get(4)?,
                    effective_date: row.get(5)?,
                    source: row.get(6)?,
                    data_quality_flag: row.get(7)?,
                    payload: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Typed events for a year.
    pub fn workforce_events_for_year(&self, scenario_id: &str, year: SimYear) -> SimResult<Vec<WorkforceEvent>> {
        self.events_for_year(scenario_id, year)?
            .iter()
            .map(EventLogEntry::to_event)
            .collect()
    }
}
