//! Store methods for the workforce snapshot.

use super::{opt_date_text, parse_date, parse_enum, parse_opt_date, SimStore};
use crate::{
    error::SimResult,
    event::TerminationReason,
    snapshot::{CompensationQualityFlag, DetailedStatus, EmploymentStatus, WorkforceSnapshotRow},
    types::SimYear,
};
use rusqlite::{params, Connection, Row};

const SNAPSHOT_COLUMNS: &str = "employee_id, simulation_year, hire_date, birth_date, termination_date,
    termination_reason, employment_status, detailed_status, job_level, current_age,
    current_tenure, age_band, tenure_band, starting_compensation, current_compensation,
    prorated_compensation, compensation_quality_flag, is_enrolled, enrollment_date,
    current_deferral_rate, escalations_received, employee_contribution, employer_match,
    employer_core";

pub(super) fn insert_snapshot(conn: &Connection, scenario_id: &str, rows: &[WorkforceSnapshotRow]) -> SimResult<()> {
    let mut stmt = conn.prepare_cached(&format!(
        "INSERT INTO workforce_snapshot (scenario_id, {SNAPSHOT_COLUMNS})
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                 ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25)"
    ))?;
    for r in rows {
        stmt.execute(params![
            scenario_id,
            r.employee_id,
            r.simulation_year,
            r.hire_date.to_string(),
            r.birth_date.to_string(),
            opt_date_text(r.termination_date),
            r.termination_reason.map(|t| t.as_str()),
            r.employment_status.as_str(),
            r.detailed_status.as_str(),
            r.job_level,
            r.current_age,
            r.current_tenure,
            r.age_band,
            r.tenure_band,
            r.starting_compensation,
            r.current_compensation,
            r.prorated_compensation,
            r.compensation_quality_flag.as_str(),
            r.is_enrolled,
            opt_date_text(r.enrollment_date),
            r.current_deferral_rate,
            r.escalations_received,
            r.employee_contribution,
            r.employer_match,
            r.employer_core,
        ])?;
    }
    Ok(())
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<WorkforceSnapshotRow> {
    let termination_reason: Option<String> = row.get(5)?;
    Ok(WorkforceSnapshotRow {
        employee_id: row.get(0)?,
        simulation_year: row.get(1)?,
        hire_date: parse_date(2, &row.get::<_, String>(2)?)?,
        birth_date: parse_date(3, &row.get::<_, String>(3)?)?,
        termination_date: parse_opt_date(4, row.get(4)?)?,
        termination_reason: termination_reason
            .map(|t| parse_enum(5, &t, TerminationReason::parse))
            .transpose()?,
        employment_status: parse_enum(6, &row.get::<_, String>(6)?, EmploymentStatus::parse)?,
        detailed_status: parse_enum(7, &row.get::<_, String>(7)?, DetailedStatus::parse)?,
        job_level: row.get(8)?,
        current_age: row.get(9)?,
        current_tenure: row.get(10)?,
        age_band: row.get(11)?,
        tenure_band: row.get(12)?,
        starting_compensation: row.get(13)?,
        current_compensation: row.get(14)?,
        prorated_compensation: row.get(15)?,
        compensation_quality_flag: parse_enum(
            16,
            &row.get::<_, String>(16)?,
            CompensationQualityFlag::parse,
        )?,
        is_enrolled: row.get(17)?,
        enrollment_date: parse_opt_date(18, row.get(18)?)?,
        current_deferral_rate: row.get(19)?,
        escalations_received: row.get(20)?,
        employee_contribution: row.get(21)?,
        employer_match: row.get(22)?,
        employer_core: row.get(23)?,
    })
}

impl SimStore {
    /// Snapshot rows for (scenario, year), optionally filtered by
    /// employment status, ordered by employee_id.
    pub fn snapshot_for_year(
        &self,
        scenario_id: &str,
        year: SimYear,
        status: Option<EmploymentStatus>,
    ) -> SimResult<Vec<WorkforceSnapshotRow>> {
        let rows = match status {
            Some(status) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {SNAPSHOT_COLUMNS} FROM workforce_snapshot
                     WHERE scenario_id = ?1 AND simulation_year = ?2 AND employment_status = ?3
                     ORDER BY employee_id ASC"
                ))?;
                let rows = stmt
                    .query_map(params![scenario_id, year, status.as_str()], read_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {SNAPSHOT_COLUMNS} FROM workforce_snapshot
                     WHERE scenario_id = ?1 AND simulation_year = ?2
                     ORDER BY employee_id ASC"
                ))?;
                let rows = stmt
                    .query_map(params![scenario_id, year], read_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(rows)
    }
}
