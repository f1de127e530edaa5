//! Store methods for the starting census.

use super::{opt_date_text, parse_date, parse_opt_date, SimStore};
use crate::{census::CensusRecord, error::SimResult};
use rusqlite::params;

impl SimStore {
    pub fn insert_census(&self, scenario_id: &str, records: &[CensusRecord]) -> SimResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO census (
                    scenario_id, employee_id, hire_date, birth_date, job_level,
                    base_compensation, initial_deferral_rate, enrollment_date
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for r in records {
                stmt.execute(params![
                    scenario_id,
                    r.employee_id,
                    opt_date_text(r.hire_date),
                    r.birth_date.to_string(),
                    r.job_level,
                    r.base_compensation,
                    r.initial_deferral_rate,
                    opt_date_text(r.enrollment_date),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn census(&self, scenario_id: &str) -> SimResult<Vec<CensusRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT employee_id, hire_date, birth_date, job_level, base_compensation,
                    initial_deferral_rate, enrollment_date
             FROM census WHERE scenario_id = ?1 ORDER BY employee_id ASC",
        )?;
        let records = stmt
            .query_map(params![scenario_id], |row| {
                Ok(CensusRecord {
                    employee_id: row.get(0)?,
                    hire_date: parse_opt_date(1, row.get(1)?)?,
                    birth_date: parse_date(2, &row.get::<_, String>(2)?)?,
                    job_level: row.get(3)?,
                    base_compensation: row.get(4)?,
                    initial_deferral_rate: row.get(5)?,
                    enrollment_date: parse_opt_date(6, row.get(6)?)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}
