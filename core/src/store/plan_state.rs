use super::{opt_date_text, parse_enum, parse_opt_date, SimStore};
use crate::{
    accumulator::{PlanStateRow, RateSource},
    error::SimResult,
    types::SimYear,
};
use rusqlite::{params, Connection};

pub(super) fn insert_plan_state(conn: &Connection, scenario_id: &str, rows: &[PlanStateRow]) -> SimResult<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO plan_state (
            scenario_id, employee_id, simulation_year, is_enrolled, enrollment_date,
            current_deferral_rate, escalations_received, total_escalation_amount,
            last_escalation_year, rate_source
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )?;
    for r in rows {
        stmt.execute(params![
            scenario_id,
            r.employee_id,
            r.simulation_year,
            r.is_enrolled,
            opt_date_text(r.enrollment_date),
            r.current_deferral_rate,
            r.escalations_received,
            r.total_escalation_amount,
            r.last_escalation_year,
            r.rate_source.as_str(),
        ])?;
    }
    Ok(())
}

impl SimStore {
    pub fn plan_state_for_year(&self, scenario_id: &str, year: SimYear) -> SimResult<Vec<PlanStateRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT employee_id, simulation_year, is_enrolled, enrollment_date,
                    current_deferral_rate, escalations_received, total_escalation_amount,
                    last_escalation_year, rate_source
             FROM plan_state WHERE scenario_id = ?1 AND simulation_year = ?2
             ORDER BY employee_id ASC",
        )?;
        let rows = stmt
            .query_map(params![scenario_id, year], |row| {
                Ok(PlanStateRow {
                    employee_id: row.get(0)?,
                    simulation_year: row.get(1)?,
                    is_enrolled: row.get(2)?,
                    enrollment_date: parse_opt_date(3, row.get(3)?)?,
                    current_deferral_rate: row.get(4)?,
                    escalations_received: row.get(5)?,
                    total_escalation_amount: row.get(6)?,
                    last_escalation_year: row.get(7)?,
                    rate_source: parse_enum(8, &row.get::<_, String>(8)?, RateSource::parse)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
