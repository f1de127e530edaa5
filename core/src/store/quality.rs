//! Store methods for data-quality issues and compensation baselines.

use super::{parse_enum, SimStore};
use crate::{
    error::SimResult,
    types::{EmployeeId, SimYear},
    validation::{DataQualityIssue, IssueKind},
};
use rusqlite::{params, Connection};
use std::collections::BTreeMap;

pub(super) fn insert_issues(conn: &Connection, scenario_id: &str, issues: &[DataQualityIssue]) -> SimResult<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO data_quality_issue (scenario_id, simulation_year, employee_id, kind, detail)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for i in issues {
        stmt.execute(params![scenario_id, i.simulation_year, i.employee_id, i.kind.as_str(), i.detail])?;
    }
    Ok(())
}

pub(super) fn insert_baselines(
    conn: &Connection,
    scenario_id: &str,
    year: SimYear,
    baselines: &[(EmployeeId, f64)],
) -> SimResult<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO compensation_baseline (scenario_id, employee_id, baseline_year, compensation)
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (employee_id, compensation) in baselines {
        stmt.execute(params![scenario_id, employee_id, year, compensation])?;
    }
    Ok(())
}

impl SimStore {
    /// Every issue recorded for a scenario, in insertion order.
    pub fn data_quality_issues(&self, scenario_id: &str) -> SimResult<Vec<DataQualityIssue>> {
        let mut stmt = self.conn.prepare(
            "SELECT employee_id, simulation_year, kind, detail FROM data_quality_issue
             WHERE scenario_id = ?1 ORDER BY id ASC",
        )?;
        let issues = stmt
            .query_map(params![scenario_id], |row| {
                Ok(DataQualityIssue {
                    employee_id: row.get(0)?,
                    simulation_year: row.get(1)?,
                    kind: parse_enum(2, &row.get::<_, String>(2)?, IssueKind::parse)?,
                    detail: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(issues)
    }

    /// Each employee's first observed compensation.
    pub fn compensation_baselines(&self, scenario_id: &str) -> SimResult<BTreeMap<EmployeeId, f64>> {
        let mut stmt = self.conn.prepare(
            "SELECT employee_id, compensation FROM compensation_baseline WHERE scenario_id = ?1",
        )?;
        let map = stmt
            .query_map(params![scenario_id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(map)
    }
}
