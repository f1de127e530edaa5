//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The engine calls store methods; it never executes SQL directly.
//!
//! A simulation year becomes visible only through `commit_year`, which
//! writes everything for the year in one transaction.

use crate::{
    accumulator::PlanStateRow,
    error::SimResult,
    event::YearlyEventLog,
    snapshot::WorkforceSnapshotRow,
    types::{EmployeeId, SimYear},
    validation::DataQualityIssue,
};
use chrono::NaiveDate;
use rusqlite::{params, types::Type, Connection, OptionalExtension};

mod census;
mod events;
mod plan_state;
mod quality;
mod snapshot;

pub struct SimStore {
    conn: Connection,
}

/// Lifecycle of a scenario run row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Complete,
    Halted,
    Cancelled,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Complete => "complete",
            Self::Halted => "halted",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "complete" => Some(Self::Complete),
            "halted" => Some(Self::Halted),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioRun {
    pub scenario_id: String,
    pub seed: u64,
    pub hazard_version: String,
    pub start_year: SimYear,
    pub num_years: u32,
    pub config_json: String,
}

/// Everything one simulation year writes.
pub struct YearCommit<'a> {
    pub scenario_id: &'a str,
    pub simulation_year: SimYear,
    pub events: &'a YearlyEventLog,
    pub plan_state: &'a [PlanStateRow],
    pub snapshot: &'a [WorkforceSnapshotRow],
    pub issues: &'a [DataQualityIssue],
    /// Compensation baselines first observed this year.
    pub baselines: &'a [(EmployeeId, f64)],
}

/// Per-year counts recorded alongside each committed year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearCheckpoint {
    pub simulation_year: SimYear,
    pub event_count: usize,
    pub snapshot_rows: usize,
    pub active_count: usize,
}

impl SimStore {
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Scenario run ───────────────────────────────────────────

    pub fn insert_run(&self, run: &ScenarioRun) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO scenario_run
                (scenario_id, seed, hazard_version, start_year, num_years, config_json, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                run.scenario_id,
                run.seed as i64,
                run.hazard_version,
                run.start_year,
                run.num_years,
                run.config_json,
                RunStatus::Running.as_str(),
            ],
        )?;
        Ok(())
    }

    pub fn set_run_status(&self, scenario_id: &str, status: RunStatus) -> SimResult<()> {
        self.conn.execute(
            "UPDATE scenario_run SET status = ?2 WHERE scenario_id = ?1",
            params![scenario_id, status.as_str()],
        )?;
        Ok(())
    }

    pub fn run_status(&self, scenario_id: &str) -> SimResult<Option<RunStatus>> {
        let status: Option<String> = self
            .conn
            .query_row(
                "SELECT status FROM scenario_run WHERE scenario_id = ?1",
                params![scenario_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(status.as_deref().and_then(RunStatus::parse))
    }

    /// Delete every row belonging to a scenario. A re-run replaces the
    /// previous results wholesale; nothing is patched in place.
    pub fn clear_scenario(&self, scenario_id: &str) -> SimResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for table in [
            "year_checkpoint",
            "data_quality_issue",
            "compensation_baseline",
            "workforce_snapshot",
            "plan_state",
            "event_log",
            "census",
            "scenario_run",
        ] {
            tx.execute(&format!("DELETE FROM {table} WHERE scenario_id = ?1"), params![scenario_id])?;
        }
        tx.commit()?;
        Ok(())
    }

    // ── Year commit ────────────────────────────────────────────

    /// Write a finished year atomically. On any error the transaction is
    /// rolled back and no row for the year is visible.
    pub fn commit_year(&self, commit: &YearCommit<'_>) -> SimResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        events::insert_events(&tx, commit.scenario_id, commit.events)?;
        plan_state::insert_plan_state(&tx, commit.scenario_id, commit.plan_state)?;
        snapshot::insert_snapshot(&tx, commit.scenario_id, commit.snapshot)?;
        quality::insert_issues(&tx, commit.scenario_id, commit.issues)?;
        quality::insert_baselines(&tx, commit.scenario_id, commit.simulation_year, commit.baselines)?;
        tx.execute(
            "INSERT INTO year_checkpoint
                (scenario_id, simulation_year, event_count, snapshot_rows, active_count)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                commit.scenario_id,
                commit.simulation_year,
                commit.events.len() as i64,
                commit.snapshot.len() as i64,
                commit.snapshot.iter().filter(|r| r.is_active()).count() as i64,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Years fully committed for a scenario, ascending.
    pub fn completed_years(&self, scenario_id: &str) -> SimResult<Vec<SimYear>> {
        let mut stmt = self.conn.prepare(
            "SELECT simulation_year FROM year_checkpoint
             WHERE scenario_id = ?1 ORDER BY simulation_year ASC",
        )?;
        let years = stmt
            .query_map(params![scenario_id], |row| row.get(0))?
            .collect::<Result<Vec<SimYear>, _>>()?;
        Ok(years)
    }

    pub fn checkpoint(&self, scenario_id: &str, year: SimYear) -> SimResult<Option<YearCheckpoint>> {
        let checkpoint = self
            .conn
            .query_row(
                "SELECT simulation_year, event_count, snapshot_rows, active_count
                 FROM year_checkpoint WHERE scenario_id = ?1 AND simulation_year = ?2",
                params![scenario_id, year],
                |row| {
                    Ok(YearCheckpoint {
                        simulation_year: row.get(0)?,
                        event_count: row.get::<_, i64>(1)? as usize,
                        snapshot_rows: row.get::<_, i64>(2)? as usize,
                        active_count: row.get::<_, i64>(3)? as usize,
                    })
                },
            )
            .optional()?;
        Ok(checkpoint)
    }

    /// Row count of a scenario-keyed table (for tests).
    pub fn row_count(&self, table: &str, scenario_id: &str) -> SimResult<i64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {table} WHERE scenario_id = ?1"),
            params![scenario_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

// ── Column decoding ───────────────────────────────────────────────

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

fn parse_date(idx: usize, value: &str) -> rusqlite::Result<NaiveDate> {
    value
        .parse()
        .map_err(|e| conversion_error(idx, format!("bad date '{value}': {e}")))
}

fn parse_opt_date(idx: usize, value: Option<String>) -> rusqlite::Result<Option<NaiveDate>> {
    value.map(|v| parse_date(idx, &v)).transpose()
}

fn parse_enum<T>(idx: usize, value: &str, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    parse(value).ok_or_else(|| conversion_error(idx, format!("unknown value '{value}'")))
}

fn opt_date_text(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.to_string())
}
