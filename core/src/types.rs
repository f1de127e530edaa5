//! Shared primitive types used across the entire simulation.

use chrono::{Datelike, NaiveDate};

/// A simulation year. One year = one plan year (Jan 1 .. Dec 31).
pub type SimYear = i32;

/// A stable, unique identifier for an employee.
pub type EmployeeId = String;

/// The canonical scenario identifier.
pub type ScenarioId = String;

/// Average days per year used by every tenure and age calculation.
pub const DAYS_PER_YEAR: f64 = 365.25;

pub fn year_start(year: SimYear) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN)
}

pub fn year_end(year: SimYear) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(NaiveDate::MAX)
}

pub fn days_in_year(year: SimYear) -> i64 {
    (year_end(year) - year_start(year)).num_days() + 1
}

/// Whole years elapsed between `from` and `to`, using the 365.25-day year.
/// Never negative: a `to` before `from` yields 0.
pub fn whole_years_between(from: NaiveDate, to: NaiveDate) -> u32 {
    let days = (to - from).num_days();
    if days <= 0 {
        return 0;
    }
    (days as f64 / DAYS_PER_YEAR).floor() as u32
}

/// Clamp a (month, day) pair into a real date within `year`.
/// Feb 29 in a non-leap year becomes Feb 28.
pub fn date_in_year(year: SimYear, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day)
        .or_else(|| NaiveDate::from_ymd_opt(year, month, day.saturating_sub(1)))
        .unwrap_or_else(|| year_start(year))
}

pub fn year_of(date: NaiveDate) -> SimYear {
    date.year()
}

/// Deferral rates are carried at micro-percent precision so repeated
/// increments land exactly on configured caps.
pub fn round_rate(rate: f64) -> f64 {
    (rate * 1_000_000.0).round() / 1_000_000.0
}

/// Currency amounts are carried to the cent.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
