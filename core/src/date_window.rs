//! Termination date sampling.
//!
//! Both the experienced and the new-hire termination generators go
//! through `sample_termination_date`, so the two can never disagree on
//! how a date is bounded.
//!
//! Window: [max(hire_date, Jan 1), Dec 31]. An employee hired this year
//! can therefore never be terminated before their hire date.

use crate::{
    rng::EmployeeRng,
    types::{year_end, year_start, SimYear},
};
use chrono::{Duration, NaiveDate};

/// Start of the window and the number of days after it that remain in
/// the year. `None` when the hire date is after year end.
pub fn termination_window(hire_date: NaiveDate, year: SimYear) -> Option<(NaiveDate, i64)> {
    let start = hire_date.max(year_start(year));
    let days_available = (year_end(year) - start).num_days();
    (days_available >= 0).then_some((start, days_available))
}

/// Draw a termination date in the window. Employees with fewer than one
/// day available (hired Dec 31) have no valid date and are excluded.
pub fn sample_termination_date(
    hire_date: NaiveDate,
    year: SimYear,
    rng: &mut EmployeeRng,
) -> Option<NaiveDate> {
    let (start, days_available) = termination_window(hire_date, year)?;
    if days_available < 1 {
        return None;
    }
    let offset = rng.next_u64_below(days_available as u64 + 1) as i64;
    Some(start + Duration::days(offset))
}

/// A uniformly drawn day of the year.
pub fn sample_day_in_year(year: SimYear, rng: &mut EmployeeRng) -> NaiveDate {
    let days = (year_end(year) - year_start(year)).num_days() + 1;
    year_start(year) + Duration::days(rng.next_u64_below(days as u64) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SamplingPurpose;
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn dec_31_hire_has_no_window() {
        let mut rng = EmployeeRng::new(1, "E1", 2025, SamplingPurpose::NewHireTermination);
        assert_eq!(sample_termination_date(d(2025, 12, 31), 2025, &mut rng), None);
    }

    #[test]
    fn hire_after_year_end_has_no_window() {
        assert_eq!(termination_window(d(2026, 3, 1), 2025), None);
    }

    #[test]
    fn continuing_employee_window_starts_jan_1() {
        let (start, days) = termination_window(d(2010, 5, 5), 2025).unwrap();
        assert_eq!(start, d(2025, 1, 1));
        assert_eq!(days, 364);
    }

    proptest! {
        #[test]
        fn sampled_date_never_precedes_hire_or_exceeds_year_end(
            day_of_year in 0i64..365,
            seed in any::<u64>(),
        ) {
            let hire = d(2025, 1, 1) + Duration::days(day_of_year);
            let mut rng = EmployeeRng::new(seed, "NH_2025_000001", 2025, SamplingPurpose::NewHireTermination);
            if let Some(date) = sample_termination_date(hire, 2025, &mut rng) {
                prop_assert!(date >= hire);
                prop_assert!(date <= d(2025, 12, 31));
            } else {
                prop_assert_eq!(hire, d(2025, 12, 31));
            }
        }
    }
}
