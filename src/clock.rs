//! Date/time source injected into models.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};

/// Source of "today" and "now" for record timestamps.
pub trait Clock: Send + Sync {
    /// Current local date.
    fn today(&self) -> NaiveDate;

    /// Current local wall-clock time.
    fn now(&self) -> NaiveDateTime;
}

/// Clock backed by the system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock pinned to a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    /// Fixed clock at midnight of `date`.
    pub fn on(date: NaiveDate) -> Self {
        Self(date.and_time(chrono::NaiveTime::MIN))
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0.date()
    }

    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Same calendar day one year later.
///
/// 29 February has no counterpart in a common year and rolls over to
/// 1 March, matching how calendar-field arithmetic overflows.
pub fn one_year_after(date: NaiveDate) -> NaiveDate {
    let year = date.year() + 1;
    date.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
        .unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_one_year_after_regular_date() {
        assert_eq!(one_year_after(date(2026, 10, 18)), date(2027, 10, 18));
    }

    #[test]
    fn test_one_year_after_leap_day() {
        assert_eq!(one_year_after(date(2024, 2, 29)), date(2025, 3, 1));
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::on(date(2026, 2, 18));
        assert_eq!(clock.today(), date(2026, 2, 18));
        assert_eq!(clock.now().date(), date(2026, 2, 18));
    }
}
