//! Business-calendar seam for deadline resolution.
//!
//! Deadlines expressed in business days skip weekends and whatever the
//! calendar implementation considers a holiday. The default
//! [`WeekdayCalendar`] knows weekends plus a configured holiday list;
//! deployments plug in their own municipal calendar.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use std::collections::HashSet;
use tramita_types::Deadline;

/// Resolves deadline expressions against working days.
pub trait BusinessCalendar: Send + Sync {
    fn is_business_day(&self, date: NaiveDate) -> bool;

    /// The instant at which a deadline started at `start` falls due.
    ///
    /// `BusinessDays(n)` due at the same time of day, n business days
    /// later; `Hours(n)` is calendar time.
    fn due_after(&self, start: DateTime<Utc>, deadline: Deadline) -> DateTime<Utc> {
        match deadline {
            Deadline::Hours(hours) => start + Duration::hours(hours as i64),
            Deadline::BusinessDays(days) => {
                let mut date = start.date_naive();
                let mut remaining = days;
                while remaining > 0 {
                    date += Duration::days(1);
                    if self.is_business_day(date) {
                        remaining -= 1;
                    }
                }
                start + Duration::days((date - start.date_naive()).num_days())
            }
        }
    }
}

/// Weekends off, plus a configured holiday list.
#[derive(Default, Clone)]
pub struct WeekdayCalendar {
    holidays: HashSet<NaiveDate>,
}

impl WeekdayCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_holidays(holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.holidays.insert(date);
    }
}

impl BusinessCalendar for WeekdayCalendar {
    fn is_business_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.holidays.contains(&date)
    }
}
