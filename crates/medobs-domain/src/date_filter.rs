//! Relative date filters for list views.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};

/// Predefined date window, resolved against "now" at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    Today,
    Past7Days,
    ThisMonth,
    ThisYear,
}

/// Half-open `[start, end)` timestamp range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

impl DateFilter {
    pub fn from_kebab_case(s: &str) -> Option<Self> {
        match s {
            "today" => Some(Self::Today),
            "past-7-days" => Some(Self::Past7Days),
            "this-month" => Some(Self::ThisMonth),
            "this-year" => Some(Self::ThisYear),
            _ => None,
        }
    }

    /// Resolve the window in UTC.
    pub fn range(self, now: DateTime<Utc>) -> DateRange {
        let today = now.date_naive();
        let tomorrow = today + Days::new(1);
        let (start, end) = match self {
            Self::Today => (today, tomorrow),
            Self::Past7Days => (today - Days::new(7), tomorrow),
            Self::ThisMonth => {
                let first = first_of_month(today);
                (first, first + Months::new(1))
            }
            Self::ThisYear => {
                let first = first_of_year(today);
                (first, first + Months::new(12))
            }
        };
        DateRange {
            start: midnight(start),
            end: midnight(end),
        }
    }
}

fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

fn first_of_year(day: NaiveDate) -> NaiveDate {
    day.with_ordinal(1).unwrap_or(day)
}

fn midnight(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(chrono::NaiveTime::MIN).and_utc()
}
