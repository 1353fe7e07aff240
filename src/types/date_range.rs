use chrono::NaiveDate;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Date format used by the `dat_inicio` and `dat_fim` query parameters.
pub(crate) const API_DATE_FORMAT: &str = "%Y-%m-%d";

/// An inclusive range of calendar dates, as requested from the load API.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Number of days between `start` and `end`; zero for a single-day range.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub(crate) fn start_param(&self) -> String {
        self.start.format(API_DATE_FORMAT).to_string()
    }

    pub(crate) fn end_param(&self) -> String {
        self.end.format(API_DATE_FORMAT).to_string()
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
