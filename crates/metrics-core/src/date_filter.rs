use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{MetricsError, Result};

/// Calendar-day format used throughout the export.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` day string.
pub fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DAY_FORMAT)
        .map_err(|_| MetricsError::InvalidDate(s.to_string()))
}

// ── DateRange ─────────────────────────────────────────────────────────────────

/// Inclusive window of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }

    /// Number of days covered, counting both ends.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

// ── DateRangeFilter ───────────────────────────────────────────────────────────

/// Relative report window, anchored on the report's last day.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "camelCase")]
pub enum DateRangeFilter {
    /// Keep every record.
    #[default]
    #[value(name = "all")]
    All,
    #[value(name = "7d")]
    Last7Days,
    #[value(name = "14d")]
    Last14Days,
    #[value(name = "28d")]
    Last28Days,
}

impl DateRangeFilter {
    /// Window length in days, or `None` for [`DateRangeFilter::All`].
    pub fn days(self) -> Option<i64> {
        match self {
            DateRangeFilter::All => None,
            DateRangeFilter::Last7Days => Some(7),
            DateRangeFilter::Last14Days => Some(14),
            DateRangeFilter::Last28Days => Some(28),
        }
    }

    /// Resolve against `end_day` into an absolute inclusive window.
    ///
    /// `Last28Days` ending 2025-08-03 covers 2025-07-07..=2025-08-03.
    pub fn resolve(self, end_day: NaiveDate) -> Option<DateRange> {
        let days = self.days()?;
        Some(DateRange {
            start: end_day - Duration::days(days - 1),
            end: end_day,
        })
    }

    /// Like [`resolve`](Self::resolve) but takes the raw `report_end_day` string.
    ///
    /// Returns `Ok(None)` for `All` without inspecting `end_day`.
    pub fn resolve_str(self, end_day: &str) -> Result<Option<DateRange>> {
        if self == DateRangeFilter::All {
            return Ok(None);
        }
        Ok(self.resolve(parse_day(end_day)?))
    }
}

impl fmt::Display for DateRangeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.days() {
            None => write!(f, "all days"),
            Some(n) => write!(f, "last {} days", n),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
