//! Calendar day keys and day arithmetic.
//!
//! Habit entries are keyed by calendar day (`YYYY-MM-DD`, no time part).
//! All arithmetic here is on `NaiveDate`, so a DST switch never turns
//! "one day back" into 23 or 25 hours.

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, Utc};

use crate::domain::DomainError;

pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Format a calendar day as its canonical key.
pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

/// Parse a canonical `YYYY-MM-DD` day key.
pub fn parse_day_key(s: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(s.trim(), DAY_KEY_FORMAT)
        .map_err(|_| DomainError::InvalidDate(format!("'{}' is not a YYYY-MM-DD date", s)))
}

/// Shift a day by whole days, saturating at the ends of the calendar.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    let step = Days::new(days.unsigned_abs());
    if days >= 0 {
        date.checked_add_days(step).unwrap_or(NaiveDate::MAX)
    } else {
        date.checked_sub_days(step).unwrap_or(NaiveDate::MIN)
    }
}

/// Whole calendar days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Parse an `HH:MM` time of day.
pub fn parse_hhmm(s: &str) -> Result<NaiveTime, DomainError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|_| DomainError::InvalidTime(format!("'{}' is not an HH:MM time", s)))
}

/// Fractional hours elapsed between two instants.
pub fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 3_600_000.0
}

/// Convert fractional hours into a chrono duration (millisecond precision).
pub fn hours(h: f64) -> Duration {
    Duration::milliseconds((h * 3_600_000.0).round() as i64)
}
