//! Civil-date arithmetic for rescheduling and periodic duplication.
//!
//! # Responsibility
//! - Normalize instants to the start of their UTC calendar day.
//! - Generate repeat dates from a source date through the end of its month.
//!
//! # Invariants
//! - Month boundaries are compared as UTC civil dates, never as instants.
//! - Date generation is bounded by the month end and always terminates.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Smallest accepted repeat interval in days.
pub const REPEAT_INTERVAL_MIN: i64 = 1;
/// Largest accepted repeat interval in days.
pub const REPEAT_INTERVAL_MAX: i64 = 7;

/// Day cadence used by duplicate-to-end-of-month, validated to `1..=7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RepeatInterval(u8);

impl RepeatInterval {
    /// Validates a raw day count.
    pub fn new(days: i64) -> Result<Self, RepeatIntervalError> {
        if !(REPEAT_INTERVAL_MIN..=REPEAT_INTERVAL_MAX).contains(&days) {
            return Err(RepeatIntervalError(days));
        }
        // Range-checked above.
        Ok(Self(days as u8))
    }

    pub fn days(self) -> i64 {
        i64::from(self.0)
    }
}

impl TryFrom<i64> for RepeatInterval {
    type Error = RepeatIntervalError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Rejected repeat interval value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatIntervalError(pub i64);

impl Display for RepeatIntervalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid repeat interval {} ({REPEAT_INTERVAL_MIN}-{REPEAT_INTERVAL_MAX} allowed)",
            self.0
        )
    }
}

impl Error for RepeatIntervalError {}

/// Returns midnight UTC of the calendar day containing `instant`.
pub fn start_of_day_utc(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Returns the last calendar day of the month containing `date`.
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    // Only the final representable month has no successor; its end is `MAX`.
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// Returns every repeat of `origin` stepping by `interval` that still falls in
/// the origin's month (UTC). The origin itself is excluded.
///
/// Each generated instant keeps the origin's time of day.
pub fn duplicate_dates(origin: DateTime<Utc>, interval: RepeatInterval) -> Vec<DateTime<Utc>> {
    let month_end = end_of_month(origin.date_naive());
    let step = Duration::days(interval.days());

    let mut dates = Vec::new();
    let mut current = origin.checked_add_signed(step);
    while let Some(candidate) = current {
        if candidate.date_naive() > month_end {
            break;
        }
        dates.push(candidate);
        current = candidate.checked_add_signed(step);
    }
    dates
}
