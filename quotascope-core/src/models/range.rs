//! The validated report period.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// An inclusive pair of report dates, validated at construction.
///
/// The period's hour count is `(end - start)` in whole days times 24, so a
/// same-day range spans zero hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a date range.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDateRange`] if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Period start date.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Period end date.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Total hours spanned by the period.
    pub fn total_hours(&self) -> f64 {
        (self.end - self.start).num_days() as f64 * 24.0
    }

    /// True if the period end lies in the future (diagnostic only).
    pub fn ends_in_future(&self) -> bool {
        self.end > Utc::now().date_naive()
    }

    /// Period start as an RFC 3339 timestamp at midnight UTC.
    pub fn start_timestamp(&self) -> String {
        Self::midnight_utc(self.start).to_rfc3339()
    }

    /// Period end as an RFC 3339 timestamp at midnight UTC.
    pub fn end_timestamp(&self) -> String {
        Self::midnight_utc(self.end).to_rfc3339()
    }

    fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
        date.and_hms_opt(0, 0, 0)
            .expect("midnight is always valid")
            .and_utc()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

// ============================================================================
// Tests
// ============================================================================
