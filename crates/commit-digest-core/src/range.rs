//! Reporting window.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::{CoreError, CoreResult};

/// Inclusive time window; a missing bound is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// Earliest accepted timestamp.
    pub start: Option<DateTime<Utc>>,
    /// Latest accepted timestamp.
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// A window with no bounds.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Resolves the window from the command-line inputs.
    ///
    /// - `end` is the last instant of `end_date` when given, otherwise `now`
    ///   if a trailing window is active (`days > 0`), otherwise unbounded.
    /// - `start` is the first instant of `start_date` when given, otherwise
    ///   `days` before the end (or `now`) if `days > 0`, otherwise unbounded.
    ///
    /// Explicit dates are calendar days in UTC.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvertedRange`] if the resolved start falls after
    /// the resolved end.
    pub fn resolve(
        days: u32,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> CoreResult<Self> {
        let end = end_date
            .map(end_of_day)
            .or_else(|| (days > 0).then_some(now));

        let start = start_date.map(start_of_day).or_else(|| {
            (days > 0)
                .then(|| end.unwrap_or(now).checked_sub_signed(Duration::days(i64::from(days))))
                .flatten()
        });

        if let (Some(s), Some(e)) = (start, end)
            && s > e
        {
            return Err(CoreError::InvertedRange {
                start: s.date_naive(),
                end: e.date_naive(),
            });
        }

        Ok(Self { start, end })
    }

    /// Returns true if `timestamp` lies within the window, bounds included.
    #[must_use]
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| timestamp >= start)
            && self.end.is_none_or(|end| timestamp <= end)
    }

    /// Returns true if neither bound is set.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::default()).and_utc()
}

/// 23:59:59.999999999 of `date`, valid for every representable day.
fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_nano_opt(23, 59, 59, 999_999_999)
        .unwrap_or_else(|| date.and_time(NaiveTime::default()))
        .and_utc()
}
