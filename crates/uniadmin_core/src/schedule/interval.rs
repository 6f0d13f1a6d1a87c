//! Half-open interval math.
//!
//! # Invariants
//! - [`overlaps`] is the only place where interval intersection is decided.
//! - Touching intervals (`a.end == b.start`) never overlap.

use crate::schedule::store::{ScheduleError, ScheduleResult};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Time range `[start, end)` in the reference time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeInterval {
    /// Builds an interval without validating `end > start`.
    ///
    /// Stores validate on insert, so unchecked values never reach storage.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Builds an interval, rejecting empty or inverted ranges.
    pub fn try_new(start: NaiveDateTime, end: NaiveDateTime) -> ScheduleResult<Self> {
        let interval = Self::new(start, end);
        if !interval.is_valid() {
            return Err(ScheduleError::InvalidInterval { start, end });
        }
        Ok(interval)
    }

    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Returns whether two half-open intervals intersect.
pub fn overlaps(a: &TimeInterval, b: &TimeInterval) -> bool {
    a.start < b.end && a.end > b.start
}

/// Expands a calendar date to `[00:00:00, 23:59:59.999999]`.
///
/// A day is always a fixed 24-hour window starting at midnight.
pub fn day_window(date: NaiveDate) -> TimeInterval {
    let start = date.and_time(NaiveTime::MIN);
    let end = start + Duration::days(1) - Duration::microseconds(1);
    TimeInterval::new(start, end)
}
