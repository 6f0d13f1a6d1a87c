//! Availability queries over the staff directory.
//!
//! # Invariants
//! - Intersection is decided by `interval::overlaps` only.
//! - Results are de-duplicated by staff id and ordered by id.
//! - A window with `end <= start` matches nobody.

use crate::model::staff::StaffRecord;
use crate::schedule::directory::StaffDirectory;
use crate::schedule::interval::{day_window, TimeInterval};
use chrono::{NaiveDate, NaiveDateTime};
use log::debug;

/// Read-only query engine answering "who is available" questions.
pub struct AvailabilityQueryEngine<'a> {
    directory: &'a StaffDirectory,
    active_only: bool,
}

impl<'a> AvailabilityQueryEngine<'a> {
    pub fn new(directory: &'a StaffDirectory) -> Self {
        Self {
            directory,
            active_only: false,
        }
    }

    /// Restricts results to staff whose active flag is set.
    pub fn active_only(mut self, active_only: bool) -> Self {
        self.active_only = active_only;
        self
    }

    /// Staff with at least one entry overlapping `[start, end)`.
    pub fn available_between(&self, start: NaiveDateTime, end: NaiveDateTime) -> Vec<StaffRecord> {
        self.available_in(&TimeInterval::new(start, end))
    }

    /// Staff with at least one entry overlapping the calendar day `date`.
    pub fn available_on(&self, date: NaiveDate) -> Vec<StaffRecord> {
        self.available_in(&day_window(date))
    }

    /// Staff with at least one entry overlapping `window`.
    pub fn available_in(&self, window: &TimeInterval) -> Vec<StaffRecord> {
        if !window.is_valid() {
            debug!(
                "event=availability_query module=schedule status=ok window_start={} window_end={} matches=0 reason=empty_window",
                window.start, window.end
            );
            return Vec::new();
        }

        let active_only = self.active_only;
        let matches = self
            .directory
            .select(|slot| (!active_only || slot.active) && slot.schedule.intersects(window));

        debug!(
            "event=availability_query module=schedule status=ok window_start={} window_end={} matches={}",
            window.start,
            window.end,
            matches.len()
        );
        matches
    }
}
