//! Per-staff availability store.
//!
//! # Responsibility
//! - Own the ordered availability entries of exactly one staff member.
//! - Reject invalid and overlapping intervals at insert time.
//!
//! # Invariants
//! - No two stored entries overlap (see [`overlaps`]).
//! - Entries are kept sorted by `(start, id)`.
//! - `add` is check-then-insert; callers serialize writers per store
//!   (`&mut self` plus the directory's per-staff lock).

use crate::model::staff::{EntryId, ScheduleEntry};
use crate::schedule::interval::{overlaps, TimeInterval};
use chrono::NaiveDateTime;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Schedule mutation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// `end <= start`.
    InvalidInterval {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// Interval intersects an existing entry.
    OverlapConflict { existing: EntryId },
    /// No entry with this id in the store.
    EntryNotFound(EntryId),
    /// Same entry id inserted twice (hydration only).
    DuplicateEntry(EntryId),
}

impl Display for ScheduleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInterval { start, end } => {
                write!(f, "invalid interval: end {end} must be after start {start}")
            }
            Self::OverlapConflict { existing } => {
                write!(f, "interval overlaps existing schedule entry {existing}")
            }
            Self::EntryNotFound(id) => write!(f, "schedule entry not found: {id}"),
            Self::DuplicateEntry(id) => write!(f, "duplicate schedule entry id: {id}"),
        }
    }
}

impl Error for ScheduleError {}

/// Ordered, non-overlapping availability entries for one staff member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleStore {
    entries: Vec<ScheduleEntry>,
}

impl ScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from persisted entries.
    ///
    /// Invalid, duplicate or overlapping entries are rejected instead of
    /// being silently dropped.
    pub fn from_entries(entries: impl IntoIterator<Item = ScheduleEntry>) -> ScheduleResult<Self> {
        let mut store = Self::new();
        for entry in entries {
            store.insert(entry)?;
        }
        Ok(store)
    }

    /// Inserts an entry that already carries its id.
    ///
    /// # Errors
    /// - `DuplicateEntry` when the id is already stored.
    /// - `InvalidInterval` / `OverlapConflict` as for [`ScheduleStore::add`].
    pub fn insert(&mut self, entry: ScheduleEntry) -> ScheduleResult<()> {
        if self.get(entry.id).is_some() {
            return Err(ScheduleError::DuplicateEntry(entry.id));
        }
        self.insert_checked(entry)
    }

    /// Adds `interval` and returns the generated entry id.
    ///
    /// # Errors
    /// - `InvalidInterval` when `end <= start`.
    /// - `OverlapConflict` when any stored entry overlaps `interval`.
    pub fn add(&mut self, interval: TimeInterval) -> ScheduleResult<EntryId> {
        let entry = ScheduleEntry::new(interval);
        self.insert_checked(entry)?;
        Ok(entry.id)
    }

    /// Removes one entry by id.
    pub fn remove(&mut self, id: EntryId) -> ScheduleResult<()> {
        let position = self
            .entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(ScheduleError::EntryNotFound(id))?;
        self.entries.remove(position);
        Ok(())
    }

    pub fn get(&self, id: EntryId) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Read-only view ordered by start instant.
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns whether any entry overlaps `window`.
    pub fn intersects(&self, window: &TimeInterval) -> bool {
        self.entries
            .iter()
            .any(|entry| overlaps(&entry.interval(), window))
    }

    /// Drops every entry (cascade on staff deletion).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn insert_checked(&mut self, entry: ScheduleEntry) -> ScheduleResult<()> {
        let interval = entry.interval();
        if !interval.is_valid() {
            return Err(ScheduleError::InvalidInterval {
                start: interval.start,
                end: interval.end,
            });
        }

        if let Some(existing) = self
            .entries
            .iter()
            .find(|current| overlaps(&current.interval(), &interval))
        {
            return Err(ScheduleError::OverlapConflict {
                existing: existing.id,
            });
        }

        let position = self
            .entries
            .partition_point(|current| (current.start, current.id) < (entry.start, entry.id));
        self.entries.insert(position, entry);
        Ok(())
    }
}
