//! Staff directory: records plus their availability stores.
//!
//! # Responsibility
//! - Own every staff record and its `ScheduleStore`.
//! - Mediate all reads and writes of staff availability.
//! - Bridge in-memory state to a `StaffRepository`.
//! - Write single-slot changes through to the repository while the staff
//!   member's lock is held.
//!
//! # Invariants
//! - Writers are serialized per staff member; different staff never share a
//!   writer lock.
//! - Deleting a staff member drops its entries inside the same critical
//!   section that marks the record deleted.
//! - A slot marked deleted is never mutated again.

use crate::model::staff::{EntryId, Role, ScheduleEntry, Specialty, StaffId, StaffRecord};
use crate::model::user::{User, UserValidationError};
use crate::repo::staff_repo::{RepoError, StaffRepository};
use crate::schedule::availability::AvailabilityQueryEngine;
use crate::schedule::interval::TimeInterval;
use crate::schedule::specialty::SpecialtyMatcher;
use crate::schedule::store::{ScheduleError, ScheduleStore};
use chrono::{NaiveDate, NaiveDateTime};
use log::{info, warn};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Error kinds surfaced to directory callers.
#[derive(Debug)]
pub enum DirectoryError {
    /// Referenced staff id does not exist.
    StaffNotFound(StaffId),
    /// Registration with an id that is already taken.
    DuplicateStaff(StaffId),
    /// Referenced entry id does not exist under the staff member.
    EntryNotFound(EntryId),
    /// Same entry id appears twice in hydrated data.
    DuplicateEntry(EntryId),
    /// Submitted `end <= start`.
    InvalidInterval {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// Submitted interval intersects an existing entry.
    OverlapConflict { existing: EntryId },
    /// Specialty update to an unknown value.
    InvalidSpecialty(String),
    /// Role update to an unknown value.
    InvalidRole(String),
    /// Role cannot be held by a staff member.
    IncompatibleRole { staff_id: StaffId, role: Role },
    /// Registered user is not of staff kind.
    NotStaff(String),
    InvalidUser(UserValidationError),
    Repo(RepoError),
}

impl Display for DirectoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StaffNotFound(id) => write!(f, "staff not found: {id}"),
            Self::DuplicateStaff(id) => write!(f, "staff already registered: {id}"),
            Self::EntryNotFound(id) => write!(f, "schedule entry not found: {id}"),
            Self::DuplicateEntry(id) => write!(f, "duplicate schedule entry id: {id}"),
            Self::InvalidInterval { start, end } => {
                write!(f, "invalid interval: end {end} must be after start {start}")
            }
            Self::OverlapConflict { existing } => {
                write!(f, "interval overlaps existing schedule entry {existing}")
            }
            Self::InvalidSpecialty(value) => write!(f, "invalid specialty: `{value}`"),
            Self::InvalidRole(value) => write!(f, "invalid role: `{value}`"),
            Self::IncompatibleRole { staff_id, role } => write!(
                f,
                "staff {staff_id} cannot take role {}",
                role.as_str()
            ),
            Self::NotStaff(id) => write!(f, "user is not staff: {id}"),
            Self::InvalidUser(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DirectoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidUser(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ScheduleError> for DirectoryError {
    fn from(value: ScheduleError) -> Self {
        match value {
            ScheduleError::InvalidInterval { start, end } => Self::InvalidInterval { start, end },
            ScheduleError::OverlapConflict { existing } => Self::OverlapConflict { existing },
            ScheduleError::EntryNotFound(id) => Self::EntryNotFound(id),
            ScheduleError::DuplicateEntry(id) => Self::DuplicateEntry(id),
        }
    }
}

impl From<RepoError> for DirectoryError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::StaffNotFound(id),
            RepoError::Rejected(err) => Self::from(err),
            other => Self::Repo(other),
        }
    }
}

/// Registration request for a new staff member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffRegistration {
    pub id: StaffId,
    pub display_name: String,
    pub role: Role,
    /// `None` falls back to [`Role::default_specialty`].
    pub specialty: Option<Specialty>,
}

/// Lock-protected state of one staff member.
#[derive(Debug)]
pub(crate) struct StaffSlot {
    pub(crate) id: StaffId,
    pub(crate) display_name: String,
    pub(crate) role: Role,
    pub(crate) specialty: Option<Specialty>,
    pub(crate) active: bool,
    pub(crate) schedule: ScheduleStore,
    deleted: bool,
}

impl StaffSlot {
    fn from_record(record: StaffRecord) -> Result<Self, ScheduleError> {
        Ok(Self {
            schedule: ScheduleStore::from_entries(record.schedule)?,
            id: record.id,
            display_name: record.display_name,
            role: record.role,
            specialty: record.specialty,
            active: record.active,
            deleted: false,
        })
    }

    pub(crate) fn to_record(&self) -> StaffRecord {
        StaffRecord {
            id: self.id.clone(),
            display_name: self.display_name.clone(),
            role: self.role,
            specialty: self.specialty,
            active: self.active,
            schedule: self.schedule.entries().to_vec(),
        }
    }
}

type SharedSlot = Arc<Mutex<StaffSlot>>;

/// Concurrent in-memory staff directory.
///
/// The map lock is only held to look up or (un)link slots; all record and
/// schedule work happens under the slot's own lock.
#[derive(Debug, Default)]
pub struct StaffDirectory {
    slots: RwLock<HashMap<StaffId, SharedSlot>>,
}

impl StaffDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a directory from plain records, re-checking schedule invariants.
    pub fn from_records(records: impl IntoIterator<Item = StaffRecord>) -> DirectoryResult<Self> {
        let mut slots = HashMap::new();
        for record in records {
            let staff_id = record.id.clone();
            if slots.contains_key(&staff_id) {
                return Err(DirectoryError::DuplicateStaff(staff_id));
            }
            let slot = StaffSlot::from_record(record)?;
            slots.insert(staff_id, Arc::new(Mutex::new(slot)));
        }
        Ok(Self {
            slots: RwLock::new(slots),
        })
    }

    /// Hydrates a directory from every record stored in `repo`.
    pub fn load_from<R: StaffRepository>(repo: &R) -> DirectoryResult<Self> {
        let records = repo.list_staff()?;
        let count = records.len();
        let directory = Self::from_records(records)?;
        info!("event=directory_load module=schedule status=ok staff_count={count}");
        Ok(directory)
    }

    /// Writes one staff record (with its full schedule) to `repo`.
    pub fn persist_staff<R: StaffRepository>(
        &self,
        repo: &mut R,
        staff_id: &str,
    ) -> DirectoryResult<()> {
        let record = self.get(staff_id)?;
        repo.save(&record)?;
        Ok(())
    }

    /// Writes the profile fields of one staff record, keeping stored entries.
    pub fn persist_profile<R: StaffRepository>(
        &self,
        repo: &mut R,
        staff_id: &str,
    ) -> DirectoryResult<()> {
        let record = self.get(staff_id)?;
        repo.save_profile(&record)?;
        Ok(())
    }

    /// Writes every record to `repo`.
    pub fn persist_to<R: StaffRepository>(&self, repo: &mut R) -> DirectoryResult<()> {
        let records = self.records();
        for record in &records {
            repo.save(record)?;
        }
        info!(
            "event=directory_persist module=schedule status=ok staff_count={}",
            records.len()
        );
        Ok(())
    }

    /// Registers a new active staff member with an empty schedule.
    pub fn register(&self, registration: StaffRegistration) -> DirectoryResult<StaffRecord> {
        if registration.role == Role::Student {
            return Err(DirectoryError::IncompatibleRole {
                staff_id: registration.id,
                role: registration.role,
            });
        }
        let specialty = registration
            .specialty
            .or_else(|| registration.role.default_specialty());
        let record = StaffRecord::new(
            registration.id,
            registration.display_name,
            registration.role,
        )
        .with_specialty(specialty);
        self.insert_record(record)
    }

    /// Registers a validated staff user.
    pub fn register_user(&self, user: User) -> DirectoryResult<StaffRecord> {
        user.validate().map_err(DirectoryError::InvalidUser)?;
        let user_id = user.id().to_string();
        let record = user
            .into_staff_record()
            .ok_or(DirectoryError::NotStaff(user_id))?;
        self.insert_record(record)
    }

    pub fn get(&self, staff_id: &str) -> DirectoryResult<StaffRecord> {
        self.with_slot(staff_id, |slot| Ok(slot.to_record()))
    }

    pub fn contains(&self, staff_id: &str) -> bool {
        self.slots.read().contains_key(staff_id)
    }

    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    /// Snapshot of every record, ordered by staff id.
    pub fn records(&self) -> Vec<StaffRecord> {
        self.select(|_| true)
    }

    /// Adds one availability interval for `staff_id`.
    ///
    /// # Errors
    /// - `StaffNotFound` when the staff member does not exist.
    /// - `InvalidInterval` / `OverlapConflict` from the schedule store.
    pub fn add_availability(
        &self,
        staff_id: &str,
        interval: TimeInterval,
    ) -> DirectoryResult<ScheduleEntry> {
        let result = self.with_slot(staff_id, |slot| {
            let entry_id = slot.schedule.add(interval)?;
            slot.schedule
                .get(entry_id)
                .copied()
                .ok_or(DirectoryError::EntryNotFound(entry_id))
        });
        log_availability_add(staff_id, &result);
        result
    }

    /// Adds one interval and writes it through to `repo`.
    ///
    /// The repository re-checks the stored schedule, so an overlapping
    /// entry written from another connection is reported as
    /// `OverlapConflict`. On success the slot schedule is reloaded from
    /// `repo`.
    pub fn add_availability_with<R: StaffRepository>(
        &self,
        repo: &mut R,
        staff_id: &str,
        interval: TimeInterval,
    ) -> DirectoryResult<ScheduleEntry> {
        let result = self.with_slot(staff_id, |slot| {
            let interval = TimeInterval::try_new(interval.start, interval.end)?;
            let entry = ScheduleEntry::new(interval);
            repo.add_entry(staff_id, &entry)?;
            reload_schedule(slot, repo)?;
            Ok(entry)
        });
        log_availability_add(staff_id, &result);
        result
    }

    /// Removes one availability entry of `staff_id`.
    pub fn remove_availability(&self, staff_id: &str, entry_id: EntryId) -> DirectoryResult<()> {
        let result = self.with_slot(staff_id, |slot| {
            slot.schedule.remove(entry_id)?;
            Ok(())
        });
        log_availability_remove(staff_id, entry_id, &result);
        result
    }

    /// Removes one entry and writes the removal through to `repo`.
    pub fn remove_availability_with<R: StaffRepository>(
        &self,
        repo: &mut R,
        staff_id: &str,
        entry_id: EntryId,
    ) -> DirectoryResult<()> {
        let result = self.with_slot(staff_id, |slot| {
            repo.remove_entry(staff_id, entry_id)?;
            reload_schedule(slot, repo)
        });
        log_availability_remove(staff_id, entry_id, &result);
        result
    }

    /// Staff with at least one entry overlapping `[window_start, window_end)`.
    pub fn find_available(
        &self,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
    ) -> Vec<StaffRecord> {
        AvailabilityQueryEngine::new(self)
            .available_in(&TimeInterval::new(window_start, window_end))
    }

    /// Staff with at least one entry overlapping the calendar day `date`.
    pub fn find_available_on(&self, date: NaiveDate) -> Vec<StaffRecord> {
        AvailabilityQueryEngine::new(self).available_on(date)
    }

    /// Staff matching a free-text specialty query.
    pub fn match_specialty(&self, text: &str) -> Vec<StaffRecord> {
        SpecialtyMatcher::new(self).matching(text)
    }

    /// Changes the role of a staff member.
    ///
    /// # Errors
    /// - `InvalidRole` for unknown role text.
    /// - `IncompatibleRole` when the role is reserved for students.
    pub fn change_role(&self, staff_id: &str, role_text: &str) -> DirectoryResult<StaffRecord> {
        let role = Role::parse(role_text)
            .ok_or_else(|| DirectoryError::InvalidRole(role_text.to_string()))?;
        if role == Role::Student {
            return Err(DirectoryError::IncompatibleRole {
                staff_id: staff_id.to_string(),
                role,
            });
        }

        let record = self.with_slot(staff_id, |slot| {
            slot.role = role;
            Ok(slot.to_record())
        })?;
        info!(
            "event=staff_role_change module=schedule status=ok staff_id={staff_id} role={}",
            role.as_str()
        );
        Ok(record)
    }

    /// Changes the specialty of a staff member; `none` clears it.
    ///
    /// The value is validated before the record is touched.
    pub fn change_specialty(
        &self,
        staff_id: &str,
        specialty_text: &str,
    ) -> DirectoryResult<StaffRecord> {
        let specialty = if specialty_text.trim().eq_ignore_ascii_case("none") {
            None
        } else {
            Some(
                Specialty::parse(specialty_text)
                    .ok_or_else(|| DirectoryError::InvalidSpecialty(specialty_text.to_string()))?,
            )
        };

        let record = self.with_slot(staff_id, |slot| {
            slot.specialty = specialty;
            Ok(slot.to_record())
        })?;
        info!(
            "event=staff_specialty_change module=schedule status=ok staff_id={staff_id} specialty={}",
            specialty.map_or("NONE", Specialty::as_str)
        );
        Ok(record)
    }

    pub fn set_active(&self, staff_id: &str, active: bool) -> DirectoryResult<StaffRecord> {
        let record = self.with_slot(staff_id, |slot| {
            slot.active = active;
            Ok(slot.to_record())
        })?;
        info!("event=staff_status_change module=schedule status=ok staff_id={staff_id} active={active}");
        Ok(record)
    }

    /// Deletes a staff member and every schedule entry it owns.
    ///
    /// Returns the record as it was right before deletion.
    pub fn delete(&self, staff_id: &str) -> DirectoryResult<StaffRecord> {
        let slot = self
            .slots
            .write()
            .remove(staff_id)
            .ok_or_else(|| DirectoryError::StaffNotFound(staff_id.to_string()))?;

        let mut guard = slot.lock();
        let removed = guard.to_record();
        guard.deleted = true;
        guard.schedule.clear();
        drop(guard);

        info!(
            "event=staff_delete module=schedule status=ok staff_id={staff_id} entries_removed={}",
            removed.schedule.len()
        );
        Ok(removed)
    }

    /// Collects records whose slot satisfies `keep`, ordered by staff id.
    ///
    /// Each slot is inspected under its own lock, so every returned record
    /// is a consistent snapshot of that staff member.
    pub(crate) fn select(&self, mut keep: impl FnMut(&StaffSlot) -> bool) -> Vec<StaffRecord> {
        let slots: Vec<SharedSlot> = self.slots.read().values().cloned().collect();
        let mut selected = Vec::new();
        for slot in slots {
            let guard = slot.lock();
            if !guard.deleted && keep(&*guard) {
                selected.push(guard.to_record());
            }
        }
        selected.sort_by(|a, b| a.id.cmp(&b.id));
        selected
    }

    fn insert_record(&self, record: StaffRecord) -> DirectoryResult<StaffRecord> {
        let staff_id = record.id.clone();
        let snapshot = record.clone();
        let slot = StaffSlot::from_record(record)?;

        let mut slots = self.slots.write();
        if slots.contains_key(&staff_id) {
            return Err(DirectoryError::DuplicateStaff(staff_id));
        }
        slots.insert(staff_id.clone(), Arc::new(Mutex::new(slot)));
        drop(slots);

        info!(
            "event=staff_register module=schedule status=ok staff_id={staff_id} role={}",
            snapshot.role.as_str()
        );
        Ok(snapshot)
    }

    fn with_slot<T>(
        &self,
        staff_id: &str,
        f: impl FnOnce(&mut StaffSlot) -> DirectoryResult<T>,
    ) -> DirectoryResult<T> {
        let slot = self
            .slots
            .read()
            .get(staff_id)
            .cloned()
            .ok_or_else(|| DirectoryError::StaffNotFound(staff_id.to_string()))?;

        let mut guard = slot.lock();
        if guard.deleted {
            return Err(DirectoryError::StaffNotFound(staff_id.to_string()));
        }
        f(&mut *guard)
    }
}

/// Replaces the slot schedule with what `repo` stores for the staff member.
fn reload_schedule<R: StaffRepository>(slot: &mut StaffSlot, repo: &R) -> DirectoryResult<()> {
    let record = repo
        .find_by_id(&slot.id)?
        .ok_or_else(|| DirectoryError::StaffNotFound(slot.id.clone()))?;
    slot.schedule = ScheduleStore::from_entries(record.schedule)?;
    Ok(())
}

fn log_availability_add(staff_id: &str, result: &DirectoryResult<ScheduleEntry>) {
    match result {
        Ok(entry) => info!(
            "event=availability_add module=schedule status=ok staff_id={staff_id} entry_id={}",
            entry.id
        ),
        Err(err) => warn!(
            "event=availability_add module=schedule status=error staff_id={staff_id} error={err}"
        ),
    }
}

fn log_availability_remove(staff_id: &str, entry_id: EntryId, result: &DirectoryResult<()>) {
    match result {
        Ok(()) => info!(
            "event=availability_remove module=schedule status=ok staff_id={staff_id} entry_id={entry_id}"
        ),
        Err(err) => warn!(
            "event=availability_remove module=schedule status=error staff_id={staff_id} entry_id={entry_id} error={err}"
        ),
    }
}
