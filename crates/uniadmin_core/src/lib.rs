//! Core domain logic for university staff administration.
//! This crate is the single source of truth for scheduling invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::staff::{EntryId, Role, ScheduleEntry, Specialty, StaffId, StaffRecord};
pub use model::user::{
    IdType, StaffProfile, StudentProfile, User, UserCore, UserKind, UserValidationError,
};
pub use repo::staff_repo::{RepoError, RepoResult, SqliteStaffRepository, StaffRepository};
pub use schedule::availability::AvailabilityQueryEngine;
pub use schedule::directory::{DirectoryError, DirectoryResult, StaffDirectory, StaffRegistration};
pub use schedule::interval::{day_window, overlaps, TimeInterval};
pub use schedule::specialty::SpecialtyMatcher;
pub use schedule::store::{ScheduleError, ScheduleResult, ScheduleStore};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
