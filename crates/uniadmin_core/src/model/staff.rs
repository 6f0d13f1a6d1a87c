//! Staff domain model.
//!
//! # Responsibility
//! - Define the canonical staff record and its availability entries.
//! - Own the fixed `Role`/`Specialty` enumerations and their textual forms.
//!
//! # Invariants
//! - `StaffRecord::id` is immutable once registered.
//! - `ScheduleEntry::id` is generated on insertion and never reused.
//! - `ScheduleEntry::end` is strictly after `ScheduleEntry::start`.
//! - `StaffRecord::schedule` is always an owned collection, empty by default.

use crate::schedule::interval::TimeInterval;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque staff identity (national id in the administrative system).
pub type StaffId = String;

/// Stable identifier for one availability entry.
pub type EntryId = Uuid;

/// Fixed role enumeration shared by every user kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Administrator,
    MedicalSecretary,
    /// Doctors, dentists, psychologists.
    MedicalStaff,
    GeneralServicesStaff,
    Prefect,
    Student,
    /// Gym or sports coach.
    Trainer,
    WellnessStaff,
    /// Student in charge of recreational rooms and equipment loans.
    Monitor,
    Teacher,
}

impl Role {
    pub const ALL: [Role; 10] = [
        Role::Administrator,
        Role::MedicalSecretary,
        Role::MedicalStaff,
        Role::GeneralServicesStaff,
        Role::Prefect,
        Role::Student,
        Role::Trainer,
        Role::WellnessStaff,
        Role::Monitor,
        Role::Teacher,
    ];

    /// Canonical upper-snake textual form.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Administrator => "ADMINISTRATOR",
            Role::MedicalSecretary => "MEDICAL_SECRETARY",
            Role::MedicalStaff => "MEDICAL_STAFF",
            Role::GeneralServicesStaff => "GENERAL_SERVICES_STAFF",
            Role::Prefect => "PREFECT",
            Role::Student => "STUDENT",
            Role::Trainer => "TRAINER",
            Role::WellnessStaff => "WELLNESS_STAFF",
            Role::Monitor => "MONITOR",
            Role::Teacher => "TEACHER",
        }
    }

    /// Parses a role name, ignoring ASCII case and surrounding whitespace.
    pub fn parse(text: &str) -> Option<Role> {
        let trimmed = text.trim();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(trimmed))
    }

    /// Specialty assigned on registration when none is given.
    pub fn default_specialty(self) -> Option<Specialty> {
        match self {
            Role::MedicalStaff => Some(Specialty::GeneralMedicine),
            Role::Trainer => Some(Specialty::FitnessCoach),
            _ => None,
        }
    }
}

/// Fixed specialty enumeration for staff members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Specialty {
    // Medical
    GeneralMedicine,
    Dentistry,
    Psychology,
    Nutrition,
    Physiotherapy,
    Nursing,
    // Coaching
    FitnessCoach,
    YogaInstructor,
    PilatesInstructor,
    CardioCoach,
    StrengthCoach,
    SwimmingCoach,
    SoccerCoach,
    BasketballCoach,
    VolleyballCoach,
    DanceInstructor,
    // Other
    WellnessCoordinator,
    Administrative,
    Other,
}

impl Specialty {
    pub const ALL: [Specialty; 19] = [
        Specialty::GeneralMedicine,
        Specialty::Dentistry,
        Specialty::Psychology,
        Specialty::Nutrition,
        Specialty::Physiotherapy,
        Specialty::Nursing,
        Specialty::FitnessCoach,
        Specialty::YogaInstructor,
        Specialty::PilatesInstructor,
        Specialty::CardioCoach,
        Specialty::StrengthCoach,
        Specialty::SwimmingCoach,
        Specialty::SoccerCoach,
        Specialty::BasketballCoach,
        Specialty::VolleyballCoach,
        Specialty::DanceInstructor,
        Specialty::WellnessCoordinator,
        Specialty::Administrative,
        Specialty::Other,
    ];

    /// Canonical upper-snake textual form, also used for persistence.
    pub fn as_str(self) -> &'static str {
        match self {
            Specialty::GeneralMedicine => "GENERAL_MEDICINE",
            Specialty::Dentistry => "DENTISTRY",
            Specialty::Psychology => "PSYCHOLOGY",
            Specialty::Nutrition => "NUTRITION",
            Specialty::Physiotherapy => "PHYSIOTHERAPY",
            Specialty::Nursing => "NURSING",
            Specialty::FitnessCoach => "FITNESS_COACH",
            Specialty::YogaInstructor => "YOGA_INSTRUCTOR",
            Specialty::PilatesInstructor => "PILATES_INSTRUCTOR",
            Specialty::CardioCoach => "CARDIO_COACH",
            Specialty::StrengthCoach => "STRENGTH_COACH",
            Specialty::SwimmingCoach => "SWIMMING_COACH",
            Specialty::SoccerCoach => "SOCCER_COACH",
            Specialty::BasketballCoach => "BASKETBALL_COACH",
            Specialty::VolleyballCoach => "VOLLEYBALL_COACH",
            Specialty::DanceInstructor => "DANCE_INSTRUCTOR",
            Specialty::WellnessCoordinator => "WELLNESS_COORDINATOR",
            Specialty::Administrative => "ADMINISTRATIVE",
            Specialty::Other => "OTHER",
        }
    }

    /// Exact canonical lookup, ignoring ASCII case and surrounding whitespace.
    pub fn parse(text: &str) -> Option<Specialty> {
        let trimmed = text.trim();
        Self::ALL
            .into_iter()
            .find(|specialty| specialty.as_str().eq_ignore_ascii_case(trimmed))
    }
}

/// One published availability interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: EntryId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ScheduleEntry {
    /// Creates an entry for `interval` with a freshly generated id.
    pub fn new(interval: TimeInterval) -> Self {
        Self::with_id(Uuid::new_v4(), interval)
    }

    /// Creates an entry with a caller-provided id (hydration paths).
    pub fn with_id(id: EntryId, interval: TimeInterval) -> Self {
        Self {
            id,
            start: interval.start,
            end: interval.end,
        }
    }

    pub fn interval(&self) -> TimeInterval {
        TimeInterval::new(self.start, self.end)
    }
}

/// Canonical staff record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffRecord {
    pub id: StaffId,
    pub display_name: String,
    pub role: Role,
    /// `None` is the "none" specialty.
    pub specialty: Option<Specialty>,
    pub active: bool,
    /// Ordered by start instant when produced by the directory or repository.
    pub schedule: Vec<ScheduleEntry>,
}

impl StaffRecord {
    /// Creates an active record with no specialty and an empty schedule.
    pub fn new(id: impl Into<StaffId>, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            role,
            specialty: None,
            active: true,
            schedule: Vec::new(),
        }
    }

    pub fn with_specialty(mut self, specialty: Option<Specialty>) -> Self {
        self.specialty = specialty;
        self
    }

    /// Textual form used by keyword matching; `None` when no specialty is set.
    pub fn specialty_text(&self) -> Option<&'static str> {
        self.specialty.map(Specialty::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::{Role, Specialty, StaffRecord};

    #[test]
    fn role_parse_ignores_case_and_whitespace() {
        assert_eq!(Role::parse(" medical_staff "), Some(Role::MedicalStaff));
        assert_eq!(Role::parse("JANITOR"), None);
    }

    #[test]
    fn every_specialty_roundtrips_through_text() {
        for specialty in Specialty::ALL {
            assert_eq!(Specialty::parse(specialty.as_str()), Some(specialty));
        }
    }

    #[test]
    fn default_specialty_follows_role() {
        assert_eq!(
            Role::MedicalStaff.default_specialty(),
            Some(Specialty::GeneralMedicine)
        );
        assert_eq!(Role::Trainer.default_specialty(), Some(Specialty::FitnessCoach));
        assert_eq!(Role::Prefect.default_specialty(), None);
    }

    #[test]
    fn new_record_starts_active_with_empty_schedule() {
        let record = StaffRecord::new("1010101", "Ana Ruiz", Role::Teacher);
        assert!(record.active);
        assert!(record.schedule.is_empty());
        assert_eq!(record.specialty_text(), None);
    }

    #[test]
    fn serializes_enums_in_upper_snake_case() {
        let json = serde_json::to_string(&Specialty::GeneralMedicine).unwrap();
        assert_eq!(json, "\"GENERAL_MEDICINE\"");
        let role: Role = serde_json::from_str("\"WELLNESS_STAFF\"").unwrap();
        assert_eq!(role, Role::WellnessStaff);
    }
}
