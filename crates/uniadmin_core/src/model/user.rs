//! Tagged user model shared by students and staff.
//!
//! # Responsibility
//! - Keep common identity/contact fields in `UserCore`.
//! - Keep kind-specific fields inside the `UserKind` payload.
//!
//! # Invariants
//! - A `Student` user always has role `STUDENT`; a `Staff` user never does.
//! - `validate()` must pass before a user is projected into a staff record.

use crate::model::staff::{Role, Specialty, StaffRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

const USER_ID_MIN_CHARS: usize = 5;
const USER_ID_MAX_CHARS: usize = 15;
const FULL_NAME_MAX_CHARS: usize = 100;
const EMAIL_MAX_CHARS: usize = 50;
const STUDENT_CODE_MAX_CHARS: usize = 12;
const SEMESTER_MAX: u8 = 12;

/// Identity document kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdType {
    /// National identification archive.
    Ani,
    /// Citizenship card.
    Cc,
    Nip,
    Nuip,
    /// Passport.
    Pa,
    /// Civil registry.
    Rc,
    /// Identity card for minors.
    Ti,
}

/// Fields shared by every user kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCore {
    pub id: String,
    pub id_type: IdType,
    pub full_name: String,
    pub phone: u64,
    pub email: String,
    pub role: Role,
    pub active: bool,
}

/// Student-only fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub student_code: String,
    pub program: String,
    pub semester: u8,
    pub address: String,
}

/// Staff-only fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffProfile {
    pub specialty: Option<Specialty>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UserKind {
    Student(StudentProfile),
    Staff(StaffProfile),
}

impl UserKind {
    /// Returns whether `role` may be held by a user of this kind.
    pub fn accepts_role(&self, role: Role) -> bool {
        match self {
            Self::Student(_) => role == Role::Student,
            Self::Staff(_) => role != Role::Student,
        }
    }
}

/// A user of the administrative system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub core: UserCore,
    pub kind: UserKind,
}

/// Field-level validation failure for [`User`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    IdLength { chars: usize },
    BlankFullName,
    FullNameTooLong { chars: usize },
    InvalidEmail(String),
    RoleNotAllowed(Role),
    BlankStudentCode,
    StudentCodeTooLong { chars: usize },
    SemesterOutOfRange(u8),
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IdLength { chars } => write!(
                f,
                "user id must be {USER_ID_MIN_CHARS}..={USER_ID_MAX_CHARS} chars, got {chars}"
            ),
            Self::BlankFullName => write!(f, "full name must not be blank"),
            Self::FullNameTooLong { chars } => write!(
                f,
                "full name must be at most {FULL_NAME_MAX_CHARS} chars, got {chars}"
            ),
            Self::InvalidEmail(email) => write!(f, "invalid email `{email}`"),
            Self::RoleNotAllowed(role) => {
                write!(f, "role {} is not allowed for this user kind", role.as_str())
            }
            Self::BlankStudentCode => write!(f, "student code must not be blank"),
            Self::StudentCodeTooLong { chars } => write!(
                f,
                "student code must be at most {STUDENT_CODE_MAX_CHARS} chars, got {chars}"
            ),
            Self::SemesterOutOfRange(value) => {
                write!(f, "semester must be 1..={SEMESTER_MAX}, got {value}")
            }
        }
    }
}

impl Error for UserValidationError {}

impl User {
    /// Creates a staff user; role compatibility is checked by `validate()`.
    pub fn staff(core: UserCore, specialty: Option<Specialty>) -> Self {
        Self {
            core,
            kind: UserKind::Staff(StaffProfile { specialty }),
        }
    }

    pub fn student(core: UserCore, profile: StudentProfile) -> Self {
        Self {
            core,
            kind: UserKind::Student(profile),
        }
    }

    pub fn id(&self) -> &str {
        self.core.id.as_str()
    }

    pub fn is_staff(&self) -> bool {
        matches!(self.kind, UserKind::Staff(_))
    }

    /// Validates shared and kind-specific field constraints.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        let id_chars = self.core.id.trim().chars().count();
        if !(USER_ID_MIN_CHARS..=USER_ID_MAX_CHARS).contains(&id_chars) {
            return Err(UserValidationError::IdLength { chars: id_chars });
        }

        if self.core.full_name.trim().is_empty() {
            return Err(UserValidationError::BlankFullName);
        }
        let name_chars = self.core.full_name.chars().count();
        if name_chars > FULL_NAME_MAX_CHARS {
            return Err(UserValidationError::FullNameTooLong { chars: name_chars });
        }

        if self.core.email.chars().count() > EMAIL_MAX_CHARS
            || !EMAIL_RE.is_match(self.core.email.as_str())
        {
            return Err(UserValidationError::InvalidEmail(self.core.email.clone()));
        }

        if !self.kind.accepts_role(self.core.role) {
            return Err(UserValidationError::RoleNotAllowed(self.core.role));
        }

        if let UserKind::Student(profile) = &self.kind {
            if profile.student_code.trim().is_empty() {
                return Err(UserValidationError::BlankStudentCode);
            }
            let code_chars = profile.student_code.chars().count();
            if code_chars > STUDENT_CODE_MAX_CHARS {
                return Err(UserValidationError::StudentCodeTooLong { chars: code_chars });
            }
            if profile.semester == 0 || profile.semester > SEMESTER_MAX {
                return Err(UserValidationError::SemesterOutOfRange(profile.semester));
            }
        }

        Ok(())
    }

    /// Projects a staff user into a staff record with an empty schedule.
    ///
    /// Returns `None` for student users. A missing specialty falls back to
    /// the role default.
    pub fn into_staff_record(self) -> Option<StaffRecord> {
        let UserKind::Staff(profile) = self.kind else {
            return None;
        };
        let specialty = profile
            .specialty
            .or_else(|| self.core.role.default_specialty());
        let mut record = StaffRecord::new(self.core.id, self.core.full_name, self.core.role)
            .with_specialty(specialty);
        record.active = self.core.active;
        Some(record)
    }
}
