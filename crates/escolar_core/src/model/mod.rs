//! Domain model for the school record system.
//!
//! # Responsibility
//! - Define the entities, closed enumerations and construction invariants.
//! - Keep every object valid from construction onward.
//!
//! # Invariants
//! - Constructors and mutating operations fail fast with `ValidationError`;
//!   there is no partially-valid entity state.
//! - Cross-entity references are carried as surrogate-key ids, never as
//!   embedded object graphs.

use crate::validate::validate_email;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod assessment;
pub mod attendance;
pub mod classroom;
pub mod enums;
pub mod grade;
pub mod guardian;
pub mod student;
pub mod teacher;

use self::guardian::GuardianId;
use self::student::StudentId;

/// Invariant violation raised at entity construction or mutation time.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Student registration must not be blank.
    EmptyRegistration,
    /// Email does not match `local@domain.tld` shape.
    InvalidEmail(String),
    /// CPF fails length or check-digit rules.
    InvalidCpf(String),
    /// Classroom year/grade label needs at least two characters.
    YearLabelTooShort(String),
    /// Classroom identifier must be one single letter.
    InvalidClassIdentifier(String),
    /// Assessment title needs at least three characters.
    TitleTooShort(String),
    /// Subject names must not be blank.
    EmptySubject,
    /// Assessment max score must be in (0, 100].
    MaxScoreOutOfRange(f64),
    /// Assessment weight must be in (0, 10].
    WeightOutOfRange(f64),
    /// Grade scores cannot be negative.
    NegativeScore(f64),
    /// Grade score exceeds the assessment's maximum.
    ScoreAboveMax { score: f64, max_score: f64 },
    /// Grades can only reference assessments that were already persisted.
    UnsavedAssessment,
    /// Guardian is already linked to this student.
    GuardianAlreadyLinked(GuardianId),
    /// Guardian is not linked to this student.
    GuardianNotLinked(GuardianId),
    /// Student is already linked to this guardian or classroom.
    StudentAlreadyLinked(StudentId),
    /// Student is not linked to this guardian or classroom.
    StudentNotLinked(StudentId),
    /// Teacher already carries this subject.
    DuplicateSubject(String),
    /// Teacher does not carry this subject.
    SubjectNotFound(String),
    /// A present attendance record cannot carry absence justification.
    PresentWithJustification,
    /// Presence cannot be justified, only absences can.
    CannotJustifyPresence,
    /// The absence was already justified.
    AlreadyJustified,
    /// Justification text must not be blank.
    EmptyJustification,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRegistration => write!(f, "registration cannot be empty"),
            Self::InvalidEmail(value) => write!(f, "invalid email: `{value}`"),
            Self::InvalidCpf(value) => write!(f, "invalid CPF: `{value}`"),
            Self::YearLabelTooShort(value) => {
                write!(f, "year/grade label needs at least 2 characters, got `{value}`")
            }
            Self::InvalidClassIdentifier(value) => {
                write!(f, "classroom identifier must be a single letter, got `{value}`")
            }
            Self::TitleTooShort(value) => {
                write!(f, "title needs at least 3 characters, got `{value}`")
            }
            Self::EmptySubject => write!(f, "subject cannot be empty"),
            Self::MaxScoreOutOfRange(value) => {
                write!(f, "max score must be within (0, 100], got {value}")
            }
            Self::WeightOutOfRange(value) => {
                write!(f, "weight must be within (0, 10], got {value}")
            }
            Self::NegativeScore(value) => write!(f, "score cannot be negative, got {value}"),
            Self::ScoreAboveMax { score, max_score } => {
                write!(f, "score {score} exceeds assessment maximum {max_score}")
            }
            Self::UnsavedAssessment => {
                write!(f, "assessment must be saved before grades can reference it")
            }
            Self::GuardianAlreadyLinked(id) => {
                write!(f, "guardian {id} is already linked to this student")
            }
            Self::GuardianNotLinked(id) => {
                write!(f, "guardian {id} is not linked to this student")
            }
            Self::StudentAlreadyLinked(id) => write!(f, "student {id} is already linked"),
            Self::StudentNotLinked(id) => write!(f, "student {id} is not linked"),
            Self::DuplicateSubject(subject) => {
                write!(f, "subject `{subject}` is already registered for this teacher")
            }
            Self::SubjectNotFound(subject) => {
                write!(f, "subject `{subject}` is not registered for this teacher")
            }
            Self::PresentWithJustification => {
                write!(f, "a present student cannot carry an absence justification")
            }
            Self::CannotJustifyPresence => write!(f, "cannot justify a presence record"),
            Self::AlreadyJustified => write!(f, "absence was already justified"),
            Self::EmptyJustification => write!(f, "justification cannot be empty"),
        }
    }
}

impl Error for ValidationError {}

/// Trims, lowercases and validates an email field shared by several entities.
///
/// Empty input stays empty: not every record has a known email.
pub(crate) fn normalize_email(email: String) -> Result<String, ValidationError> {
    let trimmed = email.trim().to_lowercase();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if !validate_email(&trimmed) {
        return Err(ValidationError::InvalidEmail(email));
    }
    Ok(trimmed)
}
