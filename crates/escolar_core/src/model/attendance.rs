//! Attendance domain model.
//!
//! # Responsibility
//! - Record presence or absence of one student in one subject on one day.
//! - Own the absence-justification lifecycle.
//!
//! # Invariants
//! - A present record never carries `justified` or a justification text.
//! - An absence is justified at most once, and only with non-blank text.

use crate::model::student::StudentId;
use crate::model::ValidationError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Surrogate key assigned by the persistence layer on first save.
pub type AttendanceId = i64;

/// One attendance record for a student/subject/day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    /// `None` until the repository assigns a row id.
    pub id: Option<AttendanceId>,
    pub student_id: StudentId,
    pub subject: String,
    pub date: NaiveDate,
    pub is_present: bool,
    /// Only meaningful for absences.
    pub justified: bool,
    pub justification: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl Attendance {
    /// Creates an attendance record.
    ///
    /// # Errors
    /// - `EmptySubject` when the subject is blank.
    /// - `PresentWithJustification` when a present record carries
    ///   `justified` or a justification text.
    pub fn new(
        student_id: StudentId,
        subject: impl Into<String>,
        date: NaiveDate,
        is_present: bool,
        justified: bool,
        justification: Option<String>,
    ) -> Result<Self, ValidationError> {
        let attendance = Self {
            id: None,
            student_id,
            subject: subject.into().trim().to_string(),
            date,
            is_present,
            justified,
            justification,
            recorded_at: Utc::now(),
        };
        attendance.validate()?;
        Ok(attendance)
    }

    /// Shorthand for a plain presence record.
    pub fn present(
        student_id: StudentId,
        subject: impl Into<String>,
        date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        Self::new(student_id, subject, date, true, false, None)
    }

    /// Shorthand for a not-yet-justified absence.
    pub fn absence(
        student_id: StudentId,
        subject: impl Into<String>,
        date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        Self::new(student_id, subject, date, false, false, None)
    }

    /// Re-checks construction invariants; used on every persistence path.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.subject.trim().is_empty() {
            return Err(ValidationError::EmptySubject);
        }
        if self.is_present && (self.justified || self.justification.is_some()) {
            return Err(ValidationError::PresentWithJustification);
        }
        Ok(())
    }

    /// Justifies an absence with the given text.
    ///
    /// # Errors
    /// - `CannotJustifyPresence` on present records.
    /// - `AlreadyJustified` when called twice.
    /// - `EmptyJustification` for blank text.
    pub fn justify(&mut self, justification: impl Into<String>) -> Result<(), ValidationError> {
        if self.is_present {
            return Err(ValidationError::CannotJustifyPresence);
        }
        if self.justified {
            return Err(ValidationError::AlreadyJustified);
        }
        let text = justification.into().trim().to_string();
        if text.is_empty() {
            return Err(ValidationError::EmptyJustification);
        }
        self.justified = true;
        self.justification = Some(text);
        Ok(())
    }
}
