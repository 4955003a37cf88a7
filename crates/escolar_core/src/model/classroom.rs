//! Classroom domain model.
//!
//! # Responsibility
//! - Describe one class group: year label, section letter, shift and level.
//! - Hold enrolled student ids with duplicate-safe add/remove.
//!
//! # Invariants
//! - `identifier` is exactly one uppercase letter.
//! - `year` is a trimmed label of at least two characters (e.g. "6º Ano").

use crate::model::enums::{EducationLevel, Shift};
use crate::model::student::StudentId;
use crate::model::teacher::TeacherId;
use crate::model::ValidationError;
use serde::{Deserialize, Serialize};

/// Surrogate key assigned by the persistence layer on first save.
pub type ClassroomId = i64;

/// A class group within one school year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classroom {
    /// `None` until the repository assigns a row id.
    pub id: Option<ClassroomId>,
    /// Year/grade label, e.g. "6º Ano".
    pub year: String,
    /// Single uppercase section letter, e.g. "A".
    pub identifier: String,
    pub shift: Shift,
    pub level: EducationLevel,
    /// Assigned homeroom teacher, when any.
    pub teacher_id: Option<TeacherId>,
    /// Enrolled student ids in enrollment order.
    pub students: Vec<StudentId>,
}

impl Classroom {
    /// Creates a classroom, uppercasing the section identifier.
    ///
    /// # Errors
    /// - `YearLabelTooShort` when the year label has fewer than 2 characters.
    /// - `InvalidClassIdentifier` when the section is not one single letter.
    pub fn new(
        year: impl Into<String>,
        identifier: impl Into<String>,
        shift: Shift,
        level: EducationLevel,
    ) -> Result<Self, ValidationError> {
        let classroom = Self {
            id: None,
            year: year.into().trim().to_string(),
            identifier: identifier.into().trim().to_uppercase(),
            shift,
            level,
            teacher_id: None,
            students: Vec::new(),
        };
        classroom.validate()?;
        Ok(classroom)
    }

    /// Re-checks construction invariants; used on every persistence path.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.year.trim().chars().count() < 2 {
            return Err(ValidationError::YearLabelTooShort(self.year.clone()));
        }
        let mut chars = self.identifier.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_alphabetic() => Ok(()),
            _ => Err(ValidationError::InvalidClassIdentifier(
                self.identifier.clone(),
            )),
        }
    }

    /// Enrolls a student id; duplicates fail.
    pub fn add_student(&mut self, student_id: StudentId) -> Result<(), ValidationError> {
        if self.students.contains(&student_id) {
            return Err(ValidationError::StudentAlreadyLinked(student_id));
        }
        self.students.push(student_id);
        Ok(())
    }

    /// Removes an enrolled student id; missing ids fail.
    pub fn remove_student(&mut self, student_id: StudentId) -> Result<(), ValidationError> {
        match self.students.iter().position(|&id| id == student_id) {
            Some(index) => {
                self.students.remove(index);
                Ok(())
            }
            None => Err(ValidationError::StudentNotLinked(student_id)),
        }
    }

    /// Human-readable label: year, section, shift and level.
    pub fn full_name(&self) -> String {
        format!(
            "{} {} - {} - {}",
            self.year, self.identifier, self.shift, self.level
        )
    }
}
