//! Student domain model.
//!
//! # Responsibility
//! - Carry enrollment identity and the active flag driving service checks.
//! - Hold guardian links as ids with duplicate-safe add/remove.
//!
//! # Invariants
//! - `registration` is never blank and is unique by school convention.
//! - `email` is either empty or validated and lowercased.
//! - `guardians` holds no duplicate ids and preserves link order.

use crate::model::guardian::GuardianId;
use crate::model::{normalize_email, ValidationError};
use crate::validate::validate_email;
use serde::{Deserialize, Serialize};

/// Surrogate key assigned by the persistence layer on first save.
pub type StudentId = i64;

/// A student enrolled at the school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// `None` until the repository assigns a row id.
    pub id: Option<StudentId>,
    pub name: String,
    /// Lowercased on construction; empty when unknown.
    pub email: String,
    /// School registration number, unique by convention.
    pub registration: String,
    /// Inactive students are excluded from listings and refuse new records.
    pub active: bool,
    /// Linked guardian ids in link order.
    pub guardians: Vec<GuardianId>,
}

impl Student {
    /// Creates an active student with no guardian links.
    ///
    /// # Errors
    /// - `EmptyRegistration` when the registration is blank.
    /// - `InvalidEmail` when a non-empty email fails validation.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        registration: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let student = Self {
            id: None,
            name: name.into().trim().to_string(),
            email: normalize_email(email.into())?,
            registration: registration.into().trim().to_string(),
            active: true,
            guardians: Vec::new(),
        };
        student.validate()?;
        Ok(student)
    }

    /// Re-checks construction invariants; used on every persistence path.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.registration.trim().is_empty() {
            return Err(ValidationError::EmptyRegistration);
        }
        if !self.email.is_empty() && !validate_email(&self.email) {
            return Err(ValidationError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }

    /// Links a guardian id; duplicate links fail.
    pub fn add_guardian(&mut self, guardian_id: GuardianId) -> Result<(), ValidationError> {
        if self.guardians.contains(&guardian_id) {
            return Err(ValidationError::GuardianAlreadyLinked(guardian_id));
        }
        self.guardians.push(guardian_id);
        Ok(())
    }

    /// Removes a guardian link; missing links fail.
    pub fn remove_guardian(&mut self, guardian_id: GuardianId) -> Result<(), ValidationError> {
        match self.guardians.iter().position(|&id| id == guardian_id) {
            Some(index) => {
                self.guardians.remove(index);
                Ok(())
            }
            None => Err(ValidationError::GuardianNotLinked(guardian_id)),
        }
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn activate(&mut self) {
        self.active = true;
    }
}
