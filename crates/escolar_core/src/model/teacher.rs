//! Teacher domain model.
//!
//! # Responsibility
//! - Carry teacher identity and the set of subjects they teach.
//!
//! # Invariants
//! - `subjects` holds trimmed, non-empty names without duplicates.
//! - Adding an existing subject or removing a missing one fails; the set is
//!   never silently changed.

use crate::model::{normalize_email, ValidationError};
use crate::validate::validate_email;
use serde::{Deserialize, Serialize};

/// Surrogate key assigned by the persistence layer on first save.
pub type TeacherId = i64;

/// A teacher and the subjects they are registered for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    /// `None` until the repository assigns a row id.
    pub id: Option<TeacherId>,
    pub name: String,
    /// Lowercased on construction; empty when unknown.
    pub email: String,
    pub registration: String,
    /// Subject names in registration order, no duplicates.
    pub subjects: Vec<String>,
}

impl Teacher {
    /// Creates a teacher with an empty subject set.
    ///
    /// # Errors
    /// - `InvalidEmail` when a non-empty email fails validation.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        registration: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: None,
            name: name.into().trim().to_string(),
            email: normalize_email(email.into())?,
            registration: registration.into().trim().to_string(),
            subjects: Vec::new(),
        })
    }

    /// Re-checks construction invariants; used on every persistence path.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.email.is_empty() && !validate_email(&self.email) {
            return Err(ValidationError::InvalidEmail(self.email.clone()));
        }
        for (index, subject) in self.subjects.iter().enumerate() {
            if subject.trim().is_empty() {
                return Err(ValidationError::EmptySubject);
            }
            if self.subjects[..index].contains(subject) {
                return Err(ValidationError::DuplicateSubject(subject.clone()));
            }
        }
        Ok(())
    }

    /// Registers a subject; blank names and duplicates fail.
    pub fn add_subject(&mut self, subject: impl Into<String>) -> Result<(), ValidationError> {
        let subject = subject.into().trim().to_string();
        if subject.is_empty() {
            return Err(ValidationError::EmptySubject);
        }
        if self.subjects.contains(&subject) {
            return Err(ValidationError::DuplicateSubject(subject));
        }
        self.subjects.push(subject);
        Ok(())
    }

    /// Removes a subject; missing names fail.
    pub fn remove_subject(&mut self, subject: &str) -> Result<(), ValidationError> {
        match self.subjects.iter().position(|s| s == subject) {
            Some(index) => {
                self.subjects.remove(index);
                Ok(())
            }
            None => Err(ValidationError::SubjectNotFound(subject.to_string())),
        }
    }

    /// Whether this teacher is registered for the given subject.
    pub fn teaches_subject(&self, subject: &str) -> bool {
        self.subjects.iter().any(|s| s == subject)
    }
}
