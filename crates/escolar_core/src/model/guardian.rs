//! Guardian (parent/responsible adult) domain model.
//!
//! # Responsibility
//! - Carry guardian contact data with a checksum-validated CPF.
//! - Hold student links as ids with duplicate-safe add/remove.
//!
//! # Invariants
//! - `cpf`, when present, is normalized to exactly 11 digits and passed the
//!   check-digit validation.
//! - `students` holds no duplicate ids and preserves link order.

use crate::model::student::StudentId;
use crate::model::{normalize_email, ValidationError};
use crate::validate::{normalize_cpf, validate_cpf};
use serde::{Deserialize, Serialize};

/// Surrogate key assigned by the persistence layer on first save.
pub type GuardianId = i64;

/// A person responsible for one or more students.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guardian {
    /// `None` until the repository assigns a row id.
    pub id: Option<GuardianId>,
    pub name: String,
    /// Lowercased on construction; empty when unknown.
    pub email: String,
    /// Digits-only CPF; `None` when not on file.
    pub cpf: Option<String>,
    pub phone: Option<String>,
    /// Linked student ids in link order.
    pub students: Vec<StudentId>,
}

impl Guardian {
    /// Creates a guardian, validating and normalizing the CPF when given.
    ///
    /// # Errors
    /// - `InvalidEmail` when a non-empty email fails validation.
    /// - `InvalidCpf` when the CPF check digits do not match.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        cpf: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let cpf = match cpf {
            Some(value) => {
                if !validate_cpf(value) {
                    return Err(ValidationError::InvalidCpf(value.to_string()));
                }
                Some(normalize_cpf(value))
            }
            None => None,
        };
        Ok(Self {
            id: None,
            name: name.into(),
            email: normalize_email(email.into())?,
            cpf,
            phone: phone.map(|p| p.trim().to_string()),
            students: Vec::new(),
        })
    }

    /// Re-checks construction invariants; used on every persistence path.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(cpf) = &self.cpf {
            if !validate_cpf(cpf) {
                return Err(ValidationError::InvalidCpf(cpf.clone()));
            }
        }
        Ok(())
    }

    /// Links a student id; duplicate links fail.
    pub fn add_student(&mut self, student_id: StudentId) -> Result<(), ValidationError> {
        if self.students.contains(&student_id) {
            return Err(ValidationError::StudentAlreadyLinked(student_id));
        }
        self.students.push(student_id);
        Ok(())
    }

    /// Removes a student link; missing links fail.
    pub fn remove_student(&mut self, student_id: StudentId) -> Result<(), ValidationError> {
        match self.students.iter().position(|&id| id == student_id) {
            Some(index) => {
                self.students.remove(index);
                Ok(())
            }
            None => Err(ValidationError::StudentNotLinked(student_id)),
        }
    }
}
