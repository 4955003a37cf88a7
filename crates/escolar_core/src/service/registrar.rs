//! Registrar use-case service: enrollment and guardian links.
//!
//! # Responsibility
//! - Gate enrollment behind student/classroom existence and activity.
//! - Validate kinship labels against the closed relationship set.
//! - Expose both directions of the guardian-student link.
//!
//! # Invariants
//! - Enrollment is idempotent; re-enrolling is not an error.
//! - A duplicate guardian link reports `false`, never a failure.
//! - Unknown kinship labels are rejected before any write.

use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::model::classroom::{Classroom, ClassroomId};
use crate::model::guardian::GuardianId;
use crate::model::student::StudentId;
use crate::repo::classroom_repo::ClassroomRepository;
use crate::repo::guardian_repo::GuardianRepository;
use crate::repo::student_repo::StudentRepository;
use crate::repo::RepoError;
use crate::validate::current_year;

/// Kinship labels accepted on a guardian-student link.
pub const VALID_RELATIONSHIPS: [&str; 11] = [
    "Pai",
    "Mãe",
    "Responsável",
    "Tutor",
    "Tutora",
    "Avô",
    "Avó",
    "Tio",
    "Tia",
    "Padrasto",
    "Madrasta",
];

/// Label used when a link is created without an explicit one.
pub const DEFAULT_RELATIONSHIP: &str = "Responsável";

/// Service error for registrar use-cases.
#[derive(Debug)]
pub enum RegistrarError {
    StudentNotFound(StudentId),
    StudentInactive(StudentId),
    ClassroomNotFound(ClassroomId),
    GuardianNotFound(GuardianId),
    /// Kinship label outside [`VALID_RELATIONSHIPS`].
    InvalidRelationship(String),
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for RegistrarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StudentNotFound(id) => write!(f, "student not found: {id}"),
            Self::StudentInactive(id) => write!(f, "student is inactive: {id}"),
            Self::ClassroomNotFound(id) => write!(f, "classroom not found: {id}"),
            Self::GuardianNotFound(id) => write!(f, "guardian not found: {id}"),
            Self::InvalidRelationship(label) => {
                write!(f, "invalid relationship label: `{label}`")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent registrar state: {details}")
            }
        }
    }
}

impl Error for RegistrarError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for RegistrarError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Registrar service facade over repository implementations.
pub struct RegistrarService<S, C, G>
where
    S: StudentRepository,
    C: ClassroomRepository,
    G: GuardianRepository,
{
    students: S,
    classrooms: C,
    guardians: G,
}

impl<S, C, G> RegistrarService<S, C, G>
where
    S: StudentRepository,
    C: ClassroomRepository,
    G: GuardianRepository,
{
    /// Creates a service using the provided repository implementations.
    pub fn new(students: S, classrooms: C, guardians: G) -> Self {
        Self {
            students,
            classrooms,
            guardians,
        }
    }

    /// Enrolls one student into one classroom for an academic year
    /// (current year when omitted).
    ///
    /// # Contract
    /// - Student must exist and be active; classroom must exist.
    /// - Idempotent: re-enrolling the same pair changes nothing.
    /// - Returns the classroom with its enrollment list re-read.
    pub fn enroll_student(
        &self,
        student_id: StudentId,
        classroom_id: ClassroomId,
        academic_year: Option<i32>,
    ) -> Result<Classroom, RegistrarError> {
        let student = self
            .students
            .find_by_id(student_id)?
            .ok_or(RegistrarError::StudentNotFound(student_id))?;
        if !student.active {
            return Err(RegistrarError::StudentInactive(student_id));
        }
        if self.classrooms.find_by_id(classroom_id)?.is_none() {
            return Err(RegistrarError::ClassroomNotFound(classroom_id));
        }

        let year = academic_year.unwrap_or_else(current_year);
        self.classrooms
            .add_student_to_classroom(classroom_id, student_id, year)?;
        self.classrooms
            .find_by_id(classroom_id)?
            .ok_or(RegistrarError::InconsistentState(
                "classroom missing after enrollment",
            ))
    }

    /// Links a guardian to a student under a kinship label
    /// ([`DEFAULT_RELATIONSHIP`] when omitted).
    ///
    /// # Contract
    /// - Guardian and student must exist.
    /// - Label must be one of [`VALID_RELATIONSHIPS`].
    /// - Returns whether a new link was created; an existing link is
    ///   `false`, not an error.
    pub fn link_guardian(
        &self,
        guardian_id: GuardianId,
        student_id: StudentId,
        relationship: Option<&str>,
    ) -> Result<bool, RegistrarError> {
        let label = relationship.unwrap_or(DEFAULT_RELATIONSHIP);
        if !is_valid_relationship(label) {
            return Err(RegistrarError::InvalidRelationship(label.to_string()));
        }

        if self.guardians.find_by_id(guardian_id)?.is_none() {
            return Err(RegistrarError::GuardianNotFound(guardian_id));
        }
        if self.students.find_by_id(student_id)?.is_none() {
            return Err(RegistrarError::StudentNotFound(student_id));
        }

        Ok(self
            .guardians
            .link_to_student(guardian_id, student_id, label)?)
    }

    /// Removes one guardian-student link. Returns whether a row was
    /// actually removed.
    pub fn unlink_guardian(
        &self,
        guardian_id: GuardianId,
        student_id: StudentId,
    ) -> Result<bool, RegistrarError> {
        Ok(self
            .guardians
            .unlink_from_student(guardian_id, student_id)?)
    }

    /// Ids of students linked to a guardian, insertion order.
    ///
    /// Fails when the guardian is absent; the student side is not
    /// validated.
    pub fn students_of_guardian(
        &self,
        guardian_id: GuardianId,
    ) -> Result<Vec<StudentId>, RegistrarError> {
        if self.guardians.find_by_id(guardian_id)?.is_none() {
            return Err(RegistrarError::GuardianNotFound(guardian_id));
        }
        Ok(self.guardians.get_students(guardian_id)?)
    }

    /// Ids of guardians linked to a student, insertion order.
    ///
    /// Fails when the student is absent; the guardian side is not
    /// validated.
    pub fn guardians_of_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<GuardianId>, RegistrarError> {
        if self.students.find_by_id(student_id)?.is_none() {
            return Err(RegistrarError::StudentNotFound(student_id));
        }
        Ok(self.guardians.get_parents_by_student(student_id)?)
    }
}

/// Whether `label` belongs to the closed kinship set.
pub fn is_valid_relationship(label: &str) -> bool {
    VALID_RELATIONSHIPS.contains(&label)
}
