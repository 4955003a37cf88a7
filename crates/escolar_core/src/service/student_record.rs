//! Student record use-case service: grades, averages, report cards and
//! attendance extracts.
//!
//! # Responsibility
//! - Gate grade entry behind student/assessment existence and activity.
//! - Compute weighted bimester averages and aggregate them into report
//!   cards.
//! - Derive attendance statistics over inclusive date ranges.
//!
//! # Invariants
//! - A (student, assessment) pair is graded at most once through this
//!   service; the duplicate is a domain conflict, not an overwrite.
//! - Averages are weighted by assessment weight and rounded to 2 decimals.
//! - A report card's status is `Passed`/`Failed` only when all four
//!   bimesters have grades; anything less is `Incomplete` even though a
//!   partial average is still reported.

use std::error::Error;
use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::assessment::AssessmentId;
use crate::model::enums::Bimester;
use crate::model::grade::Grade;
use crate::model::student::StudentId;
use crate::model::ValidationError;
use crate::repo::assessment_repo::AssessmentRepository;
use crate::repo::attendance_repo::AttendanceRepository;
use crate::repo::grade_repo::{GradeRepository, GradeWithAssessment};
use crate::repo::student_repo::StudentRepository;
use crate::repo::RepoError;

/// Annual average at or above this passes the subject.
pub const PASSING_AVERAGE: f64 = 6.0;

const BIMESTER_LABELS: [&str; 4] = [
    "1st bimester",
    "2nd bimester",
    "3rd bimester",
    "4th bimester",
];

/// Service error for student record use-cases.
#[derive(Debug)]
pub enum StudentRecordError {
    StudentNotFound(StudentId),
    StudentInactive(StudentId),
    AssessmentNotFound(AssessmentId),
    /// The (student, assessment) pair already has a grade.
    AlreadyGraded {
        student_id: StudentId,
        assessment_id: AssessmentId,
    },
    Validation(ValidationError),
    Repo(RepoError),
}

impl Display for StudentRecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StudentNotFound(id) => write!(f, "student not found: {id}"),
            Self::StudentInactive(id) => write!(f, "student is inactive: {id}"),
            Self::AssessmentNotFound(id) => write!(f, "assessment not found: {id}"),
            Self::AlreadyGraded {
                student_id,
                assessment_id,
            } => write!(
                f,
                "student {student_id} already has a grade for assessment {assessment_id}"
            ),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StudentRecordError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for StudentRecordError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for StudentRecordError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Outcome classification on a report card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    Passed,
    Failed,
    Incomplete,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "Passed",
            Self::Failed => "Failed",
            Self::Incomplete => "Incomplete",
        }
    }
}

impl Display for RecordStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One student's yearly standing in one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportCard {
    pub student_id: StudentId,
    pub subject: String,
    pub academic_year: i32,
    /// Bimester averages in calendar order; `None` where nothing was
    /// graded.
    pub bimester_averages: [Option<f64>; 4],
    pub annual_average: Option<f64>,
    pub status: RecordStatus,
}

impl Display for ReportCard {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Report card - student {} - {} ({})",
            self.student_id, self.subject, self.academic_year
        )?;
        for (label, average) in BIMESTER_LABELS.iter().zip(self.bimester_averages.iter()) {
            match average {
                Some(value) => writeln!(f, "  {label}: {value:.2}")?,
                None => writeln!(f, "  {label}: -")?,
            }
        }
        match self.annual_average {
            Some(value) => writeln!(f, "  Annual average: {value:.2}")?,
            None => writeln!(f, "  Annual average: -")?,
        }
        write!(f, "  Status: {}", self.status)
    }
}

/// Attendance statistics for one student/subject over a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceExtract {
    pub student_id: StudentId,
    pub subject: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub justified_absences: usize,
    /// present/total as a percentage, 1 decimal; 0.0 for an empty range.
    pub presence_percentage: f64,
}

impl Display for AttendanceExtract {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Attendance - student {} - {} ({} to {})",
            self.student_id, self.subject, self.start, self.end
        )?;
        writeln!(
            f,
            "  Records: {} (present {}, absent {}, justified {})",
            self.total, self.present, self.absent, self.justified_absences
        )?;
        write!(f, "  Presence: {:.1}%", self.presence_percentage)
    }
}

/// Student record service facade over repository implementations.
pub struct StudentRecordService<S, A, G, T>
where
    S: StudentRepository,
    A: AssessmentRepository,
    G: GradeRepository,
    T: AttendanceRepository,
{
    students: S,
    assessments: A,
    grades: G,
    attendance: T,
}

impl<S, A, G, T> StudentRecordService<S, A, G, T>
where
    S: StudentRepository,
    A: AssessmentRepository,
    G: GradeRepository,
    T: AttendanceRepository,
{
    /// Creates a service using the provided repository implementations.
    pub fn new(students: S, assessments: A, grades: G, attendance: T) -> Self {
        Self {
            students,
            assessments,
            grades,
            attendance,
        }
    }

    /// Records one grade for a (student, assessment) pair.
    ///
    /// # Contract
    /// - Student must exist and be active.
    /// - Assessment must exist.
    /// - An existing grade for the pair is `AlreadyGraded`; this check
    ///   runs before the repository upsert so the conflict is loud.
    /// - Score range is enforced by `Grade::new` against the assessment.
    pub fn record_grade(
        &self,
        student_id: StudentId,
        assessment_id: AssessmentId,
        score: f64,
        graded_by: &str,
    ) -> Result<Grade, StudentRecordError> {
        let student = self
            .students
            .find_by_id(student_id)?
            .ok_or(StudentRecordError::StudentNotFound(student_id))?;
        if !student.active {
            return Err(StudentRecordError::StudentInactive(student_id));
        }

        let assessment = self
            .assessments
            .find_by_id(assessment_id)?
            .ok_or(StudentRecordError::AssessmentNotFound(assessment_id))?;

        if self
            .grades
            .find_by_student_and_assessment(student_id, assessment_id)?
            .is_some()
        {
            return Err(StudentRecordError::AlreadyGraded {
                student_id,
                assessment_id,
            });
        }

        let mut grade = Grade::new(student_id, &assessment, score, graded_by)?;
        self.grades.save(&mut grade)?;
        Ok(grade)
    }

    /// Weighted average of one student's grades in a subject/bimester.
    ///
    /// Returns `None` when nothing was graded, or when total weight is
    /// zero (defensive; weights are validated positive).
    pub fn bimester_average(
        &self,
        student_id: StudentId,
        subject: &str,
        bimester: Bimester,
        academic_year: i32,
    ) -> Result<Option<f64>, StudentRecordError> {
        let entries = self.grades.find_by_student_and_bimester(
            student_id,
            subject,
            bimester.as_str(),
            academic_year,
        )?;
        Ok(weighted_average(&entries))
    }

    /// Aggregates the four bimester averages into a report card.
    ///
    /// # Contract
    /// - 0 populated bimesters: annual average absent, `Incomplete`.
    /// - 1-3 populated: annual average = mean of the populated values,
    ///   still `Incomplete`.
    /// - 4 populated: annual average = sum/4, `Passed` iff it reaches
    ///   [`PASSING_AVERAGE`], else `Failed`.
    pub fn report_card(
        &self,
        student_id: StudentId,
        subject: &str,
        academic_year: i32,
    ) -> Result<ReportCard, StudentRecordError> {
        let mut bimester_averages = [None; 4];
        for (slot, bimester) in bimester_averages.iter_mut().zip(Bimester::ALL) {
            *slot = self.bimester_average(student_id, subject, bimester, academic_year)?;
        }

        let populated: Vec<f64> = bimester_averages.iter().flatten().copied().collect();
        let (annual_average, status) = match populated.len() {
            0 => (None, RecordStatus::Incomplete),
            4 => {
                let annual = round2(populated.iter().sum::<f64>() / 4.0);
                let status = if annual >= PASSING_AVERAGE {
                    RecordStatus::Passed
                } else {
                    RecordStatus::Failed
                };
                (Some(annual), status)
            }
            count => {
                let annual = round2(populated.iter().sum::<f64>() / count as f64);
                (Some(annual), RecordStatus::Incomplete)
            }
        };

        Ok(ReportCard {
            student_id,
            subject: subject.to_string(),
            academic_year,
            bimester_averages,
            annual_average,
            status,
        })
    }

    /// Attendance statistics for one student/subject between `start` and
    /// `end` inclusive.
    pub fn attendance_extract(
        &self,
        student_id: StudentId,
        subject: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AttendanceExtract, StudentRecordError> {
        let records = self
            .attendance
            .find_by_student_and_period(student_id, subject, start, end)?;

        let total = records.len();
        let present = records.iter().filter(|record| record.is_present).count();
        let absent = total - present;
        let justified_absences = records
            .iter()
            .filter(|record| !record.is_present && record.justified)
            .count();
        let presence_percentage = if total == 0 {
            0.0
        } else {
            round1(present as f64 / total as f64 * 100.0)
        };

        Ok(AttendanceExtract {
            student_id,
            subject: subject.to_string(),
            start,
            end,
            total,
            present,
            absent,
            justified_absences,
            presence_percentage,
        })
    }
}

/// Weight-adjusted mean over populated grade entries.
///
/// Rules:
/// - empty input: `None`.
/// - zero total weight: `None`.
/// - otherwise `sum(score*weight)/sum(weight)` rounded to 2 decimals.
pub fn weighted_average(entries: &[GradeWithAssessment]) -> Option<f64> {
    if entries.is_empty() {
        return None;
    }

    let total_weight: f64 = entries.iter().map(|entry| entry.assessment.weight).sum();
    if total_weight == 0.0 {
        return None;
    }

    let weighted_sum: f64 = entries
        .iter()
        .map(|entry| entry.grade.score * entry.assessment.weight)
        .sum();
    Some(round2(weighted_sum / total_weight))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
