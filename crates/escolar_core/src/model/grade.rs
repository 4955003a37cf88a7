//! Grade domain model.
//!
//! # Responsibility
//! - Record one student's score on one assessment.
//!
//! # Invariants
//! - `score` is never negative and never exceeds the assessment maximum
//!   checked at construction.
//! - The referenced assessment must already be persisted: grades carry the
//!   assessment's row id, not the object.

use crate::model::assessment::{Assessment, AssessmentId};
use crate::model::student::StudentId;
use crate::model::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Surrogate key assigned by the persistence layer on first save.
pub type GradeId = i64;

/// A score given to one student on one assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    /// `None` until the repository assigns a row id.
    pub id: Option<GradeId>,
    pub student_id: StudentId,
    pub assessment_id: AssessmentId,
    pub score: f64,
    pub graded_at: DateTime<Utc>,
    /// Free-form identity of whoever entered the grade.
    pub graded_by: String,
}

impl Grade {
    /// Creates a grade, checking the score against the assessment's maximum.
    ///
    /// # Errors
    /// - `UnsavedAssessment` when the assessment has no id yet.
    /// - `NegativeScore` / `ScoreAboveMax` for out-of-range scores.
    pub fn new(
        student_id: StudentId,
        assessment: &Assessment,
        score: f64,
        graded_by: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let assessment_id = assessment.id.ok_or(ValidationError::UnsavedAssessment)?;
        if score < 0.0 {
            return Err(ValidationError::NegativeScore(score));
        }
        if !assessment.is_valid_score(score) {
            return Err(ValidationError::ScoreAboveMax {
                score,
                max_score: assessment.max_score,
            });
        }
        Ok(Self {
            id: None,
            student_id,
            assessment_id,
            score,
            graded_at: Utc::now(),
            graded_by: graded_by.into(),
        })
    }

    /// Re-checks the assessment-independent invariants.
    ///
    /// The max-score bound needs the assessment at hand and is enforced by
    /// [`Grade::new`]; persisted rows are re-checked against what can be
    /// verified from the grade alone.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.score < 0.0 {
            return Err(ValidationError::NegativeScore(self.score));
        }
        Ok(())
    }
}
