//! Assessment domain model.
//!
//! # Responsibility
//! - Describe one graded activity: scoring bounds, weight, bimester and
//!   calendar placement.
//!
//! # Invariants
//! - `max_score` lies in (0, 100] and `weight` in (0, 10].
//! - `title` has at least three characters; `subject` is never blank.

use crate::model::enums::{AssessmentType, Bimester};
use crate::model::ValidationError;
use crate::validate::current_year;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Surrogate key assigned by the persistence layer on first save.
pub type AssessmentId = i64;

/// One graded activity within a subject and bimester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// `None` until the repository assigns a row id.
    pub id: Option<AssessmentId>,
    pub title: String,
    pub description: String,
    pub subject: String,
    pub kind: AssessmentType,
    /// Highest score a grade may carry, in (0, 100].
    pub max_score: f64,
    /// Weight in the bimester average, in (0, 10].
    pub weight: f64,
    pub bimester: Bimester,
    pub assessment_date: Option<NaiveDate>,
    pub academic_year: i32,
}

impl Assessment {
    /// Creates an assessment; `academic_year` defaults to the current year.
    ///
    /// # Errors
    /// - `TitleTooShort` when the trimmed title has fewer than 3 characters.
    /// - `EmptySubject` when the subject is blank.
    /// - `MaxScoreOutOfRange` / `WeightOutOfRange` for out-of-bound scoring.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        subject: impl Into<String>,
        kind: AssessmentType,
        max_score: f64,
        weight: f64,
        bimester: Bimester,
        assessment_date: Option<NaiveDate>,
        academic_year: Option<i32>,
    ) -> Result<Self, ValidationError> {
        let assessment = Self {
            id: None,
            title: title.into().trim().to_string(),
            description: description.into().trim().to_string(),
            subject: subject.into().trim().to_string(),
            kind,
            max_score,
            weight,
            bimester,
            assessment_date,
            academic_year: academic_year.unwrap_or_else(current_year),
        };
        assessment.validate()?;
        Ok(assessment)
    }

    /// Re-checks construction invariants; used on every persistence path.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().chars().count() < 3 {
            return Err(ValidationError::TitleTooShort(self.title.clone()));
        }
        if self.subject.trim().is_empty() {
            return Err(ValidationError::EmptySubject);
        }
        if self.max_score <= 0.0 || self.max_score > 100.0 {
            return Err(ValidationError::MaxScoreOutOfRange(self.max_score));
        }
        if self.weight <= 0.0 || self.weight > 10.0 {
            return Err(ValidationError::WeightOutOfRange(self.weight));
        }
        Ok(())
    }

    /// Whether a score lies within this assessment's allowed range.
    pub fn is_valid_score(&self, score: f64) -> bool {
        (0.0..=self.max_score).contains(&score)
    }
}
