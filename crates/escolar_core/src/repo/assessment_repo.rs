//! Assessment repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist assessment definitions (what gets graded, when, how heavy).
//!
//! # Invariants
//! - `kind` and `bimester` round-trip as canonical tokens; unknown stored
//!   tokens fail loudly as `InvalidData`.
//! - `assessment_date` is an optional ISO-8601 date.

use rusqlite::{params, Connection, Row};

use crate::model::assessment::{Assessment, AssessmentId};
use crate::model::enums::{AssessmentType, Bimester};
use crate::repo::{ensure_connection_ready, parse_date, RepoError, RepoResult};

const ASSESSMENT_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    subject,
    kind,
    max_score,
    weight,
    bimester,
    assessment_date,
    academic_year
FROM assessments";

/// Repository interface for assessment CRUD operations.
pub trait AssessmentRepository {
    fn save(&self, assessment: &mut Assessment) -> RepoResult<AssessmentId>;
    fn find_by_id(&self, id: AssessmentId) -> RepoResult<Option<Assessment>>;
    /// All assessments, most recent assessment_date first.
    fn list_all(&self) -> RepoResult<Vec<Assessment>>;
    fn delete(&self, id: AssessmentId) -> RepoResult<bool>;
}

/// SQLite-backed assessment repository.
pub struct SqliteAssessmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAssessmentRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["assessments"])?;
        Ok(Self { conn })
    }
}

impl AssessmentRepository for SqliteAssessmentRepository<'_> {
    fn save(&self, assessment: &mut Assessment) -> RepoResult<AssessmentId> {
        assessment.validate()?;
        let date_text = assessment.assessment_date.map(|date| date.to_string());

        match assessment.id {
            Some(id) => {
                self.conn.execute(
                    "UPDATE assessments
                     SET
                        title = ?1,
                        description = ?2,
                        subject = ?3,
                        kind = ?4,
                        max_score = ?5,
                        weight = ?6,
                        bimester = ?7,
                        assessment_date = ?8,
                        academic_year = ?9
                     WHERE id = ?10;",
                    params![
                        assessment.title.as_str(),
                        assessment.description.as_str(),
                        assessment.subject.as_str(),
                        assessment.kind.as_str(),
                        assessment.max_score,
                        assessment.weight,
                        assessment.bimester.as_str(),
                        date_text.as_deref(),
                        assessment.academic_year,
                        id,
                    ],
                )?;
                Ok(id)
            }
            None => {
                self.conn.execute(
                    "INSERT INTO assessments (
                        title,
                        description,
                        subject,
                        kind,
                        max_score,
                        weight,
                        bimester,
                        assessment_date,
                        academic_year
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
                    params![
                        assessment.title.as_str(),
                        assessment.description.as_str(),
                        assessment.subject.as_str(),
                        assessment.kind.as_str(),
                        assessment.max_score,
                        assessment.weight,
                        assessment.bimester.as_str(),
                        date_text.as_deref(),
                        assessment.academic_year,
                    ],
                )?;
                let id = self.conn.last_insert_rowid();
                assessment.id = Some(id);
                Ok(id)
            }
        }
    }

    fn find_by_id(&self, id: AssessmentId) -> RepoResult<Option<Assessment>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ASSESSMENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_assessment_row(row)?));
        }
        Ok(None)
    }

    fn list_all(&self) -> RepoResult<Vec<Assessment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ASSESSMENT_SELECT_SQL} ORDER BY assessment_date DESC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut assessments = Vec::new();
        while let Some(row) = rows.next()? {
            assessments.push(parse_assessment_row(row)?);
        }
        Ok(assessments)
    }

    fn delete(&self, id: AssessmentId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM assessments WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

pub(crate) fn parse_assessment_row(row: &Row<'_>) -> RepoResult<Assessment> {
    let kind_text: String = row.get("kind")?;
    let kind = AssessmentType::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid assessment type `{kind_text}` in assessments.kind"
        ))
    })?;
    let bimester_text: String = row.get("bimester")?;
    let bimester = Bimester::parse(&bimester_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid bimester `{bimester_text}` in assessments.bimester"
        ))
    })?;
    let assessment_date = match row.get::<_, Option<String>>("assessment_date")? {
        Some(text) => Some(parse_date(&text, "assessments.assessment_date")?),
        None => None,
    };

    let assessment = Assessment {
        id: Some(row.get("id")?),
        title: row.get("title")?,
        description: row.get("description")?,
        subject: row.get("subject")?,
        kind,
        max_score: row.get("max_score")?,
        weight: row.get("weight")?,
        bimester,
        assessment_date,
        academic_year: row.get("academic_year")?,
    };
    assessment.validate()?;
    Ok(assessment)
}
