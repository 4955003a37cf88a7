//! Grade repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist grade entries keyed on UNIQUE(student_id, assessment_id).
//! - Answer the bimester query with assessments fully populated, as the
//!   averaging algorithm needs weights.
//!
//! # Invariants
//! - `save` without an id is an atomic upsert: a racing duplicate entry
//!   resolves to a score update, never a duplicate row or an error.
//! - `graded_at`/`graded_by` are written on first insert and left
//!   untouched by upsert updates.

use rusqlite::{params, Connection, Row};
use serde::Serialize;

use crate::model::assessment::{Assessment, AssessmentId};
use crate::model::grade::{Grade, GradeId};
use crate::model::student::StudentId;
use crate::repo::assessment_repo::parse_assessment_row;
use crate::repo::{ensure_connection_ready, parse_timestamp, RepoError, RepoResult};

const GRADE_SELECT_SQL: &str = "SELECT
    id,
    student_id,
    assessment_id,
    score,
    graded_at,
    graded_by
FROM grades";

/// Grade paired with its fully populated assessment. Read model for the
/// averaging and report-card queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeWithAssessment {
    pub grade: Grade,
    pub assessment: Assessment,
}

/// Repository interface for grade persistence and queries.
pub trait GradeRepository {
    /// Persists one grade. Without an id this is an upsert on the
    /// (student, assessment) pair: an existing row gets its score
    /// replaced and its id is returned. With an id, the score is updated
    /// in place.
    fn save(&self, grade: &mut Grade) -> RepoResult<GradeId>;
    fn find_by_id(&self, id: GradeId) -> RepoResult<Option<Grade>>;
    fn find_by_student_and_assessment(
        &self,
        student_id: StudentId,
        assessment_id: AssessmentId,
    ) -> RepoResult<Option<Grade>>;
    /// Grades of one student for a subject/bimester/year, assessment
    /// populated, ordered by assessment date.
    fn find_by_student_and_bimester(
        &self,
        student_id: StudentId,
        subject: &str,
        bimester: &str,
        academic_year: i32,
    ) -> RepoResult<Vec<GradeWithAssessment>>;
    /// All grades, most recently graded first.
    fn list_all(&self) -> RepoResult<Vec<Grade>>;
}

/// SQLite-backed grade repository.
pub struct SqliteGradeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGradeRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["grades", "assessments"])?;
        Ok(Self { conn })
    }
}

impl GradeRepository for SqliteGradeRepository<'_> {
    fn save(&self, grade: &mut Grade) -> RepoResult<GradeId> {
        grade.validate()?;

        match grade.id {
            Some(id) => {
                self.conn.execute(
                    "UPDATE grades SET score = ?1 WHERE id = ?2;",
                    params![grade.score, id],
                )?;
                Ok(id)
            }
            None => {
                self.conn.execute(
                    "INSERT INTO grades (student_id, assessment_id, score, graded_at, graded_by)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT (student_id, assessment_id)
                     DO UPDATE SET score = excluded.score;",
                    params![
                        grade.student_id,
                        grade.assessment_id,
                        grade.score,
                        grade.graded_at.to_rfc3339(),
                        grade.graded_by.as_str(),
                    ],
                )?;
                // last_insert_rowid is stale on the conflict path; the
                // effective id comes from the natural key.
                let id: GradeId = self.conn.query_row(
                    "SELECT id FROM grades WHERE student_id = ?1 AND assessment_id = ?2;",
                    params![grade.student_id, grade.assessment_id],
                    |row| row.get(0),
                )?;
                grade.id = Some(id);
                Ok(id)
            }
        }
    }

    fn find_by_id(&self, id: GradeId) -> RepoResult<Option<Grade>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GRADE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_grade_row(row)?));
        }
        Ok(None)
    }

    fn find_by_student_and_assessment(
        &self,
        student_id: StudentId,
        assessment_id: AssessmentId,
    ) -> RepoResult<Option<Grade>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GRADE_SELECT_SQL} WHERE student_id = ?1 AND assessment_id = ?2;"
        ))?;
        let mut rows = stmt.query(params![student_id, assessment_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_grade_row(row)?));
        }
        Ok(None)
    }

    fn find_by_student_and_bimester(
        &self,
        student_id: StudentId,
        subject: &str,
        bimester: &str,
        academic_year: i32,
    ) -> RepoResult<Vec<GradeWithAssessment>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                g.id,
                g.student_id,
                g.assessment_id,
                g.score,
                g.graded_at,
                g.graded_by
             FROM grades g
             INNER JOIN assessments a ON a.id = g.assessment_id
             WHERE g.student_id = ?1
               AND a.subject = ?2
               AND a.bimester = ?3
               AND a.academic_year = ?4
             ORDER BY a.assessment_date ASC, g.id ASC;",
        )?;
        let mut rows = stmt.query(params![student_id, subject, bimester, academic_year])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            let grade = parse_grade_row(row)?;
            let assessment = load_assessment(self.conn, grade.assessment_id)?;
            entries.push(GradeWithAssessment { grade, assessment });
        }
        Ok(entries)
    }

    fn list_all(&self) -> RepoResult<Vec<Grade>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GRADE_SELECT_SQL} ORDER BY graded_at DESC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut grades = Vec::new();
        while let Some(row) = rows.next()? {
            grades.push(parse_grade_row(row)?);
        }
        Ok(grades)
    }
}

fn parse_grade_row(row: &Row<'_>) -> RepoResult<Grade> {
    let graded_at_text: String = row.get("graded_at")?;
    let grade = Grade {
        id: Some(row.get("id")?),
        student_id: row.get("student_id")?,
        assessment_id: row.get("assessment_id")?,
        score: row.get("score")?,
        graded_at: parse_timestamp(&graded_at_text, "grades.graded_at")?,
        graded_by: row.get("graded_by")?,
    };
    grade.validate()?;
    Ok(grade)
}

fn load_assessment(conn: &Connection, id: AssessmentId) -> RepoResult<Assessment> {
    let mut stmt = conn.prepare(
        "SELECT
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
         FROM assessments
         WHERE id = ?1;",
    )?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return parse_assessment_row(row);
    }
    Err(RepoError::InvalidData(format!(
        "grade references missing assessment id {id}"
    )))
}
