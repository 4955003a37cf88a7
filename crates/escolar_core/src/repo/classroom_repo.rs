//! Classroom repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist classroom rows and the `classroom_enrollments` link table.
//! - Round-trip `Shift`/`EducationLevel` tokens exactly.
//!
//! # Invariants
//! - Enrollment is idempotent: re-adding an enrolled student is a silent
//!   no-op.
//! - Unknown shift/level tokens in stored rows fail loudly as
//!   `InvalidData`, never default.

use rusqlite::{params, Connection, Row};

use crate::model::classroom::{Classroom, ClassroomId};
use crate::model::enums::{EducationLevel, Shift};
use crate::model::student::StudentId;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};

const CLASSROOM_SELECT_SQL: &str = "SELECT
    id,
    year,
    identifier,
    shift,
    level,
    teacher_id
FROM classrooms";

/// Repository interface for classroom CRUD and enrollment.
pub trait ClassroomRepository {
    fn save(&self, classroom: &mut Classroom) -> RepoResult<ClassroomId>;
    fn find_by_id(&self, id: ClassroomId) -> RepoResult<Option<Classroom>>;
    /// All classrooms ordered by year then identifier.
    fn list_all(&self) -> RepoResult<Vec<Classroom>>;
    fn delete(&self, id: ClassroomId) -> RepoResult<bool>;
    /// Records one enrollment for the given academic year. Silently
    /// no-ops when the pair already exists.
    fn add_student_to_classroom(
        &self,
        classroom_id: ClassroomId,
        student_id: StudentId,
        academic_year: i32,
    ) -> RepoResult<()>;
}

/// SQLite-backed classroom repository.
pub struct SqliteClassroomRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteClassroomRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["classrooms", "classroom_enrollments"])?;
        Ok(Self { conn })
    }
}

impl ClassroomRepository for SqliteClassroomRepository<'_> {
    fn save(&self, classroom: &mut Classroom) -> RepoResult<ClassroomId> {
        classroom.validate()?;

        match classroom.id {
            Some(id) => {
                self.conn.execute(
                    "UPDATE classrooms
                     SET
                        year = ?1,
                        identifier = ?2,
                        shift = ?3,
                        level = ?4,
                        teacher_id = ?5
                     WHERE id = ?6;",
                    params![
                        classroom.year.as_str(),
                        classroom.identifier.as_str(),
                        classroom.shift.as_str(),
                        classroom.level.as_str(),
                        classroom.teacher_id,
                        id,
                    ],
                )?;
                Ok(id)
            }
            None => {
                self.conn.execute(
                    "INSERT INTO classrooms (year, identifier, shift, level, teacher_id)
                     VALUES (?1, ?2, ?3, ?4, ?5);",
                    params![
                        classroom.year.as_str(),
                        classroom.identifier.as_str(),
                        classroom.shift.as_str(),
                        classroom.level.as_str(),
                        classroom.teacher_id,
                    ],
                )?;
                let id = self.conn.last_insert_rowid();
                classroom.id = Some(id);
                Ok(id)
            }
        }
    }

    fn find_by_id(&self, id: ClassroomId) -> RepoResult<Option<Classroom>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CLASSROOM_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(read_classroom(self.conn, row)?));
        }
        Ok(None)
    }

    fn list_all(&self) -> RepoResult<Vec<Classroom>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CLASSROOM_SELECT_SQL} ORDER BY year ASC, identifier ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut classrooms = Vec::new();
        while let Some(row) = rows.next()? {
            classrooms.push(read_classroom(self.conn, row)?);
        }
        Ok(classrooms)
    }

    fn delete(&self, id: ClassroomId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM classrooms WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn add_student_to_classroom(
        &self,
        classroom_id: ClassroomId,
        student_id: StudentId,
        academic_year: i32,
    ) -> RepoResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO classroom_enrollments (classroom_id, student_id, academic_year)
             VALUES (?1, ?2, ?3);",
            params![classroom_id, student_id, academic_year],
        )?;
        Ok(())
    }
}

fn read_classroom(conn: &Connection, row: &Row<'_>) -> RepoResult<Classroom> {
    let id: ClassroomId = row.get("id")?;
    let shift_text: String = row.get("shift")?;
    let shift = Shift::parse(&shift_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid shift `{shift_text}` in classrooms.shift"))
    })?;
    let level_text: String = row.get("level")?;
    let level = EducationLevel::parse(&level_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid education level `{level_text}` in classrooms.level"
        ))
    })?;

    let classroom = Classroom {
        id: Some(id),
        year: row.get("year")?,
        identifier: row.get("identifier")?,
        shift,
        level,
        teacher_id: row.get("teacher_id")?,
        students: load_enrolled_ids(conn, id)?,
    };
    classroom.validate()?;
    Ok(classroom)
}

fn load_enrolled_ids(conn: &Connection, classroom_id: ClassroomId) -> RepoResult<Vec<StudentId>> {
    let mut stmt = conn.prepare(
        "SELECT student_id
         FROM classroom_enrollments
         WHERE classroom_id = ?1
         ORDER BY rowid ASC;",
    )?;
    let mut rows = stmt.query([classroom_id])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        ids.push(row.get(0)?);
    }
    Ok(ids)
}
