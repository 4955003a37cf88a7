//! Teacher repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist teacher rows together with their lectured subjects.
//! - Answer subject-based teacher lookups.
//!
//! # Invariants
//! - `save` replaces the whole subject set and the row in one transaction.
//! - Subject insertion order is preserved via `teacher_subjects.position`.

use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

use crate::model::teacher::{Teacher, TeacherId};
use crate::repo::{ensure_connection_ready, RepoResult};

const TEACHER_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    registration
FROM teachers";

/// Repository interface for teacher CRUD and subject lookups.
pub trait TeacherRepository {
    /// Inserts or updates one teacher and replaces its subject set
    /// atomically, returning the row id.
    fn save(&self, teacher: &mut Teacher) -> RepoResult<TeacherId>;
    fn find_by_id(&self, id: TeacherId) -> RepoResult<Option<Teacher>>;
    /// All teachers ordered by name.
    fn list_all(&self) -> RepoResult<Vec<Teacher>>;
    /// Teachers lecturing the given subject (exact match), ordered by name.
    fn find_by_subject(&self, subject: &str) -> RepoResult<Vec<Teacher>>;
    fn delete(&self, id: TeacherId) -> RepoResult<bool>;
}

/// SQLite-backed teacher repository.
pub struct SqliteTeacherRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTeacherRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["teachers", "teacher_subjects"])?;
        Ok(Self { conn })
    }
}

impl TeacherRepository for SqliteTeacherRepository<'_> {
    fn save(&self, teacher: &mut Teacher) -> RepoResult<TeacherId> {
        teacher.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let id = match teacher.id {
            Some(id) => {
                tx.execute(
                    "UPDATE teachers
                     SET
                        name = ?1,
                        email = ?2,
                        registration = ?3
                     WHERE id = ?4;",
                    params![
                        teacher.name.as_str(),
                        teacher.email.as_str(),
                        teacher.registration.as_str(),
                        id,
                    ],
                )?;
                id
            }
            None => {
                tx.execute(
                    "INSERT INTO teachers (name, email, registration)
                     VALUES (?1, ?2, ?3);",
                    params![
                        teacher.name.as_str(),
                        teacher.email.as_str(),
                        teacher.registration.as_str(),
                    ],
                )?;
                tx.last_insert_rowid()
            }
        };

        tx.execute("DELETE FROM teacher_subjects WHERE teacher_id = ?1;", [id])?;
        for (position, subject) in teacher.subjects.iter().enumerate() {
            tx.execute(
                "INSERT INTO teacher_subjects (teacher_id, subject, position)
                 VALUES (?1, ?2, ?3);",
                params![id, subject.as_str(), position as i64],
            )?;
        }

        tx.commit()?;
        teacher.id = Some(id);
        Ok(id)
    }

    fn find_by_id(&self, id: TeacherId) -> RepoResult<Option<Teacher>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TEACHER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(read_teacher(self.conn, row)?));
        }
        Ok(None)
    }

    fn list_all(&self) -> RepoResult<Vec<Teacher>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TEACHER_SELECT_SQL} ORDER BY name ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut teachers = Vec::new();
        while let Some(row) = rows.next()? {
            teachers.push(read_teacher(self.conn, row)?);
        }
        Ok(teachers)
    }

    fn find_by_subject(&self, subject: &str) -> RepoResult<Vec<Teacher>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TEACHER_SELECT_SQL}
             WHERE id IN (
                SELECT teacher_id FROM teacher_subjects WHERE subject = ?1
             )
             ORDER BY name ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([subject])?;
        let mut teachers = Vec::new();
        while let Some(row) = rows.next()? {
            teachers.push(read_teacher(self.conn, row)?);
        }
        Ok(teachers)
    }

    fn delete(&self, id: TeacherId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM teachers WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

fn read_teacher(conn: &Connection, row: &Row<'_>) -> RepoResult<Teacher> {
    let id: TeacherId = row.get("id")?;
    let teacher = Teacher {
        id: Some(id),
        name: row.get("name")?,
        email: row.get("email")?,
        registration: row.get("registration")?,
        subjects: load_subjects(conn, id)?,
    };
    teacher.validate()?;
    Ok(teacher)
}

fn load_subjects(conn: &Connection, teacher_id: TeacherId) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT subject
         FROM teacher_subjects
         WHERE teacher_id = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([teacher_id])?;
    let mut subjects = Vec::new();
    while let Some(row) = rows.next()? {
        subjects.push(row.get(0)?);
    }
    Ok(subjects)
}
