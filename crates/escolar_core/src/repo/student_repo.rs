//! Student repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over the `students` table.
//! - Hydrate linked guardian ids from `student_parent` on every read.
//!
//! # Invariants
//! - Write paths call `Student::validate()` before SQL mutations.
//! - `registration` uniqueness is enforced by the schema and surfaces as a
//!   `Db` error on conflict.
//! - Guardian links are read-only here; `GuardianRepository` owns them.

use rusqlite::{params, Connection, Row};

use crate::model::student::{Student, StudentId};
use crate::repo::{bool_to_int, ensure_connection_ready, int_to_bool, RepoResult};

const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    registration,
    active
FROM students";

/// Repository interface for student CRUD operations.
pub trait StudentRepository {
    /// Inserts (id unset) or updates (id set) one student row, returning
    /// its id. On insert the id is written back into the entity.
    fn save(&self, student: &mut Student) -> RepoResult<StudentId>;
    fn find_by_id(&self, id: StudentId) -> RepoResult<Option<Student>>;
    fn find_by_registration(&self, registration: &str) -> RepoResult<Option<Student>>;
    /// Active students only, ordered by name.
    fn list_all(&self) -> RepoResult<Vec<Student>>;
    /// Deletes one student. Grade, attendance, enrollment and guardian-link
    /// rows cascade. Returns whether a row was removed.
    fn delete(&self, id: StudentId) -> RepoResult<bool>;
}

/// SQLite-backed student repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["students", "student_parent"])?;
        Ok(Self { conn })
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn save(&self, student: &mut Student) -> RepoResult<StudentId> {
        student.validate()?;

        match student.id {
            Some(id) => {
                self.conn.execute(
                    "UPDATE students
                     SET
                        name = ?1,
                        email = ?2,
                        registration = ?3,
                        active = ?4
                     WHERE id = ?5;",
                    params![
                        student.name.as_str(),
                        student.email.as_str(),
                        student.registration.as_str(),
                        bool_to_int(student.active),
                        id,
                    ],
                )?;
                Ok(id)
            }
            None => {
                self.conn.execute(
                    "INSERT INTO students (name, email, registration, active)
                     VALUES (?1, ?2, ?3, ?4);",
                    params![
                        student.name.as_str(),
                        student.email.as_str(),
                        student.registration.as_str(),
                        bool_to_int(student.active),
                    ],
                )?;
                let id = self.conn.last_insert_rowid();
                student.id = Some(id);
                Ok(id)
            }
        }
    }

    fn find_by_id(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(read_student(self.conn, row)?));
        }
        Ok(None)
    }

    fn find_by_registration(&self, registration: &str) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE registration = ?1;"))?;
        let mut rows = stmt.query([registration])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(read_student(self.conn, row)?));
        }
        Ok(None)
    }

    fn list_all(&self) -> RepoResult<Vec<Student>> {
        let mut stmt = self.conn.prepare(&format!(
            "{STUDENT_SELECT_SQL}
             WHERE active = 1
             ORDER BY name ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(read_student(self.conn, row)?);
        }
        Ok(students)
    }

    fn delete(&self, id: StudentId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

fn read_student(conn: &Connection, row: &Row<'_>) -> RepoResult<Student> {
    let id: StudentId = row.get("id")?;
    let active = int_to_bool(row.get("active")?, "students.active")?;
    let student = Student {
        id: Some(id),
        name: row.get("name")?,
        email: row.get("email")?,
        registration: row.get("registration")?,
        active,
        guardians: load_guardian_ids(conn, id)?,
    };
    student.validate()?;
    Ok(student)
}

fn load_guardian_ids(conn: &Connection, student_id: StudentId) -> RepoResult<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT parent_id
         FROM student_parent
         WHERE student_id = ?1
         ORDER BY rowid ASC;",
    )?;
    let mut rows = stmt.query([student_id])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        ids.push(row.get(0)?);
    }
    Ok(ids)
}
