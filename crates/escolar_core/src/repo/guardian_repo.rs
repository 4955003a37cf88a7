//! Guardian repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `parents` table.
//! - Own the `student_parent` link table: link/unlink and both-direction
//!   id lookups.
//!
//! # Invariants
//! - A guardian-student pair links at most once; a duplicate link attempt
//!   reports `false` instead of erroring.
//! - Link id lists come back in insertion order.
//! - Stored CPF values are normalized digit strings.

use rusqlite::{params, Connection, Row};

use crate::model::guardian::{Guardian, GuardianId};
use crate::model::student::StudentId;
use crate::repo::{ensure_connection_ready, RepoResult};
use crate::validate::normalize_cpf;

const GUARDIAN_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    cpf,
    phone
FROM parents";

/// Repository interface for guardian CRUD and student links.
pub trait GuardianRepository {
    fn save(&self, guardian: &mut Guardian) -> RepoResult<GuardianId>;
    fn find_by_id(&self, id: GuardianId) -> RepoResult<Option<Guardian>>;
    /// Looks a guardian up by CPF; the input is normalized to digits first.
    fn find_by_cpf(&self, cpf: &str) -> RepoResult<Option<Guardian>>;
    /// All guardians ordered by name.
    fn list_all(&self) -> RepoResult<Vec<Guardian>>;
    fn delete(&self, id: GuardianId) -> RepoResult<bool>;
    /// Links a guardian to a student under the given kinship label.
    /// Returns `false` when the pair is already linked.
    fn link_to_student(
        &self,
        guardian_id: GuardianId,
        student_id: StudentId,
        relationship: &str,
    ) -> RepoResult<bool>;
    /// Removes one link. Returns whether a row was actually removed.
    fn unlink_from_student(
        &self,
        guardian_id: GuardianId,
        student_id: StudentId,
    ) -> RepoResult<bool>;
    /// Ids of students linked to the guardian, insertion order.
    fn get_students(&self, guardian_id: GuardianId) -> RepoResult<Vec<StudentId>>;
    /// Ids of guardians linked to the student, insertion order.
    fn get_parents_by_student(&self, student_id: StudentId) -> RepoResult<Vec<GuardianId>>;
}

/// SQLite-backed guardian repository.
pub struct SqliteGuardianRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGuardianRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["parents", "student_parent"])?;
        Ok(Self { conn })
    }
}

impl GuardianRepository for SqliteGuardianRepository<'_> {
    fn save(&self, guardian: &mut Guardian) -> RepoResult<GuardianId> {
        guardian.validate()?;

        match guardian.id {
            Some(id) => {
                self.conn.execute(
                    "UPDATE parents
                     SET
                        name = ?1,
                        email = ?2,
                        cpf = ?3,
                        phone = ?4
                     WHERE id = ?5;",
                    params![
                        guardian.name.as_str(),
                        guardian.email.as_str(),
                        guardian.cpf.as_deref(),
                        guardian.phone.as_deref(),
                        id,
                    ],
                )?;
                Ok(id)
            }
            None => {
                self.conn.execute(
                    "INSERT INTO parents (name, email, cpf, phone)
                     VALUES (?1, ?2, ?3, ?4);",
                    params![
                        guardian.name.as_str(),
                        guardian.email.as_str(),
                        guardian.cpf.as_deref(),
                        guardian.phone.as_deref(),
                    ],
                )?;
                let id = self.conn.last_insert_rowid();
                guardian.id = Some(id);
                Ok(id)
            }
        }
    }

    fn find_by_id(&self, id: GuardianId) -> RepoResult<Option<Guardian>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GUARDIAN_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(read_guardian(self.conn, row)?));
        }
        Ok(None)
    }

    fn find_by_cpf(&self, cpf: &str) -> RepoResult<Option<Guardian>> {
        let normalized = normalize_cpf(cpf);
        let mut stmt = self
            .conn
            .prepare(&format!("{GUARDIAN_SELECT_SQL} WHERE cpf = ?1;"))?;
        let mut rows = stmt.query([normalized.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(read_guardian(self.conn, row)?));
        }
        Ok(None)
    }

    fn list_all(&self) -> RepoResult<Vec<Guardian>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GUARDIAN_SELECT_SQL} ORDER BY name ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut guardians = Vec::new();
        while let Some(row) = rows.next()? {
            guardians.push(read_guardian(self.conn, row)?);
        }
        Ok(guardians)
    }

    fn delete(&self, id: GuardianId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM parents WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn link_to_student(
        &self,
        guardian_id: GuardianId,
        student_id: StudentId,
        relationship: &str,
    ) -> RepoResult<bool> {
        // OR IGNORE swallows only the uniqueness conflict; missing foreign
        // rows still surface as Db errors.
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO student_parent (student_id, parent_id, relationship)
             VALUES (?1, ?2, ?3);",
            params![student_id, guardian_id, relationship],
        )?;
        Ok(changed > 0)
    }

    fn unlink_from_student(
        &self,
        guardian_id: GuardianId,
        student_id: StudentId,
    ) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM student_parent
             WHERE student_id = ?1 AND parent_id = ?2;",
            params![student_id, guardian_id],
        )?;
        Ok(changed > 0)
    }

    fn get_students(&self, guardian_id: GuardianId) -> RepoResult<Vec<StudentId>> {
        load_student_ids(self.conn, guardian_id)
    }

    fn get_parents_by_student(&self, student_id: StudentId) -> RepoResult<Vec<GuardianId>> {
        let mut stmt = self.conn.prepare(
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
}

fn read_guardian(conn: &Connection, row: &Row<'_>) -> RepoResult<Guardian> {
    let id: GuardianId = row.get("id")?;
    let guardian = Guardian {
        id: Some(id),
        name: row.get("name")?,
        email: row.get("email")?,
        cpf: row.get("cpf")?,
        phone: row.get("phone")?,
        students: load_student_ids(conn, id)?,
    };
    guardian.validate()?;
    Ok(guardian)
}

fn load_student_ids(conn: &Connection, guardian_id: GuardianId) -> RepoResult<Vec<StudentId>> {
    let mut stmt = conn.prepare(
        "SELECT student_id
         FROM student_parent
         WHERE parent_id = ?1
         ORDER BY rowid ASC;",
    )?;
    let mut rows = stmt.query([guardian_id])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        ids.push(row.get(0)?);
    }
    Ok(ids)
}
