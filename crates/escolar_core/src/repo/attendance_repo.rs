//! Attendance repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist daily attendance keyed on UNIQUE(student_id, subject, date).
//! - Answer the inclusive period query behind attendance extracts.
//!
//! # Invariants
//! - `save` without an id is an atomic upsert: re-recording a day
//!   replaces presence/justification fields, never duplicates the row.
//! - `recorded_at` is written on first insert and left untouched by
//!   upsert updates.

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

use crate::model::attendance::{Attendance, AttendanceId};
use crate::model::student::StudentId;
use crate::repo::{
    bool_to_int, ensure_connection_ready, int_to_bool, parse_date, parse_timestamp, RepoResult,
};

const ATTENDANCE_SELECT_SQL: &str = "SELECT
    id,
    student_id,
    subject,
    attendance_date,
    is_present,
    justified,
    justification,
    recorded_at
FROM attendance";

/// Repository interface for attendance persistence and queries.
pub trait AttendanceRepository {
    /// Persists one attendance entry. Without an id this is an upsert on
    /// the (student, subject, date) key: an existing row gets its
    /// presence/justification fields replaced and its id is returned.
    fn save(&self, attendance: &mut Attendance) -> RepoResult<AttendanceId>;
    fn find_by_id(&self, id: AttendanceId) -> RepoResult<Option<Attendance>>;
    /// Entries for one student and subject between `start` and `end`
    /// inclusive, ascending by date.
    fn find_by_student_and_period(
        &self,
        student_id: StudentId,
        subject: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<Attendance>>;
    /// All entries, most recent date first.
    fn list_all(&self) -> RepoResult<Vec<Attendance>>;
}

/// SQLite-backed attendance repository.
pub struct SqliteAttendanceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttendanceRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["attendance"])?;
        Ok(Self { conn })
    }
}

impl AttendanceRepository for SqliteAttendanceRepository<'_> {
    fn save(&self, attendance: &mut Attendance) -> RepoResult<AttendanceId> {
        attendance.validate()?;
        let date_text = attendance.date.to_string();

        match attendance.id {
            Some(id) => {
                self.conn.execute(
                    "UPDATE attendance
                     SET
                        is_present = ?1,
                        justified = ?2,
                        justification = ?3
                     WHERE id = ?4;",
                    params![
                        bool_to_int(attendance.is_present),
                        bool_to_int(attendance.justified),
                        attendance.justification.as_deref(),
                        id,
                    ],
                )?;
                Ok(id)
            }
            None => {
                self.conn.execute(
                    "INSERT INTO attendance (
                        student_id,
                        subject,
                        attendance_date,
                        is_present,
                        justified,
                        justification,
                        recorded_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    ON CONFLICT (student_id, subject, attendance_date)
                    DO UPDATE SET
                        is_present = excluded.is_present,
                        justified = excluded.justified,
                        justification = excluded.justification;",
                    params![
                        attendance.student_id,
                        attendance.subject.as_str(),
                        date_text.as_str(),
                        bool_to_int(attendance.is_present),
                        bool_to_int(attendance.justified),
                        attendance.justification.as_deref(),
                        attendance.recorded_at.to_rfc3339(),
                    ],
                )?;
                // last_insert_rowid is stale on the conflict path; the
                // effective id comes from the natural key.
                let id: AttendanceId = self.conn.query_row(
                    "SELECT id FROM attendance
                     WHERE student_id = ?1 AND subject = ?2 AND attendance_date = ?3;",
                    params![attendance.student_id, attendance.subject.as_str(), date_text],
                    |row| row.get(0),
                )?;
                attendance.id = Some(id);
                Ok(id)
            }
        }
    }

    fn find_by_id(&self, id: AttendanceId) -> RepoResult<Option<Attendance>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ATTENDANCE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_attendance_row(row)?));
        }
        Ok(None)
    }

    fn find_by_student_and_period(
        &self,
        student_id: StudentId,
        subject: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<Attendance>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ATTENDANCE_SELECT_SQL}
             WHERE student_id = ?1
               AND subject = ?2
               AND attendance_date >= ?3
               AND attendance_date <= ?4
             ORDER BY attendance_date ASC, id ASC;"
        ))?;
        let mut rows = stmt.query(params![
            student_id,
            subject,
            start.to_string(),
            end.to_string()
        ])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_attendance_row(row)?);
        }
        Ok(entries)
    }

    fn list_all(&self) -> RepoResult<Vec<Attendance>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ATTENDANCE_SELECT_SQL} ORDER BY attendance_date DESC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_attendance_row(row)?);
        }
        Ok(entries)
    }
}

fn parse_attendance_row(row: &Row<'_>) -> RepoResult<Attendance> {
    let date_text: String = row.get("attendance_date")?;
    let recorded_at_text: String = row.get("recorded_at")?;
    let attendance = Attendance {
        id: Some(row.get("id")?),
        student_id: row.get("student_id")?,
        subject: row.get("subject")?,
        date: parse_date(&date_text, "attendance.attendance_date")?,
        is_present: int_to_bool(row.get("is_present")?, "attendance.is_present")?,
        justified: int_to_bool(row.get("justified")?, "attendance.justified")?,
        justification: row.get("justification")?,
        recorded_at: parse_timestamp(&recorded_at_text, "attendance.recorded_at")?,
    };
    attendance.validate()?;
    Ok(attendance)
}
