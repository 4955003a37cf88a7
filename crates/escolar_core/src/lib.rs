//! Core domain logic for the escolar school record store.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validate;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::assessment::{Assessment, AssessmentId};
pub use model::attendance::{Attendance, AttendanceId};
pub use model::classroom::{Classroom, ClassroomId};
pub use model::enums::{AssessmentType, Bimester, EducationLevel, Shift};
pub use model::grade::{Grade, GradeId};
pub use model::guardian::{Guardian, GuardianId};
pub use model::student::{Student, StudentId};
pub use model::teacher::{Teacher, TeacherId};
pub use model::ValidationError;
pub use repo::assessment_repo::{AssessmentRepository, SqliteAssessmentRepository};
pub use repo::attendance_repo::{AttendanceRepository, SqliteAttendanceRepository};
pub use repo::classroom_repo::{ClassroomRepository, SqliteClassroomRepository};
pub use repo::grade_repo::{GradeRepository, GradeWithAssessment, SqliteGradeRepository};
pub use repo::guardian_repo::{GuardianRepository, SqliteGuardianRepository};
pub use repo::student_repo::{SqliteStudentRepository, StudentRepository};
pub use repo::teacher_repo::{SqliteTeacherRepository, TeacherRepository};
pub use repo::{RepoError, RepoResult};
pub use service::registrar::{
    RegistrarError, RegistrarService, DEFAULT_RELATIONSHIP, VALID_RELATIONSHIPS,
};
pub use service::student_record::{
    AttendanceExtract, RecordStatus, ReportCard, StudentRecordError, StudentRecordService,
    PASSING_AVERAGE,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
