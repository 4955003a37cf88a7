//! Demo entry point: seeds a sample roster and renders academic reports.
//!
//! # Responsibility
//! - Exercise the full `escolar_core` surface against a throwaway database.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Environment: `ESCOLAR_DB` (database file), `ESCOLAR_LOG_DIR` and
//! `ESCOLAR_LOG_LEVEL` (forwarded to logging init). An existing demo
//! database is removed on start so every run begins from a fresh schema.

use std::env;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use escolar_core::{
    default_log_level, init_logging, open_db, Assessment, AssessmentRepository, AssessmentType,
    Attendance, AttendanceRepository, Bimester, Classroom, ClassroomRepository, EducationLevel,
    Guardian, GuardianRepository, RegistrarService, Shift, SqliteAssessmentRepository,
    SqliteAttendanceRepository, SqliteClassroomRepository, SqliteGradeRepository,
    SqliteGuardianRepository, SqliteStudentRepository, SqliteTeacherRepository, Student,
    StudentRecordService, StudentRepository, Teacher, TeacherRepository,
};

const DEFAULT_DB_FILE: &str = "escolar_demo.db";
const SUBJECT: &str = "Matemática";
const ACADEMIC_YEAR: i32 = 2026;

fn main() -> Result<(), Box<dyn Error>> {
    let log_dir = resolve_log_dir()?;
    let log_level =
        env::var("ESCOLAR_LOG_LEVEL").unwrap_or_else(|_| default_log_level().to_string());
    init_logging(&log_level, &log_dir)?;

    println!("escolar_core version={}", escolar_core::core_version());

    let db_path =
        PathBuf::from(env::var("ESCOLAR_DB").unwrap_or_else(|_| DEFAULT_DB_FILE.to_string()));
    if db_path.exists() {
        // Every run starts from a fresh schema.
        fs::remove_file(&db_path)?;
    }
    let conn = open_db(&db_path)?;
    println!("database ready: {}", db_path.display());

    let records = StudentRecordService::new(
        SqliteStudentRepository::try_new(&conn)?,
        SqliteAssessmentRepository::try_new(&conn)?,
        SqliteGradeRepository::try_new(&conn)?,
        SqliteAttendanceRepository::try_new(&conn)?,
    );
    let registrar = RegistrarService::new(
        SqliteStudentRepository::try_new(&conn)?,
        SqliteClassroomRepository::try_new(&conn)?,
        SqliteGuardianRepository::try_new(&conn)?,
    );
    let students = SqliteStudentRepository::try_new(&conn)?;
    let teachers = SqliteTeacherRepository::try_new(&conn)?;
    let guardians = SqliteGuardianRepository::try_new(&conn)?;
    let classrooms = SqliteClassroomRepository::try_new(&conn)?;
    let assessments = SqliteAssessmentRepository::try_new(&conn)?;
    let attendance = SqliteAttendanceRepository::try_new(&conn)?;

    section("Roster");

    let mut teacher = Teacher::new("Carlos Mendes", "carlos.mendes@escola.com", "PROF001")?;
    teacher.add_subject(SUBJECT)?;
    teacher.add_subject("Física")?;
    let teacher_id = teachers.save(&mut teacher)?;
    println!(
        "teacher {} registered for: {}",
        teacher.name,
        teacher.subjects.join(", ")
    );

    teacher.add_subject("Geometria")?;
    teachers.save(&mut teacher)?;
    println!("added Geometria, teaches it: {}", teacher.teaches_subject("Geometria"));
    teacher.remove_subject("Geometria")?;
    teachers.save(&mut teacher)?;
    println!("removed Geometria, subjects back to: {}", teacher.subjects.join(", "));

    let mut roberto = Guardian::new(
        "Roberto Silva",
        "roberto.silva@email.com",
        Some("52998224725"),
        Some("(85) 99999-0001"),
    )?;
    let roberto_id = guardians.save(&mut roberto)?;
    let mut ana = Guardian::new(
        "Ana Santos",
        "ana.santos@email.com",
        Some("11144477735"),
        Some("(85) 99999-0002"),
    )?;
    let ana_id = guardians.save(&mut ana)?;
    println!("guardians on file: {}, {}", roberto.name, ana.name);

    let mut joao = Student::new("João Silva", "joao.silva@escola.com", "2026001")?;
    let joao_id = students.save(&mut joao)?;
    let mut maria = Student::new("Maria Santos", "maria.santos@escola.com", "2026002")?;
    let maria_id = students.save(&mut maria)?;
    let mut pedro = Student::new("Pedro Costa", "pedro.costa@escola.com", "2026003")?;
    let pedro_id = students.save(&mut pedro)?;
    println!("students enrolled in school: João, Maria, Pedro");

    let mut classroom = Classroom::new(
        "6º Ano",
        "A",
        Shift::Manha,
        EducationLevel::FundamentalII,
    )?;
    classroom.teacher_id = Some(teacher_id);
    let classroom_id = classrooms.save(&mut classroom)?;

    for student_id in [joao_id, maria_id, pedro_id] {
        registrar.enroll_student(student_id, classroom_id, Some(ACADEMIC_YEAR))?;
    }
    let classroom = registrar.enroll_student(joao_id, classroom_id, Some(ACADEMIC_YEAR))?;
    println!(
        "classroom {} has {} students (re-enrollment was a no-op)",
        classroom.full_name(),
        classroom.students.len()
    );

    registrar.link_guardian(roberto_id, joao_id, Some("Pai"))?;
    registrar.link_guardian(ana_id, maria_id, Some("Mãe"))?;
    registrar.link_guardian(ana_id, pedro_id, Some("Mãe"))?;
    println!("guardian links created: Roberto→João (Pai), Ana→Maria, Ana→Pedro (Mãe)");

    section("Assessments and grades");

    let mut prova = Assessment::new(
        "Prova de Matemática - 1º Bim",
        "Equações do 1º grau",
        SUBJECT,
        AssessmentType::Prova,
        10.0,
        3.0,
        Bimester::Primeiro,
        Some(date(2026, 3, 15)),
        Some(ACADEMIC_YEAR),
    )?;
    let prova_id = assessments.save(&mut prova)?;
    let mut trabalho = Assessment::new(
        "Trabalho de Matemática - 1º Bim",
        "Pesquisa sobre Pitágoras",
        SUBJECT,
        AssessmentType::Trabalho,
        10.0,
        1.0,
        Bimester::Primeiro,
        Some(date(2026, 3, 20)),
        Some(ACADEMIC_YEAR),
    )?;
    let trabalho_id = assessments.save(&mut trabalho)?;
    println!("{} (weight {})", prova.title, prova.weight);
    println!("{} (weight {})", trabalho.title, trabalho.weight);

    records.record_grade(joao_id, prova_id, 8.5, "Prof. Carlos")?;
    records.record_grade(joao_id, trabalho_id, 9.0, "Prof. Carlos")?;
    records.record_grade(maria_id, prova_id, 7.5, "Prof. Carlos")?;
    println!("grades recorded: João 8.5/9.0, Maria 7.5");

    match records.record_grade(joao_id, prova_id, 9.5, "Prof. Carlos") {
        Err(err) => println!("double entry rejected: {err}"),
        Ok(_) => println!("double entry unexpectedly accepted"),
    }
    match records.record_grade(pedro_id, prova_id, 11.0, "Prof. Carlos") {
        Err(err) => println!("out-of-scale score rejected: {err}"),
        Ok(_) => println!("out-of-scale score unexpectedly accepted"),
    }

    match records.bimester_average(joao_id, SUBJECT, Bimester::Primeiro, ACADEMIC_YEAR)? {
        Some(average) => println!("João's weighted 1st bimester average: {average:.2}"),
        None => println!("João has no grades yet"),
    }

    section("Attendance");

    // Two school weeks, 2026-03-02 through 2026-03-13.
    let school_days: Vec<NaiveDate> = (2u32..=6)
        .chain(9..=13)
        .map(|day| date(2026, 3, day))
        .collect();
    for &day in &school_days {
        let mut record = if day == date(2026, 3, 6) {
            Attendance::absence(joao_id, SUBJECT, day)?
        } else {
            Attendance::present(joao_id, SUBJECT, day)?
        };
        let id = attendance.save(&mut record)?;

        if !record.is_present {
            record.justify("Atestado médico")?;
            attendance.save(&mut record)?;
            println!("João's absence on {day} justified (record {id})");
        }
    }
    for &day in &school_days {
        let mut record = if day == date(2026, 3, 5) || day == date(2026, 3, 6) {
            Attendance::absence(maria_id, SUBJECT, day)?
        } else {
            Attendance::present(maria_id, SUBJECT, day)?
        };
        attendance.save(&mut record)?;
    }

    let extract =
        records.attendance_extract(joao_id, SUBJECT, date(2026, 3, 2), date(2026, 3, 13))?;
    println!("{extract}");

    section("Report card");

    let card = records.report_card(joao_id, SUBJECT, ACADEMIC_YEAR)?;
    println!("{card}");

    section("Guardian links");

    println!(
        "students of {}: {:?}",
        ana.name,
        registrar.students_of_guardian(ana_id)?
    );
    println!(
        "guardians of {}: {:?}",
        joao.name,
        registrar.guardians_of_student(joao_id)?
    );
    let removed = registrar.unlink_guardian(ana_id, pedro_id)?;
    println!(
        "unlinked Ana from Pedro (removed={removed}), remaining: {:?}",
        registrar.students_of_guardian(ana_id)?
    );

    section("Activity flag");

    pedro.deactivate();
    students.save(&mut pedro)?;
    println!("Pedro deactivated, active students: {}", students.list_all()?.len());
    pedro.activate();
    students.save(&mut pedro)?;
    println!("Pedro reactivated, active students: {}", students.list_all()?.len());

    section("Row counts");

    for table in [
        "students",
        "teachers",
        "teacher_subjects",
        "parents",
        "student_parent",
        "classrooms",
        "classroom_enrollments",
        "assessments",
        "grades",
        "attendance",
    ] {
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
                row.get(0)
            })?;
        println!("  {table}: {count}");
    }

    Ok(())
}

fn section(title: &str) {
    println!("\n=== {title} ===");
}

/// Resolves `ESCOLAR_LOG_DIR` (default `logs`) to an absolute path.
///
/// Logging init only accepts absolute directories, so relative values are
/// anchored at the current working directory.
fn resolve_log_dir() -> Result<String, Box<dyn Error>> {
    let configured = env::var("ESCOLAR_LOG_DIR").unwrap_or_else(|_| "logs".to_string());
    let path = PathBuf::from(&configured);
    let absolute = if path.is_absolute() {
        path
    } else {
        env::current_dir()?.join(path)
    };
    Ok(absolute.display().to_string())
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("fixed demo date")
}
