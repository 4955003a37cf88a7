use chrono::NaiveDate;
use escolar_core::db::open_db_in_memory;
use escolar_core::{
    Assessment, AssessmentRepository, AssessmentType, Attendance, AttendanceRepository, Bimester,
    Classroom, ClassroomRepository, EducationLevel, GradeRepository, Guardian,
    GuardianRepository, RecordStatus, RegistrarError, RegistrarService, Shift,
    SqliteAssessmentRepository, SqliteAttendanceRepository, SqliteClassroomRepository,
    SqliteGradeRepository, SqliteGuardianRepository, SqliteStudentRepository, Student,
    StudentRecordError, StudentRecordService, StudentRepository, ValidationError,
};
use rusqlite::Connection;

#[test]
fn record_grade_persists_through_the_service() {
    let conn = open_db_in_memory().unwrap();
    let service = record_service(&conn);

    let student_id = seed_student(&conn, "Ana Souza", "2026001");
    let assessment = seed_assessment(&conn, "Matemática", Bimester::Primeiro, 2.0);

    let grade = service
        .record_grade(student_id, assessment.id.unwrap(), 8.5, "Carlos Lima")
        .unwrap();

    assert!(grade.id.is_some());
    assert_eq!(grade.score, 8.5);
    assert_eq!(grade.graded_by, "Carlos Lima");

    let grades = SqliteGradeRepository::try_new(&conn).unwrap();
    let stored = grades
        .find_by_student_and_assessment(student_id, assessment.id.unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(stored.score, 8.5);
}

#[test]
fn record_grade_rejects_unknown_and_inactive_students() {
    let conn = open_db_in_memory().unwrap();
    let service = record_service(&conn);

    let assessment = seed_assessment(&conn, "Matemática", Bimester::Primeiro, 2.0);

    let err = service
        .record_grade(999, assessment.id.unwrap(), 8.0, "Carlos Lima")
        .unwrap_err();
    assert!(matches!(err, StudentRecordError::StudentNotFound(999)));

    let students = SqliteStudentRepository::try_new(&conn).unwrap();
    let mut student = Student::new("Bruno Dias", "", "2026002").unwrap();
    student.deactivate();
    let student_id = students.save(&mut student).unwrap();

    let err = service
        .record_grade(student_id, assessment.id.unwrap(), 8.0, "Carlos Lima")
        .unwrap_err();
    assert!(matches!(
        err,
        StudentRecordError::StudentInactive(id) if id == student_id
    ));
}

#[test]
fn record_grade_rejects_unknown_assessments() {
    let conn = open_db_in_memory().unwrap();
    let service = record_service(&conn);

    let student_id = seed_student(&conn, "Ana Souza", "2026001");

    let err = service
        .record_grade(student_id, 999, 8.0, "Carlos Lima")
        .unwrap_err();
    assert!(matches!(err, StudentRecordError::AssessmentNotFound(999)));
}

#[test]
fn record_grade_conflicts_on_second_entry() {
    let conn = open_db_in_memory().unwrap();
    let service = record_service(&conn);

    let student_id = seed_student(&conn, "Ana Souza", "2026001");
    let assessment = seed_assessment(&conn, "Matemática", Bimester::Primeiro, 2.0);
    let assessment_id = assessment.id.unwrap();

    service
        .record_grade(student_id, assessment_id, 8.0, "Carlos Lima")
        .unwrap();

    let err = service
        .record_grade(student_id, assessment_id, 9.0, "Diana Costa")
        .unwrap_err();
    assert!(matches!(
        err,
        StudentRecordError::AlreadyGraded {
            student_id: conflicting_student,
            assessment_id: conflicting_assessment,
        } if conflicting_student == student_id && conflicting_assessment == assessment_id
    ));

    // The original entry is untouched.
    let grades = SqliteGradeRepository::try_new(&conn).unwrap();
    let stored = grades
        .find_by_student_and_assessment(student_id, assessment_id)
        .unwrap()
        .unwrap();
    assert_eq!(stored.score, 8.0);
    assert_eq!(stored.graded_by, "Carlos Lima");
}

#[test]
fn record_grade_propagates_score_validation() {
    let conn = open_db_in_memory().unwrap();
    let service = record_service(&conn);

    let student_id = seed_student(&conn, "Ana Souza", "2026001");
    let assessment = seed_assessment(&conn, "Matemática", Bimester::Primeiro, 2.0);

    let err = service
        .record_grade(student_id, assessment.id.unwrap(), 11.0, "Carlos Lima")
        .unwrap_err();
    assert!(matches!(
        err,
        StudentRecordError::Validation(ValidationError::ScoreAboveMax { .. })
    ));
}

#[test]
fn bimester_average_weights_scores_end_to_end() {
    let conn = open_db_in_memory().unwrap();
    let service = record_service(&conn);

    let student_id = seed_student(&conn, "Ana Souza", "2026001");
    let heavy = seed_assessment(&conn, "Matemática", Bimester::Primeiro, 4.0);
    let light = seed_assessment(&conn, "Matemática", Bimester::Primeiro, 1.0);

    service
        .record_grade(student_id, heavy.id.unwrap(), 8.0, "Carlos Lima")
        .unwrap();
    service
        .record_grade(student_id, light.id.unwrap(), 10.0, "Carlos Lima")
        .unwrap();

    let average = service
        .bimester_average(student_id, "Matemática", Bimester::Primeiro, 2026)
        .unwrap();
    assert_eq!(average, Some(8.4));

    let empty = service
        .bimester_average(student_id, "Matemática", Bimester::Segundo, 2026)
        .unwrap();
    assert_eq!(empty, None);
}

#[test]
fn report_card_with_all_bimesters_passes_or_fails() {
    let conn = open_db_in_memory().unwrap();
    let service = record_service(&conn);

    let passing = seed_student(&conn, "Ana Souza", "2026001");
    let failing = seed_student(&conn, "Bruno Dias", "2026002");
    let boundary = seed_student(&conn, "Carla Nunes", "2026003");

    let mut assessment_ids = Vec::new();
    for bimester in Bimester::ALL {
        let assessment = seed_assessment(&conn, "Matemática", bimester, 1.0);
        assessment_ids.push(assessment.id.unwrap());
    }

    for (assessment_id, score) in assessment_ids.iter().zip([7.0, 8.0, 6.0, 9.0]) {
        service
            .record_grade(passing, *assessment_id, score, "Carlos Lima")
            .unwrap();
    }
    for (assessment_id, score) in assessment_ids.iter().zip([5.0, 5.0, 6.0, 5.0]) {
        service
            .record_grade(failing, *assessment_id, score, "Carlos Lima")
            .unwrap();
    }
    for assessment_id in &assessment_ids {
        service
            .record_grade(boundary, *assessment_id, 6.0, "Carlos Lima")
            .unwrap();
    }

    let card = service.report_card(passing, "Matemática", 2026).unwrap();
    assert_eq!(
        card.bimester_averages,
        [Some(7.0), Some(8.0), Some(6.0), Some(9.0)]
    );
    assert_eq!(card.annual_average, Some(7.5));
    assert_eq!(card.status, RecordStatus::Passed);

    let card = service.report_card(failing, "Matemática", 2026).unwrap();
    assert_eq!(card.annual_average, Some(5.25));
    assert_eq!(card.status, RecordStatus::Failed);

    // Exactly at the passing threshold.
    let card = service.report_card(boundary, "Matemática", 2026).unwrap();
    assert_eq!(card.annual_average, Some(6.0));
    assert_eq!(card.status, RecordStatus::Passed);
}

#[test]
fn report_card_with_partial_bimesters_stays_incomplete() {
    let conn = open_db_in_memory().unwrap();
    let service = record_service(&conn);

    let student_id = seed_student(&conn, "Ana Souza", "2026001");
    let first = seed_assessment(&conn, "Matemática", Bimester::Primeiro, 1.0);
    let second = seed_assessment(&conn, "Matemática", Bimester::Segundo, 1.0);

    service
        .record_grade(student_id, first.id.unwrap(), 6.0, "Carlos Lima")
        .unwrap();
    service
        .record_grade(student_id, second.id.unwrap(), 7.0, "Carlos Lima")
        .unwrap();

    let card = service.report_card(student_id, "Matemática", 2026).unwrap();
    assert_eq!(
        card.bimester_averages,
        [Some(6.0), Some(7.0), None, None]
    );
    // Partial mean is reported, but the year is not decided.
    assert_eq!(card.annual_average, Some(6.5));
    assert_eq!(card.status, RecordStatus::Incomplete);
}

#[test]
fn report_card_with_no_grades_is_empty() {
    let conn = open_db_in_memory().unwrap();
    let service = record_service(&conn);

    let student_id = seed_student(&conn, "Ana Souza", "2026001");

    let card = service.report_card(student_id, "Matemática", 2026).unwrap();
    assert_eq!(card.bimester_averages, [None, None, None, None]);
    assert_eq!(card.annual_average, None);
    assert_eq!(card.status, RecordStatus::Incomplete);
}

#[test]
fn report_card_display_renders_all_lines() {
    let conn = open_db_in_memory().unwrap();
    let service = record_service(&conn);

    let student_id = seed_student(&conn, "Ana Souza", "2026001");
    let first = seed_assessment(&conn, "Matemática", Bimester::Primeiro, 1.0);
    service
        .record_grade(student_id, first.id.unwrap(), 7.0, "Carlos Lima")
        .unwrap();

    let card = service.report_card(student_id, "Matemática", 2026).unwrap();
    let rendered = card.to_string();

    assert!(rendered.starts_with(&format!(
        "Report card - student {student_id} - Matemática (2026)\n"
    )));
    assert!(rendered.contains("  1st bimester: 7.00\n"));
    assert!(rendered.contains("  2nd bimester: -\n"));
    assert!(rendered.contains("  Annual average: 7.00\n"));
    assert!(rendered.ends_with("  Status: Incomplete"));
}

#[test]
fn attendance_extract_counts_and_percentage() {
    let conn = open_db_in_memory().unwrap();
    let service = record_service(&conn);

    let student_id = seed_student(&conn, "Ana Souza", "2026001");
    let attendance = SqliteAttendanceRepository::try_new(&conn).unwrap();

    for day in [2, 3, 4, 5, 6, 10, 11] {
        let mut record =
            Attendance::present(student_id, "Matemática", date(2026, 3, day)).unwrap();
        attendance.save(&mut record).unwrap();
    }
    for (day, justified) in [(7, true), (8, true), (9, false)] {
        let mut record =
            Attendance::absence(student_id, "Matemática", date(2026, 3, day)).unwrap();
        if justified {
            record.justify("Atestado médico").unwrap();
        }
        attendance.save(&mut record).unwrap();
    }
    // Outside the requested window.
    let mut extra = Attendance::present(student_id, "Matemática", date(2026, 3, 12)).unwrap();
    attendance.save(&mut extra).unwrap();

    let extract = service
        .attendance_extract(student_id, "Matemática", date(2026, 3, 2), date(2026, 3, 11))
        .unwrap();

    assert_eq!(extract.total, 10);
    assert_eq!(extract.present, 7);
    assert_eq!(extract.absent, 3);
    assert_eq!(extract.justified_absences, 2);
    assert_eq!(extract.presence_percentage, 70.0);

    let rendered = extract.to_string();
    assert!(rendered.contains("Records: 10 (present 7, absent 3, justified 2)"));
    assert!(rendered.ends_with("Presence: 70.0%"));
}

#[test]
fn attendance_extract_of_empty_range_is_zero() {
    let conn = open_db_in_memory().unwrap();
    let service = record_service(&conn);

    let student_id = seed_student(&conn, "Ana Souza", "2026001");

    let extract = service
        .attendance_extract(student_id, "Matemática", date(2026, 3, 2), date(2026, 3, 11))
        .unwrap();

    assert_eq!(extract.total, 0);
    assert_eq!(extract.presence_percentage, 0.0);
}

#[test]
fn enroll_student_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let service = registrar_service(&conn);

    let student_id = seed_student(&conn, "Ana Souza", "2026001");
    let classroom_id = seed_classroom(&conn, "1º Ano", "A");

    let classroom = service
        .enroll_student(student_id, classroom_id, Some(2026))
        .unwrap();
    assert_eq!(classroom.students, vec![student_id]);

    let again = service
        .enroll_student(student_id, classroom_id, Some(2026))
        .unwrap();
    assert_eq!(again.students, vec![student_id]);

    let stored_year: i32 = conn
        .query_row(
            "SELECT academic_year FROM classroom_enrollments
             WHERE classroom_id = ?1 AND student_id = ?2;",
            [classroom_id, student_id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored_year, 2026);
}

#[test]
fn enroll_student_rejects_missing_or_inactive_parties() {
    let conn = open_db_in_memory().unwrap();
    let service = registrar_service(&conn);

    let classroom_id = seed_classroom(&conn, "1º Ano", "A");

    let err = service.enroll_student(999, classroom_id, None).unwrap_err();
    assert!(matches!(err, RegistrarError::StudentNotFound(999)));

    let students = SqliteStudentRepository::try_new(&conn).unwrap();
    let mut student = Student::new("Bruno Dias", "", "2026002").unwrap();
    student.deactivate();
    let student_id = students.save(&mut student).unwrap();

    let err = service
        .enroll_student(student_id, classroom_id, None)
        .unwrap_err();
    assert!(matches!(
        err,
        RegistrarError::StudentInactive(id) if id == student_id
    ));

    let active_id = seed_student(&conn, "Ana Souza", "2026001");
    let err = service.enroll_student(active_id, 999, None).unwrap_err();
    assert!(matches!(err, RegistrarError::ClassroomNotFound(999)));
}

#[test]
fn link_guardian_defaults_the_label() {
    let conn = open_db_in_memory().unwrap();
    let service = registrar_service(&conn);

    let student_id = seed_student(&conn, "Ana Souza", "2026001");
    let guardian_id = seed_guardian(&conn, "Marta Souza");

    assert!(service.link_guardian(guardian_id, student_id, None).unwrap());

    let stored_label: String = conn
        .query_row(
            "SELECT relationship FROM student_parent
             WHERE parent_id = ?1 AND student_id = ?2;",
            [guardian_id, student_id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored_label, "Responsável");

    // The pair is already linked; a second label does not replace it.
    assert!(!service
        .link_guardian(guardian_id, student_id, Some("Mãe"))
        .unwrap());
    let stored_label: String = conn
        .query_row(
            "SELECT relationship FROM student_parent
             WHERE parent_id = ?1 AND student_id = ?2;",
            [guardian_id, student_id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored_label, "Responsável");
}

#[test]
fn link_guardian_rejects_unknown_labels_and_parties() {
    let conn = open_db_in_memory().unwrap();
    let service = registrar_service(&conn);

    let student_id = seed_student(&conn, "Ana Souza", "2026001");
    let guardian_id = seed_guardian(&conn, "Marta Souza");

    let err = service
        .link_guardian(guardian_id, student_id, Some("Primo"))
        .unwrap_err();
    assert!(matches!(
        err,
        RegistrarError::InvalidRelationship(label) if label == "Primo"
    ));

    let err = service.link_guardian(999, student_id, None).unwrap_err();
    assert!(matches!(err, RegistrarError::GuardianNotFound(999)));

    let err = service.link_guardian(guardian_id, 999, None).unwrap_err();
    assert!(matches!(err, RegistrarError::StudentNotFound(999)));
}

#[test]
fn guardian_student_views_check_their_anchor() {
    let conn = open_db_in_memory().unwrap();
    let service = registrar_service(&conn);

    let ana = seed_student(&conn, "Ana Souza", "2026001");
    let bruno = seed_student(&conn, "Bruno Dias", "2026002");
    let guardian_id = seed_guardian(&conn, "Marta Souza");

    service.link_guardian(guardian_id, ana, Some("Mãe")).unwrap();
    service.link_guardian(guardian_id, bruno, Some("Mãe")).unwrap();

    assert_eq!(
        service.students_of_guardian(guardian_id).unwrap(),
        vec![ana, bruno]
    );
    assert_eq!(service.guardians_of_student(ana).unwrap(), vec![guardian_id]);

    assert!(matches!(
        service.students_of_guardian(999).unwrap_err(),
        RegistrarError::GuardianNotFound(999)
    ));
    assert!(matches!(
        service.guardians_of_student(999).unwrap_err(),
        RegistrarError::StudentNotFound(999)
    ));

    assert!(service.unlink_guardian(guardian_id, ana).unwrap());
    assert!(!service.unlink_guardian(guardian_id, ana).unwrap());
    assert_eq!(
        service.students_of_guardian(guardian_id).unwrap(),
        vec![bruno]
    );
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn record_service(
    conn: &Connection,
) -> StudentRecordService<
    SqliteStudentRepository<'_>,
    SqliteAssessmentRepository<'_>,
    SqliteGradeRepository<'_>,
    SqliteAttendanceRepository<'_>,
> {
    StudentRecordService::new(
        SqliteStudentRepository::try_new(conn).unwrap(),
        SqliteAssessmentRepository::try_new(conn).unwrap(),
        SqliteGradeRepository::try_new(conn).unwrap(),
        SqliteAttendanceRepository::try_new(conn).unwrap(),
    )
}

fn registrar_service(
    conn: &Connection,
) -> RegistrarService<
    SqliteStudentRepository<'_>,
    SqliteClassroomRepository<'_>,
    SqliteGuardianRepository<'_>,
> {
    RegistrarService::new(
        SqliteStudentRepository::try_new(conn).unwrap(),
        SqliteClassroomRepository::try_new(conn).unwrap(),
        SqliteGuardianRepository::try_new(conn).unwrap(),
    )
}

fn seed_student(conn: &Connection, name: &str, registration: &str) -> i64 {
    let repo = SqliteStudentRepository::try_new(conn).unwrap();
    let mut student = Student::new(name, "", registration).unwrap();
    repo.save(&mut student).unwrap()
}

fn seed_guardian(conn: &Connection, name: &str) -> i64 {
    let repo = SqliteGuardianRepository::try_new(conn).unwrap();
    let mut guardian = Guardian::new(name, "", None, None).unwrap();
    repo.save(&mut guardian).unwrap()
}

fn seed_classroom(conn: &Connection, year: &str, identifier: &str) -> i64 {
    let repo = SqliteClassroomRepository::try_new(conn).unwrap();
    let mut classroom =
        Classroom::new(year, identifier, Shift::Manha, EducationLevel::Medio).unwrap();
    repo.save(&mut classroom).unwrap()
}

fn seed_assessment(
    conn: &Connection,
    subject: &str,
    bimester: Bimester,
    weight: f64,
) -> Assessment {
    let repo = SqliteAssessmentRepository::try_new(conn).unwrap();
    let mut assessment = Assessment::new(
        format!("Avaliação de {subject}"),
        "",
        subject,
        AssessmentType::Prova,
        10.0,
        weight,
        bimester,
        None,
        Some(2026),
    )
    .unwrap();
    repo.save(&mut assessment).unwrap();
    assessment
}
