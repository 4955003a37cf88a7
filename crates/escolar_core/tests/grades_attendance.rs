use chrono::NaiveDate;
use escolar_core::db::open_db_in_memory;
use escolar_core::{
    Assessment, AssessmentRepository, AssessmentType, Attendance, AttendanceRepository, Bimester,
    Grade, GradeRepository, RepoError, SqliteAssessmentRepository, SqliteAttendanceRepository,
    SqliteGradeRepository, SqliteStudentRepository, Student, StudentRepository,
};

#[test]
fn assessment_save_assigns_id_and_roundtrips() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAssessmentRepository::try_new(&conn).unwrap();

    let mut assessment = Assessment::new(
        "Prova Bimestral",
        "Álgebra",
        "Matemática",
        AssessmentType::Prova,
        10.0,
        3.0,
        Bimester::Segundo,
        Some(date(2026, 5, 20)),
        Some(2026),
    )
    .unwrap();
    let id = repo.save(&mut assessment).unwrap();

    let loaded = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.title, "Prova Bimestral");
    assert_eq!(loaded.kind, AssessmentType::Prova);
    assert_eq!(loaded.bimester, Bimester::Segundo);
    assert_eq!(loaded.assessment_date, Some(date(2026, 5, 20)));
    assert_eq!(loaded.academic_year, 2026);

    assert!(repo.delete(id).unwrap());
    assert!(repo.find_by_id(id).unwrap().is_none());
}

#[test]
fn grade_save_upserts_on_the_student_assessment_pair() {
    let conn = open_db_in_memory().unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();
    let assessments = SqliteAssessmentRepository::try_new(&conn).unwrap();
    let grades = SqliteGradeRepository::try_new(&conn).unwrap();

    let student_id = seed_student(&students, "Ana Souza", "2026001");
    let assessment = seed_assessment(&assessments, "Matemática", Bimester::Primeiro, None);

    let mut first = Grade::new(student_id, &assessment, 6.5, "Carlos Lima").unwrap();
    let first_id = grades.save(&mut first).unwrap();
    let stored_first = grades.find_by_id(first_id).unwrap().unwrap();

    let mut second = Grade::new(student_id, &assessment, 8.0, "Diana Costa").unwrap();
    let second_id = grades.save(&mut second).unwrap();

    assert_eq!(second_id, first_id);
    assert_eq!(second.id, Some(first_id));

    let loaded = grades
        .find_by_student_and_assessment(student_id, assessment.id.unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(loaded.score, 8.0);
    // Original authorship and timestamp survive the score replacement.
    assert_eq!(loaded.graded_by, "Carlos Lima");
    assert_eq!(loaded.graded_at, stored_first.graded_at);
    assert_eq!(grades.list_all().unwrap().len(), 1);
}

#[test]
fn grade_save_with_id_updates_score_in_place() {
    let conn = open_db_in_memory().unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();
    let assessments = SqliteAssessmentRepository::try_new(&conn).unwrap();
    let grades = SqliteGradeRepository::try_new(&conn).unwrap();

    let student_id = seed_student(&students, "Ana Souza", "2026001");
    let assessment = seed_assessment(&assessments, "Matemática", Bimester::Primeiro, None);

    let mut grade = Grade::new(student_id, &assessment, 6.5, "Carlos Lima").unwrap();
    let id = grades.save(&mut grade).unwrap();

    grade.score = 7.0;
    assert_eq!(grades.save(&mut grade).unwrap(), id);

    let loaded = grades.find_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.score, 7.0);
}

#[test]
fn find_by_student_and_assessment_misses_other_pairs() {
    let conn = open_db_in_memory().unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();
    let assessments = SqliteAssessmentRepository::try_new(&conn).unwrap();
    let grades = SqliteGradeRepository::try_new(&conn).unwrap();

    let student_id = seed_student(&students, "Ana Souza", "2026001");
    let other_id = seed_student(&students, "Bruno Dias", "2026002");
    let assessment = seed_assessment(&assessments, "Matemática", Bimester::Primeiro, None);

    let mut grade = Grade::new(student_id, &assessment, 6.5, "Carlos Lima").unwrap();
    grades.save(&mut grade).unwrap();

    assert!(grades
        .find_by_student_and_assessment(other_id, assessment.id.unwrap())
        .unwrap()
        .is_none());
}

#[test]
fn bimester_query_populates_assessments_in_date_order() {
    let conn = open_db_in_memory().unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();
    let assessments = SqliteAssessmentRepository::try_new(&conn).unwrap();
    let grades = SqliteGradeRepository::try_new(&conn).unwrap();

    let student_id = seed_student(&students, "Ana Souza", "2026001");
    let later = seed_assessment(
        &assessments,
        "Matemática",
        Bimester::Primeiro,
        Some(date(2026, 4, 10)),
    );
    let earlier = seed_assessment(
        &assessments,
        "Matemática",
        Bimester::Primeiro,
        Some(date(2026, 3, 10)),
    );
    let other_bimester = seed_assessment(
        &assessments,
        "Matemática",
        Bimester::Segundo,
        Some(date(2026, 5, 10)),
    );
    let other_subject = seed_assessment(
        &assessments,
        "História",
        Bimester::Primeiro,
        Some(date(2026, 3, 12)),
    );

    for assessment in [&later, &earlier, &other_bimester, &other_subject] {
        let mut grade = Grade::new(student_id, assessment, 7.0, "Carlos Lima").unwrap();
        grades.save(&mut grade).unwrap();
    }

    let entries = grades
        .find_by_student_and_bimester(student_id, "Matemática", Bimester::Primeiro.as_str(), 2026)
        .unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].assessment.id, earlier.id);
    assert_eq!(entries[1].assessment.id, later.id);
    assert_eq!(entries[0].grade.student_id, student_id);
    assert_eq!(entries[0].assessment.subject, "Matemática");
}

#[test]
fn attendance_save_upserts_on_the_day_key() {
    let conn = open_db_in_memory().unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();
    let attendance = SqliteAttendanceRepository::try_new(&conn).unwrap();

    let student_id = seed_student(&students, "Ana Souza", "2026001");
    let day = date(2026, 3, 10);

    let mut absence = Attendance::absence(student_id, "Matemática", day).unwrap();
    absence.justify("Atestado médico").unwrap();
    let first_id = attendance.save(&mut absence).unwrap();
    let stored_first = attendance.find_by_id(first_id).unwrap().unwrap();

    // Re-recording the same day replaces the presence fields.
    let mut corrected = Attendance::present(student_id, "Matemática", day).unwrap();
    let second_id = attendance.save(&mut corrected).unwrap();

    assert_eq!(second_id, first_id);

    let loaded = attendance.find_by_id(first_id).unwrap().unwrap();
    assert!(loaded.is_present);
    assert!(!loaded.justified);
    assert_eq!(loaded.justification, None);
    assert_eq!(loaded.recorded_at, stored_first.recorded_at);
    assert_eq!(attendance.list_all().unwrap().len(), 1);
}

#[test]
fn attendance_save_with_id_updates_presence_in_place() {
    let conn = open_db_in_memory().unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();
    let attendance = SqliteAttendanceRepository::try_new(&conn).unwrap();

    let student_id = seed_student(&students, "Ana Souza", "2026001");
    let mut record = Attendance::absence(student_id, "Matemática", date(2026, 3, 10)).unwrap();
    let id = attendance.save(&mut record).unwrap();

    record.justify("Consulta médica").unwrap();
    assert_eq!(attendance.save(&mut record).unwrap(), id);

    let loaded = attendance.find_by_id(id).unwrap().unwrap();
    assert!(!loaded.is_present);
    assert!(loaded.justified);
    assert_eq!(loaded.justification.as_deref(), Some("Consulta médica"));
}

#[test]
fn period_query_is_inclusive_and_ascending() {
    let conn = open_db_in_memory().unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();
    let attendance = SqliteAttendanceRepository::try_new(&conn).unwrap();

    let student_id = seed_student(&students, "Ana Souza", "2026001");
    for day in [9, 12, 10, 15] {
        let mut record =
            Attendance::present(student_id, "Matemática", date(2026, 3, day)).unwrap();
        attendance.save(&mut record).unwrap();
    }
    let mut other_subject =
        Attendance::present(student_id, "História", date(2026, 3, 11)).unwrap();
    attendance.save(&mut other_subject).unwrap();

    let entries = attendance
        .find_by_student_and_period(student_id, "Matemática", date(2026, 3, 10), date(2026, 3, 12))
        .unwrap();

    let days: Vec<NaiveDate> = entries.iter().map(|e| e.date).collect();
    assert_eq!(days, vec![date(2026, 3, 10), date(2026, 3, 12)]);
}

#[test]
fn corrupt_attendance_date_surfaces_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();
    let attendance = SqliteAttendanceRepository::try_new(&conn).unwrap();

    let student_id = seed_student(&students, "Ana Souza", "2026001");
    let mut record = Attendance::present(student_id, "Matemática", date(2026, 3, 10)).unwrap();
    let id = attendance.save(&mut record).unwrap();

    conn.execute(
        "UPDATE attendance SET attendance_date = '10/03/2026' WHERE id = ?1;",
        [id],
    )
    .unwrap();

    let err = attendance.find_by_id(id).unwrap_err();
    assert!(
        matches!(&err, RepoError::InvalidData(message) if message.contains("10/03/2026")),
        "unexpected error: {err}"
    );
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn seed_student(repo: &SqliteStudentRepository<'_>, name: &str, registration: &str) -> i64 {
    let mut student = Student::new(name, "", registration).unwrap();
    repo.save(&mut student).unwrap()
}

fn seed_assessment(
    repo: &SqliteAssessmentRepository<'_>,
    subject: &str,
    bimester: Bimester,
    assessment_date: Option<NaiveDate>,
) -> Assessment {
    let mut assessment = Assessment::new(
        format!("Avaliação de {subject}"),
        "",
        subject,
        AssessmentType::Prova,
        10.0,
        2.0,
        bimester,
        assessment_date,
        Some(2026),
    )
    .unwrap();
    repo.save(&mut assessment).unwrap();
    assessment
}
