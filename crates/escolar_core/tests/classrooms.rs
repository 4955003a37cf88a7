use escolar_core::db::open_db_in_memory;
use escolar_core::{
    Classroom, ClassroomRepository, EducationLevel, RepoError, Shift, SqliteClassroomRepository,
    SqliteStudentRepository, SqliteTeacherRepository, Student, StudentRepository, Teacher,
    TeacherRepository,
};
use rusqlite::Connection;

#[test]
fn classroom_save_roundtrips_shift_and_level_tokens() {
    let conn = open_db_in_memory().unwrap();
    let teachers = SqliteTeacherRepository::try_new(&conn).unwrap();
    let repo = SqliteClassroomRepository::try_new(&conn).unwrap();

    let mut teacher = Teacher::new("Carlos Lima", "", "T-100").unwrap();
    let teacher_id = teachers.save(&mut teacher).unwrap();

    let mut classroom = Classroom::new(
        "7º Ano",
        "B",
        Shift::Tarde,
        EducationLevel::FundamentalII,
    )
    .unwrap();
    classroom.teacher_id = Some(teacher_id);
    let id = repo.save(&mut classroom).unwrap();

    let loaded = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.year, "7º Ano");
    assert_eq!(loaded.identifier, "B");
    assert_eq!(loaded.shift, Shift::Tarde);
    assert_eq!(loaded.level, EducationLevel::FundamentalII);
    assert_eq!(loaded.teacher_id, Some(teacher_id));
    assert!(loaded.students.is_empty());
}

#[test]
fn classroom_save_updates_existing_row_in_place() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteClassroomRepository::try_new(&conn).unwrap();

    let mut classroom =
        Classroom::new("1º Ano", "A", Shift::Manha, EducationLevel::Medio).unwrap();
    let id = repo.save(&mut classroom).unwrap();

    classroom.shift = Shift::Noite;
    assert_eq!(repo.save(&mut classroom).unwrap(), id);

    let loaded = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.shift, Shift::Noite);
}

#[test]
fn list_all_orders_by_year_then_identifier() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteClassroomRepository::try_new(&conn).unwrap();

    save_classroom(&repo, "2º Ano", "A");
    save_classroom(&repo, "1º Ano", "B");
    save_classroom(&repo, "1º Ano", "A");

    let labels: Vec<String> = repo
        .list_all()
        .unwrap()
        .into_iter()
        .map(|c| format!("{} {}", c.year, c.identifier))
        .collect();
    assert_eq!(labels, vec!["1º Ano A", "1º Ano B", "2º Ano A"]);
}

#[test]
fn enrollment_is_idempotent_and_keeps_order() {
    let conn = open_db_in_memory().unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();
    let repo = SqliteClassroomRepository::try_new(&conn).unwrap();

    let ana = save_student(&students, "Ana Souza", "2026001");
    let bruno = save_student(&students, "Bruno Dias", "2026002");
    let classroom_id = save_classroom(&repo, "1º Ano", "A");

    repo.add_student_to_classroom(classroom_id, ana, 2026).unwrap();
    repo.add_student_to_classroom(classroom_id, bruno, 2026)
        .unwrap();
    // Re-enrolling the same student is a silent no-op.
    repo.add_student_to_classroom(classroom_id, ana, 2026).unwrap();

    let loaded = repo.find_by_id(classroom_id).unwrap().unwrap();
    assert_eq!(loaded.students, vec![ana, bruno]);
}

#[test]
fn corrupt_shift_token_surfaces_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteClassroomRepository::try_new(&conn).unwrap();

    let id = save_classroom(&repo, "1º Ano", "A");
    conn.execute("UPDATE classrooms SET shift = 'EVENING' WHERE id = ?1;", [id])
        .unwrap();

    let err = repo.find_by_id(id).unwrap_err();
    assert!(
        matches!(&err, RepoError::InvalidData(message) if message.contains("EVENING")),
        "unexpected error: {err}"
    );
}

#[test]
fn deleting_homeroom_teacher_clears_the_reference() {
    let conn = open_db_in_memory().unwrap();
    let teachers = SqliteTeacherRepository::try_new(&conn).unwrap();
    let repo = SqliteClassroomRepository::try_new(&conn).unwrap();

    let mut teacher = Teacher::new("Carlos Lima", "", "T-100").unwrap();
    let teacher_id = teachers.save(&mut teacher).unwrap();

    let mut classroom =
        Classroom::new("1º Ano", "A", Shift::Manha, EducationLevel::Medio).unwrap();
    classroom.teacher_id = Some(teacher_id);
    let id = repo.save(&mut classroom).unwrap();

    assert!(teachers.delete(teacher_id).unwrap());

    let loaded = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.teacher_id, None);
}

#[test]
fn delete_classroom_removes_enrollments() {
    let conn = open_db_in_memory().unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();
    let repo = SqliteClassroomRepository::try_new(&conn).unwrap();

    let ana = save_student(&students, "Ana Souza", "2026001");
    let classroom_id = save_classroom(&repo, "1º Ano", "A");
    repo.add_student_to_classroom(classroom_id, ana, 2026).unwrap();

    assert!(repo.delete(classroom_id).unwrap());
    assert!(!repo.delete(classroom_id).unwrap());
    assert_eq!(enrollment_count(&conn), 0);
}

fn save_classroom(repo: &SqliteClassroomRepository<'_>, year: &str, identifier: &str) -> i64 {
    let mut classroom =
        Classroom::new(year, identifier, Shift::Manha, EducationLevel::Medio).unwrap();
    repo.save(&mut classroom).unwrap()
}

fn save_student(repo: &SqliteStudentRepository<'_>, name: &str, registration: &str) -> i64 {
    let mut student = Student::new(name, "", registration).unwrap();
    repo.save(&mut student).unwrap()
}

fn enrollment_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM classroom_enrollments;", [], |row| {
        row.get(0)
    })
    .unwrap()
}
