//! Fixed demo dataset for seeded in-memory workspaces. Ids are stable so the
//! max+1 id counter continues from the seed.

use chrono::NaiveDate;

use crate::model::{
    AttendanceId, AttendanceRecord, AttendanceStatus, Class, ClassId, Enrollment, EnrollmentId,
    Grade, GradeCategory, GradeId, GradeLevel, Student, StudentId, StudentStatus,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    // Seed constants only; every triple below is a valid calendar date.
    NaiveDate::from_ymd_opt(y, m, d).expect("valid seed date")
}

pub fn students() -> Vec<Student> {
    let mk = |id: i64,
              first: &str,
              last: &str,
              email: &str,
              phone: &str,
              level: GradeLevel,
              dob: NaiveDate,
              status: StudentStatus| Student {
        id: StudentId(id),
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        grade_level: level,
        date_of_birth: dob,
        enrollment_date: date(2025, 9, 2),
        status,
    };

    vec![
        mk(
            1,
            "Emma",
            "Johnson",
            "emma.johnson@school.edu",
            "555-0101",
            GradeLevel::G10,
            date(2010, 3, 14),
            StudentStatus::Active,
        ),
        mk(
            2,
            "Liam",
            "Martinez",
            "liam.martinez@school.edu",
            "555-0102",
            GradeLevel::G10,
            date(2010, 7, 2),
            StudentStatus::Active,
        ),
        mk(
            3,
            "Olivia",
            "Chen",
            "olivia.chen@school.edu",
            "555-0103",
            GradeLevel::G11,
            date(2009, 11, 21),
            StudentStatus::Active,
        ),
        mk(
            4,
            "Noah",
            "Williams",
            "noah.williams@school.edu",
            "555-0104",
            GradeLevel::G10,
            date(2010, 1, 9),
            StudentStatus::Active,
        ),
        mk(
            5,
            "Ava",
            "Patel",
            "ava.patel@school.edu",
            "555-0105",
            GradeLevel::G11,
            date(2009, 5, 30),
            StudentStatus::Inactive,
        ),
    ]
}

pub fn classes() -> Vec<Class> {
    let mk = |id: i64, name: &str, subject: &str, period: &str, room: &str| Class {
        id: ClassId(id),
        name: name.to_string(),
        subject: subject.to_string(),
        period: period.to_string(),
        room: room.to_string(),
    };

    vec![
        mk(1, "Algebra II", "Mathematics", "1", "204"),
        mk(2, "Biology", "Science", "3", "112"),
        mk(3, "World History", "Social Studies", "5", "301"),
    ]
}

pub fn enrollments() -> Vec<Enrollment> {
    let mk = |id: i64, student: i64, class: i64| Enrollment {
        id: EnrollmentId(id),
        student_id: StudentId(student),
        class_id: ClassId(class),
    };

    vec![
        mk(1, 1, 1),
        mk(2, 1, 2),
        mk(3, 2, 1),
        mk(4, 2, 3),
        mk(5, 3, 2),
        mk(6, 3, 3),
        mk(7, 4, 1),
        mk(8, 5, 3),
    ]
}

pub fn grades() -> Vec<Grade> {
    let mk = |id: i64,
              student: i64,
              class: i64,
              name: &str,
              category: GradeCategory,
              score: f64,
              max: f64,
              when: NaiveDate| Grade {
        id: GradeId(id),
        student_id: StudentId(student),
        class_id: ClassId(class),
        assignment_name: name.to_string(),
        category,
        score,
        max_score: max,
        date: when,
    };

    vec![
        mk(
            1,
            1,
            1,
            "Linear Equations Quiz",
            GradeCategory::Quiz,
            18.0,
            20.0,
            date(2026, 1, 12),
        ),
        mk(
            2,
            1,
            1,
            "Chapter 3 Test",
            GradeCategory::Test,
            88.0,
            100.0,
            date(2026, 1, 23),
        ),
        mk(
            3,
            1,
            2,
            "Cell Structure Lab",
            GradeCategory::Project,
            47.0,
            50.0,
            date(2026, 1, 16),
        ),
        mk(
            4,
            2,
            1,
            "Linear Equations Quiz",
            GradeCategory::Quiz,
            14.0,
            20.0,
            date(2026, 1, 12),
        ),
        mk(
            5,
            2,
            3,
            "Ancient Rome Essay",
            GradeCategory::Homework,
            32.0,
            40.0,
            date(2026, 1, 20),
        ),
        mk(
            6,
            3,
            2,
            "Cell Structure Lab",
            GradeCategory::Project,
            44.0,
            50.0,
            date(2026, 1, 16),
        ),
        mk(
            7,
            3,
            3,
            "Ancient Rome Essay",
            GradeCategory::Homework,
            38.0,
            40.0,
            date(2026, 1, 20),
        ),
        mk(
            8,
            4,
            1,
            "Chapter 3 Test",
            GradeCategory::Test,
            61.0,
            100.0,
            date(2026, 1, 23),
        ),
    ]
}

pub fn attendance() -> Vec<AttendanceRecord> {
    let mk = |id: i64, student: i64, class: i64, when: NaiveDate, status: AttendanceStatus| {
        AttendanceRecord {
            id: AttendanceId(id),
            student_id: StudentId(student),
            class_id: ClassId(class),
            date: when,
            status,
        }
    };

    vec![
        mk(1, 1, 1, date(2026, 1, 19), AttendanceStatus::Present),
        mk(2, 1, 1, date(2026, 1, 20), AttendanceStatus::Present),
        mk(3, 1, 2, date(2026, 1, 19), AttendanceStatus::Excused),
        mk(4, 2, 1, date(2026, 1, 19), AttendanceStatus::Late),
        mk(5, 2, 1, date(2026, 1, 20), AttendanceStatus::Present),
        mk(6, 2, 3, date(2026, 1, 19), AttendanceStatus::Absent),
        mk(7, 3, 2, date(2026, 1, 19), AttendanceStatus::Present),
        mk(8, 3, 3, date(2026, 1, 20), AttendanceStatus::Present),
        mk(9, 4, 1, date(2026, 1, 19), AttendanceStatus::Absent),
        mk(10, 4, 1, date(2026, 1, 20), AttendanceStatus::Absent),
    ]
}
