//! Pure, stateless computations over already-fetched collections: averages,
//! rates, banding, the performance report, and the dashboard aggregates.
//! Nothing in here touches a store.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{
    AttendanceRecord, AttendanceStatus, Class, ClassId, Enrollment, Grade, Student, StudentId,
    StudentStatus,
};

/// Mean of per-assignment percentages. 0 when there are no grades.
pub fn mean_percent<'a, I>(grades: I) -> f64
where
    I: IntoIterator<Item = &'a Grade>,
{
    let mut total = 0.0;
    let mut count = 0usize;
    for g in grades {
        total += g.percent();
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Integer percentage average grade, 0 when there are no grades.
pub fn average_grade<'a, I>(grades: I) -> i64
where
    I: IntoIterator<Item = &'a Grade>,
{
    mean_percent(grades).round() as i64
}

/// Integer attendance rate; present and excused count as attended. 0 when
/// there are no records.
pub fn attendance_rate<'a, I>(records: I) -> i64
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    let mut attended = 0usize;
    let mut total = 0usize;
    for r in records {
        if r.attended() {
            attended += 1;
        }
        total += 1;
    }
    if total == 0 {
        0
    } else {
        (100.0 * attended as f64 / total as f64).round() as i64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

pub fn letter_grade(average: i64) -> LetterGrade {
    if average >= 90 {
        LetterGrade::A
    } else if average >= 80 {
        LetterGrade::B
    } else if average >= 70 {
        LetterGrade::C
    } else if average >= 60 {
        LetterGrade::D
    } else {
        LetterGrade::F
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceBand {
    Excellent,
    Good,
    Satisfactory,
    NeedsImprovement,
}

pub fn attendance_band(rate: i64) -> AttendanceBand {
    if rate >= 95 {
        AttendanceBand::Excellent
    } else if rate >= 85 {
        AttendanceBand::Good
    } else if rate >= 75 {
        AttendanceBand::Satisfactory
    } else {
        AttendanceBand::NeedsImprovement
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Performance {
    Excellent,
    Good,
    #[serde(rename = "Needs Attention")]
    NeedsAttention,
    Average,
}

/// First match wins: Excellent, then Good, then Needs Attention, then the
/// Average fallback.
pub fn performance(average: i64, rate: i64) -> Performance {
    if average >= 90 && rate >= 95 {
        Performance::Excellent
    } else if average >= 80 && rate >= 85 {
        Performance::Good
    } else if average < 70 || rate < 75 {
        Performance::NeedsAttention
    } else {
        Performance::Average
    }
}

/// UI status cycle: present -> absent -> late -> excused -> present. The
/// no-record state is not part of the cycle; clients start at present.
pub fn next_attendance_status(status: Option<AttendanceStatus>) -> AttendanceStatus {
    match status {
        None | Some(AttendanceStatus::Excused) => AttendanceStatus::Present,
        Some(AttendanceStatus::Present) => AttendanceStatus::Absent,
        Some(AttendanceStatus::Absent) => AttendanceStatus::Late,
        Some(AttendanceStatus::Late) => AttendanceStatus::Excused,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub student: Student,
    pub average_grade: i64,
    pub attendance_rate: i64,
    pub total_assignments: usize,
    pub total_attendance_records: usize,
    pub letter_grade: LetterGrade,
    pub attendance_band: AttendanceBand,
    pub performance: Performance,
    pub honor_roll: bool,
}

/// Report rows for active students, optionally scoped to one class via the
/// enrollment set. Sorted descending by average grade; the sort is stable so
/// ties keep their roster order.
pub fn performance_report(
    students: &[Student],
    enrollments: &[Enrollment],
    grades: &[Grade],
    attendance: &[AttendanceRecord],
    class_filter: Option<ClassId>,
) -> Vec<ReportRow> {
    let mut grades_by_student: HashMap<StudentId, Vec<&Grade>> = HashMap::new();
    for g in grades {
        if class_filter.map_or(true, |c| g.class_id == c) {
            grades_by_student.entry(g.student_id).or_default().push(g);
        }
    }

    let mut attendance_by_student: HashMap<StudentId, Vec<&AttendanceRecord>> = HashMap::new();
    for r in attendance {
        if class_filter.map_or(true, |c| r.class_id == c) {
            attendance_by_student
                .entry(r.student_id)
                .or_default()
                .push(r);
        }
    }

    let enrolled: HashSet<StudentId> = match class_filter {
        Some(class_id) => enrollments
            .iter()
            .filter(|e| e.class_id == class_id)
            .map(|e| e.student_id)
            .collect(),
        None => HashSet::new(),
    };

    let mut rows: Vec<ReportRow> = students
        .iter()
        .filter(|s| s.status == StudentStatus::Active)
        .filter(|s| class_filter.is_none() || enrolled.contains(&s.id))
        .map(|s| {
            let student_grades = grades_by_student.get(&s.id).map(Vec::as_slice).unwrap_or(&[]);
            let student_attendance = attendance_by_student
                .get(&s.id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);

            let average = average_grade(student_grades.iter().copied());
            let rate = attendance_rate(student_attendance.iter().copied());

            ReportRow {
                student: s.clone(),
                average_grade: average,
                attendance_rate: rate,
                total_assignments: student_grades.len(),
                total_attendance_records: student_attendance.len(),
                letter_grade: letter_grade(average),
                attendance_band: attendance_band(rate),
                performance: performance(average, rate),
                honor_roll: average >= 90,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.average_grade.cmp(&a.average_grade));
    rows
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub grade: Grade,
    pub student_name: String,
    pub class_name: String,
}

/// Most recent grades first, joined with student and class display names by
/// id-keyed lookup. Missing references render as placeholders instead of
/// failing.
pub fn recent_activity(
    grades: &[Grade],
    students: &[Student],
    classes: &[Class],
    limit: usize,
) -> Vec<ActivityEntry> {
    let students_by_id: HashMap<StudentId, &Student> =
        students.iter().map(|s| (s.id, s)).collect();
    let classes_by_id: HashMap<ClassId, &Class> = classes.iter().map(|c| (c.id, c)).collect();

    let mut sorted: Vec<&Grade> = grades.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    sorted
        .into_iter()
        .take(limit)
        .map(|g| ActivityEntry {
            grade: g.clone(),
            student_name: students_by_id
                .get(&g.student_id)
                .map(|s| s.display_name())
                .unwrap_or_else(|| "Unknown Student".to_string()),
            class_name: classes_by_id
                .get(&g.class_id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "Unknown Class".to_string()),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub active_students: usize,
    pub total_classes: usize,
    pub todays_attendance_rate: i64,
    pub recent_grades: Vec<ActivityEntry>,
}

/// Dashboard aggregates. Today's rate counts only `present` records, which
/// is narrower than the per-student attendance rate on purpose: the board
/// answers "who is in the room today".
pub fn dashboard_summary(
    students: &[Student],
    classes: &[Class],
    grades: &[Grade],
    attendance: &[AttendanceRecord],
    today: NaiveDate,
) -> DashboardSummary {
    let todays: Vec<&AttendanceRecord> = attendance.iter().filter(|r| r.date == today).collect();
    let present = todays
        .iter()
        .filter(|r| r.status == AttendanceStatus::Present)
        .count();
    let todays_attendance_rate = if todays.is_empty() {
        0
    } else {
        (100.0 * present as f64 / todays.len() as f64).round() as i64
    };

    DashboardSummary {
        active_students: students
            .iter()
            .filter(|s| s.status == StudentStatus::Active)
            .count(),
        total_classes: classes.len(),
        todays_attendance_rate,
        recent_grades: recent_activity(grades, students, classes, 5),
    }
}
