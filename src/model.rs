use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::store::Record;

macro_rules! record_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);
    };
}

record_id!(StudentId);
record_id!(ClassId);
record_id!(EnrollmentId);
record_id!(GradeId);
record_id!(AttendanceId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    Active,
    Inactive,
}

/// K through 12, serialized as the short level codes the roster forms use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradeLevel {
    K,
    #[serde(rename = "1")]
    G1,
    #[serde(rename = "2")]
    G2,
    #[serde(rename = "3")]
    G3,
    #[serde(rename = "4")]
    G4,
    #[serde(rename = "5")]
    G5,
    #[serde(rename = "6")]
    G6,
    #[serde(rename = "7")]
    G7,
    #[serde(rename = "8")]
    G8,
    #[serde(rename = "9")]
    G9,
    #[serde(rename = "10")]
    G10,
    #[serde(rename = "11")]
    G11,
    #[serde(rename = "12")]
    G12,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeCategory {
    Homework,
    Quiz,
    Test,
    Project,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub grade_level: GradeLevel,
    pub date_of_birth: NaiveDate,
    pub enrollment_date: NaiveDate,
    pub status: StudentStatus,
}

impl Student {
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: ClassId,
    pub name: String,
    pub subject: String,
    pub period: String,
    pub room: String,
}

/// The single source of truth for class membership. One link per
/// (student, class) pair; everything else is a derived view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_id: StudentId,
    pub class_id: ClassId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub id: GradeId,
    pub student_id: StudentId,
    pub class_id: ClassId,
    pub assignment_name: String,
    pub category: GradeCategory,
    pub score: f64,
    pub max_score: f64,
    pub date: NaiveDate,
}

impl Grade {
    /// Percentage for one assignment. A non-positive maxScore yields 0
    /// rather than a division blow-up.
    pub fn percent(&self) -> f64 {
        if self.max_score > 0.0 {
            100.0 * self.score / self.max_score
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: AttendanceId,
    pub student_id: StudentId,
    pub class_id: ClassId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    /// Present and excused both count toward the attendance rate.
    pub fn attended(&self) -> bool {
        matches!(
            self.status,
            AttendanceStatus::Present | AttendanceStatus::Excused
        )
    }
}

impl Record for Student {
    const KIND: &'static str = "students";
    fn id(&self) -> i64 {
        self.id.0
    }
}

impl Record for Class {
    const KIND: &'static str = "classes";
    fn id(&self) -> i64 {
        self.id.0
    }
}

impl Record for Enrollment {
    const KIND: &'static str = "enrollments";
    fn id(&self) -> i64 {
        self.id.0
    }
}

impl Record for Grade {
    const KIND: &'static str = "grades";
    fn id(&self) -> i64 {
        self.id.0
    }
}

impl Record for AttendanceRecord {
    const KIND: &'static str = "attendance";
    fn id(&self) -> i64 {
        self.id.0
    }
}
