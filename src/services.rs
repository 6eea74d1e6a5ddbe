//! Entity services: CRUD plus entity-specific lookups over an injected
//! repository. One service per record kind; cross-kind derived views live on
//! [`Services`].

use std::path::Path;
use std::rc::Rc;

use chrono::NaiveDate;
use rusqlite::Connection;
use serde_json::{json, Value};

use crate::metrics;
use crate::model::{
    AttendanceRecord, AttendanceStatus, Class, ClassId, Enrollment, Grade, Student, StudentId,
};
use crate::seed;
use crate::store::{MemoryStore, Record, Repository, SqliteStore, StoreError};

pub struct StudentService {
    store: Box<dyn Repository<Student>>,
}

pub struct ClassService {
    store: Box<dyn Repository<Class>>,
}

pub struct EnrollmentService {
    store: Box<dyn Repository<Enrollment>>,
}

pub struct GradeService {
    store: Box<dyn Repository<Grade>>,
}

pub struct AttendanceService {
    store: Box<dyn Repository<AttendanceRecord>>,
}

// Identical CRUD passthroughs for every service, with typed ids at the seam.
macro_rules! service_impl {
    ($svc:ident, $rec:ty, $id:ty) => {
        impl $svc {
            pub fn from_store(store: Box<dyn Repository<$rec>>) -> Self {
                Self { store }
            }

            pub fn get_all(&self) -> Result<Vec<$rec>, StoreError> {
                self.store.get_all()
            }

            pub fn get_by_id(&self, id: $id) -> Result<$rec, StoreError> {
                self.store.get_by_id(id.0)
            }

            pub fn create(&mut self, fields: Value) -> Result<$rec, StoreError> {
                self.store.create(fields)
            }

            pub fn update(&mut self, id: $id, patch: Value) -> Result<$rec, StoreError> {
                self.store.update(id.0, patch)
            }

            pub fn delete(&mut self, id: $id) -> Result<$rec, StoreError> {
                self.store.delete(id.0)
            }
        }
    };
}

service_impl!(StudentService, Student, StudentId);
service_impl!(ClassService, Class, ClassId);
service_impl!(GradeService, Grade, crate::model::GradeId);
service_impl!(AttendanceService, AttendanceRecord, crate::model::AttendanceId);

impl EnrollmentService {
    pub fn from_store(store: Box<dyn Repository<Enrollment>>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<Enrollment>, StoreError> {
        self.store.get_all()
    }

    fn find_link(
        &self,
        student_id: StudentId,
        class_id: ClassId,
    ) -> Result<Option<Enrollment>, StoreError> {
        Ok(self
            .store
            .get_all()?
            .into_iter()
            .find(|e| e.student_id == student_id && e.class_id == class_id))
    }

    /// Idempotent: enrolling an already-enrolled student returns the
    /// existing link unchanged.
    pub fn enroll(
        &mut self,
        student_id: StudentId,
        class_id: ClassId,
    ) -> Result<Enrollment, StoreError> {
        if let Some(existing) = self.find_link(student_id, class_id)? {
            return Ok(existing);
        }
        self.store.create(json!({
            "studentId": student_id,
            "classId": class_id,
        }))
    }

    pub fn withdraw(
        &mut self,
        student_id: StudentId,
        class_id: ClassId,
    ) -> Result<Enrollment, StoreError> {
        let link = self
            .find_link(student_id, class_id)?
            .ok_or(StoreError::NotFound)?;
        self.store.delete(link.id.0)
    }

    pub fn for_student(&self, student_id: StudentId) -> Result<Vec<Enrollment>, StoreError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|e| e.student_id == student_id)
            .collect())
    }

    pub fn for_class(&self, class_id: ClassId) -> Result<Vec<Enrollment>, StoreError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|e| e.class_id == class_id)
            .collect())
    }
}

impl GradeService {
    pub fn get_by_student_id(&self, student_id: StudentId) -> Result<Vec<Grade>, StoreError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|g| g.student_id == student_id)
            .collect())
    }

    pub fn get_by_class_id(&self, class_id: ClassId) -> Result<Vec<Grade>, StoreError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|g| g.class_id == class_id)
            .collect())
    }

    /// Mean of score/maxScore percentages over matching grades, rounded to
    /// two decimals. 0 when the student has no matching grades.
    pub fn student_average(
        &self,
        student_id: StudentId,
        class_id: Option<ClassId>,
    ) -> Result<f64, StoreError> {
        let grades: Vec<Grade> = self
            .get_all()?
            .into_iter()
            .filter(|g| g.student_id == student_id)
            .filter(|g| class_id.map_or(true, |c| g.class_id == c))
            .collect();
        if grades.is_empty() {
            return Ok(0.0);
        }
        let mean = metrics::mean_percent(&grades);
        Ok((mean * 100.0).round() / 100.0)
    }
}

impl AttendanceService {
    pub fn get_by_student_id(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|r| r.student_id == student_id)
            .collect())
    }

    pub fn get_by_class_id(&self, class_id: ClassId) -> Result<Vec<AttendanceRecord>, StoreError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|r| r.class_id == class_id)
            .collect())
    }

    /// Records dated within [start, end], both ends inclusive.
    pub fn get_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|r| r.date >= start && r.date <= end)
            .collect())
    }

    /// Integer percentage of attended (present or excused) records. 0 when
    /// the student has no matching records.
    pub fn attendance_rate(
        &self,
        student_id: StudentId,
        class_id: Option<ClassId>,
    ) -> Result<i64, StoreError> {
        let records: Vec<AttendanceRecord> = self
            .get_all()?
            .into_iter()
            .filter(|r| r.student_id == student_id)
            .filter(|r| class_id.map_or(true, |c| r.class_id == c))
            .collect();
        Ok(metrics::attendance_rate(&records))
    }

    /// Upsert keyed on the (student, class, calendar day) natural key: update
    /// the status in place when a record for the day exists, create one
    /// otherwise. Marking twice with the same status leaves exactly one
    /// record with that status.
    pub fn mark(
        &mut self,
        student_id: StudentId,
        class_id: ClassId,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord, StoreError> {
        let existing = self
            .get_all()?
            .into_iter()
            .find(|r| r.student_id == student_id && r.class_id == class_id && r.date == date);

        match existing {
            Some(record) => self.update(record.id, json!({ "status": status })),
            None => self.create(json!({
                "studentId": student_id,
                "classId": class_id,
                "date": date,
                "status": status,
            })),
        }
    }
}

/// One open workspace: the five services sharing a backing store family.
pub struct Services {
    pub students: StudentService,
    pub classes: ClassService,
    pub enrollments: EnrollmentService,
    pub grades: GradeService,
    pub attendance: AttendanceService,
}

impl Services {
    pub fn in_memory(seeded: bool) -> Services {
        fn boxed<T: Record + 'static>(rows: Vec<T>) -> Box<dyn Repository<T>> {
            Box::new(MemoryStore::with_rows(rows))
        }

        if seeded {
            Services {
                students: StudentService::from_store(boxed(seed::students())),
                classes: ClassService::from_store(boxed(seed::classes())),
                enrollments: EnrollmentService::from_store(boxed(seed::enrollments())),
                grades: GradeService::from_store(boxed(seed::grades())),
                attendance: AttendanceService::from_store(boxed(seed::attendance())),
            }
        } else {
            Services {
                students: StudentService::from_store(boxed(Vec::new())),
                classes: ClassService::from_store(boxed(Vec::new())),
                enrollments: EnrollmentService::from_store(boxed(Vec::new())),
                grades: GradeService::from_store(boxed(Vec::new())),
                attendance: AttendanceService::from_store(boxed(Vec::new())),
            }
        }
    }

    pub fn open(workspace: &Path) -> Result<Services, StoreError> {
        std::fs::create_dir_all(workspace)
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let db_path = workspace.join("schooldesk.sqlite3");
        let conn = Rc::new(
            Connection::open(db_path).map_err(|e| StoreError::Transport(e.to_string()))?,
        );

        Ok(Services {
            students: StudentService::from_store(Box::new(SqliteStore::open(Rc::clone(&conn))?)),
            classes: ClassService::from_store(Box::new(SqliteStore::open(Rc::clone(&conn))?)),
            enrollments: EnrollmentService::from_store(Box::new(SqliteStore::open(Rc::clone(
                &conn,
            ))?)),
            grades: GradeService::from_store(Box::new(SqliteStore::open(Rc::clone(&conn))?)),
            attendance: AttendanceService::from_store(Box::new(SqliteStore::open(conn)?)),
        })
    }

    /// Derived view over the enrollment set: students enrolled in a class.
    pub fn students_in_class(&self, class_id: ClassId) -> Result<Vec<Student>, StoreError> {
        let links = self.enrollments.for_class(class_id)?;
        let students = self.students.get_all()?;
        Ok(students
            .into_iter()
            .filter(|s| links.iter().any(|e| e.student_id == s.id))
            .collect())
    }

    /// Derived view over the enrollment set: classes a student is enrolled in.
    pub fn classes_for_student(&self, student_id: StudentId) -> Result<Vec<Class>, StoreError> {
        let links = self.enrollments.for_student(student_id)?;
        let classes = self.classes.get_all()?;
        Ok(classes
            .into_iter()
            .filter(|c| links.iter().any(|e| e.class_id == c.id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).expect("valid test date")
    }

    fn empty() -> Services {
        Services::in_memory(false)
    }

    #[test]
    fn student_average_is_zero_without_grades() {
        let svc = empty();
        assert_eq!(
            svc.grades
                .student_average(StudentId(1), None)
                .expect("average"),
            0.0
        );
    }

    #[test]
    fn student_average_rounds_to_two_decimals() {
        let mut svc = empty();
        for (score, max) in [(45.0, 50.0), (20.0, 20.0), (1.0, 3.0)] {
            svc.grades
                .create(json!({
                    "studentId": 1,
                    "classId": 1,
                    "assignmentName": "Work",
                    "category": "homework",
                    "score": score,
                    "maxScore": max,
                    "date": day(3),
                }))
                .expect("create grade");
        }
        // (90 + 100 + 33.333..) / 3 = 74.444.. -> 74.44
        let avg = svc
            .grades
            .student_average(StudentId(1), None)
            .expect("average");
        assert_eq!(avg, 74.44);
    }

    #[test]
    fn attendance_rate_counts_present_and_excused() {
        let mut svc = empty();
        let statuses = ["present", "excused", "late", "absent"];
        for (i, status) in statuses.iter().enumerate() {
            svc.attendance
                .create(json!({
                    "studentId": 1,
                    "classId": 1,
                    "date": day(i as u32 + 1),
                    "status": status,
                }))
                .expect("create record");
        }
        assert_eq!(
            svc.attendance
                .attendance_rate(StudentId(1), None)
                .expect("rate"),
            50
        );
        assert_eq!(
            svc.attendance
                .attendance_rate(StudentId(2), None)
                .expect("rate"),
            0
        );
    }

    #[test]
    fn mark_upserts_on_the_day_key() {
        let mut svc = empty();
        let first = svc
            .attendance
            .mark(StudentId(1), ClassId(1), day(5), AttendanceStatus::Present)
            .expect("mark");
        let second = svc
            .attendance
            .mark(StudentId(1), ClassId(1), day(5), AttendanceStatus::Late)
            .expect("re-mark");
        assert_eq!(first.id, second.id);
        assert_eq!(second.status, AttendanceStatus::Late);

        let all = svc.attendance.get_all().expect("get_all");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, AttendanceStatus::Late);

        // Same status again: record count and status unchanged.
        svc.attendance
            .mark(StudentId(1), ClassId(1), day(5), AttendanceStatus::Late)
            .expect("idempotent mark");
        let all = svc.attendance.get_all().expect("get_all");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, AttendanceStatus::Late);

        // A different day is a different record.
        svc.attendance
            .mark(StudentId(1), ClassId(1), day(6), AttendanceStatus::Present)
            .expect("mark next day");
        assert_eq!(svc.attendance.get_all().expect("get_all").len(), 2);
    }

    #[test]
    fn date_range_is_inclusive() {
        let mut svc = empty();
        for d in [1, 5, 9] {
            svc.attendance
                .mark(StudentId(1), ClassId(1), day(d), AttendanceStatus::Present)
                .expect("mark");
        }
        let hits = svc
            .attendance
            .get_by_date_range(day(1), day(5))
            .expect("range");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn enroll_is_idempotent_and_withdraw_removes_the_link() {
        let mut svc = empty();
        let a = svc
            .enrollments
            .enroll(StudentId(1), ClassId(2))
            .expect("enroll");
        let b = svc
            .enrollments
            .enroll(StudentId(1), ClassId(2))
            .expect("re-enroll");
        assert_eq!(a, b);
        assert_eq!(svc.enrollments.list().expect("list").len(), 1);

        svc.enrollments
            .withdraw(StudentId(1), ClassId(2))
            .expect("withdraw");
        assert!(svc.enrollments.list().expect("list").is_empty());
        assert_eq!(
            svc.enrollments
                .withdraw(StudentId(1), ClassId(2))
                .unwrap_err(),
            StoreError::NotFound
        );
    }

    #[test]
    fn membership_views_come_from_the_enrollment_set() {
        let svc = Services::in_memory(true);
        let in_algebra = svc.students_in_class(ClassId(1)).expect("students");
        let ids: Vec<i64> = in_algebra.iter().map(|s| s.id.0).collect();
        assert_eq!(ids, vec![1, 2, 4]);

        let for_emma = svc.classes_for_student(StudentId(1)).expect("classes");
        let names: Vec<&str> = for_emma.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Algebra II", "Biology"]);

        // Dangling links resolve to nothing rather than failing.
        assert!(svc
            .students_in_class(ClassId(99))
            .expect("students")
            .is_empty());
    }
}
