use serde_json::Value;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{get_required_i64, to_json, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{ClassId, StudentId};
use crate::services::Services;

fn pair(params: &Value) -> Result<(StudentId, ClassId), HandlerErr> {
    Ok((
        StudentId(get_required_i64(params, "studentId")?),
        ClassId(get_required_i64(params, "classId")?),
    ))
}

fn list(services: &Services) -> Result<Value, HandlerErr> {
    to_json(&services.enrollments.list()?)
}

fn enroll(services: &mut Services, params: &Value) -> Result<Value, HandlerErr> {
    let (student_id, class_id) = pair(params)?;
    to_json(&services.enrollments.enroll(student_id, class_id)?)
}

fn withdraw(services: &mut Services, params: &Value) -> Result<Value, HandlerErr> {
    let (student_id, class_id) = pair(params)?;
    to_json(&services.enrollments.withdraw(student_id, class_id)?)
}

fn for_student(services: &Services, params: &Value) -> Result<Value, HandlerErr> {
    let student_id = StudentId(get_required_i64(params, "studentId")?);
    to_json(&services.classes_for_student(student_id)?)
}

fn for_class(services: &Services, params: &Value) -> Result<Value, HandlerErr> {
    let class_id = ClassId(get_required_i64(params, "classId")?);
    to_json(&services.students_in_class(class_id)?)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    if !req.method.starts_with("enrollment.") {
        return None;
    }
    let Some(services) = state.services.as_mut() else {
        return Some(err(&req.id, "no_workspace", "open a workspace first", None));
    };
    let result = match req.method.as_str() {
        "enrollment.list" => list(services),
        "enrollment.enroll" => enroll(services, &req.params),
        "enrollment.withdraw" => withdraw(services, &req.params),
        "enrollment.forStudent" => for_student(services, &req.params),
        "enrollment.forClass" => for_class(services, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
