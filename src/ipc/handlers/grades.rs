use serde_json::{json, Value};

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{fields_of, get_optional_i64, get_required_i64, to_json, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{ClassId, GradeId, StudentId};
use crate::services::Services;

fn list(services: &Services) -> Result<Value, HandlerErr> {
    to_json(&services.grades.get_all()?)
}

fn get(services: &Services, params: &Value) -> Result<Value, HandlerErr> {
    let id = GradeId(get_required_i64(params, "id")?);
    to_json(&services.grades.get_by_id(id)?)
}

fn create(services: &mut Services, params: &Value) -> Result<Value, HandlerErr> {
    to_json(&services.grades.create(fields_of(params)?)?)
}

fn update(services: &mut Services, params: &Value) -> Result<Value, HandlerErr> {
    let id = GradeId(get_required_i64(params, "id")?);
    to_json(&services.grades.update(id, fields_of(params)?)?)
}

fn delete(services: &mut Services, params: &Value) -> Result<Value, HandlerErr> {
    let id = GradeId(get_required_i64(params, "id")?);
    to_json(&services.grades.delete(id)?)
}

fn by_student(services: &Services, params: &Value) -> Result<Value, HandlerErr> {
    let student_id = StudentId(get_required_i64(params, "studentId")?);
    to_json(&services.grades.get_by_student_id(student_id)?)
}

fn by_class(services: &Services, params: &Value) -> Result<Value, HandlerErr> {
    let class_id = ClassId(get_required_i64(params, "classId")?);
    to_json(&services.grades.get_by_class_id(class_id)?)
}

fn student_average(services: &Services, params: &Value) -> Result<Value, HandlerErr> {
    let student_id = StudentId(get_required_i64(params, "studentId")?);
    let class_id = get_optional_i64(params, "classId")?.map(ClassId);
    let average = services.grades.student_average(student_id, class_id)?;
    Ok(json!({ "average": average }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    if !req.method.starts_with("grades.") {
        return None;
    }
    let Some(services) = state.services.as_mut() else {
        return Some(err(&req.id, "no_workspace", "open a workspace first", None));
    };
    let result = match req.method.as_str() {
        "grades.list" => list(services),
        "grades.get" => get(services, &req.params),
        "grades.create" => create(services, &req.params),
        "grades.update" => update(services, &req.params),
        "grades.delete" => delete(services, &req.params),
        "grades.byStudent" => by_student(services, &req.params),
        "grades.byClass" => by_class(services, &req.params),
        "grades.studentAverage" => student_average(services, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
