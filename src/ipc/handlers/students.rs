use serde_json::Value;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{fields_of, get_required_i64, to_json, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{ClassId, StudentId};
use crate::services::Services;

fn list(services: &Services) -> Result<Value, HandlerErr> {
    to_json(&services.students.get_all()?)
}

fn get(services: &Services, params: &Value) -> Result<Value, HandlerErr> {
    let id = StudentId(get_required_i64(params, "id")?);
    to_json(&services.students.get_by_id(id)?)
}

fn create(services: &mut Services, params: &Value) -> Result<Value, HandlerErr> {
    to_json(&services.students.create(fields_of(params)?)?)
}

fn update(services: &mut Services, params: &Value) -> Result<Value, HandlerErr> {
    let id = StudentId(get_required_i64(params, "id")?);
    to_json(&services.students.update(id, fields_of(params)?)?)
}

fn delete(services: &mut Services, params: &Value) -> Result<Value, HandlerErr> {
    let id = StudentId(get_required_i64(params, "id")?);
    to_json(&services.students.delete(id)?)
}

fn by_class(services: &Services, params: &Value) -> Result<Value, HandlerErr> {
    let class_id = ClassId(get_required_i64(params, "classId")?);
    to_json(&services.students_in_class(class_id)?)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    if !req.method.starts_with("students.") {
        return None;
    }
    let Some(services) = state.services.as_mut() else {
        return Some(err(&req.id, "no_workspace", "open a workspace first", None));
    };
    let result = match req.method.as_str() {
        "students.list" => list(services),
        "students.get" => get(services, &req.params),
        "students.create" => create(services, &req.params),
        "students.update" => update(services, &req.params),
        "students.delete" => delete(services, &req.params),
        "students.byClass" => by_class(services, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
