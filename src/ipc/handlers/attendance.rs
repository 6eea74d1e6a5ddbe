use serde_json::{json, Value};

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{
    fields_of, get_optional, get_optional_i64, get_required, get_required_date, get_required_i64,
    to_json, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::metrics;
use crate::model::{AttendanceId, AttendanceStatus, ClassId, StudentId};
use crate::services::Services;

fn list(services: &Services) -> Result<Value, HandlerErr> {
    to_json(&services.attendance.get_all()?)
}

fn get(services: &Services, params: &Value) -> Result<Value, HandlerErr> {
    let id = AttendanceId(get_required_i64(params, "id")?);
    to_json(&services.attendance.get_by_id(id)?)
}

fn create(services: &mut Services, params: &Value) -> Result<Value, HandlerErr> {
    to_json(&services.attendance.create(fields_of(params)?)?)
}

fn update(services: &mut Services, params: &Value) -> Result<Value, HandlerErr> {
    let id = AttendanceId(get_required_i64(params, "id")?);
    to_json(&services.attendance.update(id, fields_of(params)?)?)
}

fn delete(services: &mut Services, params: &Value) -> Result<Value, HandlerErr> {
    let id = AttendanceId(get_required_i64(params, "id")?);
    to_json(&services.attendance.delete(id)?)
}

fn by_student(services: &Services, params: &Value) -> Result<Value, HandlerErr> {
    let student_id = StudentId(get_required_i64(params, "studentId")?);
    to_json(&services.attendance.get_by_student_id(student_id)?)
}

fn by_class(services: &Services, params: &Value) -> Result<Value, HandlerErr> {
    let class_id = ClassId(get_required_i64(params, "classId")?);
    to_json(&services.attendance.get_by_class_id(class_id)?)
}

fn by_range(services: &Services, params: &Value) -> Result<Value, HandlerErr> {
    let start = get_required_date(params, "start")?;
    let end = get_required_date(params, "end")?;
    to_json(&services.attendance.get_by_date_range(start, end)?)
}

fn mark(services: &mut Services, params: &Value) -> Result<Value, HandlerErr> {
    let student_id = StudentId(get_required_i64(params, "studentId")?);
    let class_id = ClassId(get_required_i64(params, "classId")?);
    let date = get_required_date(params, "date")?;
    let status: AttendanceStatus = get_required(params, "status")?;
    to_json(&services.attendance.mark(student_id, class_id, date, status)?)
}

fn rate(services: &Services, params: &Value) -> Result<Value, HandlerErr> {
    let student_id = StudentId(get_required_i64(params, "studentId")?);
    let class_id = get_optional_i64(params, "classId")?.map(ClassId);
    let rate = services.attendance.attendance_rate(student_id, class_id)?;
    Ok(json!({ "rate": rate }))
}

fn next_status(params: &Value) -> Result<Value, HandlerErr> {
    let current: Option<AttendanceStatus> = get_optional(params, "status")?;
    Ok(json!({ "status": metrics::next_attendance_status(current) }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    if !req.method.starts_with("attendance.") {
        return None;
    }
    // The status cycle is pure; no workspace needed.
    if req.method == "attendance.nextStatus" {
        return Some(match next_status(&req.params) {
            Ok(value) => ok(&req.id, value),
            Err(e) => e.response(&req.id),
        });
    }
    let Some(services) = state.services.as_mut() else {
        return Some(err(&req.id, "no_workspace", "open a workspace first", None));
    };
    let result = match req.method.as_str() {
        "attendance.list" => list(services),
        "attendance.get" => get(services, &req.params),
        "attendance.create" => create(services, &req.params),
        "attendance.update" => update(services, &req.params),
        "attendance.delete" => delete(services, &req.params),
        "attendance.byStudent" => by_student(services, &req.params),
        "attendance.byClass" => by_class(services, &req.params),
        "attendance.byRange" => by_range(services, &req.params),
        "attendance.mark" => mark(services, &req.params),
        "attendance.rate" => rate(services, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
