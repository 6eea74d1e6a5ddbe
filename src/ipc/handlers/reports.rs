use serde_json::Value;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{get_optional_date, get_optional_i64, to_json, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::metrics;
use crate::model::ClassId;
use crate::services::Services;

/// The report view's load sequence: fetch the four collections, then run the
/// pure aggregation over them.
fn performance(services: &Services, params: &Value) -> Result<Value, HandlerErr> {
    let class_filter = get_optional_i64(params, "classId")?.map(ClassId);
    let students = services.students.get_all()?;
    let enrollments = services.enrollments.list()?;
    let grades = services.grades.get_all()?;
    let attendance = services.attendance.get_all()?;
    to_json(&metrics::performance_report(
        &students,
        &enrollments,
        &grades,
        &attendance,
        class_filter,
    ))
}

fn dashboard(services: &Services, params: &Value) -> Result<Value, HandlerErr> {
    let today = match get_optional_date(params, "today")? {
        Some(d) => d,
        None => chrono::Local::now().date_naive(),
    };
    let students = services.students.get_all()?;
    let classes = services.classes.get_all()?;
    let grades = services.grades.get_all()?;
    let attendance = services.attendance.get_all()?;
    to_json(&metrics::dashboard_summary(
        &students,
        &classes,
        &grades,
        &attendance,
        today,
    ))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    if !req.method.starts_with("reports.") {
        return None;
    }
    let Some(services) = state.services.as_ref() else {
        return Some(err(&req.id, "no_workspace", "open a workspace first", None));
    };
    let result = match req.method.as_str() {
        "reports.performance" => performance(services, &req.params),
        "reports.dashboard" => dashboard(services, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
