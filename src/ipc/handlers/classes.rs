use serde_json::Value;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{fields_of, get_required_i64, to_json, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::ClassId;
use crate::services::Services;

fn list(services: &Services) -> Result<Value, HandlerErr> {
    to_json(&services.classes.get_all()?)
}

fn get(services: &Services, params: &Value) -> Result<Value, HandlerErr> {
    let id = ClassId(get_required_i64(params, "id")?);
    to_json(&services.classes.get_by_id(id)?)
}

fn create(services: &mut Services, params: &Value) -> Result<Value, HandlerErr> {
    to_json(&services.classes.create(fields_of(params)?)?)
}

fn update(services: &mut Services, params: &Value) -> Result<Value, HandlerErr> {
    let id = ClassId(get_required_i64(params, "id")?);
    to_json(&services.classes.update(id, fields_of(params)?)?)
}

fn delete(services: &mut Services, params: &Value) -> Result<Value, HandlerErr> {
    let id = ClassId(get_required_i64(params, "id")?);
    to_json(&services.classes.delete(id)?)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    if !req.method.starts_with("classes.") {
        return None;
    }
    let Some(services) = state.services.as_mut() else {
        return Some(err(&req.id, "no_workspace", "open a workspace first", None));
    };
    let result = match req.method.as_str() {
        "classes.list" => list(services),
        "classes.get" => get(services, &req.params),
        "classes.create" => create(services, &req.params),
        "classes.update" => update(services, &req.params),
        "classes.delete" => delete(services, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
