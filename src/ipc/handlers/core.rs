use std::path::PathBuf;

use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request, WorkspaceKind};
use crate::services::Services;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    let workspace = state.workspace.as_ref().map(|kind| match kind {
        WorkspaceKind::Memory => json!({ "kind": "memory" }),
        WorkspaceKind::Sqlite(path) => json!({
            "kind": "sqlite",
            "path": path.to_string_lossy(),
        }),
    });
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspace": workspace,
        }),
    )
}

fn handle_open_memory(state: &mut AppState, req: &Request) -> serde_json::Value {
    let seeded = req
        .params
        .get("seed")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    state.services = Some(Services::in_memory(seeded));
    state.workspace = Some(WorkspaceKind::Memory);
    tracing::info!(seeded, "opened in-memory workspace");
    ok(&req.id, json!({ "kind": "memory", "seeded": seeded }))
}

fn handle_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = path else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match Services::open(&path) {
        Ok(services) => {
            state.services = Some(services);
            state.workspace = Some(WorkspaceKind::Sqlite(path.clone()));
            tracing::info!(path = %path.display(), "opened sqlite workspace");
            ok(
                &req.id,
                json!({ "kind": "sqlite", "path": path.to_string_lossy() }),
            )
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "workspace open failed");
            err(&req.id, e.code(), e.to_string(), None)
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.openMemory" => Some(handle_open_memory(state, req)),
        "workspace.open" => Some(handle_open(state, req)),
        _ => None,
    }
}
