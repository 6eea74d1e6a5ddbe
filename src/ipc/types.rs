use std::path::PathBuf;

use serde::Deserialize;

use crate::services::Services;

#[derive(Debug, Deserialize)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceKind {
    Memory,
    Sqlite(PathBuf),
}

#[derive(Default)]
pub struct AppState {
    pub services: Option<Services>,
    pub workspace: Option<WorkspaceKind>,
}
