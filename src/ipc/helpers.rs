use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::ipc::error::err;
use crate::store::StoreError;

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
}

impl HandlerErr {
    pub fn bad_params(message: impl Into<String>) -> Self {
        Self {
            code: "bad_params",
            message: message.into(),
        }
    }

    pub fn response(self, id: &str) -> Value {
        err(id, self.code, self.message, None)
    }
}

impl From<StoreError> for HandlerErr {
    fn from(e: StoreError) -> Self {
        if matches!(e, StoreError::Transport(_)) {
            tracing::warn!(error = %e, "store operation failed");
        }
        Self {
            code: e.code(),
            message: e.to_string(),
        }
    }
}

pub fn get_required_i64(params: &Value, key: &str) -> Result<i64, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_optional_i64(params: &Value, key: &str) -> Result<Option<i64>, HandlerErr> {
    match params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| HandlerErr::bad_params(format!("{} must be an integer", key))),
    }
}

pub fn get_required_date(params: &Value, key: &str) -> Result<NaiveDate, HandlerErr> {
    let raw = params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))?;
    raw.parse::<NaiveDate>()
        .map_err(|_| HandlerErr::bad_params(format!("{} must be YYYY-MM-DD", key)))
}

pub fn get_optional_date(params: &Value, key: &str) -> Result<Option<NaiveDate>, HandlerErr> {
    match params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => {
            let raw = v
                .as_str()
                .ok_or_else(|| HandlerErr::bad_params(format!("{} must be YYYY-MM-DD", key)))?;
            raw.parse::<NaiveDate>()
                .map(Some)
                .map_err(|_| HandlerErr::bad_params(format!("{} must be YYYY-MM-DD", key)))
        }
    }
}

/// Decode one typed param (enum statuses and the like).
pub fn get_required<T: DeserializeOwned>(params: &Value, key: &str) -> Result<T, HandlerErr> {
    let raw = params
        .get(key)
        .cloned()
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))?;
    serde_json::from_value(raw)
        .map_err(|e| HandlerErr::bad_params(format!("bad {}: {}", key, e)))
}

pub fn get_optional<T: DeserializeOwned>(params: &Value, key: &str) -> Result<Option<T>, HandlerErr> {
    match params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|e| HandlerErr::bad_params(format!("bad {}: {}", key, e))),
    }
}

/// The field set for create/update calls.
pub fn fields_of(params: &Value) -> Result<Value, HandlerErr> {
    let fields = params
        .get("fields")
        .ok_or_else(|| HandlerErr::bad_params("missing fields"))?;
    if !fields.is_object() {
        return Err(HandlerErr::bad_params("fields must be an object"));
    }
    Ok(fields.clone())
}

pub fn to_json<T: Serialize>(value: &T) -> Result<Value, HandlerErr> {
    serde_json::to_value(value).map_err(|e| HandlerErr {
        code: "encode_failed",
        message: e.to_string(),
    })
}
