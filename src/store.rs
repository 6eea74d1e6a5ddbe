use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// A stored entity kind: a named collection of records with an integer id.
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Collection/table name for this kind.
    const KIND: &'static str;
    fn id(&self) -> i64;
}

/// Tagged store failure. Callers can tell "the record is not there" apart
/// from "the store call itself failed" and "the field set does not form a
/// valid record".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    NotFound,
    Transport(String),
    Validation(String),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound => "not_found",
            StoreError::Transport(_) => "store_failed",
            StoreError::Validation(_) => "invalid_record",
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "record not found"),
            StoreError::Transport(msg) => write!(f, "store failed: {}", msg),
            StoreError::Validation(msg) => write!(f, "invalid record: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Storage-agnostic repository for one record kind. Services take this as a
/// boxed trait object so the in-memory and SQLite backends swap freely.
///
/// Contract notes:
/// - `create` assigns `max(existing id) + 1` (1 when empty) and ignores any
///   caller-provided id.
/// - `update` is a shallow merge: provided fields overwrite, omitted fields
///   keep their prior value, and the id can never be patched.
/// - Iteration order is insertion order.
pub trait Repository<T: Record> {
    fn get_all(&self) -> Result<Vec<T>, StoreError>;
    fn get_by_id(&self, id: i64) -> Result<T, StoreError>;
    fn create(&mut self, fields: Value) -> Result<T, StoreError>;
    fn update(&mut self, id: i64, patch: Value) -> Result<T, StoreError>;
    fn delete(&mut self, id: i64) -> Result<T, StoreError>;
}

fn as_object(fields: Value) -> Result<Map<String, Value>, StoreError> {
    match fields {
        Value::Object(obj) => Ok(obj),
        other => Err(StoreError::Validation(format!(
            "expected an object of fields, got {}",
            other
        ))),
    }
}

/// Decode caller-supplied fields; failure is the caller's problem.
fn decode_new<T: Record>(body: Value) -> Result<T, StoreError> {
    serde_json::from_value(body).map_err(|e| StoreError::Validation(e.to_string()))
}

/// Decode a body we previously stored; failure means a corrupt store.
fn decode_stored<T: Record>(body: Value) -> Result<T, StoreError> {
    serde_json::from_value(body).map_err(|e| StoreError::Transport(e.to_string()))
}

fn merge_patch(existing: &Value, patch: Value, id: i64) -> Result<Value, StoreError> {
    let Value::Object(base) = existing else {
        return Err(StoreError::Transport("stored record is not an object".into()));
    };
    let mut merged = base.clone();
    for (key, value) in as_object(patch)? {
        if key != "id" {
            merged.insert(key, value);
        }
    }
    merged.insert("id".to_string(), Value::from(id));
    Ok(Value::Object(merged))
}

fn encode<T: Record>(record: &T) -> Result<Value, StoreError> {
    serde_json::to_value(record).map_err(|e| StoreError::Transport(e.to_string()))
}

/// Vec-backed store; the default for tests and for seeded demo workspaces.
pub struct MemoryStore<T> {
    rows: Vec<T>,
}

impl<T: Record> MemoryStore<T> {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn with_rows(rows: Vec<T>) -> Self {
        Self { rows }
    }

    fn next_id(&self) -> i64 {
        self.rows.iter().map(|r| r.id()).max().unwrap_or(0) + 1
    }

    fn position(&self, id: i64) -> Option<usize> {
        self.rows.iter().position(|r| r.id() == id)
    }
}

impl<T: Record> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Repository<T> for MemoryStore<T> {
    fn get_all(&self) -> Result<Vec<T>, StoreError> {
        Ok(self.rows.clone())
    }

    fn get_by_id(&self, id: i64) -> Result<T, StoreError> {
        self.rows
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn create(&mut self, fields: Value) -> Result<T, StoreError> {
        let mut obj = as_object(fields)?;
        obj.insert("id".to_string(), Value::from(self.next_id()));
        let record = decode_new::<T>(Value::Object(obj))?;
        self.rows.push(record.clone());
        Ok(record)
    }

    fn update(&mut self, id: i64, patch: Value) -> Result<T, StoreError> {
        let idx = self.position(id).ok_or(StoreError::NotFound)?;
        let body = encode(&self.rows[idx])?;
        let merged = merge_patch(&body, patch, id)?;
        let record = decode_new::<T>(merged)?;
        self.rows[idx] = record.clone();
        Ok(record)
    }

    fn delete(&mut self, id: i64) -> Result<T, StoreError> {
        let idx = self.position(id).ok_or(StoreError::NotFound)?;
        Ok(self.rows.remove(idx))
    }
}

/// SQLite-backed store. One table per kind, record bodies as JSON documents;
/// ids are assigned by the same max+1 rule as the memory store, which keeps
/// id order equal to insertion order.
pub struct SqliteStore<T> {
    conn: Rc<Connection>,
    _kind: PhantomData<T>,
}

fn transport(e: rusqlite::Error) -> StoreError {
    StoreError::Transport(e.to_string())
}

impl<T: Record> SqliteStore<T> {
    pub fn open(conn: Rc<Connection>) -> Result<Self, StoreError> {
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {}(
                    id INTEGER PRIMARY KEY,
                    body TEXT NOT NULL
                )",
                T::KIND
            ),
            [],
        )
        .map_err(transport)?;
        Ok(Self {
            conn,
            _kind: PhantomData,
        })
    }

    fn body_of(&self, id: i64) -> Result<Value, StoreError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                &format!("SELECT body FROM {} WHERE id = ?", T::KIND),
                [id],
                |r| r.get(0),
            )
            .optional()
            .map_err(transport)?;
        let raw = raw.ok_or(StoreError::NotFound)?;
        serde_json::from_str(&raw).map_err(|e| StoreError::Transport(e.to_string()))
    }

    fn write_body(&self, id: i64, body: &Value) -> Result<(), StoreError> {
        self.conn
            .execute(
                &format!(
                    "INSERT INTO {}(id, body) VALUES(?, ?)
                     ON CONFLICT(id) DO UPDATE SET body = excluded.body",
                    T::KIND
                ),
                (id, body.to_string()),
            )
            .map_err(transport)?;
        Ok(())
    }
}

impl<T: Record> Repository<T> for SqliteStore<T> {
    fn get_all(&self) -> Result<Vec<T>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT body FROM {} ORDER BY id", T::KIND))
            .map_err(transport)?;
        let bodies = stmt
            .query_map([], |r| r.get::<_, String>(0))
            .and_then(|it| it.collect::<Result<Vec<_>, _>>())
            .map_err(transport)?;
        bodies
            .into_iter()
            .map(|raw| {
                let body: Value = serde_json::from_str(&raw)
                    .map_err(|e| StoreError::Transport(e.to_string()))?;
                decode_stored::<T>(body)
            })
            .collect()
    }

    fn get_by_id(&self, id: i64) -> Result<T, StoreError> {
        decode_stored::<T>(self.body_of(id)?)
    }

    fn create(&mut self, fields: Value) -> Result<T, StoreError> {
        let next_id: i64 = self
            .conn
            .query_row(
                &format!("SELECT COALESCE(MAX(id), 0) + 1 FROM {}", T::KIND),
                [],
                |r| r.get(0),
            )
            .map_err(transport)?;
        let mut obj = as_object(fields)?;
        obj.insert("id".to_string(), Value::from(next_id));
        let record = decode_new::<T>(Value::Object(obj))?;
        self.write_body(next_id, &encode(&record)?)?;
        Ok(record)
    }

    fn update(&mut self, id: i64, patch: Value) -> Result<T, StoreError> {
        let body = self.body_of(id)?;
        let merged = merge_patch(&body, patch, id)?;
        let record = decode_new::<T>(merged)?;
        self.write_body(id, &encode(&record)?)?;
        Ok(record)
    }

    fn delete(&mut self, id: i64) -> Result<T, StoreError> {
        let record = decode_stored::<T>(self.body_of(id)?);
        self.conn
            .execute(&format!("DELETE FROM {} WHERE id = ?", T::KIND), [id])
            .map_err(transport)?;
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Class, ClassId};
    use serde_json::json;

    fn class_fields(name: &str) -> Value {
        json!({
            "name": name,
            "subject": "Math",
            "period": "1",
            "room": "101"
        })
    }

    #[test]
    fn create_assigns_max_plus_one() {
        let mut store: MemoryStore<Class> = MemoryStore::new();
        let a = store.create(class_fields("Algebra")).expect("create");
        let b = store.create(class_fields("Biology")).expect("create");
        assert_eq!(a.id, ClassId(1));
        assert_eq!(b.id, ClassId(2));

        store.delete(1).expect("delete");
        let c = store.create(class_fields("Chemistry")).expect("create");
        assert_eq!(c.id, ClassId(3));
    }

    #[test]
    fn create_ignores_caller_supplied_id() {
        let mut store: MemoryStore<Class> = MemoryStore::new();
        let mut fields = class_fields("Algebra");
        fields["id"] = json!(99);
        let created = store.create(fields).expect("create");
        assert_eq!(created.id, ClassId(1));
    }

    #[test]
    fn update_merges_only_provided_fields() {
        let mut store: MemoryStore<Class> = MemoryStore::new();
        let created = store.create(class_fields("Algebra")).expect("create");
        let updated = store
            .update(created.id.0, json!({ "room": "202" }))
            .expect("update");
        assert_eq!(updated.room, "202");
        assert_eq!(updated.name, "Algebra");
        assert_eq!(updated.subject, "Math");
    }

    #[test]
    fn update_cannot_patch_the_id() {
        let mut store: MemoryStore<Class> = MemoryStore::new();
        let created = store.create(class_fields("Algebra")).expect("create");
        let updated = store
            .update(created.id.0, json!({ "id": 42, "room": "202" }))
            .expect("update");
        assert_eq!(updated.id, created.id);
        assert_eq!(store.get_by_id(created.id.0).expect("get").room, "202");
    }

    #[test]
    fn missing_id_is_not_found() {
        let mut store: MemoryStore<Class> = MemoryStore::new();
        assert_eq!(store.get_by_id(7).unwrap_err(), StoreError::NotFound);
        assert_eq!(
            store.update(7, json!({})).unwrap_err(),
            StoreError::NotFound
        );
        assert_eq!(store.delete(7).unwrap_err(), StoreError::NotFound);
    }

    #[test]
    fn malformed_fields_are_a_validation_failure() {
        let mut store: MemoryStore<Class> = MemoryStore::new();
        let err = store
            .create(json!({ "name": "Algebra" }))
            .expect_err("missing fields must not store garbage");
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.get_all().expect("get_all").is_empty());
    }

    #[test]
    fn delete_preserves_remaining_order() {
        let mut store: MemoryStore<Class> = MemoryStore::new();
        for name in ["A", "B", "C"] {
            store.create(class_fields(name)).expect("create");
        }
        store.delete(2).expect("delete");
        let names: Vec<String> = store
            .get_all()
            .expect("get_all")
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn sqlite_store_round_trips_and_orders_by_insertion() {
        let conn = Rc::new(Connection::open_in_memory().expect("open sqlite"));
        let mut store: SqliteStore<Class> = SqliteStore::open(conn).expect("open store");
        let a = store.create(class_fields("Algebra")).expect("create");
        let b = store.create(class_fields("Biology")).expect("create");
        store
            .update(a.id.0, json!({ "room": "305" }))
            .expect("update");

        let all = store.get_all().expect("get_all");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Algebra");
        assert_eq!(all[0].room, "305");
        assert_eq!(all[1].id, b.id);

        let removed = store.delete(a.id.0).expect("delete");
        assert_eq!(removed.room, "305");
        assert_eq!(store.get_by_id(a.id.0).unwrap_err(), StoreError::NotFound);
    }
}
