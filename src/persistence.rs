use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::models::Task;

/// Key under which the whole task collection is stored
pub const TASKS_KEY: &str = "todoTasks";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create storage directory: {0}")]
    DirectoryError(String),
    #[error("Failed to encode tasks: {0}")]
    EncodeError(#[source] serde_json::Error),
    #[error("Stored tasks could not be decoded: {0}")]
    DecodeError(#[source] serde_json::Error),
}

/// Minimal string key-value storage, the equivalent of a browser's local storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

/// Serialize tasks to the stored JSON array (timestamps as RFC 3339 strings)
pub fn encode_tasks(tasks: &[Task]) -> Result<String, PersistenceError> {
    serde_json::to_string(tasks).map_err(PersistenceError::EncodeError)
}

/// Parse the stored JSON array back into tasks
pub fn decode_tasks(json: &str) -> Result<Vec<Task>, PersistenceError> {
    serde_json::from_str(json).map_err(PersistenceError::DecodeError)
}

/// SQLite-backed key-value table
pub struct SqliteKeyValue {
    conn: Connection,
}

impl SqliteKeyValue {
    /// Open (or create) the database file and initialize the schema
    pub fn new(path: &Path) -> Result<Self, PersistenceError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| PersistenceError::DirectoryError(e.to_string()))?;
            }
        }

        let conn = Connection::open(path)?;
        let kv = SqliteKeyValue { conn };
        kv.initialize_schema()?;
        Ok(kv)
    }

    /// In-memory database, nothing survives the connection
    pub fn open_in_memory() -> Result<Self, PersistenceError> {
        let kv = SqliteKeyValue {
            conn: Connection::open_in_memory()?,
        };
        kv.initialize_schema()?;
        Ok(kv)
    }

    fn initialize_schema(&self) -> Result<(), PersistenceError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key             TEXT PRIMARY KEY,
                value           TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }
}

impl KeyValueStore for SqliteKeyValue {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let now = chrono::Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, value, now],
        )?;
        Ok(())
    }
}

/// Process-local store for tests and headless use
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValue {
    entries: HashMap<String, String>,
}

impl MemoryKeyValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut kv = Self::new();
        kv.entries.insert(key.to_string(), value.to_string());
        kv
    }
}

impl KeyValueStore for MemoryKeyValue {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, Status, TaskDraft};
    use crate::utils::parse_date;
    use chrono::Utc;

    fn sample_tasks() -> Vec<Task> {
        let now = Utc::now();
        let mut first = Task::new(
            TaskDraft {
                title: "Buy Milk".to_string(),
                description: "two litres".to_string(),
                due_date: Some(parse_date("2024-01-01").unwrap()),
                priority: Priority::Low,
            }
            .validate()
            .unwrap(),
            now,
        );
        first.status = Status::Completed;
        first.touch(now + chrono::Duration::milliseconds(1500));
        let second = Task::new(
            TaskDraft {
                title: "File taxes".to_string(),
                description: String::new(),
                due_date: Some(parse_date("2024-04-15").unwrap()),
                priority: Priority::High,
            }
            .validate()
            .unwrap(),
            now,
        );
        vec![first, second]
    }

    #[test]
    fn tasks_round_trip_through_json() {
        let tasks = sample_tasks();
        let json = encode_tasks(&tasks).unwrap();
        assert_eq!(decode_tasks(&json).unwrap(), tasks);
    }

    #[test]
    fn decodes_records_written_by_other_clients() {
        let json = r#"[{
            "id": "8f14e45f-ceea-467f-a0e6-2b4c4a1e0e8d",
            "title": "Water plants",
            "description": "",
            "dueDate": "2024-06-01",
            "priority": "medium",
            "status": "open",
            "createdAt": "2024-05-30T08:15:00.000Z",
            "updatedAt": "2024-05-30T09:00:00.000Z"
        }]"#;
        let tasks = decode_tasks(json).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].priority, Priority::Medium);
        assert_eq!(tasks[0].updated_at.to_rfc3339(), "2024-05-30T09:00:00+00:00");
    }

    #[test]
    fn rejects_corrupt_payloads() {
        assert!(matches!(decode_tasks("not json"), Err(PersistenceError::DecodeError(_))));
        let bad_date = r#"[{"id":"8f14e45f-ceea-467f-a0e6-2b4c4a1e0e8d","title":"x","dueDate":"tomorrow",
            "priority":"low","createdAt":"2024-05-30T08:15:00Z","updatedAt":"2024-05-30T08:15:00Z"}]"#;
        assert!(decode_tasks(bad_date).is_err());
    }

    #[test]
    fn sqlite_store_overwrites_values() {
        let mut kv = SqliteKeyValue::open_in_memory().unwrap();
        assert_eq!(kv.get(TASKS_KEY).unwrap(), None);
        kv.set(TASKS_KEY, "[]").unwrap();
        kv.set(TASKS_KEY, "[1]").unwrap();
        assert_eq!(kv.get(TASKS_KEY).unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn sqlite_store_persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tasks.db");
        {
            let mut kv = SqliteKeyValue::new(&path).unwrap();
            kv.set(TASKS_KEY, &encode_tasks(&sample_tasks()).unwrap()).unwrap();
        }
        let kv = SqliteKeyValue::new(&path).unwrap();
        let stored = kv.get(TASKS_KEY).unwrap().unwrap();
        assert_eq!(decode_tasks(&stored).unwrap().len(), 2);
    }
}
