use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::Path;

const MIGRATION_SQL_0001: &str = include_str!("../migrations/0001_progress.sql");

/// String-keyed, string-valued durable storage.
pub trait KeyValueStore {
  fn get(&self, key: &str) -> Result<Option<String>, String>;
  fn set(&mut self, key: &str, value: &str) -> Result<(), String>;
  fn remove(&mut self, key: &str) -> Result<(), String>;
}

fn now_iso() -> String {
  Utc::now().to_rfc3339()
}

pub struct SqliteStore {
  connection: Connection,
}

impl SqliteStore {
  pub fn open(db_path: &Path) -> Result<Self, String> {
    if let Some(parent) = db_path.parent() {
      fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    let connection = Connection::open(db_path).map_err(|e| e.to_string())?;
    Self::init(connection)
  }

  pub fn in_memory() -> Result<Self, String> {
    let connection = Connection::open_in_memory().map_err(|e| e.to_string())?;
    Self::init(connection)
  }

  fn init(connection: Connection) -> Result<Self, String> {
    connection
      .execute_batch(MIGRATION_SQL_0001)
      .map_err(|e| e.to_string())?;
    Ok(SqliteStore { connection })
  }
}

impl KeyValueStore for SqliteStore {
  fn get(&self, key: &str) -> Result<Option<String>, String> {
    self
      .connection
      .query_row(
        "SELECT value FROM progress_entries WHERE key = ?1 LIMIT 1",
        params![key],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| e.to_string())
  }

  fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
    self
      .connection
      .execute(
        "INSERT INTO progress_entries (key, value, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET
           value = excluded.value,
           updated_at = excluded.updated_at",
        params![key, value, now_iso()],
      )
      .map_err(|e| e.to_string())?;
    Ok(())
  }

  fn remove(&mut self, key: &str) -> Result<(), String> {
    self
      .connection
      .execute("DELETE FROM progress_entries WHERE key = ?1", params![key])
      .map_err(|e| e.to_string())?;
    Ok(())
  }
}
