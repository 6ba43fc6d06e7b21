//! Cache storage trait and SQLite implementation.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::error::{OfflineError, Result};
use super::request::{RequestKey, Response};

/// A stored response and when it was written.
#[derive(Debug, Clone)]
pub struct CachedResponse {
  pub response: Response,
  pub cached_at: DateTime<Utc>,
}

/// Trait for cache storage backends.
///
/// Storage is split into named generations. Every write is atomic per entry;
/// `put_all` is atomic for the whole batch.
pub trait CacheStorage: Send + Sync {
  /// Names of every generation present.
  fn generations(&self) -> Result<Vec<String>>;

  /// Delete a generation and all its entries. Returns false if it did not exist.
  fn delete(&self, generation: &str) -> Result<bool>;

  /// Get the stored response for a request identity.
  fn lookup(&self, generation: &str, key: &RequestKey) -> Result<Option<CachedResponse>>;

  /// Store one response, replacing any previous entry. Creates the generation.
  fn put(&self, generation: &str, key: &RequestKey, response: &Response) -> Result<()>;

  /// Store a batch of responses, all or nothing. Creates the generation.
  fn put_all(&self, generation: &str, entries: &[(RequestKey, Response)]) -> Result<()>;

  /// Number of entries in a generation (0 if it does not exist).
  fn entry_count(&self, generation: &str) -> Result<usize>;
}

/// SQLite-based cache storage implementation.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Open (or create) the cache database at `path`.
  pub fn open(path: &Path) -> Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).map_err(|e| {
        OfflineError::storage(format!("failed to create cache directory: {}", e))
      })?;
    }

    let conn = Connection::open(path).map_err(|e| {
      OfflineError::storage(format!(
        "failed to open cache database at {}: {}",
        path.display(),
        e
      ))
    })?;

    Self::with_connection(conn)
  }

  #[cfg(test)]
  pub fn open_in_memory() -> Result<Self> {
    Self::with_connection(Connection::open_in_memory()?)
  }

  fn with_connection(conn: Connection) -> Result<Self> {
    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| OfflineError::storage(format!("failed to run cache migrations: {}", e)))?;

    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  /// Get the default database path.
  pub fn default_path() -> Option<PathBuf> {
    dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .map(|dir| dir.join("vitrine").join("offline.db"))
  }

  fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
    self
      .conn
      .lock()
      .map_err(|e| OfflineError::storage(format!("lock poisoned: {}", e)))
  }
}

/// Schema for cache tables.
const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS cache_generations (
    name TEXT PRIMARY KEY,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS cache_entries (
    generation TEXT NOT NULL,
    key_hash TEXT NOT NULL,
    method TEXT NOT NULL,
    url TEXT NOT NULL,
    status INTEGER NOT NULL,
    status_text TEXT NOT NULL,
    headers TEXT NOT NULL,
    body BLOB NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (generation, key_hash)
);
"#;

fn insert_entry(
  conn: &Connection,
  generation: &str,
  key: &RequestKey,
  response: &Response,
) -> Result<()> {
  let headers = serde_json::to_string(&response.headers)
    .map_err(|e| OfflineError::storage(format!("failed to serialize headers: {}", e)))?;

  conn.execute(
    "INSERT OR REPLACE INTO cache_entries
       (generation, key_hash, method, url, status, status_text, headers, body, cached_at)
     VALUES (?, ?, ?, ?, ?, ?, ?, ?, datetime('now'))",
    params![
      generation,
      key.cache_hash(),
      key.method(),
      key.url(),
      response.status,
      response.status_text,
      headers,
      response.body,
    ],
  )?;

  Ok(())
}

fn ensure_generation(conn: &Connection, generation: &str) -> Result<()> {
  conn.execute(
    "INSERT OR IGNORE INTO cache_generations (name) VALUES (?)",
    params![generation],
  )?;
  Ok(())
}

impl CacheStorage for SqliteStorage {
  fn generations(&self) -> Result<Vec<String>> {
    let conn = self.conn()?;
    let mut stmt = conn.prepare("SELECT name FROM cache_generations ORDER BY created_at, name")?;
    let names = stmt
      .query_map([], |row| row.get(0))?
      .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(names)
  }

  fn delete(&self, generation: &str) -> Result<bool> {
    let mut conn = self.conn()?;
    let tx = conn.transaction()?;

    tx.execute(
      "DELETE FROM cache_entries WHERE generation = ?",
      params![generation],
    )?;
    let removed = tx.execute(
      "DELETE FROM cache_generations WHERE name = ?",
      params![generation],
    )?;

    tx.commit()?;
    Ok(removed > 0)
  }

  fn lookup(&self, generation: &str, key: &RequestKey) -> Result<Option<CachedResponse>> {
    let conn = self.conn()?;

    let row: Option<(u16, String, String, Vec<u8>, String)> = conn
      .query_row(
        "SELECT status, status_text, headers, body, cached_at FROM cache_entries
         WHERE generation = ? AND key_hash = ?",
        params![generation, key.cache_hash()],
        |row| {
          Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
          ))
        },
      )
      .optional()?;

    let Some((status, status_text, headers, body, cached_at)) = row else {
      return Ok(None);
    };

    let headers = serde_json::from_str(&headers)
      .map_err(|e| OfflineError::storage(format!("failed to parse stored headers: {}", e)))?;

    Ok(Some(CachedResponse {
      response: Response {
        status,
        status_text,
        headers,
        body,
      },
      cached_at: parse_datetime(&cached_at)?,
    }))
  }

  fn put(&self, generation: &str, key: &RequestKey, response: &Response) -> Result<()> {
    let mut conn = self.conn()?;
    let tx = conn.transaction()?;

    ensure_generation(&tx, generation)?;
    insert_entry(&tx, generation, key, response)?;

    tx.commit()?;
    Ok(())
  }

  fn put_all(&self, generation: &str, entries: &[(RequestKey, Response)]) -> Result<()> {
    let mut conn = self.conn()?;
    let tx = conn.transaction()?;

    ensure_generation(&tx, generation)?;
    for (key, response) in entries {
      insert_entry(&tx, generation, key, response)?;
    }

    tx.commit()?;
    Ok(())
  }

  fn entry_count(&self, generation: &str) -> Result<usize> {
    let conn = self.conn()?;
    let count: i64 = conn.query_row(
      "SELECT COUNT(*) FROM cache_entries WHERE generation = ?",
      params![generation],
      |row| row.get(0),
    )?;
    Ok(count as usize)
  }
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .map_err(|e| OfflineError::storage(format!("failed to parse datetime '{}': {}", s, e)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::offline::request::Method;
  use url::Url;

  fn key(path: &str) -> RequestKey {
    let url = Url::parse("https://site.test").unwrap().join(path).unwrap();
    RequestKey::new(&Method::GET, &url)
  }

  #[test]
  fn test_put_and_lookup() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    let response = Response::new(200, "body {}").with_header("content-type", "text/css");

    storage
      .put("site-v1", &key("/styles.css"), &response)
      .unwrap();

    let cached = storage
      .lookup("site-v1", &key("/styles.css"))
      .unwrap()
      .unwrap();
    assert_eq!(cached.response, response);
    assert!(storage
      .lookup("site-v2", &key("/styles.css"))
      .unwrap()
      .is_none());
  }

  #[test]
  fn test_put_replaces_entry() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage
      .put("site-v1", &key("/"), &Response::new(200, "old"))
      .unwrap();
    storage
      .put("site-v1", &key("/"), &Response::new(200, "new"))
      .unwrap();

    let cached = storage.lookup("site-v1", &key("/")).unwrap().unwrap();
    assert_eq!(cached.response.body, b"new");
    assert_eq!(storage.entry_count("site-v1").unwrap(), 1);
  }

  #[test]
  fn test_generations_and_delete() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage
      .put_all(
        "site-v1",
        &[
          (key("/"), Response::new(200, "a")),
          (key("/main.js"), Response::new(200, "b")),
        ],
      )
      .unwrap();
    storage
      .put("site-v2", &key("/"), &Response::new(200, "c"))
      .unwrap();

    let mut names = storage.generations().unwrap();
    names.sort();
    assert_eq!(names, vec!["site-v1", "site-v2"]);
    assert_eq!(storage.entry_count("site-v1").unwrap(), 2);

    assert!(storage.delete("site-v1").unwrap());
    assert!(!storage.delete("site-v1").unwrap());
    assert_eq!(storage.generations().unwrap(), vec!["site-v2"]);
    assert_eq!(storage.entry_count("site-v1").unwrap(), 0);
  }

  #[test]
  fn test_put_all_empty_batch_creates_generation() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.put_all("site-v1", &[]).unwrap();
    assert_eq!(storage.generations().unwrap(), vec!["site-v1"]);
  }

  #[test]
  fn test_parse_datetime() {
    let dt = parse_datetime("2024-01-15 10:30:00").unwrap();
    assert_eq!(dt.to_rfc3339(), "2024-01-15T10:30:00+00:00");
    assert!(parse_datetime("yesterday").is_err());
  }
}
