//! SQLite persistence: session store and append-only review log.
//!
//! One connection per process, WAL journal mode, single-statement writes.
//! Both stores are thin handles over a shared [`Database`]; the handlers
//! may run concurrently, so the connection sits behind a mutex and every
//! operation is one short critical section.

pub mod reviews;
pub mod sessions;
pub mod tracker;

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::Connection;
use thiserror::Error;

/// Errors from the persistence layer. All of them surface to callers as
/// `STORAGE_ERROR` values, never panics.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to prepare database path: {0}")]
    Io(#[from] std::io::Error),

    #[error("database lock poisoned")]
    Poisoned,
}

const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS sessions (
    session_id   TEXT PRIMARY KEY,
    status       TEXT NOT NULL DEFAULT 'in_progress',
    created_at   INTEGER NOT NULL,
    completed_at INTEGER
);
CREATE TABLE IF NOT EXISTS reviews (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id    TEXT NOT NULL,
    review_type   TEXT NOT NULL,
    verdict       TEXT NOT NULL,
    summary       TEXT NOT NULL,
    findings_json TEXT NOT NULL,
    created_at    INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_reviews_session ON reviews(session_id);
";

/// Shared SQLite handle hosting both tables.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the database at `path`. `:memory:` is permitted.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        if path == ":memory:" {
            return Self::in_memory();
        }

        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        Self::init(Connection::open(path)?)
    }

    /// In-memory database, used for tests and as the open-failure fallback.
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Open at `path`; when that fails, log a warning and fall back to an
    /// in-memory store so the server still starts.
    pub fn open_or_fallback(path: &str) -> Result<Arc<Self>, StoreError> {
        match Self::open(path) {
            Ok(db) => Ok(Arc::new(db)),
            Err(e) => {
                tracing::warn!(
                    "cannot open review store at {path}: {e}; falling back to in-memory store"
                );
                Ok(Arc::new(Self::in_memory()?))
            }
        }
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        // WAL tolerates concurrent in-process writers; on :memory: the
        // pragma answers "memory", which is fine.
        let _mode: String = conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;

        conn.execute_batch(SCHEMA_SQL)?;

        // Best-effort migration from the pre-`completed_at` table shape.
        // Fails harmlessly when the column already exists.
        let _ = conn.execute("ALTER TABLE sessions ADD COLUMN completed_at INTEGER", []);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run one operation against the connection.
    pub(crate) fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        f(&conn).map_err(StoreError::from)
    }

    /// Current Unix timestamp in seconds.
    pub(crate) fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}
