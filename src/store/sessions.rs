//! Persistent session state machine.
//!
//! A session tracks one reviewer thread's observable lifecycle:
//! `in_progress → completed | failed`, with at-most-one completion per
//! request attempt. Resuming a finished session reactivates it
//! (`activate`), which is the only transition back to `in_progress`.

use std::sync::Arc;

use rusqlite::{params, Connection, OptionalExtension};
use strum::Display;

use super::{Database, StoreError};

/// Lifecycle state of a persisted session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
    Failed,
}

impl std::str::FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(SessionStatus::InProgress),
            "completed" => Ok(SessionStatus::Completed),
            "failed" => Ok(SessionStatus::Failed),
            other => Err(format!("unknown session status: {other}")),
        }
    }
}

/// One persisted session row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub session_id: String,
    pub status: SessionStatus,
    /// Unix seconds.
    pub created_at: i64,
    /// Unix seconds; set iff the session is completed or failed (legacy
    /// rows may predate the column).
    pub completed_at: Option<i64>,
}

/// Handle for session operations on the shared database.
#[derive(Clone)]
pub struct SessionStore {
    db: Arc<Database>,
}

impl SessionStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Return the existing session, or insert a fresh `in_progress` row.
    pub fn get_or_create(&self, id: &str) -> Result<SessionInfo, StoreError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO sessions (session_id, status, created_at, completed_at)
                 VALUES (?1, 'in_progress', ?2, NULL)",
                params![id, Database::now()],
            )?;
            Self::row(conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Upsert the session back to `in_progress` with `completed_at`
    /// cleared. `created_at` of an existing row is preserved.
    pub fn activate(&self, id: &str) -> Result<SessionInfo, StoreError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sessions (session_id, status, created_at, completed_at)
                 VALUES (?1, 'in_progress', ?2, NULL)
                 ON CONFLICT(session_id)
                 DO UPDATE SET status = 'in_progress', completed_at = NULL",
                params![id, Database::now()],
            )?;
            Self::row(conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Flip the session to `completed`. A missing id is a no-op.
    pub fn mark_completed(&self, id: &str) -> Result<(), StoreError> {
        self.set_terminal(id, "completed")
    }

    /// Flip the session to `failed`. A missing id is a no-op.
    pub fn mark_failed(&self, id: &str) -> Result<(), StoreError> {
        self.set_terminal(id, "failed")
    }

    fn set_terminal(&self, id: &str, status: &str) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE sessions SET status = ?1, completed_at = ?2 WHERE session_id = ?3",
                params![status, Database::now(), id],
            )?;
            Ok(())
        })
    }

    /// Fetch a session, if present.
    pub fn lookup(&self, id: &str) -> Result<Option<SessionInfo>, StoreError> {
        self.db.with_conn(|conn| Self::row(conn, id))
    }

    fn row(conn: &Connection, id: &str) -> rusqlite::Result<Option<SessionInfo>> {
        conn.query_row(
            "SELECT session_id, status, created_at, completed_at
             FROM sessions WHERE session_id = ?1",
            [id],
            |row| {
                let status_text: String = row.get(1)?;
                let status = status_text.parse().map_err(|_| {
                    rusqlite::Error::InvalidColumnType(
                        1,
                        "status".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?;
                Ok(SessionInfo {
                    session_id: row.get(0)?,
                    status,
                    created_at: row.get(2)?,
                    completed_at: row.get(3)?,
                })
            },
        )
        .optional()
    }
}
