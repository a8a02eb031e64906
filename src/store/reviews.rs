//! Append-only review log.
//!
//! Every completed review leaves one row. The core never deletes entries;
//! session transitions (including reactivation) leave the log untouched.

use std::sync::Arc;

use rusqlite::params;

use super::{Database, StoreError};
use crate::models::ReviewKind;

/// A review to append to the log.
#[derive(Debug, Clone)]
pub struct NewReviewLogEntry {
    pub session_id: String,
    pub review_type: ReviewKind,
    pub verdict: String,
    pub summary: String,
    /// Findings serialized as JSON (shape depends on the review kind).
    pub findings_json: String,
}

/// One persisted review log row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewLogEntry {
    pub id: i64,
    pub session_id: String,
    pub review_type: ReviewKind,
    pub verdict: String,
    pub summary: String,
    pub findings_json: String,
    /// Unix seconds.
    pub created_at: i64,
}

/// Handle for review-log operations on the shared database.
#[derive(Clone)]
pub struct ReviewLog {
    db: Arc<Database>,
}

impl ReviewLog {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Append one entry.
    pub fn save(&self, entry: &NewReviewLogEntry) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO reviews (session_id, review_type, verdict, summary, findings_json, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    entry.session_id,
                    entry.review_type.to_string(),
                    entry.verdict,
                    entry.summary,
                    entry.findings_json,
                    Database::now(),
                ],
            )?;
            Ok(())
        })
    }

    /// All entries for one session, oldest first. Unknown sessions yield
    /// an empty list, not an error.
    pub fn by_session(&self, session_id: &str) -> Result<Vec<ReviewLogEntry>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, session_id, review_type, verdict, summary, findings_json, created_at
                 FROM reviews WHERE session_id = ?1 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map([session_id], Self::map_row)?;
            rows.collect()
        })
    }

    /// The most recent `limit` entries, newest first.
    pub fn recent(&self, limit: u32) -> Result<Vec<ReviewLogEntry>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, session_id, review_type, verdict, summary, findings_json, created_at
                 FROM reviews ORDER BY id DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map([limit], Self::map_row)?;
            rows.collect()
        })
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReviewLogEntry> {
        let type_text: String = row.get(2)?;
        let review_type = type_text.parse().map_err(|_| {
            rusqlite::Error::InvalidColumnType(
                2,
                "review_type".to_string(),
                rusqlite::types::Type::Text,
            )
        })?;
        Ok(ReviewLogEntry {
            id: row.get(0)?,
            session_id: row.get(1)?,
            review_type,
            verdict: row.get(3)?,
            summary: row.get(4)?,
            findings_json: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log() -> ReviewLog {
        ReviewLog::new(Arc::new(Database::in_memory().unwrap()))
    }

    fn entry(session: &str, summary: &str) -> NewReviewLogEntry {
        NewReviewLogEntry {
            session_id: session.to_string(),
            review_type: ReviewKind::Plan,
            verdict: "approve".to_string(),
            summary: summary.to_string(),
            findings_json: "[]".to_string(),
        }
    }

    #[test]
    fn save_and_read_back_by_session() {
        let log = log();
        log.save(&entry("s1", "first")).unwrap();
        log.save(&entry("s1", "second")).unwrap();
        log.save(&entry("s2", "other")).unwrap();

        let entries = log.by_session("s1").unwrap();
        assert_eq!(entries.len(), 2);
        // Oldest first
        assert_eq!(entries[0].summary, "first");
        assert_eq!(entries[1].summary, "second");
        assert!(entries[0].id < entries[1].id);
        assert_eq!(entries[0].review_type, ReviewKind::Plan);
    }

    #[test]
    fn unknown_session_is_empty_not_error() {
        let entries = log().by_session("ghost").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn recent_returns_newest_first_with_limit() {
        let log = log();
        for i in 0..5 {
            log.save(&entry("s", &format!("review {i}"))).unwrap();
        }

        let entries = log.recent(3).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].summary, "review 4");
        assert_eq!(entries[2].summary, "review 2");
    }

    #[test]
    fn recent_with_empty_log() {
        assert!(log().recent(10).unwrap().is_empty());
    }

    #[test]
    fn findings_json_roundtrips_verbatim() {
        let log = log();
        let mut e = entry("s", "with findings");
        e.findings_json = r#"[{"severity":"minor","category":"style"}]"#.to_string();
        log.save(&e).unwrap();

        let back = log.by_session("s").unwrap();
        assert_eq!(back[0].findings_json, e.findings_json);
    }
}
