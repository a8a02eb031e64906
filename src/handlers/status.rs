//! Read-only status and history queries over the stores.

use serde::Serialize;

use super::AppState;
use crate::constants::DEFAULT_HISTORY_LIMIT;
use crate::error::{BridgeError, Result};
use crate::store::reviews::{ReviewLog, ReviewLogEntry};
use crate::store::sessions::{SessionInfo, SessionStatus, SessionStore};
use crate::store::Database;

/// Answer to a `review_status` query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_seconds: Option<i64>,
}

/// Answer to a `review_history` query.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub reviews: Vec<HistoryEntry>,
}

/// One logged review, with findings re-inflated from their stored JSON.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub session_id: String,
    #[serde(rename = "type")]
    pub review_type: String,
    pub verdict: String,
    pub summary: String,
    pub findings: serde_json::Value,
    pub timestamp: i64,
}

impl From<ReviewLogEntry> for HistoryEntry {
    fn from(entry: ReviewLogEntry) -> Self {
        let findings = serde_json::from_str(&entry.findings_json)
            .unwrap_or(serde_json::Value::String(entry.findings_json));
        Self {
            id: entry.id,
            session_id: entry.session_id,
            review_type: entry.review_type.to_string(),
            verdict: entry.verdict,
            summary: entry.summary,
            findings,
            timestamp: entry.created_at,
        }
    }
}

/// Look up a session's lifecycle state and elapsed time.
pub fn review_status(state: &AppState, session_id: &str) -> Result<StatusResponse> {
    let Some(db) = &state.db else {
        return Ok(not_found(session_id));
    };

    let info = SessionStore::new(db.clone())
        .lookup(session_id)
        .map_err(|e| BridgeError::storage(e.to_string()))?;

    match info {
        None => Ok(not_found(session_id)),
        Some(info) => Ok(StatusResponse {
            status: info.status.to_string(),
            session_id: info.session_id.clone(),
            elapsed_seconds: Some(elapsed_seconds(&info)),
        }),
    }
}

fn not_found(session_id: &str) -> StatusResponse {
    StatusResponse {
        status: "not_found".to_string(),
        session_id: session_id.to_string(),
        elapsed_seconds: None,
    }
}

/// In-progress sessions measure from creation to now; finished sessions
/// from creation to completion. Legacy rows that finished before the
/// `completed_at` column existed fall back to now.
fn elapsed_seconds(info: &SessionInfo) -> i64 {
    let end = match (info.status, info.completed_at) {
        (SessionStatus::InProgress, _) | (_, None) => Database::now(),
        (_, Some(completed_at)) => completed_at,
    };
    end - info.created_at
}

/// List logged reviews: by session when an id is given, else most recent.
pub fn review_history(
    state: &AppState,
    session_id: Option<&str>,
    last_n: Option<u32>,
) -> Result<HistoryResponse> {
    let Some(db) = &state.db else {
        return Ok(HistoryResponse { reviews: vec![] });
    };

    let log = ReviewLog::new(db.clone());
    let entries = match session_id {
        Some(id) => log.by_session(id),
        None => log.recent(last_n.unwrap_or(DEFAULT_HISTORY_LIMIT)),
    }
    .map_err(|e| BridgeError::storage(e.to_string()))?;

    Ok(HistoryResponse {
        reviews: entries.into_iter().map(HistoryEntry::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codex::{ReviewerSdk, ReviewerThread, ThreadOptions};
    use crate::config::Config;
    use crate::error::SdkError;
    use crate::models::ReviewKind;
    use crate::store::reviews::NewReviewLogEntry;
    use async_trait::async_trait;
    use std::sync::Arc;

    /// SDK stub for state construction; these tests never call it.
    struct UnusedSdk;

    #[async_trait]
    impl ReviewerSdk for UnusedSdk {
        async fn start_thread(
            &self,
            _opts: &ThreadOptions,
        ) -> std::result::Result<Box<dyn ReviewerThread>, SdkError> {
            Err(SdkError::new("unused"))
        }

        async fn resume_thread(
            &self,
            _session_id: &str,
            _opts: &ThreadOptions,
        ) -> std::result::Result<Box<dyn ReviewerThread>, SdkError> {
            Err(SdkError::new("unused"))
        }
    }

    fn state() -> AppState {
        AppState {
            config: Config::default(),
            db: Some(Arc::new(Database::in_memory().unwrap())),
            sdk: Arc::new(UnusedSdk),
            workdir: std::path::PathBuf::from("."),
        }
    }

    #[test]
    fn status_of_unknown_session_is_not_found() {
        let state = state();
        let response = review_status(&state, "ghost").unwrap();
        assert_eq!(response.status, "not_found");
        assert_eq!(response.session_id, "ghost");
        assert!(response.elapsed_seconds.is_none());
    }

    #[test]
    fn not_found_serializes_without_elapsed_field() {
        let response = not_found("x");
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("elapsed_seconds").is_none());
    }

    #[test]
    fn status_of_in_progress_session_has_elapsed() {
        let state = state();
        let store = SessionStore::new(state.db.clone().unwrap());
        store.get_or_create("s1").unwrap();

        let response = review_status(&state, "s1").unwrap();
        assert_eq!(response.status, "in_progress");
        let elapsed = response.elapsed_seconds.unwrap();
        assert!((0..5).contains(&elapsed), "elapsed was {elapsed}");
    }

    #[test]
    fn status_of_completed_session_uses_completion_time() {
        let state = state();
        let db = state.db.clone().unwrap();
        // Insert a finished session with a known 30-second span.
        let now = Database::now();
        db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sessions (session_id, status, created_at, completed_at)
                 VALUES ('done', 'completed', ?1, ?2)",
                rusqlite::params![now - 100, now - 70],
            )
        })
        .unwrap();

        let response = review_status(&state, "done").unwrap();
        assert_eq!(response.status, "completed");
        assert_eq!(response.elapsed_seconds, Some(30));
    }

    #[test]
    fn legacy_completed_row_without_timestamp_falls_back_to_now() {
        let state = state();
        let db = state.db.clone().unwrap();
        let now = Database::now();
        db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sessions (session_id, status, created_at, completed_at)
                 VALUES ('legacy', 'completed', ?1, NULL)",
                rusqlite::params![now - 50],
            )
        })
        .unwrap();

        let response = review_status(&state, "legacy").unwrap();
        let elapsed = response.elapsed_seconds.unwrap();
        assert!((50..55).contains(&elapsed), "elapsed was {elapsed}");
    }

    #[test]
    fn history_by_session_returns_entries_in_order() {
        let state = state();
        let log = ReviewLog::new(state.db.clone().unwrap());
        for summary in ["first", "second"] {
            log.save(&NewReviewLogEntry {
                session_id: "s1".to_string(),
                review_type: ReviewKind::Plan,
                verdict: "approve".to_string(),
                summary: summary.to_string(),
                findings_json: "[]".to_string(),
            })
            .unwrap();
        }

        let response = review_history(&state, Some("s1"), None).unwrap();
        assert_eq!(response.reviews.len(), 2);
        assert_eq!(response.reviews[0].summary, "first");
        assert_eq!(response.reviews[0].review_type, "plan");
        assert_eq!(response.reviews[0].findings, serde_json::json!([]));
    }

    #[test]
    fn history_without_session_uses_recent_with_default_limit() {
        let state = state();
        let log = ReviewLog::new(state.db.clone().unwrap());
        for i in 0..15 {
            log.save(&NewReviewLogEntry {
                session_id: format!("s{i}"),
                review_type: ReviewKind::Code,
                verdict: "approve".to_string(),
                summary: format!("review {i}"),
                findings_json: "[]".to_string(),
            })
            .unwrap();
        }

        let response = review_history(&state, None, None).unwrap();
        assert_eq!(response.reviews.len(), DEFAULT_HISTORY_LIMIT as usize);
        assert_eq!(response.reviews[0].summary, "review 14");
    }

    #[test]
    fn history_unknown_session_is_empty() {
        let response = review_history(&state(), Some("ghost"), None).unwrap();
        assert!(response.reviews.is_empty());
    }
}
