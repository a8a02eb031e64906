//! Request-scoped session lifecycle coordinator.
//!
//! One tracker per request couples the request's outcome to store
//! mutations. Storage failures here are logged and swallowed: persistence
//! problems must never turn a successful review into a failure. The one
//! asymmetry that matters: when the caller asked to resume session X and
//! the reviewer came back with a different thread Y, the caller's
//! observable session is X, so X is the row whose status flips.

use std::sync::Arc;

use super::reviews::{NewReviewLogEntry, ReviewLog};
use super::sessions::SessionStore;
use super::Database;

/// Couples one request's lifecycle to the session store and review log.
pub struct SessionTracker {
    db: Option<Arc<Database>>,
    preflight_id: Option<String>,
}

impl SessionTracker {
    /// A tracker without a store is a no-op on every operation.
    pub fn new(db: Option<Arc<Database>>) -> Self {
        Self {
            db,
            preflight_id: None,
        }
    }

    /// The session id recorded by a successful preflight, if any.
    pub fn preflight_id(&self) -> Option<&str> {
        self.preflight_id.as_deref()
    }

    /// Activate the caller-supplied session before dispatching the
    /// reviewer, so persisted state reads `in_progress` while the turn
    /// runs. On activation failure the id is *not* remembered, which
    /// makes the later `record_failure` skip a row we never owned.
    pub fn preflight(&mut self, session_id: Option<&str>) {
        let (Some(db), Some(id)) = (&self.db, session_id) else {
            return;
        };

        match SessionStore::new(Arc::clone(db)).activate(id) {
            Ok(_) => self.preflight_id = Some(id.to_string()),
            Err(e) => tracing::warn!("failed to activate session {id}: {e}"),
        }
    }

    /// Persist a successful review: ensure the session row exists, append
    /// the log entry, then mark completion. Completion always lands on the
    /// preflight id when one exists, even if the reviewer returned a
    /// different id.
    pub fn record_success(&self, result_session_id: &str, entry: &NewReviewLogEntry) {
        let Some(db) = &self.db else {
            return;
        };
        let sessions = SessionStore::new(Arc::clone(db));

        if self.preflight_id.is_none() {
            if let Err(e) = sessions.get_or_create(result_session_id) {
                tracing::warn!("failed to create session {result_session_id}: {e}");
            }
        }

        if let Err(e) = ReviewLog::new(Arc::clone(db)).save(entry) {
            tracing::warn!("failed to save review log entry: {e}");
        }

        let target = self.preflight_id.as_deref().unwrap_or(result_session_id);
        if let Err(e) = sessions.mark_completed(target) {
            tracing::warn!("failed to mark session {target} completed: {e}");
        }
    }

    /// Mark the preflighted session failed. Does nothing when preflight
    /// never succeeded (no session to own) or there is no store.
    pub fn record_failure(&self) {
        let (Some(db), Some(id)) = (&self.db, &self.preflight_id) else {
            return;
        };

        if let Err(e) = SessionStore::new(Arc::clone(db)).mark_failed(id) {
            tracing::warn!("failed to mark session {id} failed: {e}");
        }
    }

    /// Like [`record_failure`](Self::record_failure), for the outermost
    /// catch: swallows everything silently.
    pub fn record_failure_best_effort(&self) {
        let (Some(db), Some(id)) = (&self.db, &self.preflight_id) else {
            return;
        };
        let _ = SessionStore::new(Arc::clone(db)).mark_failed(id);
    }
}
