//! Request handlers: one per review kind.
//!
//! A handler glues caller input to the pipeline: apply config defaults,
//! (for precommit) resolve the diff, preflight the session, run the
//! reviewer client, and record the outcome through the tracker. Handlers
//! are shared by both front-ends; only sentinel surfacing differs between
//! them, so the precommit handler returns an outcome enum and each surface
//! renders it its own way.

pub mod status;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::codex::process::CodexCli;
use crate::codex::ReviewerSdk;
use crate::config::Config;
use crate::constants::{DEFAULT_DB_FILE, ENV_DB_PATH};
use crate::diff::resolver::{self, DiffSource};
use crate::diff::DiffError;
use crate::env::Env;
use crate::error::{BridgeError, Result};
use crate::models::{CodeReview, PlanReview, PrecommitReview, ReviewDepth, ReviewKind};
use crate::reviewer::{CodeRequest, PlanRequest, PrecommitRequest, ReviewerClient};
use crate::store::reviews::NewReviewLogEntry;
use crate::store::tracker::SessionTracker;
use crate::store::Database;

/// Shared state for one server or CLI invocation.
pub struct AppState {
    pub config: Config,
    /// `None` only when even the in-memory fallback store failed to open;
    /// every tracker operation then degrades to a no-op.
    pub db: Option<Arc<Database>>,
    pub sdk: Arc<dyn ReviewerSdk>,
    /// Working directory for git invocations (precommit auto-diff).
    pub workdir: PathBuf,
}

impl AppState {
    /// Construct state for one invocation: load config, open the store
    /// (falling back to in-memory on failure), wire the codex adapter.
    pub fn init(config_dir: Option<&Path>, env: &Env) -> Result<Self> {
        let config = Config::load(config_dir).map_err(|e| BridgeError::config(e.to_string()))?;

        let db_path = env.var_or(ENV_DB_PATH, DEFAULT_DB_FILE);
        let db = match Database::open_or_fallback(&db_path) {
            Ok(db) => Some(db),
            Err(e) => {
                tracing::warn!("review store unavailable: {e}; session tracking disabled");
                None
            }
        };

        let workdir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        Ok(Self {
            config,
            db,
            sdk: Arc::new(CodexCli::new()),
            workdir,
        })
    }

    fn client(&self) -> ReviewerClient {
        ReviewerClient::new(Arc::clone(&self.sdk), self.config.clone())
    }

    fn tracker(&self) -> SessionTracker {
        SessionTracker::new(self.db.clone())
    }
}

/// Caller input for a plan review; `None` fields take config defaults.
#[derive(Debug, Clone, Default)]
pub struct PlanInput {
    pub plan: String,
    pub context: Option<String>,
    pub focus: Option<Vec<String>>,
    pub depth: Option<ReviewDepth>,
    pub session_id: Option<String>,
}

/// Caller input for a code review.
#[derive(Debug, Clone, Default)]
pub struct CodeInput {
    pub diff: String,
    pub context: Option<String>,
    pub criteria: Option<Vec<String>>,
    pub session_id: Option<String>,
}

/// Caller input for a precommit gate.
#[derive(Debug, Clone)]
pub struct PrecommitInput {
    pub auto_diff: bool,
    pub diff: Option<String>,
    pub session_id: Option<String>,
    pub checklist: Option<Vec<String>>,
}

impl Default for PrecommitInput {
    fn default() -> Self {
        Self {
            auto_diff: true,
            diff: None,
            session_id: None,
            checklist: None,
        }
    }
}

/// What a precommit request produced. The no-staged-changes sentinel is a
/// non-error on the tool-call surface but a regular error on the CLI, so
/// the handler keeps the distinction and lets each surface decide.
#[derive(Debug, Clone, PartialEq)]
pub enum PrecommitOutcome {
    Review(PrecommitReview),
    NoStagedChanges { session_id: String },
}

impl PrecommitOutcome {
    /// The structured response the tool-call surface returns for either
    /// outcome.
    pub fn into_tool_response(self) -> PrecommitReview {
        match self {
            PrecommitOutcome::Review(review) => review,
            PrecommitOutcome::NoStagedChanges { session_id } => PrecommitReview {
                ready_to_commit: false,
                blockers: Vec::new(),
                warnings: vec!["No staged changes found".to_string()],
                session_id,
                chunks_reviewed: None,
            },
        }
    }
}

/// Handle a plan review request.
pub async fn review_plan(state: &AppState, input: PlanInput) -> Result<PlanReview> {
    let mut tracker = state.tracker();
    tracker.preflight(input.session_id.as_deref());

    let req = PlanRequest {
        plan: input.plan,
        context: input.context,
        focus: input
            .focus
            .unwrap_or_else(|| state.config.plan.focus.clone()),
        depth: input.depth.unwrap_or(state.config.plan.depth),
        session_id: input.session_id,
    };

    match state.client().review_plan(&req).await {
        Ok(review) => {
            tracker.record_success(&review.session_id, &plan_log_entry(&review));
            Ok(review)
        }
        Err(e) => {
            tracker.record_failure();
            Err(e)
        }
    }
}

/// Handle a code review request.
pub async fn review_code(state: &AppState, input: CodeInput) -> Result<CodeReview> {
    let mut tracker = state.tracker();
    tracker.preflight(input.session_id.as_deref());

    let req = CodeRequest {
        diff: input.diff,
        context: input.context,
        criteria: input
            .criteria
            .unwrap_or_else(|| state.config.code.criteria.clone()),
        require_tests: state.config.code.require_tests,
        session_id: input.session_id,
    };

    match state.client().review_code(&req).await {
        Ok(review) => {
            tracker.record_success(&review.session_id, &code_log_entry(&review));
            Ok(review)
        }
        Err(e) => {
            tracker.record_failure();
            Err(e)
        }
    }
}

/// Handle a precommit request: resolve the diff first, then gate.
pub async fn review_precommit(
    state: &AppState,
    input: PrecommitInput,
) -> Result<PrecommitOutcome> {
    let source = DiffSource {
        diff: input.diff,
        auto_diff: input.auto_diff,
    };
    let diff = match resolver::resolve(&source, &state.workdir).await {
        Ok(diff) => diff,
        Err(DiffError::NoStagedChanges) => {
            return Ok(PrecommitOutcome::NoStagedChanges {
                session_id: input.session_id.unwrap_or_default(),
            });
        }
        Err(DiffError::Git(msg)) => return Err(BridgeError::git(msg)),
        Err(e @ DiffError::AutoDiffDisabled) => return Err(BridgeError::unknown(e.to_string())),
    };

    let mut tracker = state.tracker();
    tracker.preflight(input.session_id.as_deref());

    let req = PrecommitRequest {
        diff,
        checklist: input.checklist.unwrap_or_default(),
        session_id: input.session_id,
    };

    match state.client().review_precommit(&req).await {
        Ok(review) => {
            tracker.record_success(&review.session_id, &precommit_log_entry(&review));
            Ok(PrecommitOutcome::Review(review))
        }
        Err(e) => {
            tracker.record_failure();
            Err(e)
        }
    }
}

fn plan_log_entry(review: &PlanReview) -> NewReviewLogEntry {
    NewReviewLogEntry {
        session_id: review.session_id.clone(),
        review_type: ReviewKind::Plan,
        verdict: review.verdict.to_string(),
        summary: review.summary.clone(),
        findings_json: serde_json::to_string(&review.findings)
            .unwrap_or_else(|_| "[]".to_string()),
    }
}

fn code_log_entry(review: &CodeReview) -> NewReviewLogEntry {
    NewReviewLogEntry {
        session_id: review.session_id.clone(),
        review_type: ReviewKind::Code,
        verdict: review.verdict.to_string(),
        summary: review.summary.clone(),
        findings_json: serde_json::to_string(&review.findings)
            .unwrap_or_else(|_| "[]".to_string()),
    }
}

fn precommit_log_entry(review: &PrecommitReview) -> NewReviewLogEntry {
    let verdict = if review.ready_to_commit {
        "ready"
    } else {
        "blocked"
    };
    let findings = serde_json::json!({
        "blockers": review.blockers,
        "warnings": review.warnings,
    });
    NewReviewLogEntry {
        session_id: review.session_id.clone(),
        review_type: ReviewKind::Precommit,
        verdict: verdict.to_string(),
        summary: format!(
            "{} blocker(s), {} warning(s)",
            review.blockers.len(),
            review.warnings.len()
        ),
        findings_json: findings.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CodeVerdict, PlanVerdict};

    #[test]
    fn no_staged_changes_tool_response_shape() {
        let outcome = PrecommitOutcome::NoStagedChanges {
            session_id: "caller".to_string(),
        };
        let response = outcome.into_tool_response();
        assert!(!response.ready_to_commit);
        assert!(response.blockers.is_empty());
        assert_eq!(response.warnings, vec!["No staged changes found"]);
        assert_eq!(response.session_id, "caller");
        assert!(response.chunks_reviewed.is_none());
    }

    #[test]
    fn plan_log_entry_serializes_findings() {
        let review = PlanReview {
            verdict: PlanVerdict::Approve,
            summary: "fine".to_string(),
            findings: vec![],
            session_id: "s".to_string(),
        };
        let entry = plan_log_entry(&review);
        assert_eq!(entry.review_type, ReviewKind::Plan);
        assert_eq!(entry.verdict, "approve");
        assert_eq!(entry.findings_json, "[]");
    }

    #[test]
    fn code_log_entry_uses_snake_case_verdict() {
        let review = CodeReview {
            verdict: CodeVerdict::RequestChanges,
            summary: "s".to_string(),
            findings: vec![],
            session_id: "s".to_string(),
            chunks_reviewed: Some(2),
        };
        let entry = code_log_entry(&review);
        assert_eq!(entry.verdict, "request_changes");
    }

    #[test]
    fn precommit_log_entry_partitions_counts() {
        let review = PrecommitReview {
            ready_to_commit: false,
            blockers: vec!["b".to_string()],
            warnings: vec!["w1".to_string(), "w2".to_string()],
            session_id: "s".to_string(),
            chunks_reviewed: None,
        };
        let entry = precommit_log_entry(&review);
        assert_eq!(entry.verdict, "blocked");
        assert_eq!(entry.summary, "1 blocker(s), 2 warning(s)");
        assert!(entry.findings_json.contains("\"blockers\""));
    }
}
