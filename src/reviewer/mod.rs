//! Reviewer client: thread lifecycle, bounded turns, retry-on-invalid
//! output, and multi-chunk orchestration.
//!
//! One client serves one request. Every turn runs under its own deadline
//! (`timeout_seconds`), so an N-chunk review may take up to N deadlines of
//! wall clock; chunks run strictly sequentially on a single reviewer
//! thread so the model sees them in order.

pub mod merge;
pub mod validate;

use std::sync::Arc;
use std::time::Duration;

use crate::codex::{ReviewerSdk, ReviewerThread, ThreadOptions};
use crate::config::Config;
use crate::constants::{MIN_DIFF_BUDGET_TOKENS, PROMPT_FIXED_OVERHEAD_TOKENS};
use crate::diff::chunker::{self, estimate_tokens};
use crate::error::{classify_vendor_error, BridgeError, ErrorCode, Result, SdkError};
use crate::models::{
    CodeReview, CodeVerdict, PlanReview, PrecommitReview, RawCodeReview, RawPlanReview,
    RawPrecommitReview, ReviewDepth,
};
use crate::prompt::{self, ChunkProgress};
use validate::ValidationError;

/// Attempts per turn: the original call plus one retry on invalid output.
const TURN_ATTEMPTS: u32 = 2;

/// A fully-resolved plan review request (config defaults already applied).
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub plan: String,
    pub context: Option<String>,
    pub focus: Vec<String>,
    pub depth: ReviewDepth,
    pub session_id: Option<String>,
}

/// A fully-resolved code review request.
#[derive(Debug, Clone)]
pub struct CodeRequest {
    pub diff: String,
    pub context: Option<String>,
    pub criteria: Vec<String>,
    pub require_tests: bool,
    pub session_id: Option<String>,
}

/// A fully-resolved precommit request (diff already resolved).
#[derive(Debug, Clone)]
pub struct PrecommitRequest {
    pub diff: String,
    pub checklist: Vec<String>,
    pub session_id: Option<String>,
}

/// Client owning the vendor SDK handle for the duration of one request.
pub struct ReviewerClient {
    sdk: Arc<dyn ReviewerSdk>,
    config: Config,
}

impl ReviewerClient {
    pub fn new(sdk: Arc<dyn ReviewerSdk>, config: Config) -> Self {
        Self { sdk, config }
    }

    /// Run a plan review: always a single turn.
    pub async fn review_plan(&self, req: &PlanRequest) -> Result<PlanReview> {
        let prompt = prompt::plan_prompt(
            &self.config,
            &req.plan,
            req.context.as_deref(),
            &req.focus,
            req.depth,
        );
        let schema = output_schema::<RawPlanReview>()?;

        let mut thread = self.acquire_thread(req.session_id.as_deref()).await?;
        let raw = self
            .run_turn(thread.as_mut(), &prompt, &schema, validate::validate_plan)
            .await?;
        let session_id = resolve_session_id(thread.as_ref(), req.session_id.as_deref())?;

        Ok(PlanReview::from_raw(raw, session_id))
    }

    /// Run a code review, chunking the diff when it exceeds the budget.
    pub async fn review_code(&self, req: &CodeRequest) -> Result<CodeReview> {
        let budget = self.chunk_budget(req.context.as_deref(), &req.criteria);
        let chunks = chunker::chunk(&req.diff, budget);
        let schema = output_schema::<RawCodeReview>()?;

        let total = chunks.len();
        if total == 0 {
            // Nothing to send; no SDK call at all.
            return Ok(CodeReview {
                verdict: CodeVerdict::Approve,
                summary: "No changes to review.".to_string(),
                findings: Vec::new(),
                session_id: req.session_id.clone().unwrap_or_default(),
                chunks_reviewed: None,
            });
        }

        if total == 1 {
            let prompt = prompt::code_prompt(
                &self.config,
                &chunks[0],
                req.context.as_deref(),
                &req.criteria,
                req.require_tests,
                None,
            );
            let mut thread = self.acquire_thread(req.session_id.as_deref()).await?;
            let raw = self
                .run_turn(thread.as_mut(), &prompt, &schema, validate::validate_code)
                .await?;
            let session_id = resolve_session_id(thread.as_ref(), req.session_id.as_deref())?;
            return Ok(CodeReview::from_raw(raw, session_id));
        }

        tracing::debug!(chunks = total, budget, "splitting code review");
        let mut session = req.session_id.clone();
        let mut parts: Vec<RawCodeReview> = Vec::with_capacity(total);

        for (i, chunk_text) in chunks.iter().enumerate() {
            let prompt = prompt::code_prompt(
                &self.config,
                chunk_text,
                req.context.as_deref(),
                &req.criteria,
                req.require_tests,
                Some(ChunkProgress {
                    index: i + 1,
                    total,
                }),
            );
            // First chunk starts or resumes per the caller; later chunks
            // always resume the thread the previous chunk reported.
            let mut thread = self.acquire_thread(session.as_deref()).await?;
            let raw = self
                .run_turn(thread.as_mut(), &prompt, &schema, validate::validate_code)
                .await?;
            session = Some(resolve_session_id(thread.as_ref(), session.as_deref())?);
            parts.push(raw);
        }

        Ok(merge::merge_code(parts, session.unwrap_or_default()))
    }

    /// Run a precommit gate, chunking the staged diff when needed.
    pub async fn review_precommit(&self, req: &PrecommitRequest) -> Result<PrecommitReview> {
        let budget = self.chunk_budget(None, &req.checklist);
        let chunks = chunker::chunk(&req.diff, budget);
        let schema = output_schema::<RawPrecommitReview>()?;

        let total = chunks.len();
        if total == 0 {
            return Ok(PrecommitReview {
                ready_to_commit: true,
                blockers: Vec::new(),
                warnings: Vec::new(),
                session_id: req.session_id.clone().unwrap_or_default(),
                chunks_reviewed: None,
            });
        }

        if total == 1 {
            let prompt = prompt::precommit_prompt(&self.config, &chunks[0], &req.checklist, None);
            let mut thread = self.acquire_thread(req.session_id.as_deref()).await?;
            let raw = self
                .run_turn(
                    thread.as_mut(),
                    &prompt,
                    &schema,
                    validate::validate_precommit,
                )
                .await?;
            let session_id = resolve_session_id(thread.as_ref(), req.session_id.as_deref())?;
            return Ok(PrecommitReview::from_raw(raw, session_id));
        }

        let mut session = req.session_id.clone();
        let mut parts: Vec<RawPrecommitReview> = Vec::with_capacity(total);

        for (i, chunk_text) in chunks.iter().enumerate() {
            let prompt = prompt::precommit_prompt(
                &self.config,
                chunk_text,
                &req.checklist,
                Some(ChunkProgress {
                    index: i + 1,
                    total,
                }),
            );
            let mut thread = self.acquire_thread(session.as_deref()).await?;
            let raw = self
                .run_turn(
                    thread.as_mut(),
                    &prompt,
                    &schema,
                    validate::validate_precommit,
                )
                .await?;
            session = Some(resolve_session_id(thread.as_ref(), session.as_deref())?);
            parts.push(raw);
        }

        Ok(merge::merge_precommit(parts, session.unwrap_or_default()))
    }

    /// Diff token budget: the configured chunk size minus fixed prompt
    /// scaffolding and the variable context/criteria overhead, floored so
    /// pathological configs still make progress.
    fn chunk_budget(&self, context: Option<&str>, extra: &[String]) -> usize {
        let variable = estimate_tokens(context.unwrap_or(""))
            + estimate_tokens(&self.config.project_context)
            + estimate_tokens(&extra.join("\n"));
        self.config
            .max_chunk_tokens
            .saturating_sub(PROMPT_FIXED_OVERHEAD_TOKENS + variable)
            .max(MIN_DIFF_BUDGET_TOKENS)
    }

    /// Start a fresh thread, or resume when the caller supplied a session.
    async fn acquire_thread(
        &self,
        session_id: Option<&str>,
    ) -> Result<Box<dyn ReviewerThread>> {
        let opts = ThreadOptions::from_config(&self.config);
        match session_id {
            Some(id) => self.sdk.resume_thread(id, &opts).await.map_err(|e| {
                if e.is_cancellation() {
                    BridgeError::timeout(self.config.timeout_seconds)
                } else {
                    BridgeError::new(
                        ErrorCode::SessionNotFound,
                        format!("no reviewer session '{id}': {e}"),
                    )
                }
            }),
            None => self
                .sdk
                .start_thread(&opts)
                .await
                .map_err(|e| self.classify(&e)),
        }
    }

    /// One turn with a wall-clock deadline and a single retry on invalid
    /// output. The retry re-sends the same prompt on the same thread so
    /// the model can see (and correct) its own failure.
    async fn run_turn<T>(
        &self,
        thread: &mut dyn ReviewerThread,
        prompt: &str,
        schema: &serde_json::Value,
        validate: fn(&str) -> std::result::Result<T, ValidationError>,
    ) -> Result<T> {
        let deadline = Duration::from_secs(self.config.timeout_seconds);
        let mut last_error: Option<ValidationError> = None;

        for attempt in 1..=TURN_ATTEMPTS {
            let output = match tokio::time::timeout(deadline, thread.run(prompt, schema)).await {
                Err(_) => return Err(BridgeError::timeout(self.config.timeout_seconds)),
                Ok(Err(sdk_err)) => return Err(self.classify(&sdk_err)),
                Ok(Ok(output)) => output,
            };

            match validate(&output.final_response) {
                Ok(parsed) => return Ok(parsed),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "reviewer returned invalid output");
                    last_error = Some(e);
                }
            }
        }

        let message = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "invalid response".to_string());
        Err(BridgeError::parse(message))
    }

    fn classify(&self, err: &SdkError) -> BridgeError {
        if err.is_cancellation() {
            BridgeError::timeout(self.config.timeout_seconds)
        } else {
            classify_vendor_error(err, &self.config.model)
        }
    }
}

/// The session id attached to a finished result: the thread's reported id
/// when it has one, else the caller's. Both absent is a backend bug.
fn resolve_session_id(thread: &dyn ReviewerThread, caller: Option<&str>) -> Result<String> {
    thread
        .id()
        .or_else(|| caller.map(str::to_string))
        .ok_or_else(|| BridgeError::parse("missing session ID"))
}

/// JSON schema handed to the reviewer thread for a result shape.
fn output_schema<T: schemars::JsonSchema>() -> Result<serde_json::Value> {
    serde_json::to_value(schemars::schema_for!(T))
        .map_err(|e| BridgeError::unknown(format!("failed to build output schema: {e}")))
}
