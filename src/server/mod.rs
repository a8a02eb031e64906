//! Tool-call surface: an MCP server over stdio.
//!
//! Five tools map one-to-one onto the handlers. Every result is a JSON
//! string inside a text content item; taxonomy failures come back as
//! `isError` tool results carrying the `CODE: message` string, not as
//! protocol errors, so the calling agent can read and react to them.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::error::BridgeError;
use crate::handlers::{self, status, AppState, CodeInput, PlanInput, PrecommitInput};
use crate::models::ReviewDepth;

/// Arguments for the `review_plan` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReviewPlanArgs {
    /// The implementation plan to review.
    pub plan: String,
    /// Extra context for the reviewer.
    #[serde(default)]
    pub context: Option<String>,
    /// Focus areas; defaults come from config.
    #[serde(default)]
    pub focus: Option<Vec<String>>,
    /// Review depth; defaults come from config.
    #[serde(default)]
    pub depth: Option<ReviewDepth>,
    /// Reviewer session to resume.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Arguments for the `review_code` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReviewCodeArgs {
    /// Unified diff to review.
    pub diff: String,
    /// Extra context for the reviewer.
    #[serde(default)]
    pub context: Option<String>,
    /// Review criteria; defaults come from config.
    #[serde(default)]
    pub criteria: Option<Vec<String>>,
    /// Reviewer session to resume (e.g. from an earlier plan review).
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Arguments for the `review_precommit` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReviewPrecommitArgs {
    /// Read the staged diff from git when no diff is supplied.
    #[serde(default = "default_true")]
    pub auto_diff: bool,
    /// Explicit diff; wins over auto_diff even when empty.
    #[serde(default)]
    pub diff: Option<String>,
    /// Reviewer session to resume.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Additional checks to verify before committing.
    #[serde(default)]
    pub checklist: Option<Vec<String>>,
}

fn default_true() -> bool {
    true
}

/// Arguments for the `review_status` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReviewStatusArgs {
    pub session_id: String,
}

/// Arguments for the `review_history` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReviewHistoryArgs {
    /// Restrict to one session.
    #[serde(default)]
    pub session_id: Option<String>,
    /// How many recent reviews to return when no session is given.
    #[serde(default)]
    pub last_n: Option<u32>,
}

/// The MCP service backing the tool-call surface.
#[derive(Clone)]
pub struct ReviewBridgeServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ReviewBridgeServer {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Review an implementation plan and return a structured verdict with findings. Pass session_id to continue an earlier review thread."
    )]
    async fn review_plan(
        &self,
        Parameters(args): Parameters<ReviewPlanArgs>,
    ) -> Result<CallToolResult, McpError> {
        let input = PlanInput {
            plan: args.plan,
            context: args.context,
            focus: args.focus,
            depth: args.depth,
            session_id: args.session_id,
        };
        Ok(match handlers::review_plan(&self.state, input).await {
            Ok(review) => json_result(&review),
            Err(e) => error_result(&e),
        })
    }

    #[tool(
        description = "Review a unified diff and return a structured verdict with findings. Large diffs are reviewed in sequential chunks on one reviewer thread."
    )]
    async fn review_code(
        &self,
        Parameters(args): Parameters<ReviewCodeArgs>,
    ) -> Result<CallToolResult, McpError> {
        let input = CodeInput {
            diff: args.diff,
            context: args.context,
            criteria: args.criteria,
            session_id: args.session_id,
        };
        Ok(match handlers::review_code(&self.state, input).await {
            Ok(review) => json_result(&review),
            Err(e) => error_result(&e),
        })
    }

    #[tool(
        description = "Gate the staged changes before a commit: returns ready_to_commit plus blockers and warnings. Reads `git diff --cached` unless a diff is supplied."
    )]
    async fn review_precommit(
        &self,
        Parameters(args): Parameters<ReviewPrecommitArgs>,
    ) -> Result<CallToolResult, McpError> {
        let input = PrecommitInput {
            auto_diff: args.auto_diff,
            diff: args.diff,
            session_id: args.session_id,
            checklist: args.checklist,
        };
        Ok(match handlers::review_precommit(&self.state, input).await {
            // The no-staged-changes sentinel is a structured non-error here.
            Ok(outcome) => json_result(&outcome.into_tool_response()),
            Err(e) => error_result(&e),
        })
    }

    #[tool(description = "Look up the lifecycle status and elapsed time of a review session.")]
    async fn review_status(
        &self,
        Parameters(args): Parameters<ReviewStatusArgs>,
    ) -> Result<CallToolResult, McpError> {
        Ok(match status::review_status(&self.state, &args.session_id) {
            Ok(response) => json_result(&response),
            Err(e) => error_result(&e),
        })
    }

    #[tool(
        description = "List completed reviews: all reviews of one session, or the most recent ones."
    )]
    async fn review_history(
        &self,
        Parameters(args): Parameters<ReviewHistoryArgs>,
    ) -> Result<CallToolResult, McpError> {
        Ok(
            match status::review_history(&self.state, args.session_id.as_deref(), args.last_n) {
                Ok(response) => json_result(&response),
                Err(e) => error_result(&e),
            },
        )
    }
}

#[tool_handler]
impl ServerHandler for ReviewBridgeServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Code review bridge: review_plan, review_code, and review_precommit run \
                 structured reviews through the configured reviewer model; review_status \
                 and review_history query persisted sessions. Reuse a returned session_id \
                 to keep reviews on one conversational thread."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}

/// Serve the tool-call surface over stdio until the client disconnects.
pub async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    tracing::info!("starting tool-call server on stdio");
    let service = ReviewBridgeServer::new(state)
        .serve(rmcp::transport::stdio())
        .await?;
    service.waiting().await?;
    Ok(())
}

/// Serialize a handler result into a success tool result.
fn json_result<T: serde::Serialize>(value: &T) -> CallToolResult {
    let text = serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string());
    CallToolResult::success(vec![Content::text(text)])
}

/// Wrap a taxonomy error into an `isError` tool result.
fn error_result(err: &BridgeError) -> CallToolResult {
    CallToolResult::error(vec![Content::text(err.to_string())])
}
