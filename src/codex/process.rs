//! `codex` CLI adapter for the SDK boundary.
//!
//! Each turn spawns `codex exec --json` (or `codex exec resume <id> --json`
//! for follow-up turns), feeds the prompt on stdin, and reads the JSONL
//! event stream from stdout. The thread id is taken from the first event
//! that carries one; the final agent message becomes the turn output.
//!
//! The child is spawned with `kill_on_drop`, so when the reviewer client's
//! deadline fires and the turn future is dropped, the process dies with it.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::{ReviewerSdk, ReviewerThread, ThreadOptions, TurnOutput};
use crate::error::SdkError;

/// SDK implementation backed by the `codex` binary on `$PATH`.
pub struct CodexCli {
    binary: PathBuf,
}

impl CodexCli {
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("codex"),
        }
    }

    /// Use a specific binary instead of resolving `codex` from `$PATH`.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for CodexCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReviewerSdk for CodexCli {
    async fn start_thread(
        &self,
        opts: &ThreadOptions,
    ) -> Result<Box<dyn ReviewerThread>, SdkError> {
        Ok(Box::new(CodexThread {
            binary: self.binary.clone(),
            opts: opts.clone(),
            thread_id: None,
        }))
    }

    async fn resume_thread(
        &self,
        session_id: &str,
        opts: &ThreadOptions,
    ) -> Result<Box<dyn ReviewerThread>, SdkError> {
        Ok(Box::new(CodexThread {
            binary: self.binary.clone(),
            opts: opts.clone(),
            thread_id: Some(session_id.to_string()),
        }))
    }
}

/// One reviewer conversation, realised as sequential `codex exec` calls
/// that resume the same backend session.
struct CodexThread {
    binary: PathBuf,
    opts: ThreadOptions,
    thread_id: Option<String>,
}

#[async_trait]
impl ReviewerThread for CodexThread {
    async fn run(
        &mut self,
        prompt: &str,
        output_schema: &serde_json::Value,
    ) -> Result<TurnOutput, SdkError> {
        // --output-schema takes a file path; park the schema in tmp.
        let schema_path = std::env::temp_dir().join(format!(
            "review-bridge-schema-{}.json",
            Uuid::new_v4().simple()
        ));
        let schema_bytes = serde_json::to_vec(output_schema)
            .map_err(|e| SdkError::new(format!("failed to serialize output schema: {e}")))?;
        tokio::fs::write(&schema_path, schema_bytes)
            .await
            .map_err(|e| SdkError::new(format!("failed to write output schema: {e}")))?;

        let result = self.run_inner(prompt, &schema_path).await;
        let _ = tokio::fs::remove_file(&schema_path).await;
        result
    }

    fn id(&self) -> Option<String> {
        self.thread_id.clone()
    }
}

impl CodexThread {
    async fn run_inner(
        &mut self,
        prompt: &str,
        schema_path: &std::path::Path,
    ) -> Result<TurnOutput, SdkError> {
        let mut cmd = tokio::process::Command::new(&self.binary);
        cmd.arg("exec");
        if let Some(id) = &self.thread_id {
            cmd.args(["resume", id]);
        }
        cmd.args(["--json", "--sandbox", self.opts.sandbox_mode])
            .args(["--model", &self.opts.model])
            .args([
                "-c",
                &format!("model_reasoning_effort={}", self.opts.reasoning_effort),
            ]);
        if self.opts.skip_git_repo_check {
            cmd.arg("--skip-git-repo-check");
        }
        cmd.arg("--output-schema").arg(schema_path);
        // "-" reads the prompt from stdin
        cmd.arg("-");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|e| SdkError::new(format!("failed to launch codex: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .await
                .map_err(|e| SdkError::new(format!("failed to write prompt: {e}")))?;
            // Close stdin so codex sees EOF.
            drop(stdin);
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| SdkError::new(format!("failed to wait for codex: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim();
            return Err(SdkError::new(if detail.is_empty() {
                format!("codex exited with {}", output.status)
            } else {
                detail.to_string()
            }));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let (thread_id, final_response) = parse_events(&stdout);

        if let Some(id) = thread_id {
            self.thread_id = Some(id);
        }

        match final_response {
            Some(text) => Ok(TurnOutput {
                final_response: text,
            }),
            None => Err(SdkError::new("codex produced no agent message")),
        }
    }
}

/// Scan the JSONL event stream for the thread id and the last agent
/// message. Non-JSON lines are skipped; unknown event shapes are ignored.
fn parse_events(stdout: &str) -> (Option<String>, Option<String>) {
    let mut thread_id: Option<String> = None;
    let mut final_response: Option<String> = None;

    for line in stdout.lines() {
        let Ok(event) = serde_json::from_str::<serde_json::Value>(line) else {
            continue;
        };

        if thread_id.is_none() {
            let id = event
                .get("thread_id")
                .or_else(|| event.get("session_id"))
                .and_then(|v| v.as_str());
            if let Some(id) = id {
                thread_id = Some(id.to_string());
            }
        }

        let event_type = event.get("type").and_then(|v| v.as_str()).unwrap_or("");
        match event_type {
            "item.completed" => {
                let item = &event["item"];
                let item_type = item
                    .get("type")
                    .or_else(|| item.get("item_type"))
                    .and_then(|v| v.as_str());
                if item_type == Some("agent_message") {
                    if let Some(text) = item.get("text").and_then(|v| v.as_str()) {
                        final_response = Some(text.to_string());
                    }
                }
            }
            "agent_message" => {
                if let Some(text) = event.get("message").and_then(|v| v.as_str()) {
                    final_response = Some(text.to_string());
                }
            }
            _ => {}
        }
    }

    (thread_id, final_response)
}
