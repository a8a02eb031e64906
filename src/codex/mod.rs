//! Vendor SDK boundary for the reviewer backend.
//!
//! The reviewer client talks to an opaque SDK through the two traits
//! below, which decouples the review engine from the concrete backend.
//! Production uses the `codex` CLI adapter in [`process`]; tests use
//! scripted mocks.

pub mod process;

use async_trait::async_trait;

use crate::config::{Config, ReasoningEffort};
use crate::error::SdkError;

/// Options applied when starting or resuming a reviewer thread.
#[derive(Debug, Clone)]
pub struct ThreadOptions {
    pub model: String,
    /// The reviewer never needs to write; threads run sandboxed read-only.
    pub sandbox_mode: &'static str,
    /// Reviews run against arbitrary working directories, not necessarily
    /// git checkouts.
    pub skip_git_repo_check: bool,
    pub reasoning_effort: ReasoningEffort,
}

impl ThreadOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.model.clone(),
            sandbox_mode: "read-only",
            skip_git_repo_check: true,
            reasoning_effort: config.reasoning_effort,
        }
    }
}

/// The reviewer's answer to one turn.
#[derive(Debug, Clone)]
pub struct TurnOutput {
    /// Raw final message text; expected (but not guaranteed) to be JSON.
    pub final_response: String,
}

/// One reviewer conversation. Short-lived: acquired per request (or per
/// chunk), used for one or two turns, then dropped. Never cached.
#[async_trait]
pub trait ReviewerThread: Send {
    /// Run one prompt/response exchange. `output_schema` is the JSON
    /// schema the backend should steer its final message toward.
    async fn run(
        &mut self,
        prompt: &str,
        output_schema: &serde_json::Value,
    ) -> Result<TurnOutput, SdkError>;

    /// The backend's identifier for this thread, once known. Becomes the
    /// caller-visible `session_id`.
    fn id(&self) -> Option<String>;
}

/// Factory for reviewer threads.
#[async_trait]
pub trait ReviewerSdk: Send + Sync {
    /// Open a fresh thread.
    async fn start_thread(
        &self,
        opts: &ThreadOptions,
    ) -> Result<Box<dyn ReviewerThread>, SdkError>;

    /// Reattach to an existing thread by id.
    async fn resume_thread(
        &self,
        session_id: &str,
        opts: &ThreadOptions,
    ) -> Result<Box<dyn ReviewerThread>, SdkError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_options_mirror_config() {
        let mut config = Config::default();
        config.model = "custom".to_string();
        config.reasoning_effort = ReasoningEffort::High;

        let opts = ThreadOptions::from_config(&config);
        assert_eq!(opts.model, "custom");
        assert_eq!(opts.sandbox_mode, "read-only");
        assert!(opts.skip_git_repo_check);
        assert_eq!(opts.reasoning_effort, ReasoningEffort::High);
    }
}
