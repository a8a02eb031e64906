//! Configuration loading for `.reviewbridge.json`.
//!
//! The config is read once at startup and immutable thereafter. A missing
//! file yields [`Config::default()`]; an unreadable or malformed file fails
//! the whole load, since a half-applied config is worse than none.

use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

use crate::constants::{CONFIG_FILENAME, DEFAULT_MAX_CHUNK_TOKENS, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECONDS};
use crate::models::finding::CodeSeverity;
use crate::models::ReviewDepth;

/// Errors during config loading. All of them surface as `CONFIG_ERROR`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Reasoning effort forwarded to the reviewer thread.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReasoningEffort {
    Low,
    #[default]
    Medium,
    High,
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reviewer model name.
    #[serde(rename = "model_name")]
    pub model: String,
    pub reasoning_effort: ReasoningEffort,
    /// Per-turn deadline in seconds. Each chunk of a multi-chunk review
    /// gets its own deadline.
    pub timeout_seconds: u64,
    /// Token budget per diff chunk, including prompt scaffolding headroom.
    pub max_chunk_tokens: usize,
    /// Background blurb injected into every prompt.
    pub project_context: String,
    pub plan: PlanDefaults,
    pub code: CodeDefaults,
    pub precommit: PrecommitDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            reasoning_effort: ReasoningEffort::default(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            max_chunk_tokens: DEFAULT_MAX_CHUNK_TOKENS,
            project_context: String::new(),
            plan: PlanDefaults::default(),
            code: CodeDefaults::default(),
            precommit: PrecommitDefaults::default(),
        }
    }
}

/// Defaults applied to plan reviews when the request omits them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanDefaults {
    pub focus: Vec<String>,
    pub depth: ReviewDepth,
}

/// Defaults applied to code reviews when the request omits them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeDefaults {
    pub criteria: Vec<String>,
    /// When set, the reviewer is told to flag changes without tests.
    pub require_tests: bool,
}

/// Defaults applied to precommit gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecommitDefaults {
    /// Severities at or above which a finding blocks the commit.
    pub block_on: Vec<CodeSeverity>,
}

impl Default for PrecommitDefaults {
    fn default() -> Self {
        Self {
            block_on: vec![CodeSeverity::Critical, CodeSeverity::Major],
        }
    }
}

impl Config {
    /// Load configuration from `<dir>/.reviewbridge.json`.
    ///
    /// `dir` defaults to the current working directory. A missing file
    /// yields defaults; anything else that goes wrong fails the load.
    pub fn load(dir: Option<&Path>) -> Result<Self, ConfigError> {
        let path = dir.unwrap_or_else(|| Path::new(".")).join(CONFIG_FILENAME);
        if !path.exists() {
            return Ok(Config::default());
        }
        Self::load_file(&path)
    }

    /// Load a config from a specific file.
    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseFile {
                path: path.to_path_buf(),
                source: e,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Structural checks serde cannot express.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "timeout_seconds must be a positive integer".to_string(),
            ));
        }
        if self.max_chunk_tokens == 0 {
            return Err(ConfigError::Invalid(
                "max_chunk_tokens must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.model, "gpt-5-codex");
        assert_eq!(config.reasoning_effort, ReasoningEffort::Medium);
        assert_eq!(config.timeout_seconds, 300);
        assert_eq!(config.max_chunk_tokens, 8000);
        assert!(config.project_context.is_empty());
        assert_eq!(config.plan.depth, ReviewDepth::Thorough);
        assert!(!config.code.require_tests);
        assert_eq!(
            config.precommit.block_on,
            vec![CodeSeverity::Critical, CodeSeverity::Major]
        );
    }

    #[test]
    fn empty_object_parses_to_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn default_config_roundtrips_through_json() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Config::default());
    }

    #[test]
    fn partial_config_keeps_remaining_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"model_name": "custom-model", "plan": {"depth": "quick"}}"#,
        )
        .unwrap();
        assert_eq!(config.model, "custom-model");
        assert_eq!(config.plan.depth, ReviewDepth::Quick);
        assert_eq!(config.timeout_seconds, 300);
    }

    #[test]
    fn negative_timeout_rejected() {
        let result = serde_json::from_str::<Config>(r#"{"timeout_seconds": -5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn non_integer_timeout_rejected() {
        let result = serde_json::from_str::<Config>(r#"{"timeout_seconds": 1.5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let config: Config = serde_json::from_str(r#"{"timeout_seconds": 0}"#).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_seconds"));
    }

    #[test]
    fn unknown_reasoning_effort_rejected() {
        let result = serde_json::from_str::<Config>(r#"{"reasoning_effort": "maximum"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_block_on_value_rejected() {
        let result =
            serde_json::from_str::<Config>(r#"{"precommit": {"block_on": ["catastrophic"]}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn plan_severity_not_valid_for_block_on() {
        let result =
            serde_json::from_str::<Config>(r#"{"precommit": {"block_on": ["suggestion"]}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(dir.path())).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_reads_file_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILENAME),
            r#"{"model_name": "o4-review", "timeout_seconds": 60}"#,
        )
        .unwrap();

        let config = Config::load(Some(dir.path())).unwrap();
        assert_eq!(config.model, "o4-review");
        assert_eq!(config.timeout_seconds, 60);
    }

    #[test]
    fn load_malformed_json_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "{not json").unwrap();

        let result = Config::load(Some(dir.path()));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("parse"));
    }
}
