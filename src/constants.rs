//! App-wide constants.
//!
//! Centralises the tool name, config/database locations, environment
//! variable names, and prompt budget knobs so a rename only requires
//! changing this file.

use std::time::Duration;

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "review-bridge";

/// Crate version (from Cargo).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Short git commit hash baked in at build time.
pub const GIT_SHA: &str = env!("GIT_SHA");

/// Build date baked in at build time.
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Config filename looked up in the config directory (default: cwd).
pub const CONFIG_FILENAME: &str = ".reviewbridge.json";

/// Default reviewer model.
pub const DEFAULT_MODEL: &str = "gpt-5-codex";

/// Default per-turn deadline in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 300;

/// Default token budget per diff chunk.
pub const DEFAULT_MAX_CHUNK_TOKENS: usize = 8000;

/// Tokens reserved for fixed prompt scaffolding when budgeting diff chunks.
pub const PROMPT_FIXED_OVERHEAD_TOKENS: usize = 2000;

/// Floor for the diff chunk budget after subtracting prompt overhead.
pub const MIN_DIFF_BUDGET_TOKENS: usize = 500;

/// Default number of entries returned by a history query.
pub const DEFAULT_HISTORY_LIMIT: u32 = 10;

/// Idle-read timeout for piped stdin input; resets on each chunk read.
pub const STDIN_IDLE_TIMEOUT: Duration = Duration::from_secs(5);

// ── Environment variable names ──────────────────────────────────────

/// Database file path override (`:memory:` is permitted).
pub const ENV_DB_PATH: &str = "REVIEW_BRIDGE_DB";

/// Default database filename when `REVIEW_BRIDGE_DB` is unset.
pub const DEFAULT_DB_FILE: &str = "reviews.db";

pub const ENV_NO_COLOR: &str = "NO_COLOR";
pub const ENV_FORCE_COLOR: &str = "FORCE_COLOR";
