//! Public error taxonomy and vendor error classification.
//!
//! Every fallible operation in the bridge resolves to a [`BridgeError`]
//! carrying one code from a closed set. Errors are values end to end; the
//! only `anyhow` boundary is the binary's `main`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Closed set of public error codes, surfaced as `CODE: message` strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A reviewer turn exceeded its deadline.
    CodexTimeout,
    /// Two consecutive malformed or schema-invalid responses.
    CodexParseError,
    /// External git invocation failed.
    GitError,
    /// Config file unreadable or invalid.
    ConfigError,
    /// Persistence operation failed.
    StorageError,
    /// Resume requested an unknown reviewer thread.
    SessionNotFound,
    /// Missing or invalid credential.
    AuthError,
    /// Model name unsupported.
    ModelError,
    /// Upstream rate-limit response.
    RateLimited,
    /// DNS/connect/fetch failure.
    NetworkError,
    /// Anything else; the raw message is preserved.
    UnknownError,
}

impl ErrorCode {
    /// The wire form of the code.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::CodexTimeout => "CODEX_TIMEOUT",
            ErrorCode::CodexParseError => "CODEX_PARSE_ERROR",
            ErrorCode::GitError => "GIT_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::SessionNotFound => "SESSION_NOT_FOUND",
            ErrorCode::AuthError => "AUTH_ERROR",
            ErrorCode::ModelError => "MODEL_ERROR",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure: one closed code plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct BridgeError {
    pub code: ErrorCode,
    pub message: String,
}

impl BridgeError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Deadline expiry for a reviewer turn.
    pub fn timeout(timeout_seconds: u64) -> Self {
        Self::new(
            ErrorCode::CodexTimeout,
            format!("review timed out after {timeout_seconds}s"),
        )
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::CodexParseError, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    pub fn git(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::GitError, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnknownError, message)
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Raw error surfaced by the vendor SDK boundary, before classification.
///
/// `name` carries the vendor error's class name when one exists (the SDK
/// reports cancellations as `AbortError`); `message` is the raw text.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct SdkError {
    pub name: Option<String>,
    pub message: String,
}

impl SdkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            name: None,
            message: message.into(),
        }
    }

    pub fn named(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            message: message.into(),
        }
    }

    /// True when the error is cancellation-shaped: an `AbortError` name or
    /// a message containing "aborted" (case-insensitive). These bypass
    /// classification and map straight to `CODEX_TIMEOUT`.
    pub fn is_cancellation(&self) -> bool {
        self.name
            .as_deref()
            .is_some_and(|n| n.eq_ignore_ascii_case("AbortError"))
            || self.message.to_lowercase().contains("aborted")
    }
}

/// Quoted model name inside a vendor error message, e.g. `model "x" not found`.
static QUOTED_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["'`]([^"'`]+)["'`]"#).expect("static regex"));

/// Map a vendor error string onto the closed taxonomy by case-insensitive
/// substring matching. Cancellation-shaped errors must be checked with
/// [`SdkError::is_cancellation`] *before* calling this.
///
/// `configured_model` is the fallback name for `MODEL_ERROR` messages when
/// the vendor text does not quote one.
pub fn classify_vendor_error(err: &SdkError, configured_model: &str) -> BridgeError {
    let lower = err.message.to_lowercase();

    if lower.contains("api key")
        || lower.contains("api_key")
        || lower.contains("authentication")
        || lower.contains("401")
    {
        return BridgeError::new(
            ErrorCode::AuthError,
            "missing or invalid API credential. Run `codex login` or set the API key.",
        );
    }

    if lower.contains("model") && (lower.contains("not supported") || lower.contains("not found")) {
        let model = QUOTED_NAME_RE
            .captures(&err.message)
            .and_then(|c| c.get(1))
            .map_or(configured_model, |m| m.as_str());
        return BridgeError::new(
            ErrorCode::ModelError,
            format!("model '{model}' is not supported"),
        );
    }

    if lower.contains("429") || lower.contains("rate_limit") || lower.contains("rate limit") {
        return BridgeError::new(
            ErrorCode::RateLimited,
            "rate limited by the reviewer backend; retry later",
        );
    }

    if lower.contains("fetch failed")
        || lower.contains("econnrefused")
        || lower.contains("enotfound")
    {
        return BridgeError::new(
            ErrorCode::NetworkError,
            format!("network failure reaching the reviewer backend: {}", err.message),
        );
    }

    BridgeError::unknown(err.message.clone())
}
