//! Schema validation of reviewer output.
//!
//! Narrows raw response text to the typed shape for the current review
//! kind. Both failure classes are recoverable (they trigger the single
//! retry): text that contains no parseable JSON object, and JSON whose
//! shape or enums don't match the expected result type. Markdown fences
//! around the body are tolerated since models love to add them.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;

use crate::models::{RawCodeReview, RawPlanReview, RawPrecommitReview};

/// Why reviewer output failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No candidate in the response parsed as JSON at all.
    MalformedJson,
    /// JSON parsed but did not match the expected result shape.
    Schema(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MalformedJson => f.write_str("malformed JSON in response"),
            ValidationError::Schema(msg) => write!(f, "invalid response shape: {msg}"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a plan review response.
pub fn validate_plan(response: &str) -> Result<RawPlanReview, ValidationError> {
    let raw: RawPlanReview = narrow(response)?;
    for finding in &raw.findings {
        check_line(finding.line)?;
    }
    Ok(raw)
}

/// Validate a code review response.
pub fn validate_code(response: &str) -> Result<RawCodeReview, ValidationError> {
    let raw: RawCodeReview = narrow(response)?;
    for finding in &raw.findings {
        check_line(finding.line)?;
    }
    Ok(raw)
}

/// Validate a precommit gate response.
pub fn validate_precommit(response: &str) -> Result<RawPrecommitReview, ValidationError> {
    narrow(response)
}

/// Line numbers are 1-based; zero sneaks past the integer type.
fn check_line(line: Option<u32>) -> Result<(), ValidationError> {
    if line == Some(0) {
        return Err(ValidationError::Schema(
            "\"line\" must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

/// Try each extraction candidate against the typed shape. A candidate that
/// parses as JSON but misses the shape produces a schema error; if nothing
/// parses as JSON at all, the response is malformed.
fn narrow<T: DeserializeOwned>(response: &str) -> Result<T, ValidationError> {
    let mut schema_error: Option<String> = None;

    for candidate in candidates(response) {
        match serde_json::from_str::<serde_json::Value>(&candidate) {
            Ok(value) => match serde_json::from_value::<T>(value) {
                Ok(parsed) => return Ok(parsed),
                Err(e) => {
                    if schema_error.is_none() {
                        schema_error = Some(e.to_string());
                    }
                }
            },
            Err(_) => continue,
        }
    }

    match schema_error {
        Some(msg) => Err(ValidationError::Schema(msg)),
        None => Err(ValidationError::MalformedJson),
    }
}

/// Content inside markdown code fences. The closing ``` must start a line
/// so fences embedded in JSON string values don't truncate the match.
static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*\n(.*?)\n```").unwrap());

/// Candidate JSON strings, most-direct first: the trimmed response, the
/// slice between the first `{` and last `}`, then fenced blocks.
fn candidates(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    let mut out = vec![trimmed.to_string()];

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            out.push(trimmed[start..=end].to_string());
        }
    }

    for cap in FENCE_RE.captures_iter(trimmed) {
        if let Some(inner) = cap.get(1) {
            let inner = inner.as_str().trim();
            if !inner.is_empty() {
                out.push(inner.to_string());
            }
        }
    }

    out
}
