//! Finding types and per-kind severity enums.
//!
//! Plan and code reviews carry distinct severity vocabularies; keeping two
//! enums (rather than one lenient union) means a code review that emits
//! `"suggestion"` fails schema validation instead of being silently
//! accepted.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Severity of a plan review finding.
///
/// Variants are ordered ascending so `Ord` ranks `critical` highest.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    JsonSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlanSeverity {
    Suggestion,
    Minor,
    Major,
    Critical,
}

/// Severity of a code review finding.
///
/// Same ascending ordering: `nitpick < minor < major < critical`. Multi-chunk
/// dedup keeps the highest-ranked duplicate.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    JsonSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CodeSeverity {
    Nitpick,
    Minor,
    Major,
    Critical,
}

/// A single finding from a plan review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlanFinding {
    pub severity: PlanSeverity,
    /// Short classification, e.g. "architecture", "scope", "risk".
    pub category: String,
    pub description: String,
    /// File the finding refers to, when the plan names one.
    pub file: Option<String>,
    /// 1-based line number, when applicable.
    pub line: Option<u32>,
    /// Concrete improvement, when the reviewer has one.
    pub suggestion: Option<String>,
}

/// A single finding from a code review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CodeFinding {
    pub severity: CodeSeverity,
    /// Short classification, e.g. "bug", "security", "style".
    pub category: String,
    pub description: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub suggestion: Option<String>,
}

impl CodeFinding {
    /// Dedup key for merged multi-chunk results. Only findings anchored to
    /// both a file and a line participate in deduplication.
    pub fn dedup_key(&self) -> Option<(String, u32, String)> {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => Some((file.clone(), line, self.category.clone())),
            _ => None,
        }
    }
}
