//! Verdict enums and per-kind review result types.
//!
//! Each kind has two shapes: the *raw* shape the reviewer model emits
//! (no `session_id`, which the model never knows) and the public result the
//! bridge returns after attaching the session id and, for chunked runs,
//! the chunk count.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::Display;

use super::finding::{CodeFinding, PlanFinding};

/// Verdict of a plan review.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlanVerdict {
    Approve,
    Revise,
    Reject,
}

/// Verdict of a code review.
///
/// Variant order defines merge precedence: the worst verdict across chunks
/// wins, under `approve < request_changes < reject`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CodeVerdict {
    Approve,
    RequestChanges,
    Reject,
}

// ── Raw shapes (what the reviewer model emits) ──────────────────────

/// Plan review as emitted by the model, before session attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawPlanReview {
    pub verdict: PlanVerdict,
    pub summary: String,
    #[serde(default)]
    pub findings: Vec<PlanFinding>,
}

/// Code review as emitted by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawCodeReview {
    pub verdict: CodeVerdict,
    pub summary: String,
    #[serde(default)]
    pub findings: Vec<CodeFinding>,
}

/// Precommit gate as emitted by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawPrecommitReview {
    pub ready_to_commit: bool,
    #[serde(default)]
    pub blockers: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

// ── Public results ──────────────────────────────────────────────────

/// Completed plan review returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanReview {
    pub verdict: PlanVerdict,
    pub summary: String,
    pub findings: Vec<PlanFinding>,
    pub session_id: String,
}

/// Completed code review returned to the caller.
///
/// `chunks_reviewed` is present only when the diff was split: a
/// single-chunk review omits the field entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeReview {
    pub verdict: CodeVerdict,
    pub summary: String,
    pub findings: Vec<CodeFinding>,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks_reviewed: Option<u32>,
}

/// Completed precommit gate returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecommitReview {
    pub ready_to_commit: bool,
    pub blockers: Vec<String>,
    pub warnings: Vec<String>,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks_reviewed: Option<u32>,
}

impl PlanReview {
    pub fn from_raw(raw: RawPlanReview, session_id: String) -> Self {
        Self {
            verdict: raw.verdict,
            summary: raw.summary,
            findings: raw.findings,
            session_id,
        }
    }
}

impl CodeReview {
    pub fn from_raw(raw: RawCodeReview, session_id: String) -> Self {
        Self {
            verdict: raw.verdict,
            summary: raw.summary,
            findings: raw.findings,
            session_id,
            chunks_reviewed: None,
        }
    }
}

impl PrecommitReview {
    pub fn from_raw(raw: RawPrecommitReview, session_id: String) -> Self {
        Self {
            ready_to_commit: raw.ready_to_commit,
            blockers: raw.blockers,
            warnings: raw.warnings,
            session_id,
            chunks_reviewed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::finding::{CodeSeverity, PlanSeverity};

    #[test]
    fn code_verdict_precedence() {
        assert!(CodeVerdict::Approve < CodeVerdict::RequestChanges);
        assert!(CodeVerdict::RequestChanges < CodeVerdict::Reject);
    }

    #[test]
    fn code_verdict_serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&CodeVerdict::RequestChanges).unwrap(),
            "\"request_changes\""
        );
        let verdict: CodeVerdict = serde_json::from_str("\"request_changes\"").unwrap();
        assert_eq!(verdict, CodeVerdict::RequestChanges);
    }

    #[test]
    fn raw_plan_review_findings_default_to_empty() {
        let raw: RawPlanReview =
            serde_json::from_str(r#"{"verdict":"approve","summary":"ok"}"#).unwrap();
        assert!(raw.findings.is_empty());
    }

    #[test]
    fn single_chunk_code_review_omits_chunk_count() {
        let review = CodeReview {
            verdict: CodeVerdict::Approve,
            summary: "fine".into(),
            findings: vec![],
            session_id: "thread_1".into(),
            chunks_reviewed: None,
        };
        let json = serde_json::to_value(&review).unwrap();
        assert!(json.get("chunks_reviewed").is_none());
    }

    #[test]
    fn multi_chunk_code_review_serializes_chunk_count() {
        let review = CodeReview {
            verdict: CodeVerdict::Reject,
            summary: "bad".into(),
            findings: vec![],
            session_id: "thread_1".into(),
            chunks_reviewed: Some(3),
        };
        let json = serde_json::to_value(&review).unwrap();
        assert_eq!(json["chunks_reviewed"], 3);
    }

    #[test]
    fn from_raw_attaches_session_id() {
        let raw = RawPlanReview {
            verdict: PlanVerdict::Revise,
            summary: "needs work".into(),
            findings: vec![PlanFinding {
                severity: PlanSeverity::Major,
                category: "scope".into(),
                description: "missing rollout plan".into(),
                file: None,
                line: None,
                suggestion: None,
            }],
        };
        let review = PlanReview::from_raw(raw, "thread_abc".into());
        assert_eq!(review.session_id, "thread_abc");
        assert_eq!(review.findings.len(), 1);
    }

    #[test]
    fn raw_code_review_rejects_plan_verdict() {
        let result = serde_json::from_str::<RawCodeReview>(
            r#"{"verdict":"revise","summary":"no such verdict here"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn code_finding_severity_used_in_raw_review() {
        let raw: RawCodeReview = serde_json::from_str(
            r#"{
                "verdict": "request_changes",
                "summary": "one bug",
                "findings": [{
                    "severity": "critical",
                    "category": "bug",
                    "description": "overflow",
                    "file": "src/a.rs",
                    "line": 7,
                    "suggestion": null
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(raw.findings[0].severity, CodeSeverity::Critical);
    }
}
