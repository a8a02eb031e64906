//! Shared types used across all modules.
//!
//! Defines the review kinds, per-kind severities and verdicts, finding
//! shapes, and the typed result objects returned to callers. Other modules
//! import from here rather than reaching into each other's internals.

pub mod finding;
pub mod review;

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::Display;

pub use finding::{CodeFinding, CodeSeverity, PlanFinding, PlanSeverity};
pub use review::{
    CodeReview, CodeVerdict, PlanReview, PlanVerdict, PrecommitReview, RawCodeReview,
    RawPlanReview, RawPrecommitReview,
};

/// The three review kinds the bridge dispatches.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReviewKind {
    Plan,
    Code,
    Precommit,
}

impl std::str::FromStr for ReviewKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plan" => Ok(ReviewKind::Plan),
            "code" => Ok(ReviewKind::Code),
            "precommit" => Ok(ReviewKind::Precommit),
            other => Err(format!("unknown review kind: {other}")),
        }
    }
}

/// How deeply a plan review should dig.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    ValueEnum,
    JsonSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReviewDepth {
    /// A fast pass over the major risks only.
    Quick,
    /// A full-depth review.
    #[default]
    Thorough,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_kind_display() {
        assert_eq!(ReviewKind::Plan.to_string(), "plan");
        assert_eq!(ReviewKind::Code.to_string(), "code");
        assert_eq!(ReviewKind::Precommit.to_string(), "precommit");
    }

    #[test]
    fn review_kind_roundtrips_through_from_str() {
        for kind in [ReviewKind::Plan, ReviewKind::Code, ReviewKind::Precommit] {
            assert_eq!(kind.to_string().parse::<ReviewKind>(), Ok(kind));
        }
        assert!("commit".parse::<ReviewKind>().is_err());
    }

    #[test]
    fn depth_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&ReviewDepth::Quick).unwrap(), "\"quick\"");
        let depth: ReviewDepth = serde_json::from_str("\"thorough\"").unwrap();
        assert_eq!(depth, ReviewDepth::Thorough);
    }
}
