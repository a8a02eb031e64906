//! Merging of multi-chunk review results.
//!
//! Code reviews merge under worst-verdict precedence with structural
//! finding deduplication; precommit gates AND their readiness flags and
//! concatenate issue lists. Merging is purely structural: two findings
//! that describe the same problem in different words survive as two.

use indexmap::IndexMap;

use crate::models::{
    CodeFinding, CodeReview, CodeVerdict, PrecommitReview, RawCodeReview, RawPrecommitReview,
};

/// Merge sequentially-reviewed code chunks into one result.
///
/// Verdict: worst wins (`approve < request_changes < reject`). Summary:
/// per-chunk summaries joined with a single space. Findings: deduplicated
/// by `(file, line, category)`; see [`dedup_findings`].
pub fn merge_code(chunks: Vec<RawCodeReview>, session_id: String) -> CodeReview {
    let count = chunks.len() as u32;
    let verdict = chunks
        .iter()
        .map(|c| c.verdict)
        .max()
        .unwrap_or(CodeVerdict::Approve);
    let summary = chunks
        .iter()
        .map(|c| c.summary.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let findings = dedup_findings(chunks.into_iter().flat_map(|c| c.findings).collect());

    CodeReview {
        verdict,
        summary,
        findings,
        session_id,
        chunks_reviewed: Some(count),
    }
}

/// Deduplicate findings that share `(file, line, category)` with both
/// `file` and `line` non-null.
///
/// The survivor keeps the highest severity seen for its key and sits at
/// the position of the key's most recent occurrence; on equal severity the
/// later finding's text wins. Findings without a full key are never
/// deduplicated and trail the keyed ones in their original order.
pub fn dedup_findings(findings: Vec<CodeFinding>) -> Vec<CodeFinding> {
    let mut keyed: IndexMap<(String, u32, String), CodeFinding> = IndexMap::new();
    let mut unkeyed: Vec<CodeFinding> = Vec::new();

    for finding in findings {
        match finding.dedup_key() {
            Some(key) => {
                let winner = match keyed.shift_remove(&key) {
                    Some(existing) if existing.severity > finding.severity => existing,
                    _ => finding,
                };
                keyed.insert(key, winner);
            }
            None => unkeyed.push(finding),
        }
    }

    keyed.into_values().chain(unkeyed).collect()
}

/// Merge sequentially-reviewed precommit chunks into one result.
///
/// Ready only when every chunk is ready; blockers and warnings concatenate
/// in chunk order with no deduplication.
pub fn merge_precommit(chunks: Vec<RawPrecommitReview>, session_id: String) -> PrecommitReview {
    let count = chunks.len() as u32;
    let mut ready = true;
    let mut blockers = Vec::new();
    let mut warnings = Vec::new();

    for chunk in chunks {
        ready &= chunk.ready_to_commit;
        blockers.extend(chunk.blockers);
        warnings.extend(chunk.warnings);
    }

    PrecommitReview {
        ready_to_commit: ready,
        blockers,
        warnings,
        session_id,
        chunks_reviewed: Some(count),
    }
}
