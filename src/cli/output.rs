//! Terminal renderers for review results.
//!
//! Styled flowing text, one finding per block, a summary line at the end.

use colored::Colorize;

use crate::models::finding::{CodeFinding, CodeSeverity, PlanFinding, PlanSeverity};
use crate::models::{CodeReview, CodeVerdict, PlanReview, PlanVerdict, PrecommitReview};

/// Render a plan review for the terminal.
pub fn render_plan(review: &PlanReview) -> String {
    let verdict = match review.verdict {
        PlanVerdict::Approve => "PLAN APPROVED".green().bold(),
        PlanVerdict::Revise => "PLAN NEEDS REVISION".yellow().bold(),
        PlanVerdict::Reject => "PLAN REJECTED".red().bold(),
    };

    let mut out = format!(
        " {} {}\n\n {}\n",
        verdict,
        format!("(session {})", review.session_id).dimmed(),
        review.summary
    );

    if !review.findings.is_empty() {
        out.push('\n');
        for finding in &review.findings {
            out.push_str(&render_plan_finding(finding));
        }
    }

    out.push_str(&format!(
        "{}\n {} finding(s)\n",
        "───────────────────────────────────".dimmed(),
        review.findings.len().to_string().bold()
    ));

    out
}

/// Render a code review for the terminal.
pub fn render_code(review: &CodeReview) -> String {
    let verdict = match review.verdict {
        CodeVerdict::Approve => "APPROVED".green().bold(),
        CodeVerdict::RequestChanges => "CHANGES REQUESTED".yellow().bold(),
        CodeVerdict::Reject => "REJECTED".red().bold(),
    };

    let mut out = format!(
        " {} {}\n",
        verdict,
        format!("(session {})", review.session_id).dimmed()
    );
    if let Some(chunks) = review.chunks_reviewed {
        out.push_str(&format!(" {}\n", format!("reviewed in {chunks} chunks").dimmed()));
    }
    out.push_str(&format!("\n {}\n", review.summary));

    if !review.findings.is_empty() {
        out.push('\n');
        for finding in &review.findings {
            out.push_str(&render_code_finding(finding));
        }
    }

    out.push_str(&format!(
        "{}\n {} finding(s)\n",
        "───────────────────────────────────".dimmed(),
        review.findings.len().to_string().bold()
    ));

    out
}

/// Render a precommit gate for the terminal.
pub fn render_precommit(review: &PrecommitReview) -> String {
    let mut out = if review.ready_to_commit {
        format!(
            " {} {}\n",
            "✔ READY TO COMMIT".green().bold(),
            format!("(session {})", review.session_id).dimmed()
        )
    } else {
        format!(
            " {} {}\n",
            "✖ COMMIT BLOCKED".red().bold(),
            format!("(session {})", review.session_id).dimmed()
        )
    };

    if !review.blockers.is_empty() {
        out.push_str(&format!("\n {}\n", "Blockers:".red().bold()));
        for blocker in &review.blockers {
            out.push_str(&format!("   {} {blocker}\n", "✖".red()));
        }
    }

    if !review.warnings.is_empty() {
        out.push_str(&format!("\n {}\n", "Warnings:".yellow().bold()));
        for warning in &review.warnings {
            out.push_str(&format!("   {} {warning}\n", "⚠".yellow()));
        }
    }

    if let Some(chunks) = review.chunks_reviewed {
        out.push_str(&format!("\n {}\n", format!("reviewed in {chunks} chunks").dimmed()));
    }

    out
}

fn render_plan_finding(finding: &PlanFinding) -> String {
    let severity = match finding.severity {
        PlanSeverity::Critical => "critical".red().bold().to_string(),
        PlanSeverity::Major => "major".red().to_string(),
        PlanSeverity::Minor => "minor".yellow().to_string(),
        PlanSeverity::Suggestion => "suggestion".blue().to_string(),
    };
    render_finding_block(
        &severity,
        &finding.category,
        &finding.description,
        finding.file.as_deref(),
        finding.line,
        finding.suggestion.as_deref(),
    )
}

fn render_code_finding(finding: &CodeFinding) -> String {
    let severity = match finding.severity {
        CodeSeverity::Critical => "critical".red().bold().to_string(),
        CodeSeverity::Major => "major".red().to_string(),
        CodeSeverity::Minor => "minor".yellow().to_string(),
        CodeSeverity::Nitpick => "nitpick".blue().to_string(),
    };
    render_finding_block(
        &severity,
        &finding.category,
        &finding.description,
        finding.file.as_deref(),
        finding.line,
        finding.suggestion.as_deref(),
    )
}

fn render_finding_block(
    severity: &str,
    category: &str,
    description: &str,
    file: Option<&str>,
    line: Option<u32>,
    suggestion: Option<&str>,
) -> String {
    let location = match (file, line) {
        (Some(file), Some(line)) => format!(" in {}", format!("{file}:{line}").bold()),
        (Some(file), None) => format!(" in {}", file.bold()),
        _ => String::new(),
    };

    let mut block = format!(" {severity} [{category}]{location}\n   {description}\n");
    if let Some(suggestion) = suggestion {
        block.push_str(&format!("   {} {suggestion}\n", "→".cyan()));
    }
    block.push('\n');
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::finding::CodeSeverity;

    fn plain() {
        // Deterministic assertions regardless of the test environment.
        colored::control::set_override(false);
    }

    #[test]
    fn precommit_blocked_output_names_blockers() {
        plain();
        let review = PrecommitReview {
            ready_to_commit: false,
            blockers: vec!["Missing error handling".to_string()],
            warnings: vec![],
            session_id: "s1".to_string(),
            chunks_reviewed: None,
        };
        let out = render_precommit(&review);
        assert!(out.contains("COMMIT BLOCKED"));
        assert!(out.contains("Missing error handling"));
        assert!(!out.contains("Warnings:"));
    }

    #[test]
    fn precommit_ready_output() {
        plain();
        let review = PrecommitReview {
            ready_to_commit: true,
            blockers: vec![],
            warnings: vec!["Consider splitting the commit".to_string()],
            session_id: "s1".to_string(),
            chunks_reviewed: Some(2),
        };
        let out = render_precommit(&review);
        assert!(out.contains("READY TO COMMIT"));
        assert!(out.contains("Consider splitting the commit"));
        assert!(out.contains("reviewed in 2 chunks"));
    }

    #[test]
    fn plan_render_includes_summary_and_findings() {
        plain();
        let review = PlanReview {
            verdict: PlanVerdict::Revise,
            summary: "Needs a rollback plan.".to_string(),
            findings: vec![PlanFinding {
                severity: PlanSeverity::Major,
                category: "risk".to_string(),
                description: "No rollback strategy".to_string(),
                file: None,
                line: None,
                suggestion: Some("Add a feature flag".to_string()),
            }],
            session_id: "s1".to_string(),
        };
        let out = render_plan(&review);
        assert!(out.contains("PLAN NEEDS REVISION"));
        assert!(out.contains("Needs a rollback plan."));
        assert!(out.contains("major [risk]"));
        assert!(out.contains("Add a feature flag"));
        assert!(out.contains("1 finding(s)"));
    }

    #[test]
    fn code_render_includes_location() {
        plain();
        let review = CodeReview {
            verdict: CodeVerdict::RequestChanges,
            summary: "One real bug.".to_string(),
            findings: vec![CodeFinding {
                severity: CodeSeverity::Critical,
                category: "bug".to_string(),
                description: "Overflow on empty input".to_string(),
                file: Some("src/parse.rs".to_string()),
                line: Some(88),
                suggestion: None,
            }],
            session_id: "s1".to_string(),
            chunks_reviewed: Some(3),
        };
        let out = render_code(&review);
        assert!(out.contains("CHANGES REQUESTED"));
        assert!(out.contains("src/parse.rs:88"));
        assert!(out.contains("reviewed in 3 chunks"));
    }

    #[test]
    fn code_render_without_chunks_omits_note() {
        plain();
        let review = CodeReview {
            verdict: CodeVerdict::Approve,
            summary: "Fine.".to_string(),
            findings: vec![],
            session_id: "s1".to_string(),
            chunks_reviewed: None,
        };
        let out = render_code(&review);
        assert!(!out.contains("reviewed in"));
        assert!(out.contains("0 finding(s)"));
    }
}
