//! Chunk splitter for large unified diffs.
//!
//! Splits a raw diff at file boundaries first, then at hunk boundaries for
//! files that alone exceed the budget, and finally greedily bin-packs the
//! resulting pieces into output chunks. Chunks produced by file-level
//! packing concatenate (with `\n`) back to the original diff byte for byte;
//! hunk-split chunks each repeat their file's `diff --git / --- / +++`
//! header so the reviewer always sees the file context.

/// Coarse token estimate: one token per four bytes, rounded up.
///
/// Deliberately cheap; the downstream budget leaves headroom for prompt
/// scaffolding, so precision buys nothing here.
pub fn estimate_tokens(s: &str) -> usize {
    s.len().div_ceil(4)
}

/// Split `diff` into chunks of at most `max_tokens` estimated tokens.
///
/// A `max_tokens` of 0 means unbounded: the diff comes back as a single
/// chunk. Empty or whitespace-only input yields no chunks at all.
pub fn chunk(diff: &str, max_tokens: usize) -> Vec<String> {
    if diff.trim().is_empty() {
        return Vec::new();
    }
    if max_tokens == 0 {
        return vec![diff.to_string()];
    }

    let mut pieces: Vec<String> = Vec::new();
    for section in split_file_sections(diff) {
        if estimate_tokens(&section) <= max_tokens {
            pieces.push(section);
        } else {
            pieces.extend(split_section_by_hunks(&section, max_tokens));
        }
    }

    pack_pieces(pieces, max_tokens)
}

/// Split a diff into per-file sections at `diff --git ` line boundaries.
///
/// Sections partition the input lines exactly: joining them with `\n`
/// reproduces the input. A preamble before the first header (if any)
/// becomes its own leading section.
fn split_file_sections(diff: &str) -> Vec<String> {
    let mut sections: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in diff.split('\n') {
        if line.starts_with("diff --git ") && !current.is_empty() {
            sections.push(current.join("\n"));
            current = Vec::new();
        }
        current.push(line);
    }
    if !current.is_empty() {
        sections.push(current.join("\n"));
    }

    sections
}

/// Split one oversized file section at `@@ ` hunk boundaries.
///
/// Sections without hunk markers (binary patches, pure renames) and
/// sections with a single hunk are returned whole: a hunk is the smallest
/// unit we ever emit, even when it alone exceeds the budget.
fn split_section_by_hunks(section: &str, max_tokens: usize) -> Vec<String> {
    let lines: Vec<&str> = section.split('\n').collect();
    let Some(first_hunk) = lines.iter().position(|l| l.starts_with("@@ ")) else {
        return vec![section.to_string()];
    };

    let header = lines[..first_hunk].join("\n");
    let mut hunks: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for &line in &lines[first_hunk..] {
        if line.starts_with("@@ ") && !current.is_empty() {
            hunks.push(current.join("\n"));
            current = Vec::new();
        }
        current.push(line);
    }
    if !current.is_empty() {
        hunks.push(current.join("\n"));
    }

    if hunks.len() <= 1 {
        return vec![section.to_string()];
    }

    // Greedily bin-pack hunks; every chunk carries the file header.
    let header_tokens = estimate_tokens(&header);
    let mut chunks: Vec<String> = Vec::new();
    let mut bucket: Vec<String> = Vec::new();
    let mut bucket_tokens = header_tokens;

    for hunk in hunks {
        let hunk_tokens = estimate_tokens(&hunk);
        if !bucket.is_empty() && bucket_tokens + hunk_tokens > max_tokens {
            chunks.push(format!("{header}\n{}", bucket.join("\n")));
            bucket.clear();
            bucket_tokens = header_tokens;
        }
        bucket_tokens += hunk_tokens;
        bucket.push(hunk);
    }
    if !bucket.is_empty() {
        chunks.push(format!("{header}\n{}", bucket.join("\n")));
    }

    chunks
}

/// Greedily pack pieces into output chunks, opening a new chunk whenever
/// appending the next piece would exceed the budget.
fn pack_pieces(pieces: Vec<String>, max_tokens: usize) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut bucket: Vec<String> = Vec::new();
    let mut bucket_tokens = 0usize;

    for piece in pieces {
        let piece_tokens = estimate_tokens(&piece);
        if !bucket.is_empty() && bucket_tokens + piece_tokens > max_tokens {
            chunks.push(bucket.join("\n"));
            bucket.clear();
            bucket_tokens = 0;
        }
        bucket_tokens += piece_tokens;
        bucket.push(piece);
    }
    if !bucket.is_empty() {
        chunks.push(bucket.join("\n"));
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn file_section(path: &str, lines: usize) -> String {
        let mut s = format!(
            "diff --git a/{path} b/{path}\n--- a/{path}\n+++ b/{path}\n@@ -1,{lines} +1,{lines} @@"
        );
        for i in 0..lines {
            s.push_str(&format!("\n+line {i} of {path}"));
        }
        s
    }

    #[test]
    fn empty_diff_yields_no_chunks() {
        assert_eq!(chunk("", 100), Vec::<String>::new());
    }

    #[test]
    fn whitespace_diff_yields_no_chunks() {
        assert_eq!(chunk("  \n\t\n  ", 100), Vec::<String>::new());
    }

    #[test]
    fn zero_budget_means_unbounded() {
        let diff = file_section("a.rs", 500);
        assert_eq!(chunk(&diff, 0), vec![diff]);
    }

    #[test]
    fn small_diff_stays_whole() {
        let diff = file_section("a.rs", 3);
        let chunks = chunk(&diff, 10_000);
        assert_eq!(chunks, vec![diff]);
    }

    #[test]
    fn join_reconstructs_original_when_files_fit() {
        let diff = format!(
            "{}\n{}\n{}",
            file_section("a.rs", 20),
            file_section("b.rs", 20),
            file_section("c.rs", 20)
        );
        for budget in [1, 50, 120, 500, 100_000] {
            let chunks = chunk(&diff, budget);
            assert_eq!(chunks.join("\n"), diff, "budget {budget}");
        }
    }

    #[test]
    fn every_chunk_starts_with_file_header() {
        let diff = format!("{}\n{}", file_section("a.rs", 40), file_section("b.rs", 40));
        // Budget forces one file per chunk.
        let chunks = chunk(&diff, estimate_tokens(&file_section("a.rs", 40)) + 1);
        assert!(chunks.len() >= 2);
        for c in &chunks {
            assert!(c.starts_with("diff --git "), "chunk: {c}");
        }
    }

    #[test]
    fn files_within_budget_are_packed_together() {
        let a = file_section("a.rs", 5);
        let b = file_section("b.rs", 5);
        let diff = format!("{a}\n{b}");
        let chunks = chunk(&diff, 10_000);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], diff);
    }

    #[test]
    fn oversized_file_splits_at_hunk_boundaries_with_header() {
        let path = "big.rs";
        let mut diff = format!("diff --git a/{path} b/{path}\n--- a/{path}\n+++ b/{path}");
        for h in 0..4 {
            diff.push_str(&format!("\n@@ -{0},10 +{0},10 @@", h * 100 + 1));
            for i in 0..10 {
                diff.push_str(&format!("\n+hunk {h} line {i}"));
            }
        }

        let budget = estimate_tokens(&diff) / 2;
        let chunks = chunk(&diff, budget);
        assert!(chunks.len() > 1, "expected a split, got {}", chunks.len());
        for c in &chunks {
            assert!(c.starts_with(&format!("diff --git a/{path}")));
            assert!(c.contains("+++ b/big.rs"));
            assert!(c.contains("@@ "));
        }
        // All hunks survive, each exactly once.
        let rejoined = chunks.join("\n");
        for h in 0..4 {
            assert_eq!(
                rejoined.matches(&format!("hunk {h} line 0")).count(),
                1,
                "hunk {h}"
            );
        }
    }

    #[test]
    fn single_hunk_file_never_splits() {
        let diff = file_section("one.rs", 400);
        let chunks = chunk(&diff, 10);
        assert_eq!(chunks, vec![diff]);
    }

    #[test]
    fn oversized_single_hunk_within_multi_hunk_file_kept_whole() {
        let path = "mixed.rs";
        let mut diff = format!("diff --git a/{path} b/{path}\n--- a/{path}\n+++ b/{path}");
        diff.push_str("\n@@ -1,2 +1,2 @@\n+small hunk");
        diff.push_str("\n@@ -100,1 +100,1 @@");
        for i in 0..100 {
            diff.push_str(&format!("\n+giant hunk line {i}"));
        }

        let chunks = chunk(&diff, 30);
        // The giant hunk exceeds the budget on its own but is not split
        // further; it lands in a chunk by itself.
        let giant = chunks
            .iter()
            .find(|c| c.contains("giant hunk line 0"))
            .unwrap();
        assert!(giant.contains("giant hunk line 99"));
        assert!(giant.starts_with("diff --git "));
    }

    #[test]
    fn binary_diff_without_hunks_never_splits() {
        let diff = format!(
            "diff --git a/img.png b/img.png\nBinary files a/img.png and b/img.png differ\n{}",
            "x".repeat(4000)
        );
        let chunks = chunk(&diff, 10);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], diff);
    }

    #[test]
    fn rename_diff_without_hunks_never_splits() {
        let diff = "diff --git a/old.rs b/new.rs\nsimilarity index 100%\nrename from old.rs\nrename to new.rs";
        let chunks = chunk(diff, 1);
        assert_eq!(chunks, vec![diff.to_string()]);
    }

    #[test]
    fn token_estimate_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn preamble_before_first_header_is_preserved() {
        let diff = format!("Some preamble line\n{}", file_section("a.rs", 3));
        let chunks = chunk(&diff, 10_000);
        assert_eq!(chunks.join("\n"), diff);
        assert!(chunks[0].starts_with("Some preamble line"));
    }

    #[test]
    fn trailing_newline_survives_reconstruction() {
        let diff = format!("{}\n", file_section("a.rs", 3));
        let chunks = chunk(&diff, 10_000);
        assert_eq!(chunks.join("\n"), diff);
    }
}
