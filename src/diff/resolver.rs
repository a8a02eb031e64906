//! Precommit diff resolution.
//!
//! An explicitly supplied diff always wins, even when it is empty: the
//! caller said "review exactly this". Only when no diff is given and
//! auto-diff is enabled do we consult the git index.

use std::path::Path;

use super::{git, DiffError};

/// What the caller handed the precommit handler.
#[derive(Debug, Clone)]
pub struct DiffSource {
    /// Pre-computed unified diff, if the caller supplied one.
    pub diff: Option<String>,
    /// Whether to fall back to `git diff --cached`. Defaults to true.
    pub auto_diff: bool,
}

impl Default for DiffSource {
    fn default() -> Self {
        Self::auto()
    }
}

impl DiffSource {
    pub fn explicit(diff: impl Into<String>) -> Self {
        Self {
            diff: Some(diff.into()),
            auto_diff: true,
        }
    }

    pub fn auto() -> Self {
        Self {
            diff: None,
            auto_diff: true,
        }
    }
}

/// Resolve the diff to review.
///
/// Precedence: explicit diff (even empty) → staged diff when `auto_diff`
/// → error. An empty staged diff is the `NoStagedChanges` sentinel.
pub async fn resolve(source: &DiffSource, dir: &Path) -> Result<String, DiffError> {
    if let Some(diff) = &source.diff {
        return Ok(diff.clone());
    }

    if !source.auto_diff {
        return Err(DiffError::AutoDiffDisabled);
    }

    let staged = git::staged_diff(dir).await?;
    if staged.trim().is_empty() {
        return Err(DiffError::NoStagedChanges);
    }
    Ok(staged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn explicit_diff_wins() {
        let source = DiffSource::explicit("diff --git a/x b/x\n+1");
        let resolved = resolve(&source, Path::new(".")).await.unwrap();
        assert_eq!(resolved, "diff --git a/x b/x\n+1");
    }

    #[tokio::test]
    async fn explicit_empty_diff_still_wins() {
        // An empty explicit diff must NOT fall through to git.
        let source = DiffSource::explicit("");
        let resolved = resolve(&source, Path::new("/nonexistent")).await.unwrap();
        assert_eq!(resolved, "");
    }

    #[tokio::test]
    async fn auto_diff_disabled_without_diff_errors() {
        let source = DiffSource {
            diff: None,
            auto_diff: false,
        };
        let err = resolve(&source, Path::new(".")).await.unwrap_err();
        assert_eq!(err, DiffError::AutoDiffDisabled);
    }

    #[tokio::test]
    async fn empty_index_is_no_staged_changes() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path();
        for args in [
            vec!["init"],
            vec!["config", "user.email", "test@test.com"],
            vec!["config", "user.name", "Test"],
        ] {
            tokio::process::Command::new("git")
                .args(&args)
                .current_dir(p)
                .output()
                .await
                .unwrap();
        }

        let err = resolve(&DiffSource::auto(), p).await.unwrap_err();
        assert_eq!(err, DiffError::NoStagedChanges);
    }

    #[tokio::test]
    async fn git_failure_surfaces_as_git_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve(&DiffSource::auto(), dir.path()).await.unwrap_err();
        assert!(matches!(err, DiffError::Git(_)));
    }
}
