//! Git CLI wrapper for reading the staged diff.
//!
//! Shells out to `git` via `tokio::process::Command`.

use std::path::Path;

use super::DiffError;

/// Run `git diff --cached` and return the unified diff of staged changes.
pub async fn staged_diff(dir: &Path) -> Result<String, DiffError> {
    let output = tokio::process::Command::new("git")
        .args(["diff", "--cached"])
        .current_dir(dir)
        .output()
        .await
        .map_err(|e| DiffError::Git(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DiffError::Git(format!(
            "git diff --cached failed (exit {}): {}",
            output.status,
            stderr.trim()
        )));
    }

    String::from_utf8(output.stdout)
        .map_err(|e| DiffError::Git(format!("git output is not valid UTF-8: {e}")))
}
