//! Diff engine: token-budgeted chunk splitting, git CLI wrapper, and the
//! precommit diff resolver.

pub mod chunker;
pub mod git;
pub mod resolver;

use thiserror::Error;

/// Errors from diff resolution.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DiffError {
    /// Auto-diff ran but the index holds nothing. The precommit handler
    /// turns this into a structured "nothing to commit" response rather
    /// than a failure.
    #[error("no staged changes found")]
    NoStagedChanges,

    #[error("git command failed: {0}")]
    Git(String),

    #[error("auto_diff disabled and no diff provided")]
    AutoDiffDisabled,
}
