//! Clap argument types for the terminal surface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::models::ReviewDepth;

/// Review orchestration bridge to a code-review model.
#[derive(Parser, Debug)]
#[command(
    name = crate::constants::APP_NAME,
    version = crate::constants::VERSION,
    about = "Run structured plan, code, and precommit reviews through a code-review model"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands. With no positional arguments at all, the binary
/// starts the tool-call server instead of the CLI.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Review an implementation plan.
    ReviewPlan(PlanArgs),

    /// Review a unified diff.
    ReviewCode(CodeArgs),

    /// Gate staged changes before a commit (exit 2 when blocked).
    ReviewPrecommit(PrecommitArgs),
}

/// Arguments for `review-plan`.
#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// Plan file to review, or `-` for stdin.
    #[arg(long)]
    pub plan: String,

    /// Comma-separated focus areas.
    #[arg(long, value_delimiter = ',')]
    pub focus: Vec<String>,

    /// Review depth.
    #[arg(long, value_enum)]
    pub depth: Option<ReviewDepth>,

    /// Reviewer session to resume.
    #[arg(long = "session")]
    pub session: Option<String>,

    /// Directory containing .reviewbridge.json (default: current directory).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Print the raw JSON result instead of the human rendering.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Arguments for `review-code`.
#[derive(Parser, Debug)]
pub struct CodeArgs {
    /// Diff file to review, or `-` for stdin.
    #[arg(long)]
    pub diff: String,

    /// Comma-separated review criteria.
    #[arg(long, value_delimiter = ',')]
    pub focus: Vec<String>,

    /// Reviewer session to resume.
    #[arg(long = "session")]
    pub session: Option<String>,

    /// Directory containing .reviewbridge.json (default: current directory).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Print the raw JSON result instead of the human rendering.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Arguments for `review-precommit`.
#[derive(Parser, Debug)]
pub struct PrecommitArgs {
    /// Diff file to gate, or `-` for stdin. Defaults to the staged diff.
    #[arg(long)]
    pub diff: Option<String>,

    /// Reviewer session to resume.
    #[arg(long = "session")]
    pub session: Option<String>,

    /// Directory containing .reviewbridge.json (default: current directory).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Print the raw JSON result instead of the human rendering.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
