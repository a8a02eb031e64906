//! Terminal surface: dispatch, color gating, and exit codes.
//!
//! Exit codes: 0 success, 1 input or runtime error, 2 precommit blocked.
//! The blocked code makes `review-bridge review-precommit && git commit`
//! work as a shell guard.

pub mod args;
pub mod output;
pub mod stdin;

use std::io::IsTerminal;

use crate::constants::{ENV_FORCE_COLOR, ENV_NO_COLOR};
use crate::env::Env;
use crate::handlers::{self, AppState, CodeInput, PlanInput, PrecommitInput, PrecommitOutcome};
use args::{Cli, CodeArgs, Command, PlanArgs, PrecommitArgs};

/// Exit code when the precommit gate blocks the commit.
pub const EXIT_BLOCKED: i32 = 2;

/// Run one CLI invocation and return its exit code.
pub async fn run(cli: Cli, env: &Env) -> i32 {
    configure_colors(env, std::io::stdout().is_terminal());

    let code = match cli.command {
        Command::ReviewPlan(args) => run_plan(args, env).await,
        Command::ReviewCode(args) => run_code(args, env).await,
        Command::ReviewPrecommit(args) => run_precommit(args, env).await,
    };

    stdin::reset_stdin_latch();
    code
}

/// Color gating: `FORCE_COLOR=1` overrides everything, `FORCE_COLOR=0`
/// forces off, `NO_COLOR` disables, else follow the TTY.
fn configure_colors(env: &Env, stdout_is_tty: bool) {
    match env.var(ENV_FORCE_COLOR).ok().as_deref() {
        Some("0") => colored::control::set_override(false),
        Some(_) => colored::control::set_override(true),
        None => {
            if env.is_set(ENV_NO_COLOR) || !stdout_is_tty {
                colored::control::set_override(false);
            }
        }
    }
}

async fn run_plan(args: PlanArgs, env: &Env) -> i32 {
    let state = match AppState::init(args.config.as_deref(), env) {
        Ok(state) => state,
        Err(e) => return fail(&e.to_string()),
    };

    let plan = match stdin::read_input(&args.plan).await {
        Ok(text) => text,
        Err(e) => return fail(&e.to_string()),
    };

    let input = PlanInput {
        plan,
        context: None,
        focus: none_if_empty(args.focus),
        depth: args.depth,
        session_id: args.session,
    };

    match handlers::review_plan(&state, input).await {
        Ok(review) => {
            if args.json {
                print_json(&review);
            } else {
                print!("{}", output::render_plan(&review));
            }
            0
        }
        Err(e) => fail(&e.to_string()),
    }
}

async fn run_code(args: CodeArgs, env: &Env) -> i32 {
    let state = match AppState::init(args.config.as_deref(), env) {
        Ok(state) => state,
        Err(e) => return fail(&e.to_string()),
    };

    let diff = match stdin::read_input(&args.diff).await {
        Ok(text) => text,
        Err(e) => return fail(&e.to_string()),
    };

    let input = CodeInput {
        diff,
        context: None,
        criteria: none_if_empty(args.focus),
        session_id: args.session,
    };

    match handlers::review_code(&state, input).await {
        Ok(review) => {
            if args.json {
                print_json(&review);
            } else {
                print!("{}", output::render_code(&review));
            }
            0
        }
        Err(e) => fail(&e.to_string()),
    }
}

async fn run_precommit(args: PrecommitArgs, env: &Env) -> i32 {
    let state = match AppState::init(args.config.as_deref(), env) {
        Ok(state) => state,
        Err(e) => return fail(&e.to_string()),
    };

    let diff = match &args.diff {
        Some(arg) => match stdin::read_input(arg).await {
            Ok(text) => Some(text),
            Err(e) => return fail(&e.to_string()),
        },
        None => None,
    };

    let input = PrecommitInput {
        auto_diff: true,
        diff,
        session_id: args.session,
        checklist: None,
    };

    match handlers::review_precommit(&state, input).await {
        Ok(PrecommitOutcome::Review(review)) => {
            if args.json {
                print_json(&review);
            } else {
                print!("{}", output::render_precommit(&review));
            }
            if review.ready_to_commit {
                0
            } else {
                EXIT_BLOCKED
            }
        }
        // On the CLI the sentinel is a regular error, unlike the tool-call
        // surface where it is a structured non-error response.
        Ok(PrecommitOutcome::NoStagedChanges { .. }) => {
            fail("NO_STAGED_CHANGES: no staged changes found")
        }
        Err(e) => fail(&e.to_string()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("failed to serialize result: {e}"),
    }
}

fn fail(message: &str) -> i32 {
    eprintln!("{message}");
    1
}

/// Clap gives us an empty Vec for an omitted repeated flag; treat that as
/// "not provided" so config defaults apply.
fn none_if_empty(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}
