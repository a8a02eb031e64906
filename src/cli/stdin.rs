//! Input reading with a process-wide stdin latch.
//!
//! Only one argument per invocation may read from `-`: a second consumer
//! would silently read an empty stream and review nothing. The latch is a
//! process-wide flag reset between CLI runs. Piped input is bounded by an
//! idle-read timeout that resets on every chunk, so a stalled producer
//! fails fast while a slow-but-flowing one is fine.

use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tokio::io::AsyncReadExt;

use crate::constants::STDIN_IDLE_TIMEOUT;

static STDIN_CONSUMED: AtomicBool = AtomicBool::new(false);

/// Errors reading CLI input.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("stdin already consumed; only one argument may read from '-' per invocation")]
    StdinAlreadyConsumed,

    #[error("timed out waiting for piped input")]
    IdleTimeout,

    #[error("failed to read {path}: {source}")]
    File {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to read stdin: {0}")]
    Io(std::io::Error),

    #[error("input is not valid UTF-8")]
    InvalidUtf8,
}

/// Read an input argument: a file path, or `-` for stdin.
pub async fn read_input(arg: &str) -> Result<String, InputError> {
    if arg == "-" {
        read_stdin().await
    } else {
        tokio::fs::read_to_string(arg)
            .await
            .map_err(|e| InputError::File {
                path: arg.to_string(),
                source: e,
            })
    }
}

async fn read_stdin() -> Result<String, InputError> {
    if !acquire_latch() {
        return Err(InputError::StdinAlreadyConsumed);
    }

    let mut stdin = tokio::io::stdin();
    let mut buf: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 8192];

    loop {
        match tokio::time::timeout(STDIN_IDLE_TIMEOUT, stdin.read(&mut chunk)).await {
            Err(_) => return Err(InputError::IdleTimeout),
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => buf.extend_from_slice(&chunk[..n]),
            Ok(Err(e)) => return Err(InputError::Io(e)),
        }
    }

    String::from_utf8(buf).map_err(|_| InputError::InvalidUtf8)
}

/// Take the latch; false when stdin was already consumed.
fn acquire_latch() -> bool {
    !STDIN_CONSUMED.swap(true, Ordering::SeqCst)
}

/// Release the latch so the next CLI run may read stdin again.
pub fn reset_stdin_latch() {
    STDIN_CONSUMED.store(false, Ordering::SeqCst);
}
