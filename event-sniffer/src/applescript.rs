//! Running AppleScript through `osascript`.
//!
//! Notifications and calendar writes both go through here. The runner is
//! blocking; async callers wrap it in `spawn_blocking`.

use lazy_static::lazy_static;
use regex::Regex;
use std::process::Command;
use thiserror::Error;
use tracing::trace;

/// "Not authorized to send Apple events" (automation permission missing).
pub const NOT_AUTHORIZED: i32 = -1743;

/// "User canceled."
pub const USER_CANCELED: i32 = -128;

lazy_static! {
    static ref ERROR_NUMBER: Regex = Regex::new(r"\((-?[0-9]+)\)\s*$").unwrap();
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to run osascript: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("AppleScript failed: {message}")]
    Failed { code: Option<i32>, message: String },
}

impl ScriptError {
    /// AppleScript error number, when osascript reported one.
    pub fn code(&self) -> Option<i32> {
        match self {
            ScriptError::Failed { code, .. } => *code,
            ScriptError::Spawn(_) => None,
        }
    }
}

/// Quote `value` as an AppleScript string literal.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Error number at the end of an osascript error line, e.g. `... (-1743)`.
pub fn error_number(stderr: &str) -> Option<i32> {
    ERROR_NUMBER
        .captures(stderr.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Run `script` and return its trimmed stdout.
pub fn run(script: &str) -> Result<String, ScriptError> {
    trace!("Running AppleScript ({} bytes)", script.len());

    let output = Command::new("osascript").arg("-e").arg(script).output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(ScriptError::Failed {
            code: error_number(&stderr),
            message: stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
