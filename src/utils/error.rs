//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that make a whole import fail
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid trace line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },

    #[error("Invalid field pattern: {0}")]
    PatternError(#[from] regex::Error),
}

/// Problems with a single disk tracepoint line
///
/// None of these abort an import. Each one becomes a warning string and
/// costs at most the slice of the line that caused it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiskEventError {
    #[error("{event}: malformed payload ({reason}): {args}")]
    MalformedPayload {
        event: &'static str,
        reason: String,
        args: String,
    },

    #[error("{event}: exit without matching enter ({key})")]
    UnmatchedClose { event: &'static str, key: String },

    #[error("{event}: discarding stale open event for {key} started at {started:.6}")]
    StaleOpen {
        event: &'static str,
        key: String,
        started: f64,
    },

    #[error("{event}: end at {end:.6} precedes begin at {begin:.6} ({key})")]
    OutOfOrder {
        event: &'static str,
        key: String,
        begin: f64,
        end: f64,
    },
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
