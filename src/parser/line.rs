//! Tokenizer for ftrace text lines.
//!
//! Splits one line of `trace` / `trace_pipe` output into its generic
//! columns. The event payload is left as raw text; the disk event field
//! table interprets it per tracepoint.
//!
//! Accepted shapes:
//! ```text
//! AsyncTask #2-18830 [000] ...1 154578.668286: ext4_sync_file_enter: dev 259,1 ...
//! mmcqd/0-81    ( 81) [000] d..2 154578.668390: block_rq_issue: 179,0 WS ...
//! kworker/0:1-12 [002] 100.000001: block_rq_complete: 8,0 R () 8 + 8 [0]
//! mmcqd/0-81 [000] d..2. 10.000000: block_rq_issue: 179,0 WS 0 () 8 + 8 [mmcqd/0]
//! ```
//!
//! The irq-flags column is 4 characters on older kernels and 5 (with the
//! migrate-disable depth) on newer ones; its letters are not validated.

use crate::utils::config::COMMENT_PREFIX;
use crate::utils::error::ParseError;
use log::debug;
use regex::Regex;

const LINE_PATTERN: &str = concat!(
    r"^\s*(?P<thread>.+)-(?P<pid>\d+)\s+",
    r"(?:\(\s*(?:\d+|-+)\)\s+)?",
    r"\[(?P<cpu>\d+)\]\s+",
    r"(?:[^\s\[\]]{4,5}\s+)?",
    r"(?P<ts>\d+\.\d+):\s+",
    r"(?P<event>[^:\s]+):\s?(?P<args>.*)$",
);

/// One tokenized trace record
#[derive(Debug, Clone, PartialEq)]
pub struct TraceLine {
    /// Task name (comm) of the thread that emitted the event
    pub thread_label: String,
    pub pid: u32,
    pub cpu: u32,
    /// Seconds since boot
    pub timestamp: f64,
    pub event_name: String,
    /// Event payload, uninterpreted
    pub args: String,
}

impl TraceLine {
    /// Build a record directly, without going through text
    pub fn new(
        thread_label: impl Into<String>,
        pid: u32,
        timestamp: f64,
        event_name: impl Into<String>,
        args: impl Into<String>,
    ) -> Self {
        Self {
            thread_label: thread_label.into(),
            pid,
            cpu: 0,
            timestamp,
            event_name: event_name.into(),
            args: args.into(),
        }
    }
}

/// Compiled ftrace line tokenizer
#[derive(Debug, Clone)]
pub struct LineTokenizer {
    pattern: Regex,
}

impl LineTokenizer {
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            pattern: Regex::new(LINE_PATTERN)?,
        })
    }

    /// Tokenize a single line
    ///
    /// Returns `Ok(None)` for blank and comment lines.
    ///
    /// # Errors
    /// * `ParseError::InvalidLine` - the line is not an ftrace record
    pub fn tokenize(&self, line_no: usize, line: &str) -> Result<Option<TraceLine>, ParseError> {
        let trimmed = line.trim_end();
        if trimmed.trim_start().is_empty() || trimmed.trim_start().starts_with(COMMENT_PREFIX) {
            return Ok(None);
        }

        let caps = self.pattern.captures(trimmed).ok_or_else(|| ParseError::InvalidLine {
            line: line_no,
            reason: format!("unrecognized line format: {}", trimmed),
        })?;

        let invalid = |what: &str| ParseError::InvalidLine {
            line: line_no,
            reason: format!("invalid {}", what),
        };

        Ok(Some(TraceLine {
            thread_label: caps["thread"].trim().to_string(),
            pid: caps["pid"].parse().map_err(|_| invalid("pid"))?,
            cpu: caps["cpu"].parse().map_err(|_| invalid("cpu"))?,
            timestamp: caps["ts"].parse().map_err(|_| invalid("timestamp"))?,
            event_name: caps["event"].to_string(),
            args: caps["args"].to_string(),
        }))
    }

    /// Tokenize a whole trace text, skipping blank and comment lines
    ///
    /// The first line that cannot be tokenized fails the whole text.
    pub fn tokenize_all(&self, text: &str) -> Result<Vec<TraceLine>, ParseError> {
        let mut lines = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            if let Some(line) = self.tokenize(index + 1, raw)? {
                lines.push(line);
            }
        }
        debug!("Tokenized {} trace records", lines.len());
        Ok(lines)
    }
}
