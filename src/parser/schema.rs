//! Slice and report schema definitions.
//!
//! `Slice` is what the correlators hand to the thread registry.
//! `ImportReport` is the structure of the JSON files we write to disk.
//! Schema is versioned to allow future evolution.

use crate::utils::config::{BLOCK_THREAD_PREFIX, EXT4_THREAD_PREFIX, F2FS_THREAD_PREFIX};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Tracepoint family a slice belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Ext4,
    F2fs,
    Block,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ext4 => EXT4_THREAD_PREFIX,
            Category::F2fs => F2FS_THREAD_PREFIX,
            Category::Block => BLOCK_THREAD_PREFIX,
        }
    }

    /// Name of the async thread a slice of this category lands on
    pub fn thread_name(&self, task_label: &str) -> String {
        format!("{}:{}", self.as_str(), task_label)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single slice argument value
///
/// Written as `{"type": "int", "value": 0}` so that signed and unsigned
/// numbers keep their variant when a report is read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ArgValue {
    Bool(bool),
    #[serde(rename = "uint")]
    UInt(u64),
    Int(i64),
    Str(String),
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Str(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Str(value)
    }
}

impl From<u64> for ArgValue {
    fn from(value: u64) -> Self {
        ArgValue::UInt(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::Int(value)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

/// Slice arguments, ordered by name
pub type SliceArgs = BTreeMap<String, ArgValue>;

/// A completed disk operation on an async timeline
///
/// Timestamps are seconds since boot, as read from the trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slice {
    pub category: Category,
    pub title: String,
    pub start: f64,
    pub duration: f64,
    pub args: SliceArgs,
}

impl Slice {
    /// Look up a single argument by name
    pub fn arg(&self, name: &str) -> Option<&ArgValue> {
        self.args.get(name)
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Top-level report structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    /// Schema version for compatibility checking
    pub version: String,

    /// Trace file the report was built from
    pub source: String,

    /// True when at least one line produced a warning
    pub had_warnings: bool,

    /// Human-readable warnings, in input order
    pub warnings: Vec<String>,

    /// Synthesized async threads, in first-seen order
    pub threads: Vec<ThreadReport>,

    /// Timestamp when the report was generated
    pub generated_at: String,
}

impl ImportReport {
    pub fn slice_count(&self) -> usize {
        self.threads.iter().map(|t| t.slices.len()).sum()
    }
}

/// One async thread and its slices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadReport {
    pub name: String,
    pub slices: Vec<Slice>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_arg_value_json_keeps_variant() {
        assert_eq!(
            serde_json::to_value(ArgValue::Int(0)).unwrap(),
            json!({"type": "int", "value": 0})
        );
        assert_eq!(
            serde_json::to_value(ArgValue::UInt(16)).unwrap(),
            json!({"type": "uint", "value": 16})
        );

        let back: ArgValue = serde_json::from_value(json!({"type": "int", "value": 0})).unwrap();
        assert_eq!(back, ArgValue::Int(0));
    }
}
