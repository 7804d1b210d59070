//! Trace line parsing and schema definitions.
//!
//! This module handles:
//! - Tokenizing raw ftrace text lines
//! - Recognizing disk tracepoints by name
//! - Extracting payload fields per tracepoint
//! - Defining slice and report schema

pub mod events;
pub mod fields;
pub mod line;
pub mod schema;

// Re-export main types
pub use events::{DiskEvent, DispatchTable};
pub use fields::{FieldPatterns, Fields};
pub use line::{LineTokenizer, TraceLine};
pub use schema::{ArgValue, Category, ImportReport, Slice, SliceArgs, ThreadReport};
