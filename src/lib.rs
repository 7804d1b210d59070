//! Disk Trace Studio
//!
//! Turns Linux disk I/O tracepoints from ftrace text output into
//! per-thread async slices for trace visualization.
//!
//! Four tracepoint families are understood:
//! - `ext4_sync_file_enter` / `ext4_sync_file_exit`
//! - `f2fs_sync_file_enter` / `f2fs_sync_file_exit`
//! - `f2fs_write_begin` / `f2fs_write_end`
//! - `block_rq_issue` / `block_rq_complete`
//!
//! ## Getting Started
//!
//! ```ignore
//! let (model, stats) = disk_trace_studio::importer::import_text(&trace_text)?;
//! for thread in model.threads() {
//!     println!("{}: {} slices", thread.name, thread.slices.len());
//! }
//! ```

pub mod commands;
pub mod correlator;
pub mod importer;
pub mod model;
pub mod output;
pub mod parser;
pub mod utils;
