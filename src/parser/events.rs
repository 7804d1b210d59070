//! Disk tracepoint identification and dispatch.
//!
//! Only eight tracepoints are of interest; every other event name in a
//! trace is outside this importer and is skipped without a warning.

use super::schema::Category;
use std::collections::HashMap;
use std::fmt;

/// A recognized disk tracepoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiskEvent {
    Ext4SyncFileEnter,
    Ext4SyncFileExit,
    F2fsSyncFileEnter,
    F2fsSyncFileExit,
    F2fsWriteBegin,
    F2fsWriteEnd,
    BlockRqIssue,
    BlockRqComplete,
}

impl DiskEvent {
    pub const ALL: [DiskEvent; 8] = [
        DiskEvent::Ext4SyncFileEnter,
        DiskEvent::Ext4SyncFileExit,
        DiskEvent::F2fsSyncFileEnter,
        DiskEvent::F2fsSyncFileExit,
        DiskEvent::F2fsWriteBegin,
        DiskEvent::F2fsWriteEnd,
        DiskEvent::BlockRqIssue,
        DiskEvent::BlockRqComplete,
    ];

    /// Tracepoint name as it appears in ftrace output
    pub fn name(&self) -> &'static str {
        match self {
            DiskEvent::Ext4SyncFileEnter => "ext4_sync_file_enter",
            DiskEvent::Ext4SyncFileExit => "ext4_sync_file_exit",
            DiskEvent::F2fsSyncFileEnter => "f2fs_sync_file_enter",
            DiskEvent::F2fsSyncFileExit => "f2fs_sync_file_exit",
            DiskEvent::F2fsWriteBegin => "f2fs_write_begin",
            DiskEvent::F2fsWriteEnd => "f2fs_write_end",
            DiskEvent::BlockRqIssue => "block_rq_issue",
            DiskEvent::BlockRqComplete => "block_rq_complete",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            DiskEvent::Ext4SyncFileEnter | DiskEvent::Ext4SyncFileExit => Category::Ext4,
            DiskEvent::F2fsSyncFileEnter
            | DiskEvent::F2fsSyncFileExit
            | DiskEvent::F2fsWriteBegin
            | DiskEvent::F2fsWriteEnd => Category::F2fs,
            DiskEvent::BlockRqIssue | DiskEvent::BlockRqComplete => Category::Block,
        }
    }

    /// True for the event that opens an operation
    pub fn is_begin(&self) -> bool {
        matches!(
            self,
            DiskEvent::Ext4SyncFileEnter
                | DiskEvent::F2fsSyncFileEnter
                | DiskEvent::F2fsWriteBegin
                | DiskEvent::BlockRqIssue
        )
    }
}

impl fmt::Display for DiskEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable event-name lookup, built once per import
#[derive(Debug, Clone)]
pub struct DispatchTable {
    handlers: HashMap<&'static str, DiskEvent>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self {
            handlers: DiskEvent::ALL.iter().map(|e| (e.name(), *e)).collect(),
        }
    }

    /// Find the handler for an event name, `None` if it is not a disk event
    pub fn lookup(&self, event_name: &str) -> Option<DiskEvent> {
        self.handlers.get(event_name).copied()
    }

    /// Recognized tracepoint names, sorted
    pub fn event_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::new()
    }
}
