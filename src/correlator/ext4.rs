//! ext4 fsync/fdatasync correlation.
//!
//! ```text
//! ext4_sync_file_enter: dev 259,1 ino 81993 parent 81906 datasync 1
//! ext4_sync_file_exit: dev 259,1 ino 81993 ret 0
//! ```
//!
//! The exit line carries nothing that ties it to a particular enter beyond
//! the thread that emitted it, so the key is the thread label.

use super::emit::{emit_slice, Emission, MatchedPair};
use super::table::{CollisionPolicy, OpenTable};
use super::Correlator;
use crate::parser::events::DiskEvent;
use crate::parser::fields::Fields;
use crate::parser::line::TraceLine;
use crate::parser::schema::Category;
use crate::slice_args;
use crate::utils::error::DiskEventError;
use log::debug;

#[derive(Debug, Clone)]
struct PendingSync {
    start: f64,
    device: String,
    inode: u64,
    parent: u64,
    datasync: bool,
}

/// Pairs `ext4_sync_file_enter` with `ext4_sync_file_exit`
#[derive(Debug)]
pub struct Ext4SyncCorrelator {
    open: OpenTable<String, PendingSync>,
}

impl Ext4SyncCorrelator {
    pub fn new() -> Self {
        Self {
            open: OpenTable::new(CollisionPolicy::ReplaceOlder),
        }
    }
}

impl Default for Ext4SyncCorrelator {
    fn default() -> Self {
        Self::new()
    }
}

impl Correlator for Ext4SyncCorrelator {
    fn begin(&mut self, line: &TraceLine, fields: &Fields<'_>) -> Result<(), DiskEventError> {
        let pending = PendingSync {
            start: line.timestamp,
            device: fields.text("dev")?.to_string(),
            inode: fields.number("ino")?,
            parent: fields.number("parent")?,
            datasync: fields.number::<u32>("datasync")? != 0,
        };

        match self.open.open(line.thread_label.clone(), pending) {
            Some(stale) => Err(DiskEventError::StaleOpen {
                event: DiskEvent::Ext4SyncFileEnter.name(),
                key: line.thread_label.clone(),
                started: stale.start,
            }),
            None => Ok(()),
        }
    }

    fn end(&mut self, line: &TraceLine, fields: &Fields<'_>) -> Result<Emission, DiskEventError> {
        let device = fields.text("dev")?;
        let inode: u64 = fields.number("ino")?;
        let ret: i64 = fields.number("ret")?;

        let pending = self
            .open
            .close(&line.thread_label)
            .ok_or_else(|| DiskEventError::UnmatchedClose {
                event: DiskEvent::Ext4SyncFileExit.name(),
                key: line.thread_label.clone(),
            })?;

        if pending.device != device || pending.inode != inode {
            debug!(
                "ext4 sync on {} closed by exit for dev {} ino {} (enter: dev {} ino {} parent {})",
                line.thread_label, device, inode, pending.device, pending.inode, pending.parent
            );
        }

        let title = if pending.datasync { "fdatasync" } else { "fsync" };
        emit_slice(
            MatchedPair {
                category: Category::Ext4,
                title: title.to_string(),
                task_label: &line.thread_label,
                begin: pending.start,
                end: line.timestamp,
                args: slice_args! {
                    "device" => device,
                    "inode" => inode,
                    "error" => ret,
                },
            },
            DiskEvent::Ext4SyncFileExit.name(),
            || line.thread_label.clone(),
        )
    }

    fn open_count(&self) -> usize {
        self.open.len()
    }
}
