//! f2fs fsync correlation.
//!
//! ```text
//! f2fs_sync_file_enter: dev = (259,14), ino = 4882, pino = 313, i_mode = 0x81b0,
//!     i_size = 25136, i_nlink = 1, i_blocks = 8, i_advise = 0x0
//! f2fs_sync_file_exit: dev = (259,14), ino = 4882, checkpoint is not needed,
//!     datasync = 1, ret = 0
//! ```
//!
//! Only "fsync" slices are produced; the exit's datasync field is kept for
//! logging but does not select an fdatasync title.

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
use std::fmt;

/// Inode state reported by the enter tracepoint
#[derive(Debug, Clone, PartialEq)]
pub struct F2fsInode {
    pub device: String,
    pub inode: u64,
    pub parent: u64,
    pub mode: u64,
    pub size: u64,
    pub links: u64,
    pub blocks: u64,
    pub advise: u64,
}

impl F2fsInode {
    fn from_fields(fields: &Fields<'_>) -> Result<Self, DiskEventError> {
        Ok(Self {
            device: fields.text("dev")?.to_string(),
            inode: fields.number("ino")?,
            parent: fields.number("pino")?,
            mode: fields.flags("mode")?,
            size: fields.number("size")?,
            links: fields.number("nlink")?,
            blocks: fields.number("blocks")?,
            advise: fields.flags("advise")?,
        })
    }
}

impl fmt::Display for F2fsInode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dev {} ino {} pino {} mode {:#o} size {} nlink {} blocks {} advise {:#x}",
            self.device, self.inode, self.parent, self.mode, self.size, self.links, self.blocks,
            self.advise
        )
    }
}

#[derive(Debug, Clone)]
struct PendingSync {
    start: f64,
    inode: F2fsInode,
}

/// Pairs `f2fs_sync_file_enter` with `f2fs_sync_file_exit`
#[derive(Debug)]
pub struct F2fsSyncCorrelator {
    open: OpenTable<String, PendingSync>,
}

impl F2fsSyncCorrelator {
    pub fn new() -> Self {
        Self {
            open: OpenTable::new(CollisionPolicy::ReplaceOlder),
        }
    }
}

impl Default for F2fsSyncCorrelator {
    fn default() -> Self {
        Self::new()
    }
}

impl Correlator for F2fsSyncCorrelator {
    fn begin(&mut self, line: &TraceLine, fields: &Fields<'_>) -> Result<(), DiskEventError> {
        let pending = PendingSync {
            start: line.timestamp,
            inode: F2fsInode::from_fields(fields)?,
        };

        match self.open.open(line.thread_label.clone(), pending) {
            Some(stale) => Err(DiskEventError::StaleOpen {
                event: DiskEvent::F2fsSyncFileEnter.name(),
                key: line.thread_label.clone(),
                started: stale.start,
            }),
            None => Ok(()),
        }
    }

    fn end(&mut self, line: &TraceLine, fields: &Fields<'_>) -> Result<Emission, DiskEventError> {
        let device = fields.text("dev")?;
        let inode: u64 = fields.number("ino")?;
        let checkpoint = fields.text("checkpoint")?;
        let datasync = fields
            .optional_text("datasync")
            .map(|_| fields.number::<u32>("datasync"))
            .transpose()?;
        let ret: i64 = fields.number("ret")?;

        let pending = self
            .open
            .close(&line.thread_label)
            .ok_or_else(|| DiskEventError::UnmatchedClose {
                event: DiskEvent::F2fsSyncFileExit.name(),
                key: line.thread_label.clone(),
            })?;

        debug!(
            "f2fs sync on {}: {} (checkpoint is {}, datasync {:?})",
            line.thread_label, pending.inode, checkpoint, datasync
        );

        emit_slice(
            MatchedPair {
                category: Category::F2fs,
                title: "fsync".to_string(),
                task_label: &line.thread_label,
                begin: pending.start,
                end: line.timestamp,
                args: slice_args! {
                    "device" => device,
                    "inode" => inode,
                    "error" => ret,
                },
            },
            DiskEvent::F2fsSyncFileExit.name(),
            || line.thread_label.clone(),
        )
    }

    fn open_count(&self) -> usize {
        self.open.len()
    }
}
