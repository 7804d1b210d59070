//! Begin/end correlation for disk tracepoints.
//!
//! This module handles:
//! - Keeping one open-event table per tracepoint family
//! - Matching end events to their begin events
//! - Emitting one slice per completed operation

pub mod block;
pub mod emit;
pub mod ext4;
pub mod f2fs_sync;
pub mod f2fs_write;
pub mod table;

use crate::parser::events::DiskEvent;
use crate::parser::fields::Fields;
use crate::parser::line::TraceLine;
use crate::utils::error::DiskEventError;

// Re-export main types
pub use block::{rwbs_title, BlockRequestCorrelator};
pub use emit::{emit_slice, Emission, MatchedPair};
pub use ext4::Ext4SyncCorrelator;
pub use f2fs_sync::F2fsSyncCorrelator;
pub use f2fs_write::F2fsWriteCorrelator;
pub use table::{CollisionPolicy, OpenTable};

/// One tracepoint family's begin/end pairing
pub trait Correlator {
    /// Record a begin event
    ///
    /// An `Err` is a warning. `StaleOpen` means the new event was recorded
    /// and an older one for the same key was dropped.
    fn begin(&mut self, line: &TraceLine, fields: &Fields<'_>) -> Result<(), DiskEventError>;

    /// Close the matching begin event and emit its slice
    fn end(&mut self, line: &TraceLine, fields: &Fields<'_>) -> Result<Emission, DiskEventError>;

    /// Begin events still waiting for their end
    fn open_count(&self) -> usize;
}

/// All correlation state for one import
#[derive(Debug, Default)]
pub struct CorrelationContext {
    ext4_sync: Ext4SyncCorrelator,
    f2fs_sync: F2fsSyncCorrelator,
    f2fs_write: F2fsWriteCorrelator,
    block: BlockRequestCorrelator,
}

impl CorrelationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route one recognized event to its correlator
    ///
    /// Returns the emitted slice when the event closed an operation.
    pub fn handle(
        &mut self,
        event: DiskEvent,
        line: &TraceLine,
        fields: &Fields<'_>,
    ) -> Result<Option<Emission>, DiskEventError> {
        let correlator: &mut dyn Correlator = match event {
            DiskEvent::Ext4SyncFileEnter | DiskEvent::Ext4SyncFileExit => &mut self.ext4_sync,
            DiskEvent::F2fsSyncFileEnter | DiskEvent::F2fsSyncFileExit => &mut self.f2fs_sync,
            DiskEvent::F2fsWriteBegin | DiskEvent::F2fsWriteEnd => &mut self.f2fs_write,
            DiskEvent::BlockRqIssue | DiskEvent::BlockRqComplete => &mut self.block,
        };

        if event.is_begin() {
            correlator.begin(line, fields).map(|_| None)
        } else {
            correlator.end(line, fields).map(Some)
        }
    }

    /// Begin events that never saw their end, across all families
    pub fn open_count(&self) -> usize {
        self.ext4_sync.open_count()
            + self.f2fs_sync.open_count()
            + self.f2fs_write.open_count()
            + self.block.open_count()
    }
}
