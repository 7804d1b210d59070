//! f2fs buffered write correlation.
//!
//! ```text
//! f2fs_write_begin: dev = (253,2), ino = 3342, pos = 0, len = 75, flags = 0
//! f2fs_write_end: dev = (253,2), ino = 3342, pos = 0, len = 75, copied = 75
//! ```
//!
//! One thread can have several writes open at different offsets of the
//! same file, so the file position is part of the key.

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

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct WriteKey {
    thread: String,
    device: String,
    inode: u64,
    pos: u64,
}

impl WriteKey {
    fn from_fields(line: &TraceLine, fields: &Fields<'_>) -> Result<Self, DiskEventError> {
        Ok(Self {
            thread: line.thread_label.clone(),
            device: fields.text("dev")?.to_string(),
            inode: fields.number("ino")?,
            pos: fields.number("pos")?,
        })
    }
}

impl fmt::Display for WriteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} dev {} ino {} pos {}",
            self.thread, self.device, self.inode, self.pos
        )
    }
}

#[derive(Debug, Clone)]
struct PendingWrite {
    start: f64,
    len: u64,
    flags: u64,
}

/// Pairs `f2fs_write_begin` with `f2fs_write_end`
#[derive(Debug)]
pub struct F2fsWriteCorrelator {
    open: OpenTable<WriteKey, PendingWrite>,
}

impl F2fsWriteCorrelator {
    pub fn new() -> Self {
        Self {
            open: OpenTable::new(CollisionPolicy::ReplaceOlder),
        }
    }
}

impl Default for F2fsWriteCorrelator {
    fn default() -> Self {
        Self::new()
    }
}

impl Correlator for F2fsWriteCorrelator {
    fn begin(&mut self, line: &TraceLine, fields: &Fields<'_>) -> Result<(), DiskEventError> {
        let key = WriteKey::from_fields(line, fields)?;
        let pending = PendingWrite {
            start: line.timestamp,
            len: fields.number("len")?,
            flags: fields.flags("flags")?,
        };

        let stale_key = key.to_string();
        match self.open.open(key, pending) {
            Some(stale) => Err(DiskEventError::StaleOpen {
                event: DiskEvent::F2fsWriteBegin.name(),
                key: stale_key,
                started: stale.start,
            }),
            None => Ok(()),
        }
    }

    fn end(&mut self, line: &TraceLine, fields: &Fields<'_>) -> Result<Emission, DiskEventError> {
        let key = WriteKey::from_fields(line, fields)?;
        let len: u64 = fields.number("len")?;
        let copied: u64 = fields.number("copied")?;

        let pending = self
            .open
            .close(&key)
            .ok_or_else(|| DiskEventError::UnmatchedClose {
                event: DiskEvent::F2fsWriteEnd.name(),
                key: key.to_string(),
            })?;

        if pending.len != len {
            debug!(
                "f2fs write {}: begin asked for {} bytes (flags {:#x}), end reports {}",
                key, pending.len, pending.flags, len
            );
        }

        emit_slice(
            MatchedPair {
                category: Category::F2fs,
                title: "f2fs_write".to_string(),
                task_label: &line.thread_label,
                begin: pending.start,
                end: line.timestamp,
                args: slice_args! {
                    "device" => key.device.as_str(),
                    "inode" => key.inode,
                    "error" => copied < len,
                },
            },
            DiskEvent::F2fsWriteEnd.name(),
            || key.to_string(),
        )
    }

    fn open_count(&self) -> usize {
        self.open.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::fields::FieldPatterns;
    use crate::parser::schema::ArgValue;

    fn write_line(event: DiskEvent, ts: f64, args: &str) -> TraceLine {
        TraceLine::new("ContactsProvide", 1184, ts, event.name(), args)
    }

    fn feed(
        c: &mut F2fsWriteCorrelator,
        patterns: &FieldPatterns,
        line: &TraceLine,
    ) -> Result<Option<Emission>, DiskEventError> {
        let event = if line.event_name == "f2fs_write_begin" {
            DiskEvent::F2fsWriteBegin
        } else {
            DiskEvent::F2fsWriteEnd
        };
        let fields = patterns.extract(event, &line.args)?;
        if event.is_begin() {
            c.begin(line, &fields).map(|_| None)
        } else {
            c.end(line, &fields).map(Some)
        }
    }

    #[test]
    fn test_interleaved_writes_match_by_position() {
        let patterns = FieldPatterns::new().unwrap();
        let mut c = F2fsWriteCorrelator::new();

        let lines = [
            write_line(
                DiskEvent::F2fsWriteBegin,
                1.0,
                "dev = (253,2), ino = 3342, pos = 0, len = 4096, flags = 0",
            ),
            write_line(
                DiskEvent::F2fsWriteBegin,
                1.1,
                "dev = (253,2), ino = 3342, pos = 4096, len = 4096, flags = 0",
            ),
            write_line(
                DiskEvent::F2fsWriteEnd,
                1.2,
                "dev = (253,2), ino = 3342, pos = 4096, len = 4096, copied = 4096",
            ),
            write_line(
                DiskEvent::F2fsWriteEnd,
                1.5,
                "dev = (253,2), ino = 3342, pos = 0, len = 4096, copied = 4096",
            ),
        ];

        let emissions: Vec<_> = lines
            .iter()
            .filter_map(|l| feed(&mut c, &patterns, l).unwrap())
            .collect();

        assert_eq!(emissions.len(), 2);
        assert_eq!(emissions[0].slice.start, 1.1);
        assert_eq!(emissions[1].slice.start, 1.0);
        assert_eq!(emissions[1].slice.duration, 0.5);
        assert_eq!(c.open_count(), 0);
    }

    #[test]
    fn test_short_write_sets_error() {
        let patterns = FieldPatterns::new().unwrap();
        let mut c = F2fsWriteCorrelator::new();

        let begin = write_line(
            DiskEvent::F2fsWriteBegin,
            2.0,
            "dev = (253,2), ino = 9, pos = 0, len = 75, flags = 0",
        );
        feed(&mut c, &patterns, &begin).unwrap();
        let end = write_line(
            DiskEvent::F2fsWriteEnd,
            2.5,
            "dev = (253,2), ino = 9, pos = 0, len = 75, copied = 10",
        );
        let emission = feed(&mut c, &patterns, &end).unwrap().unwrap();

        assert_eq!(emission.thread_name, "f2fs:ContactsProvide");
        assert_eq!(emission.slice.arg("error"), Some(&ArgValue::Bool(true)));
    }

    #[test]
    fn test_end_at_unknown_position_is_unmatched() {
        let patterns = FieldPatterns::new().unwrap();
        let mut c = F2fsWriteCorrelator::new();

        let begin = write_line(
            DiskEvent::F2fsWriteBegin,
            2.0,
            "dev = (253,2), ino = 9, pos = 0, len = 75, flags = 0",
        );
        feed(&mut c, &patterns, &begin).unwrap();
        let end = write_line(
            DiskEvent::F2fsWriteEnd,
            2.5,
            "dev = (253,2), ino = 9, pos = 75, len = 75, copied = 75",
        );
        let err = feed(&mut c, &patterns, &end).unwrap_err();

        assert!(matches!(err, DiskEventError::UnmatchedClose { .. }));
        assert_eq!(c.open_count(), 1);
    }
}
