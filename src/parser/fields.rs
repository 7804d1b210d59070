//! Declarative field patterns for disk tracepoint payloads.
//!
//! Kernel trace payloads are not self-describing, and each tracepoint
//! family formats its fields differently. Every recognized event gets one
//! named-capture pattern here; correlators read fields by capture name
//! through [`Fields`].

use super::events::DiskEvent;
use crate::utils::error::{DiskEventError, ParseError};
use log::debug;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::str::FromStr;

const DEVICE: &str = r"(?P<dev>\d+,\d+)";
const F2FS_DEVICE: &str = r"dev = \((?P<dev>\d+,\d+)\), ino = (?P<ino>\d+)";

/// Payload patterns, one per tracepoint
fn pattern_sources() -> [(DiskEvent, String); 8] {
    [
        (
            DiskEvent::Ext4SyncFileEnter,
            format!(
                r"^dev {DEVICE} ino (?P<ino>\d+) parent (?P<parent>\d+) datasync (?P<datasync>\d+)$"
            ),
        ),
        (
            DiskEvent::Ext4SyncFileExit,
            format!(r"^dev {DEVICE} ino (?P<ino>\d+) ret (?P<ret>-?\d+)$"),
        ),
        (
            DiskEvent::F2fsSyncFileEnter,
            format!(
                r"^{F2FS_DEVICE}, pino = (?P<pino>\d+), i_mode = (?P<mode>(?:0x)?[0-9a-fA-F]+), i_size = (?P<size>\d+), i_nlink = (?P<nlink>\d+), i_blocks = (?P<blocks>\d+), i_advise = (?P<advise>(?:0x)?[0-9a-fA-F]+)$"
            ),
        ),
        (
            DiskEvent::F2fsSyncFileExit,
            format!(
                r"^{F2FS_DEVICE}, checkpoint is (?P<checkpoint>[^,]+)(?:, datasync = (?P<datasync>\d+))?, ret = (?P<ret>-?\d+)$"
            ),
        ),
        (
            DiskEvent::F2fsWriteBegin,
            format!(
                r"^{F2FS_DEVICE}, pos = (?P<pos>\d+), len = (?P<len>\d+), flags = (?P<flags>(?:0x)?[0-9a-fA-F]+)$"
            ),
        ),
        (
            DiskEvent::F2fsWriteEnd,
            format!(
                r"^{F2FS_DEVICE}, pos = (?P<pos>\d+), len = (?P<len>\d+), copied = (?P<copied>\d+)$"
            ),
        ),
        (
            DiskEvent::BlockRqIssue,
            format!(
                r"^{DEVICE} (?P<rwbs>[A-Z]+) (?P<error>-?\d+) \((?P<cmd>[^)]*)\) (?P<sector>\d+) \+ (?P<nr_sector>\d+) \[(?P<comm>.*)\]$"
            ),
        ),
        (
            DiskEvent::BlockRqComplete,
            format!(
                r"^{DEVICE} (?P<rwbs>[A-Z]+) \((?P<cmd>[^)]*)\) (?P<sector>\d+) \+ (?P<nr_sector>\d+) \[(?P<tag>-?\d+)\]$"
            ),
        ),
    ]
}

/// Compiled payload patterns for every recognized tracepoint
#[derive(Debug, Clone)]
pub struct FieldPatterns {
    patterns: HashMap<DiskEvent, Regex>,
}

impl FieldPatterns {
    /// Compile the pattern table
    ///
    /// # Errors
    /// * `ParseError::PatternError` - a pattern failed to compile
    pub fn new() -> Result<Self, ParseError> {
        let mut patterns = HashMap::new();
        for (event, source) in pattern_sources() {
            patterns.insert(event, Regex::new(&source)?);
        }
        debug!("Compiled {} disk field patterns", patterns.len());
        Ok(Self { patterns })
    }

    /// Match a payload against its event's pattern
    ///
    /// # Errors
    /// * `DiskEventError::MalformedPayload` - payload does not have the expected shape
    pub fn extract<'a>(
        &self,
        event: DiskEvent,
        args: &'a str,
    ) -> Result<Fields<'a>, DiskEventError> {
        let args = args.trim();
        let malformed = |reason: &str| DiskEventError::MalformedPayload {
            event: event.name(),
            reason: reason.to_string(),
            args: args.to_string(),
        };

        let pattern = self
            .patterns
            .get(&event)
            .ok_or_else(|| malformed("no field pattern"))?;
        let caps = pattern
            .captures(args)
            .ok_or_else(|| malformed("unexpected field layout"))?;

        Ok(Fields { event, args, caps })
    }
}

/// Named fields captured from one payload
#[derive(Debug)]
pub struct Fields<'a> {
    event: DiskEvent,
    args: &'a str,
    caps: Captures<'a>,
}

impl<'a> Fields<'a> {
    /// Raw text of a field that must be present
    pub fn text(&self, name: &str) -> Result<&'a str, DiskEventError> {
        self.optional_text(name)
            .ok_or_else(|| self.malformed(format!("missing field '{}'", name)))
    }

    /// Raw text of a field the pattern allows to be absent
    pub fn optional_text(&self, name: &str) -> Option<&'a str> {
        self.caps.name(name).map(|m| m.as_str())
    }

    /// Decimal number field
    pub fn number<T: FromStr>(&self, name: &str) -> Result<T, DiskEventError> {
        let text = self.text(name)?;
        text.parse::<T>()
            .map_err(|_| self.malformed(format!("field '{}' out of range: {}", name, text)))
    }

    /// Flag word, hex with `0x` prefix or plain decimal
    pub fn flags(&self, name: &str) -> Result<u64, DiskEventError> {
        let text = self.text(name)?;
        let parsed = match text.strip_prefix("0x") {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => text.parse::<u64>(),
        };
        parsed.map_err(|_| self.malformed(format!("field '{}' is not a flag word: {}", name, text)))
    }

    /// Build a malformed-payload error for this line
    pub fn malformed(&self, reason: impl Into<String>) -> DiskEventError {
        DiskEventError::MalformedPayload {
            event: self.event.name(),
            reason: reason.into(),
            args: self.args.to_string(),
        }
    }
}
