//! Block layer request correlation.
//!
//! ```text
//! block_rq_issue: 179,0 WS 0 () 3427120 + 16 [mmcqd/0]
//! block_rq_complete: 179,0 WS () 3427120 + 16 [0]
//! ```
//!
//! Completions usually run in interrupt or driver context, not in the task
//! that issued the request. The completion line also lacks the issuing
//! task name, so requests are keyed by device and starting sector and the
//! slice is attributed to the issuing line's task.
//!
//! Several requests may be open at the same key (flushes all report the
//! "no sector" sentinel, merged requests reuse a sector). They are closed
//! oldest first.

use super::emit::{emit_slice, Emission, MatchedPair};
use super::table::{CollisionPolicy, OpenTable};
use super::Correlator;
use crate::parser::events::DiskEvent;
use crate::parser::fields::Fields;
use crate::parser::line::TraceLine;
use crate::parser::schema::Category;
use crate::slice_args;
use crate::utils::config::NO_SECTOR;
use crate::utils::error::DiskEventError;
use log::debug;

/// Map one rwbs flag letter to its title word
fn flag_word(flag: char) -> Option<&'static str> {
    match flag {
        'R' => Some("read"),
        'W' => Some("write"),
        'S' => Some("sync"),
        'F' => Some("flush"),
        'M' => Some("meta"),
        'D' => Some("discard"),
        'A' => Some("ahead"),
        'N' => Some("none"),
        'E' => Some("erase"),
        _ => None,
    }
}

/// Build a slice title from an rwbs flag string, e.g. "WS" -> "write sync"
///
/// Returns `None` if any letter is not a known flag.
pub fn rwbs_title(rwbs: &str) -> Option<String> {
    let words = rwbs.chars().map(flag_word).collect::<Option<Vec<_>>>()?;
    if words.is_empty() {
        return None;
    }
    Some(words.join(" "))
}

type RequestKey = (String, u64);

#[derive(Debug, Clone)]
struct PendingRequest {
    start: f64,
    task_label: String,
    queue: String,
    title: String,
    num_sectors: u64,
}

/// Pairs `block_rq_issue` with `block_rq_complete`
#[derive(Debug)]
pub struct BlockRequestCorrelator {
    open: OpenTable<RequestKey, PendingRequest>,
}

impl BlockRequestCorrelator {
    pub fn new() -> Self {
        Self {
            open: OpenTable::new(CollisionPolicy::Queue),
        }
    }
}

impl Default for BlockRequestCorrelator {
    fn default() -> Self {
        Self::new()
    }
}

fn describe(key: &RequestKey) -> String {
    if key.1 == NO_SECTOR {
        format!("{} no sector", key.0)
    } else {
        format!("{} sector {}", key.0, key.1)
    }
}

impl Correlator for BlockRequestCorrelator {
    fn begin(&mut self, line: &TraceLine, fields: &Fields<'_>) -> Result<(), DiskEventError> {
        let rwbs = fields.text("rwbs")?;
        let title = rwbs_title(rwbs)
            .ok_or_else(|| fields.malformed(format!("unknown request flags '{}'", rwbs)))?;
        // Issue-side error is always a placeholder, it only has to parse
        let _: i64 = fields.number("error")?;

        let key: RequestKey = (fields.text("dev")?.to_string(), fields.number("sector")?);
        let pending = PendingRequest {
            start: line.timestamp,
            task_label: line.thread_label.clone(),
            queue: fields.text("comm")?.to_string(),
            title,
            num_sectors: fields.number("nr_sector")?,
        };

        self.open.open(key, pending);
        Ok(())
    }

    fn end(&mut self, line: &TraceLine, fields: &Fields<'_>) -> Result<Emission, DiskEventError> {
        let key: RequestKey = (fields.text("dev")?.to_string(), fields.number("sector")?);
        let completed_sectors: u64 = fields.number("nr_sector")?;

        let pending = self
            .open
            .close(&key)
            .ok_or_else(|| DiskEventError::UnmatchedClose {
                event: DiskEvent::BlockRqComplete.name(),
                key: describe(&key),
            })?;

        if completed_sectors != pending.num_sectors {
            debug!(
                "block request {} issued by {} [{}]: {} sectors issued, {} completed",
                describe(&key),
                pending.task_label,
                pending.queue,
                pending.num_sectors,
                completed_sectors
            );
        }

        let (device, sector) = key;
        emit_slice(
            MatchedPair {
                category: Category::Block,
                title: pending.title,
                task_label: &pending.task_label,
                begin: pending.start,
                end: line.timestamp,
                args: slice_args! {
                    "device" => device.as_str(),
                    "error" => 0i64,
                    "numSectors" => pending.num_sectors,
                    "sector" => sector,
                },
            },
            DiskEvent::BlockRqComplete.name(),
            || describe(&(device.clone(), sector)),
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
    use pretty_assertions::assert_eq;

    fn issue(c: &mut BlockRequestCorrelator, p: &FieldPatterns, task: &str, ts: f64, args: &str) {
        let line = TraceLine::new(task, 81, ts, "block_rq_issue", args);
        let fields = p.extract(DiskEvent::BlockRqIssue, &line.args).unwrap();
        c.begin(&line, &fields).unwrap();
    }

    fn complete(
        c: &mut BlockRequestCorrelator,
        p: &FieldPatterns,
        ts: f64,
        args: &str,
    ) -> Result<Emission, DiskEventError> {
        let line = TraceLine::new("<idle>", 0, ts, "block_rq_complete", args);
        let fields = p.extract(DiskEvent::BlockRqComplete, &line.args)?;
        c.end(&line, &fields)
    }

    #[test]
    fn test_rwbs_titles() {
        assert_eq!(rwbs_title("WS").as_deref(), Some("write sync"));
        assert_eq!(rwbs_title("FWS").as_deref(), Some("flush write sync"));
        assert_eq!(rwbs_title("RM").as_deref(), Some("read meta"));
        assert_eq!(rwbs_title("WQ"), None);
        assert_eq!(rwbs_title(""), None);
    }

    #[test]
    fn test_completion_attributed_to_issuing_task() {
        let p = FieldPatterns::new().unwrap();
        let mut c = BlockRequestCorrelator::new();
        issue(&mut c, &p, "mmcqd/0", 10.0, "179,0 WS 0 () 3427120 + 16 [mmcqd/0]");
        let emission = complete(&mut c, &p, 10.5, "179,0 WS () 3427120 + 16 [0]").unwrap();

        assert_eq!(emission.thread_name, "block:mmcqd/0");
        assert_eq!(emission.slice.title, "write sync");
        assert_eq!(
            emission.slice.args,
            crate::slice_args! {
                "device" => "179,0",
                "error" => 0i64,
                "numSectors" => 16u64,
                "sector" => 3427120u64,
            }
        );
    }

    #[test]
    fn test_no_sector_flush_matches_its_own_completion() {
        let p = FieldPatterns::new().unwrap();
        let mut c = BlockRequestCorrelator::new();
        issue(&mut c, &p, "mmcqd/0", 1.0, "179,0 FWS 0 () 18446744073709551615 + 0 [mmcqd/0]");
        let emission =
            complete(&mut c, &p, 1.5, "179,0 FWS () 18446744073709551615 + 0 [0]").unwrap();

        assert_eq!(emission.slice.arg("sector"), Some(&ArgValue::UInt(NO_SECTOR)));
        assert_eq!(emission.slice.title, "flush write sync");
        assert_eq!(c.open_count(), 0);
    }

    #[test]
    fn test_same_key_closes_oldest_first() {
        let p = FieldPatterns::new().unwrap();
        let mut c = BlockRequestCorrelator::new();
        issue(&mut c, &p, "kworker/u8:1", 1.0, "8,0 W 0 () 100 + 8 [kworker/u8:1]");
        issue(&mut c, &p, "jbd2/sda1-8", 2.0, "8,0 W 0 () 100 + 8 [jbd2/sda1-8]");
        assert_eq!(c.open_count(), 2);

        let first = complete(&mut c, &p, 3.0, "8,0 W () 100 + 8 [0]").unwrap();
        let second = complete(&mut c, &p, 4.0, "8,0 W () 100 + 8 [0]").unwrap();
        assert_eq!(first.thread_name, "block:kworker/u8:1");
        assert_eq!(first.slice.duration, 2.0);
        assert_eq!(second.thread_name, "block:jbd2/sda1-8");
        assert_eq!(second.slice.duration, 2.0);
    }

    #[test]
    fn test_unknown_flag_is_malformed() {
        let p = FieldPatterns::new().unwrap();
        let mut c = BlockRequestCorrelator::new();
        let line = TraceLine::new("mmcqd/0", 81, 1.0, "block_rq_issue", "8,0 WX 0 () 8 + 8 [x]");
        let fields = p.extract(DiskEvent::BlockRqIssue, &line.args).unwrap();
        assert!(matches!(
            c.begin(&line, &fields),
            Err(DiskEventError::MalformedPayload { .. })
        ));
        assert_eq!(c.open_count(), 0);
    }

    #[test]
    fn test_completion_on_other_device_is_unmatched() {
        let p = FieldPatterns::new().unwrap();
        let mut c = BlockRequestCorrelator::new();
        issue(&mut c, &p, "mmcqd/0", 1.0, "179,0 R 0 () 3255256 + 8 [mmcqd/0]");
        let err = complete(&mut c, &p, 2.0, "179,8 R () 3255256 + 8 [0]").unwrap_err();
        assert!(matches!(err, DiskEventError::UnmatchedClose { .. }));
        assert_eq!(c.open_count(), 1);
    }
}
