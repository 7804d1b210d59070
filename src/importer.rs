//! The disk import pass.
//!
//! Walks tokenized trace lines in order, hands each recognized disk event
//! to its correlator, and forwards slices and warnings to a [`SliceSink`].
//! A bad or unmatched line costs only its own slice; the pass never stops
//! early.

use crate::correlator::CorrelationContext;
use crate::model::{SliceSink, TraceModel};
use crate::parser::events::DispatchTable;
use crate::parser::fields::FieldPatterns;
use crate::parser::line::{LineTokenizer, TraceLine};
use crate::utils::error::{DiskEventError, ParseError};
use log::{debug, info, warn};

/// Counters for one import pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    /// Lines seen, disk or not
    pub lines: usize,
    /// Lines whose event name is a disk tracepoint
    pub recognized: usize,
    pub slices: usize,
    pub warnings: usize,
    /// Begin events still open when the input ended
    pub unclosed: usize,
}

/// Disk tracepoint importer
///
/// Holds the immutable dispatch and field tables. Correlation state is
/// created fresh for every call to [`DiskImporter::import`].
#[derive(Debug, Clone)]
pub struct DiskImporter {
    dispatch: DispatchTable,
    patterns: FieldPatterns,
}

impl DiskImporter {
    /// # Errors
    /// * `ParseError::PatternError` - a field pattern failed to compile
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            dispatch: DispatchTable::new(),
            patterns: FieldPatterns::new()?,
        })
    }

    pub fn dispatch_table(&self) -> &DispatchTable {
        &self.dispatch
    }

    /// Run one import pass over `lines`
    pub fn import<'a, I, S>(&self, lines: I, sink: &mut S) -> ImportStats
    where
        I: IntoIterator<Item = &'a TraceLine>,
        S: SliceSink + ?Sized,
    {
        let mut context = CorrelationContext::new();
        let mut stats = ImportStats::default();

        for line in lines {
            stats.lines += 1;
            let Some(event) = self.dispatch.lookup(&line.event_name) else {
                continue;
            };
            stats.recognized += 1;

            let outcome = self
                .patterns
                .extract(event, &line.args)
                .and_then(|fields| context.handle(event, line, &fields));

            match outcome {
                Ok(Some(emission)) => {
                    stats.slices += 1;
                    sink.add_slice(&emission.thread_name, emission.slice);
                }
                Ok(None) => {}
                Err(e) => {
                    stats.warnings += 1;
                    report_warning(&mut *sink, line, e);
                }
            }
        }

        stats.unclosed = context.open_count();
        if stats.unclosed > 0 {
            debug!("{} disk events still open at end of trace", stats.unclosed);
        }

        info!(
            "Imported {} slices from {} disk events ({} lines, {} warnings)",
            stats.slices, stats.recognized, stats.lines, stats.warnings
        );

        stats
    }
}

fn report_warning<S: SliceSink + ?Sized>(sink: &mut S, line: &TraceLine, error: DiskEventError) {
    let message = format!("{:.6} {}-{}: {}", line.timestamp, line.thread_label, line.pid, error);
    warn!("{}", message);
    sink.add_warning(message);
}

/// Tokenize and import a whole trace text into a fresh model
///
/// # Errors
/// * `ParseError::InvalidLine` - a line is not an ftrace record
pub fn import_text(text: &str) -> Result<(TraceModel, ImportStats), ParseError> {
    let tokenizer = LineTokenizer::new()?;
    let lines = tokenizer.tokenize_all(text)?;

    let importer = DiskImporter::new()?;
    let mut model = TraceModel::new();
    let stats = importer.import(&lines, &mut model);

    Ok((model, stats))
}
