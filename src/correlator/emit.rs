//! Slice emission for matched begin/end pairs.

use crate::parser::schema::{Category, Slice, SliceArgs};
use crate::utils::error::DiskEventError;

/// A finished slice and the async thread it belongs on
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    pub thread_name: String,
    pub slice: Slice,
}

/// Everything needed to turn a matched pair into a slice
#[derive(Debug)]
pub struct MatchedPair<'a> {
    pub category: Category,
    pub title: String,
    /// Task label the thread name is derived from
    pub task_label: &'a str,
    pub begin: f64,
    pub end: f64,
    pub args: SliceArgs,
}

/// Build the slice for a matched pair
///
/// # Errors
/// * `DiskEventError::OutOfOrder` - the end event precedes its begin
pub fn emit_slice(
    pair: MatchedPair<'_>,
    event: &'static str,
    key: impl FnOnce() -> String,
) -> Result<Emission, DiskEventError> {
    let duration = pair.end - pair.begin;
    if duration.is_nan() || duration < 0.0 {
        return Err(DiskEventError::OutOfOrder {
            event,
            key: key(),
            begin: pair.begin,
            end: pair.end,
        });
    }

    Ok(Emission {
        thread_name: pair.category.thread_name(pair.task_label),
        slice: Slice {
            category: pair.category,
            title: pair.title,
            start: pair.begin,
            duration,
            args: pair.args,
        },
    })
}

/// Collect `(name, value)` pairs into slice args
#[macro_export]
macro_rules! slice_args {
    ($($name:expr => $value:expr),* $(,)?) => {{
        let mut args = $crate::parser::schema::SliceArgs::new();
        $(args.insert($name.to_string(), $crate::parser::schema::ArgValue::from($value));)*
        args
    }};
}
