//! Thread registry that receives imported slices.
//!
//! The importer only knows thread names. The model creates a thread the
//! first time a name is seen and appends slices in the order they arrive.

pub mod trace_model;

// Re-export main types
pub use trace_model::{AsyncThread, SliceSink, TraceModel};
