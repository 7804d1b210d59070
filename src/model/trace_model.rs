use crate::parser::schema::{ImportReport, Slice, ThreadReport};
use crate::utils::config::SCHEMA_VERSION;
use std::collections::HashMap;

/// Receiver of importer output
pub trait SliceSink {
    /// Append a slice to the named thread, creating the thread if needed
    fn add_slice(&mut self, thread_name: &str, slice: Slice);

    /// Record a human-readable import warning
    fn add_warning(&mut self, warning: String);
}

/// A synthesized thread and its async slices
#[derive(Debug, Clone, PartialEq)]
pub struct AsyncThread {
    pub name: String,
    pub slices: Vec<Slice>,
}

/// Imported threads and warnings
#[derive(Debug, Clone, Default)]
pub struct TraceModel {
    threads: Vec<AsyncThread>,
    index: HashMap<String, usize>,
    warnings: Vec<String>,
}

impl TraceModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Threads in the order they were first seen
    pub fn threads(&self) -> &[AsyncThread] {
        &self.threads
    }

    pub fn thread(&self, name: &str) -> Option<&AsyncThread> {
        self.index.get(name).map(|&i| &self.threads[i])
    }

    pub fn has_import_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn import_warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn slice_count(&self) -> usize {
        self.threads.iter().map(|t| t.slices.len()).sum()
    }

    /// Convert to the report format written to disk
    pub fn to_report(&self, source: &str) -> ImportReport {
        use chrono::Utc;

        ImportReport {
            version: SCHEMA_VERSION.to_string(),
            source: source.to_string(),
            had_warnings: self.has_import_warnings(),
            warnings: self.warnings.clone(),
            threads: self
                .threads
                .iter()
                .map(|t| ThreadReport {
                    name: t.name.clone(),
                    slices: t.slices.clone(),
                })
                .collect(),
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}

impl SliceSink for TraceModel {
    fn add_slice(&mut self, thread_name: &str, slice: Slice) {
        let index = match self.index.get(thread_name) {
            Some(&i) => i,
            None => {
                self.threads.push(AsyncThread {
                    name: thread_name.to_string(),
                    slices: Vec::new(),
                });
                self.index.insert(thread_name.to_string(), self.threads.len() - 1);
                self.threads.len() - 1
            }
        };
        self.threads[index].slices.push(slice);
    }

    fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::schema::{Category, SliceArgs};

    fn slice(start: f64) -> Slice {
        Slice {
            category: Category::Block,
            title: "read".to_string(),
            start,
            duration: 1.0,
            args: SliceArgs::new(),
        }
    }

    #[test]
    fn test_threads_created_lazily_in_first_seen_order() {
        let mut model = TraceModel::new();
        model.add_slice("block:b", slice(1.0));
        model.add_slice("block:a", slice(2.0));
        model.add_slice("block:b", slice(3.0));

        let names: Vec<_> = model.threads().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["block:b", "block:a"]);
        assert_eq!(model.thread("block:b").unwrap().slices.len(), 2);
        assert_eq!(model.thread("block:b").unwrap().slices[1].start, 3.0);
        assert_eq!(model.slice_count(), 3);
    }

    #[test]
    fn test_warnings_tracked() {
        let mut model = TraceModel::new();
        assert!(!model.has_import_warnings());
        model.add_warning("something odd".to_string());
        assert!(model.has_import_warnings());

        let report = model.to_report("trace.txt");
        assert!(report.had_warnings);
        assert_eq!(report.warnings, vec!["something odd".to_string()]);
        assert_eq!(report.version, SCHEMA_VERSION);
    }
}
