//! In-memory sink

use std::io;

use parking_lot::Mutex;

use super::traits::{Sink, SinkKind};
use crate::format::Rendering;

/// Sink that keeps rendered records in memory
///
/// Useful for testing and for embedding the logger where records are
/// forwarded elsewhere.
#[derive(Debug)]
pub struct MemorySink {
    name: String,
    kind: SinkKind,
    rendering: Rendering,
    records: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Create a memory sink with an explicit role and rendering
    pub fn new(name: impl Into<String>, kind: SinkKind, rendering: Rendering) -> Self {
        Self {
            name: name.into(),
            kind,
            rendering,
            records: Mutex::new(Vec::new()),
        }
    }

    /// Persistent sink receiving plain records
    pub fn persistent() -> Self {
        Self::new("memory", SinkKind::Persistent, Rendering::Plain)
    }

    /// Interactive sink receiving colored records
    pub fn interactive() -> Self {
        Self::new("memory-console", SinkKind::Interactive, Rendering::Colored)
    }

    /// Snapshot of the records written so far
    pub fn records(&self) -> Vec<String> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Clear all records
    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl Sink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SinkKind {
        self.kind
    }

    fn rendering(&self) -> Rendering {
        self.rendering
    }

    fn write(&self, record: &str) -> io::Result<()> {
        self.records.lock().push(record.to_string());
        Ok(())
    }
}
