//! Sink trait definition

use std::io;
use std::sync::Arc;

use crate::format::Rendering;

/// Role of a sink in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    /// Source of truth; write failures are returned to the caller
    Persistent,
    /// Convenience output; write failures are only reported on stderr
    Interactive,
}

/// A destination for rendered records
///
/// Implementations:
/// - `FileSink`: appends to a log file
/// - `ConsoleSink`: writes colored records to stdout
/// - `MemorySink`: keeps records in memory for tests
///
/// Each `write` receives one complete record. Implementations serialize
/// concurrent writes so records never interleave.
pub trait Sink: Send + Sync {
    /// Short name used in diagnostics
    fn name(&self) -> &str;

    fn kind(&self) -> SinkKind;

    /// Rendering this sink expects
    fn rendering(&self) -> Rendering;

    /// Write one rendered record
    fn write(&self, record: &str) -> io::Result<()>;
}

/// Type alias for an Arc-wrapped sink
pub type SharedSink = Arc<dyn Sink>;
