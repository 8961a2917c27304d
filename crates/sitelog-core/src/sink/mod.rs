//! Sinks: destinations for rendered records

mod traits;
mod console;
mod file;
mod memory;

pub use traits::{Sink, SinkKind, SharedSink};
pub use console::ConsoleSink;
pub use file::FileSink;
pub use memory::MemorySink;
