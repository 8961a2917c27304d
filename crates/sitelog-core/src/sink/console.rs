//! Console sink

use std::io::{self, Write};

use parking_lot::Mutex;

use super::traits::{Sink, SinkKind};
use crate::format::Rendering;

/// Interactive sink writing colored records to a terminal stream
pub struct ConsoleSink {
    writer: Mutex<Box<dyn Write + Send>>,
    rendering: Rendering,
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::stdout()
    }
}

impl ConsoleSink {
    /// Console sink on stdout
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Console sink on stderr
    pub fn stderr() -> Self {
        Self::with_writer(io::stderr())
    }

    /// Console sink on an arbitrary writer
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            rendering: Rendering::Colored,
        }
    }

    /// Use a different rendering (e.g. plain text for dumb terminals)
    pub fn with_rendering(mut self, rendering: Rendering) -> Self {
        self.rendering = rendering;
        self
    }
}

impl std::fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("rendering", &self.rendering)
            .finish_non_exhaustive()
    }
}

impl Sink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    fn kind(&self) -> SinkKind {
        SinkKind::Interactive
    }

    fn rendering(&self) -> Rendering {
        self.rendering
    }

    fn write(&self, record: &str) -> io::Result<()> {
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", record)?;
        writer.flush()
    }
}
