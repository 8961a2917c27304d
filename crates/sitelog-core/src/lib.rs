//! Sitelog Core
//!
//! Structured logging with call-site attribution.
//! Every record names the source file and line that issued it, relative to a
//! project root, and is written to a persistent log file and optionally to a
//! colorized console.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sitelog_core::{config::LoggerSettings, Loggers};
//!
//! let settings = LoggerSettings::from_env()?;
//! let loggers = Loggers::init(&settings)?;
//!
//! loggers.log.info("server listening")?;
//! loggers.log.warn("cache is cold")?;
//! loggers.success.info("order 1234 paid")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The file record for the `warn` call above looks like:
//!
//! ```text
//! cache is cold
//!     src/main.rs:8 @ 2024-05-17 08:04:09.042 warn
//! ```

pub mod caller;
pub mod config;
pub mod error;
pub mod format;
pub mod level;
pub mod logger;
pub mod loggers;
pub mod macros;
pub mod record;
pub mod sink;

// Re-export commonly used types
pub use caller::{CallerInfo, CallerResolver, StackInspector, BacktraceInspector, Frame, InspectError};
pub use error::{LogError, LogResult};
pub use format::Rendering;
pub use level::{SeverityLevel, LevelColor, LevelRegistry, LevelSpec};
pub use logger::{Logger, LoggerBuilder, Dispatch};
pub use loggers::Loggers;
pub use record::{LogMessage, LogRecord, ReferenceClock};
pub use sink::{Sink, SinkKind, SharedSink, FileSink, ConsoleSink, MemorySink};
