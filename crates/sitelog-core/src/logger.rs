//! The log pipeline
//!
//! A [`Logger`] validates a `(level, message)` pair, attributes it to its
//! call site, stamps it and hands one rendering to every registered sink.
//!
//! Loggers are explicit service objects: build one at startup and share it
//! behind an `Arc`. Nothing in the logger is mutable after construction.

use std::path::PathBuf;
use std::sync::Arc;

use crate::caller::CallerResolver;
use crate::error::{LogError, LogResult};
use crate::format::{self, Rendering};
use crate::level::{LevelRegistry, SeverityLevel};
use crate::record::{LogMessage, LogRecord, ReferenceClock};
use crate::sink::{SharedSink, SinkKind};

/// Outcome of an accepted log call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The record reached every sink
    Written,
    /// The level is below the logger's minimum; no sink was touched
    Filtered,
}

/// Caller-attributing logger with a fixed set of sinks
pub struct Logger {
    name: String,
    registry: LevelRegistry,
    resolver: Option<CallerResolver>,
    clock: ReferenceClock,
    sinks: Vec<SharedSink>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("registry", &self.registry)
            .field("resolver", &self.resolver)
            .field("clock", &self.clock)
            .field("sinks", &self.sinks.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl Logger {
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &LevelRegistry {
        &self.registry
    }

    /// Whether records carry caller attribution
    pub fn attributes_callers(&self) -> bool {
        self.resolver.is_some()
    }

    /// Whether an interactive (console) sink is registered
    pub fn has_interactive_sink(&self) -> bool {
        self.sinks.iter().any(|s| s.kind() == SinkKind::Interactive)
    }

    /// Log `message` at `level`
    pub fn log(&self, level: SeverityLevel, message: impl Into<LogMessage>) -> LogResult<Dispatch> {
        self.dispatch(level, message.into())
    }

    /// Log `message` at the default level (`info`)
    pub fn log_default(&self, message: impl Into<LogMessage>) -> LogResult<Dispatch> {
        self.dispatch(SeverityLevel::default(), message.into())
    }

    /// Log `message` at a level given by name
    pub fn log_named(&self, level: &str, message: impl Into<LogMessage>) -> LogResult<Dispatch> {
        let level = level.parse::<SeverityLevel>()?;
        self.dispatch(level, message.into())
    }

    /// Log an error value, rendering its cause chain
    pub fn log_error(
        &self,
        level: SeverityLevel,
        err: &(dyn std::error::Error + 'static),
    ) -> LogResult<Dispatch> {
        self.dispatch(level, LogMessage::from_error(err))
    }

    /// Render a record exactly as a sink with `rendering` would receive it
    pub fn format_record(&self, record: &LogRecord, rendering: Rendering) -> LogResult<String> {
        let spec = self.registry.require(record.level)?;
        format::render(record, spec, rendering)
    }

    fn dispatch(&self, level: SeverityLevel, message: LogMessage) -> LogResult<Dispatch> {
        let spec = *self.registry.require(level)?;
        if message.is_empty() {
            return Err(LogError::invalid_argument("log message is empty"));
        }
        if !self.registry.allows(level) {
            return Ok(Dispatch::Filtered);
        }

        // Resolve from this frame directly: the resolver treats its caller's
        // file as the logging module and skips every frame in it.
        let caller = match &self.resolver {
            Some(resolver) => resolver.resolve(),
            None => None,
        };

        let record = LogRecord {
            level,
            message,
            timestamp: self.clock.now(),
            caller,
        };

        // Render everything up front so a formatting failure writes nothing
        let mut rendered: Vec<(Rendering, String)> = Vec::with_capacity(2);
        for sink in &self.sinks {
            let rendering = sink.rendering();
            if !rendered.iter().any(|(r, _)| *r == rendering) {
                rendered.push((rendering, format::render(&record, &spec, rendering)?));
            }
        }

        let mut failure = None;
        for sink in &self.sinks {
            let text = rendered
                .iter()
                .find(|(r, _)| *r == sink.rendering())
                .map(|(_, text)| text.as_str())
                .unwrap_or_default();

            if let Err(e) = sink.write(text) {
                match sink.kind() {
                    SinkKind::Persistent => {
                        failure.get_or_insert(LogError::sink_write(sink.name(), e));
                    }
                    SinkKind::Interactive => {
                        eprintln!("sitelog: {} sink write failed: {}", sink.name(), e);
                    }
                }
            }
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(Dispatch::Written),
        }
    }
}

macro_rules! level_methods {
    ($($name:ident => $level:ident),* $(,)?) => {
        impl Logger {
            $(
                #[doc = concat!("Log `message` at `", stringify!($name), "` level")]
                pub fn $name(&self, message: impl Into<LogMessage>) -> LogResult<Dispatch> {
                    self.dispatch(SeverityLevel::$level, message.into())
                }
            )*
        }
    };
}

level_methods! {
    error => Error,
    warn => Warn,
    info => Info,
    debug => Debug,
}

/// Builder for [`Logger`]
///
/// Defaults: the standard level registry, no caller attribution, a UTC
/// clock and no sinks.
pub struct LoggerBuilder {
    name: String,
    registry: LevelRegistry,
    resolver: Option<CallerResolver>,
    clock: ReferenceClock,
    sinks: Vec<SharedSink>,
}

impl LoggerBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registry: LevelRegistry::default(),
            resolver: None,
            clock: ReferenceClock::default(),
            sinks: Vec::new(),
        }
    }

    pub fn registry(mut self, registry: LevelRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Attribute records using the backtrace inspector, relative to `root`
    pub fn attribute_to(self, root: impl Into<PathBuf>) -> Self {
        self.resolver(CallerResolver::new(root))
    }

    pub fn resolver(mut self, resolver: CallerResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn clock(mut self, clock: ReferenceClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn sink(mut self, sink: SharedSink) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn build(self) -> Logger {
        Logger {
            name: self.name,
            registry: self.registry,
            resolver: self.resolver,
            clock: self.clock,
            sinks: self.sinks,
        }
    }

    pub fn build_shared(self) -> Arc<Logger> {
        Arc::new(self.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caller::{Frame, InspectError, StackInspector};
    use crate::sink::{MemorySink, Sink};
    use chrono::{FixedOffset, TimeZone, Utc};
    use std::io;

    struct FixedInspector(Vec<Frame>);

    impl StackInspector for FixedInspector {
        fn capture_frames(&self) -> Result<Vec<Frame>, InspectError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenSink(SinkKind);

    impl Sink for BrokenSink {
        fn name(&self) -> &str {
            "broken"
        }

        fn kind(&self) -> SinkKind {
            self.0
        }

        fn rendering(&self) -> Rendering {
            Rendering::Plain
        }

        fn write(&self, _record: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }
    }

    fn clock() -> ReferenceClock {
        let instant = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        ReferenceClock::fixed(instant, FixedOffset::east_opt(0).unwrap())
    }

    fn resolver() -> CallerResolver {
        CallerResolver::with_inspector(
            "/srv/app",
            Arc::new(FixedInspector(vec![
                Frame::new("/srv/app/src/logging.rs", 120),
                Frame::new("/srv/app/src/logging.rs", 90),
                Frame::new("/srv/app/src/appModule.rs", 42),
            ])),
        )
    }

    fn logger_with(file: Arc<MemorySink>, console: Option<Arc<MemorySink>>) -> Logger {
        let mut builder = Logger::builder("test").resolver(resolver()).clock(clock()).sink(file);
        if let Some(console) = console {
            builder = builder.sink(console);
        }
        builder.build()
    }

    #[test]
    fn test_one_record_per_call() {
        let file = Arc::new(MemorySink::persistent());
        let logger = logger_with(file.clone(), None);

        assert_eq!(logger.warn("cache miss").unwrap(), Dispatch::Written);
        assert_eq!(
            file.records(),
            vec!["cache miss\n    src/appModule.rs:42 @ 2024-01-02 03:04:05.000 warn"]
        );
    }

    #[test]
    fn test_default_level_is_info() {
        let file = Arc::new(MemorySink::persistent());
        let logger = logger_with(file.clone(), None);

        logger.log_default("started").unwrap();
        assert!(file.records()[0].ends_with(" info"));
    }

    #[test]
    fn test_empty_message_is_rejected() {
        let file = Arc::new(MemorySink::persistent());
        let console = Arc::new(MemorySink::interactive());
        let logger = logger_with(file.clone(), Some(console.clone()));

        assert!(matches!(logger.info(""), Err(LogError::InvalidArgument(_))));
        assert!(matches!(
            logger.log(SeverityLevel::Error, String::new()),
            Err(LogError::InvalidArgument(_))
        ));
        assert!(file.is_empty());
        assert!(console.is_empty());
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        let file = Arc::new(MemorySink::persistent());
        let logger = Logger::builder("success")
            .registry(LevelRegistry::only(&[SeverityLevel::Info]))
            .sink(file.clone())
            .build();

        assert!(matches!(logger.error("boom"), Err(LogError::UnknownLevel(_))));
        assert!(matches!(
            logger.log_named("critical", "boom"),
            Err(LogError::UnknownLevel(_))
        ));
        assert!(file.is_empty());

        logger.info("order 17 paid").unwrap();
        assert_eq!(file.len(), 1);
    }

    #[test]
    fn test_log_named() {
        let file = Arc::new(MemorySink::persistent());
        let logger = logger_with(file.clone(), None);

        logger.log_named("ERROR", "failed").unwrap();
        assert!(file.records()[0].ends_with(" error"));
    }

    #[test]
    fn test_below_minimum_is_filtered() {
        let file = Arc::new(MemorySink::persistent());
        let logger = logger_with(file.clone(), None);

        assert_eq!(logger.debug("noisy").unwrap(), Dispatch::Filtered);
        assert!(file.is_empty());
    }

    #[test]
    fn test_console_gets_colored_rendering() {
        colored::control::set_override(true);
        let file = Arc::new(MemorySink::persistent());
        let console = Arc::new(MemorySink::interactive());
        let logger = logger_with(file.clone(), Some(console.clone()));
        assert!(logger.has_interactive_sink());

        logger.info("ready").unwrap();

        assert_eq!(file.len(), 1);
        assert_eq!(console.len(), 1);
        assert!(!file.records()[0].contains('\x1b'));
        assert!(console.records()[0].starts_with("ready\n"));
        assert!(console.records()[0].contains('\x1b'));
    }

    #[test]
    fn test_error_value_renders_chain() {
        let file = Arc::new(MemorySink::persistent());
        let logger = logger_with(file.clone(), None);

        let err = io::Error::new(io::ErrorKind::NotFound, "config.yaml missing");
        logger.log_error(SeverityLevel::Error, &err).unwrap();

        let record = &file.records()[0];
        assert!(record.starts_with("config.yaml missing\n"));
        assert!(record.ends_with(" error"));
    }

    #[test]
    fn test_without_attribution() {
        let file = Arc::new(MemorySink::persistent());
        let logger = Logger::builder("plain").clock(clock()).sink(file.clone()).build();
        assert!(!logger.attributes_callers());

        logger.info("hello").unwrap();
        assert_eq!(file.records(), vec!["hello\n    @ 2024-01-02 03:04:05.000 info"]);
    }

    #[test]
    fn test_persistent_failure_is_returned() {
        let console = Arc::new(MemorySink::interactive());
        let logger = Logger::builder("broken")
            .sink(Arc::new(BrokenSink(SinkKind::Persistent)))
            .sink(console.clone())
            .build();

        assert!(matches!(logger.info("lost?"), Err(LogError::SinkWrite { .. })));
        assert_eq!(console.len(), 1);
    }

    #[test]
    fn test_interactive_failure_is_tolerated() {
        let file = Arc::new(MemorySink::persistent());
        let logger = Logger::builder("broken-console")
            .sink(file.clone())
            .sink(Arc::new(BrokenSink(SinkKind::Interactive)))
            .build();

        assert_eq!(logger.info("kept").unwrap(), Dispatch::Written);
        assert_eq!(file.len(), 1);
    }

    #[test]
    fn test_format_record_is_stable() {
        let file = Arc::new(MemorySink::persistent());
        let logger = logger_with(file, None);
        let record = LogRecord {
            level: SeverityLevel::Info,
            message: LogMessage::text("same"),
            timestamp: clock().now(),
            caller: None,
        };

        assert_eq!(
            logger.format_record(&record, Rendering::Plain).unwrap(),
            logger.format_record(&record, Rendering::Plain).unwrap()
        );
    }

    #[test]
    fn test_sequential_calls_keep_order() {
        let file = Arc::new(MemorySink::persistent());
        let logger = logger_with(file.clone(), None);

        for i in 0..20 {
            logger.info(format!("step {}", i)).unwrap();
        }

        let records = file.records();
        for (i, record) in records.iter().enumerate() {
            assert!(record.starts_with(&format!("step {}\n", i)));
        }
    }
}
