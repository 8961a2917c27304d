//! Construction of the process loggers from settings
//!
//! A process normally owns two loggers:
//! - the general logger: every level, caller attribution, `log_file_path`
//! - the success logger: `info` only, no attribution, `success_log_file_path`
//!
//! Both get a console sink when `print_to_console` is set.

use std::path::Path;
use std::sync::Arc;

use crate::config::LoggerSettings;
use crate::error::LogResult;
use crate::level::{LevelRegistry, SeverityLevel};
use crate::logger::{Logger, LoggerBuilder};
use crate::record::ReferenceClock;
use crate::sink::{ConsoleSink, FileSink, SharedSink};

/// The general and success loggers of a process
#[derive(Debug, Clone)]
pub struct Loggers {
    pub log: Arc<Logger>,
    pub success: Arc<Logger>,
}

impl Loggers {
    /// Build both loggers, creating missing log files
    ///
    /// Newly created files are announced through the general logger.
    pub fn init(settings: &LoggerSettings) -> LogResult<Self> {
        let log_file = open_file_sink(settings, &settings.resolved_log_file_path())?;
        let success_file = open_file_sink(settings, &settings.resolved_success_log_file_path())?;

        let log = Arc::new(general_logger(settings, log_file.clone())?);
        let success = Arc::new(success_logger(settings, success_file.clone())?);

        if log_file.created() {
            log.info("Log file created")?;
        }
        if success_file.created() {
            log.info("Success log file created")?;
        }

        Ok(Self { log, success })
    }
}

impl Logger {
    /// General logger: all levels, attributed, filtered at `min_level`
    ///
    /// A log file created here is announced in itself.
    pub fn general(settings: &LoggerSettings) -> LogResult<Self> {
        let file = open_file_sink(settings, &settings.resolved_log_file_path())?;
        let log = general_logger(settings, file.clone())?;
        if file.created() {
            log.info("Log file created")?;
        }
        Ok(log)
    }

    /// Success logger: `info` only and no caller attribution
    ///
    /// The success file is announced through the general logger, so only
    /// [`Loggers::init`] records its creation.
    pub fn success(settings: &LoggerSettings) -> LogResult<Self> {
        let file = open_file_sink(settings, &settings.resolved_success_log_file_path())?;
        success_logger(settings, file)
    }
}

fn open_file_sink(settings: &LoggerSettings, path: &Path) -> LogResult<Arc<FileSink>> {
    Ok(Arc::new(FileSink::open_with(
        path,
        settings.file_format.rendering(),
    )?))
}

fn general_logger(settings: &LoggerSettings, file: Arc<FileSink>) -> LogResult<Logger> {
    let builder = Logger::builder("log")
        .registry(settings.level_registry())
        .attribute_to(&settings.project_root);
    Ok(with_sinks(builder, settings, file)?.build())
}

fn success_logger(settings: &LoggerSettings, file: Arc<FileSink>) -> LogResult<Logger> {
    let builder = Logger::builder("success").registry(LevelRegistry::only(&[SeverityLevel::Info]));
    Ok(with_sinks(builder, settings, file)?.build())
}

fn with_sinks(
    builder: LoggerBuilder,
    settings: &LoggerSettings,
    file: SharedSink,
) -> LogResult<LoggerBuilder> {
    let mut builder = builder
        .clock(ReferenceClock::with_offset(settings.reference_offset()?))
        .sink(file);
    if settings.print_to_console {
        builder = builder.sink(Arc::new(ConsoleSink::stdout()));
    }
    Ok(builder)
}
