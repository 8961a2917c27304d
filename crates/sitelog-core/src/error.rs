//! Logger error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by a log call or by logger construction
#[derive(Error, Debug)]
pub enum LogError {
    /// The message was empty or rendered to nothing
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The level is not part of the logger's registry
    #[error("Unknown level: {0}")]
    UnknownLevel(String),

    /// The persistent sink could not be written
    #[error("Failed to write to {sink} sink: {source}")]
    SinkWrite {
        sink: String,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be rendered
    #[error("Failed to format record: {0}")]
    Format(String),

    /// Logger settings are invalid
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// A file sink could not be created or opened
    #[error("Failed to open log file {}: {source}", path.display())]
    SinkOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LogError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create an unknown level error
    pub fn unknown_level(level: impl Into<String>) -> Self {
        Self::UnknownLevel(level.into())
    }

    /// Create a sink write error
    pub fn sink_write(sink: impl Into<String>, source: std::io::Error) -> Self {
        Self::SinkWrite {
            sink: sink.into(),
            source,
        }
    }
}

pub type LogResult<T> = Result<T, LogError>;
