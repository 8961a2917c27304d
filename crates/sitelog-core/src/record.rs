//! Log records and their message bodies

use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::caller::CallerInfo;
use crate::level::SeverityLevel;

/// Body of a log call
///
/// Error values carry a stack text that takes precedence over their plain
/// message when rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogMessage {
    Text(String),
    Failure { message: String, stack: String },
}

impl LogMessage {
    pub fn text(message: impl Into<String>) -> Self {
        LogMessage::Text(message.into())
    }

    /// Build a message from an error and its `source()` chain
    pub fn from_error(err: &(dyn Error + 'static)) -> Self {
        LogMessage::Failure {
            message: err.to_string(),
            stack: error_chain(err),
        }
    }

    /// Like [`from_error`](Self::from_error), appending a captured backtrace
    pub fn from_error_with_backtrace(err: &(dyn Error + 'static), backtrace: &Backtrace) -> Self {
        let mut stack = error_chain(err);
        if backtrace.status() == BacktraceStatus::Captured {
            stack.push_str("\nstack backtrace:\n");
            stack.push_str(backtrace.to_string().trim_end());
        }
        LogMessage::Failure {
            message: err.to_string(),
            stack,
        }
    }

    /// Text that ends up in the rendered record
    pub fn body(&self) -> &str {
        match self {
            LogMessage::Text(text) => text,
            LogMessage::Failure { message, stack } if stack.is_empty() => message,
            LogMessage::Failure { stack, .. } => stack,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.body().is_empty()
    }
}

impl From<&str> for LogMessage {
    fn from(message: &str) -> Self {
        LogMessage::Text(message.to_string())
    }
}

impl From<String> for LogMessage {
    fn from(message: String) -> Self {
        LogMessage::Text(message)
    }
}

impl From<&String> for LogMessage {
    fn from(message: &String) -> Self {
        LogMessage::Text(message.clone())
    }
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.body())
    }
}

fn error_chain(err: &(dyn Error + 'static)) -> String {
    let mut stack = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        stack.push_str("\n    caused by: ");
        stack.push_str(&cause.to_string());
        source = cause.source();
    }
    stack
}

/// One record, alive only while it is rendered and dispatched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: SeverityLevel,
    pub message: LogMessage,
    pub timestamp: DateTime<FixedOffset>,
    pub caller: Option<CallerInfo>,
}

type TimeSource = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Wall clock normalized to a fixed reference offset
///
/// The host's local time zone never affects the stamped time.
#[derive(Clone)]
pub struct ReferenceClock {
    offset: FixedOffset,
    source: TimeSource,
}

impl ReferenceClock {
    /// System clock in UTC
    pub fn utc() -> Self {
        Self::with_offset(Utc.fix())
    }

    /// System clock rendered at `offset`
    pub fn with_offset(offset: FixedOffset) -> Self {
        Self {
            offset,
            source: Arc::new(Utc::now),
        }
    }

    /// Clock frozen at `instant`
    pub fn fixed(instant: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            offset,
            source: Arc::new(move || instant),
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        (self.source)().with_timezone(&self.offset)
    }
}

impl Default for ReferenceClock {
    fn default() -> Self {
        Self::utc()
    }
}

impl fmt::Debug for ReferenceClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceClock")
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}
