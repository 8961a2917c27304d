//! Record rendering
//!
//! Every record renders to the same two-line layout:
//!
//! ```text
//! <message or stack>
//!     <file>:<line> @ <YYYY-MM-DD HH:mm:ss.SSS> <level>
//! ```
//!
//! The attribution segment is left out when the caller is unknown. The
//! colored rendering only adds escape sequences around the segments; the
//! plain rendering never contains any.

use chrono::{DateTime, FixedOffset};
use colored::{Color, Colorize};
use serde::{Deserialize, Serialize};

use crate::error::{LogError, LogResult};
use crate::level::LevelSpec;
use crate::record::LogRecord;

/// Timestamp layout used in every rendering
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

const INDENT: &str = "    ";

/// How a sink wants records rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rendering {
    /// Two-line text without escape sequences
    Plain,
    /// Two-line text with ANSI colors
    Colored,
    /// One JSON object per line
    Json,
}

pub fn format_timestamp(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Render `record` for a sink
///
/// Pure over its inputs: the same record and spec always produce the same
/// bytes.
pub fn render(record: &LogRecord, spec: &LevelSpec, rendering: Rendering) -> LogResult<String> {
    match rendering {
        Rendering::Plain => Ok(render_text(record, spec, false)),
        Rendering::Colored => Ok(render_text(record, spec, true)),
        Rendering::Json => render_json(record),
    }
}

fn render_text(record: &LogRecord, spec: &LevelSpec, colored: bool) -> String {
    let timestamp = format_timestamp(&record.timestamp);
    let level = record.level.as_str();

    let mut out = String::with_capacity(record.message.body().len() + 64);
    out.push_str(record.message.body());
    out.push('\n');
    out.push_str(INDENT);

    if colored {
        if let Some(caller) = &record.caller {
            out.push_str(&caller.to_string().as_str().dimmed().to_string());
            out.push(' ');
        }
        out.push_str(&format!(
            "@ {} {}",
            timestamp.as_str().color(Color::Blue),
            level.color(Color::from(spec.color))
        ));
    } else {
        if let Some(caller) = &record.caller {
            out.push_str(&caller.to_string());
            out.push(' ');
        }
        out.push_str(&format!("@ {} {}", timestamp, level));
    }

    out
}

#[derive(Serialize)]
struct JsonLine<'a> {
    timestamp: String,
    level: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<u32>,
}

fn render_json(record: &LogRecord) -> LogResult<String> {
    let line = JsonLine {
        timestamp: format_timestamp(&record.timestamp),
        level: record.level.as_str(),
        message: record.message.body(),
        file: record.caller.as_ref().map(|c| c.file.as_str()),
        line: record.caller.as_ref().map(|c| c.line),
    };
    serde_json::to_string(&line).map_err(|e| LogError::Format(e.to_string()))
}
