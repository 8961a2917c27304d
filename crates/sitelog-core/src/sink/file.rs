//! Append-only log file sink

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::traits::{Sink, SinkKind};
use crate::error::{LogError, LogResult};
use crate::format::Rendering;

/// Persistent sink bound to one log file
///
/// Missing files (and their parent directories) are created on open. Every
/// record is flushed before `write` returns.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
    rendering: Rendering,
    created: bool,
}

impl FileSink {
    /// Open `path` for appending plain text records
    pub fn open(path: impl Into<PathBuf>) -> LogResult<Self> {
        Self::open_with(path, Rendering::Plain)
    }

    /// Open `path` for appending records in the given rendering
    pub fn open_with(path: impl Into<PathBuf>, rendering: Rendering) -> LogResult<Self> {
        let path = path.into();
        let open_error = |source| LogError::SinkOpen {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(open_error)?;
        }

        let created = !path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(open_error)?;

        Ok(Self {
            path,
            file: Mutex::new(file),
            rendering,
            created,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file did not exist before this sink opened it
    pub fn created(&self) -> bool {
        self.created
    }
}

impl Sink for FileSink {
    fn name(&self) -> &str {
        "file"
    }

    fn kind(&self) -> SinkKind {
        SinkKind::Persistent
    }

    fn rendering(&self) -> Rendering {
        self.rendering
    }

    fn write(&self, record: &str) -> io::Result<()> {
        let mut file = self.file.lock();
        writeln!(file, "{}", record)?;
        file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_creates_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("server.log");

        let sink = FileSink::open(&path).unwrap();
        assert!(sink.created());
        assert!(path.exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "");

        let reopened = FileSink::open(&path).unwrap();
        assert!(!reopened.created());
    }

    #[test]
    fn test_appends_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("server.log");
        fs::write(&path, "existing\n").unwrap();

        let sink = FileSink::open(&path).unwrap();
        sink.write("first\n    @ ts info").unwrap();
        sink.write("second").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "existing\nfirst\n    @ ts info\nsecond\n");
    }

    #[test]
    fn test_open_failure() {
        let dir = tempdir().unwrap();
        // A directory cannot be opened as a log file
        let result = FileSink::open(dir.path());
        assert!(matches!(result, Err(LogError::SinkOpen { .. })));
    }
}
