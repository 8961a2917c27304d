//! Caller attribution
//!
//! Resolves the source file and line of the code that issued a log call by
//! walking the call stack and skipping frames that belong to the logging
//! module itself.
//!
//! The stack is read through the [`StackInspector`] capability so the rest of
//! the pipeline never touches platform backtrace APIs directly.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

/// One captured stack frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub file: PathBuf,
    pub line: u32,
}

impl Frame {
    pub fn new(file: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

/// Errors raised while capturing the stack
#[derive(Error, Debug)]
pub enum InspectError {
    /// The binary carries no file/line information for its frames
    #[error("no symbol information available")]
    NoSymbols,

    /// The capture itself panicked
    #[error("stack capture panicked: {0}")]
    Panicked(String),
}

/// Capability to capture the current call stack
///
/// Implementations return frames most recent first, starting at the frame
/// that invoked [`CallerResolver::resolve`]. Frames belonging to the
/// inspector and the resolver are not part of the result.
pub trait StackInspector: Send + Sync {
    fn capture_frames(&self) -> Result<Vec<Frame>, InspectError>;
}

/// Stack inspector backed by the `backtrace` crate
///
/// Requires debug info in the running binary; without it every capture fails
/// with [`InspectError::NoSymbols`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktraceInspector;

impl BacktraceInspector {
    pub fn new() -> Self {
        Self
    }
}

impl StackInspector for BacktraceInspector {
    #[inline(never)]
    fn capture_frames(&self) -> Result<Vec<Frame>, InspectError> {
        let trace = backtrace::Backtrace::new();
        let mut frames: Vec<Frame> = trace
            .frames()
            .iter()
            .flat_map(|frame| frame.symbols())
            .filter_map(|symbol| Some(Frame::new(symbol.filename()?, symbol.lineno()?)))
            .collect();

        // Everything up to the last frame of this file is inspector/resolver
        // internals; the next frame is whoever called `resolve`.
        let own_file = Path::new(file!());
        let boundary = frames
            .iter()
            .rposition(|frame| same_source(&frame.file, own_file))
            .ok_or(InspectError::NoSymbols)?;

        Ok(frames.split_off(boundary + 1))
    }
}

/// Relative location of a log call
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CallerInfo {
    /// Path relative to the project root, `/`-separated
    pub file: String,
    pub line: u32,
}

impl CallerInfo {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for CallerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Resolves the first frame outside the logging module
#[derive(Clone)]
pub struct CallerResolver {
    inspector: Arc<dyn StackInspector>,
    root: PathBuf,
}

impl fmt::Debug for CallerResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallerResolver")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl CallerResolver {
    /// Resolver using [`BacktraceInspector`], reporting paths relative to `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_inspector(root, Arc::new(BacktraceInspector::new()))
    }

    /// Resolver reading the stack through `inspector`
    ///
    /// A relative `root` is anchored at the current directory here, once.
    pub fn with_inspector(root: impl Into<PathBuf>, inspector: Arc<dyn StackInspector>) -> Self {
        Self {
            inspector,
            root: anchor(&root.into()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find the caller of the logging module
    ///
    /// Returns `None` when the stack cannot be captured or holds no frame
    /// outside the self frame's file. Capture failures are reported on stderr
    /// and never propagate to the log call.
    pub fn resolve(&self) -> Option<CallerInfo> {
        let captured = panic::catch_unwind(AssertUnwindSafe(|| self.inspector.capture_frames()))
            .unwrap_or_else(|payload| Err(InspectError::Panicked(panic_message(payload.as_ref()))));

        let frames = match captured {
            Ok(frames) => frames,
            Err(e) => {
                eprintln!("sitelog: failed to resolve caller: {}", e);
                return None;
            }
        };

        first_foreign_frame(&frames).map(|frame| CallerInfo {
            file: relative_path(&self.root, &frame.file),
            line: frame.line,
        })
    }
}

/// First frame whose file differs from the first (self) frame's file
pub fn first_foreign_frame(frames: &[Frame]) -> Option<&Frame> {
    let (self_frame, rest) = frames.split_first()?;
    rest.iter().find(|frame| frame.file != self_frame.file)
}

/// Express `file` relative to `root`
///
/// Both paths are normalized lexically first and a relative `root` is taken
/// from the current directory. Files outside the root are reached through
/// `..` components so the result is never absolute. Already-relative files
/// are kept as they are.
pub fn relative_path(root: &Path, file: &Path) -> String {
    let file = normalize(file);
    if file.is_relative() {
        return join_components(file.components());
    }

    let root = anchor(root);
    let root_parts: Vec<Component<'_>> = root.components().collect();
    let file_parts: Vec<Component<'_>> = file.components().collect();
    let shared = root_parts
        .iter()
        .zip(file_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let ups = root_parts[shared..].iter().map(|_| Component::ParentDir);
    join_components(ups.chain(file_parts[shared..].iter().copied()))
}

/// Absolute, normalized form of `root`
fn anchor(root: &Path) -> PathBuf {
    if root.is_absolute() {
        return normalize(root);
    }
    match std::env::current_dir() {
        Ok(cwd) => normalize(&cwd.join(root)),
        Err(e) => {
            eprintln!("sitelog: cannot anchor project root {}: {}", root.display(), e);
            normalize(root)
        }
    }
}

/// Drop `.` components and fold `..` into their parent without touching the
/// filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` at the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            _ => out.push(component),
        }
    }
    out.iter().collect()
}

fn join_components<'a>(components: impl Iterator<Item = Component<'a>>) -> String {
    components
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn same_source(a: &Path, b: &Path) -> bool {
    a.ends_with(b) || b.ends_with(a)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
