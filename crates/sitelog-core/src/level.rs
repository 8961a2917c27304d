//! Severity levels and the per-logger level registry

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::LogError;

/// Severity of a log record, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl SeverityLevel {
    /// Every level, ordered by priority
    pub const ALL: [SeverityLevel; 4] = [
        SeverityLevel::Error,
        SeverityLevel::Warn,
        SeverityLevel::Info,
        SeverityLevel::Debug,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::Error => "error",
            SeverityLevel::Warn => "warn",
            SeverityLevel::Info => "info",
            SeverityLevel::Debug => "debug",
        }
    }

    /// Priority used when a registry does not override it (lower = more severe)
    pub fn default_priority(&self) -> u8 {
        match self {
            SeverityLevel::Error => 0,
            SeverityLevel::Warn => 1,
            SeverityLevel::Info => 2,
            SeverityLevel::Debug => 3,
        }
    }

    pub fn default_color(&self) -> LevelColor {
        match self {
            SeverityLevel::Error => LevelColor::Red,
            SeverityLevel::Warn => LevelColor::Yellow,
            SeverityLevel::Info => LevelColor::Green,
            SeverityLevel::Debug => LevelColor::Blue,
        }
    }
}

impl Default for SeverityLevel {
    fn default() -> Self {
        SeverityLevel::Info
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeverityLevel {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(SeverityLevel::Error),
            "warn" | "warning" => Ok(SeverityLevel::Warn),
            "info" => Ok(SeverityLevel::Info),
            "debug" => Ok(SeverityLevel::Debug),
            _ => Err(LogError::unknown_level(s)),
        }
    }
}

/// Display color of a level on the console sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelColor {
    Red,
    Yellow,
    Green,
    Blue,
    Magenta,
    Cyan,
    White,
    Gray,
}

impl From<LevelColor> for colored::Color {
    fn from(color: LevelColor) -> Self {
        match color {
            LevelColor::Red => colored::Color::Red,
            LevelColor::Yellow => colored::Color::Yellow,
            LevelColor::Green => colored::Color::Green,
            LevelColor::Blue => colored::Color::Blue,
            LevelColor::Magenta => colored::Color::Magenta,
            LevelColor::Cyan => colored::Color::Cyan,
            LevelColor::White => colored::Color::White,
            LevelColor::Gray => colored::Color::BrightBlack,
        }
    }
}

/// Priority and color registered for one level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSpec {
    pub priority: u8,
    pub color: LevelColor,
}

impl LevelSpec {
    pub fn of(level: SeverityLevel) -> Self {
        Self {
            priority: level.default_priority(),
            color: level.default_color(),
        }
    }
}

static STANDARD: Lazy<LevelRegistry> = Lazy::new(|| LevelRegistry::new(SeverityLevel::Info));

/// Fixed mapping of levels to their specs, plus the least severe level that
/// is still dispatched.
///
/// Built once before a logger is constructed and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelRegistry {
    levels: BTreeMap<SeverityLevel, LevelSpec>,
    min_priority: u8,
}

impl LevelRegistry {
    /// Registry with every level, dispatching up to `min_level`
    pub fn new(min_level: SeverityLevel) -> Self {
        Self::only(&SeverityLevel::ALL).with_min_level(min_level)
    }

    /// The shared default registry (all levels, minimum `info`)
    pub fn standard() -> &'static LevelRegistry {
        &STANDARD
    }

    /// Registry restricted to `levels`; everything registered is dispatched
    pub fn only(levels: &[SeverityLevel]) -> Self {
        let levels: BTreeMap<_, _> = levels.iter().map(|l| (*l, LevelSpec::of(*l))).collect();
        let min_priority = levels.values().map(|s| s.priority).max().unwrap_or(0);
        Self {
            levels,
            min_priority,
        }
    }

    /// Set the least severe level that is still dispatched
    pub fn with_min_level(mut self, level: SeverityLevel) -> Self {
        self.min_priority = self
            .levels
            .get(&level)
            .map(|s| s.priority)
            .unwrap_or_else(|| level.default_priority());
        self
    }

    /// Override the display color of a registered level
    pub fn with_color(mut self, level: SeverityLevel, color: LevelColor) -> Self {
        if let Some(spec) = self.levels.get_mut(&level) {
            spec.color = color;
        }
        self
    }

    pub fn spec(&self, level: SeverityLevel) -> Option<&LevelSpec> {
        self.levels.get(&level)
    }

    pub fn contains(&self, level: SeverityLevel) -> bool {
        self.levels.contains_key(&level)
    }

    /// Check `level` is registered and returns its spec
    pub fn require(&self, level: SeverityLevel) -> Result<&LevelSpec, LogError> {
        self.spec(level)
            .ok_or_else(|| LogError::unknown_level(level.as_str()))
    }

    /// Whether a registered level passes the minimum-priority filter
    pub fn allows(&self, level: SeverityLevel) -> bool {
        self.spec(level)
            .map(|s| s.priority <= self.min_priority)
            .unwrap_or(false)
    }

    pub fn levels(&self) -> impl Iterator<Item = SeverityLevel> + '_ {
        self.levels.keys().copied()
    }
}

impl Default for LevelRegistry {
    fn default() -> Self {
        Self::standard().clone()
    }
}
