//! Logger settings

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use crate::format::Rendering;
use crate::level::{LevelColor, LevelRegistry, SeverityLevel};

/// Environment variables understood by [`LoggerSettings::apply_env`]
pub mod env_keys {
    pub const PRINT_TO_CONSOLE: &str = "PRINT_TO_CONSOLE";
    pub const LOG_FILE_PATH: &str = "LOG_FILE_PATH";
    pub const SUCCESS_LOG_FILE_PATH: &str = "SUCCESS_LOG_FILE_PATH";
    pub const LOG_PROJECT_ROOT: &str = "LOG_PROJECT_ROOT";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    pub const LOG_UTC_OFFSET_MINUTES: &str = "LOG_UTC_OFFSET_MINUTES";
}

/// Format of records in the log files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    #[default]
    Text,
    Json,
}

impl FileFormat {
    pub fn rendering(&self) -> Rendering {
        match self {
            FileFormat::Text => Rendering::Plain,
            FileFormat::Json => Rendering::Json,
        }
    }
}

/// Everything needed to build the loggers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerSettings {
    /// General log file; relative paths are resolved against `project_root`
    pub log_file_path: PathBuf,

    /// Success log file; relative paths are resolved against `project_root`
    pub success_log_file_path: PathBuf,

    /// Also print records to the console
    pub print_to_console: bool,

    /// Root that caller paths are reported relative to
    pub project_root: PathBuf,

    /// Reference offset for timestamps, in minutes east of UTC
    pub utc_offset_minutes: i32,

    /// Least severe level that is still dispatched
    pub min_level: SeverityLevel,

    pub file_format: FileFormat,

    /// Per-level console color overrides
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub colors: BTreeMap<SeverityLevel, LevelColor>,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            log_file_path: PathBuf::from("server.log"),
            success_log_file_path: PathBuf::from("success.log"),
            print_to_console: false,
            project_root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            utc_offset_minutes: 0,
            min_level: SeverityLevel::Info,
            file_format: FileFormat::Text,
            colors: BTreeMap::new(),
        }
    }
}

impl LoggerSettings {
    /// Defaults overridden by the process environment
    pub fn from_env() -> ConfigResult<Self> {
        Self::default().apply_env(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `lookup`
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        Self::default().apply_env(lookup)
    }

    /// Override settings with the variables in [`env_keys`]
    ///
    /// `PRINT_TO_CONSOLE` enables the console only for the exact value
    /// `"true"`; any other value disables it.
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        if let Some(value) = lookup(env_keys::PRINT_TO_CONSOLE) {
            self.print_to_console = value == "true";
        }
        if let Some(value) = lookup(env_keys::LOG_FILE_PATH).filter(|v| !v.is_empty()) {
            self.log_file_path = PathBuf::from(value);
        }
        if let Some(value) = lookup(env_keys::SUCCESS_LOG_FILE_PATH).filter(|v| !v.is_empty()) {
            self.success_log_file_path = PathBuf::from(value);
        }
        if let Some(value) = lookup(env_keys::LOG_PROJECT_ROOT).filter(|v| !v.is_empty()) {
            self.project_root = PathBuf::from(value);
        }
        if let Some(value) = lookup(env_keys::LOG_LEVEL) {
            self.min_level = value
                .parse()
                .map_err(|_| ConfigError::invalid_value(env_keys::LOG_LEVEL, value))?;
        }
        if let Some(value) = lookup(env_keys::LOG_UTC_OFFSET_MINUTES) {
            self.utc_offset_minutes = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid_value(env_keys::LOG_UTC_OFFSET_MINUTES, value))?;
        }
        Ok(self)
    }

    /// General log file path, resolved against the project root
    pub fn resolved_log_file_path(&self) -> PathBuf {
        self.resolve(&self.log_file_path)
    }

    /// Success log file path, resolved against the project root
    pub fn resolved_success_log_file_path(&self) -> PathBuf {
        self.resolve(&self.success_log_file_path)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    /// Timestamp offset; must be strictly within one day of UTC
    pub fn reference_offset(&self) -> ConfigResult<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ConfigError::invalid_value("utc_offset_minutes", self.utc_offset_minutes.to_string())
            })
    }

    /// Registry of the general logger: every level, filtered at `min_level`
    pub fn level_registry(&self) -> LevelRegistry {
        self.colors.iter().fold(
            LevelRegistry::new(self.min_level),
            |registry, (level, color)| registry.with_color(*level, *color),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = LoggerSettings::default();
        assert_eq!(settings.log_file_path, PathBuf::from("server.log"));
        assert_eq!(settings.success_log_file_path, PathBuf::from("success.log"));
        assert!(!settings.print_to_console);
        assert_eq!(settings.min_level, SeverityLevel::Info);
        assert_eq!(settings.reference_offset().unwrap().local_minus_utc(), 0);
    }

    #[test]
    fn test_print_to_console_requires_exact_true() {
        let on = LoggerSettings::from_env_with(lookup(&[("PRINT_TO_CONSOLE", "true")])).unwrap();
        assert!(on.print_to_console);

        for value in ["TRUE", "1", "yes", ""] {
            let off =
                LoggerSettings::from_env_with(lookup(&[("PRINT_TO_CONSOLE", value)])).unwrap();
            assert!(!off.print_to_console, "{:?} must not enable the console", value);
        }
    }

    #[test]
    fn test_env_overrides() {
        let settings = LoggerSettings::from_env_with(lookup(&[
            ("LOG_FILE_PATH", "logs/app.log"),
            ("LOG_PROJECT_ROOT", "/srv/app"),
            ("LOG_LEVEL", "debug"),
            ("LOG_UTC_OFFSET_MINUTES", "-300"),
        ]))
        .unwrap();

        assert_eq!(settings.resolved_log_file_path(), PathBuf::from("/srv/app/logs/app.log"));
        assert_eq!(
            settings.resolved_success_log_file_path(),
            PathBuf::from("/srv/app/success.log")
        );
        assert_eq!(settings.min_level, SeverityLevel::Debug);
        assert_eq!(settings.reference_offset().unwrap().local_minus_utc(), -300 * 60);
    }

    #[test]
    fn test_invalid_env_values() {
        let level = LoggerSettings::from_env_with(lookup(&[("LOG_LEVEL", "loud")]));
        assert!(matches!(level, Err(ConfigError::InvalidValue { key, .. }) if key == "LOG_LEVEL"));

        let offset = LoggerSettings::from_env_with(lookup(&[("LOG_UTC_OFFSET_MINUTES", "east")]));
        assert!(offset.is_err());

        let settings = LoggerSettings {
            utc_offset_minutes: 24 * 60,
            ..LoggerSettings::default()
        };
        assert!(settings.reference_offset().is_err());
    }

    #[test]
    fn test_level_registry_applies_colors() {
        let mut settings = LoggerSettings::default();
        settings.colors.insert(SeverityLevel::Info, LevelColor::Magenta);
        let registry = settings.level_registry();
        assert_eq!(registry.spec(SeverityLevel::Info).unwrap().color, LevelColor::Magenta);
        assert!(!registry.allows(SeverityLevel::Debug));
    }
}
