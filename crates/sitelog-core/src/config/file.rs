//! File-based logger settings (YAML)
//!
//! Supports user-level (~/.config/sitelog/config.yaml) and workspace-level
//! (.config/sitelog/config.yaml) settings.

use std::fs;
use std::path::{Path, PathBuf};

use super::error::ConfigResult;
use super::settings::LoggerSettings;

/// Config level (user or workspace)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLevel {
    /// User-level config (~/.config/sitelog/config.yaml)
    User,
    /// Workspace-level config (.config/sitelog/config.yaml in workspace root)
    Workspace,
}

/// YAML file holding [`LoggerSettings`]
///
/// # Example
///
/// ```no_run
/// use sitelog_core::config::SettingsFile;
///
/// let settings = SettingsFile::workspace("/path/to/project")
///     .load()?
///     .apply_env(|key| std::env::var(key).ok())?;
/// # Ok::<(), sitelog_core::config::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
    level: ConfigLevel,
}

impl SettingsFile {
    pub fn new(path: impl Into<PathBuf>, level: ConfigLevel) -> Self {
        Self {
            path: path.into(),
            level,
        }
    }

    /// User-level settings (~/.config/sitelog/config.yaml)
    pub fn user() -> Self {
        let config_dir = dirs::config_dir().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
        });
        Self::new(config_dir.join("sitelog").join("config.yaml"), ConfigLevel::User)
    }

    /// Workspace-level settings (.config/sitelog/config.yaml)
    pub fn workspace(workspace_root: impl AsRef<Path>) -> Self {
        let path = workspace_root
            .as_ref()
            .join(".config")
            .join("sitelog")
            .join("config.yaml");
        Self::new(path, ConfigLevel::Workspace)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn level(&self) -> ConfigLevel {
        self.level
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load settings; a missing file yields the defaults
    pub fn load(&self) -> ConfigResult<LoggerSettings> {
        if !self.exists() {
            return Ok(LoggerSettings::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(LoggerSettings::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Write settings, creating parent directories as needed
    pub fn save(&self, settings: &LoggerSettings) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_yaml::to_string(settings)?)?;
        Ok(())
    }
}
