//! Logger configuration
//!
//! Settings come from three places, applied in order:
//! - built-in defaults
//! - a YAML settings file (`SettingsFile`), user or workspace level
//! - environment variables (`LoggerSettings::apply_env`)
//!
//! Settings are read once when the loggers are built and never reread.

mod error;
mod settings;
mod file;

pub use error::{ConfigError, ConfigResult};
pub use settings::{LoggerSettings, FileFormat, env_keys};
pub use file::{SettingsFile, ConfigLevel};
