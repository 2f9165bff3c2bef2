//! Application configuration.
//!
//! # Responsibility
//! - Resolve where tasks are stored and where logs are written.
//! - Load optional overrides from a TOML file.
//!
//! # Invariants
//! - A missing config file yields defaults; a malformed one is an error.
//! - Relative paths in a config file resolve against the file's directory.

use crate::logging::{default_log_level, normalize_level};
use crate::repo::task_repo::DEFAULT_NAMESPACE;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "tasklist";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "tasklist.sqlite3";
const LOG_DIR_NAME: &str = "logs";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Storage namespace holding this list's records.
    pub namespace: String,
    pub log_level: String,
    /// Absolute directory for rolling log files.
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            db_path: data_dir.join(DB_FILE_NAME),
            namespace: DEFAULT_NAMESPACE.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: data_dir.join(LOG_DIR_NAME),
        }
    }
}

impl AppConfig {
    /// Platform location of the config file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Loads `path`, or the platform default when `None`.
    ///
    /// # Errors
    /// - `Io` when the file exists but cannot be read.
    /// - `Parse` when the TOML is malformed.
    /// - `Invalid` when a value fails validation.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let path = path.map_or_else(Self::default_path, Path::to_path_buf);
        if !path.exists() {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }

        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let mut config = Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Checks values that would otherwise fail late at startup.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.namespace.trim().is_empty() {
            return Err(ConfigError::Invalid("namespace must not be blank".to_string()));
        }
        normalize_level(&self.log_level).map_err(|err| ConfigError::Invalid(err.to_string()))?;
        if !self.log_dir.is_absolute() {
            return Err(ConfigError::Invalid(format!(
                "log_dir must be absolute, got `{}`",
                self.log_dir.display()
            )));
        }
        Ok(())
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        if self.db_path.is_relative() {
            self.db_path = base.join(&self.db_path);
        }
        if self.log_dir.is_relative() {
            self.log_dir = base.join(&self.log_dir);
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError};
    use std::fs;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.namespace, "tasks-backbone");
    }

    #[test]
    fn partial_file_overrides_and_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "namespace = \"groceries\"\ndb_path = \"data/tasks.db\"\nlog_dir = \"logs\"\n",
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.namespace, "groceries");
        assert_eq!(config.db_path, dir.path().join("data/tasks.db"));
        assert_eq!(config.log_dir, dir.path().join("logs"));
        assert_eq!(config.log_level, AppConfig::default().log_level);
    }

    #[test]
    fn malformed_or_invalid_files_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let malformed = dir.path().join("bad.toml");
        fs::write(&malformed, "namespace = [").unwrap();
        assert!(matches!(
            AppConfig::load(Some(&malformed)),
            Err(ConfigError::Parse { .. })
        ));

        let blank = dir.path().join("blank.toml");
        fs::write(&blank, "namespace = \"  \"").unwrap();
        assert!(matches!(
            AppConfig::load(Some(&blank)),
            Err(ConfigError::Invalid(_))
        ));

        let level = dir.path().join("level.toml");
        fs::write(&level, "log_level = \"loud\"").unwrap();
        assert!(matches!(
            AppConfig::load(Some(&level)),
            Err(ConfigError::Invalid(_))
        ));
    }
}
