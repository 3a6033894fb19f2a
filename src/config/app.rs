// src/config/app.rs
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::defaults::*;
use crate::error::{CoreError, Result};

/// Path of an alternative config file
pub const CONFIG_ENV: &str = "PV_CONFIG";
/// Overrides `[paths] database`
pub const DATABASE_ENV: &str = "PV_DATABASE";
/// Overrides `[paths] session_file`
pub const SESSION_FILE_ENV: &str = "PV_SESSION_FILE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_paths")]
    pub paths: Paths,
    #[serde(default = "default_security")]
    pub security: Security,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paths {
    #[serde(default = "default_database")]
    pub database: PathBuf,
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Security {
    #[serde(default = "default_session_timeout_secs")]
    pub session_timeout_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: default_paths(),
            security: default_security(),
        }
    }
}

impl Config {
    /// Defaults with every file placed under `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            paths: Paths {
                database: dir.join("vault.db"),
                session_file: dir.join("session"),
            },
            security: default_security(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `PV_DATABASE` / `PV_SESSION_FILE` as returned by `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<OsString>) {
        if let Some(database) = lookup(DATABASE_ENV).filter(|v| !v.is_empty()) {
            self.paths.database = PathBuf::from(database);
        }
        if let Some(session_file) = lookup(SESSION_FILE_ENV).filter(|v| !v.is_empty()) {
            self.paths.session_file = PathBuf::from(session_file);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.security.max_attempts == 0 {
            return Err(CoreError::Config(
                "security.max_attempts must be at least 1".into(),
            ));
        }
        if self.security.session_timeout_secs == 0 {
            return Err(CoreError::Config(
                "security.session_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Advisory lock file guarding writes: `<database>.lock`
    pub fn lock_path(&self) -> PathBuf {
        let mut path = self.paths.database.clone().into_os_string();
        path.push(".lock");
        PathBuf::from(path)
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.security.session_timeout_secs)
    }
}

/// Load from `$PV_CONFIG`, the default location, or built-in defaults, then apply env overrides
pub fn load() -> Result<Config> {
    load_with(|name| std::env::var_os(name))
}

/// [`load`] with an injectable environment
pub fn load_with(lookup: impl Fn(&str) -> Option<OsString>) -> Result<Config> {
    let explicit = lookup(CONFIG_ENV).filter(|v| !v.is_empty()).map(PathBuf::from);

    let mut config = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(CoreError::Config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            Config::from_file(&path)?
        }
        None => {
            let path = default_config_file();
            if path.exists() {
                Config::from_file(&path)?
            } else {
                debug!(path = %path.display(), "no config file, using built-in defaults");
                Config::default()
            }
        }
    };

    config.apply_overrides(&lookup);
    config.validate()?;
    debug!(database = %config.paths.database.display(), "configuration loaded");
    Ok(config)
}
