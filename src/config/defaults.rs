// src/config/defaults.rs
use std::path::PathBuf;

use crate::config::app::{Paths, Security};
use crate::consts::{APP_DIR_NAME, DEFAULT_MAX_ATTEMPTS, DEFAULT_SESSION_TIMEOUT_SECS};

/// `<config_dir>/profile-vault`, or `./profile-vault` where no config dir exists
pub fn app_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

pub fn default_config_file() -> PathBuf {
    app_dir().join("config.toml")
}

pub fn default_database() -> PathBuf {
    app_dir().join("vault.db")
}

pub fn default_session_file() -> PathBuf {
    app_dir().join("session")
}

pub fn default_session_timeout_secs() -> u64 {
    DEFAULT_SESSION_TIMEOUT_SECS
}

pub fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

pub fn default_paths() -> Paths {
    Paths {
        database: default_database(),
        session_file: default_session_file(),
    }
}

pub fn default_security() -> Security {
    Security {
        session_timeout_secs: default_session_timeout_secs(),
        max_attempts: default_max_attempts(),
    }
}
