// src/session.rs
//! Session Cache: short-lived proof of a recent successful verification
//!
//! A session only lets read-only status displays skip a prompt. Anything that decrypts
//! or mutates payloads runs the full verification protocol regardless.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::aliases::MasterPassword;
use crate::cleanup;
use crate::config::Config;
use crate::error::{CoreError, Result};

/// A live session artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    created_at: SystemTime,
    expires_at: SystemTime,
}

impl Session {
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    pub fn expires_at(&self) -> SystemTime {
        self.expires_at
    }

    /// Time left before expiry, measured at `now`
    pub fn remaining_at(&self, now: SystemTime) -> Duration {
        self.expires_at.duration_since(now).unwrap_or(Duration::ZERO)
    }
}

#[derive(Debug, Clone)]
pub struct SessionCache {
    path: PathBuf,
    timeout: Duration,
}

impl SessionCache {
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.paths.session_file.clone(), config.session_timeout())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Write `sha256(password)` to the session file, owner-only, via temp file + rename
    pub fn create(&self, password: &MasterPassword) -> Result<Session> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        let _queued = cleanup::queue(tmp.path());
        set_owner_only(tmp.as_file())?;

        writeln!(tmp, "{}", password_digest(password))?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| CoreError::Io(e.error))?;

        let created_at = fs::metadata(&self.path)?.modified()?;
        debug!(path = %self.path.display(), "session created");
        Ok(Session {
            created_at,
            expires_at: created_at + self.timeout,
        })
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(SystemTime::now())
    }

    pub fn is_valid_at(&self, now: SystemTime) -> bool {
        self.current_at(now).is_some()
    }

    pub fn current(&self) -> Option<Session> {
        self.current_at(SystemTime::now())
    }

    /// The session as of `now`, if the artifact exists and `now - mtime < timeout`
    pub fn current_at(&self, now: SystemTime) -> Option<Session> {
        let created_at = fs::metadata(&self.path).and_then(|m| m.modified()).ok()?;
        // A modification time in the future is not trusted
        let age = now.duration_since(created_at).ok()?;
        (age < self.timeout).then(|| Session {
            created_at,
            expires_at: created_at + self.timeout,
        })
    }

    /// Remove the artifact along with the state it vouched for (vault reset)
    pub(crate) fn discard(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "session discarded");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to discard session");
                Err(err.into())
            }
        }
    }
}

fn password_digest(password: &MasterPassword) -> String {
    hex::encode(Sha256::digest(password.expose_secret().as_bytes()))
}

#[cfg(unix)]
pub(crate) fn set_owner_only(file: &fs::File) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn set_owner_only(_file: &fs::File) -> Result<()> {
    Ok(())
}
