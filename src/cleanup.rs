// src/cleanup.rs
//! Temp-file cleanup queue and interrupt handling
//!
//! Temp files normally remove themselves on drop. The queue exists for the one path
//! where destructors never run: Ctrl-C, which ends the process from the signal thread.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

static PENDING: Mutex<Vec<PathBuf>> = Mutex::new(Vec::new());

fn pending_paths() -> MutexGuard<'static, Vec<PathBuf>> {
    PENDING.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Registration of a temp path; unregistered when dropped
#[must_use = "the path is unqueued as soon as the guard is dropped"]
#[derive(Debug)]
pub struct Queued {
    path: PathBuf,
}

impl Queued {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Queued {
    fn drop(&mut self) {
        let mut pending = pending_paths();
        if let Some(pos) = pending.iter().position(|p| p == &self.path) {
            pending.swap_remove(pos);
        }
    }
}

/// Queue `path` for removal if the process is interrupted
pub fn queue(path: &Path) -> Queued {
    pending_paths().push(path.to_path_buf());
    Queued {
        path: path.to_path_buf(),
    }
}

/// Snapshot of the queued paths
pub fn pending() -> Vec<PathBuf> {
    pending_paths().clone()
}

/// Remove every queued file that still exists; returns how many were deleted
pub fn purge() -> usize {
    let paths: Vec<PathBuf> = pending_paths().drain(..).collect();
    let mut removed = 0;
    for path in paths {
        if fs::remove_file(&path).is_ok() {
            debug!(path = %path.display(), "removed temp file");
            removed += 1;
        }
    }
    removed
}

/// On Ctrl-C: restore terminal echo, purge temp files, exit 130
///
/// Advisory locks need no handling; the OS releases them with the process.
#[cfg(feature = "cli")]
pub fn install_interrupt_handler() -> Result<(), ctrlc::Error> {
    let terminal = terminal::Snapshot::capture();
    ctrlc::set_handler(move || {
        if let Some(snapshot) = &terminal {
            snapshot.restore();
        }
        purge();
        eprintln!();
        eprintln!("interrupted");
        std::process::exit(130);
    })
}

#[cfg(all(unix, feature = "cli"))]
mod terminal {
    /// Saved termios of stdin, taken before any password prompt disables echo
    pub struct Snapshot(libc::termios);

    impl Snapshot {
        pub fn capture() -> Option<Self> {
            // SAFETY: termios is plain old data; tcgetattr fully initialises it on success
            let mut termios: libc::termios = unsafe { std::mem::zeroed() };
            let rc = unsafe { libc::tcgetattr(libc::STDIN_FILENO, &mut termios) };
            (rc == 0).then_some(Snapshot(termios))
        }

        pub fn restore(&self) {
            // SAFETY: restoring attributes previously read from the same descriptor
            unsafe {
                libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, &self.0);
            }
        }
    }
}

#[cfg(all(not(unix), feature = "cli"))]
mod terminal {
    pub struct Snapshot;

    impl Snapshot {
        pub fn capture() -> Option<Self> {
            None
        }

        pub fn restore(&self) {}
    }
}
