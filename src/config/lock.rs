//! Cross-process guard around cascades
//!
//! `CascadeRegistry` only sees cascades in its own process. The lock file
//! keeps a second `stackboi` process from rebasing the same working tree at
//! the same time.

use super::storage::stackboi_dir;
use crate::error::{Error, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Lock file name inside the stackboi metadata directory.
const LOCK_FILE: &str = "sync.lock";

/// Held while a cascade runs; the lock file is removed on drop
#[derive(Debug)]
pub struct SyncLock {
    path: PathBuf,
}

impl SyncLock {
    /// Take the sync lock for the repository at `repo_root`.
    ///
    /// Fails immediately with `SyncLocked` if another process holds it.
    pub fn acquire(repo_root: &Path) -> Result<Self> {
        let dir = stackboi_dir(repo_root);
        fs::create_dir_all(&dir)
            .map_err(|e| Error::Config(format!("failed to create {}: {e}", dir.display())))?;
        let path = dir.join(LOCK_FILE);

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(Error::SyncLocked {
                    path: path.display().to_string(),
                });
            }
            Err(e) => {
                return Err(Error::Config(format!(
                    "failed to acquire lock {}: {e}",
                    path.display()
                )));
            }
        };
        // Owner pid, for whoever finds a stale lock
        if let Err(e) = writeln!(file, "{}", std::process::id()) {
            warn!(path = %path.display(), error = %e, "could not record lock owner");
        }

        debug!(path = %path.display(), "sync lock acquired");
        Ok(Self { path })
    }

    /// Path of the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SyncLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
