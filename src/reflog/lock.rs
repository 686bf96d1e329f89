//! reflog::lock
//!
//! Advisory per-reference lock for serializing reflog writers.
//!
//! # Storage
//!
//! - `<common_dir>/reflog/locks/<refname>.lock`, with `/` flattened to `%`
//!
//! The lock is keyed on the reference name, not the log path, so every
//! worktree of a repository contends for the same file.
//!
//! # Invariants
//!
//! - Only cooperating processes are excluded; [`RefLog`](super::log::RefLog)
//!   never takes this lock itself
//! - Released on drop
//! - [`RefLogLock::acquire`] fails fast, [`RefLogLock::wait`] blocks

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;
use tracing::debug;

use crate::core::paths::RepoPaths;
use crate::core::types::RefName;

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another process already holds the lock.
    #[error("reflog for {0} is locked by another process")]
    AlreadyLocked(RefName),

    /// Failed to create lock file or directory.
    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    /// Failed to acquire the OS lock.
    #[error("failed to acquire lock: {0}")]
    AcquireFailed(String),

    /// Failed to release the lock.
    #[error("failed to release lock: {0}")]
    ReleaseFailed(String),
}

/// An exclusive lock on one reference's log.
#[derive(Debug)]
pub struct RefLogLock {
    path: PathBuf,
    /// Some while the lock is held.
    file: Option<File>,
}

impl RefLogLock {
    /// Take the lock for `refname`, failing with
    /// [`LockError::AlreadyLocked`] if another holder has it.
    pub fn acquire(paths: &RepoPaths, refname: &RefName) -> Result<Self, LockError> {
        let (path, file) = open_lock_file(paths, refname)?;
        match file.try_lock_exclusive() {
            Ok(()) => {
                debug!(path = %path.display(), "acquired reflog lock");
                Ok(Self {
                    path,
                    file: Some(file),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                Err(LockError::AlreadyLocked(refname.clone()))
            }
            Err(e) => Err(LockError::AcquireFailed(e.to_string())),
        }
    }

    /// Take the lock for `refname`, blocking until it is free.
    pub fn wait(paths: &RepoPaths, refname: &RefName) -> Result<Self, LockError> {
        let (path, file) = open_lock_file(paths, refname)?;
        file.lock_exclusive()
            .map_err(|e| LockError::AcquireFailed(e.to_string()))?;
        debug!(path = %path.display(), "acquired reflog lock after waiting");
        Ok(Self {
            path,
            file: Some(file),
        })
    }

    /// Like [`RefLogLock::acquire`], but `None` when the lock is busy.
    pub fn try_acquire(paths: &RepoPaths, refname: &RefName) -> Result<Option<Self>, LockError> {
        match Self::acquire(paths, refname) {
            Ok(lock) => Ok(Some(lock)),
            Err(LockError::AlreadyLocked(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release before the guard goes out of scope. Safe to call twice.
    pub fn release(&mut self) -> Result<(), LockError> {
        if let Some(file) = self.file.take() {
            file.unlock()
                .map_err(|e| LockError::ReleaseFailed(e.to_string()))?;
        }
        Ok(())
    }
}

impl Drop for RefLogLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.unlock();
        }
    }
}

fn open_lock_file(paths: &RepoPaths, refname: &RefName) -> Result<(PathBuf, File), LockError> {
    let path = paths.reflog_lock_path(refname);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| {
            LockError::CreateFailed(format!("cannot create {}: {}", dir.display(), e))
        })?;
    }

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&path)
        .map_err(|e| LockError::CreateFailed(format!("cannot open {}: {}", path.display(), e)))?;
    Ok((path, file))
}
