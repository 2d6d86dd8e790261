//! File-based locking so retention and restore never overlap on one directory

use anyhow::{Context, Result};
use fd_lock::{RwLock, RwLockWriteGuard};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Exclusive lock on a backup directory
pub struct DirectoryLock {
    // Declared before `_lock` so the guard is dropped first
    _guard: Option<RwLockWriteGuard<'static, File>>,
    _lock: Box<RwLock<File>>,
    lock_path: PathBuf,
}

impl DirectoryLock {
    /// Acquire the lock for `backup_directory` without waiting
    /// Returns error if another prune or restore holds it
    pub fn acquire(lock_directory: &Path, backup_directory: &Path) -> Result<Self> {
        let lock_path = Self::lock_path(lock_directory, backup_directory);

        debug!("Attempting to acquire lock: {:?}", lock_path);

        std::fs::create_dir_all(lock_directory)
            .context("Failed to create lock directory")?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .context(format!("Failed to open lock file: {:?}", lock_path))?;

        let mut lock = Box::new(RwLock::new(file));

        // SAFETY: the guard borrows the heap-allocated RwLock, which never
        // moves while the Box lives. Field order drops the guard first.
        let lock_ptr: *mut RwLock<File> = &mut *lock;
        let guard = unsafe { (*lock_ptr).try_write() }.context(format!(
            "Backup directory {:?} is busy (another prune or restore holds the lock)",
            backup_directory
        ))?;
        let guard: RwLockWriteGuard<'static, File> = unsafe { std::mem::transmute(guard) };

        info!("Acquired lock for backup directory: {:?}", backup_directory);

        Ok(Self {
            _guard: Some(guard),
            _lock: lock,
            lock_path,
        })
    }

    /// One lock file per backup directory
    fn lock_path(lock_directory: &Path, backup_directory: &Path) -> PathBuf {
        let canonical = canonical_directory(backup_directory);
        // Percent-encoding keeps distinct paths on distinct lock files
        let key = urlencoding::encode(&canonical.to_string_lossy()).into_owned();
        lock_directory.join(format!("dbdump-manager-{}.lock", key))
    }

    /// Get the lock file path (for cleanup or inspection)
    pub fn path(&self) -> &Path {
        &self.lock_path
    }
}

/// Canonical form of `directory`, even when it does not exist yet
fn canonical_directory(directory: &Path) -> PathBuf {
    if let Ok(canonical) = directory.canonicalize() {
        return canonical;
    }

    let absolute = if directory.is_absolute() {
        directory.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(directory))
            .unwrap_or_else(|_| directory.to_path_buf())
    };

    match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) => parent
            .canonicalize()
            .map(|parent| parent.join(name))
            .unwrap_or(absolute),
        _ => absolute,
    }
}

impl Drop for DirectoryLock {
    fn drop(&mut self) {
        info!("Released lock: {:?}", self.lock_path);
        // The file itself stays; removing it would let a waiter lock a stale inode
    }
}
