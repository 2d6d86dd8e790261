//! Test context and harness
//!
//! Provides a temporary backup directory with helpers for creating dumps
//! of a given age.

use crate::fixtures::sample_dump;
use anyhow::Result;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// Test context that manages a temporary backup directory
pub struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    /// Create a new test context with an empty `backups/` directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(temp_dir.path().join("backups"))
            .expect("Failed to create backup directory");
        Self { temp_dir }
    }

    /// Get the temporary directory path
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Directory holding the dumps
    pub fn backup_dir(&self) -> PathBuf {
        self.temp_dir.path().join("backups")
    }

    /// A directory path that does not exist
    pub fn missing_dir(&self) -> PathBuf {
        self.temp_dir.path().join("never-created")
    }

    /// Create a dump last modified `age_secs` seconds ago
    pub fn create_backup(&self, name: &str, age_secs: u64) -> PathBuf {
        let path = self.backup_dir().join(name);
        fs::write(&path, sample_dump()).expect("Failed to write backup");
        let modified = SystemTime::now() - Duration::from_secs(age_secs);
        File::options()
            .write(true)
            .open(&path)
            .and_then(|file| file.set_modified(modified))
            .expect("Failed to set modification time");
        path
    }

    /// Create a file in the backup directory that is not a dump
    pub fn create_foreign_file(&self, name: &str) -> PathBuf {
        let path = self.backup_dir().join(name);
        fs::write(&path, "not a dump").expect("Failed to write file");
        path
    }

    /// Create a file in the temp dir
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Sorted names currently in the backup directory
    pub fn remaining(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.backup_dir())
            .expect("Failed to read backup directory")
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    /// Read a file from the backup directory
    pub fn read_backup(&self, name: &str) -> Result<String> {
        Ok(fs::read_to_string(self.backup_dir().join(name))?)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
