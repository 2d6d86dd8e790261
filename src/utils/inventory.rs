//! Backup inventory: list, stat and rank the dumps in a directory

use super::storage::BackupStorage;
use crate::error::LifecycleError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Which filenames count as dumps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConvention {
    prefix: String,
    suffix: String,
}

impl NamingConvention {
    pub fn new(prefix: &str, suffix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        }
    }

    /// A name matches when it carries both affixes around a non-empty stem
    pub fn matches(&self, name: &str) -> bool {
        name.len() > self.prefix.len() + self.suffix.len()
            && name.starts_with(&self.prefix)
            && name.ends_with(&self.suffix)
    }
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self::new("backup-", ".sql")
    }
}

/// One dump on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupFile {
    pub name: String,
    pub path: PathBuf,
    pub modified_at: DateTime<Utc>,
    pub size_bytes: u64,
}

impl BackupFile {
    /// Modification time as a UTC timestamp
    pub fn modified_utc(&self) -> DateTime<Utc> {
        self.modified_at
    }

    /// Newest-first ordering with a filename tie-break
    fn recency_cmp(&self, other: &Self) -> Ordering {
        other
            .modified_at
            .cmp(&self.modified_at)
            .then_with(|| other.name.cmp(&self.name))
    }
}

/// Dumps ordered newest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BackupInventory {
    files: Vec<BackupFile>,
}

impl BackupInventory {
    /// Build an inventory, establishing the recency order
    pub fn from_files(mut files: Vec<BackupFile>) -> Self {
        files.sort_by(BackupFile::recency_cmp);
        Self { files }
    }

    pub fn files(&self) -> &[BackupFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn newest(&self) -> Option<&BackupFile> {
        self.files.first()
    }

    /// Lookup by 1-based position
    pub fn get_one_based(&self, index: usize) -> Option<&BackupFile> {
        index.checked_sub(1).and_then(|i| self.files.get(i))
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size_bytes).sum()
    }

    /// Split into the `keep` newest and everything older
    pub fn split_at_keep(&self, keep: usize) -> (&[BackupFile], &[BackupFile]) {
        self.files.split_at(keep.min(self.files.len()))
    }
}

/// List the dumps in `directory`, newest first
///
/// A missing directory yields an empty inventory. Entries that fail to
/// stat are skipped with a warning.
pub fn list_backups(
    storage: &dyn BackupStorage,
    directory: &Path,
    naming: &NamingConvention,
) -> Result<BackupInventory, LifecycleError> {
    let names = match storage.read_dir_names(directory) {
        Ok(names) => names,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Backup directory does not exist: {:?}", directory);
            return Ok(BackupInventory::default());
        }
        Err(e) => return Err(LifecycleError::from_io(directory, e)),
    };

    let mut files = Vec::new();
    for name in names {
        if !naming.matches(&name) {
            debug!("Ignoring non-backup entry: {}", name);
            continue;
        }

        let path = directory.join(&name);
        match storage.stat(&path) {
            Ok(stat) if stat.is_file => files.push(BackupFile {
                name,
                path,
                modified_at: stat.modified.into(),
                size_bytes: stat.size,
            }),
            Ok(_) => debug!("Ignoring non-file entry: {}", name),
            Err(e) => warn!("Failed to stat {:?}, excluding it: {}", path, e),
        }
    }

    debug!("Found {} backups in {:?}", files.len(), directory);
    Ok(BackupInventory::from_files(files))
}

/// Human-readable byte count
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
