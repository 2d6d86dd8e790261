//! Filesystem access abstraction for the backup directory
//!
//! The inventory and the retention enforcer only touch the disk through
//! [`BackupStorage`], so ranking and deletion logic can run against an
//! in-memory directory in tests.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;
use tracing::warn;

/// Metadata the inventory needs for one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryStat {
    pub modified: SystemTime,
    pub size: u64,
    pub is_file: bool,
}

/// Abstraction over the backup directory, enabling mocking in tests
pub trait BackupStorage: Send + Sync {
    /// Names of all entries in `dir`
    fn read_dir_names(&self, dir: &Path) -> io::Result<Vec<String>>;

    /// Stat a single entry
    fn stat(&self, path: &Path) -> io::Result<EntryStat>;

    /// Remove a single file
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Whether `path` currently exists
    fn exists(&self, path: &Path) -> bool;
}

/// Default implementation backed by the real filesystem
#[derive(Debug, Clone, Default)]
pub struct FsStorage;

impl FsStorage {
    pub fn new() -> Self {
        Self
    }
}

impl BackupStorage for FsStorage {
    fn read_dir_names(&self, dir: &Path) -> io::Result<Vec<String>> {
        let entries = fs::read_dir(dir)?.map(|entry| entry.map(|e| e.file_name()));
        Ok(collect_names(dir, entries))
    }

    fn stat(&self, path: &Path) -> io::Result<EntryStat> {
        let metadata = fs::metadata(path)?;
        Ok(EntryStat {
            modified: metadata.modified()?,
            size: metadata.len(),
            is_file: metadata.is_file(),
        })
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Entry names, skipping entries that could not be read
fn collect_names<I>(dir: &Path, entries: I) -> Vec<String>
where
    I: IntoIterator<Item = io::Result<OsString>>,
{
    let mut names = Vec::new();
    for entry in entries {
        match entry {
            // Non UTF-8 names can never match the naming convention
            Ok(name) => {
                if let Ok(name) = name.into_string() {
                    names.push(name);
                }
            }
            Err(e) => warn!("Skipping unreadable entry in {:?}: {}", dir, e),
        }
    }
    names
}

/// In-memory storage for testing
/// Available for use in external test crates
#[allow(dead_code)]
pub mod mock {
    use super::*;
    use std::collections::{BTreeMap, HashMap};
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// A single in-memory directory
    #[derive(Clone, Default)]
    pub struct MockStorage {
        directory: Arc<Mutex<Option<PathBuf>>>,
        files: Arc<Mutex<BTreeMap<String, EntryStat>>>,
        /// Entries whose stat call fails
        broken_stats: Arc<Mutex<HashMap<String, io::ErrorKind>>>,
        /// Entries whose removal fails
        failing_removals: Arc<Mutex<HashMap<String, io::ErrorKind>>>,
        /// Error returned by `read_dir_names` for an existing directory
        read_dir_error: Arc<Mutex<Option<io::ErrorKind>>>,
        /// Every path passed to `remove_file`, in call order
        pub removals: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl MockStorage {
        /// Storage where `directory` exists and is empty
        pub fn new(directory: impl Into<PathBuf>) -> Self {
            let storage = Self::default();
            *storage.directory.lock().unwrap() = Some(directory.into());
            storage
        }

        /// Storage where no directory exists at all
        pub fn missing() -> Self {
            Self::default()
        }

        /// Add a file modified `secs` seconds after the epoch
        pub fn with_file(self, name: &str, secs: u64, size: u64) -> Self {
            self.files.lock().unwrap().insert(
                name.to_string(),
                EntryStat {
                    modified: SystemTime::UNIX_EPOCH + Duration::from_secs(secs),
                    size,
                    is_file: true,
                },
            );
            self
        }

        /// Add a subdirectory entry
        pub fn with_subdirectory(self, name: &str) -> Self {
            self.files.lock().unwrap().insert(
                name.to_string(),
                EntryStat {
                    modified: SystemTime::UNIX_EPOCH,
                    size: 0,
                    is_file: false,
                },
            );
            self
        }

        /// Make stat fail for `name`
        pub fn with_broken_stat(self, name: &str, kind: io::ErrorKind) -> Self {
            self.broken_stats
                .lock()
                .unwrap()
                .insert(name.to_string(), kind);
            self
        }

        /// Make removal fail for `name`
        pub fn with_failing_removal(self, name: &str, kind: io::ErrorKind) -> Self {
            self.failing_removals
                .lock()
                .unwrap()
                .insert(name.to_string(), kind);
            self
        }

        /// Make listing the directory fail
        pub fn with_read_dir_error(self, kind: io::ErrorKind) -> Self {
            *self.read_dir_error.lock().unwrap() = Some(kind);
            self
        }

        /// Names still present
        pub fn file_names(&self) -> Vec<String> {
            self.files.lock().unwrap().keys().cloned().collect()
        }

        /// Number of `remove_file` calls made
        pub fn removal_count(&self) -> usize {
            self.removals.lock().unwrap().len()
        }

        fn name_in_directory(&self, path: &Path) -> Option<String> {
            let directory = self.directory.lock().unwrap();
            let directory = directory.as_ref()?;
            if path.parent()? != directory.as_path() {
                return None;
            }
            path.file_name()?.to_str().map(str::to_string)
        }
    }

    impl BackupStorage for MockStorage {
        fn read_dir_names(&self, dir: &Path) -> io::Result<Vec<String>> {
            let directory = self.directory.lock().unwrap().clone();
            match directory {
                Some(ref d) if d.as_path() == dir => {}
                _ => return Err(io::Error::from(io::ErrorKind::NotFound)),
            }
            if let Some(kind) = *self.read_dir_error.lock().unwrap() {
                return Err(io::Error::from(kind));
            }
            Ok(self.file_names())
        }

        fn stat(&self, path: &Path) -> io::Result<EntryStat> {
            let name = self
                .name_in_directory(path)
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;
            if let Some(kind) = self.broken_stats.lock().unwrap().get(&name) {
                return Err(io::Error::from(*kind));
            }
            self.files
                .lock()
                .unwrap()
                .get(&name)
                .copied()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }

        fn remove_file(&self, path: &Path) -> io::Result<()> {
            self.removals.lock().unwrap().push(path.to_path_buf());
            let name = self
                .name_in_directory(path)
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;
            if let Some(kind) = self.failing_removals.lock().unwrap().get(&name) {
                return Err(io::Error::from(*kind));
            }
            match self.files.lock().unwrap().remove(&name) {
                Some(_) => Ok(()),
                None => Err(io::Error::from(io::ErrorKind::NotFound)),
            }
        }

        fn exists(&self, path: &Path) -> bool {
            self.name_in_directory(path)
                .map(|name| self.files.lock().unwrap().contains_key(&name))
                .unwrap_or(false)
        }
    }
}
