//! Retention enforcer - deletes dumps beyond the keep count

use crate::error::{FailureCause, LifecycleError};
use crate::utils::inventory::{list_backups, NamingConvention};
use crate::utils::storage::BackupStorage;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

/// How many dumps survive a retention pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetentionPolicy {
    keep_count: usize,
}

#[derive(Debug, thiserror::Error)]
#[error("keep count must be at least 1, got {0}")]
pub struct InvalidKeepCount(pub usize);

impl RetentionPolicy {
    /// Zero is rejected rather than deleting every dump
    pub fn new(keep_count: usize) -> Result<Self, InvalidKeepCount> {
        if keep_count == 0 {
            return Err(InvalidKeepCount(keep_count));
        }
        Ok(Self { keep_count })
    }

    pub fn keep_count(&self) -> usize {
        self.keep_count
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self { keep_count: 5 }
    }
}

/// A file that could not be deleted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionFailure {
    pub file: PathBuf,
    pub cause: FailureCause,
}

/// Outcome of a retention pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RetentionReport {
    pub directory: PathBuf,
    pub dry_run: bool,
    pub kept: usize,
    pub deleted: usize,
    pub kept_files: Vec<String>,
    pub deleted_files: Vec<String>,
    pub errors: Vec<DeletionFailure>,
}

impl RetentionReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct RetentionEnforcer {
    storage: Arc<dyn BackupStorage>,
    directory: PathBuf,
    naming: NamingConvention,
}

impl RetentionEnforcer {
    pub fn new(
        storage: Arc<dyn BackupStorage>,
        directory: impl Into<PathBuf>,
        naming: NamingConvention,
    ) -> Self {
        Self {
            storage,
            directory: directory.into(),
            naming,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Delete every dump older than the `keep_count` newest
    pub fn enforce(&self, policy: RetentionPolicy) -> Result<RetentionReport, LifecycleError> {
        self.run(policy, false)
    }

    /// Report what `enforce` would delete without touching the disk
    pub fn plan(&self, policy: RetentionPolicy) -> Result<RetentionReport, LifecycleError> {
        self.run(policy, true)
    }

    fn run(
        &self,
        policy: RetentionPolicy,
        dry_run: bool,
    ) -> Result<RetentionReport, LifecycleError> {
        // One snapshot decides the split; dumps appearing later are not reclassified
        let inventory = list_backups(self.storage.as_ref(), &self.directory, &self.naming)?;
        let (keep, expired) = inventory.split_at_keep(policy.keep_count());

        let mut report = RetentionReport {
            directory: self.directory.clone(),
            dry_run,
            kept: keep.len(),
            kept_files: keep.iter().map(|f| f.name.clone()).collect(),
            ..Default::default()
        };

        if expired.is_empty() {
            debug!(
                "{} backups within keep count {}, nothing to delete",
                keep.len(),
                policy.keep_count()
            );
            return Ok(report);
        }

        info!(
            "Retention: keeping {} newest, {} older backup(s) to delete in {:?}",
            keep.len(),
            expired.len(),
            self.directory
        );

        for file in expired {
            if dry_run {
                info!("[DRY RUN] Would delete {}", file.name);
                report.deleted += 1;
                report.deleted_files.push(file.name.clone());
                continue;
            }

            match self.storage.remove_file(&file.path) {
                Ok(()) => {
                    info!("Deleted old backup: {}", file.name);
                    report.deleted += 1;
                    report.deleted_files.push(file.name.clone());
                }
                Err(e) => {
                    error!("Failed to delete {:?}: {}", file.path, e);
                    report.errors.push(DeletionFailure {
                        file: file.path.clone(),
                        cause: FailureCause::from(&e),
                    });
                }
            }
        }

        info!(
            "Retention summary: {} kept, {} deleted, {} failed",
            report.kept,
            report.deleted,
            report.errors.len()
        );

        Ok(report)
    }
}
