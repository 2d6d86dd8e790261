//! Restore orchestrator - selection, confirmation gate, external restore
//!
//! ```text
//! Selecting -> Confirming -> Restoring -> Done
//!     |            |            |
//!     v            v            v
//!   Failed     Cancelled      Failed
//! ```
//!
//! Nothing destructive happens before `Restoring`, and `Restoring` is only
//! reached with a valid selection and the exact confirmation token.

use crate::error::LifecycleError;
use crate::utils::connection::RestoreTarget;
use crate::utils::inventory::{
    format_size, list_backups, BackupFile, BackupInventory, NamingConvention,
};
use crate::utils::prompt::Prompter;
use crate::utils::restore_ops::RestoreRunner;
use crate::utils::storage::BackupStorage;
use chrono::Local;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Everything a restore needs besides its collaborators
#[derive(Clone)]
pub struct RestoreSettings {
    pub directory: PathBuf,
    pub naming: NamingConvention,
    /// Raw connection string; parsed only once backups are known to exist
    pub connection_string: Option<String>,
    pub confirm_token: String,
}

impl fmt::Debug for RestoreSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let connection = self.connection_string.as_deref().map(|raw| {
            RestoreTarget::parse(raw)
                .map(|target| target.redacted())
                .unwrap_or_else(|_| "<unparsable>".to_string())
        });
        f.debug_struct("RestoreSettings")
            .field("directory", &self.directory)
            .field("naming", &self.naming)
            .field("connection_string", &connection)
            .field("confirm_token", &self.confirm_token)
            .finish()
    }
}

/// Terminal outcome of a restore attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestoreStatus {
    Done,
    Failed,
    Cancelled,
}

impl RestoreStatus {
    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Done => 0,
            Self::Failed => 1,
            Self::Cancelled => 2,
        }
    }
}

/// Operator-facing summary of a restore attempt
#[derive(Debug, Serialize)]
pub struct RestoreReport {
    pub directory: PathBuf,
    pub selected: Option<BackupFile>,
    pub confirmed: bool,
    pub status: RestoreStatus,
    pub error: Option<String>,
    pub exit_code: Option<i32>,
    pub diagnostics: Option<String>,
    #[serde(skip)]
    pub failure: Option<LifecycleError>,
}

impl RestoreReport {
    fn new(directory: PathBuf) -> Self {
        Self {
            directory,
            selected: None,
            confirmed: false,
            status: RestoreStatus::Failed,
            error: None,
            exit_code: None,
            diagnostics: None,
            failure: None,
        }
    }
}

enum RestoreState {
    Selecting {
        inventory: BackupInventory,
        target: RestoreTarget,
    },
    Confirming {
        file: BackupFile,
        target: RestoreTarget,
    },
    Restoring {
        file: BackupFile,
        target: RestoreTarget,
    },
    Done,
    Failed(LifecycleError),
    Cancelled,
}

impl RestoreState {
    fn name(&self) -> &'static str {
        match self {
            Self::Selecting { .. } => "selecting",
            Self::Confirming { .. } => "confirming",
            Self::Restoring { .. } => "restoring",
            Self::Done => "done",
            Self::Failed(_) => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Parse a 1-based selection against `available` backups
pub fn parse_selection(input: &str, available: usize) -> Result<usize, LifecycleError> {
    let invalid = || LifecycleError::InvalidSelection {
        input: input.trim().to_string(),
        available,
    };
    let index: usize = input.trim().parse().map_err(|_| invalid())?;
    if index == 0 || index > available {
        return Err(invalid());
    }
    Ok(index)
}

pub struct RestoreOrchestrator {
    storage: Arc<dyn BackupStorage>,
    runner: Arc<dyn RestoreRunner>,
    prompter: Arc<dyn Prompter>,
    settings: RestoreSettings,
}

impl RestoreOrchestrator {
    pub fn new(
        storage: Arc<dyn BackupStorage>,
        runner: Arc<dyn RestoreRunner>,
        prompter: Arc<dyn Prompter>,
        settings: RestoreSettings,
    ) -> Self {
        Self {
            storage,
            runner,
            prompter,
            settings,
        }
    }

    /// Drive one restore attempt to a terminal state
    pub fn run(&self) -> RestoreReport {
        let mut report = RestoreReport::new(self.settings.directory.clone());
        let mut state = self.prepare();

        loop {
            debug!("Restore state: {}", state.name());
            state = match state {
                RestoreState::Selecting { inventory, target } => self.select(&inventory, target),
                RestoreState::Confirming { file, target } => {
                    report.selected = Some(file.clone());
                    self.confirm(file, target)
                }
                RestoreState::Restoring { file, target } => {
                    report.confirmed = true;
                    self.restore(&file, &target, &mut report)
                }
                RestoreState::Done => {
                    report.status = RestoreStatus::Done;
                    break;
                }
                RestoreState::Cancelled => {
                    report.status = RestoreStatus::Cancelled;
                    break;
                }
                RestoreState::Failed(e) => {
                    error!("Restore failed: {}", e);
                    report.status = RestoreStatus::Failed;
                    report.error = Some(e.to_string());
                    report.failure = Some(e);
                    break;
                }
            };
        }

        report
    }

    /// Inventory first, then the connection target, before any prompt
    fn prepare(&self) -> RestoreState {
        let inventory = match list_backups(
            self.storage.as_ref(),
            &self.settings.directory,
            &self.settings.naming,
        ) {
            Ok(inventory) => inventory,
            Err(e) => return RestoreState::Failed(e),
        };

        if inventory.is_empty() {
            return RestoreState::Failed(LifecycleError::NotFound(format!(
                "no backups in {}",
                self.settings.directory.display()
            )));
        }

        let connection_string = self.settings.connection_string.as_deref().unwrap_or("");
        match RestoreTarget::parse(connection_string) {
            Ok(target) => RestoreState::Selecting { inventory, target },
            Err(e) => RestoreState::Failed(LifecycleError::ConfigurationMissing(e.to_string())),
        }
    }

    fn select(&self, inventory: &BackupInventory, target: RestoreTarget) -> RestoreState {
        let labels: Vec<String> = inventory
            .files()
            .iter()
            .map(|f| {
                format!(
                    "{}  ({}, {})",
                    f.name,
                    f.modified_utc().with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
                    format_size(f.size_bytes)
                )
            })
            .collect();

        let answer = match self.prompter.select(&labels) {
            Ok(answer) => answer,
            Err(e) => return RestoreState::Failed(LifecycleError::PromptFailed(format!("{:#}", e))),
        };

        match parse_selection(&answer, inventory.len()) {
            Ok(index) => match inventory.get_one_based(index) {
                Some(file) => {
                    info!("Selected backup #{}: {}", index, file.name);
                    RestoreState::Confirming {
                        file: file.clone(),
                        target,
                    }
                }
                None => RestoreState::Failed(LifecycleError::InvalidSelection {
                    input: answer,
                    available: inventory.len(),
                }),
            },
            Err(e) => RestoreState::Failed(e),
        }
    }

    fn confirm(&self, file: BackupFile, target: RestoreTarget) -> RestoreState {
        let prompt = format!(
            "Restore {} into {}? This overwrites the live database. Type '{}' to proceed",
            file.name,
            target.redacted(),
            self.settings.confirm_token
        );

        match self.prompter.confirm(&prompt) {
            Ok(Some(answer)) if answer.trim() == self.settings.confirm_token => {
                info!("Restore of {} confirmed", file.name);
                RestoreState::Restoring { file, target }
            }
            Ok(Some(_)) => {
                info!("Restore declined by operator");
                RestoreState::Cancelled
            }
            Ok(None) => {
                info!("No confirmation given, restore cancelled");
                RestoreState::Cancelled
            }
            Err(e) => {
                warn!("Could not read confirmation, treating as decline: {:#}", e);
                RestoreState::Cancelled
            }
        }
    }

    fn restore(
        &self,
        file: &BackupFile,
        target: &RestoreTarget,
        report: &mut RestoreReport,
    ) -> RestoreState {
        if !self.storage.exists(&file.path) {
            return RestoreState::Failed(LifecycleError::NotFound(
                file.path.display().to_string(),
            ));
        }

        info!("Starting restore of {} into {}", file.name, target.redacted());

        // Runs to completion; there is no safe point to cancel into
        let invocation = match self.runner.run(&file.path, target) {
            Ok(invocation) => invocation,
            Err(e) => {
                return RestoreState::Failed(LifecycleError::ExternalToolFailure {
                    status: "failed to launch".to_string(),
                    diagnostics: format!("{:#}", e),
                })
            }
        };

        report.exit_code = invocation.exit_code;
        if !invocation.diagnostics.is_empty() {
            report.diagnostics = Some(invocation.diagnostics.clone());
        }

        if invocation.success {
            if !invocation.diagnostics.is_empty() {
                warn!("Restore tool reported warnings:\n{}", invocation.diagnostics);
            }
            info!("Restore of {} completed successfully", file.name);
            return RestoreState::Done;
        }

        let status = match invocation.exit_code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        };
        RestoreState::Failed(LifecycleError::ExternalToolFailure {
            status,
            diagnostics: invocation.diagnostics,
        })
    }
}
