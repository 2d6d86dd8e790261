//! External restore procedure
//!
//! Builds the `psql` / `mysql` invocation for a dump and reports the
//! client's exit status and diagnostics. Classifying the outcome is left
//! to the restore orchestrator.

use super::connection::{DatabaseEngine, RestoreTarget};
use super::executor::{CommandExecutor, RealExecutor};
use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// What the external client reported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoreInvocation {
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub success: bool,
    pub diagnostics: String,
}

/// Abstraction over the external restore tool, enabling mocking in tests
#[cfg_attr(test, mockall::automock)]
pub trait RestoreRunner: Send + Sync {
    /// Restore `file` into `target`, blocking until the client exits
    ///
    /// An `Err` means the client could not be launched at all.
    fn run(&self, file: &Path, target: &RestoreTarget) -> Result<RestoreInvocation>;
}

/// Fully prepared client command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCommand {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
    /// Dump fed on stdin (mysql) instead of passed as an argument (psql)
    pub stdin_from_file: bool,
}

/// Build the client invocation for `target`
///
/// Secrets travel in the environment, never on the command line.
pub fn build_client_command(
    file: &Path,
    target: &RestoreTarget,
    client_override: Option<&str>,
) -> ClientCommand {
    let program = client_override
        .unwrap_or(target.engine.default_client())
        .to_string();

    match target.engine {
        DatabaseEngine::Postgres => {
            let mut envs = Vec::new();
            if let Some(ref password) = target.password {
                envs.push(("PGPASSWORD".to_string(), password.clone()));
            }
            ClientCommand {
                program,
                args: vec![
                    "-h".to_string(),
                    target.host.clone(),
                    "-p".to_string(),
                    target.port.to_string(),
                    "-U".to_string(),
                    target.user.clone(),
                    "-d".to_string(),
                    target.database.clone(),
                    "-w".to_string(),
                    "-v".to_string(),
                    "ON_ERROR_STOP=1".to_string(),
                    "-f".to_string(),
                    file.display().to_string(),
                ],
                envs,
                stdin_from_file: false,
            }
        }
        DatabaseEngine::Mysql => {
            let mut envs = Vec::new();
            if let Some(ref password) = target.password {
                envs.push(("MYSQL_PWD".to_string(), password.clone()));
            }
            ClientCommand {
                program,
                args: vec![
                    "-h".to_string(),
                    target.host.clone(),
                    "-P".to_string(),
                    target.port.to_string(),
                    "-u".to_string(),
                    target.user.clone(),
                    target.database.clone(),
                ],
                envs,
                stdin_from_file: true,
            }
        }
    }
}

/// Default implementation shelling out to the database client
#[derive(Clone)]
pub struct RealRestoreOps {
    executor: Arc<dyn CommandExecutor>,
    client_override: Option<String>,
}

impl RealRestoreOps {
    pub fn new(client_override: Option<String>) -> Self {
        Self::with_executor(Arc::new(RealExecutor::new()), client_override)
    }

    pub fn with_executor(
        executor: Arc<dyn CommandExecutor>,
        client_override: Option<String>,
    ) -> Self {
        Self {
            executor,
            client_override,
        }
    }

    /// Binary that will be invoked for `engine`
    pub fn client_for(&self, engine: DatabaseEngine) -> String {
        self.client_override
            .clone()
            .unwrap_or_else(|| engine.default_client().to_string())
    }
}

impl RestoreRunner for RealRestoreOps {
    fn run(&self, file: &Path, target: &RestoreTarget) -> Result<RestoreInvocation> {
        let command = build_client_command(file, target, self.client_override.as_deref());

        info!(
            "Restoring {:?} into {} using {}",
            file,
            target.redacted(),
            command.program
        );

        let stdin_file = command.stdin_from_file.then_some(file);
        let output =
            self.executor
                .run_command(&command.program, &command.args, &command.envs, stdin_file)?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            debug!("{} output: {}", command.program, stdout.trim());
        }

        Ok(RestoreInvocation {
            exit_code: output.status.code(),
            success: output.status.success(),
            diagnostics: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}
