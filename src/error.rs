//! Error taxonomy shared by the retention and restore paths

use serde::Serialize;
use std::io;
use std::path::PathBuf;

/// Errors that abort a single lifecycle operation
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {path:?}")]
    PermissionDenied { path: PathBuf },

    #[error("I/O failure on {path:?}: {source}")]
    IoFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid selection '{input}': expected a number between 1 and {available}")]
    InvalidSelection { input: String, available: usize },

    #[error("External restore tool failed ({status}):\n{diagnostics}")]
    ExternalToolFailure { status: String, diagnostics: String },

    #[error("Connection configuration missing or malformed: {0}")]
    ConfigurationMissing(String),

    #[error("Failed to read operator input: {0}")]
    PromptFailed(String),
}

impl LifecycleError {
    /// Classify an I/O error raised while touching `path`
    pub fn from_io(path: impl Into<PathBuf>, error: io::Error) -> Self {
        let path = path.into();
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.display().to_string()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::IoFailure {
                path,
                source: error,
            },
        }
    }
}

/// Why a single file could not be deleted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum FailureCause {
    NotFound,
    PermissionDenied,
    Io(String),
}

impl From<&io::Error> for FailureCause {
    fn from(error: &io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            _ => Self::Io(error.to_string()),
        }
    }
}

impl std::fmt::Display for FailureCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "file not found"),
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::Io(message) => write!(f, "{}", message),
        }
    }
}
