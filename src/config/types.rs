use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub restore: RestoreConfig,
}

/// Global configuration settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalConfig {
    /// Directory holding the dump files
    #[serde(default = "default_backup_directory")]
    pub backup_directory: PathBuf,

    /// Naming convention for dump files
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    #[serde(default = "default_file_suffix")]
    pub file_suffix: String,

    /// Number of most recent dumps to keep
    #[serde(default = "default_keep_count")]
    pub keep_count: usize,

    /// Where single-flight lock files live (defaults to the OS temp dir)
    #[serde(default)]
    pub lock_directory: Option<PathBuf>,

    /// Logging configuration
    #[serde(default)]
    pub log_directory: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_max_files")]
    pub log_max_files: usize,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            backup_directory: default_backup_directory(),
            file_prefix: default_file_prefix(),
            file_suffix: default_file_suffix(),
            keep_count: default_keep_count(),
            lock_directory: None,
            log_directory: None,
            log_level: default_log_level(),
            log_max_files: default_log_max_files(),
        }
    }
}

/// Database connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Connection string; takes precedence over `url_env`
    #[serde(default)]
    pub url: Option<String>,

    /// Environment variable consulted when `url` is not set
    #[serde(default = "default_url_env")]
    pub url_env: String,

    /// Override for the client binary (`psql` / `mysql` by default)
    #[serde(default)]
    pub client: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            url_env: default_url_env(),
            client: None,
        }
    }
}

/// Restore prompt settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RestoreConfig {
    /// The only answer accepted as consent
    #[serde(default = "default_confirm_token")]
    pub confirm_token: String,

    /// Seconds to wait for confirmation before treating it as a decline
    #[serde(default)]
    pub confirm_timeout_seconds: Option<u64>,
}

impl Default for RestoreConfig {
    fn default() -> Self {
        Self {
            confirm_token: default_confirm_token(),
            confirm_timeout_seconds: None,
        }
    }
}

// Default value functions
fn default_backup_directory() -> PathBuf {
    PathBuf::from("./backups")
}

fn default_file_prefix() -> String {
    "backup-".to_string()
}

fn default_file_suffix() -> String {
    ".sql".to_string()
}

fn default_keep_count() -> usize {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_max_files() -> usize {
    10
}

fn default_url_env() -> String {
    "DATABASE_URL".to_string()
}

fn default_confirm_token() -> String {
    "y".to_string()
}
