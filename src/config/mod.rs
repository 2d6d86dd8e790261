//! Configuration module for dbdump-manager
//!
//! This module handles loading and validating configuration from TOML files.
//! Every setting has a default, so the file itself is optional.
//!
//! ## Example Usage
//!
//! ```no_run
//! use dbdump_manager::config;
//!
//! let config = config::load_config("dbdump-manager.toml")?;
//! let directory = config::backup_directory(&config.global);
//! println!("Backups live in {}", directory.display());
//! # Ok::<(), config::ConfigError>(())
//! ```

mod loader;
mod types;

pub use loader::{load_config, validate_config, ConfigError, Result};
pub use types::*;

use crate::managers::retention::RetentionPolicy;
use crate::utils::inventory::NamingConvention;
use std::path::{Path, PathBuf};

/// Backup directory with `~` expanded
pub fn backup_directory(global: &GlobalConfig) -> PathBuf {
    expand_tilde(&global.backup_directory)
}

/// Naming convention dump files must follow
pub fn naming_convention(global: &GlobalConfig) -> NamingConvention {
    NamingConvention::new(&global.file_prefix, &global.file_suffix)
}

/// Retention policy from the configured keep count
pub fn retention_policy(global: &GlobalConfig) -> Result<RetentionPolicy> {
    RetentionPolicy::new(global.keep_count).map_err(|e| ConfigError::ValidationError(e.to_string()))
}

/// Directory for single-flight lock files
pub fn lock_directory(global: &GlobalConfig) -> PathBuf {
    global
        .lock_directory
        .as_deref()
        .map(expand_tilde)
        .unwrap_or_else(std::env::temp_dir)
}

/// Connection string from the config file, falling back to the environment
pub fn resolve_database_url(database: &DatabaseConfig) -> Option<String> {
    if let Some(ref url) = database.url {
        if !url.trim().is_empty() {
            return Some(url.trim().to_string());
        }
    }

    std::env::var(&database.url_env)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Expand tilde (~) in path
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}
