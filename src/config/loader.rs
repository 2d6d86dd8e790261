use super::types::*;
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Load and validate configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate the configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.global.keep_count == 0 {
        return Err(ConfigError::ValidationError(
            "keep_count must be at least 1 (a policy of zero would delete every backup)"
                .to_string(),
        ));
    }

    if config.global.file_prefix.is_empty() && config.global.file_suffix.is_empty() {
        return Err(ConfigError::ValidationError(
            "file_prefix and file_suffix cannot both be empty".to_string(),
        ));
    }

    if config.restore.confirm_token.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "restore.confirm_token cannot be empty".to_string(),
        ));
    }

    if config.database.url_env.is_empty() && config.database.url.is_none() {
        return Err(ConfigError::ValidationError(
            "database.url_env cannot be empty when database.url is not set".to_string(),
        ));
    }

    Ok(())
}
