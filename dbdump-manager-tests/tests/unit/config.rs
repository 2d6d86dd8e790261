//! Unit tests for configuration loading and validation

use dbdump_manager::config::{
    backup_directory, load_config, naming_convention, retention_policy, ConfigError,
};
use test_utils::{config_toml, TestContext};

#[test]
fn test_config_loading_valid() {
    let ctx = TestContext::new();
    let path = ctx.create_file("config.toml", &config_toml(&ctx.backup_dir(), 3));

    let config = load_config(&path).expect("Config should load successfully");

    assert_eq!(backup_directory(&config.global), ctx.backup_dir());
    assert_eq!(retention_policy(&config.global).unwrap().keep_count(), 3);
    assert!(naming_convention(&config.global).matches("backup-2024.sql"));
    assert_eq!(
        config.database.url.as_deref(),
        Some(test_utils::postgres_url())
    );
}

#[test]
fn test_config_rejects_zero_keep_count() {
    let ctx = TestContext::new();
    let path = ctx.create_file("config.toml", &config_toml(&ctx.backup_dir(), 0));

    assert!(matches!(
        load_config(&path),
        Err(ConfigError::ValidationError(_))
    ));
}

#[test]
fn test_config_rejects_empty_confirm_token() {
    let ctx = TestContext::new();
    let path = ctx.create_file("config.toml", "[restore]\nconfirm_token = \"  \"\n");

    assert!(load_config(&path).is_err());
}

#[test]
fn test_config_missing_file() {
    let ctx = TestContext::new();
    let result = load_config(ctx.temp_dir().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::ReadError(_))));
}

#[test]
fn test_config_round_trips_through_toml() {
    let ctx = TestContext::new();
    let mut config = test_utils::Config::default();
    config.global.keep_count = 9;
    config.restore.confirm_timeout_seconds = Some(30);

    let path = ctx.create_file("config.toml", &toml::to_string_pretty(&config).unwrap());
    let loaded = load_config(&path).unwrap();

    assert_eq!(loaded.global.keep_count, 9);
    assert_eq!(loaded.restore.confirm_timeout_seconds, Some(30));
}
