//! Logging manager with file rotation
//!
//! Provides dual-output logging:
//! - Console: stderr, concise format (stdout is reserved for reports)
//! - File: optional, daily rotation with a cap on retained files

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::{expand_tilde, GlobalConfig};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory for log files; console only when unset
    pub log_directory: Option<PathBuf>,
    /// Log level for file output (console uses INFO when a file is written)
    pub log_level: Level,
    /// Maximum number of rotated log files to keep
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_directory: None,
            log_level: Level::INFO,
            max_files: 10,
        }
    }
}

impl LoggingConfig {
    /// Create from global config values
    pub fn from_config(global: &GlobalConfig) -> Self {
        Self {
            log_directory: global.log_directory.as_deref().map(expand_tilde),
            log_level: parse_level(&global.log_level),
            max_files: global.log_max_files.max(1),
        }
    }
}

fn parse_level(log_level: &str) -> Level {
    match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Initialize logging with console and optional file outputs
///
/// Returns a guard that must be kept alive for the duration of the program.
/// When the guard is dropped, any remaining logs are flushed to disk.
pub fn init_logging(config: &LoggingConfig) -> Result<LogGuard> {
    let Some(ref log_dir) = config.log_directory else {
        let console_layer = console_layer().with_filter(level_filter(config.log_level));
        tracing_subscriber::registry().with(console_layer).init();
        return Ok(LogGuard { _file_guard: None });
    };

    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {:?}", log_dir))?;

    // Rotated daily; the appender prunes files beyond `max_files`
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("dbdump-manager")
        .filename_suffix("log")
        .max_log_files(config.max_files)
        .build(log_dir)
        .context("Failed to create log file appender")?;

    let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);

    // File layer: configured level, detailed format
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE)
        .with_filter(level_filter(config.log_level));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer().with_filter(level_filter(Level::INFO)))
        .init();

    Ok(LogGuard {
        _file_guard: Some(file_guard),
    })
}

fn console_layer<S>() -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE)
}

/// Create a level filter for tracing layers
fn level_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,dbdump_manager={}", level)))
}

/// Guard that keeps the logging system alive
///
/// When dropped, flushes any remaining logs to disk.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}
