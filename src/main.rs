use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dbdump_manager::config::{self, Config};
use dbdump_manager::managers::logging::{init_logging, LoggingConfig};
use dbdump_manager::managers::restore::{
    RestoreOrchestrator, RestoreReport, RestoreSettings, RestoreStatus,
};
use dbdump_manager::managers::retention::{RetentionEnforcer, RetentionPolicy, RetentionReport};
use dbdump_manager::utils::connection::RestoreTarget;
use dbdump_manager::utils::inventory::{format_size, list_backups};
use dbdump_manager::utils::locker::DirectoryLock;
use dbdump_manager::utils::{FsStorage, PresetPrompter, RealRestoreOps, TerminalPrompter};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "dbdump-manager")]
#[command(about = "Retention and safety-gated restore for database dump files", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backup directory (overrides the configuration file)
    #[arg(short, long)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available backups, newest first
    List {
        /// Print the inventory as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show backup count, size and age of the newest backup
    Status,

    /// Delete backups beyond the keep count
    Prune {
        /// Number of newest backups to keep (overrides keep_count)
        #[arg(short, long)]
        keep: Option<usize>,

        /// Show what would be deleted without deleting
        #[arg(long)]
        dry_run: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Restore the database from a backup
    Restore {
        /// 1-based backup number to restore (prompted if not specified)
        #[arg(long)]
        select: Option<String>,

        /// Confirmation answer (prompted if not specified)
        #[arg(long)]
        confirm: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration and restore prerequisites
    Validate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => config::load_config(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?,
        None => {
            let config = Config::default();
            config::validate_config(&config)?;
            config
        }
    };
    if let Some(dir) = cli.dir {
        config.global.backup_directory = dir;
    }

    // Must stay alive until exit so buffered file logs are flushed
    let log_guard = init_logging(&LoggingConfig::from_config(&config.global))?;

    let command = cli.command.unwrap_or(Commands::Status);
    let exit_code = match command {
        Commands::List { json } => handle_list(&config, json)?,
        Commands::Status => handle_status(&config)?,
        Commands::Prune { keep, dry_run, json } => handle_prune(&config, keep, dry_run, json)?,
        Commands::Restore {
            select,
            confirm,
            json,
        } => handle_restore(&config, select, confirm, json)?,
        Commands::Validate => handle_validate(&config)?,
    };

    drop(log_guard);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}

/// Handle list command
fn handle_list(config: &Config, json: bool) -> Result<i32> {
    let directory = config::backup_directory(&config.global);
    let naming = config::naming_convention(&config.global);
    let inventory = list_backups(&FsStorage::new(), &directory, &naming)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&inventory)?);
        return Ok(0);
    }

    println!("=== Backups in {} ===\n", directory.display());
    if inventory.is_empty() {
        println!("  No backups found.");
        return Ok(0);
    }

    println!("  {:<4} {:<40} {:<20} {:>10}", "#", "Name", "Modified", "Size");
    println!("  {}", "-".repeat(77));
    for (i, file) in inventory.files().iter().enumerate() {
        println!(
            "  {:<4} {:<40} {:<20} {:>10}",
            i + 1,
            file.name,
            file.modified_utc()
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S"),
            format_size(file.size_bytes)
        );
    }
    println!(
        "\n  Total: {} backups, {}",
        inventory.len(),
        format_size(inventory.total_size())
    );

    Ok(0)
}

/// Handle status command
fn handle_status(config: &Config) -> Result<i32> {
    let directory = config::backup_directory(&config.global);
    let naming = config::naming_convention(&config.global);

    println!("=== Backup Status ===\n");
    println!("Directory: {}", directory.display());
    println!("Keep count: {}", config.global.keep_count);

    if !directory.exists() {
        println!("Health: ✗ Backup directory does not exist");
        return Ok(0);
    }

    let inventory = list_backups(&FsStorage::new(), &directory, &naming)?;
    println!("Backups: {}", inventory.len());
    println!("Total size: {}", format_size(inventory.total_size()));

    let Some(newest) = inventory.newest() else {
        println!("Health: ✗ No backups found");
        return Ok(0);
    };

    let age = chrono::Utc::now().signed_duration_since(newest.modified_utc());
    let hours = age.num_hours();
    println!("Latest: {}", newest.name);
    println!("Age: {} hours ago", hours);

    let health = if hours < 24 {
        "✓ Healthy (recent backup)"
    } else if hours < 48 {
        "⚠ Warning (backup is 1-2 days old)"
    } else {
        "✗ Critical (backup is over 2 days old)"
    };
    println!("Health: {}", health);

    if inventory.len() > config.global.keep_count {
        println!(
            "\n{} backup(s) beyond the keep count; run 'dbdump-manager prune'",
            inventory.len() - config.global.keep_count
        );
    }

    Ok(0)
}

/// Handle prune command
fn handle_prune(config: &Config, keep: Option<usize>, dry_run: bool, json: bool) -> Result<i32> {
    let directory = config::backup_directory(&config.global);
    let policy = match keep {
        Some(count) => RetentionPolicy::new(count)?,
        None => config::retention_policy(&config.global)?,
    };

    let _lock = DirectoryLock::acquire(&config::lock_directory(&config.global), &directory)?;

    let enforcer = RetentionEnforcer::new(
        Arc::new(FsStorage::new()),
        directory.clone(),
        config::naming_convention(&config.global),
    );
    let report = if dry_run {
        enforcer.plan(policy)?
    } else {
        enforcer.enforce(policy)?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_retention_report(&report, policy);
    }

    Ok(if report.is_clean() { 0 } else { 1 })
}

fn print_retention_report(report: &RetentionReport, policy: RetentionPolicy) {
    if report.dry_run {
        println!("DRY RUN MODE - No files will be deleted\n");
    }
    println!(
        "=== Retention: keep {} newest in {} ===\n",
        policy.keep_count(),
        report.directory.display()
    );

    if report.kept == 0 && report.deleted == 0 && report.errors.is_empty() {
        println!("No backups found.");
        return;
    }

    for name in &report.kept_files {
        println!("  keep    {}", name);
    }
    for name in &report.deleted_files {
        if report.dry_run {
            println!("  would delete  {}", name);
        } else {
            println!("  deleted {}", name);
        }
    }
    for failure in &report.errors {
        eprintln!("  ✗ failed  {}: {}", failure.file.display(), failure.cause);
    }

    println!(
        "\nKept: {}, Deleted: {}, Errors: {}",
        report.kept,
        report.deleted,
        report.errors.len()
    );
}

/// Handle restore command
fn handle_restore(
    config: &Config,
    select: Option<String>,
    confirm: Option<String>,
    json: bool,
) -> Result<i32> {
    let directory = config::backup_directory(&config.global);

    // Retention must not delete the dump while it is being restored
    let _lock = DirectoryLock::acquire(&config::lock_directory(&config.global), &directory)?;

    let timeout = config.restore.confirm_timeout_seconds.map(Duration::from_secs);
    let prompter = PresetPrompter::new(select, confirm, TerminalPrompter::new(timeout));

    let orchestrator = RestoreOrchestrator::new(
        Arc::new(FsStorage::new()),
        Arc::new(RealRestoreOps::new(config.database.client.clone())),
        Arc::new(prompter),
        RestoreSettings {
            directory,
            naming: config::naming_convention(&config.global),
            connection_string: config::resolve_database_url(&config.database),
            confirm_token: config.restore.confirm_token.clone(),
        },
    );

    let report = orchestrator.run();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_restore_report(&report);
    }

    Ok(report.status.exit_code())
}

fn print_restore_report(report: &RestoreReport) {
    if let Some(ref file) = report.selected {
        println!("Selected backup: {}", file.name);
    }

    match report.status {
        RestoreStatus::Done => {
            println!("\n✓ Restore completed successfully!");
            if let Some(ref diagnostics) = report.diagnostics {
                println!("Warnings reported by the restore tool:\n{}", diagnostics);
            }
        }
        RestoreStatus::Cancelled => {
            println!("Restore cancelled.");
        }
        RestoreStatus::Failed => {
            eprintln!(
                "\n✗ Restore failed: {}",
                report.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}

/// Handle validate command
fn handle_validate(config: &Config) -> Result<i32> {
    let mut problems = 0;
    let directory = config::backup_directory(&config.global);

    println!("Configuration is valid!");
    println!("Backup directory: {}", directory.display());
    if directory.is_dir() {
        let inventory = list_backups(
            &FsStorage::new(),
            &directory,
            &config::naming_convention(&config.global),
        )?;
        println!("  ✓ exists ({} backups)", inventory.len());
    } else {
        println!("  ⚠ does not exist");
    }
    println!(
        "Naming: {}*{}",
        config.global.file_prefix, config.global.file_suffix
    );
    println!("Keep count: {}", config.global.keep_count);

    match config::resolve_database_url(&config.database).as_deref().map(RestoreTarget::parse) {
        None => {
            eprintln!(
                "  ✗ No connection string (set database.url or ${})",
                config.database.url_env
            );
            problems += 1;
        }
        Some(Err(e)) => {
            eprintln!("  ✗ Invalid connection string: {}", e);
            problems += 1;
        }
        Some(Ok(target)) => {
            println!("Database: {}", target.redacted());
            let client =
                RealRestoreOps::new(config.database.client.clone()).client_for(target.engine);
            match which::which(&client) {
                Ok(path) => println!("  ✓ restore client: {}", path.display()),
                Err(_) => {
                    eprintln!("  ✗ restore client '{}' not found in PATH", client);
                    problems += 1;
                }
            }
        }
    }

    Ok(if problems == 0 { 0 } else { 1 })
}
