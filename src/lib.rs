//! dbdump-manager library
//!
//! Retention and safety-gated restore for a directory of database dumps.

pub mod config;
pub mod error;
pub mod managers;
pub mod utils;

// Re-export commonly used types
pub use config::{load_config, Config};
pub use error::{FailureCause, LifecycleError};
pub use managers::logging::{init_logging, LogGuard, LoggingConfig};
pub use managers::restore::{RestoreOrchestrator, RestoreReport, RestoreSettings, RestoreStatus};
pub use managers::retention::{RetentionEnforcer, RetentionPolicy, RetentionReport};
pub use utils::inventory::{list_backups, BackupFile, BackupInventory, NamingConvention};
