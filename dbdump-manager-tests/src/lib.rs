//! Test utilities for dbdump-manager
//!
//! This crate provides shared test utilities, fixtures and re-exported
//! mock implementations for testing the dbdump-manager components.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_utils::TestContext;
//!
//! #[test]
//! fn my_test() {
//!     let ctx = TestContext::new();
//!     ctx.create_backup("backup-1.sql", 3600);
//!     // ... test code
//! }
//! ```

pub mod fixtures;
pub mod test_context;

// Re-export commonly used items
pub use fixtures::*;
pub use test_context::TestContext;

// Re-export types from the main crate for convenience
pub use dbdump_manager::config::{Config, DatabaseConfig, GlobalConfig, RestoreConfig};
pub use dbdump_manager::managers::restore::{
    RestoreOrchestrator, RestoreReport, RestoreSettings, RestoreStatus,
};
pub use dbdump_manager::managers::retention::{RetentionEnforcer, RetentionPolicy, RetentionReport};
pub use dbdump_manager::utils::inventory::{list_backups, BackupInventory, NamingConvention};
pub use dbdump_manager::LifecycleError;

// Re-export mock implementations from the main crate
pub use dbdump_manager::utils::executor::mock::{MockExecutor, MockResponse};
pub use dbdump_manager::utils::prompt::mock::ScriptedPrompter;
pub use dbdump_manager::utils::storage::mock::MockStorage;
pub use dbdump_manager::utils::{BackupStorage, FsStorage, RealRestoreOps};

/// Common test result type
pub type TestResult<T = ()> = anyhow::Result<T>;
