pub mod command;
pub mod connection;
pub mod inventory;
pub mod locker;
pub mod prompt;
pub mod storage;

// Trait-based abstractions for testability
pub mod executor;
pub mod restore_ops;

// Re-export commonly used types and traits (used by test crate)
pub use executor::{CommandExecutor, RealExecutor};
pub use prompt::{PresetPrompter, Prompter, TerminalPrompter};
pub use restore_ops::{RealRestoreOps, RestoreRunner};
pub use storage::{BackupStorage, FsStorage};
