//! Command tests for dbdump-manager
//!
//! These tests drive prune and restore end to end with a mocked restore
//! tool and scripted prompts.

mod prune;
mod restore;
