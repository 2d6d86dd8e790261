//! Unit tests for dbdump-manager against real directories

mod config;
mod inventory;
mod retention;
