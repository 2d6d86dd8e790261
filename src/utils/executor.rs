//! Command execution abstraction for testability
//!
//! This module provides a trait-based abstraction for command execution,
//! enabling dependency injection and mocking for tests.

use anyhow::Result;
use std::path::Path;
use std::process::Output;

/// Abstraction for command execution, enabling mocking in tests
pub trait CommandExecutor: Send + Sync {
    /// Run a command to completion, optionally feeding a file on stdin
    fn run_command(
        &self,
        program: &str,
        args: &[String],
        envs: &[(String, String)],
        stdin_file: Option<&Path>,
    ) -> Result<Output>;
}

/// Default implementation using real subprocess calls
#[derive(Debug, Clone, Default)]
pub struct RealExecutor;

impl RealExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for RealExecutor {
    fn run_command(
        &self,
        program: &str,
        args: &[String],
        envs: &[(String, String)],
        stdin_file: Option<&Path>,
    ) -> Result<Output> {
        super::command::run_command(program, args, envs, stdin_file)
    }
}

/// A mock executor for testing that records calls and returns configured responses
/// Available for use in external test crates
#[allow(dead_code)]
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Recorded command invocation
    #[derive(Clone, Debug)]
    pub struct CommandCall {
        pub program: String,
        pub args: Vec<String>,
        pub envs: Vec<(String, String)>,
        pub stdin_file: Option<String>,
    }

    /// Response configuration for mock
    #[derive(Clone, Debug)]
    pub enum MockResponse {
        /// Process ran and exited with `exit_code`
        Exit {
            exit_code: i32,
            stdout: String,
            stderr: String,
        },
        /// Process could not be launched
        SpawnError(String),
    }

    impl MockResponse {
        pub fn success() -> Self {
            Self::Exit {
                exit_code: 0,
                stdout: String::new(),
                stderr: String::new(),
            }
        }
    }

    impl Default for MockResponse {
        fn default() -> Self {
            Self::success()
        }
    }

    /// Mock executor for testing
    #[derive(Clone, Default)]
    pub struct MockExecutor {
        /// Recorded command invocations
        pub calls: Arc<Mutex<Vec<CommandCall>>>,
        response: Arc<Mutex<MockResponse>>,
    }

    impl MockExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Set the response returned for every call
        pub fn with_response(self, response: MockResponse) -> Self {
            *self.response.lock().unwrap() = response;
            self
        }

        /// Get all recorded calls
        pub fn get_calls(&self) -> Vec<CommandCall> {
            self.calls.lock().unwrap().clone()
        }

        /// Get number of calls to a specific program
        pub fn call_count(&self, program: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.program == program)
                .count()
        }
    }

    #[cfg(unix)]
    fn exit_status(code: i32) -> std::process::ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code << 8)
    }

    #[cfg(windows)]
    fn exit_status(code: i32) -> std::process::ExitStatus {
        use std::os::windows::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code as u32)
    }

    impl CommandExecutor for MockExecutor {
        fn run_command(
            &self,
            program: &str,
            args: &[String],
            envs: &[(String, String)],
            stdin_file: Option<&Path>,
        ) -> Result<Output> {
            self.calls.lock().unwrap().push(CommandCall {
                program: program.to_string(),
                args: args.to_vec(),
                envs: envs.to_vec(),
                stdin_file: stdin_file.map(|p| p.display().to_string()),
            });

            match self.response.lock().unwrap().clone() {
                MockResponse::Exit {
                    exit_code,
                    stdout,
                    stderr,
                } => Ok(Output {
                    status: exit_status(exit_code),
                    stdout: stdout.into_bytes(),
                    stderr: stderr.into_bytes(),
                }),
                MockResponse::SpawnError(message) => {
                    anyhow::bail!("Failed to execute {}: {}", program, message)
                }
            }
        }
    }
}
