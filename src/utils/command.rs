//! Utilities for running external commands

use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tracing::debug;

/// Run a command to completion and capture its output
///
/// A non-zero exit status is returned as part of the `Output`; only a
/// failure to launch the program is an error.
pub fn run_command(
    program: &str,
    args: &[String],
    envs: &[(String, String)],
    stdin_file: Option<&Path>,
) -> Result<Output> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    for (key, value) in envs {
        cmd.env(key, value);
    }

    match stdin_file {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {:?} for input", path))?;
            cmd.stdin(Stdio::from(file));
        }
        None => {
            cmd.stdin(Stdio::null());
        }
    }

    // Environment values may hold secrets, so only the names are logged
    debug!(
        "Running command: {} {} (env: {})",
        program,
        args.join(" "),
        envs.iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let output = cmd
        .output()
        .with_context(|| format!("Failed to execute {}", program))?;

    debug!("{} exited with {}", program, output.status);

    Ok(output)
}
