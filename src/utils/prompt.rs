//! Operator interaction for restore selection and confirmation
//!
//! Prompters return the raw response; parsing the selection and judging
//! the confirmation token is the orchestrator's job.

use anyhow::{Context, Result};
use dialoguer::Input;
use std::time::Duration;
use tracing::warn;

/// Source of operator answers
pub trait Prompter: Send + Sync {
    /// Show the numbered choices (newest first) and return the raw answer
    fn select(&self, items: &[String]) -> Result<String>;

    /// Ask for confirmation; `None` means no answer was given
    fn confirm(&self, prompt: &str) -> Result<Option<String>>;
}

/// Interactive terminal prompts
#[derive(Debug, Clone, Default)]
pub struct TerminalPrompter {
    confirm_timeout: Option<Duration>,
}

impl TerminalPrompter {
    pub fn new(confirm_timeout: Option<Duration>) -> Self {
        Self { confirm_timeout }
    }
}

fn read_line(prompt: String) -> Result<String> {
    Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .context("Failed to read answer from terminal")
}

impl Prompter for TerminalPrompter {
    fn select(&self, items: &[String]) -> Result<String> {
        eprintln!("Available backups (newest first):");
        for (i, item) in items.iter().enumerate() {
            eprintln!("  {:>3}) {}", i + 1, item);
        }
        eprintln!();
        read_line(format!("Select backup to restore [1-{}]", items.len()))
    }

    fn confirm(&self, prompt: &str) -> Result<Option<String>> {
        let prompt = prompt.to_string();
        match self.confirm_timeout {
            Some(timeout) => read_with_timeout(timeout, move || read_line(prompt)),
            None => read_line(prompt).map(Some),
        }
    }
}

/// Run a blocking `read`, giving up after `timeout`
///
/// Returns `None` on timeout. The blocked read cannot be cancelled, so the
/// runtime is shut down without waiting for it.
pub fn read_with_timeout<F>(timeout: Duration, read: F) -> Result<Option<String>>
where
    F: FnOnce() -> Result<String> + Send + 'static,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start confirmation timer")?;

    let answer: Result<Option<String>> = runtime.block_on(async {
        match tokio::time::timeout(timeout, tokio::task::spawn_blocking(read)).await {
            Ok(joined) => joined.context("Confirmation prompt panicked")?.map(Some),
            Err(_) => {
                warn!("No confirmation within {:?}, treating as decline", timeout);
                Ok(None)
            }
        }
    });

    runtime.shutdown_background();
    answer
}

/// Answers given up front (CLI flags), falling back to another prompter
pub struct PresetPrompter<P: Prompter> {
    selection: Option<String>,
    confirmation: Option<String>,
    fallback: P,
}

impl<P: Prompter> PresetPrompter<P> {
    pub fn new(selection: Option<String>, confirmation: Option<String>, fallback: P) -> Self {
        Self {
            selection,
            confirmation,
            fallback,
        }
    }
}

impl<P: Prompter> Prompter for PresetPrompter<P> {
    fn select(&self, items: &[String]) -> Result<String> {
        match self.selection {
            Some(ref answer) => Ok(answer.clone()),
            None => self.fallback.select(items),
        }
    }

    fn confirm(&self, prompt: &str) -> Result<Option<String>> {
        match self.confirmation {
            Some(ref answer) => Ok(Some(answer.clone())),
            None => self.fallback.confirm(prompt),
        }
    }
}

/// Scripted prompter for testing
/// Available for use in external test crates
#[allow(dead_code)]
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Replays fixed answers and records what was shown
    #[derive(Clone, Default)]
    pub struct ScriptedPrompter {
        selection: Option<String>,
        confirmation: Option<String>,
        /// Items passed to each `select` call
        pub shown: Arc<Mutex<Vec<Vec<String>>>>,
        /// Number of `confirm` calls
        pub confirm_calls: Arc<Mutex<usize>>,
    }

    impl ScriptedPrompter {
        pub fn new(selection: &str, confirmation: &str) -> Self {
            Self {
                selection: Some(selection.to_string()),
                confirmation: Some(confirmation.to_string()),
                ..Default::default()
            }
        }

        /// Confirmation never answered (e.g. timed out)
        pub fn unanswered(selection: &str) -> Self {
            Self {
                selection: Some(selection.to_string()),
                confirmation: None,
                ..Default::default()
            }
        }

        pub fn select_count(&self) -> usize {
            self.shown.lock().unwrap().len()
        }

        pub fn confirm_count(&self) -> usize {
            *self.confirm_calls.lock().unwrap()
        }
    }

    impl Prompter for ScriptedPrompter {
        fn select(&self, items: &[String]) -> Result<String> {
            self.shown.lock().unwrap().push(items.to_vec());
            self.selection
                .clone()
                .ok_or_else(|| anyhow::anyhow!("No scripted selection"))
        }

        fn confirm(&self, _prompt: &str) -> Result<Option<String>> {
            *self.confirm_calls.lock().unwrap() += 1;
            Ok(self.confirmation.clone())
        }
    }
}
