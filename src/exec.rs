//! Process execution behind the [`Executor`] seam.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Result of a command execution.
#[derive(Debug)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited successfully.
    pub success: bool,
}

impl ExecResult {
    /// Standard output followed by standard error.
    ///
    /// Many tools print their version banner on stderr, so probes look at
    /// both streams.
    #[must_use]
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
        }
    }
}

/// Process execution seam used by the condition predicates.
///
/// The real implementation is [`SystemExecutor`]; tests substitute a
/// scripted executor so predicate logic can run without spawning anything.
pub trait Executor: std::fmt::Debug {
    /// Resolve `program` on the search path.
    fn which(&self, program: &str) -> Option<PathBuf>;

    /// Run `program` with `args`, returning its output even on non-zero
    /// exit. Only a failure to spawn is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be started.
    fn run_unchecked(&self, program: &Path, args: &[&str]) -> Result<ExecResult>;
}

/// [`Executor`] backed by [`std::process::Command`] and the `which` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn which(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }

    fn run_unchecked(&self, program: &Path, args: &[&str]) -> Result<ExecResult> {
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("failed to execute: {}", program.display()))?;

        Ok(ExecResult::from(output))
    }
}
