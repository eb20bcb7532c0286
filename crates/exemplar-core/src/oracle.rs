//! Validation oracles: the accept/reject gate in front of publication.
//!
//! A reconstructed unit is only published when the oracle accepts it. A
//! rejection is an ordinary outcome and carries diagnostic text; an `Err` means
//! the oracle itself could not run and the harvest should stop.

use std::path::Path;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, instrument};

use crate::{Dialect, Error, Result};

/// One reconstructed unit offered for validation.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Dialect of the candidate.
    pub dialect: Dialect,
    /// Output stem of the unit, used to name scratch files.
    pub stem: &'a str,
    /// Complete reconstructed source.
    pub content: &'a str,
}

impl Candidate<'_> {
    /// File name a compiler or linter would expect for this candidate.
    ///
    /// Dialects that rename their shared symbol need the file named after it
    /// (`Main.java`); the others use the output stem.
    pub fn scratch_file_name(&self) -> String {
        let rules = self.dialect.rules();
        if rules.shared_symbol_rename {
            format!("{}.{}", rules.rename_target, rules.extension)
        } else {
            format!("{}.{}", self.stem, rules.extension)
        }
    }
}

/// Result of validating one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The candidate may be published.
    Accept,
    /// The candidate is dropped.
    Reject {
        /// Compiler or linter output explaining the rejection.
        diagnostics: String,
    },
}

impl Verdict {
    /// True for [`Verdict::Accept`].
    pub const fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

/// Accept/reject gate applied to every reconstructed unit.
///
/// Implementations must be safe to call concurrently; the harvester runs up to
/// its concurrency limit of validations at once.
#[async_trait::async_trait]
pub trait ValidationOracle: Send + Sync {
    /// Accept or reject one candidate. `Err` is reserved for failures of the
    /// oracle itself, not of the candidate.
    async fn validate(&self, candidate: Candidate<'_>) -> Result<Verdict>;
}

/// Oracle that accepts everything. Used when no validation is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

#[async_trait::async_trait]
impl ValidationOracle for AcceptAll {
    async fn validate(&self, _candidate: Candidate<'_>) -> Result<Verdict> {
        Ok(Verdict::Accept)
    }
}

/// Oracle that runs an external program against a scratch copy of the unit.
///
/// In `args`, `{file}` is replaced with the scratch file path and `{dir}` with
/// the scratch directory, which is also the working directory. A zero exit
/// status accepts; anything else rejects with the program's output.
#[derive(Debug, Clone)]
pub struct CommandOracle {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandOracle {
    /// Oracle running `program` with `args`, without a time limit.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: None,
        }
    }

    /// Reject candidates whose check runs longer than `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Program run for every candidate.
    pub fn program(&self) -> &str {
        &self.program
    }

    fn expand_args(&self, file: &Path, dir: &Path) -> Vec<String> {
        let file = file.to_string_lossy();
        let dir = dir.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace("{file}", &file).replace("{dir}", &dir))
            .collect()
    }
}

#[async_trait::async_trait]
impl ValidationOracle for CommandOracle {
    #[instrument(skip(self, candidate), fields(program = %self.program, stem = candidate.stem))]
    async fn validate(&self, candidate: Candidate<'_>) -> Result<Verdict> {
        let scratch = tempfile::Builder::new()
            .prefix("exemplar-validate-")
            .tempdir()?;
        let file = scratch.path().join(candidate.scratch_file_name());
        tokio::fs::write(&file, candidate.content).await?;

        let mut command = Command::new(&self.program);
        command
            .args(self.expand_args(&file, scratch.path()))
            .current_dir(scratch.path())
            .kill_on_drop(true);

        let output = command.output();
        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, output).await {
                Ok(result) => result,
                Err(_) => {
                    return Ok(Verdict::Reject {
                        diagnostics: format!("validation timed out after {}s", limit.as_secs()),
                    });
                },
            },
            None => output.await,
        }
        .map_err(|e| Error::Validation(format!("failed to run {}: {e}", self.program)))?;

        if output.status.success() {
            debug!("candidate accepted");
            return Ok(Verdict::Accept);
        }

        let mut diagnostics = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.is_empty() {
            if !diagnostics.is_empty() && !diagnostics.ends_with('\n') {
                diagnostics.push('\n');
            }
            diagnostics.push_str(&stderr);
        }
        if diagnostics.trim().is_empty() {
            diagnostics = format!("{} exited with {}", self.program, output.status);
        }
        Ok(Verdict::Reject { diagnostics })
    }
}
