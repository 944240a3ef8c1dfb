//! Core types for provisioning steps

use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::Output;

/// How commands obtain the privileges they need
///
/// Decided once at startup and held by the [`CommandExecutor`](crate::CommandExecutor)
/// for the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Privilege {
    /// Already running as root; commands run as-is
    Elevated,
    /// Every command is prefixed with an escalation wrapper (e.g. `sudo`)
    Escalate { wrapper: String },
}

impl Privilege {
    /// Escalate through `sudo`
    pub fn sudo() -> Self {
        Self::Escalate {
            wrapper: "sudo".to_string(),
        }
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Elevated => write!(f, "root"),
            Self::Escalate { wrapper } => write!(f, "via {wrapper}"),
        }
    }
}

/// Current state of a step, as reported by its idempotency probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepState {
    /// Effect is already in place; the step will be skipped
    Satisfied { reason: String },
    /// Step needs to run
    Pending,
}

impl StepState {
    /// Check if the step is already satisfied
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied { .. })
    }
}

/// Result of running a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepResult {
    /// The step changed the host
    Applied { detail: Option<String> },
    /// Already satisfied, nothing done
    Skipped { reason: String },
    /// Soft condition; the step did nothing but the pipeline continues
    Warned { reason: String },
    /// Dry run: the step would have run
    Planned,
}

impl StepResult {
    /// Applied without extra detail
    pub fn applied() -> Self {
        Self::Applied { detail: None }
    }

    /// Check if the result represents a change to the host
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Summary of a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub applied: usize,
    pub skipped: usize,
    pub warned: usize,
    pub planned: usize,
}

impl ExecuteSummary {
    /// Total number of steps processed
    pub fn total(&self) -> usize {
        self.applied + self.skipped + self.warned + self.planned
    }

    /// Add a result to the summary
    pub fn add_result(&mut self, result: &StepResult) {
        match result {
            StepResult::Applied { .. } => self.applied += 1,
            StepResult::Skipped { .. } => self.skipped += 1,
            StepResult::Warned { .. } => self.warned += 1,
            StepResult::Planned => self.planned += 1,
        }
    }
}

/// Output from a finished command
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub success: bool,
    /// Exit code, if the process exited normally
    pub code: Option<i32>,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: output.stdout,
            stderr: output.stderr,
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

impl CommandOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: Vec::new(),
            success: true,
            code: Some(0),
        }
    }

    /// Failed output with the given exit code and stderr
    pub fn failed(code: i32, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: Vec::new(),
            stderr: stderr.into(),
            success: false,
            code: Some(code),
        }
    }

    /// Get stdout as a string
    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Get stderr as a string
    pub fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }

    /// Exit status for display
    pub fn status_str(&self) -> String {
        match self.code {
            Some(code) => format!("exit status: {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}
