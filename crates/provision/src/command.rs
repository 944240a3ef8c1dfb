//! Command lines and the privilege-aware executor
//!
//! Commands are argv vectors. Nothing here ever builds a shell string, so
//! application names and paths are passed as discrete tokens.

use crate::error::{Error, Result};
use crate::types::{CommandOutput, Privilege};
use std::fmt;

/// A command to run: program, arguments and optional stdin payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<Vec<u8>>,
    /// Send stdout to the null device instead of capturing it
    pub discard_stdout: bool,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            discard_stdout: false,
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Feed bytes to the command's stdin
    pub fn stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Do not capture stdout (for commands that echo their input back)
    pub fn discard_stdout(mut self) -> Self {
        self.discard_stdout = true;
        self
    }

    /// Program followed by its arguments
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .argv()
            .into_iter()
            .map(|a| {
                if a.is_empty() || a.chars().any(char::is_whitespace) {
                    format!("'{a}'")
                } else {
                    a.to_string()
                }
            })
            .collect();
        write!(f, "{}", rendered.join(" "))
    }
}

/// Runs a command and captures its result
///
/// Implement this trait to provide process execution. Returning `Err`
/// means the command could not be started; a non-zero exit is reported
/// through [`CommandOutput::success`].
pub trait ProcessRunner {
    fn run(&self, cmd: &CommandLine) -> Result<CommandOutput>;
}

/// Executes commands with the run-wide privilege mode applied
pub struct CommandExecutor<'a> {
    runner: &'a dyn ProcessRunner,
    privilege: Privilege,
}

impl<'a> CommandExecutor<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, privilege: Privilege) -> Self {
        Self { runner, privilege }
    }

    /// Same runner, no escalation wrapper
    ///
    /// For read-only queries that must not run as root.
    pub fn unwrapped(&self) -> CommandExecutor<'a> {
        Self::new(self.runner, Privilege::Elevated)
    }

    /// Apply the escalation wrapper, if any
    pub fn prepare(&self, cmd: &CommandLine) -> CommandLine {
        match &self.privilege {
            Privilege::Elevated => cmd.clone(),
            Privilege::Escalate { wrapper } => CommandLine {
                program: wrapper.clone(),
                args: std::iter::once(cmd.program.clone())
                    .chain(cmd.args.iter().cloned())
                    .collect(),
                stdin: cmd.stdin.clone(),
                discard_stdout: cmd.discard_stdout,
            },
        }
    }

    /// Run a command; a non-zero exit is an error carrying the captured stderr
    pub fn run(&self, cmd: &CommandLine) -> Result<CommandOutput> {
        let prepared = self.prepare(cmd);
        log::debug!("Running: {prepared}");

        let output = self.runner.run(&prepared)?;
        if !output.success {
            return Err(Error::CommandFailed {
                command: prepared.to_string(),
                status: output.status_str(),
                stderr: output.stderr_str().trim().to_string(),
            });
        }
        Ok(output)
    }

    /// Run a probe; returns whether it exited successfully
    ///
    /// A non-zero exit is an answer, not an error. Only a failure to
    /// start the command is reported as `Err`.
    pub fn probe(&self, cmd: &CommandLine) -> Result<bool> {
        let prepared = self.prepare(cmd);
        log::debug!("Probing: {prepared}");
        Ok(self.runner.run(&prepared)?.success)
    }
}
