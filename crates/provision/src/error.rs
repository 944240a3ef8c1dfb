//! Error types for provisioning operations.
//!
//! Errors are categorized so the caller can tell a precondition that stopped
//! the run before anything changed apart from a command that failed halfway
//! through, and give the operator matching advice.

use std::path::PathBuf;
use thiserror::Error;

/// Categories of provisioning errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad application name or domain
    InvalidInput,
    /// Something required before the first mutation is missing
    Precondition,
    /// An external command failed or could not be started
    Command,
    /// Reading host state failed
    Io,
}

impl ErrorCategory {
    /// Whether the host may have been partially modified.
    pub fn may_have_mutated(&self) -> bool {
        matches!(self, Self::Command)
    }

    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::InvalidInput => "Invalid input",
            Self::Precondition => "Precondition not met",
            Self::Command => "Command failed",
            Self::Io => "Filesystem error",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::InvalidInput => {
                "Use a lowercase account name (letters, digits, '_' or '-') and a bare domain"
            }
            Self::Precondition => "Nothing was changed; fix the host setup and run again",
            Self::Command => {
                "Earlier steps were kept; fix the cause and re-run, completed steps are skipped"
            }
            Self::Io => "Check that the path exists and is readable",
        }
    }
}

/// Errors that can occur while provisioning.
#[derive(Debug, Error)]
pub enum Error {
    /// Application name or domain rejected
    #[error("invalid {field} '{value}': {reason}")]
    InvalidInput {
        /// Which input was rejected ("name", "domain", ...)
        field: &'static str,
        /// The rejected value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// A precondition failed before any mutation
    #[error("precondition failed: {message}")]
    Precondition {
        /// What is missing
        message: String,
    },

    /// A command ran and exited unsuccessfully
    #[error("command `{command}` failed ({status}): {stderr}")]
    CommandFailed {
        /// Full command line, including any privilege wrapper
        command: String,
        /// Exit status as shown to the user
        status: String,
        /// Captured diagnostic output
        stderr: String,
    },

    /// A command could not be started at all
    #[error("failed to execute `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading host state failed
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A pipeline step failed; wraps the underlying cause
    #[error("step '{step}' failed")]
    Step {
        /// Identifier of the failing step
        step: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Shorthand for an input validation failure.
    pub fn invalid(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidInput {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a precondition failure.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } => ErrorCategory::InvalidInput,
            Self::Precondition { .. } => ErrorCategory::Precondition,
            Self::CommandFailed { .. } | Self::Spawn { .. } => ErrorCategory::Command,
            Self::Io { .. } => ErrorCategory::Io,
            Self::Step { source, .. } => source.category(),
        }
    }

    /// Identifier of the step that failed, if the error came from one.
    pub fn step(&self) -> Option<&str> {
        match self {
            Self::Step { step, .. } => Some(step),
            _ => None,
        }
    }
}

/// Result type alias for provisioning operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_error_keeps_inner_category() {
        let inner = Error::CommandFailed {
            command: "chown -R acme:acme /var/www/acme".into(),
            status: "exit status: 1".into(),
            stderr: "chown: invalid user".into(),
        };
        let err = Error::Step {
            step: "apply_ownership".into(),
            source: Box::new(inner),
        };

        assert_eq!(err.category(), ErrorCategory::Command);
        assert!(err.category().may_have_mutated());
        assert_eq!(err.step(), Some("apply_ownership"));
    }

    #[test]
    fn test_command_failure_message_carries_command_and_stderr() {
        let err = Error::CommandFailed {
            command: "sudo useradd acme".into(),
            status: "exit status: 9".into(),
            stderr: "useradd: user 'acme' already exists".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("sudo useradd acme"));
        assert!(msg.contains("already exists"));
    }

    #[test]
    fn test_step_chain_names_command_once() {
        let err = Error::Step {
            step: "apply_ownership".into(),
            source: Box::new(Error::CommandFailed {
                command: "chown -R acme:acme /var/www/acme".into(),
                status: "exit status: 1".into(),
                stderr: "chown: operation not permitted".into(),
            }),
        };

        let mut chain = vec![err.to_string()];
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }
        let rendered = chain.join(": ");

        assert_eq!(rendered.matches("chown -R acme:acme /var/www/acme").count(), 1);
        assert_eq!(rendered.matches("operation not permitted").count(), 1);
        assert!(rendered.starts_with("step 'apply_ownership' failed: command"));
    }

    #[test]
    fn test_precondition_does_not_mutate() {
        let err = Error::precondition("pool template missing");
        assert_eq!(err.category(), ErrorCategory::Precondition);
        assert!(!err.category().may_have_mutated());
    }
}
