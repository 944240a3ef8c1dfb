//! Step context and provider traits
//!
//! These traits allow the provision crate to be used without depending on
//! a particular filesystem, console or process implementation.

use crate::command::CommandExecutor;
use crate::error::Result;
use crate::types::StepResult;
use std::path::Path;

/// Read-only access to host filesystem state
///
/// Mutations never go through this trait; they are commands run by the
/// [`CommandExecutor`] so the privilege wrapper applies to them too.
pub trait Filesystem {
    /// Whether the path exists (follows symlinks)
    fn exists(&self, path: &Path) -> bool;

    /// Whether the path itself is a symlink, dangling or not
    fn is_symlink(&self, path: &Path) -> bool;

    /// Read a whole file as UTF-8
    fn read_to_string(&self, path: &Path) -> Result<String>;
}

/// Progress callback for pipeline execution
///
/// Implement this trait to receive progress updates during execution.
pub trait ProgressCallback {
    /// Called once before the first step
    fn on_start(&mut self, total: usize);

    /// Called when starting a step
    fn on_step_start(&mut self, index: usize, id: &str, description: &str);

    /// Called when a step completes
    fn on_step_complete(&mut self, index: usize, id: &str, result: &StepResult);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_start(&mut self, _total: usize) {}
    fn on_step_start(&mut self, _index: usize, _id: &str, _description: &str) {}
    fn on_step_complete(&mut self, _index: usize, _id: &str, _result: &StepResult) {}
}

/// Context passed to step probes and effects
pub struct StepContext<'a> {
    /// Privilege-aware command executor
    pub exec: &'a CommandExecutor<'a>,
    /// Host filesystem reader
    pub fs: &'a dyn Filesystem,
    /// Whether this is a dry run (no actual changes)
    pub dry_run: bool,
    /// Whether to output verbose information
    pub verbose: bool,
}

impl<'a> StepContext<'a> {
    /// Create a new step context
    pub fn new(exec: &'a CommandExecutor<'a>, fs: &'a dyn Filesystem) -> Self {
        Self {
            exec,
            fs,
            dry_run: false,
            verbose: false,
        }
    }

    /// Same context with dry-run switched on or off
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Same context with verbose output switched on or off
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
