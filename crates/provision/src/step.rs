//! Step trait for ordered, idempotent provisioning
//!
//! A Step is one named unit of work: a probe that says whether its effect
//! is already in place, and the effect itself.

use crate::context::StepContext;
use crate::error::Result;
use crate::types::{StepResult, StepState};
use std::fmt;

/// Core trait for provisioning steps
///
/// # Example
///
/// ```ignore
/// use provision::{CommandLine, Step, StepContext, StepResult, StepState};
///
/// #[derive(Debug)]
/// struct MakeDir { path: String }
///
/// impl Step for MakeDir {
///     fn id(&self) -> &'static str { "make_dir" }
///
///     fn description(&self) -> String { format!("Create {}", self.path) }
///
///     fn current_state(&self, ctx: &StepContext) -> provision::Result<StepState> {
///         if ctx.fs.exists(self.path.as_ref()) {
///             Ok(StepState::Satisfied { reason: "already exists".into() })
///         } else {
///             Ok(StepState::Pending)
///         }
///     }
///
///     fn apply(&self, ctx: &StepContext) -> provision::Result<StepResult> {
///         ctx.exec.run(&CommandLine::new("mkdir").args(["-p", &self.path]))?;
///         Ok(StepResult::applied())
///     }
/// }
/// ```
pub trait Step: fmt::Debug {
    /// Stable identifier, used in logs and error messages
    fn id(&self) -> &'static str;

    /// Human-readable description of what this step does
    fn description(&self) -> String;

    /// Idempotency probe
    ///
    /// Must not change the host. Steps that always run (config rewrites,
    /// service reloads) keep the default, which reports `Pending`.
    fn current_state(&self, _ctx: &StepContext) -> Result<StepState> {
        Ok(StepState::Pending)
    }

    /// Make the change
    ///
    /// Called only when the probe reported `Pending` and the run is not a
    /// dry run. A step may still return `Warned` for soft conditions it
    /// can only discover while applying.
    fn apply(&self, ctx: &StepContext) -> Result<StepResult>;
}

/// A boxed step for type-erased storage
pub type BoxedStep = Box<dyn Step>;
