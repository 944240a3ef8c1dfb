//! # Provision
//!
//! Ordered, idempotent provisioning steps for a single host.
//!
//! ## Core Concepts
//!
//! - **Step**: a named unit of work with an idempotency probe and an effect
//! - **ExecutionPlan**: steps in the order they must run
//! - **CommandExecutor**: runs argv vectors, applying the run-wide privilege mode
//! - **Executor**: walks the plan, skips satisfied steps, stops at the first failure
//!
//! ## Provider Traits
//!
//! - [`ProcessRunner`]: starts a process and captures its output
//! - [`Filesystem`]: read-only view of host state
//! - [`ProgressCallback`]: receives progress updates
//!
//! Mutations are always commands. That keeps privilege escalation a single,
//! pipeline-wide decision instead of something each step has to handle.

pub mod command;
pub mod context;
pub mod error;
pub mod executor;
pub mod plan;
pub mod step;
pub mod types;

// Re-export main types at crate root
pub use command::{CommandExecutor, CommandLine, ProcessRunner};
pub use context::{Filesystem, NoProgress, ProgressCallback, StepContext};
pub use error::{Error, ErrorCategory, Result};
pub use executor::{execute, execute_simple};
pub use plan::ExecutionPlan;
pub use step::{BoxedStep, Step};
pub use types::{CommandOutput, ExecuteSummary, Privilege, StepResult, StepState};
