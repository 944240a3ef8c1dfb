//! Execution engine - runs a plan strictly in order, stopping at the first failure

use crate::context::{ProgressCallback, StepContext};
use crate::error::{Error, Result};
use crate::plan::ExecutionPlan;
use crate::types::{ExecuteSummary, StepResult, StepState};

/// Execute a plan
///
/// For each step, in order:
/// 1. Ask the idempotency probe; a satisfied step is skipped
/// 2. In a dry run, report the step as planned
/// 3. Otherwise apply it
///
/// The first error aborts the run. Nothing already applied is undone.
pub fn execute<P: ProgressCallback>(
    plan: &ExecutionPlan,
    ctx: &StepContext,
    progress: &mut P,
) -> Result<ExecuteSummary> {
    let mut summary = ExecuteSummary::default();
    progress.on_start(plan.len());

    for (index, step) in plan.steps.iter().enumerate() {
        progress.on_step_start(index, step.id(), &step.description());

        let result = run_step(step.as_ref(), ctx).map_err(|e| Error::Step {
            step: step.id().to_string(),
            source: Box::new(e),
        })?;

        match &result {
            StepResult::Skipped { reason } => log::info!("{}: skipped ({reason})", step.id()),
            StepResult::Warned { reason } => log::warn!("{}: {reason}", step.id()),
            StepResult::Applied { detail } if ctx.verbose => {
                log::info!("{}: applied ({})", step.id(), detail.as_deref().unwrap_or("done"));
            }
            StepResult::Applied { .. } => log::debug!("{}: applied", step.id()),
            StepResult::Planned => log::debug!("{}: planned", step.id()),
        }

        progress.on_step_complete(index, step.id(), &result);
        summary.add_result(&result);
    }

    Ok(summary)
}

fn run_step(step: &dyn crate::step::Step, ctx: &StepContext) -> Result<StepResult> {
    if let StepState::Satisfied { reason } = step.current_state(ctx)? {
        return Ok(StepResult::Skipped { reason });
    }

    if ctx.dry_run {
        return Ok(StepResult::Planned);
    }

    step.apply(ctx)
}

/// Simple execution without progress reporting
pub fn execute_simple(plan: &ExecutionPlan, ctx: &StepContext) -> Result<ExecuteSummary> {
    use crate::context::NoProgress;

    execute(plan, ctx, &mut NoProgress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandExecutor, CommandLine, ProcessRunner};
    use crate::context::Filesystem;
    use crate::step::Step;
    use crate::types::{CommandOutput, Privilege};
    use std::cell::RefCell;
    use std::path::Path;

    /// Fails any command whose program is listed in `fail`
    struct ScriptedRunner {
        fail: Vec<&'static str>,
        calls: RefCell<Vec<String>>,
    }

    impl ProcessRunner for ScriptedRunner {
        fn run(&self, cmd: &CommandLine) -> Result<CommandOutput> {
            self.calls.borrow_mut().push(cmd.to_string());
            if self.fail.contains(&cmd.program.as_str()) {
                Ok(CommandOutput::failed(1, "boom"))
            } else {
                Ok(CommandOutput::ok(""))
            }
        }
    }

    struct EmptyFs;

    impl Filesystem for EmptyFs {
        fn exists(&self, _path: &Path) -> bool {
            false
        }

        fn is_symlink(&self, _path: &Path) -> bool {
            false
        }

        fn read_to_string(&self, path: &Path) -> Result<String> {
            Err(Error::Io {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }
    }

    #[derive(Debug)]
    struct RunProgram {
        program: &'static str,
        satisfied: bool,
    }

    impl Step for RunProgram {
        fn id(&self) -> &'static str {
            self.program
        }

        fn description(&self) -> String {
            format!("Run {}", self.program)
        }

        fn current_state(&self, _ctx: &StepContext) -> Result<StepState> {
            if self.satisfied {
                Ok(StepState::Satisfied {
                    reason: "done".into(),
                })
            } else {
                Ok(StepState::Pending)
            }
        }

        fn apply(&self, ctx: &StepContext) -> Result<StepResult> {
            ctx.exec.run(&CommandLine::new(self.program))?;
            Ok(StepResult::applied())
        }
    }

    fn plan(steps: &[(&'static str, bool)]) -> ExecutionPlan {
        let mut plan = ExecutionPlan::new();
        for (program, satisfied) in steps {
            plan.push(RunProgram {
                program,
                satisfied: *satisfied,
            });
        }
        plan
    }

    #[test]
    fn test_execute_empty_plan() {
        let runner = ScriptedRunner {
            fail: vec![],
            calls: RefCell::new(Vec::new()),
        };
        let exec = CommandExecutor::new(&runner, Privilege::Elevated);
        let ctx = StepContext::new(&exec, &EmptyFs);

        let summary = execute_simple(&ExecutionPlan::new(), &ctx).unwrap();
        assert_eq!(summary.total(), 0);
    }

    #[test]
    fn test_satisfied_steps_are_skipped() {
        let runner = ScriptedRunner {
            fail: vec![],
            calls: RefCell::new(Vec::new()),
        };
        let exec = CommandExecutor::new(&runner, Privilege::Elevated);
        let ctx = StepContext::new(&exec, &EmptyFs);

        let summary = execute_simple(&plan(&[("first", true), ("second", false)]), &ctx).unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.applied, 1);
        assert_eq!(*runner.calls.borrow(), vec!["second".to_string()]);
    }

    #[test]
    fn test_stops_at_first_failure() {
        let runner = ScriptedRunner {
            fail: vec!["second"],
            calls: RefCell::new(Vec::new()),
        };
        let exec = CommandExecutor::new(&runner, Privilege::Elevated);
        let ctx = StepContext::new(&exec, &EmptyFs);

        let err = execute_simple(
            &plan(&[("first", false), ("second", false), ("third", false)]),
            &ctx,
        )
        .unwrap_err();

        assert_eq!(err.step(), Some("second"));
        assert_eq!(
            *runner.calls.borrow(),
            vec!["first".to_string(), "second".to_string()]
        );
    }

    #[test]
    fn test_dry_run_applies_nothing() {
        let runner = ScriptedRunner {
            fail: vec![],
            calls: RefCell::new(Vec::new()),
        };
        let exec = CommandExecutor::new(&runner, Privilege::Elevated);
        let ctx = StepContext::new(&exec, &EmptyFs).with_dry_run(true);

        let summary = execute_simple(&plan(&[("first", false), ("second", true)]), &ctx).unwrap();
        assert_eq!(summary.planned, 1);
        assert_eq!(summary.skipped, 1);
        assert!(runner.calls.borrow().is_empty());
    }
}
