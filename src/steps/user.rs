//! Dedicated OS account

use provision::{CommandLine, Result, Step, StepContext, StepResult, StepState};
use std::path::PathBuf;

use crate::oracle;

/// Create a system account with its own group, a managed home and no login shell
#[derive(Debug, Clone)]
pub struct EnsureUser {
    pub name: String,
    pub home: PathBuf,
    pub shell: String,
}

impl Step for EnsureUser {
    fn id(&self) -> &'static str {
        "ensure_user"
    }

    fn description(&self) -> String {
        format!("Create account {}", self.name)
    }

    fn current_state(&self, ctx: &StepContext) -> Result<StepState> {
        if oracle::user_exists(ctx.exec, &self.name)? {
            Ok(StepState::Satisfied {
                reason: format!("account {} already exists", self.name),
            })
        } else {
            Ok(StepState::Pending)
        }
    }

    fn apply(&self, ctx: &StepContext) -> Result<StepResult> {
        let home = self.home.display().to_string();
        ctx.exec.run(&CommandLine::new("useradd").args([
            "--system",
            "--create-home",
            "--home-dir",
            home.as_str(),
            "--shell",
            self.shell.as_str(),
            "--user-group",
            self.name.as_str(),
        ]))?;

        Ok(StepResult::Applied {
            detail: Some(format!("home {home}")),
        })
    }
}
