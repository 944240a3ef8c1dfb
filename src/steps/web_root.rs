//! Web directory tree, ownership and permissions

use provision::{CommandLine, Result, Step, StepContext, StepResult};
use std::path::PathBuf;

use super::owner_spec;

/// Create the web root; an existing directory is fine
#[derive(Debug, Clone)]
pub struct EnsureDirectories {
    pub web_root: PathBuf,
}

impl Step for EnsureDirectories {
    fn id(&self) -> &'static str {
        "ensure_directories"
    }

    fn description(&self) -> String {
        format!("Create {}", self.web_root.display())
    }

    fn apply(&self, ctx: &StepContext) -> Result<StepResult> {
        ctx.exec.run(
            &CommandLine::new("mkdir")
                .arg("-p")
                .arg(self.web_root.display().to_string()),
        )?;
        Ok(StepResult::applied())
    }
}

/// Hand the application tree to the new account
#[derive(Debug, Clone)]
pub struct ApplyOwnership {
    pub name: String,
    pub app_root: PathBuf,
}

impl Step for ApplyOwnership {
    fn id(&self) -> &'static str {
        "apply_ownership"
    }

    fn description(&self) -> String {
        format!("Set owner of {} to {}", self.app_root.display(), self.name)
    }

    fn apply(&self, ctx: &StepContext) -> Result<StepResult> {
        ctx.exec.run(&CommandLine::new("chown").args([
            "-R".to_string(),
            owner_spec(&self.name),
            self.app_root.display().to_string(),
        ]))?;
        Ok(StepResult::applied())
    }
}

/// Recursive mode 755 on the application tree
#[derive(Debug, Clone)]
pub struct ApplyPermissions {
    pub app_root: PathBuf,
}

impl Step for ApplyPermissions {
    fn id(&self) -> &'static str {
        "apply_permissions"
    }

    fn description(&self) -> String {
        format!("Set mode 755 on {}", self.app_root.display())
    }

    fn apply(&self, ctx: &StepContext) -> Result<StepResult> {
        ctx.exec.run(
            &CommandLine::new("chmod")
                .args(["-R", "755"])
                .arg(self.app_root.display().to_string()),
        )?;
        Ok(StepResult::applied())
    }
}
