//! SSH key propagation
//!
//! Copies the invoking operator's `authorized_keys` into the new account so
//! the operator can log in (or deploy) as that account. A missing home or
//! key file is a soft condition: the step warns and the pipeline continues.

use provision::{CommandLine, Result, Step, StepContext, StepResult};
use std::path::PathBuf;

use super::owner_spec;
use crate::sudo;

#[derive(Debug, Clone)]
pub struct EnsureSshAccess {
    pub name: String,
    /// Home of the new account
    pub home: PathBuf,
    /// Operator resolved at startup (SUDO_USER when elevated through sudo)
    pub invoker: Option<String>,
}

impl Step for EnsureSshAccess {
    fn id(&self) -> &'static str {
        "ensure_ssh_access"
    }

    fn description(&self) -> String {
        format!("Copy operator SSH keys to {}", self.name)
    }

    fn apply(&self, ctx: &StepContext) -> Result<StepResult> {
        let Some(invoker) = self.invoker.as_deref() else {
            return Ok(StepResult::Warned {
                reason: "could not determine the invoking user; SSH keys not copied".into(),
            });
        };

        let Some(operator_home) = sudo::lookup_home(ctx.exec, invoker)? else {
            return Ok(StepResult::Warned {
                reason: format!("no home directory for {invoker}; SSH keys not copied"),
            });
        };

        let source = operator_home.join(".ssh").join("authorized_keys");
        if !ctx.fs.exists(&source) {
            return Ok(StepResult::Warned {
                reason: format!("{} not found; SSH keys not copied", source.display()),
            });
        }

        let ssh_dir = self.home.join(".ssh");
        let keys = ssh_dir.join("authorized_keys");

        // Every write below runs privileged and would follow a link the
        // account owner planted on an earlier run
        if let Some(link) = [&self.home, &ssh_dir, &keys]
            .into_iter()
            .find(|p| ctx.fs.is_symlink(p))
        {
            return Ok(StepResult::Warned {
                reason: format!("{} is a symlink; SSH keys not copied", link.display()),
            });
        }

        let ssh_dir_str = ssh_dir.display().to_string();
        let keys_str = keys.display().to_string();

        ctx.exec
            .run(&CommandLine::new("mkdir").args(["-p", ssh_dir_str.as_str()]))?;
        ctx.exec.run(&CommandLine::new("cp").args([
            source.display().to_string(),
            keys_str.clone(),
        ]))?;
        ctx.exec
            .run(&CommandLine::new("chmod").args(["700", ssh_dir_str.as_str()]))?;
        ctx.exec
            .run(&CommandLine::new("chmod").args(["600", keys_str.as_str()]))?;
        ctx.exec.run(&CommandLine::new("chown").args([
            "-R".to_string(),
            owner_spec(&self.name),
            ssh_dir_str,
        ]))?;

        Ok(StepResult::Applied {
            detail: Some(format!("keys from {invoker}")),
        })
    }
}
