//! Provisioning steps
//!
//! One type per step of the pipeline. Each holds the values it needs,
//! already derived from the host layout, so steps never look at config.

mod files;
mod service;
mod site;
mod ssh;
mod user;
mod web_root;

pub use files::{WritePoolConfig, WriteVirtualHost};
pub use service::{ReloadProxy, RestartWorkerPool};
pub use site::EnableSite;
pub use ssh::EnsureSshAccess;
pub use user::EnsureUser;
pub use web_root::{ApplyOwnership, ApplyPermissions, EnsureDirectories};

use provision::{CommandLine, Result, StepContext};
use std::path::Path;

use crate::layout::TMP_SUFFIX;

/// Replace `path` with `content` in one rename
///
/// The text is piped into `tee` (so the write runs with the pipeline's
/// privileges) next to the target, then moved over it. `tee` echoes its
/// input, so its stdout is discarded rather than captured.
fn write_atomic(ctx: &StepContext, path: &Path, content: &str) -> Result<()> {
    let tmp = format!("{}{TMP_SUFFIX}", path.display());

    ctx.exec.run(
        &CommandLine::new("tee")
            .arg(tmp.as_str())
            .stdin(content.as_bytes())
            .discard_stdout(),
    )?;
    ctx.exec.run(
        &CommandLine::new("mv")
            .arg("-f")
            .arg(tmp.as_str())
            .arg(path.display().to_string()),
    )?;
    Ok(())
}

/// `user:group` for an account with a same-named primary group
fn owner_spec(name: &str) -> String {
    format!("{name}:{name}")
}
