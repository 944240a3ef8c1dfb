//! Generated config files
//!
//! Neither step is gated: every run regenerates the file from current
//! inputs and replaces what is there.

use provision::{Result, Step, StepContext, StepResult};
use std::path::{Path, PathBuf};

use super::write_atomic;

/// Write the derived PHP-FPM pool
#[derive(Debug, Clone)]
pub struct WritePoolConfig {
    pub path: PathBuf,
    /// Already rewritten from the stock template
    pub content: String,
}

impl Step for WritePoolConfig {
    fn id(&self) -> &'static str {
        "write_pool_config"
    }

    fn description(&self) -> String {
        format!("Write {}", self.path.display())
    }

    fn apply(&self, ctx: &StepContext) -> Result<StepResult> {
        write_file(ctx, &self.path, &self.content)
    }
}

/// Write the nginx server block to sites-available
#[derive(Debug, Clone)]
pub struct WriteVirtualHost {
    pub path: PathBuf,
    pub content: String,
}

impl Step for WriteVirtualHost {
    fn id(&self) -> &'static str {
        "write_virtual_host"
    }

    fn description(&self) -> String {
        format!("Write {}", self.path.display())
    }

    fn apply(&self, ctx: &StepContext) -> Result<StepResult> {
        write_file(ctx, &self.path, &self.content)
    }
}

fn write_file(ctx: &StepContext, path: &Path, content: &str) -> Result<StepResult> {
    let replaced = ctx.fs.exists(path);
    write_atomic(ctx, path, content)?;

    let detail = if replaced { "replaced" } else { "created" };
    Ok(StepResult::Applied {
        detail: Some(detail.to_string()),
    })
}
