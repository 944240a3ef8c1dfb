//! Site activation

use provision::{CommandLine, Result, Step, StepContext, StepResult, StepState};
use std::path::PathBuf;

use crate::oracle;

/// Link sites-available/<name> into sites-enabled
#[derive(Debug, Clone)]
pub struct EnableSite {
    pub available: PathBuf,
    pub enabled: PathBuf,
}

impl Step for EnableSite {
    fn id(&self) -> &'static str {
        "enable_site"
    }

    fn description(&self) -> String {
        format!("Enable site {}", self.enabled.display())
    }

    fn current_state(&self, ctx: &StepContext) -> Result<StepState> {
        if oracle::site_enabled(ctx.fs, &self.enabled) {
            Ok(StepState::Satisfied {
                reason: "site already enabled".to_string(),
            })
        } else {
            Ok(StepState::Pending)
        }
    }

    fn apply(&self, ctx: &StepContext) -> Result<StepResult> {
        ctx.exec.run(&CommandLine::new("ln").args([
            "-s".to_string(),
            self.available.display().to_string(),
            self.enabled.display().to_string(),
        ]))?;
        Ok(StepResult::applied())
    }
}
