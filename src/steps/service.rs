//! Service reloads

use provision::{CommandLine, Result, Step, StepContext, StepResult};

/// Reload (not restart) the reverse proxy
#[derive(Debug, Clone)]
pub struct ReloadProxy {
    pub service: String,
}

impl Step for ReloadProxy {
    fn id(&self) -> &'static str {
        "reload_proxy"
    }

    fn description(&self) -> String {
        format!("Reload {}", self.service)
    }

    fn apply(&self, ctx: &StepContext) -> Result<StepResult> {
        ctx.exec
            .run(&CommandLine::new("systemctl").args(["reload", self.service.as_str()]))?;
        Ok(StepResult::applied())
    }
}

/// Restart the PHP-FPM instance for the detected runtime
#[derive(Debug, Clone)]
pub struct RestartWorkerPool {
    pub service: String,
}

impl Step for RestartWorkerPool {
    fn id(&self) -> &'static str {
        "restart_worker_pool"
    }

    fn description(&self) -> String {
        format!("Restart {}", self.service)
    }

    fn apply(&self, ctx: &StepContext) -> Result<StepResult> {
        ctx.exec
            .run(&CommandLine::new("systemctl").args(["restart", self.service.as_str()]))?;
        Ok(StepResult::applied())
    }
}
