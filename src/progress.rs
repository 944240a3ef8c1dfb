//! Step-by-step console output for a pipeline run.
//!
//! Lines are printed rather than drawn with spinners: privileged commands
//! may prompt on the terminal at any point.

use colored::Colorize;
use provision::{ProgressCallback, StepResult};

use crate::ui;

pub struct ConsoleProgress {
    total: usize,
    quiet: bool,
}

impl ConsoleProgress {
    pub fn new(quiet: bool) -> Self {
        Self { total: 0, quiet }
    }
}

impl ProgressCallback for ConsoleProgress {
    fn on_start(&mut self, total: usize) {
        self.total = total;
    }

    fn on_step_start(&mut self, index: usize, _id: &str, description: &str) {
        if !self.quiet {
            ui::step(index + 1, self.total, description);
        }
    }

    fn on_step_complete(&mut self, _index: usize, _id: &str, result: &StepResult) {
        // Warnings are shown even in quiet mode
        if !self.quiet || matches!(result, StepResult::Warned { .. }) {
            println!("      {}", outcome_line(result));
        }
    }
}

fn outcome_line(result: &StepResult) -> String {
    match result {
        StepResult::Applied { detail: Some(d) } => format!("{} {}", "✓".green(), d.dimmed()),
        StepResult::Applied { detail: None } => "✓".green().to_string(),
        StepResult::Skipped { reason } => format!("{} {}", "○".dimmed(), reason.dimmed()),
        StepResult::Warned { reason } => format!("{} {}", "⚠".yellow(), reason.yellow()),
        StepResult::Planned => "would run".cyan().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_lines_mention_reason() {
        colored::control::set_override(false);

        let skipped = outcome_line(&StepResult::Skipped {
            reason: "user acme exists".into(),
        });
        assert!(skipped.contains("user acme exists"));

        let applied = outcome_line(&StepResult::Applied {
            detail: Some("created".into()),
        });
        assert!(applied.ends_with("created"));

        assert_eq!(outcome_line(&StepResult::Planned), "would run");
    }
}
