//! Execution plan - an ordered list of steps

use crate::step::{BoxedStep, Step};

/// Steps in the order they must run
#[derive(Default)]
pub struct ExecutionPlan {
    pub steps: Vec<BoxedStep>,
}

impl ExecutionPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step
    pub fn push(&mut self, step: impl Step + 'static) {
        self.steps.push(Box::new(step));
    }

    /// Append a step only when the feature is enabled
    pub fn push_if(&mut self, enabled: bool, step: impl Step + 'static) {
        if enabled {
            self.push(step);
        }
    }

    /// Step identifiers in execution order
    pub fn ids(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.id()).collect()
    }

    /// Total number of steps in the plan
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
