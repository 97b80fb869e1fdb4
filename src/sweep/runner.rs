//! Step runner: ordered execution with per-step isolation.
//!
//! One broken tool must never prevent unrelated reclamation from running:
//! every step is wrapped in its own recover-and-log boundary, failures are
//! recorded with the tool's exit status, and iteration always continues.

#![allow(missing_docs)]

use crate::core::errors::Result;
use crate::logger::line::RunLogger;

/// How one step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Action completed with status zero.
    Done,
    /// Action failed; carries the captured exit code.
    Failed(i32),
    /// Applicability gate was false; the action never ran.
    Skipped,
}

/// Record of one executed (or skipped) step.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub title: String,
    pub status: StepStatus,
}

/// One reclamation step: a title, an applicability gate evaluated
/// immediately before execution, and the action itself.
///
/// Steps are stateless descriptors; no step depends on another's outcome.
pub struct ReclaimStep<'a> {
    pub title: String,
    pub applies: Box<dyn Fn() -> bool + 'a>,
    pub action: Box<dyn FnOnce() -> Result<()> + 'a>,
}

impl<'a> ReclaimStep<'a> {
    pub fn new(
        title: impl Into<String>,
        applies: impl Fn() -> bool + 'a,
        action: impl FnOnce() -> Result<()> + 'a,
    ) -> Self {
        Self {
            title: title.into(),
            applies: Box::new(applies),
            action: Box::new(action),
        }
    }

    /// Step with no gate.
    pub fn always(title: impl Into<String>, action: impl FnOnce() -> Result<()> + 'a) -> Self {
        Self::new(title, || true, action)
    }
}

/// Tally of step outcomes for the run summary line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepTally {
    pub done: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl StepTally {
    #[must_use]
    pub fn from_outcomes(outcomes: &[StepOutcome]) -> Self {
        let mut tally = Self::default();
        for outcome in outcomes {
            match outcome.status {
                StepStatus::Done => tally.done += 1,
                StepStatus::Failed(_) => tally.failed += 1,
                StepStatus::Skipped => tally.skipped += 1,
            }
        }
        tally
    }

    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "Steps: {} done, {} failed, {} skipped",
            self.done, self.failed, self.skipped
        )
    }
}

/// Executes steps in catalog order, narrating each lifecycle event.
pub struct StepRunner<'a> {
    logger: &'a RunLogger,
}

impl<'a> StepRunner<'a> {
    #[must_use]
    pub fn new(logger: &'a RunLogger) -> Self {
        Self { logger }
    }

    /// Run every step to completion regardless of individual failures.
    pub fn run_all(&self, steps: Vec<ReclaimStep<'_>>) -> Vec<StepOutcome> {
        steps.into_iter().map(|step| self.run_one(step)).collect()
    }

    fn run_one(&self, step: ReclaimStep<'_>) -> StepOutcome {
        if !(step.applies)() {
            return StepOutcome {
                title: step.title,
                status: StepStatus::Skipped,
            };
        }

        self.logger.line(&format!("Starting: {}", step.title));
        let status = match (step.action)() {
            Ok(()) => {
                self.logger.line(&format!("Done: {}", step.title));
                StepStatus::Done
            }
            Err(err) => {
                let code = err.step_code();
                self.logger.line(&format!("FAILED ({code}): {}", step.title));
                StepStatus::Failed(code)
            }
        };
        StepOutcome {
            title: step.title,
            status,
        }
    }
}
