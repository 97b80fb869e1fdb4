//! Engine: guard, probe, decide, sweep, probe again, report.
//!
//! One synchronous pass, no internal parallelism. Each catalog action blocks
//! until its tool finishes; the only cross-run coordination is the flock
//! guard. Exit codes: 0 for every completed run (including lock contention
//! and still-low outcomes), 1 only when the opening probe fails.

#![allow(missing_docs)]

use std::path::PathBuf;
use std::sync::Arc;

use crate::core::config::Config;
use crate::core::errors::Result;
use crate::logger::line::RunLogger;
use crate::monitor::probe::SpaceProbe;
use crate::monitor::trigger::evaluate;
use crate::platform::pal::Platform;
use crate::sweep::catalog::{Catalog, SweepPaths};
use crate::sweep::command;
use crate::sweep::docker::DockerEngine;
use crate::sweep::guard::{DEFAULT_LOCK_PATH, SweepGuard};
use crate::sweep::report::RunOutcome;
use crate::sweep::runner::{StepRunner, StepTally};

/// One configured engine invocation.
pub struct Engine<'a> {
    cfg: &'a Config,
    platform: Arc<dyn Platform>,
    docker: &'a dyn DockerEngine,
    logger: &'a RunLogger,
    paths: SweepPaths,
    lock_path: PathBuf,
    tool_probe: fn(&str) -> bool,
    force: bool,
}

impl<'a> Engine<'a> {
    #[must_use]
    pub fn new(
        cfg: &'a Config,
        platform: Arc<dyn Platform>,
        docker: &'a dyn DockerEngine,
        logger: &'a RunLogger,
    ) -> Self {
        Self {
            cfg,
            platform,
            docker,
            logger,
            paths: SweepPaths::default(),
            lock_path: PathBuf::from(DEFAULT_LOCK_PATH),
            tool_probe: command::tool_on_path,
            force: false,
        }
    }

    /// Substitute sweep roots (tests).
    #[must_use]
    pub fn with_paths(mut self, paths: SweepPaths) -> Self {
        self.paths = paths;
        self
    }

    /// Override the lock path (tests and the `DSW_LOCK_PATH` escape hatch).
    #[must_use]
    pub fn with_lock_path(mut self, path: PathBuf) -> Self {
        self.lock_path = path;
        self
    }

    /// Substitute the PATH probe (tests).
    #[must_use]
    pub fn with_tool_probe(mut self, probe: fn(&str) -> bool) -> Self {
        self.tool_probe = probe;
        self
    }

    /// Run the catalog even when the trigger says there is nothing to do.
    #[must_use]
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Execute one run and return the process exit code.
    pub fn run(&self) -> i32 {
        match self.execute() {
            Ok(code) => code,
            Err(err) => {
                self.logger.line(&format!("Run aborted: {err}"));
                1
            }
        }
    }

    fn execute(&self) -> Result<i32> {
        self.cfg.validate()?;

        let Some(_guard) = SweepGuard::acquire(&self.lock_path)? else {
            self.logger.line("Another cleanup is running; exiting.");
            return Ok(0);
        };

        self.logger.line(&format!(
            "disk_space_warden v{} starting (config {}): {}",
            env!("CARGO_PKG_VERSION"),
            self.cfg.stable_hash()?,
            self.cfg.summary()
        ));

        let probe = SpaceProbe::new(self.platform.clone());
        let before = probe.sample(&self.cfg.target_path)?;

        let decision = evaluate(&before, self.cfg);
        self.logger.line(&decision.log_line(&before, self.cfg));

        if decision.triggered || self.force {
            if self.force && !decision.triggered {
                self.logger.line("Forced run: sweeping despite healthy readings");
            }
            let protect = self.cfg.protect_pattern()?;
            let steps = Catalog::new(self.cfg, self.docker, self.logger)
                .with_paths(self.paths.clone())
                .with_tool_probe(self.tool_probe)
                .build(protect);
            let outcomes = StepRunner::new(self.logger).run_all(steps);
            self.logger
                .line(&StepTally::from_outcomes(&outcomes).summary_line());
        }

        // Only the opening probe is fatal; a failed re-probe degrades to a
        // zero-delta report.
        let after = match probe.sample(&self.cfg.target_path) {
            Ok(sample) => sample,
            Err(err) => {
                self.logger
                    .warn(&format!("post-run probe failed, reporting no delta: {err}"));
                before
            }
        };

        let outcome = RunOutcome::new(before, after, self.cfg);
        self.logger.line(&outcome.freed_line());
        self.logger.line(outcome.status_line());
        Ok(0)
    }
}
