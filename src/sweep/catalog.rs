//! Reclamation catalog: the fixed-order list of cleanup actions.
//!
//! Order is load-bearing and matches the sweep contract: package caches,
//! journal, temp trees (files before directories, per root), rotated logs,
//! then the flag-gated Docker family. Each step carries its own
//! applicability gate, evaluated immediately before execution.

#![allow(missing_docs)]

use std::path::PathBuf;

use chrono::Utc;
use regex::Regex;

use crate::core::config::Config;
use crate::logger::line::RunLogger;
use crate::sweep::archives::{RotationMatcher, remove_stale_archives};
use crate::sweep::command;
use crate::sweep::docker::{
    DOCKER_LOG_ROOT, DockerEngine, prune_unused_volumes, truncate_container_logs,
};
use crate::sweep::fs_sweep::{remove_stale_empty_dirs, remove_stale_files};
use crate::sweep::runner::ReclaimStep;

/// Purge commands per package-manager family, in probe priority order.
/// The first family found wins; at most one runs.
const PACKAGE_MANAGERS: [(&str, &[&str]); 3] = [
    ("apt-get", &["clean"]),
    ("dnf", &["clean", "all"]),
    ("pacman", &["-Sc", "--noconfirm"]),
];

/// Filesystem roots the sweep operates on. Defaults are the real system
/// locations; tests substitute scratch directories.
#[derive(Debug, Clone)]
pub struct SweepPaths {
    pub temp_roots: Vec<PathBuf>,
    pub log_root: PathBuf,
    pub docker_log_root: PathBuf,
}

impl Default for SweepPaths {
    fn default() -> Self {
        Self {
            temp_roots: vec![PathBuf::from("/tmp"), PathBuf::from("/var/tmp")],
            log_root: PathBuf::from("/var/log"),
            docker_log_root: PathBuf::from(DOCKER_LOG_ROOT),
        }
    }
}

/// Pick the first available package-manager family.
fn select_package_manager(
    probe: fn(&str) -> bool,
) -> Option<(&'static str, &'static [&'static str])> {
    PACKAGE_MANAGERS
        .iter()
        .find(|(tool, _)| probe(tool))
        .copied()
}

/// The single vacuum argument: size bound when configured, else time bound.
fn journal_vacuum_arg(cfg: &Config) -> String {
    if cfg.journal_size_enabled() {
        format!("--vacuum-size={}", cfg.journal_max_size.trim())
    } else {
        format!("--vacuum-time={}d", cfg.journal_retain_days)
    }
}

/// Builds the ordered step list for one run.
pub struct Catalog<'a> {
    cfg: &'a Config,
    docker: &'a dyn DockerEngine,
    logger: &'a RunLogger,
    paths: SweepPaths,
    tool_probe: fn(&str) -> bool,
}

impl<'a> Catalog<'a> {
    #[must_use]
    pub fn new(cfg: &'a Config, docker: &'a dyn DockerEngine, logger: &'a RunLogger) -> Self {
        Self {
            cfg,
            docker,
            logger,
            paths: SweepPaths::default(),
            tool_probe: command::tool_on_path,
        }
    }

    /// Substitute sweep roots (tests).
    #[must_use]
    pub fn with_paths(mut self, paths: SweepPaths) -> Self {
        self.paths = paths;
        self
    }

    /// Substitute the PATH probe (tests).
    #[must_use]
    pub fn with_tool_probe(mut self, probe: fn(&str) -> bool) -> Self {
        self.tool_probe = probe;
        self
    }

    /// Materialize the ordered steps. `protect` is the compiled volume-name
    /// veto pattern.
    #[must_use]
    pub fn build(self, protect: Regex) -> Vec<ReclaimStep<'a>> {
        let cfg = self.cfg;
        let docker = self.docker;
        let logger = self.logger;
        let probe = self.tool_probe;

        let mut steps = Vec::new();

        steps.push(ReclaimStep::new(
            "Package cache purge",
            move || select_package_manager(probe).is_some(),
            move || match select_package_manager(probe) {
                Some((tool, args)) => command::run_quiet(tool, args),
                None => Ok(()),
            },
        ));

        steps.push(ReclaimStep::new(
            "Journal vacuum",
            move || probe("journalctl"),
            move || command::run_quiet("journalctl", &[&journal_vacuum_arg(cfg)]),
        ));

        for root in self.paths.temp_roots.clone() {
            let title = format!("Stale file sweep: {}", root.display());
            steps.push(ReclaimStep::always(title, move || {
                let removed = remove_stale_files(&root, cfg.tmp_retain_days)?;
                logger.line(&format!(
                    "Removed {removed} stale file(s) under {}",
                    root.display()
                ));
                Ok(())
            }));
        }

        for root in self.paths.temp_roots.clone() {
            let title = format!("Empty directory sweep: {}", root.display());
            steps.push(ReclaimStep::always(title, move || {
                let removed = remove_stale_empty_dirs(&root, cfg.tmp_retain_days)?;
                logger.line(&format!(
                    "Removed {removed} empty director{} under {}",
                    if removed == 1 { "y" } else { "ies" },
                    root.display()
                ));
                Ok(())
            }));
        }

        let log_root = self.paths.log_root;
        steps.push(ReclaimStep::always(
            format!("Rotated log sweep: {}", log_root.display()),
            move || {
                let matcher = RotationMatcher::new()?;
                let removed =
                    remove_stale_archives(&log_root, cfg.log_archive_retain_days, &matcher)?;
                logger.line(&format!(
                    "Removed {removed} rotated log(s) under {}",
                    log_root.display()
                ));
                Ok(())
            },
        ));

        let docker_log_root = self.paths.docker_log_root;
        steps.push(ReclaimStep::new(
            "Docker log truncation",
            move || cfg.truncate_docker_logs && docker.available(),
            move || {
                let (count, bytes) =
                    truncate_container_logs(&docker_log_root, cfg.docker_log_max_mb)?;
                logger.line(&format!(
                    "Truncated {count} container log(s), reclaiming {}M",
                    bytes / (1024 * 1024)
                ));
                Ok(())
            },
        ));

        steps.push(ReclaimStep::new(
            "Docker container prune",
            move || cfg.prune_docker && docker.available(),
            move || docker.prune_containers(cfg.docker_prune_until_hours),
        ));
        steps.push(ReclaimStep::new(
            "Docker image prune",
            move || cfg.prune_docker && docker.available(),
            move || docker.prune_images(cfg.docker_prune_until_hours),
        ));
        steps.push(ReclaimStep::new(
            "Docker network prune",
            move || cfg.prune_docker && docker.available(),
            move || docker.prune_networks(cfg.docker_prune_until_hours),
        ));

        steps.push(ReclaimStep::new(
            "Docker volume prune",
            move || cfg.prune_docker && cfg.prune_docker_volumes && docker.available(),
            move || {
                let removed = prune_unused_volumes(
                    docker,
                    Utc::now(),
                    cfg.docker_prune_until_hours,
                    &protect,
                )?;
                logger.line(&format!("Removed {removed} unused volume(s)"));
                Ok(())
            },
        ));

        steps
    }
}
