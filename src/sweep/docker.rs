//! Container-runtime reclamation: log truncation, age-filtered prunes, and
//! the protected volume pruner.
//!
//! Everything that talks to the runtime goes through [`DockerEngine`] so the
//! prune logic stays deterministic under test. The CLI implementation trusts
//! the runtime's own `until=` filter semantics — prune never touches running
//! containers, and no redundant liveness checks are layered on top.

#![allow(missing_docs)]

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use parking_lot::Mutex;
use regex::Regex;
use walkdir::WalkDir;

use crate::core::errors::{DswError, Result};
use crate::sweep::command;

/// Where the runtime keeps per-container JSON log files.
pub const DOCKER_LOG_ROOT: &str = "/var/lib/docker/containers";

/// Runtime surface the sweep needs.
pub trait DockerEngine: Send + Sync {
    /// Whether the runtime CLI is present on this host.
    fn available(&self) -> bool;
    /// Remove stopped containers older than `until_hours`.
    fn prune_containers(&self, until_hours: u64) -> Result<()>;
    /// Remove unused images (dangling and unreferenced) older than
    /// `until_hours`.
    fn prune_images(&self, until_hours: u64) -> Result<()>;
    /// Remove unused networks older than `until_hours`.
    fn prune_networks(&self, until_hours: u64) -> Result<()>;
    /// Names of volumes not attached to any container.
    fn dangling_volumes(&self) -> Result<Vec<String>>;
    /// Raw creation timestamp of one volume.
    fn volume_created_at(&self, name: &str) -> Result<String>;
    /// Remove one volume by name.
    fn remove_volume(&self, name: &str) -> Result<()>;
}

/// CLI-backed engine shelling out to `docker`.
#[derive(Debug, Default)]
pub struct DockerCli;

impl DockerEngine for DockerCli {
    fn available(&self) -> bool {
        command::tool_on_path("docker")
    }

    fn prune_containers(&self, until_hours: u64) -> Result<()> {
        command::run_quiet(
            "docker",
            &[
                "container",
                "prune",
                "-f",
                "--filter",
                &format!("until={until_hours}h"),
            ],
        )
    }

    fn prune_images(&self, until_hours: u64) -> Result<()> {
        command::run_quiet(
            "docker",
            &[
                "image",
                "prune",
                "-a",
                "-f",
                "--filter",
                &format!("until={until_hours}h"),
            ],
        )
    }

    fn prune_networks(&self, until_hours: u64) -> Result<()> {
        command::run_quiet(
            "docker",
            &[
                "network",
                "prune",
                "-f",
                "--filter",
                &format!("until={until_hours}h"),
            ],
        )
    }

    fn dangling_volumes(&self) -> Result<Vec<String>> {
        let out = command::capture("docker", &["volume", "ls", "-q", "--filter", "dangling=true"])?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn volume_created_at(&self, name: &str) -> Result<String> {
        let out = command::capture(
            "docker",
            &["volume", "inspect", "--format", "{{ .CreatedAt }}", name],
        )?;
        Ok(out.trim().to_string())
    }

    fn remove_volume(&self, name: &str) -> Result<()> {
        command::run_quiet("docker", &["volume", "rm", name])
    }
}

/// Truncate oversized container JSON logs in place.
///
/// The runtime holds an open handle on each log, so the file is never
/// deleted — `set_len(0)` keeps the inode and the runtime's descriptor
/// valid. Returns `(files_truncated, bytes_reclaimed)`; per-file failures
/// are skipped.
pub fn truncate_container_logs(root: &Path, max_mb: u64) -> Result<(u64, u64)> {
    let limit_bytes = max_mb.saturating_mul(1024 * 1024);
    let mut truncated = 0;
    let mut reclaimed = 0;
    if !root.exists() {
        return Ok((0, 0));
    }

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(2)
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !name.ends_with("-json.log") {
            continue;
        }
        let Ok(meta) = entry.path().metadata() else {
            continue;
        };
        if meta.len() <= limit_bytes {
            continue;
        }
        let opened = OpenOptions::new().write(true).open(entry.path());
        if let Ok(file) = opened
            && file.set_len(0).is_ok()
        {
            truncated += 1;
            reclaimed += meta.len();
        }
    }
    Ok((truncated, reclaimed))
}

/// Remove dangling volumes older than `age_hours`, honoring the protection
/// pattern as a hard veto.
///
/// Protection is checked before anything else; a protected name is never
/// inspected, aged, or removed. A volume whose creation timestamp cannot be
/// read or parsed is skipped — never remove what cannot be age-confirmed.
/// Individual removal failures are swallowed; only the aggregate count of
/// successful removals is reported.
pub fn prune_unused_volumes(
    engine: &dyn DockerEngine,
    now: DateTime<Utc>,
    age_hours: u64,
    protect: &Regex,
) -> Result<u64> {
    let cutoff = chrono::Duration::try_hours(i64::try_from(age_hours).unwrap_or(i64::MAX))
        .and_then(|age| now.checked_sub_signed(age))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let mut removed = 0;
    for name in engine.dangling_volumes()? {
        if protect.is_match(&name) {
            continue;
        }
        let Ok(raw) = engine.volume_created_at(&name) else {
            continue;
        };
        let Some(created) = parse_created_at(&raw) else {
            continue;
        };
        if created < cutoff && engine.remove_volume(&name).is_ok() {
            removed += 1;
        }
    }
    Ok(removed)
}

/// Parse the runtime's volume creation timestamp.
///
/// Newer runtimes emit RFC 3339 (`2024-06-01T10:00:00Z`); older ones emit
/// the Go default form (`2024-06-01 10:00:00 +0000 UTC`).
fn parse_created_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    let go_default = raw.strip_suffix(" UTC").unwrap_or(raw);
    if let Ok(parsed) = DateTime::parse_from_str(go_default, "%Y-%m-%d %H:%M:%S %z") {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(go_default, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Scripted engine for deterministic tests.
#[derive(Debug, Default)]
pub struct MockDocker {
    volumes: Vec<(String, Option<String>)>,
    fail_removal_of: HashSet<String>,
    removed: Mutex<Vec<String>>,
    pruned: Mutex<Vec<String>>,
}

impl MockDocker {
    /// Register a dangling volume; `created_at: None` makes its inspect
    /// call fail.
    #[must_use]
    pub fn with_volume(mut self, name: &str, created_at: Option<&str>) -> Self {
        self.volumes
            .push((name.to_string(), created_at.map(str::to_string)));
        self
    }

    /// Make removal of `name` fail.
    #[must_use]
    pub fn failing_removal(mut self, name: &str) -> Self {
        self.fail_removal_of.insert(name.to_string());
        self
    }

    #[must_use]
    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().clone()
    }

    #[must_use]
    pub fn pruned(&self) -> Vec<String> {
        self.pruned.lock().clone()
    }
}

impl DockerEngine for MockDocker {
    fn available(&self) -> bool {
        true
    }

    fn prune_containers(&self, until_hours: u64) -> Result<()> {
        self.pruned.lock().push(format!("container:{until_hours}h"));
        Ok(())
    }

    fn prune_images(&self, until_hours: u64) -> Result<()> {
        self.pruned.lock().push(format!("image:{until_hours}h"));
        Ok(())
    }

    fn prune_networks(&self, until_hours: u64) -> Result<()> {
        self.pruned.lock().push(format!("network:{until_hours}h"));
        Ok(())
    }

    fn dangling_volumes(&self) -> Result<Vec<String>> {
        Ok(self.volumes.iter().map(|(name, _)| name.clone()).collect())
    }

    fn volume_created_at(&self, name: &str) -> Result<String> {
        self.volumes
            .iter()
            .find(|(candidate, _)| candidate == name)
            .and_then(|(_, created)| created.clone())
            .ok_or_else(|| DswError::CommandOutput {
                program: "docker".to_string(),
                details: format!("no CreatedAt for {name}"),
            })
    }

    fn remove_volume(&self, name: &str) -> Result<()> {
        if self.fail_removal_of.contains(name) {
            return Err(DswError::CommandFailed {
                program: "docker".to_string(),
                code: 1,
            });
        }
        self.removed.lock().push(name.to_string());
        Ok(())
    }
}
