//! Configuration system: environment-variable resolution with smart defaults.
//!
//! The warden is configured entirely through named environment variables (no
//! positional arguments, no config file): the external scheduler supplies the
//! environment. Resolution happens once at startup; the resulting [`Config`]
//! is immutable and threaded through every component. Unparseable values fall
//! back to the field default with a warning line — an operator typo must not
//! take the guardian offline.

#![allow(missing_docs)]

use std::env;
use std::path::PathBuf;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::errors::{DswError, Result};

/// Default volume-name protection pattern: production and backup volumes are
/// never pruned regardless of age.
pub const DEFAULT_PROTECT_VOLUME_REGEX: &str = "^prod_|^backup_";

/// Full warden configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Free-space floor in whole GB below which cleanup triggers.
    pub threshold_gb: u64,
    /// Filesystem to probe and defend.
    pub target_path: PathBuf,
    /// Free-inode percentage floor that force-triggers cleanup.
    pub inode_low_pct: u64,
    /// Journal retention in days (time-based vacuum).
    pub journal_retain_days: u64,
    /// Journal size bound passed verbatim to the vacuum tool (e.g. "200M").
    /// "0" or empty disables size-based vacuuming; when set it takes
    /// precedence over `journal_retain_days`.
    pub journal_max_size: String,
    /// Temp-file age threshold in days.
    pub tmp_retain_days: u64,
    /// Rotated-log age threshold in days.
    pub log_archive_retain_days: u64,
    /// Enable the container-runtime prune family.
    pub prune_docker: bool,
    /// Enable the volume sub-prune (only honored when `prune_docker` is set).
    pub prune_docker_volumes: bool,
    /// Age filter for the prune family, in hours.
    pub docker_prune_until_hours: u64,
    /// Enable the container log truncation step.
    pub truncate_docker_logs: bool,
    /// Container log size threshold in MB for truncation.
    pub docker_log_max_mb: u64,
    /// Volume-name veto pattern (anchored regex source).
    pub protect_volume_regex: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold_gb: 10,
            target_path: PathBuf::from("/"),
            inode_low_pct: 2,
            journal_retain_days: 7,
            journal_max_size: "0".to_string(),
            tmp_retain_days: 7,
            log_archive_retain_days: 14,
            prune_docker: false,
            prune_docker_volumes: false,
            docker_prune_until_hours: 168,
            truncate_docker_logs: false,
            docker_log_max_mb: 100,
            protect_volume_regex: DEFAULT_PROTECT_VOLUME_REGEX.to_string(),
        }
    }
}

impl Config {
    /// Resolve configuration from the process environment.
    ///
    /// Returns the config plus any warnings produced while falling back from
    /// unparseable values; the caller is expected to log them.
    #[must_use]
    pub fn from_env() -> (Self, Vec<String>) {
        Self::resolve_from(env_var)
    }

    /// Resolve configuration from an arbitrary variable lookup.
    pub fn resolve_from<F>(mut lookup: F) -> (Self, Vec<String>)
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let mut warnings = Vec::new();

        set_u64("THRESHOLD_GB", &mut cfg.threshold_gb, &mut lookup, &mut warnings);
        if let Some(raw) = lookup("TARGET_PATH") {
            cfg.target_path = PathBuf::from(raw);
        }
        set_u64("INODE_LOW_PCT", &mut cfg.inode_low_pct, &mut lookup, &mut warnings);
        set_u64(
            "JOURNAL_RETAIN_DAYS",
            &mut cfg.journal_retain_days,
            &mut lookup,
            &mut warnings,
        );
        if let Some(raw) = lookup("JOURNAL_MAX_SIZE") {
            cfg.journal_max_size = raw;
        }
        set_u64("TMP_RETAIN_DAYS", &mut cfg.tmp_retain_days, &mut lookup, &mut warnings);
        set_u64(
            "LOG_ARCHIVE_RETAIN_DAYS",
            &mut cfg.log_archive_retain_days,
            &mut lookup,
            &mut warnings,
        );
        set_flag("PRUNE_DOCKER", &mut cfg.prune_docker, &mut lookup, &mut warnings);
        set_flag(
            "PRUNE_DOCKER_VOLUMES",
            &mut cfg.prune_docker_volumes,
            &mut lookup,
            &mut warnings,
        );
        set_u64(
            "DOCKER_PRUNE_UNTIL_HOURS",
            &mut cfg.docker_prune_until_hours,
            &mut lookup,
            &mut warnings,
        );
        set_flag(
            "TRUNCATE_DOCKER_LOGS",
            &mut cfg.truncate_docker_logs,
            &mut lookup,
            &mut warnings,
        );
        set_u64(
            "DOCKER_LOG_MAX_MB",
            &mut cfg.docker_log_max_mb,
            &mut lookup,
            &mut warnings,
        );
        if let Some(raw) = lookup("PROTECT_VOLUME_REGEX") {
            if Regex::new(&raw).is_ok() {
                cfg.protect_volume_regex = raw;
            } else {
                warnings.push(format!(
                    "PROTECT_VOLUME_REGEX={raw:?} does not compile; keeping default {DEFAULT_PROTECT_VOLUME_REGEX:?}"
                ));
            }
        }

        if cfg.inode_low_pct > 100 {
            warnings.push(format!(
                "INODE_LOW_PCT={} exceeds 100; keeping default 2",
                cfg.inode_low_pct
            ));
            cfg.inode_low_pct = 2;
        }
        if cfg.threshold_gb == 0 {
            warnings.push("THRESHOLD_GB=0 disables triggering; keeping default 10".to_string());
            cfg.threshold_gb = 10;
        }

        (cfg, warnings)
    }

    /// Validate a hand-built configuration (library use; `resolve_from`
    /// already repairs its output).
    pub fn validate(&self) -> Result<()> {
        if self.threshold_gb == 0 {
            return Err(DswError::InvalidConfig {
                details: "threshold_gb must be >= 1".to_string(),
            });
        }
        if self.target_path.as_os_str().is_empty() {
            return Err(DswError::InvalidConfig {
                details: "target_path must not be empty".to_string(),
            });
        }
        if self.inode_low_pct > 100 {
            return Err(DswError::InvalidConfig {
                details: format!("inode_low_pct must be in [0, 100], got {}", self.inode_low_pct),
            });
        }
        if Regex::new(&self.protect_volume_regex).is_err() {
            return Err(DswError::InvalidConfig {
                details: format!(
                    "protect_volume_regex {:?} does not compile",
                    self.protect_volume_regex
                ),
            });
        }
        Ok(())
    }

    /// Trigger threshold in 1 KiB units.
    #[must_use]
    pub const fn threshold_kb(&self) -> u64 {
        self.threshold_gb * 1024 * 1024
    }

    /// Whether size-based journal vacuuming is enabled (takes precedence over
    /// the time-based bound).
    #[must_use]
    pub fn journal_size_enabled(&self) -> bool {
        !self.journal_max_size.trim().is_empty() && self.journal_max_size.trim() != "0"
    }

    /// Compiled volume-name veto pattern.
    pub fn protect_pattern(&self) -> Result<Regex> {
        Regex::new(&self.protect_volume_regex).map_err(|error| DswError::InvalidConfig {
            details: format!("protect_volume_regex: {error}"),
        })
    }

    /// One-line key=value summary for the startup log.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "threshold_gb={} target={} inode_low_pct={} journal_retain_days={} \
             journal_max_size={} tmp_retain_days={} log_archive_retain_days={} \
             prune_docker={} prune_docker_volumes={} docker_prune_until_hours={} \
             truncate_docker_logs={} docker_log_max_mb={}",
            self.threshold_gb,
            self.target_path.display(),
            self.inode_low_pct,
            self.journal_retain_days,
            self.journal_max_size,
            self.tmp_retain_days,
            self.log_archive_retain_days,
            u8::from(self.prune_docker),
            u8::from(self.prune_docker_volumes),
            self.docker_prune_until_hours,
            u8::from(self.truncate_docker_logs),
            self.docker_log_max_mb,
        )
    }

    /// Deterministic hash of the effective config for the startup log.
    ///
    /// FNV-1a over the canonical JSON form: stable across processes and Rust
    /// releases, unlike `DefaultHasher`.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn set_u64<F>(name: &str, slot: &mut u64, lookup: &mut F, warnings: &mut Vec<String>)
where
    F: FnMut(&str) -> Option<String>,
{
    if let Some(raw) = lookup(name) {
        match raw.trim().parse::<u64>() {
            Ok(value) => *slot = value,
            Err(error) => warnings.push(format!("{name}={raw:?}: {error}; keeping default {slot}")),
        }
    }
}

fn set_flag<F>(name: &str, slot: &mut bool, lookup: &mut F, warnings: &mut Vec<String>)
where
    F: FnMut(&str) -> Option<String>,
{
    if let Some(raw) = lookup(name) {
        match raw.trim() {
            "1" | "true" | "yes" => *slot = true,
            "0" | "false" | "no" => *slot = false,
            other => warnings.push(format!(
                "{name}={other:?} is not a flag value (0/1/true/false); keeping default {slot}"
            )),
        }
    }
}
