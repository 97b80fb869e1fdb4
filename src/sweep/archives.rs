//! Rotated-log sweep: aged archive copies under the log root.
//!
//! A file qualifies only when its name carries a rotation marker — a
//! compression extension, a trailing numeric rotation suffix, or an
//! `-old`/`.old` tail. Live logs have bare names and can never match; the
//! match is on the filename shape, not on content or age.

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use regex::Regex;
use walkdir::WalkDir;

use crate::core::errors::{DswError, Result};

const SECS_PER_DAY: u64 = 86_400;

/// Filename classifier for archived log copies.
#[derive(Debug, Clone)]
pub struct RotationMatcher {
    marker: Regex,
}

impl RotationMatcher {
    /// Build the default marker set: `.gz`/`.xz`/`.bz2`/`.zst`, a trailing
    /// `.N` rotation counter, or an `-old`/`.old` suffix.
    pub fn new() -> Result<Self> {
        let marker =
            Regex::new(r"(?:\.(?:gz|xz|bz2|zst)|\.\d+|[-.]old)$").map_err(|error| {
                DswError::InvalidConfig {
                    details: format!("rotation marker pattern: {error}"),
                }
            })?;
        Ok(Self { marker })
    }

    /// Whether this filename is an archived rotation, never a live log.
    #[must_use]
    pub fn is_rotated(&self, file_name: &str) -> bool {
        self.marker.is_match(file_name)
    }
}

/// Delete rotated log files under `root` older than `retain_days`.
///
/// Returns the number removed; per-file failures are skipped.
pub fn remove_stale_archives(
    root: &Path,
    retain_days: u64,
    matcher: &RotationMatcher,
) -> Result<u64> {
    if !root.exists() {
        return Err(DswError::io(
            root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "log root missing"),
        ));
    }
    let cutoff = SystemTime::now()
        .checked_sub(Duration::from_secs(retain_days.saturating_mul(SECS_PER_DAY)))
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let mut removed = 0;
    for entry in WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !matcher.is_rotated(name) {
            continue;
        }
        let old_enough = entry
            .path()
            .metadata()
            .and_then(|meta| meta.modified())
            .is_ok_and(|mtime| mtime < cutoff);
        if old_enough && fs::remove_file(entry.path()).is_ok() {
            removed += 1;
        }
    }
    Ok(removed)
}
