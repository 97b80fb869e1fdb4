//! Platform trait and implementations: statvfs-backed space sampling.

#![allow(missing_docs)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::core::errors::{DswError, Result};

/// One measurement of the target filesystem, in 1 KiB units.
///
/// Created by the probe, read by the evaluator and the report, then
/// discarded. Nothing persists across runs.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpaceSample {
    /// Space available to unprivileged writers, in 1 KiB blocks.
    pub available_kb: u64,
    /// Total inode slots on the filesystem; zero when the filesystem does
    /// not report inodes.
    pub total_inodes: u64,
    /// Unused inode slots.
    pub available_inodes: u64,
}

impl SpaceSample {
    /// Free-inode percentage, or `None` when the filesystem does not report
    /// inode counts.
    #[must_use]
    pub fn free_inode_pct(&self) -> Option<u64> {
        if self.total_inodes == 0 {
            return None;
        }
        Some(self.available_inodes.saturating_mul(100) / self.total_inodes)
    }

    /// Available space in whole GB (truncating).
    #[must_use]
    pub const fn available_gb(&self) -> u64 {
        self.available_kb / (1024 * 1024)
    }
}

/// OS surface the engine needs: one stat call.
pub trait Platform: Send + Sync {
    /// Sample the filesystem holding `path`.
    fn space_sample(&self, path: &Path) -> Result<SpaceSample>;
}

/// Linux implementation backed by `statvfs`.
#[cfg(unix)]
#[derive(Debug, Default)]
pub struct LinuxPlatform;

#[cfg(unix)]
impl Platform for LinuxPlatform {
    fn space_sample(&self, path: &Path) -> Result<SpaceSample> {
        let stat = nix::sys::statvfs::statvfs(path).map_err(|error| DswError::Probe {
            path: path.to_path_buf(),
            details: error.to_string(),
        })?;
        // Scale fragment-sized blocks down to the fixed 1 KiB unit so the
        // threshold comparison is block-size independent.
        let fragment = stat.fragment_size();
        let available_kb = stat.blocks_available().saturating_mul(fragment) / 1024;
        Ok(SpaceSample {
            available_kb,
            total_inodes: stat.files(),
            available_inodes: stat.files_available(),
        })
    }
}

/// Platform for the host this binary runs on.
#[cfg(unix)]
#[must_use]
pub fn system_platform() -> Arc<dyn Platform> {
    Arc::new(LinuxPlatform)
}

/// Scripted platform for deterministic tests.
///
/// Samples are served in FIFO order; once the queue drains, the steady
/// sample (if any) is repeated, otherwise further probes fail.
#[derive(Debug, Default)]
pub struct MockPlatform {
    queue: Mutex<VecDeque<std::result::Result<SpaceSample, String>>>,
    steady: Option<SpaceSample>,
}

impl MockPlatform {
    /// Always serve the same sample.
    #[must_use]
    pub fn steady(sample: SpaceSample) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            steady: Some(sample),
        }
    }

    /// Serve `samples` in order, then fall back to the last one.
    #[must_use]
    pub fn sequence(samples: Vec<SpaceSample>) -> Self {
        let steady = samples.last().copied();
        Self {
            queue: Mutex::new(samples.into_iter().map(Ok).collect()),
            steady,
        }
    }

    /// Fail every probe with `details`.
    #[must_use]
    pub fn failing(details: &str) -> Self {
        Self {
            queue: Mutex::new(VecDeque::from([Err(details.to_string())])),
            steady: None,
        }
    }

    /// Serve an explicit script of successes and failures, in order.
    #[must_use]
    pub fn script(outcomes: Vec<std::result::Result<SpaceSample, String>>) -> Self {
        Self {
            queue: Mutex::new(outcomes.into_iter().collect()),
            steady: None,
        }
    }
}

impl Platform for MockPlatform {
    fn space_sample(&self, path: &Path) -> Result<SpaceSample> {
        let next = self.queue.lock().pop_front();
        match next {
            Some(Ok(sample)) => Ok(sample),
            Some(Err(details)) => Err(DswError::Probe {
                path: path.to_path_buf(),
                details,
            }),
            None => self.steady.ok_or_else(|| DswError::Probe {
                path: path.to_path_buf(),
                details: "mock sample queue exhausted".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MockPlatform, Platform, SpaceSample};
    use std::path::Path;

    fn sample(available_kb: u64, total_inodes: u64, available_inodes: u64) -> SpaceSample {
        SpaceSample {
            available_kb,
            total_inodes,
            available_inodes,
        }
    }

    #[test]
    fn free_inode_pct_basic() {
        assert_eq!(sample(0, 1000, 30).free_inode_pct(), Some(3));
        assert_eq!(sample(0, 1000, 1000).free_inode_pct(), Some(100));
    }

    #[test]
    fn free_inode_pct_unreported() {
        assert_eq!(sample(0, 0, 0).free_inode_pct(), None);
    }

    #[test]
    fn available_gb_truncates() {
        assert_eq!(sample(1024 * 1024, 0, 0).available_gb(), 1);
        assert_eq!(sample(1024 * 1024 - 1, 0, 0).available_gb(), 0);
        assert_eq!(sample(50 * 1024 * 1024 + 7, 0, 0).available_gb(), 50);
    }

    #[test]
    fn mock_sequence_serves_in_order_then_repeats_last() {
        let platform = MockPlatform::sequence(vec![sample(10, 0, 0), sample(20, 0, 0)]);
        let path = Path::new("/");
        assert_eq!(platform.space_sample(path).unwrap().available_kb, 10);
        assert_eq!(platform.space_sample(path).unwrap().available_kb, 20);
        assert_eq!(platform.space_sample(path).unwrap().available_kb, 20);
    }

    #[test]
    fn mock_failing_returns_probe_error() {
        let platform = MockPlatform::failing("stat blew up");
        let err = platform.space_sample(Path::new("/data")).unwrap_err();
        assert_eq!(err.code(), "DSW-2001");
        assert!(err.to_string().contains("/data"));
    }

    #[cfg(unix)]
    #[test]
    fn linux_platform_samples_root() {
        let platform = super::LinuxPlatform;
        let s = platform
            .space_sample(Path::new("/"))
            .expect("statvfs on / should work");
        assert!(s.available_kb > 0, "root filesystem reports available space");
    }

    #[cfg(unix)]
    #[test]
    fn linux_platform_rejects_missing_path() {
        let platform = super::LinuxPlatform;
        let err = platform
            .space_sample(Path::new("/definitely/not/a/mount"))
            .unwrap_err();
        assert_eq!(err.code(), "DSW-2001");
    }
}
