//! Metrics probe: free-space and inode-headroom sampling for one path.

use std::path::Path;
use std::sync::Arc;

use crate::core::errors::Result;
use crate::platform::pal::{Platform, SpaceSample};

/// Samples the filesystem under a target path.
///
/// Two samples are taken per run (before and after the sweep); a failed
/// before-sample is the run's only fatal condition.
pub struct SpaceProbe {
    platform: Arc<dyn Platform>,
}

impl SpaceProbe {
    #[must_use]
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self { platform }
    }

    /// Read one sample for `path`.
    pub fn sample(&self, path: &Path) -> Result<SpaceSample> {
        self.platform.space_sample(path)
    }
}
