//! Trigger evaluator: folds the space and inode signals into one decision.

#![allow(missing_docs)]

use crate::core::config::Config;
use crate::platform::pal::SpaceSample;

/// Why the run did (or did not) trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Available space fell below the configured threshold.
    SpaceShort,
    /// Free-inode percentage fell below the configured floor; overrides the
    /// space comparison.
    InodeLow,
    /// Neither signal fired.
    Ok,
}

/// Outcome of evaluating one before-sample against the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub triggered: bool,
    pub reason: TriggerReason,
}

impl Decision {
    /// Log record describing the decision.
    ///
    /// The inode-low path still reads as a space-deficit message so the
    /// downstream transcript keeps one shape; the real cause is appended.
    #[must_use]
    pub fn log_line(&self, sample: &SpaceSample, cfg: &Config) -> String {
        match self.reason {
            TriggerReason::SpaceShort => format!(
                "Free space {}G is below threshold {}G; starting cleanup",
                sample.available_gb(),
                cfg.threshold_gb
            ),
            TriggerReason::InodeLow => format!(
                "Free space treated as below threshold {}G (inode headroom {}% under floor {}%); starting cleanup",
                cfg.threshold_gb,
                sample.free_inode_pct().unwrap_or(0),
                cfg.inode_low_pct
            ),
            TriggerReason::Ok => format!(
                "Free space {}G meets threshold {}G; nothing to do",
                sample.available_gb(),
                cfg.threshold_gb
            ),
        }
    }
}

/// Evaluate the dual space + inode condition.
///
/// The inode floor is checked first and wins outright; a filesystem that
/// does not report inodes gets a space-only decision. Free space exactly at
/// the threshold does not trigger.
#[must_use]
pub fn evaluate(sample: &SpaceSample, cfg: &Config) -> Decision {
    if let Some(pct) = sample.free_inode_pct()
        && pct < cfg.inode_low_pct
    {
        return Decision {
            triggered: true,
            reason: TriggerReason::InodeLow,
        };
    }

    if sample.available_kb < cfg.threshold_kb() {
        Decision {
            triggered: true,
            reason: TriggerReason::SpaceShort,
        }
    } else {
        Decision {
            triggered: false,
            reason: TriggerReason::Ok,
        }
    }
}

/// The report-time comparison: does the after-sample now satisfy the space
/// threshold? Inode state is deliberately ignored here.
#[must_use]
pub const fn space_recovered(sample: &SpaceSample, cfg: &Config) -> bool {
    sample.available_kb >= cfg.threshold_kb()
}
