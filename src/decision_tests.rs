//! Property coverage for the trigger decision plane.

use proptest::prelude::*;

use crate::core::config::Config;
use crate::monitor::trigger::{TriggerReason, evaluate};
use crate::platform::pal::SpaceSample;

fn config(threshold_gb: u64, inode_low_pct: u64) -> Config {
    Config {
        threshold_gb,
        inode_low_pct,
        ..Config::default()
    }
}

proptest! {
    /// The decision is exactly the disjunction of the two signals, and the
    /// reason names the winning one (inodes take precedence).
    #[test]
    fn decision_matches_signal_disjunction(
        available_kb in 0u64..=(1 << 40),
        total_inodes in 0u64..=(1 << 32),
        inode_seed in 0u64..=(1 << 32),
        threshold_gb in 1u64..=2048,
        inode_low_pct in 0u64..=100,
    ) {
        let available_inodes = if total_inodes == 0 { 0 } else { inode_seed % (total_inodes + 1) };
        let sample = SpaceSample { available_kb, total_inodes, available_inodes };
        let cfg = config(threshold_gb, inode_low_pct);

        let inode_low = total_inodes > 0
            && available_inodes.saturating_mul(100) / total_inodes < inode_low_pct;
        let space_short = available_kb < threshold_gb * 1024 * 1024;

        let decision = evaluate(&sample, &cfg);
        prop_assert_eq!(decision.triggered, inode_low || space_short);
        let expected_reason = if inode_low {
            TriggerReason::InodeLow
        } else if space_short {
            TriggerReason::SpaceShort
        } else {
            TriggerReason::Ok
        };
        prop_assert_eq!(decision.reason, expected_reason);
    }

    /// Free space exactly at the threshold never triggers on space.
    #[test]
    fn exact_threshold_never_triggers_on_space(threshold_gb in 1u64..=2048) {
        let sample = SpaceSample {
            available_kb: threshold_gb * 1024 * 1024,
            total_inodes: 1000,
            available_inodes: 1000,
        };
        let decision = evaluate(&sample, &config(threshold_gb, 2));
        prop_assert!(!decision.triggered);
    }

    /// Raising the threshold never un-triggers a space-short decision.
    #[test]
    fn space_trigger_is_monotone_in_threshold(
        available_kb in 0u64..=(1 << 40),
        threshold_gb in 1u64..=2047,
    ) {
        let sample = SpaceSample {
            available_kb,
            total_inodes: 1000,
            available_inodes: 1000,
        };
        let at = evaluate(&sample, &config(threshold_gb, 0)).triggered;
        let above = evaluate(&sample, &config(threshold_gb + 1, 0)).triggered;
        prop_assert!(!at || above, "triggered at {threshold_gb} but not at {}", threshold_gb + 1);
    }

    /// A zero-inode filesystem always gets a space-only decision.
    #[test]
    fn no_inode_reporting_never_yields_inode_reason(
        available_kb in 0u64..=(1 << 40),
        threshold_gb in 1u64..=2048,
        inode_low_pct in 0u64..=100,
    ) {
        let sample = SpaceSample { available_kb, total_inodes: 0, available_inodes: 0 };
        let decision = evaluate(&sample, &config(threshold_gb, inode_low_pct));
        prop_assert_ne!(decision.reason, TriggerReason::InodeLow);
    }
}
