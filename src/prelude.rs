//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use disk_space_warden::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{DswError, Result};

// Logging
pub use crate::logger::line::{LogSink, MemorySink, RunLogger};

// Platform
pub use crate::platform::pal::{MockPlatform, Platform, SpaceSample};

// Monitor
pub use crate::monitor::probe::SpaceProbe;
pub use crate::monitor::trigger::{Decision, TriggerReason, evaluate};

// Sweep
pub use crate::sweep::catalog::{Catalog, SweepPaths};
pub use crate::sweep::docker::{DockerCli, DockerEngine, MockDocker};
pub use crate::sweep::engine::Engine;
pub use crate::sweep::guard::SweepGuard;
pub use crate::sweep::report::{RunOutcome, SweepStatus};
pub use crate::sweep::runner::{ReclaimStep, StepRunner, StepStatus};
