#![forbid(unsafe_code)]

//! Disk Space Warden (dsw) — single-host disk-space guardian.
//!
//! One invocation, one sweep: probe free space and inode headroom on a
//! target filesystem, decide whether cleanup is needed, run an ordered
//! catalog of reclamation steps (package caches, journal vacuum, temp
//! expiry, rotated-log sweep, Docker pruning) with per-step fault
//! isolation, then report the space recovered. An external scheduler
//! supplies the environment and captures the log stream.
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use disk_space_warden::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use disk_space_warden::core::config::Config;
//! use disk_space_warden::sweep::engine::Engine;
//! ```

pub mod prelude;

pub mod core;
pub mod logger;
pub mod monitor;
pub mod platform;
pub mod sweep;

#[cfg(test)]
mod decision_tests;
