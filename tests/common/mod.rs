//! Shared helpers for integration tests: binary resolution and case runner.

use std::path::PathBuf;
use std::process::{Command, ExitStatus};

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

fn resolve_bin_path() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_dsw") {
        return PathBuf::from(path);
    }

    let exe_name = if cfg!(windows) { "dsw.exe" } else { "dsw" };
    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join(exe_name));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve dsw binary path for integration test"),
    }
}

/// Run the built binary with a scrubbed warden environment plus the given
/// overrides, capturing both streams.
pub fn run_cli_case(args: &[&str], envs: &[(&str, &str)]) -> CmdResult {
    let mut command = Command::new(resolve_bin_path());
    command.args(args);
    for key in [
        "THRESHOLD_GB",
        "TARGET_PATH",
        "PRUNE_DOCKER",
        "PRUNE_DOCKER_VOLUMES",
        "DOCKER_PRUNE_UNTIL_HOURS",
        "JOURNAL_RETAIN_DAYS",
        "JOURNAL_MAX_SIZE",
        "TMP_RETAIN_DAYS",
        "LOG_ARCHIVE_RETAIN_DAYS",
        "TRUNCATE_DOCKER_LOGS",
        "DOCKER_LOG_MAX_MB",
        "INODE_LOW_PCT",
        "PROTECT_VOLUME_REGEX",
        "DSW_LOCK_PATH",
    ] {
        command.env_remove(key);
    }
    for (key, value) in envs {
        command.env(key, value);
    }

    let output = command.output().expect("failed to run dsw binary");
    CmdResult {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}
