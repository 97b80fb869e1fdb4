//! Quiet subprocess invocation: suppressed streams, captured exit status.

use std::env;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::core::errors::{DswError, Result};

/// Run an external tool with stdout/stderr discarded.
///
/// The child's streams never reach the run transcript; only its numeric
/// completion status survives, as a [`DswError::CommandFailed`] on non-zero
/// exit.
pub fn run_quiet(program: &str, args: &[&str]) -> Result<()> {
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|source| DswError::CommandSpawn {
            program: program.to_string(),
            source,
        })?;
    if status.success() {
        Ok(())
    } else {
        Err(DswError::CommandFailed {
            program: program.to_string(),
            code: status.code().unwrap_or(1),
        })
    }
}

/// Run an external tool and capture its stdout (stderr discarded).
pub fn capture(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|source| DswError::CommandSpawn {
            program: program.to_string(),
            source,
        })?;
    if !output.status.success() {
        return Err(DswError::CommandFailed {
            program: program.to_string(),
            code: output.status.code().unwrap_or(1),
        });
    }
    String::from_utf8(output.stdout).map_err(|error| DswError::CommandOutput {
        program: program.to_string(),
        details: error.to_string(),
    })
}

/// Whether an executable with this name exists on `PATH`.
#[must_use]
pub fn tool_on_path(name: &str) -> bool {
    let Some(path) = env::var_os("PATH") else {
        return false;
    };
    env::split_paths(&path).any(|dir| is_executable(&dir.join(name)))
}

#[cfg(unix)]
fn is_executable(candidate: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    candidate
        .metadata()
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(candidate: &Path) -> bool {
    candidate.is_file()
}

#[cfg(test)]
mod tests {
    use super::{capture, run_quiet, tool_on_path};

    #[test]
    fn run_quiet_success() {
        run_quiet("true", &[]).expect("true exits zero");
    }

    #[test]
    fn run_quiet_captures_exit_code() {
        let err = run_quiet("false", &[]).unwrap_err();
        assert_eq!(err.code(), "DSW-2101");
        assert_eq!(err.step_code(), 1);
    }

    #[test]
    fn run_quiet_missing_tool_is_spawn_error() {
        let err = run_quiet("dsw-no-such-tool-xyz", &[]).unwrap_err();
        assert_eq!(err.code(), "DSW-2102");
    }

    #[test]
    fn capture_returns_stdout() {
        let out = capture("echo", &["hello"]).expect("echo works");
        assert_eq!(out.trim(), "hello");
    }

    #[test]
    fn capture_propagates_failure() {
        let err = capture("false", &[]).unwrap_err();
        assert_eq!(err.code(), "DSW-2101");
    }

    #[test]
    fn tool_on_path_finds_shell() {
        assert!(tool_on_path("sh"));
    }

    #[test]
    fn tool_on_path_rejects_unknown() {
        assert!(!tool_on_path("dsw-no-such-tool-xyz"));
    }
}
