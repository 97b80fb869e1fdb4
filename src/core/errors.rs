//! DSW-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, DswError>;

/// Top-level error type for Disk Space Warden.
#[derive(Debug, Error)]
pub enum DswError {
    #[error("[DSW-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[DSW-2001] space probe failure for {path}: {details}")]
    Probe { path: PathBuf, details: String },

    #[error("[DSW-2101] {program} exited with status {code}")]
    CommandFailed { program: String, code: i32 },

    #[error("[DSW-2102] failed to spawn {program}: {source}")]
    CommandSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("[DSW-2103] unreadable output from {program}: {details}")]
    CommandOutput { program: String, details: String },

    #[error("[DSW-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DswError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "DSW-1001",
            Self::Probe { .. } => "DSW-2001",
            Self::CommandFailed { .. } => "DSW-2101",
            Self::CommandSpawn { .. } => "DSW-2102",
            Self::CommandOutput { .. } => "DSW-2103",
            Self::Io { .. } => "DSW-3002",
        }
    }

    /// Numeric status reported in a step's `FAILED ({code})` log line.
    ///
    /// External tools keep their own exit status; everything else maps to 1.
    #[must_use]
    pub const fn step_code(&self) -> i32 {
        match self {
            Self::CommandFailed { code, .. } => *code,
            _ => 1,
        }
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for DswError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidConfig {
            details: format!("serde_json: {value}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_variants() -> Vec<DswError> {
        vec![
            DswError::InvalidConfig {
                details: String::new(),
            },
            DswError::Probe {
                path: PathBuf::new(),
                details: String::new(),
            },
            DswError::CommandFailed {
                program: "apt-get".to_string(),
                code: 100,
            },
            DswError::CommandSpawn {
                program: "docker".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            },
            DswError::CommandOutput {
                program: "docker".to_string(),
                details: String::new(),
            },
            DswError::Io {
                path: PathBuf::new(),
                source: std::io::Error::other("test"),
            },
        ]
    }

    #[test]
    fn error_codes_are_unique() {
        let variants = all_variants();
        let codes: Vec<&str> = variants.iter().map(DswError::code).collect();
        let unique: std::collections::HashSet<&&str> = codes.iter().collect();
        assert_eq!(
            codes.len(),
            unique.len(),
            "error codes must be unique: {codes:?}"
        );
    }

    #[test]
    fn error_codes_have_dsw_prefix() {
        for err in &all_variants() {
            assert!(
                err.code().starts_with("DSW-"),
                "code {} must start with DSW-",
                err.code()
            );
        }
    }

    #[test]
    fn error_display_includes_code() {
        let err = DswError::InvalidConfig {
            details: "bad value".to_string(),
        };
        let msg = err.to_string();
        assert!(
            msg.contains("DSW-1001"),
            "display should contain error code: {msg}"
        );
        assert!(
            msg.contains("bad value"),
            "display should contain details: {msg}"
        );
    }

    #[test]
    fn step_code_preserves_tool_exit_status() {
        let err = DswError::CommandFailed {
            program: "journalctl".to_string(),
            code: 73,
        };
        assert_eq!(err.step_code(), 73);
    }

    #[test]
    fn step_code_defaults_to_one() {
        let err = DswError::io(
            "/tmp/x",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope"),
        );
        assert_eq!(err.step_code(), 1);
    }

    #[test]
    fn io_convenience_constructor() {
        let err = DswError::io(
            "/var/log/syslog.1",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.code(), "DSW-3002");
        assert!(err.to_string().contains("/var/log/syslog.1"));
    }
}
