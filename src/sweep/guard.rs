//! Concurrency guard: one engine run at a time, enforced with `flock()`.
//!
//! The lock is acquired non-blocking at process start on a fixed well-known
//! path and released automatically when the process ends. Contention is an
//! expected condition under frequent scheduling, not an error.

use std::fs::{File, OpenOptions};
use std::path::Path;

use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};

use crate::core::errors::{DswError, Result};

/// Well-known lock path shared by every invocation on the host.
pub const DEFAULT_LOCK_PATH: &str = "/tmp/disk-space-warden.lock";

/// Exclusive run-duration lock. Dropping it releases the lock.
#[derive(Debug)]
pub struct SweepGuard {
    _lock: Flock<File>,
}

impl SweepGuard {
    /// Try to acquire the exclusive lock without blocking.
    ///
    /// `Ok(None)` means another run holds it — the caller should bow out
    /// with exit 0.
    pub fn acquire(path: &Path) -> Result<Option<Self>> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| DswError::io(path, source))?;
        match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(lock) => Ok(Some(Self { _lock: lock })),
            Err((_file, Errno::EWOULDBLOCK)) => Ok(None),
            Err((_file, errno)) => Err(DswError::io(
                path,
                std::io::Error::from_raw_os_error(errno as i32),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SweepGuard;

    #[test]
    fn acquire_creates_lock_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("run.lock");
        let guard = SweepGuard::acquire(&path).expect("acquire should not error");
        assert!(guard.is_some());
        assert!(path.exists());
    }

    #[test]
    fn second_acquire_observes_contention() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("run.lock");
        let first = SweepGuard::acquire(&path).expect("first acquire");
        assert!(first.is_some());
        let second = SweepGuard::acquire(&path).expect("second acquire should not error");
        assert!(second.is_none(), "held lock must be observed as contention");
    }

    #[test]
    fn lock_is_released_on_drop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("run.lock");
        {
            let _guard = SweepGuard::acquire(&path).expect("acquire");
        }
        let again = SweepGuard::acquire(&path).expect("reacquire");
        assert!(again.is_some(), "dropped lock must be reacquirable");
    }

    #[test]
    fn unwritable_lock_path_is_io_error() {
        let err = SweepGuard::acquire(std::path::Path::new(
            "/no/such/dir/disk-space-warden.lock",
        ))
        .unwrap_err();
        assert_eq!(err.code(), "DSW-3002");
    }
}
