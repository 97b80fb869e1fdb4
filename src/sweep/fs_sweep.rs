//! Temp-tree expiry: stale regular files, then stale now-empty directories.
//!
//! Files go first so directories can become empty from the file pass before
//! the directory pass sees them. The two passes are not atomic; a file
//! recreated mid-sweep simply survives until the next run.

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use walkdir::WalkDir;

use crate::core::errors::{DswError, Result};

const SECS_PER_DAY: u64 = 86_400;

/// Delete regular files under `root` whose mtime is older than
/// `retain_days`. Returns the number removed; per-file failures are skipped.
pub fn remove_stale_files(root: &Path, retain_days: u64) -> Result<u64> {
    let cutoff = age_cutoff(retain_days);
    if !root.exists() {
        return Err(DswError::io(
            root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "sweep root missing"),
        ));
    }

    let mut removed = 0;
    for entry in WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        if is_older_than(entry.path(), cutoff) && fs::remove_file(entry.path()).is_ok() {
            removed += 1;
        }
    }
    Ok(removed)
}

/// Delete empty directories under `root` older than `retain_days`.
///
/// Walks contents-first; removing a child refreshes the parent's mtime, so
/// nested trees collapse one level per run. Non-empty directories fail
/// `remove_dir` and are skipped.
pub fn remove_stale_empty_dirs(root: &Path, retain_days: u64) -> Result<u64> {
    let cutoff = age_cutoff(retain_days);
    if !root.exists() {
        return Err(DswError::io(
            root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "sweep root missing"),
        ));
    }

    let mut removed = 0;
    for entry in WalkDir::new(root)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        if !entry.file_type().is_dir() {
            continue;
        }
        if is_older_than(entry.path(), cutoff) && fs::remove_dir(entry.path()).is_ok() {
            removed += 1;
        }
    }
    Ok(removed)
}

fn age_cutoff(retain_days: u64) -> SystemTime {
    SystemTime::now()
        .checked_sub(Duration::from_secs(retain_days.saturating_mul(SECS_PER_DAY)))
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

fn is_older_than(path: &Path, cutoff: SystemTime) -> bool {
    path.metadata()
        .and_then(|meta| meta.modified())
        .is_ok_and(|mtime| mtime < cutoff)
}

#[cfg(test)]
mod tests {
    use super::{remove_stale_empty_dirs, remove_stale_files};
    use filetime::{FileTime, set_file_mtime};
    use std::fs;
    use std::path::Path;
    use std::time::{Duration, SystemTime};

    fn backdate(path: &Path, days: u64) {
        let then = SystemTime::now() - Duration::from_secs(days * 86_400);
        set_file_mtime(path, FileTime::from_system_time(then)).expect("set mtime");
    }

    #[test]
    fn removes_only_files_older_than_retention() {
        let dir = tempfile::tempdir().expect("tempdir");
        let old = dir.path().join("stale.tmp");
        let fresh = dir.path().join("fresh.tmp");
        fs::write(&old, b"x").expect("write");
        fs::write(&fresh, b"x").expect("write");
        backdate(&old, 10);

        let removed = remove_stale_files(dir.path(), 7).expect("sweep");
        assert_eq!(removed, 1);
        assert!(!old.exists());
        assert!(fresh.exists());
    }

    #[test]
    fn file_pass_leaves_directories_alone() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sub = dir.path().join("old-dir");
        fs::create_dir(&sub).expect("mkdir");
        backdate(&sub, 10);

        let removed = remove_stale_files(dir.path(), 7).expect("sweep");
        assert_eq!(removed, 0);
        assert!(sub.exists());
    }

    #[test]
    fn removes_old_empty_dirs_but_not_populated_ones() {
        let dir = tempfile::tempdir().expect("tempdir");
        let empty = dir.path().join("empty");
        let full = dir.path().join("full");
        fs::create_dir(&empty).expect("mkdir");
        fs::create_dir(&full).expect("mkdir");
        fs::write(full.join("keep.txt"), b"x").expect("write");
        backdate(&empty, 10);
        backdate(&full, 10);

        let removed = remove_stale_empty_dirs(dir.path(), 7).expect("sweep");
        assert_eq!(removed, 1);
        assert!(!empty.exists());
        assert!(full.exists());
        assert!(full.join("keep.txt").exists());
    }

    #[test]
    fn nested_empty_dirs_collapse_innermost_first() {
        let dir = tempfile::tempdir().expect("tempdir");
        let outer = dir.path().join("a");
        let inner = outer.join("b");
        fs::create_dir_all(&inner).expect("mkdir");
        backdate(&inner, 10);
        backdate(&outer, 10);

        // Removing the inner dir refreshes the outer dir's mtime, so one
        // level collapses per pass.
        let removed = remove_stale_empty_dirs(dir.path(), 7).expect("sweep");
        assert_eq!(removed, 1);
        assert!(!inner.exists());
        assert!(outer.exists());

        backdate(&outer, 10);
        assert_eq!(remove_stale_empty_dirs(dir.path(), 7).expect("sweep"), 1);
        assert!(!outer.exists());
    }

    #[test]
    fn fresh_empty_dirs_survive() {
        let dir = tempfile::tempdir().expect("tempdir");
        let empty = dir.path().join("empty");
        fs::create_dir(&empty).expect("mkdir");

        let removed = remove_stale_empty_dirs(dir.path(), 7).expect("sweep");
        assert_eq!(removed, 0);
        assert!(empty.exists());
    }

    #[test]
    fn emptied_dir_is_collected_once_its_mtime_ages_out() {
        // The file pass empties the directory but deletion refreshes the
        // dir's mtime, so the dir pass collects it on a later run once the
        // mtime ages past retention again.
        let dir = tempfile::tempdir().expect("tempdir");
        let sub = dir.path().join("workdir");
        fs::create_dir(&sub).expect("mkdir");
        let file = sub.join("scratch.bin");
        fs::write(&file, b"x").expect("write");
        backdate(&file, 10);
        backdate(&sub, 10);

        assert_eq!(remove_stale_files(dir.path(), 7).expect("files"), 1);
        assert_eq!(
            remove_stale_empty_dirs(dir.path(), 7).expect("dirs"),
            0,
            "deletion refreshed the dir mtime this run"
        );
        backdate(&sub, 10);
        assert_eq!(remove_stale_empty_dirs(dir.path(), 7).expect("dirs"), 1);
        assert!(!sub.exists());
    }

    #[test]
    fn missing_root_is_an_error() {
        let err = remove_stale_files(Path::new("/no/such/sweep/root"), 7).unwrap_err();
        assert_eq!(err.code(), "DSW-3002");
        let err = remove_stale_empty_dirs(Path::new("/no/such/sweep/root"), 7).unwrap_err();
        assert_eq!(err.code(), "DSW-3002");
    }

    #[test]
    fn zero_retention_removes_everything_with_past_mtime() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("any.tmp");
        fs::write(&file, b"x").expect("write");
        backdate(&file, 1);

        let removed = remove_stale_files(dir.path(), 0).expect("sweep");
        assert_eq!(removed, 1);
    }
}
