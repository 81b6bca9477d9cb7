//! Change detection for a single (source, artifact) pair.

use std::io::ErrorKind;
use std::path::Path;

use crate::error::{inconsistent, io_err, SyncError};
use crate::storage::Storage;

/// Decide whether `target` is stale with respect to `source`.
///
/// - Missing target → `true`.
/// - Otherwise `true` iff the source mtime is strictly greater than the
///   target mtime. Equal timestamps are not an update.
///
/// A source whose stats cannot be read is an I/O error on the source path.
/// A target that exists but has no readable stats is
/// [`SyncError::Inconsistent`]; it is never resolved to either answer.
pub fn needs_update<S: Storage + ?Sized>(
    storage: &S,
    source: &Path,
    target: &Path,
) -> Result<bool, SyncError> {
    if !storage.exists(target)? {
        return Ok(true);
    }

    let source_stats = storage.stats(source)?.ok_or_else(|| {
        io_err(
            source,
            std::io::Error::new(ErrorKind::NotFound, "source file disappeared"),
        )
    })?;
    let target_stats = storage
        .stats(target)?
        .ok_or_else(|| inconsistent(target, "target exists but its stats are unavailable"))?;

    Ok(source_stats.modified > target_stats.modified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryStorage, Op};
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime};

    fn t(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn paths() -> (PathBuf, PathBuf) {
        (PathBuf::from("/docs/a.md"), PathBuf::from("/out/a.mdc"))
    }

    #[test]
    fn missing_target_needs_update() {
        let (src, dst) = paths();
        let storage = MemoryStorage::new();
        storage.insert_file(&src, "x", t(10));
        assert!(needs_update(&storage, &src, &dst).unwrap());
    }

    #[test]
    fn newer_source_needs_update() {
        let (src, dst) = paths();
        let storage = MemoryStorage::new();
        storage.insert_file(&src, "x", t(20));
        storage.insert_file(&dst, "x", t(10));
        assert!(needs_update(&storage, &src, &dst).unwrap());
    }

    #[test]
    fn equal_timestamps_do_not_need_update() {
        let (src, dst) = paths();
        let storage = MemoryStorage::new();
        storage.insert_file(&src, "x", t(10));
        storage.insert_file(&dst, "x", t(10));
        assert!(!needs_update(&storage, &src, &dst).unwrap());
    }

    #[test]
    fn older_source_does_not_need_update() {
        let (src, dst) = paths();
        let storage = MemoryStorage::new();
        storage.insert_file(&src, "x", t(5));
        storage.insert_file(&dst, "x", t(10));
        assert!(!needs_update(&storage, &src, &dst).unwrap());
    }

    #[test]
    fn missing_source_is_an_error_on_the_source_path() {
        let (src, dst) = paths();
        let storage = MemoryStorage::new();
        storage.insert_file(&dst, "x", t(10));
        let err = needs_update(&storage, &src, &dst).unwrap_err();
        assert_eq!(err.path(), Some(src.as_path()));
    }

    #[test]
    fn unreadable_target_stats_are_inconsistent() {
        let (src, dst) = paths();
        let storage = MemoryStorage::new();
        storage.insert_file(&src, "x", t(20));
        storage.insert_file(&dst, "x", t(10));
        storage.hide_stats(&dst);
        let err = needs_update(&storage, &src, &dst).unwrap_err();
        assert!(matches!(err, SyncError::Inconsistent { .. }), "got {err:?}");
    }

    #[test]
    fn stat_failure_propagates() {
        let (src, dst) = paths();
        let storage = MemoryStorage::new();
        storage.insert_file(&src, "x", t(20));
        storage.insert_file(&dst, "x", t(10));
        storage.fail(Op::Stats, &src);
        let err = needs_update(&storage, &src, &dst).unwrap_err();
        assert!(err.is_permission_denied());
    }
}
