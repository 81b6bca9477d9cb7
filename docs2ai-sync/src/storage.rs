//! Storage access layer.
//!
//! [`Storage`] is the only seam through which the engine touches files.
//! [`LocalStorage`] backs it with `std::fs`; [`MemoryStorage`](crate::memory::MemoryStorage)
//! backs it with an in-memory tree for tests.
//!
//! "Not found" while reading (`exists`, `stats`) is a normal answer, not an
//! error. "Not found" for the parent of a write or delete target is an error.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use crate::change;
use crate::error::{io_err, SyncError};

/// Metadata the change detector and source enumeration need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStats {
    pub modified: SystemTime,
    pub size: u64,
    pub is_dir: bool,
}

/// Abstract file storage used by every engine component.
///
/// Implementations must be safe to call from several worker threads at
/// once; directory creation in particular must tolerate concurrent callers.
pub trait Storage: Send + Sync {
    /// Create `dir` and its parents. Succeeds if it already exists.
    fn ensure_dir_exists(&self, dir: &Path) -> Result<(), SyncError>;

    /// Remove everything inside `dir`, keeping `dir` itself. No-op if `dir`
    /// is absent. Entry names are pushed to `removed` in sorted order as
    /// they go, so a caller still sees what was removed before a failure.
    fn clear_dir(&self, dir: &Path, removed: &mut Vec<String>) -> Result<(), SyncError>;

    fn exists(&self, path: &Path) -> Result<bool, SyncError>;

    /// `Ok(None)` if `path` does not exist.
    fn stats(&self, path: &Path) -> Result<Option<FileStats>, SyncError>;

    /// Copy bytes from `from` to `to`, overwriting `to`.
    fn copy_file(&self, from: &Path, to: &Path) -> Result<(), SyncError>;

    fn delete_file(&self, path: &Path) -> Result<(), SyncError>;

    /// Entry names (not paths) directly inside `dir`, sorted.
    fn read_dir(&self, dir: &Path) -> Result<Vec<String>, SyncError>;

    /// Whether `target` must be (re)generated from `source`.
    fn needs_update(&self, source: &Path, target: &Path) -> Result<bool, SyncError> {
        change::needs_update(self, source, target)
    }
}

macro_rules! forward_storage {
    ($($ty:ty),*) => {$(
        impl<S: Storage + ?Sized> Storage for $ty {
            fn ensure_dir_exists(&self, dir: &Path) -> Result<(), SyncError> {
                (**self).ensure_dir_exists(dir)
            }
            fn clear_dir(&self, dir: &Path, removed: &mut Vec<String>) -> Result<(), SyncError> {
                (**self).clear_dir(dir, removed)
            }
            fn exists(&self, path: &Path) -> Result<bool, SyncError> {
                (**self).exists(path)
            }
            fn stats(&self, path: &Path) -> Result<Option<FileStats>, SyncError> {
                (**self).stats(path)
            }
            fn copy_file(&self, from: &Path, to: &Path) -> Result<(), SyncError> {
                (**self).copy_file(from, to)
            }
            fn delete_file(&self, path: &Path) -> Result<(), SyncError> {
                (**self).delete_file(path)
            }
            fn read_dir(&self, dir: &Path) -> Result<Vec<String>, SyncError> {
                (**self).read_dir(dir)
            }
            fn needs_update(&self, source: &Path, target: &Path) -> Result<bool, SyncError> {
                (**self).needs_update(source, target)
            }
        }
    )*};
}

forward_storage!(&S, Arc<S>, Box<S>);

// ---------------------------------------------------------------------------
// LocalStorage
// ---------------------------------------------------------------------------

/// [`Storage`] over the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Storage for LocalStorage {
    fn ensure_dir_exists(&self, dir: &Path) -> Result<(), SyncError> {
        if dir.is_dir() {
            return Ok(());
        }
        match fs::create_dir_all(dir) {
            Ok(()) => {
                tracing::debug!(path = %dir.display(), "created directory");
                Ok(())
            }
            // Lost a race with another creator.
            Err(e) if e.kind() == ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
            Err(e) => Err(io_err(dir, e)),
        }
    }

    fn clear_dir(&self, dir: &Path, removed: &mut Vec<String>) -> Result<(), SyncError> {
        if !self.exists(dir)? {
            return Ok(());
        }
        for name in self.read_dir(dir)? {
            let path = dir.join(&name);
            let meta = fs::symlink_metadata(&path).map_err(|e| io_err(&path, e))?;
            if meta.is_dir() {
                fs::remove_dir_all(&path).map_err(|e| io_err(&path, e))?;
            } else {
                fs::remove_file(&path).map_err(|e| io_err(&path, e))?;
            }
            tracing::debug!(path = %path.display(), "removed");
            removed.push(name);
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> Result<bool, SyncError> {
        path.try_exists().map_err(|e| io_err(path, e))
    }

    fn stats(&self, path: &Path) -> Result<Option<FileStats>, SyncError> {
        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_err(path, e)),
        };
        let modified = meta.modified().map_err(|e| io_err(path, e))?;
        Ok(Some(FileStats {
            modified,
            size: meta.len(),
            is_dir: meta.is_dir(),
        }))
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<(), SyncError> {
        if let Some(parent) = to.parent() {
            self.ensure_dir_exists(parent)?;
        }
        match fs::copy(from, to) {
            Ok(_) => Ok(()),
            // Attribute a vanished source to the source path, not the target.
            Err(e) if e.kind() == ErrorKind::NotFound && !from.exists() => Err(io_err(from, e)),
            Err(e) => Err(io_err(to, e)),
        }
    }

    fn delete_file(&self, path: &Path) -> Result<(), SyncError> {
        match fs::remove_file(path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "deleted file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound && parent_exists(path) => Ok(()),
            Err(e) => Err(io_err(path, e)),
        }
    }

    fn read_dir(&self, dir: &Path) -> Result<Vec<String>, SyncError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
            let entry = entry.map_err(|e| io_err(dir, e))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}

fn parent_exists(path: &Path) -> bool {
    path.parent().map(|p| p.is_dir()).unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
