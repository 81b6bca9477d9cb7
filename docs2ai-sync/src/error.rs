//! Error types for docs2ai-sync.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

use docs2ai_core::ConfigError;

/// All errors that can arise from storage access and synchronization.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The source directory is missing. Fatal: aborts the run before any
    /// side effect.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Storage answered inconsistently, e.g. a file reported as existing
    /// whose metadata could not be read.
    #[error("inconsistent storage state at {path}: {reason}")]
    Inconsistent { path: PathBuf, reason: String },

    /// The run configuration was rejected before any work started.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl SyncError {
    /// Path the error refers to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            SyncError::DirectoryNotFound { path }
            | SyncError::Io { path, .. }
            | SyncError::Inconsistent { path, .. } => Some(path),
            SyncError::Config(_) => None,
        }
    }

    /// `true` for I/O errors caused by missing permissions.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, SyncError::Io { source, .. } if source.kind() == ErrorKind::PermissionDenied)
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

pub(crate) fn inconsistent(path: impl Into<PathBuf>, reason: impl Into<String>) -> SyncError {
    SyncError::Inconsistent {
        path: path.into(),
        reason: reason.into(),
    }
}
