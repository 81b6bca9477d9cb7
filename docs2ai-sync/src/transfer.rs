//! File transfer unit: one source document → one target artifact.

use std::path::Path;

use docs2ai_core::OutputTarget;

use crate::error::SyncError;
use crate::storage::Storage;

/// Outcome of converting one source file for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferResult {
    /// The artifact was copied (missing or older than the source).
    Copied { artifact: String },
    /// `--dry-run`: the artifact *would* have been copied.
    WouldCopy { artifact: String },
    /// The artifact is at least as new as the source.
    Unchanged { artifact: String },
}

impl TransferResult {
    /// `true` if an update was needed, whether or not it was performed.
    pub fn needed_update(&self) -> bool {
        !matches!(self, TransferResult::Unchanged { .. })
    }

    pub fn artifact(&self) -> &str {
        match self {
            TransferResult::Copied { artifact }
            | TransferResult::WouldCopy { artifact }
            | TransferResult::Unchanged { artifact } => artifact,
        }
    }
}

/// Copies source documents into a target directory when they are stale.
#[derive(Debug)]
pub struct FileTransfer<'a, S: ?Sized> {
    storage: &'a S,
}

impl<'a, S: Storage + ?Sized> FileTransfer<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// Convert `source_file_name` (found at `source_path`) for `target`.
    ///
    /// Performs at most one directory creation and one copy; neither in
    /// dry-run. Storage errors propagate to the caller.
    pub fn convert_file(
        &self,
        source_path: &Path,
        source_file_name: &str,
        target: &OutputTarget,
        dry_run: bool,
    ) -> Result<TransferResult, SyncError> {
        let artifact = target.artifact_name(source_file_name);
        let artifact_path = target.directory.join(&artifact);

        if !self.storage.needs_update(source_path, &artifact_path)? {
            tracing::debug!(service = %target.name, file = source_file_name, "unchanged: {artifact}");
            return Ok(TransferResult::Unchanged { artifact });
        }

        if dry_run {
            tracing::info!("[{}] [dry-run] would convert {source_file_name} -> {artifact}", target.name);
            return Ok(TransferResult::WouldCopy { artifact });
        }

        self.storage.ensure_dir_exists(&target.directory)?;
        self.storage.copy_file(source_path, &artifact_path)?;
        tracing::info!("[{}] converted {source_file_name} -> {artifact}", target.name);
        Ok(TransferResult::Copied { artifact })
    }
}

/// Function form of [`FileTransfer::convert_file`] used by the orchestrator.
/// Returns whether an update was needed, performed or not.
pub fn convert_file<S: Storage + ?Sized>(
    storage: &S,
    source_path: &Path,
    source_file_name: &str,
    target: &OutputTarget,
    dry_run: bool,
) -> Result<bool, SyncError> {
    FileTransfer::new(storage)
        .convert_file(source_path, source_file_name, target, dry_run)
        .map(|r| r.needed_update())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
