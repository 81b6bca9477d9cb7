//! Directory reconciliation: delete artifacts whose source document is gone.

use std::collections::BTreeSet;

use docs2ai_core::OutputTarget;

use crate::error::SyncError;
use crate::storage::Storage;

/// Deletions performed for one target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub deleted_files: Vec<String>,
}

impl Reconciliation {
    pub fn deleted_count(&self) -> usize {
        self.deleted_files.len()
    }
}

/// Removes orphaned artifacts from target directories.
#[derive(Debug)]
pub struct DirectorySynchronizer<'a, S: ?Sized> {
    storage: &'a S,
}

impl<'a, S: Storage + ?Sized> DirectorySynchronizer<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// Delete every entry in `target.directory` that carries the target's
    /// extension and whose base name is not in `source_base_names`.
    ///
    /// - `dry_run` → no storage access at all, zero deletions.
    /// - Missing target directory → zero deletions.
    /// - Entries with another extension are never touched.
    /// - The first failed deletion aborts the pass for this target.
    pub fn sync_target_directory(
        &self,
        source_base_names: &BTreeSet<String>,
        target: &OutputTarget,
        dry_run: bool,
    ) -> Result<Reconciliation, SyncError> {
        let dir = &target.directory;
        if dry_run {
            tracing::info!("[{}] [dry-run] skipping sync for target directory {}", target.name, dir.display());
            return Ok(Reconciliation::default());
        }

        let mut result = Reconciliation::default();
        self.delete_orphans(source_base_names, target, &mut result)?;
        Ok(result)
    }

    /// Deletion loop shared with the orchestrator, which needs the entries
    /// removed before a failure to stay visible in its report.
    pub(crate) fn delete_orphans(
        &self,
        source_base_names: &BTreeSet<String>,
        target: &OutputTarget,
        result: &mut Reconciliation,
    ) -> Result<(), SyncError> {
        let dir = &target.directory;
        if !self.storage.exists(dir)? {
            tracing::debug!("target directory {} does not exist, skipping sync", dir.display());
            return Ok(());
        }
        for entry in self.storage.read_dir(dir)? {
            let Some(base) = target.artifact_base_name(&entry) else {
                continue;
            };
            if source_base_names.contains(base) {
                continue;
            }
            let path = dir.join(&entry);
            self.storage.delete_file(&path).map_err(|e| {
                tracing::error!(path = %path.display(), "error deleting outdated file {entry}: {e}");
                e
            })?;
            tracing::info!("[{}] deleted outdated file {entry}", target.name);
            result.deleted_files.push(entry);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
