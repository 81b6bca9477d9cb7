//! Synchronization orchestrator.
//!
//! ## `process_directory`: run protocol
//!
//! 1. Validate the run configuration.
//! 2. List the source directory once (fatal if it is missing).
//! 3. Derive the base-name set from that same listing.
//! 4. Transfer every document to every target, one worker thread per target.
//! 5. Reduce per-(target, document) results in source order into the report.
//! 6. With `sync`, reconcile each target directory, one worker per target.
//!
//! Every (document, target) pair writes a distinct artifact path, so workers
//! share nothing but the storage handle. Results are collected first and
//! reduced afterwards; the report is never mutated concurrently.
//!
//! Errors in steps 4 and 6 are recorded in [`RunReport::failures`] and never
//! stop sibling targets or later documents.

use std::collections::BTreeSet;
use std::thread;
use std::time::Instant;

use docs2ai_core::{OutputTarget, RunConfig};

use crate::error::SyncError;
use crate::reconcile::{DirectorySynchronizer, Reconciliation};
use crate::report::{RunReport, Stage, TargetFailure};
use crate::source::{self, SourceDocument};
use crate::storage::Storage;
use crate::transfer;

/// Whether the artifact needed an update, or why the transfer failed.
type TransferOutcome = Result<bool, SyncError>;

/// Drives change detection, transfer and reconciliation across all targets.
#[derive(Debug)]
pub struct Orchestrator<S> {
    storage: S,
}

impl<S: Storage> Orchestrator<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Run one synchronization pass described by `config`.
    ///
    /// Fails only for an invalid configuration or a source directory that
    /// cannot be listed; nothing is written in that case.
    pub fn process_directory(&self, config: &RunConfig) -> Result<RunReport, SyncError> {
        let started = Instant::now();
        config.validate()?;

        let docs = source::enumerate(&self.storage, config)?;
        let base_names = if config.sync {
            source::base_names(&docs)
        } else {
            BTreeSet::new()
        };
        tracing::debug!(
            documents = docs.len(),
            targets = config.targets.len(),
            dry_run = config.dry_run,
            sync = config.sync,
            "processing {}",
            config.source_dir.display()
        );

        let mut report = RunReport {
            services: config.target_names(),
            dry_run: config.dry_run,
            ..RunReport::default()
        };

        let per_target = self.transfer_all(&docs, &config.targets, config.dry_run);
        for (index, doc) in docs.iter().enumerate() {
            let mut updated = false;
            for (target, outcomes) in config.targets.iter().zip(&per_target) {
                match &outcomes[index] {
                    Ok(needed) => updated |= *needed,
                    Err(err) => report.failures.push(TargetFailure {
                        target: target.name.to_string(),
                        file: Some(doc.file_name.clone()),
                        stage: Stage::Transfer,
                        message: err.to_string(),
                    }),
                }
            }
            report.record_processed(&doc.file_name, updated);
        }

        if config.sync {
            if config.dry_run {
                for target in &config.targets {
                    tracing::info!(
                        "[{}] [dry-run] would reconcile {} against {} source document(s)",
                        target.name,
                        target.directory.display(),
                        base_names.len()
                    );
                }
            } else {
                for (target, (reconciliation, error)) in config
                    .targets
                    .iter()
                    .zip(self.reconcile_all(&base_names, &config.targets))
                {
                    report.record_deleted(reconciliation.deleted_files);
                    if let Some(err) = error {
                        report.failures.push(TargetFailure {
                            target: target.name.to_string(),
                            file: None,
                            stage: Stage::Reconcile,
                            message: err.to_string(),
                        });
                    }
                }
            }
        }

        tracing::info!(
            processed = report.processed_count,
            updated = report.updated_count,
            deleted = report.deleted_count,
            failures = report.failures.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "{}run complete",
            if config.dry_run { "[dry-run] " } else { "" }
        );
        Ok(report)
    }

    /// Outcomes indexed `[target][document]`.
    fn transfer_all(
        &self,
        docs: &[SourceDocument],
        targets: &[OutputTarget],
        dry_run: bool,
    ) -> Vec<Vec<TransferOutcome>> {
        let storage = &self.storage;
        thread::scope(|scope| {
            let workers: Vec<_> = targets
                .iter()
                .map(|target| {
                    scope.spawn(move || {
                        docs.iter()
                            .map(|doc| {
                                transfer::convert_file(storage, &doc.path, &doc.file_name, target, dry_run)
                                    .inspect_err(|err| {
                                        tracing::error!(
                                            "[{}] error converting {}: {err}",
                                            target.name,
                                            doc.file_name
                                        );
                                    })
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            workers.into_iter().map(join_worker).collect()
        })
    }

    /// Per target: deletions performed, plus the error that stopped the
    /// pass early, if any.
    fn reconcile_all(
        &self,
        base_names: &BTreeSet<String>,
        targets: &[OutputTarget],
    ) -> Vec<(Reconciliation, Option<SyncError>)> {
        let storage = &self.storage;
        thread::scope(|scope| {
            let workers: Vec<_> = targets
                .iter()
                .map(|target| {
                    scope.spawn(move || {
                        let mut reconciliation = Reconciliation::default();
                        let error = DirectorySynchronizer::new(storage)
                            .delete_orphans(base_names, target, &mut reconciliation)
                            .inspect_err(|err| {
                                tracing::error!("[{}] error synchronizing target directory: {err}", target.name);
                            })
                            .err();
                        (reconciliation, error)
                    })
                })
                .collect();
            workers.into_iter().map(join_worker).collect()
        })
    }
}

fn join_worker<T>(handle: thread::ScopedJoinHandle<'_, T>) -> T {
    handle
        .join()
        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryStorage, Op};
    use std::time::{Duration, SystemTime};

    fn t(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn cursor() -> OutputTarget {
        OutputTarget::new("cursor", "/work/.cursor/rules", "mdc")
    }

    fn cline() -> OutputTarget {
        OutputTarget::new("cline", "/work/.clinerules", "md")
    }

    #[test]
    fn file_is_updated_overall_if_any_target_needed_it() {
        let storage = MemoryStorage::new();
        storage.insert_file("/docs/a.md", "a", t(10));
        storage.insert_file("/work/.cursor/rules/a.mdc", "a", t(20));

        let config = RunConfig::new("/docs", vec![cursor(), cline()]);
        let report = Orchestrator::new(&storage).process_directory(&config).unwrap();

        assert_eq!(report.processed_files, vec!["a.md"]);
        assert_eq!(report.updated_files, vec!["a.md"]);
        assert_eq!(report.services, vec!["cursor", "cline"]);
        assert!(storage.contains("/work/.clinerules/a.md"));
    }

    #[test]
    fn invalid_config_is_rejected_before_any_storage_access() {
        let storage = MemoryStorage::new();
        storage.fail(Op::Exists, "/");
        let err = Orchestrator::new(&storage)
            .process_directory(&RunConfig::new("/docs", vec![]))
            .unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));
    }

    #[test]
    fn partial_deletions_before_a_failure_are_reported() {
        let storage = MemoryStorage::new();
        storage.insert_dir("/docs");
        storage.insert_file("/work/.cursor/rules/a.mdc", "", t(1));
        storage.insert_file("/work/.cursor/rules/b.mdc", "", t(1));
        storage.fail(Op::Delete, "/work/.cursor/rules/b.mdc");

        let config = RunConfig::new("/docs", vec![cursor()]).sync(true);
        let report = Orchestrator::new(&storage).process_directory(&config).unwrap();

        assert_eq!(report.deleted_files, vec!["a.mdc"]);
        assert_eq!(report.deleted_count, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].stage, Stage::Reconcile);
        assert!(storage.contains("/work/.cursor/rules/b.mdc"));
    }

    #[test]
    fn reconciliation_of_one_target_does_not_block_another() {
        let storage = MemoryStorage::new();
        storage.insert_dir("/docs");
        storage.insert_file("/work/.cursor/rules/old.mdc", "", t(1));
        storage.insert_file("/work/.clinerules/old.md", "", t(1));
        storage.fail(Op::ReadDir, "/work/.cursor");

        let config = RunConfig::new("/docs", vec![cursor(), cline()]).sync(true);
        let report = Orchestrator::new(&storage).process_directory(&config).unwrap();

        assert_eq!(report.deleted_files, vec!["old.md"]);
        assert_eq!(report.failures_for("cursor").count(), 1);
        assert_eq!(report.failures_for("cline").count(), 0);
    }
}
