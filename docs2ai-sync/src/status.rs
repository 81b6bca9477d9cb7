//! Read-only artifact status per target.
//!
//! Classification for each artifact:
//! 1. `Missing` (source has no artifact yet)
//! 2. `Stale` (source modified after the artifact)
//! 3. `Current`
//! 4. `Orphan` (artifact with the target's extension and no source; what a
//!    sync run would delete)

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use docs2ai_core::{OutputTarget, RunConfig};

use crate::error::SyncError;
use crate::source::{self, SourceDocument};
use crate::storage::Storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactState {
    Missing,
    Stale,
    Current,
    Orphan,
}

impl ArtifactState {
    /// `true` if a non-dry run would write or delete this artifact.
    pub fn is_pending(self) -> bool {
        !matches!(self, ArtifactState::Current)
    }
}

impl fmt::Display for ArtifactState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArtifactState::Missing => "missing",
            ArtifactState::Stale => "stale",
            ArtifactState::Current => "current",
            ArtifactState::Orphan => "orphan",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactStatus {
    /// Source file name; `None` for orphans.
    pub source: Option<String>,
    pub artifact: String,
    pub state: ArtifactState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetStatus {
    pub target: String,
    pub directory: PathBuf,
    pub artifacts: Vec<ArtifactStatus>,
    /// Storage error that cut this target's check short.
    pub error: Option<String>,
}

impl TargetStatus {
    pub fn count(&self, state: ArtifactState) -> usize {
        self.artifacts.iter().filter(|a| a.state == state).count()
    }
}

/// Classify every artifact of every target in `config`.
///
/// Orphans are always listed, whether or not `config.sync` is set. Fails
/// only when the configuration is invalid or the source directory cannot be
/// listed; per-target errors land in [`TargetStatus::error`].
pub fn collect_status<S: Storage + ?Sized>(
    storage: &S,
    config: &RunConfig,
) -> Result<Vec<TargetStatus>, SyncError> {
    config.validate()?;
    let docs = source::enumerate(storage, config)?;
    let base_names = source::base_names(&docs);

    let statuses = config
        .targets
        .iter()
        .map(|target| {
            let mut status = TargetStatus {
                target: target.name.to_string(),
                directory: target.directory.clone(),
                artifacts: Vec::new(),
                error: None,
            };
            if let Err(err) = check_target(storage, &docs, &base_names, target, &mut status.artifacts) {
                tracing::warn!("[{}] status check failed: {err}", target.name);
                status.error = Some(err.to_string());
            }
            status
        })
        .collect();
    Ok(statuses)
}

fn check_target<S: Storage + ?Sized>(
    storage: &S,
    docs: &[SourceDocument],
    base_names: &BTreeSet<String>,
    target: &OutputTarget,
    out: &mut Vec<ArtifactStatus>,
) -> Result<(), SyncError> {
    for doc in docs {
        let artifact = target.artifact_name(&doc.file_name);
        let path = target.directory.join(&artifact);
        let state = if !storage.exists(&path)? {
            ArtifactState::Missing
        } else if storage.needs_update(&doc.path, &path)? {
            ArtifactState::Stale
        } else {
            ArtifactState::Current
        };
        out.push(ArtifactStatus {
            source: Some(doc.file_name.clone()),
            artifact,
            state,
        });
    }

    if !storage.exists(&target.directory)? {
        return Ok(());
    }
    for entry in storage.read_dir(&target.directory)? {
        let orphan = target
            .artifact_base_name(&entry)
            .is_some_and(|base| !base_names.contains(base));
        if orphan {
            out.push(ArtifactStatus {
                source: None,
                artifact: entry,
                state: ArtifactState::Orphan,
            });
        }
    }
    Ok(())
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

    fn targets() -> Vec<OutputTarget> {
        vec![
            OutputTarget::new("cursor", "/work/.cursor/rules", "mdc"),
            OutputTarget::new("cline", "/work/.clinerules", "md"),
        ]
    }

    fn seeded() -> MemoryStorage {
        let storage = MemoryStorage::new();
        storage.insert_file("/docs/a.md", "", t(10));
        storage.insert_file("/docs/b.md", "", t(30));
        storage.insert_file("/docs/c.md", "", t(10));
        storage.insert_file("/work/.cursor/rules/a.mdc", "", t(20));
        storage.insert_file("/work/.cursor/rules/b.mdc", "", t(20));
        storage.insert_file("/work/.cursor/rules/gone.mdc", "", t(20));
        storage.insert_file("/work/.cursor/rules/gone.txt", "", t(20));
        storage
    }

    #[test]
    fn classifies_every_artifact() {
        let storage = seeded();
        let statuses = collect_status(&storage, &RunConfig::new("/docs", targets())).unwrap();

        let cursor = &statuses[0];
        let states: Vec<_> = cursor
            .artifacts
            .iter()
            .map(|a| (a.artifact.as_str(), a.state))
            .collect();
        assert_eq!(
            states,
            vec![
                ("a.mdc", ArtifactState::Current),
                ("b.mdc", ArtifactState::Stale),
                ("c.mdc", ArtifactState::Missing),
                ("gone.mdc", ArtifactState::Orphan),
            ]
        );
        assert!(cursor.error.is_none());

        let cline = &statuses[1];
        assert_eq!(cline.count(ArtifactState::Missing), 3);
        assert_eq!(cline.count(ArtifactState::Orphan), 0);
    }

    #[test]
    fn never_mutates_storage() {
        let storage = seeded();
        collect_status(&storage, &RunConfig::new("/docs", targets()).sync(true)).unwrap();
        assert!(storage.mutations().is_empty());
    }

    #[test]
    fn target_error_is_recorded_and_others_continue() {
        let storage = seeded();
        storage.fail(Op::ReadDir, "/work/.cursor");
        let statuses = collect_status(&storage, &RunConfig::new("/docs", targets())).unwrap();

        assert!(statuses[0].error.as_deref().unwrap().contains("/work/.cursor/rules"));
        assert!(statuses[1].error.is_none());
        assert_eq!(statuses[1].artifacts.len(), 3);
    }

    #[test]
    fn missing_source_directory_is_fatal() {
        let storage = MemoryStorage::new();
        let err = collect_status(&storage, &RunConfig::new("/docs", targets())).unwrap_err();
        assert!(matches!(err, SyncError::DirectoryNotFound { .. }));
    }
}
