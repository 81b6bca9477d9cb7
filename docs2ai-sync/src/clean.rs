//! Clearing target directories.

use std::path::PathBuf;

use serde::Serialize;

use docs2ai_core::OutputTarget;

use crate::storage::Storage;

/// Result of cleaning one target directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanOutcome {
    pub target: String,
    pub directory: PathBuf,
    /// Entries removed, or that would be removed in dry-run.
    pub removed: Vec<String>,
    pub error: Option<String>,
}

/// Empty every target directory, keeping the directories themselves.
///
/// With `dry_run` only the listing is read. Missing directories yield an
/// empty outcome. A failing target is recorded along with whatever it
/// removed before the failure, and the rest still run.
pub fn clean_targets<S: Storage + ?Sized>(
    storage: &S,
    targets: &[OutputTarget],
    dry_run: bool,
) -> Vec<CleanOutcome> {
    targets
        .iter()
        .map(|target| {
            let dir = &target.directory;
            let mut removed = Vec::new();
            let result = if dry_run {
                storage.exists(dir).and_then(|exists| {
                    if exists {
                        removed = storage.read_dir(dir)?;
                    }
                    Ok(())
                })
            } else {
                storage.clear_dir(dir, &mut removed)
            };

            for entry in &removed {
                if dry_run {
                    tracing::info!("[{}] [dry-run] would remove {entry}", target.name);
                } else {
                    tracing::info!("[{}] removed {entry}", target.name);
                }
            }
            let error = result
                .inspect_err(|err| {
                    tracing::error!("[{}] error cleaning {}: {err}", target.name, dir.display());
                })
                .err()
                .map(|err| err.to_string());
            CleanOutcome {
                target: target.name.to_string(),
                directory: dir.clone(),
                removed,
                error,
            }
        })
        .collect()
}
