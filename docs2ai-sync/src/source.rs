//! Source directory enumeration.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use docs2ai_core::{source_base_name, RunConfig};

use crate::error::SyncError;
use crate::storage::Storage;

/// A Markdown file found directly under the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// File name as listed, e.g. `a.md`.
    pub file_name: String,
    /// File name without the trailing `.md`.
    pub base_name: String,
    pub path: PathBuf,
}

/// One listing of the source directory, filtered to non-excluded `.md`
/// files in name order. Subdirectories are skipped even when their name
/// ends in `.md`.
///
/// Fails with [`SyncError::DirectoryNotFound`] if `source_dir` is absent
/// or is not a directory.
pub fn enumerate<S: Storage + ?Sized>(
    storage: &S,
    config: &RunConfig,
) -> Result<Vec<SourceDocument>, SyncError> {
    let source_dir = &config.source_dir;
    match storage.stats(source_dir)? {
        Some(stats) if stats.is_dir => {}
        _ => {
            return Err(SyncError::DirectoryNotFound {
                path: source_dir.clone(),
            })
        }
    }

    let docs = storage
        .read_dir(source_dir)?
        .into_iter()
        .filter(|name| !config.is_excluded(name))
        .filter_map(|name| document(source_dir, name))
        .filter(|doc| !is_directory(storage, &doc.path))
        .collect();
    Ok(docs)
}

// A stats failure keeps the entry; the transfer stage reports it per target.
fn is_directory<S: Storage + ?Sized>(storage: &S, path: &Path) -> bool {
    matches!(storage.stats(path), Ok(Some(stats)) if stats.is_dir)
}

/// Base names of `docs`: the ground truth for reconciliation.
pub fn base_names(docs: &[SourceDocument]) -> BTreeSet<String> {
    docs.iter().map(|d| d.base_name.clone()).collect()
}

fn document(source_dir: &Path, file_name: String) -> Option<SourceDocument> {
    let base_name = source_base_name(&file_name)?.to_string();
    Some(SourceDocument {
        path: source_dir.join(&file_name),
        base_name,
        file_name,
    })
}
