//! In-memory [`Storage`] for tests.
//!
//! Behaves like [`LocalStorage`](crate::LocalStorage) with three additions:
//! a fake clock (every copy stamps the artifact with a strictly increasing
//! mtime), injectable failures per operation and path prefix, and a log of
//! every mutating call so tests can assert that dry-run never mutates.

use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use crate::error::{io_err, SyncError};
use crate::storage::{FileStats, Storage};

/// Storage operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    EnsureDir,
    ClearDir,
    Exists,
    Stats,
    Copy,
    Delete,
    ReadDir,
}

/// A recorded mutating call. Recorded even when the call turns out to be a
/// no-op, so "never invoked" can be asserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    EnsureDir(PathBuf),
    ClearDir(PathBuf),
    Copy { from: PathBuf, to: PathBuf },
    Delete(PathBuf),
}

#[derive(Debug)]
struct FileEntry {
    data: Vec<u8>,
    modified: SystemTime,
}

#[derive(Debug)]
struct State {
    files: BTreeMap<PathBuf, FileEntry>,
    dirs: BTreeSet<PathBuf>,
    clock: SystemTime,
    failures: Vec<(Op, PathBuf)>,
    hidden_stats: BTreeSet<PathBuf>,
    mutations: Vec<Mutation>,
}

impl State {
    fn tick(&mut self) -> SystemTime {
        self.clock += Duration::from_secs(1);
        self.clock
    }

    fn check(&self, op: Op, path: &Path) -> Result<(), SyncError> {
        let injected = self
            .failures
            .iter()
            .any(|(o, prefix)| *o == op && path.starts_with(prefix));
        if injected {
            return Err(io_err(
                path,
                std::io::Error::new(ErrorKind::PermissionDenied, format!("injected {op:?} failure")),
            ));
        }
        Ok(())
    }

    fn add_dir_with_parents(&mut self, dir: &Path) {
        for ancestor in dir.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }
}

/// Thread-safe in-memory storage.
#[derive(Debug)]
pub struct MemoryStorage {
    state: Mutex<State>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    /// Empty storage. The clock starts well after any timestamp tests
    /// usually pass to [`insert_file`](Self::insert_file).
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                files: BTreeMap::new(),
                dirs: BTreeSet::new(),
                clock: SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000),
                failures: Vec::new(),
                hidden_stats: BTreeSet::new(),
                mutations: Vec::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a file (and its parent directories). Not recorded as a mutation.
    pub fn insert_file(&self, path: impl AsRef<Path>, data: impl AsRef<[u8]>, modified: SystemTime) {
        let path = path.as_ref();
        let mut state = self.state();
        if let Some(parent) = path.parent() {
            state.add_dir_with_parents(parent);
        }
        state.files.insert(
            path.to_path_buf(),
            FileEntry {
                data: data.as_ref().to_vec(),
                modified,
            },
        );
    }

    /// Seed an empty directory. Not recorded as a mutation.
    pub fn insert_dir(&self, path: impl AsRef<Path>) {
        self.state().add_dir_with_parents(path.as_ref());
    }

    /// Set the mtime of an existing file.
    pub fn touch(&self, path: impl AsRef<Path>, modified: SystemTime) {
        if let Some(entry) = self.state().files.get_mut(path.as_ref()) {
            entry.modified = modified;
        }
    }

    /// Make every `op` on a path under `prefix` fail with `PermissionDenied`.
    pub fn fail(&self, op: Op, prefix: impl AsRef<Path>) {
        self.state().failures.push((op, prefix.as_ref().to_path_buf()));
    }

    /// Make `stats` report `None` for `path` even though it exists.
    pub fn hide_stats(&self, path: impl AsRef<Path>) {
        self.state().hidden_stats.insert(path.as_ref().to_path_buf());
    }

    pub fn read(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.state().files.get(path.as_ref()).map(|f| f.data.clone())
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.state().files.contains_key(path.as_ref())
    }

    pub fn modified(&self, path: impl AsRef<Path>) -> Option<SystemTime> {
        self.state().files.get(path.as_ref()).map(|f| f.modified)
    }

    /// Every mutating call made so far, in call order.
    pub fn mutations(&self) -> Vec<Mutation> {
        self.state().mutations.clone()
    }

    pub fn clear_mutations(&self) {
        self.state().mutations.clear();
    }
}

impl Storage for MemoryStorage {
    fn ensure_dir_exists(&self, dir: &Path) -> Result<(), SyncError> {
        let mut state = self.state();
        state.mutations.push(Mutation::EnsureDir(dir.to_path_buf()));
        state.check(Op::EnsureDir, dir)?;
        if state.files.contains_key(dir) {
            return Err(io_err(
                dir,
                std::io::Error::new(ErrorKind::AlreadyExists, "a file exists at this path"),
            ));
        }
        state.add_dir_with_parents(dir);
        Ok(())
    }

    fn clear_dir(&self, dir: &Path, removed: &mut Vec<String>) -> Result<(), SyncError> {
        let mut state = self.state();
        state.mutations.push(Mutation::ClearDir(dir.to_path_buf()));
        state.check(Op::ClearDir, dir)?;
        if !state.is_dir(dir) {
            return Ok(());
        }
        let children: BTreeSet<String> = state
            .files
            .keys()
            .chain(state.dirs.iter())
            .filter(|p| p.as_path() != dir)
            .filter_map(|p| p.strip_prefix(dir).ok().and_then(first_component))
            .collect();
        for child in children {
            let path = dir.join(&child);
            // Per-entry failures are injected with `Op::Delete`.
            state.check(Op::Delete, &path)?;
            state.files.retain(|p, _| !p.starts_with(&path));
            state.dirs.retain(|p| !p.starts_with(&path));
            removed.push(child);
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> Result<bool, SyncError> {
        let state = self.state();
        state.check(Op::Exists, path)?;
        Ok(state.files.contains_key(path) || state.is_dir(path))
    }

    fn stats(&self, path: &Path) -> Result<Option<FileStats>, SyncError> {
        let state = self.state();
        state.check(Op::Stats, path)?;
        if state.hidden_stats.contains(path) {
            return Ok(None);
        }
        if let Some(file) = state.files.get(path) {
            return Ok(Some(FileStats {
                modified: file.modified,
                size: file.data.len() as u64,
                is_dir: false,
            }));
        }
        if state.is_dir(path) {
            return Ok(Some(FileStats {
                modified: SystemTime::UNIX_EPOCH,
                size: 0,
                is_dir: true,
            }));
        }
        Ok(None)
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<(), SyncError> {
        let mut state = self.state();
        state.mutations.push(Mutation::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        });
        state.check(Op::Copy, from)?;
        state.check(Op::Copy, to)?;
        let data = match state.files.get(from) {
            Some(file) => file.data.clone(),
            None => {
                return Err(io_err(
                    from,
                    std::io::Error::new(ErrorKind::NotFound, "source file not found"),
                ))
            }
        };
        if state.is_dir(to) {
            return Err(io_err(
                to,
                std::io::Error::new(ErrorKind::Other, "target is a directory"),
            ));
        }
        if let Some(parent) = to.parent() {
            state.add_dir_with_parents(parent);
        }
        let modified = state.tick();
        state
            .files
            .insert(to.to_path_buf(), FileEntry { data, modified });
        Ok(())
    }

    fn delete_file(&self, path: &Path) -> Result<(), SyncError> {
        let mut state = self.state();
        state.mutations.push(Mutation::Delete(path.to_path_buf()));
        state.check(Op::Delete, path)?;
        if state.files.remove(path).is_some() {
            return Ok(());
        }
        let parent_exists = path.parent().map(|p| state.is_dir(p)).unwrap_or(false);
        if parent_exists {
            Ok(())
        } else {
            Err(io_err(
                path,
                std::io::Error::new(ErrorKind::NotFound, "parent directory not found"),
            ))
        }
    }

    fn read_dir(&self, dir: &Path) -> Result<Vec<String>, SyncError> {
        let state = self.state();
        state.check(Op::ReadDir, dir)?;
        if !state.is_dir(dir) {
            return Err(io_err(
                dir,
                std::io::Error::new(ErrorKind::NotFound, "directory not found"),
            ));
        }
        let names: BTreeSet<String> = state
            .files
            .keys()
            .chain(state.dirs.iter())
            .filter(|p| p.parent() == Some(dir))
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        Ok(names.into_iter().collect())
    }
}

fn first_component(rel: &Path) -> Option<String> {
    rel.components()
        .next()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
}
