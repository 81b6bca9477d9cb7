//! Domain types shared by the sync engine and the CLI.
//!
//! All path fields use `PathBuf`; file *names* (single path components read
//! from a directory listing) are plain `String`s.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Extension (without the dot) that marks a source document.
pub const SOURCE_EXTENSION: &str = "md";

/// Base name of a source document, or `None` if `file_name` is not a `.md` file.
///
/// Only the trailing extension is stripped: `notes.md.md` → `notes.md`.
pub fn source_base_name(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(SOURCE_EXTENSION)
        .and_then(|rest| rest.strip_suffix('.'))
}

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Case-insensitive name of an output target. Stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TargetName(String);

impl TargetName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for TargetName {
    fn from(s: String) -> Self {
        Self(s.trim().to_lowercase())
    }
}

impl From<&str> for TargetName {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

impl From<TargetName> for String {
    fn from(name: TargetName) -> Self {
        name.0
    }
}

// ---------------------------------------------------------------------------
// Output target
// ---------------------------------------------------------------------------

/// A configured destination for rule artifacts.
///
/// A source document `<base>.md` becomes `<directory>/<base>.<extension>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub name: TargetName,
    pub directory: PathBuf,
    extension: String,
}

impl OutputTarget {
    pub fn new(
        name: impl Into<TargetName>,
        directory: impl Into<PathBuf>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            extension: normalize_extension(extension.into()),
        }
    }

    /// Target file extension, without the leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Change the extension before a run starts.
    pub fn set_extension(&mut self, extension: impl Into<String>) {
        self.extension = normalize_extension(extension.into());
    }

    /// Builder-style variant of [`set_extension`](Self::set_extension).
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.set_extension(extension);
        self
    }

    /// Artifact file name for a source file name.
    ///
    /// Replaces exactly one trailing `.md`; a `.md` in the middle of the
    /// name is left alone.
    pub fn artifact_name(&self, source_file_name: &str) -> String {
        let base = source_base_name(source_file_name).unwrap_or(source_file_name);
        format!("{base}.{}", self.extension)
    }

    /// Full artifact path for a source file name.
    pub fn artifact_path(&self, source_file_name: &str) -> PathBuf {
        self.directory.join(self.artifact_name(source_file_name))
    }

    /// Base name of a target-directory entry if it carries this target's
    /// extension, `None` otherwise. Matching is exact (case-sensitive).
    pub fn artifact_base_name<'a>(&self, entry: &'a str) -> Option<&'a str> {
        entry
            .strip_suffix(self.extension.as_str())
            .and_then(|rest| rest.strip_suffix('.'))
    }
}

fn normalize_extension(extension: String) -> String {
    extension.trim().trim_start_matches('.').to_string()
}

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// Everything the sync engine needs for one invocation. Read-only during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub source_dir: PathBuf,
    pub targets: Vec<OutputTarget>,
    /// Literal source file names to skip, e.g. `README.md`.
    pub exclude_files: BTreeSet<String>,
    pub dry_run: bool,
    pub sync: bool,
}

impl RunConfig {
    pub fn new(source_dir: impl Into<PathBuf>, targets: Vec<OutputTarget>) -> Self {
        Self {
            source_dir: source_dir.into(),
            targets,
            exclude_files: BTreeSet::new(),
            dry_run: false,
            sync: false,
        }
    }

    pub fn with_excludes<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_files.extend(files.into_iter().map(Into::into));
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Exclusion is checked against the literal file name, before any
    /// base-name derivation.
    pub fn is_excluded(&self, file_name: &str) -> bool {
        self.exclude_files.contains(file_name)
    }

    /// Names of all configured targets, in configuration order.
    pub fn target_names(&self) -> Vec<String> {
        self.targets.iter().map(|t| t.name.to_string()).collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "source directory is required".to_string(),
            ));
        }
        if self.targets.is_empty() {
            return Err(ConfigError::Validation(
                "at least one output target must be specified".to_string(),
            ));
        }
        let mut seen = BTreeSet::new();
        for target in &self.targets {
            if target.name.as_str().is_empty() {
                return Err(ConfigError::Validation(
                    "output target name must not be empty".to_string(),
                ));
            }
            if target.extension().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "output target '{}' has an empty extension",
                    target.name
                )));
            }
            if !seen.insert(target.name.clone()) {
                return Err(ConfigError::Validation(format!(
                    "output target '{}' is configured more than once",
                    target.name
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
