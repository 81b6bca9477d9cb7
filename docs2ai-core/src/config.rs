//! Optional YAML config file and layered run configuration.
//!
//! ```yaml
//! # docs2ai.yaml
//! source: docs/rules
//! services: [cursor, cline]
//! exclude: [README.md]
//! sync: true
//! targets:
//!   - name: windsurf
//!     directory: .windsurf/rules
//!     extension: md
//! ```
//!
//! Precedence: CLI flag > environment variable > config file > built-in
//! default. Flags and environment variables are resolved by the CLI before
//! they reach [`Overrides`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};
use crate::registry::TargetRegistry;
use crate::types::{OutputTarget, RunConfig};

/// File looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "docs2ai.yaml";

pub const DEFAULT_SOURCE_DIR: &str = "./docs/rules";
pub const DEFAULT_SERVICES: &[&str] = &["cursor"];
pub const DEFAULT_EXCLUDES: &[&str] = &["README.md"];

/// A custom output target declared in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetSpec {
    pub name: String,
    pub directory: PathBuf,
    pub extension: String,
}

/// Contents of `docs2ai.yaml`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub source: Option<PathBuf>,
    pub services: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub dry_run: Option<bool>,
    pub sync: Option<bool>,
    pub targets: Vec<TargetSpec>,
}

/// Values that take precedence over the config file (CLI flags / env).
/// `None` defers to the file; `Some(false)` turns a file setting off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub source: Option<PathBuf>,
    pub services: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub dry_run: Option<bool>,
    pub sync: Option<bool>,
}

/// Load a config file from an explicit path.
///
/// Returns [`ConfigError::NotFound`] if absent and [`ConfigError::Parse`]
/// (with path + line context) if malformed.
pub fn load_at(path: &Path) -> Result<FileConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    if contents.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load `<dir>/docs2ai.yaml` if it exists.
pub fn discover(dir: &Path) -> Result<Option<(PathBuf, FileConfig)>, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.is_file() {
        return Ok(None);
    }
    let config = load_at(&path)?;
    Ok(Some((path, config)))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> Result<PathBuf, ConfigError> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
    Ok(home.join(rest))
}

/// Expand `~`, then anchor relative paths at `root`.
pub fn resolve_path(path: &Path, root: &Path) -> Result<PathBuf, ConfigError> {
    let expanded = expand_tilde(path)?;
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(root.join(expanded))
    }
}

impl FileConfig {
    /// Register the file's custom targets on top of `registry`. A custom
    /// target reusing a built-in name overrides it.
    pub fn apply_targets(
        &self,
        registry: &mut TargetRegistry,
        root: &Path,
    ) -> Result<(), ConfigError> {
        for spec in &self.targets {
            if spec.name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "custom target in config file has an empty name".to_string(),
                ));
            }
            let directory = resolve_path(&spec.directory, root)?;
            registry.register(OutputTarget::new(
                spec.name.as_str(),
                directory,
                spec.extension.as_str(),
            ));
        }
        Ok(())
    }

    /// Merge this file with `overrides` and built-in defaults into a
    /// validated [`RunConfig`].
    pub fn build_run_config(
        &self,
        overrides: Overrides,
        registry: &TargetRegistry,
        root: &Path,
    ) -> Result<RunConfig, ConfigError> {
        let source = overrides
            .source
            .or_else(|| self.source.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_DIR));
        let source_dir = resolve_path(&source, root)?;

        let services = overrides
            .services
            .or_else(|| self.services.clone())
            .unwrap_or_else(|| DEFAULT_SERVICES.iter().map(|s| s.to_string()).collect());
        let targets = registry.resolve(&services)?;

        let exclude = overrides
            .exclude
            .or_else(|| self.exclude.clone())
            .unwrap_or_else(|| DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect());

        let config = RunConfig::new(source_dir, targets)
            .with_excludes(exclude.into_iter().map(|f| f.trim().to_string()).filter(|f| !f.is_empty()))
            .dry_run(overrides.dry_run.or(self.dry_run).unwrap_or(false))
            .sync(overrides.sync.or(self.sync).unwrap_or(false));
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn root() -> PathBuf {
        PathBuf::from("/work")
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let registry = TargetRegistry::with_defaults(&root());
        let config = FileConfig::default()
            .build_run_config(Overrides::default(), &registry, &root())
            .expect("build");
        assert_eq!(config.source_dir, PathBuf::from("/work/./docs/rules"));
        assert_eq!(config.target_names(), vec!["cursor"]);
        assert!(config.is_excluded("README.md"));
        assert!(!config.dry_run);
        assert!(!config.sync);
    }

    #[test]
    fn overrides_beat_file_values() {
        let registry = TargetRegistry::with_defaults(&root());
        let file = FileConfig {
            source: Some(PathBuf::from("from-file")),
            services: Some(vec!["cline".to_string()]),
            exclude: Some(vec!["SKIP.md".to_string()]),
            sync: Some(true),
            ..FileConfig::default()
        };
        let overrides = Overrides {
            source: Some(PathBuf::from("/abs/docs")),
            services: Some(vec!["cursor".to_string(), "cline".to_string()]),
            ..Overrides::default()
        };
        let config = file.build_run_config(overrides, &registry, &root()).expect("build");
        assert_eq!(config.source_dir, PathBuf::from("/abs/docs"));
        assert_eq!(config.target_names(), vec!["cursor", "cline"]);
        assert!(config.is_excluded("SKIP.md"));
        assert!(!config.is_excluded("README.md"));
        assert!(config.sync, "file value survives when the flag is unset");
    }

    #[test]
    fn explicit_false_turns_off_file_flags() {
        let registry = TargetRegistry::with_defaults(&root());
        let file = FileConfig {
            dry_run: Some(true),
            sync: Some(true),
            ..FileConfig::default()
        };
        let overrides = Overrides {
            dry_run: Some(false),
            sync: Some(false),
            ..Overrides::default()
        };
        let config = file.build_run_config(overrides, &registry, &root()).expect("build");
        assert!(!config.dry_run);
        assert!(!config.sync);
    }

    #[test]
    fn custom_targets_extend_the_registry() {
        let mut registry = TargetRegistry::with_defaults(&root());
        let file = FileConfig {
            targets: vec![TargetSpec {
                name: "Windsurf".to_string(),
                directory: PathBuf::from(".windsurf/rules"),
                extension: "md".to_string(),
            }],
            services: Some(vec!["windsurf".to_string()]),
            ..FileConfig::default()
        };
        file.apply_targets(&mut registry, &root()).expect("apply");
        let config = file
            .build_run_config(Overrides::default(), &registry, &root())
            .expect("build");
        assert_eq!(config.targets[0].directory, PathBuf::from("/work/.windsurf/rules"));
    }

    #[test]
    fn load_at_missing_file_is_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let err = load_at(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn discover_returns_none_without_file() {
        let dir = TempDir::new().expect("tempdir");
        assert!(discover(dir.path()).expect("discover").is_none());
    }

    #[test]
    fn expand_tilde_leaves_plain_paths_alone() {
        let path = Path::new("docs/rules");
        assert_eq!(expand_tilde(path).expect("expand"), PathBuf::from("docs/rules"));
    }
}
