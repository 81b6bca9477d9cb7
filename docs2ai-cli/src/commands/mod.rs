//! Subcommand implementations and the config plumbing they share.

pub mod clean;
pub mod convert;
pub mod services;
pub mod status;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use thiserror::Error;

use docs2ai_core::{
    config::{self, FileConfig},
    Overrides, RunConfig, TargetRegistry,
};

/// Flags accepted by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file to load instead of `<project-root>/docs2ai.yaml`.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory that relative paths and target directories are anchored
    /// at [default: current directory].
    #[arg(long, global = true, value_name = "DIR")]
    pub project_root: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Source selection shared by `convert` and `status`.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Directory holding the Markdown documents [default: ./docs/rules].
    #[arg(short, long, env = "DOCS_TO_AI_SOURCE_DIR", value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Comma-separated services to generate for [default: cursor].
    #[arg(long, env = "DOCS_TO_AI_SERVICES", value_delimiter = ',', value_name = "NAMES")]
    pub services: Option<Vec<String>>,

    /// Comma-separated source file names to skip [default: README.md].
    #[arg(short = 'x', long, value_delimiter = ',', value_name = "FILES")]
    pub exclude: Option<Vec<String>>,
}

impl SourceArgs {
    pub fn overrides(&self, dry_run: Option<bool>, sync: Option<bool>) -> Overrides {
        Overrides {
            source: self.source.clone(),
            services: self.services.clone(),
            exclude: self.exclude.clone(),
            dry_run,
            sync,
        }
    }
}

/// Collapse a `--flag` / `--no-flag` pair. Neither given defers to the
/// config file.
pub fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// A command finished its work but some targets failed along the way.
/// Details have already been printed.
#[derive(Debug, Error)]
#[error("{failures} target operation(s) failed")]
pub struct PartialFailure {
    pub failures: usize,
}

/// Project root, config file and registry resolved for one invocation.
#[derive(Debug)]
pub struct Context {
    pub root: PathBuf,
    pub file: FileConfig,
    pub registry: TargetRegistry,
}

impl Context {
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let root = match &global.project_root {
            Some(root) => config::expand_tilde(root)?,
            None => std::env::current_dir().context("could not determine current directory")?,
        };

        let file = match &global.config {
            Some(path) => {
                let path = config::expand_tilde(path)?;
                tracing::debug!(path = %path.display(), "loading config file");
                config::load_at(&path)?
            }
            None => match config::discover(&root)? {
                Some((path, file)) => {
                    tracing::debug!(path = %path.display(), "loaded config file");
                    file
                }
                None => FileConfig::default(),
            },
        };

        let mut registry = TargetRegistry::with_defaults(&root);
        file.apply_targets(&mut registry, &root)?;
        Ok(Self {
            root,
            file,
            registry,
        })
    }

    pub fn run_config(&self, overrides: Overrides) -> Result<RunConfig> {
        Ok(self
            .file
            .build_run_config(overrides, &self.registry, &self.root)?)
    }
}
