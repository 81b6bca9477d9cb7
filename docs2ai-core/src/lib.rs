//! docs2ai core library: domain types, target registry, configuration.
//!
//! - [`types`]: [`OutputTarget`] and [`RunConfig`]
//! - [`registry`]: the name → target table handed to the sync engine
//! - [`config`]: YAML config file loading and layered run configuration
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod registry;
pub mod types;

pub use config::{FileConfig, Overrides, TargetSpec};
pub use error::ConfigError;
pub use registry::TargetRegistry;
pub use types::{source_base_name, OutputTarget, RunConfig, TargetName, SOURCE_EXTENSION};
