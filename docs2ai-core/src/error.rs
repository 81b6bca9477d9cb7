//! Error types for docs2ai-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while building a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure while reading a config file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load, with file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// An explicitly requested config file did not exist.
    #[error("config file not found at {path}")]
    NotFound { path: PathBuf },

    /// One or more requested service names are not registered.
    #[error("unknown service(s): {}; available services: {}", unknown.join(", "), available.join(", "))]
    UnknownServices {
        unknown: Vec<String>,
        available: Vec<String>,
    },

    /// The service list was empty after parsing.
    #[error("no valid services specified; available services: {}", available.join(", "))]
    NoServices { available: Vec<String> },

    /// The assembled configuration is not usable.
    #[error("invalid configuration: {0}")]
    Validation(String),

    /// `dirs::home_dir()` returned `None` while expanding `~`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
