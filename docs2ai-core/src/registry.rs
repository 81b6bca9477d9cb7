//! Target registry: service name → [`OutputTarget`].
//!
//! The registry is an explicit value handed to whoever builds a
//! [`RunConfig`](crate::RunConfig); there is no process-wide table. Tests
//! construct an empty registry and register whatever targets they need.
//!
//! # Built-in services
//!
//! | Service  | Directory (relative to project root) | Extension |
//! |----------|--------------------------------------|-----------|
//! | `cursor` | `.cursor/rules`                      | `mdc`     |
//! | `cline`  | `.clinerules`                        | `md`      |

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ConfigError;
use crate::types::{OutputTarget, TargetName};

/// Built-in service table: (name, directory components, extension).
const BUILTINS: &[(&str, &[&str], &str)] = &[
    ("cursor", &[".cursor", "rules"], "mdc"),
    ("cline", &[".clinerules"], "md"),
];

/// Name-keyed collection of output targets. Keys are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetRegistry {
    targets: BTreeMap<TargetName, OutputTarget>,
}

impl TargetRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the built-in services rooted at `root`.
    pub fn with_defaults(root: &Path) -> Self {
        let mut registry = Self::new();
        for (name, components, extension) in BUILTINS {
            let directory = components.iter().fold(root.to_path_buf(), |dir, c| dir.join(c));
            registry.register(OutputTarget::new(*name, directory, *extension));
        }
        registry
    }

    /// Register a target, returning the one it replaced (same name), if any.
    pub fn register(&mut self, target: OutputTarget) -> Option<OutputTarget> {
        self.targets.insert(target.name.clone(), target)
    }

    pub fn get(&self, name: &str) -> Option<&OutputTarget> {
        self.targets.get(&TargetName::from(name))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.targets.keys().map(|k| k.to_string()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutputTarget> {
        self.targets.values()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Look up every requested name, preserving request order and dropping
    /// repeats.
    ///
    /// Fails with [`ConfigError::UnknownServices`] naming *all* unknown
    /// entries, or [`ConfigError::NoServices`] if nothing was requested.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<OutputTarget>, ConfigError> {
        let mut resolved: Vec<OutputTarget> = Vec::new();
        let mut unknown = Vec::new();

        for raw in names {
            let key = TargetName::from(raw.as_ref());
            if key.as_str().is_empty() {
                continue;
            }
            match self.targets.get(&key) {
                Some(target) => {
                    if !resolved.iter().any(|t| t.name == target.name) {
                        resolved.push(target.clone());
                    }
                }
                None => {
                    if !unknown.contains(&key.to_string()) {
                        unknown.push(key.to_string());
                    }
                }
            }
        }

        if !unknown.is_empty() {
            return Err(ConfigError::UnknownServices {
                unknown,
                available: self.names(),
            });
        }
        if resolved.is_empty() {
            return Err(ConfigError::NoServices {
                available: self.names(),
            });
        }
        Ok(resolved)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
