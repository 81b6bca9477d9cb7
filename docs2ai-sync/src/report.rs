//! Run report returned by the orchestrator.

use std::fmt;

use serde::Serialize;

/// Engine stage in which a recoverable failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Transfer,
    Reconcile,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Transfer => write!(f, "transfer"),
            Stage::Reconcile => write!(f, "reconcile"),
        }
    }
}

/// A per-target failure that was recorded instead of aborting the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetFailure {
    pub target: String,
    /// Source file name for transfer failures; `None` for reconciliation.
    pub file: Option<String>,
    pub stage: Stage,
    pub message: String,
}

impl fmt::Display for TargetFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "[{}] {} {}: {}", self.target, self.stage, file, self.message),
            None => write!(f, "[{}] {}: {}", self.target, self.stage, self.message),
        }
    }
}

/// Aggregated outcome of one run. Counts and lists are identical for the
/// same inputs whether or not the run was a dry-run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub processed_count: usize,
    pub processed_files: Vec<String>,
    pub services: Vec<String>,
    pub updated_count: usize,
    pub updated_files: Vec<String>,
    pub deleted_count: usize,
    pub deleted_files: Vec<String>,
    pub failures: Vec<TargetFailure>,
    pub dry_run: bool,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Failures attributed to `target`.
    pub fn failures_for<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a TargetFailure> {
        self.failures.iter().filter(move |f| f.target == target)
    }

    pub(crate) fn record_processed(&mut self, file: &str, updated: bool) {
        self.processed_count += 1;
        self.processed_files.push(file.to_string());
        if updated {
            self.updated_count += 1;
            self.updated_files.push(file.to_string());
        }
    }

    pub(crate) fn record_deleted(&mut self, files: Vec<String>) {
        self.deleted_count += files.len();
        self.deleted_files.extend(files);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_keys() {
        let mut report = RunReport {
            services: vec!["cursor".to_string()],
            ..RunReport::default()
        };
        report.record_processed("a.md", true);
        report.record_deleted(vec!["stale.mdc".to_string()]);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["processedCount"], 1);
        assert_eq!(json["updatedFiles"][0], "a.md");
        assert_eq!(json["deletedCount"], 1);
        assert_eq!(json["dryRun"], false);
    }

    #[test]
    fn failure_display_names_target_and_file() {
        let failure = TargetFailure {
            target: "cline".to_string(),
            file: Some("a.md".to_string()),
            stage: Stage::Transfer,
            message: "permission denied".to_string(),
        };
        assert_eq!(failure.to_string(), "[cline] transfer a.md: permission denied");
    }
}
