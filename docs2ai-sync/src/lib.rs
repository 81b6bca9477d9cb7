//! # docs2ai-sync
//!
//! Incremental synchronization of a directory of Markdown documents into
//! per-tool rule directories.
//!
//! Build an [`Orchestrator`] over a [`Storage`] (usually [`LocalStorage`])
//! and call [`Orchestrator::process_directory`] with a
//! [`RunConfig`](docs2ai_core::RunConfig). The returned [`RunReport`] lists
//! every processed, updated and deleted file plus any per-target failures.
//!
//! [`status::collect_status`] and [`clean::clean_targets`] are the read-only
//! and destructive companions used by the CLI.

pub mod change;
pub mod clean;
pub mod error;
pub mod memory;
pub mod orchestrator;
pub mod reconcile;
pub mod report;
pub mod source;
pub mod status;
pub mod storage;
pub mod transfer;

pub use clean::{clean_targets, CleanOutcome};
pub use error::SyncError;
pub use memory::MemoryStorage;
pub use orchestrator::Orchestrator;
pub use reconcile::{DirectorySynchronizer, Reconciliation};
pub use report::{RunReport, Stage, TargetFailure};
pub use status::{collect_status, ArtifactState, ArtifactStatus, TargetStatus};
pub use storage::{FileStats, LocalStorage, Storage};
pub use transfer::{convert_file, FileTransfer, TransferResult};
