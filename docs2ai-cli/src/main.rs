//! docs2ai keeps AI coding tool rule files in sync with a folder of Markdown.
//!
//! # Usage
//!
//! ```text
//! docs2ai convert [-s DIR] [--services cursor,cline] [-x README.md] [--[no-]dry-run] [--[no-]sync] [--json]
//! docs2ai status [-s DIR] [--services ...] [--json]
//! docs2ai clean [--services ...] [--[no-]dry-run]
//! docs2ai services [--json]
//! ```
//!
//! Global flags: `--config <path>`, `--project-root <dir>`, `--verbose`.
//!
//! # Exit codes
//!
//! | Code | Meaning                                                     |
//! |------|-------------------------------------------------------------|
//! | 0    | success                                                     |
//! | 1    | invalid arguments or configuration                          |
//! | 2    | source directory not found                                  |
//! | 3    | storage error, or some targets failed during the run        |
//! | 4    | anything else                                               |

mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;

use commands::{
    clean::CleanArgs, convert::ConvertArgs, services::ServicesArgs, status::StatusArgs,
    GlobalArgs, PartialFailure,
};
use docs2ai_core::ConfigError;
use docs2ai_sync::SyncError;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "docs2ai",
    version,
    about = "Convert Markdown documents into rule files for AI coding tools",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate or refresh rule files from the source documents.
    Convert(ConvertArgs),

    /// Show which generated files are missing, stale, current or orphaned.
    Status(StatusArgs),

    /// Remove everything inside the target directories.
    Clean(CleanArgs),

    /// List the available services and where they write.
    Services(ServicesArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // Help and version go to stdout and are not failures.
            return if err.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_tracing(cli.global.verbose);

    let result = match cli.command {
        Commands::Convert(args) => args.run(&cli.global),
        Commands::Status(args) => args.run(&cli.global),
        Commands::Clean(args) => args.run(&cli.global),
        Commands::Services(args) => args.run(&cli.global),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Map the root cause of a failed command to the documented exit code.
fn exit_code(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if cause.is::<ConfigError>() {
            return 1;
        }
        if let Some(sync) = cause.downcast_ref::<SyncError>() {
            return match sync {
                SyncError::Config(_) => 1,
                SyncError::DirectoryNotFound { .. } => 2,
                SyncError::Io { .. } | SyncError::Inconsistent { .. } => 3,
            };
        }
        if cause.is::<PartialFailure>() {
            return 3;
        }
    }
    4
}

/// Log to stderr. Filter comes from `RUST_LOG`, then `LOG_LEVEL`, then
/// `info`; `--verbose` forces `debug`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .ok()
            .or_else(|| {
                std::env::var("LOG_LEVEL")
                    .ok()
                    .and_then(|level| EnvFilter::try_new(level.trim().to_ascii_lowercase()).ok())
            })
            .unwrap_or_else(|| EnvFilter::new("info"))
    };
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn exit_codes_follow_root_cause() {
        let config: anyhow::Error = ConfigError::Validation("bad".into()).into();
        assert_eq!(exit_code(&config), 1);

        let missing: anyhow::Error = SyncError::DirectoryNotFound {
            path: PathBuf::from("/docs"),
        }
        .into();
        assert_eq!(exit_code(&missing.context("while converting")), 2);

        let partial: anyhow::Error = PartialFailure { failures: 2 }.into();
        assert_eq!(exit_code(&partial), 3);

        assert_eq!(exit_code(&anyhow::anyhow!("boom")), 4);
    }

    #[test]
    fn cli_parses_comma_separated_lists() {
        let cli = Cli::try_parse_from([
            "docs2ai",
            "convert",
            "--services",
            "cursor,cline",
            "-x",
            "README.md,DRAFT.md",
            "--dry-run",
        ])
        .unwrap();
        let Commands::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.source.services.unwrap(), vec!["cursor", "cline"]);
        assert_eq!(args.source.exclude.unwrap(), vec!["README.md", "DRAFT.md"]);
        assert!(args.dry_run);
        assert!(!args.sync);
    }

    #[test]
    fn last_of_a_flag_pair_wins() {
        let cli = Cli::try_parse_from(["docs2ai", "convert", "--dry-run", "--no-dry-run", "--no-sync"]).unwrap();
        let Commands::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(commands::switch(args.dry_run, args.no_dry_run), Some(false));
        assert_eq!(commands::switch(args.sync, args.no_sync), Some(false));

        let cli = Cli::try_parse_from(["docs2ai", "clean"]).unwrap();
        let Commands::Clean(args) = cli.command else {
            panic!("expected clean");
        };
        assert_eq!(commands::switch(args.dry_run, args.no_dry_run), None);
    }

    #[test]
    fn global_flags_are_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from(["docs2ai", "services", "--project-root", "/work", "-v"]).unwrap();
        assert_eq!(cli.global.project_root, Some(PathBuf::from("/work")));
        assert!(cli.global.verbose);
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
