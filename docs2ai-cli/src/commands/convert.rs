//! `docs2ai convert`: generate rule files from the source documents.

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;

use docs2ai_sync::{LocalStorage, Orchestrator, RunReport};

use super::{switch, Context, GlobalArgs, PartialFailure, SourceArgs};

/// Arguments for `docs2ai convert`.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Report what would change without writing or deleting anything.
    #[arg(short, long, overrides_with = "no_dry_run")]
    pub dry_run: bool,

    /// Write changes even if the config file sets `dry_run: true`.
    #[arg(long, overrides_with = "dry_run")]
    pub no_dry_run: bool,

    /// Delete generated files whose source document no longer exists.
    #[arg(long, overrides_with = "no_sync")]
    pub sync: bool,

    /// Keep orphaned files even if the config file sets `sync: true`.
    #[arg(long, overrides_with = "sync")]
    pub no_sync: bool,

    /// Emit the run report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl ConvertArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let ctx = Context::load(global)?;
        let config = ctx.run_config(self.source.overrides(
            switch(self.dry_run, self.no_dry_run),
            switch(self.sync, self.no_sync),
        ))?;

        let report = Orchestrator::new(LocalStorage).process_directory(&config)?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize run report")?
            );
        } else {
            print_report(&report);
        }

        if report.has_failures() {
            return Err(PartialFailure {
                failures: report.failures.len(),
            }
            .into());
        }
        Ok(())
    }
}

fn print_report(report: &RunReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    let services = report.services.join(", ");

    if report.processed_count == 0 {
        println!("{prefix}✓ no source documents found ({services})");
    } else {
        let verb = if report.dry_run { "would update" } else { "updated" };
        println!(
            "{prefix}✓ processed {} file(s) for {services} ({} {verb}, {} deleted)",
            report.processed_count, report.updated_count, report.deleted_count,
        );
    }

    for file in &report.processed_files {
        if report.updated_files.contains(file) {
            let marker = if report.dry_run { "~" } else { "✎" };
            println!("  {}  {file}", marker.green());
        } else {
            println!("  {}  {file}", "·".bright_black());
        }
    }
    for file in &report.deleted_files {
        println!("  {}  {file}", "✗".yellow());
    }
    for failure in &report.failures {
        println!("  {}  {failure}", "!".red().bold());
    }
}
