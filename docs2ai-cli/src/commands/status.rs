//! `docs2ai status`: per-target artifact states, without touching anything.

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use docs2ai_sync::{collect_status, ArtifactState, LocalStorage, TargetStatus};

use super::{Context, GlobalArgs, PartialFailure, SourceArgs};

/// Arguments for `docs2ai status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let ctx = Context::load(global)?;
        let config = ctx.run_config(self.source.overrides(None, None))?;
        let targets = collect_status(&LocalStorage, &config)?;

        if self.json {
            print_json(&targets)?;
        } else {
            print_table(&targets);
        }

        let failures = targets.iter().filter(|t| t.error.is_some()).count();
        if failures > 0 {
            return Err(PartialFailure { failures }.into());
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct StatusJson<'a> {
    summary: SummaryJson,
    targets: &'a [TargetStatus],
}

#[derive(Serialize)]
struct SummaryJson {
    targets: usize,
    missing: usize,
    stale: usize,
    current: usize,
    orphan: usize,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "artifact")]
    artifact: String,
    #[tabled(rename = "source")]
    source: String,
    #[tabled(rename = "status")]
    status: &'static str,
}

fn total(targets: &[TargetStatus], state: ArtifactState) -> usize {
    targets.iter().map(|t| t.count(state)).sum()
}

fn print_json(targets: &[TargetStatus]) -> Result<()> {
    let payload = StatusJson {
        summary: SummaryJson {
            targets: targets.len(),
            missing: total(targets, ArtifactState::Missing),
            stale: total(targets, ArtifactState::Stale),
            current: total(targets, ArtifactState::Current),
            orphan: total(targets, ArtifactState::Orphan),
        },
        targets,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

fn print_table(targets: &[TargetStatus]) {
    println!(
        "docs2ai v{} | {} target(s) | {} missing | {} stale | {} orphan",
        env!("CARGO_PKG_VERSION"),
        targets.len(),
        total(targets, ArtifactState::Missing),
        total(targets, ArtifactState::Stale),
        total(targets, ArtifactState::Orphan),
    );

    let separator = "■".repeat(60).bright_black().to_string();
    println!("{separator}");
    for target in targets {
        println!(
            "{} {}",
            target.target.to_uppercase().bold(),
            target.directory.display().to_string().bright_black()
        );
        if let Some(error) = &target.error {
            println!("  {} {error}", "error:".red().bold());
        }
        if target.artifacts.is_empty() {
            println!("  nothing to generate");
        } else {
            let rows: Vec<StatusTableRow> = target
                .artifacts
                .iter()
                .map(|a| StatusTableRow {
                    artifact: a.artifact.clone(),
                    source: a.source.clone().unwrap_or_else(|| "-".to_string()),
                    status: state_label(a.state),
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{table}");
        }
        println!("{separator}");
    }

    let pending = targets
        .iter()
        .flat_map(|t| &t.artifacts)
        .filter(|a| a.state.is_pending())
        .count();
    if pending > 0 {
        println!("Run 'docs2ai convert --sync' to bring {pending} artifact(s) up to date.");
    }
}

fn state_label(state: ArtifactState) -> &'static str {
    match state {
        ArtifactState::Missing => "MISSING",
        ArtifactState::Stale => "STALE",
        ArtifactState::Current => "CURRENT",
        ArtifactState::Orphan => "ORPHAN",
    }
}
