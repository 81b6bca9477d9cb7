//! `docs2ai services`: list the registered output targets.

use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use super::{Context, GlobalArgs};

/// Arguments for `docs2ai services`.
#[derive(Args, Debug)]
pub struct ServicesArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize, Tabled)]
struct ServiceRow {
    #[tabled(rename = "service")]
    name: String,
    #[tabled(rename = "directory")]
    directory: String,
    #[tabled(rename = "extension")]
    extension: String,
}

impl ServicesArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let ctx = Context::load(global)?;
        let rows: Vec<ServiceRow> = ctx
            .registry
            .iter()
            .map(|target| ServiceRow {
                name: target.name.to_string(),
                directory: target.directory.display().to_string(),
                extension: target.extension().to_string(),
            })
            .collect();

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&rows).context("failed to serialize services")?
            );
            return Ok(());
        }

        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
