//! `docs2ai clean`: empty the target directories.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use docs2ai_core::Overrides;
use docs2ai_sync::{clean_targets, LocalStorage};

use super::{switch, Context, GlobalArgs, PartialFailure};

/// Arguments for `docs2ai clean`.
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Comma-separated services whose directories are cleared [default: cursor].
    #[arg(long, env = "DOCS_TO_AI_SERVICES", value_delimiter = ',', value_name = "NAMES")]
    pub services: Option<Vec<String>>,

    /// List what would be removed without removing it.
    #[arg(short, long, overrides_with = "no_dry_run")]
    pub dry_run: bool,

    /// Remove entries even if the config file sets `dry_run: true`.
    #[arg(long, overrides_with = "dry_run")]
    pub no_dry_run: bool,
}

impl CleanArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let ctx = Context::load(global)?;
        let config = ctx.run_config(Overrides {
            services: self.services,
            dry_run: switch(self.dry_run, self.no_dry_run),
            ..Overrides::default()
        })?;

        let outcomes = clean_targets(&LocalStorage, &config.targets, config.dry_run);

        let prefix = if config.dry_run { "[dry-run] " } else { "" };
        let mut failures = 0;
        for outcome in &outcomes {
            let verb = if config.dry_run { "would remove" } else { "removed" };
            let mark = if let Some(error) = &outcome.error {
                failures += 1;
                println!("{prefix}{} [{}] {error}", "!".red().bold(), outcome.target);
                "✗".red().bold().to_string()
            } else {
                "✓".to_string()
            };
            println!(
                "{prefix}{mark} [{}] {verb} {} entr{} from {}",
                outcome.target,
                outcome.removed.len(),
                if outcome.removed.len() == 1 { "y" } else { "ies" },
                outcome.directory.display()
            );
            for entry in &outcome.removed {
                println!("  {}  {entry}", "✗".yellow());
            }
        }

        if failures > 0 {
            return Err(PartialFailure { failures }.into());
        }
        Ok(())
    }
}
