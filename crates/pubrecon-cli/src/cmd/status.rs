//! Status subcommand - row counts and orphan check

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use pubrecon_core::fmt_num;
use pubrecon_store::{DuckStore, status};

use crate::config::Config;

use super::print_summary;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Database file (default: [database] path from config)
    #[arg(long)]
    pub db: Option<PathBuf>,
}

pub fn run(args: StatusArgs, config: &Config) -> Result<()> {
    let db = args.db.unwrap_or_else(|| config.database.path.clone());
    if !db.exists() {
        anyhow::bail!("Database not found: {} (run `pubrecon init`)", db.display());
    }
    let store = DuckStore::open(&db)?;
    let status = status(&store).context("Failed to count rows")?;

    let mut rows: Vec<(&str, String)> = status
        .tables
        .iter()
        .map(|(table, count)| (table.name(), fmt_num(*count)))
        .collect();
    rows.push(("orphan publications", fmt_num(status.orphans)));
    print_summary("Table", &rows);

    if status.orphans > 0 {
        log::warn!("{} publications have no author link", status.orphans);
    }
    Ok(())
}
