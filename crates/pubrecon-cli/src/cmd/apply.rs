//! Apply subcommand - write a match report's actions to the database

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use pubrecon_apply::Applier;
use pubrecon_core::MatchReport;
use pubrecon_store::DuckStore;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Match report produced by `pubrecon match`
    #[arg(default_value = "match_report.json")]
    pub report: PathBuf,

    /// Database file (default: [database] path from config)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Resolve residents and show the plan without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Also print the counters as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ApplyArgs, config: &Config) -> Result<()> {
    let report = MatchReport::load(&args.report)?;
    let db = args.db.unwrap_or_else(|| config.database.path.clone());
    let store = DuckStore::open(&db)?;

    let stats = Applier::new(&store, config.apply_options(args.dry_run)).apply(&report);

    if args.dry_run {
        eprintln!("\nDry run: no changes written to {}", db.display());
    }
    eprintln!("\n{}", stats.format_table());
    if args.json {
        let json = serde_json::to_string_pretty(&stats).context("Failed to serialize stats")?;
        println!("{json}");
    }
    Ok(())
}
