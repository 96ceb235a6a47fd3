//! Init subcommand - create the schema and import residents

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use pubrecon_core::fmt_num;
use pubrecon_store::{DuckStore, import_residents_csv};

use crate::config::Config;

use super::print_summary;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Database file (default: [database] path from config)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Residents CSV with first_name, middle_name, last_name, match_year, grad_year
    #[arg(short, long)]
    pub residents: Option<PathBuf>,
}

pub fn run(args: InitArgs, config: &Config) -> Result<()> {
    let db = args.db.unwrap_or_else(|| config.database.path.clone());
    let store = DuckStore::open(&db)?;
    log::info!("Schema ready in {}", db.display());

    let mut rows = vec![("Database", db.display().to_string())];
    if let Some(csv) = args.residents {
        let summary = import_residents_csv(&store, &csv)?;
        rows.push(("Rows read", fmt_num(summary.rows)));
        rows.push(("Residents inserted", fmt_num(summary.inserted)));
        rows.push(("Already present", fmt_num(summary.existing)));
        rows.push(("Invalid rows", fmt_num(summary.invalid)));
    }
    print_summary("Init", &rows);
    Ok(())
}
