//! Harvest subcommand - search PubMed for every resident

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use pubrecon_core::{ProgressContext, fmt_num, save_candidates};
use pubrecon_pubmed::{PubmedClient, harvest};
use pubrecon_store::{DuckStore, load_residents};

use crate::config::Config;

use super::print_summary;

#[derive(Args, Debug)]
pub struct HarvestArgs {
    /// Database file (default: [database] path from config)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Candidate index output file
    #[arg(short, long, default_value = "candidates.json")]
    pub output: PathBuf,

    /// Only residents whose name contains this text (case-insensitive)
    #[arg(long)]
    pub resident: Option<String>,

    /// Maximum number of residents to harvest
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,

    /// Contact email sent to NCBI (overrides config)
    #[arg(long)]
    pub email: Option<String>,

    /// NCBI API key (overrides config)
    #[arg(long)]
    pub api_key: Option<String>,
}

pub fn run(args: HarvestArgs, config: &Config, progress: &ProgressContext) -> Result<()> {
    let db = args.db.unwrap_or_else(|| config.database.path.clone());
    let store = DuckStore::open(&db)?;
    let mut residents = load_residents(&store).context("Failed to load residents")?;

    if let Some(filter) = &args.resident {
        let filter = filter.to_lowercase();
        residents.retain(|r| r.full_name().to_lowercase().contains(&filter));
    }
    if let Some(limit) = args.limit {
        residents.truncate(limit);
    }
    if residents.is_empty() {
        anyhow::bail!("No residents to harvest in {}", db.display());
    }

    let mut pubmed = config.pubmed_config();
    if args.email.is_some() {
        pubmed.email = args.email;
    }
    if args.api_key.is_some() {
        pubmed.api_key = args.api_key;
    }
    if pubmed.email.is_none() {
        log::warn!("No contact email configured; NCBI may throttle anonymous clients");
    }
    let client = PubmedClient::new(pubmed);

    log::info!("Harvesting {} residents from PubMed", residents.len());
    let pb = progress.count_bar("harvest", residents.len());
    let out = harvest(&client, &residents, &config.retry_policy(), &pb);
    pb.finish_and_clear();

    save_candidates(&out.entries, &args.output)?;

    let stats = out.stats;
    print_summary(
        "Harvest",
        &[
            ("Residents", fmt_num(stats.residents)),
            ("Skipped (search failed)", fmt_num(stats.skipped)),
            ("Plain-name fallbacks", fmt_num(stats.fallbacks)),
            ("Records fetched", fmt_num(stats.fetched)),
            ("Invalid records", fmt_num(stats.invalid)),
            ("Resident not an author", fmt_num(stats.not_author)),
            ("Candidates kept", fmt_num(stats.kept)),
            ("Output", args.output.display().to_string()),
        ],
    );
    Ok(())
}
