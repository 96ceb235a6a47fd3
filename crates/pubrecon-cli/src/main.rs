//! pubrecon - reconcile residents' publication records
//!
//! Harvests candidate publications from PubMed, matches curated
//! ADD/DELETE/KEEP lists against them and applies the result to a DuckDB
//! database of residents, authors, journals and publications.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "pubrecon")]
#[command(about = "Reconcile residents' publication records against PubMed")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./pubrecon.toml or ~/.config/pubrecon/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Create the database schema and optionally import residents
    Init(cmd::init::InitArgs),
    /// Search PubMed for every resident and write a candidate index
    Harvest(cmd::harvest::HarvestArgs),
    /// Match curated actions against harvested candidates
    Match(cmd::matching::MatchArgs),
    /// Apply a match report to the database
    Apply(cmd::apply::ApplyArgs),
    /// Show row counts per table
    Status(cmd::status::StatusArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let progress = pubrecon_core::ProgressContext::new();

    // Logging:
    //   TTY:     warn unless --debug, the progress bar shows activity
    //   non-TTY: info unless --debug, logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = is_tty && !cli.debug;
    pubrecon_core::init_logging(quiet, cli.debug, multi).context("Failed to initialize logging")?;

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Init(args) => cmd::init::run(args, &config),
        Command::Harvest(args) => cmd::harvest::run(args, &config, &progress),
        Command::Match(args) => cmd::matching::run(args, &config),
        Command::Apply(args) => cmd::apply::run(args, &config),
        Command::Status(args) => cmd::status::run(args, &config),
        Command::Config => {
            use comfy_table::{
                Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
            };

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            let m = &config.matching;
            table.add_row(vec![
                "Database",
                &config.database.path.display().to_string(),
            ]);
            table.add_row(vec!["Name threshold", &format!("{:.2}", m.name_threshold)]);
            table.add_row(vec![
                "Journal title threshold",
                &format!("{:.2}", m.journal_title_threshold),
            ]);
            table.add_row(vec![
                "Fallback title threshold",
                &format!("{:.2}", m.fallback_title_threshold),
            ]);
            table.add_row(vec![
                "Delete threshold",
                &format!("{:.2}", m.delete_threshold),
            ]);
            table.add_row(vec!["Fallback mode", &format!("{:?}", m.fallback).to_lowercase()]);
            table.add_row(vec!["PubMed base URL", &config.pubmed.base_url]);
            table.add_row(vec![
                "PubMed email",
                config.pubmed.email.as_deref().unwrap_or("not set"),
            ]);
            table.add_row(vec![
                "PubMed API key",
                if config.pubmed.api_key.is_some() {
                    "configured"
                } else {
                    "not set"
                },
            ]);
            table.add_row(vec![
                "PubMed batches",
                &format!(
                    "{} ids (max results: {})",
                    config.pubmed.batch_size, config.pubmed.max_results
                ),
            ]);
            table.add_row(vec![
                "Retry",
                &format!(
                    "{} attempts, {}s base delay",
                    config.retry.max_attempts, config.retry.base_delay_secs
                ),
            ]);

            eprintln!("\n{table}");
            Ok(())
        }
    }
}
