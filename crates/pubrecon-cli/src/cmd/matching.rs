//! Match subcommand - build the match report from curated actions

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use pubrecon_core::{
    CandidateIndex, FallbackMode, MatchReport, build_report, fmt_num, fmt_ratio, load_actions,
};

use crate::config::Config;

use super::print_summary;

#[derive(Args, Debug)]
pub struct MatchArgs {
    /// Curated actions file (`Name - Title - Journal - ACTION` per line)
    pub actions: PathBuf,

    /// Candidate index produced by `pubrecon harvest`
    #[arg(short, long, default_value = "candidates.json")]
    pub candidates: PathBuf,

    /// Match report output file
    #[arg(short, long, default_value = "match_report.json")]
    pub output: PathBuf,

    /// How the journal-free pass picks a candidate (overrides config)
    #[arg(long, value_enum)]
    pub fallback: Option<FallbackArg>,
}

#[derive(Clone, Copy, ValueEnum, Debug)]
pub enum FallbackArg {
    First,
    Best,
}

impl From<FallbackArg> for FallbackMode {
    fn from(f: FallbackArg) -> Self {
        match f {
            FallbackArg::First => FallbackMode::First,
            FallbackArg::Best => FallbackMode::Best,
        }
    }
}

pub fn run(args: MatchArgs, config: &Config) -> Result<()> {
    let parsed = load_actions(&args.actions)?;
    let index = CandidateIndex::load(&args.candidates)?;

    let mut matcher = config.matcher();
    if let Some(fallback) = args.fallback {
        matcher.fallback = fallback.into();
    }

    let report = build_report(&parsed.actions, &index, &matcher);
    report.save(&args.output)?;

    let summary = &report.summary;
    let mut rows = vec![
        ("Action lines", fmt_num(parsed.entries)),
        ("Skipped lines", fmt_num(parsed.skipped.len())),
        ("Invalid candidate records", fmt_num(index.rejected())),
        ("Residents", fmt_num(summary.total_residents)),
        ("Residents with papers", fmt_num(summary.residents_processed)),
        ("Papers", fmt_num(summary.total_papers)),
        (
            "Found",
            fmt_ratio(summary.papers_found, summary.total_papers),
        ),
        ("Missing", fmt_num(summary.papers_missing)),
    ];
    let breakdown = report.breakdown();
    for (kind, counts) in &breakdown {
        rows.push((kind.as_str(), fmt_ratio(counts.found, counts.total)));
    }
    rows.push(("Output", args.output.display().to_string()));
    print_summary("Match", &rows);

    log::info!("{}", match_rate_line(&report));
    Ok(())
}

fn match_rate_line(report: &MatchReport) -> String {
    format!("Match rate: {:.1}%", report.match_rate())
}
