//! Harvest candidate publications for each resident.
//!
//! Per resident: search the source with every name variant inside the
//! match-to-graduation window, retrying transient failures. If that still
//! fails, one fallback search by full name with no window is tried; a
//! resident whose fallback also fails is skipped. Records are validated and
//! kept only when the resident is on the author list.

use indicatif::ProgressBar;
use pubrecon_core::{
    CandidatePublication, DateRange, LiteratureSource, RawCandidate, ResidentCandidates,
    ResidentRecord, RetryPolicy, SourceError, names, retry_with_backoff,
};

/// Counters for one harvest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestStats {
    pub residents: usize,
    /// Residents served by the no-window fallback search
    pub fallbacks: usize,
    /// Residents whose searches all failed
    pub skipped: usize,
    /// Records returned by the source
    pub fetched: usize,
    /// Records dropped by validation
    pub invalid: usize,
    /// Valid records that do not list the resident as an author
    pub not_author: usize,
    pub kept: usize,
}

/// Result of [`harvest`]: candidate index entries plus counters.
#[derive(Debug, Default)]
pub struct Harvest {
    pub entries: Vec<ResidentCandidates<CandidatePublication>>,
    pub stats: HarvestStats,
}

/// Harvest every resident in order. `pb` is advanced once per resident.
pub fn harvest<S: LiteratureSource>(
    source: &S,
    residents: &[ResidentRecord],
    policy: &RetryPolicy,
    pb: &ProgressBar,
) -> Harvest {
    let mut out = Harvest::default();

    for resident in residents {
        let name = resident.display_name();
        pb.set_message(name.clone());
        out.stats.residents += 1;

        match search_resident(source, resident, policy, &mut out.stats) {
            Some(raw) => {
                let publications = filter_records(resident, raw, &mut out.stats);
                log::info!("{name}: {} candidate publications", publications.len());
                out.entries.push(ResidentCandidates {
                    resident_name: name,
                    publications,
                });
            }
            None => {
                out.stats.skipped += 1;
                log::warn!("[SKIP] {name}: {} search failed", source.name());
            }
        }
        pb.inc(1);
    }

    out
}

fn search_resident<S: LiteratureSource>(
    source: &S,
    resident: &ResidentRecord,
    policy: &RetryPolicy,
    stats: &mut HarvestStats,
) -> Option<Vec<RawCandidate>> {
    let full_name = resident.full_name();
    let variants = names::name_variants(&full_name);
    let range = DateRange {
        start_year: resident.match_year,
        end_year: resident.grad_year,
    };

    let label = format!("{} search for {full_name}", source.name());
    let err = match retry_with_backoff(&label, policy, || source.search(&variants, Some(range))) {
        Ok(records) => return Some(records),
        Err(e) => e,
    };
    if matches!(err, SourceError::InvalidQuery(_)) {
        return None;
    }

    log::info!("{full_name}: falling back to a plain name search");
    match source.search(&[full_name.clone()], None) {
        Ok(records) => {
            stats.fallbacks += 1;
            Some(records)
        }
        Err(e) => {
            log::warn!("{full_name}: fallback search failed: {e}");
            None
        }
    }
}

/// Validate records and keep those authored by `resident`, recording the
/// author position.
fn filter_records(
    resident: &ResidentRecord,
    raw: Vec<RawCandidate>,
    stats: &mut HarvestStats,
) -> Vec<CandidatePublication> {
    stats.fetched += raw.len();
    let mut kept = Vec::new();

    for record in raw {
        let mut publication = match CandidatePublication::try_from(record) {
            Ok(p) => p,
            Err(e) => {
                stats.invalid += 1;
                log::debug!("{}: dropped record: {e}", resident.display_name());
                continue;
            }
        };
        match names::authorship(resident, &publication.authors) {
            Some(position) => {
                publication.authorship = Some(position);
                kept.push(publication);
            }
            None => stats.not_author += 1,
        }
    }

    stats.kept += kept.len();
    kept
}
