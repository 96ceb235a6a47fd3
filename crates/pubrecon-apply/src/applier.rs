//! Apply a match report's ADD/DELETE/KEEP actions to the store.
//!
//! Per resident: ADD papers first, then DELETE, then KEEP. Every statement
//! commits on its own; a failed paper or link is counted and the run moves
//! on, so earlier work is never rolled back.

use std::collections::HashSet;

use pubrecon_core::{
    ActionKind, MatchReport, MatchResult, NAME_THRESHOLD, ResidentRecord, ResidentReport,
    best_resident, ratio, same_text, truncate,
};
use pubrecon_store::{
    Column, Conditions, Fields, Store, Table, link, linked_publications, load_residents,
    remove_if_orphan, unlink,
};

use crate::error::ApplyError;
use crate::stats::Stats;

/// Minimum (exclusive) title similarity for locating a DELETE target.
pub const DELETE_THRESHOLD: f64 = 0.75;

const TITLE_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApplyOptions {
    pub name_threshold: f64,
    pub delete_threshold: f64,
    /// Resolve residents and log the plan without touching the store
    pub dry_run: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            name_threshold: NAME_THRESHOLD,
            delete_threshold: DELETE_THRESHOLD,
            dry_run: false,
        }
    }
}

pub struct Applier<'a, S: Store> {
    store: &'a S,
    options: ApplyOptions,
}

impl<'a, S: Store> Applier<'a, S> {
    pub fn new(store: &'a S, options: ApplyOptions) -> Self {
        Self { store, options }
    }

    /// Apply every resident in `report`. Never fails as a whole: problems
    /// are logged and show up in the returned counters.
    pub fn apply(&self, report: &MatchReport) -> Stats {
        let mut stats = Stats::default();

        let residents = match load_residents(self.store) {
            Ok(r) => r,
            Err(e) => {
                log::error!("Failed to load residents: {e}");
                return stats;
            }
        };
        log::info!(
            "Applying actions for {} residents against {} database residents",
            report.residents.len(),
            residents.len()
        );

        for (name, resident_report) in &report.residents {
            let resident = match self.resolve(name, &residents) {
                Ok(r) => r,
                Err(e) => {
                    log::warn!("[SKIP] {name}: {e}");
                    stats.residents_skipped += 1;
                    continue;
                }
            };
            stats.residents_resolved += 1;

            if self.options.dry_run {
                log_plan(name, resident, resident_report);
                continue;
            }
            self.apply_resident(name, resident, resident_report, &mut stats);
        }

        stats
    }

    fn resolve<'r>(
        &self,
        name: &str,
        residents: &'r [ResidentRecord],
    ) -> Result<&'r ResidentRecord, ApplyError> {
        let best = best_resident(name, residents);
        match best {
            Some(m) if m.score > self.options.name_threshold => {
                log::debug!(
                    "{name} -> resident {} '{}' ({:.3})",
                    m.resident.id,
                    m.resident.display_name(),
                    m.score
                );
                Ok(m.resident)
            }
            _ => Err(ApplyError::ResidentNotFound {
                name: name.to_string(),
                best_score: best.map(|m| m.score),
            }),
        }
    }

    fn apply_resident(
        &self,
        name: &str,
        resident: &ResidentRecord,
        report: &ResidentReport,
        stats: &mut Stats,
    ) {
        let author_id = match self.author_for(resident) {
            Ok(id) => id,
            Err(e) => {
                log::error!("[FAIL] {name}: could not get author row: {e}");
                return;
            }
        };

        // publications added in this run survive a KEEP pass
        let mut added = HashSet::new();

        if let Some(action) = report.action(ActionKind::Add) {
            for paper in action.found_papers() {
                match self.add(author_id, paper) {
                    Ok(publication_id) => {
                        stats.add.success += 1;
                        added.insert(publication_id);
                        log::info!("[OK] {name} [ADD] {}", truncate(&paper.title, TITLE_WIDTH));
                    }
                    Err(e) => {
                        stats.add.failed += 1;
                        log::warn!("[FAIL] {name} [ADD] {e}");
                    }
                }
            }
        }

        if let Some(action) = report.action(ActionKind::Delete) {
            for paper in action.found_papers() {
                match self.delete(author_id, paper) {
                    Ok(()) => {
                        stats.delete.success += 1;
                        log::info!("[OK] {name} [DELETE] {}", truncate(&paper.title, TITLE_WIDTH));
                    }
                    Err(e) => {
                        stats.delete.failed += 1;
                        log::warn!("[FAIL] {name} [DELETE] {e}");
                    }
                }
            }
        }

        if let Some(action) = report.action(ActionKind::Keep) {
            let mut keep = added;
            for paper in action.found_papers() {
                match self.locate_exact(paper) {
                    Ok(Some(id)) => {
                        keep.insert(id);
                    }
                    Ok(None) => log::debug!(
                        "{name} [KEEP] not in database: {}",
                        truncate(&paper.title, TITLE_WIDTH)
                    ),
                    Err(e) => log::warn!("[WARN] {name} [KEEP] lookup failed: {e}"),
                }
            }
            self.keep(name, author_id, &keep, stats);
        }
    }

    fn author_for(&self, resident: &ResidentRecord) -> Result<i64, ApplyError> {
        let (id, created) = self.store.get_or_create(
            Table::Author,
            &Fields::new().set(Column::AuthorResident, resident.id),
            &Fields::new()
                .set(Column::Affiliation, "")
                .set(Column::FirstAttendingYear, resident.grad_year),
        )?;
        if created {
            log::debug!("Created author {id} for resident {}", resident.id);
        }
        Ok(id)
    }

    fn journal_id(&self, name: &str) -> Result<i64, ApplyError> {
        let (id, _) = self.store.get_or_create(
            Table::Journal,
            &Fields::new().set(Column::JournalName, name.trim()),
            &Fields::new(),
        )?;
        Ok(id)
    }

    /// Get-or-create journal, publication and link. Returns the publication id.
    fn add(&self, author_id: i64, paper: &MatchResult) -> Result<i64, ApplyError> {
        let journal_id = self.journal_id(&paper.journal)?;
        let (publication_id, _) = self.store.get_or_create(
            Table::Publication,
            &Fields::new()
                .set(Column::PublicationJournal, journal_id)
                .set(Column::Title, paper.title.trim()),
            &Fields::new()
                .set(Column::Doi, paper.doi.clone())
                .set(
                    Column::DatePublished,
                    paper.publication_date.map(|d| d.to_string()),
                ),
        )?;
        if let Err(e) = link(
            self.store,
            author_id,
            publication_id,
            paper.authorship.map(|a| a.as_str()),
        ) {
            // Leave no unlinked publication behind
            if let Err(cleanup) = remove_if_orphan(self.store, publication_id) {
                log::warn!("Failed to remove orphan publication {publication_id}: {cleanup}");
            }
            return Err(e.into());
        }
        Ok(publication_id)
    }

    /// Remove this author's link to the best-matching publication in the
    /// paper's journal: exact title first, else the highest similarity above
    /// the delete threshold. Only publications linked to the author are
    /// considered.
    fn delete(&self, author_id: i64, paper: &MatchResult) -> Result<(), ApplyError> {
        let journal_id = self.journal_id(&paper.journal)?;
        let linked: HashSet<i64> = linked_publications(self.store, author_id)?
            .into_iter()
            .collect();
        let pool: Vec<(i64, String)> = self
            .store
            .find(
                Table::Publication,
                &Conditions::new().eq(Column::PublicationJournal, journal_id),
            )?
            .iter()
            .filter(|row| linked.contains(&row.id()))
            .filter_map(|row| Some((row.id(), row.text(Column::Title)?.to_string())))
            .collect();

        let target = match pool.iter().find(|(_, title)| same_text(title, &paper.title)) {
            Some((id, _)) => *id,
            None => {
                let mut best: Option<(i64, f64)> = None;
                for (id, title) in &pool {
                    let score = ratio(&paper.title, title);
                    if best.map_or(true, |(_, s)| score > s) {
                        best = Some((*id, score));
                    }
                }
                match best {
                    Some((id, score)) if score > self.options.delete_threshold => id,
                    _ => {
                        return Err(ApplyError::PublicationNotFound {
                            title: truncate(&paper.title, TITLE_WIDTH),
                            best_score: best.map(|(_, s)| s),
                        });
                    }
                }
            }
        };

        let outcome = unlink(self.store, author_id, target)?;
        if outcome.publication_removed {
            log::debug!("Publication {target} removed as orphan");
        }
        Ok(())
    }

    /// Publication id for an exact journal name + title match, without creating anything.
    fn locate_exact(&self, paper: &MatchResult) -> Result<Option<i64>, ApplyError> {
        let journal = self.store.find(
            Table::Journal,
            &Conditions::new().eq(Column::JournalName, paper.journal.trim()),
        )?;
        let Some(journal) = journal.first() else {
            return Ok(None);
        };
        let publication = self.store.find(
            Table::Publication,
            &Conditions::new()
                .eq(Column::PublicationJournal, journal.id())
                .eq(Column::Title, paper.title.trim()),
        )?;
        Ok(publication.first().map(|row| row.id()))
    }

    /// Remove every link of `author_id` whose publication is not in `keep`.
    fn keep(&self, name: &str, author_id: i64, keep: &HashSet<i64>, stats: &mut Stats) {
        let linked = match linked_publications(self.store, author_id) {
            Ok(ids) => ids,
            Err(e) => {
                stats.keep.failed += 1;
                log::warn!("[FAIL] {name} [KEEP] could not list links: {e}");
                return;
            }
        };

        for publication_id in linked.into_iter().filter(|id| !keep.contains(id)) {
            match unlink(self.store, author_id, publication_id) {
                Ok(_) => stats.keep.removed += 1,
                Err(e) => {
                    stats.keep.failed += 1;
                    log::warn!("[FAIL] {name} [KEEP] unlink {publication_id}: {e}");
                }
            }
        }
        stats.keep.success += 1;
        log::info!("[OK] {name} [KEEP] {} kept", keep.len());
    }
}

fn log_plan(name: &str, resident: &ResidentRecord, report: &ResidentReport) {
    let count = |kind: ActionKind| report.action(kind).map_or(0, |a| a.found);
    log::info!(
        "[DRY] {name} -> resident {}: ADD {}, DELETE {}, KEEP {}",
        resident.id,
        count(ActionKind::Add),
        count(ActionKind::Delete),
        count(ActionKind::Keep)
    );
}
