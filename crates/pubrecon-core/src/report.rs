//! Match report: per-resident, per-action FOUND/MISSING results.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::candidates::CandidateIndex;
use crate::matcher::PublicationMatcher;
use crate::model::{ActionKind, AuthorPosition, CandidatePublication, PaperRef, ResidentActionSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchStatus {
    Found,
    Missing,
}

/// Outcome for one curated paper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub title: String,
    pub journal: String,
    pub status: MatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorship: Option<AuthorPosition>,
}

impl MatchResult {
    fn found(paper: &PaperRef, candidate: &CandidatePublication) -> Self {
        Self {
            title: paper.title.clone(),
            journal: paper.journal.clone(),
            status: MatchStatus::Found,
            doi: candidate.doi.clone(),
            publication_date: Some(candidate.publication_date),
            authorship: candidate.authorship,
        }
    }

    fn missing(paper: &PaperRef) -> Self {
        Self {
            title: paper.title.clone(),
            journal: paper.journal.clone(),
            status: MatchStatus::Missing,
            doi: None,
            publication_date: None,
            authorship: None,
        }
    }

    pub fn is_found(&self) -> bool {
        self.status == MatchStatus::Found
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionReport {
    pub total: usize,
    pub found: usize,
    pub missing: usize,
    pub papers: Vec<MatchResult>,
}

impl ActionReport {
    fn push(&mut self, result: MatchResult) {
        self.total += 1;
        if result.is_found() {
            self.found += 1;
        } else {
            self.missing += 1;
        }
        self.papers.push(result);
    }

    /// Papers that were matched to a candidate.
    pub fn found_papers(&self) -> impl Iterator<Item = &MatchResult> {
        self.papers.iter().filter(|p| p.is_found())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResidentReport {
    pub actions: BTreeMap<ActionKind, ActionReport>,
}

impl ResidentReport {
    pub fn action(&self, kind: ActionKind) -> Option<&ActionReport> {
        self.actions.get(&kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Residents named in the action file, including those without papers
    #[serde(default)]
    pub total_residents: usize,
    pub residents_processed: usize,
    pub total_papers: usize,
    pub papers_found: usize,
    pub papers_missing: usize,
}

/// Found/total for one action kind across all residents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindBreakdown {
    pub total: usize,
    pub found: usize,
}

impl KindBreakdown {
    pub fn rate(&self) -> f64 {
        percent(self.found, self.total)
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub summary: Summary,
    pub residents: BTreeMap<String, ResidentReport>,
}

impl MatchReport {
    /// Percentage of curated papers that were found.
    pub fn match_rate(&self) -> f64 {
        percent(self.summary.papers_found, self.summary.total_papers)
    }

    /// Found/total per action kind; kinds with no papers are omitted.
    pub fn breakdown(&self) -> BTreeMap<ActionKind, KindBreakdown> {
        let mut out: BTreeMap<ActionKind, KindBreakdown> = BTreeMap::new();
        for resident in self.residents.values() {
            for (kind, action) in &resident.actions {
                let entry = out.entry(*kind).or_default();
                entry.total += action.total;
                entry.found += action.found;
            }
        }
        out
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read match report: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid match report JSON: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write match report: {}", path.display()))
    }
}

/// Run the publication matcher over every curated paper.
pub fn build_report(
    actions: &ResidentActionSet,
    index: &CandidateIndex,
    matcher: &PublicationMatcher,
) -> MatchReport {
    let mut report = MatchReport {
        summary: Summary {
            total_residents: actions.len(),
            ..Summary::default()
        },
        residents: BTreeMap::new(),
    };

    for (name, lists) in actions.iter() {
        if lists.is_empty() {
            continue;
        }
        let candidates = index.get(name);
        if candidates.is_empty() {
            log::debug!("{name}: no harvested candidates");
        }

        let mut resident = ResidentReport::default();
        for kind in ActionKind::ALL {
            let papers = lists.get(kind);
            if papers.is_empty() {
                continue;
            }
            let action = resident.actions.entry(kind).or_default();
            for paper in papers {
                let result = match matcher.find(paper, candidates) {
                    Some(candidate) => MatchResult::found(paper, candidate),
                    None => MatchResult::missing(paper),
                };
                action.push(result);
            }
        }

        for action in resident.actions.values() {
            report.summary.total_papers += action.total;
            report.summary.papers_found += action.found;
            report.summary.papers_missing += action.missing;
        }
        report.summary.residents_processed += 1;
        report.residents.insert(name.to_string(), resident);
    }

    report
}
