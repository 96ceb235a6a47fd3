//! Fuzzy resident-name and publication matching.

use serde::{Deserialize, Serialize};

use crate::model::{CandidatePublication, PaperRef, ResidentRecord};
use crate::similarity::ratio;

/// Minimum (exclusive) name similarity for a resident match.
pub const NAME_THRESHOLD: f64 = 0.80;
/// Minimum (exclusive) title similarity when the journals overlap.
pub const JOURNAL_TITLE_THRESHOLD: f64 = 0.80;
/// Minimum (exclusive) title similarity when journals are ignored.
pub const FALLBACK_TITLE_THRESHOLD: f64 = 0.85;

/// A resident selected by [`match_resident`].
#[derive(Debug, Clone, Copy)]
pub struct NameMatch<'a> {
    pub resident: &'a ResidentRecord,
    pub score: f64,
}

/// Highest-scoring resident for `query` by `"first last"` similarity, with
/// no threshold applied.
///
/// Candidates are visited in id order and the first one at the maximum
/// score wins.
pub fn best_resident<'a>(query: &str, candidates: &'a [ResidentRecord]) -> Option<NameMatch<'a>> {
    let mut ordered: Vec<&ResidentRecord> = candidates.iter().collect();
    ordered.sort_by_key(|r| r.id);

    let mut best: Option<NameMatch<'a>> = None;
    for resident in ordered {
        let score = ratio(query, &resident.display_name());
        if best.map_or(true, |b| score > b.score) {
            best = Some(NameMatch { resident, score });
        }
    }
    best
}

/// [`best_resident`], accepted only when the score is strictly above `threshold`.
pub fn match_resident<'a>(
    query: &str,
    candidates: &'a [ResidentRecord],
    threshold: f64,
) -> Option<NameMatch<'a>> {
    best_resident(query, candidates).filter(|m| m.score > threshold)
}

/// How the journal-free fallback pass picks among qualifying candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackMode {
    /// First candidate above the threshold, in corpus order
    #[default]
    First,
    /// Highest-scoring candidate above the threshold
    Best,
}

/// Matches curated `{title, journal}` pairs against harvested candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PublicationMatcher {
    pub journal_title_threshold: f64,
    pub fallback_title_threshold: f64,
    pub fallback: FallbackMode,
}

impl Default for PublicationMatcher {
    fn default() -> Self {
        Self {
            journal_title_threshold: JOURNAL_TITLE_THRESHOLD,
            fallback_title_threshold: FALLBACK_TITLE_THRESHOLD,
            fallback: FallbackMode::default(),
        }
    }
}

/// Journals overlap when either normalized name contains the other.
pub fn journals_overlap(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    a.contains(&b) || b.contains(&a)
}

impl PublicationMatcher {
    /// Find the candidate corresponding to `paper`.
    ///
    /// Pass 1 accepts the first candidate whose journal overlaps and whose
    /// title clears `journal_title_threshold`. Only if that finds nothing,
    /// pass 2 ignores journals and applies the stricter
    /// `fallback_title_threshold`.
    pub fn find<'a>(
        &self,
        paper: &PaperRef,
        candidates: &'a [CandidatePublication],
    ) -> Option<&'a CandidatePublication> {
        let journal_gated = candidates.iter().find(|c| {
            journals_overlap(&paper.journal, &c.journal)
                && ratio(&paper.title, &c.title) > self.journal_title_threshold
        });
        if journal_gated.is_some() {
            return journal_gated;
        }

        match self.fallback {
            FallbackMode::First => candidates
                .iter()
                .find(|c| ratio(&paper.title, &c.title) > self.fallback_title_threshold),
            FallbackMode::Best => {
                let mut best: Option<(&CandidatePublication, f64)> = None;
                for c in candidates {
                    let score = ratio(&paper.title, &c.title);
                    if score > self.fallback_title_threshold
                        && best.map_or(true, |(_, s)| score > s)
                    {
                        best = Some((c, score));
                    }
                }
                best.map(|(c, _)| c)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn resident(id: i64, first: &str, last: &str) -> ResidentRecord {
        ResidentRecord {
            id,
            first_name: first.to_string(),
            middle_name: None,
            last_name: last.to_string(),
            match_year: 2015,
            grad_year: 2021,
        }
    }

    fn candidate(title: &str, journal: &str) -> CandidatePublication {
        CandidatePublication {
            title: title.to_string(),
            journal: journal.to_string(),
            publication_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            doi: None,
            authors: Vec::new(),
            authorship: None,
        }
    }

    fn paper(title: &str, journal: &str) -> PaperRef {
        PaperRef {
            title: title.to_string(),
            journal: journal.to_string(),
        }
    }

    #[test]
    fn exact_name_matches() {
        let residents = vec![resident(2, "John", "Roe"), resident(1, "Jane", "Doe")];
        let m = match_resident("jane  DOE", &residents, NAME_THRESHOLD).unwrap();
        assert_eq!(m.resident.id, 1);
        assert_eq!(m.score, 1.0);
    }

    #[test]
    fn short_form_of_name_is_rejected() {
        let residents = vec![resident(1, "Jonathan", "Doe")];
        assert!(match_resident("Jon Doe", &residents, NAME_THRESHOLD).is_none());
    }

    #[test]
    fn score_at_threshold_is_rejected() {
        // "ab ce" vs "ab cd" scores exactly 0.8
        let residents = vec![resident(1, "ab", "cd")];
        assert!(match_resident("ab ce", &residents, NAME_THRESHOLD).is_none());
        assert!(match_resident("ab ce", &residents, 0.79).is_some());
    }

    #[test]
    fn tie_goes_to_lowest_id() {
        let residents = vec![resident(9, "Jane", "Doe"), resident(3, "Jane", "Doe")];
        let m = match_resident("Jane Doe", &residents, NAME_THRESHOLD).unwrap();
        assert_eq!(m.resident.id, 3);
    }

    #[test]
    fn best_resident_ignores_threshold() {
        let residents = vec![resident(1, "Jonathan", "Doe")];
        let best = best_resident("Jon Doe", &residents).unwrap();
        assert!((best.score - 14.0 / 19.0).abs() < 1e-9);
    }

    #[test]
    fn no_candidates() {
        assert!(match_resident("Jane Doe", &[], NAME_THRESHOLD).is_none());
    }

    #[test]
    fn journal_overlap_is_substring_either_way() {
        assert!(journals_overlap("JAMA", "JAMA Surgery"));
        assert!(journals_overlap(" jama surgery ", "JAMA"));
        assert!(!journals_overlap("Lancet", "JAMA"));
    }

    #[test]
    fn journal_gated_pass_uses_lower_threshold() {
        let matcher = PublicationMatcher::default();
        // 0.8 < score <= 0.85: accepted only with corroborating journal
        let target = paper("Outcomes in surgery residents", "JAMA");
        let cands = vec![candidate("Outcomes of surgical residents", "JAMA Surgery")];
        let score = ratio(&target.title, &cands[0].title);
        assert!(score > 0.80 && score <= 0.85, "score {score}");
        assert!(matcher.find(&target, &cands).is_some());

        let elsewhere = vec![candidate("Outcomes of surgical residents", "Lancet")];
        assert!(matcher.find(&target, &elsewhere).is_none());
    }

    #[test]
    fn fallback_ignores_journal() {
        let matcher = PublicationMatcher::default();
        let cands = vec![candidate("Study of X in adults", "Lancet")];
        let found = matcher.find(&paper("Study of X in adults.", "JAMA"), &cands);
        assert_eq!(found.unwrap().journal, "Lancet");
    }

    #[test]
    fn fallback_first_versus_best() {
        let target = paper("Long term study of outcome X", "Unknown");
        let cands = vec![
            candidate("Long term study of outcomes X", "A"),
            candidate("Long term study of outcome X", "B"),
        ];
        let first = PublicationMatcher::default();
        assert_eq!(first.find(&target, &cands).unwrap().journal, "A");

        let best = PublicationMatcher {
            fallback: FallbackMode::Best,
            ..PublicationMatcher::default()
        };
        assert_eq!(best.find(&target, &cands).unwrap().journal, "B");
    }

    #[test]
    fn nothing_above_threshold() {
        let matcher = PublicationMatcher::default();
        let cands = vec![candidate("Completely different", "JAMA")];
        assert!(matcher.find(&paper("Study of X", "JAMA"), &cands).is_none());
        assert!(matcher.find(&paper("Study of X", "JAMA"), &[]).is_none());
    }

    #[test]
    fn fallback_mode_deserializes_lowercase() {
        let mode: FallbackMode = serde_json::from_str("\"best\"").unwrap();
        assert_eq!(mode, FallbackMode::Best);
    }
}
