//! Candidate index: harvested publications keyed by resident name.
//!
//! On disk this is a JSON array of `{resident_name, publications: [...]}`
//! objects. Records are validated once when the index is built; invalid
//! records are dropped and counted.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{CandidatePublication, RawCandidate};

/// One resident's entry in the candidate index file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResidentCandidates<P> {
    pub resident_name: String,
    #[serde(default)]
    pub publications: Vec<P>,
}

/// Validated candidates per resident.
#[derive(Debug, Default)]
pub struct CandidateIndex {
    by_resident: HashMap<String, Vec<CandidatePublication>>,
    rejected: usize,
}

impl CandidateIndex {
    /// Validate raw entries. Duplicate resident entries are concatenated.
    pub fn from_entries(entries: Vec<ResidentCandidates<RawCandidate>>) -> Self {
        let mut index = Self::default();

        for entry in entries {
            let list = index.by_resident.entry(entry.resident_name.clone()).or_default();
            for raw in entry.publications {
                match CandidatePublication::try_from(raw) {
                    Ok(candidate) => list.push(candidate),
                    Err(e) => {
                        log::debug!("{}: dropped candidate: {e}", entry.resident_name);
                        index.rejected += 1;
                    }
                }
            }
        }

        if index.rejected > 0 {
            log::warn!("Dropped {} invalid candidate records", index.rejected);
        }
        index
    }

    /// Load and validate a candidate index file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read candidate index: {}", path.display()))?;
        let entries: Vec<ResidentCandidates<RawCandidate>> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid candidate index JSON: {}", path.display()))?;
        let index = Self::from_entries(entries);
        log::info!(
            "Loaded candidates for {} residents ({} records)",
            index.resident_count(),
            index.candidate_count()
        );
        Ok(index)
    }

    /// Candidates for `resident_name`; empty when the resident is unknown.
    pub fn get(&self, resident_name: &str) -> &[CandidatePublication] {
        self.by_resident
            .get(resident_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn resident_count(&self) -> usize {
        self.by_resident.len()
    }

    pub fn candidate_count(&self) -> usize {
        self.by_resident.values().map(Vec::len).sum()
    }

    /// Number of records rejected by validation.
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}

/// Write harvested candidates as a candidate index file.
pub fn save_candidates(
    entries: &[ResidentCandidates<CandidatePublication>],
    path: &Path,
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(entries).context("Failed to serialize candidates")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write candidate index: {}", path.display()))?;
    Ok(())
}
