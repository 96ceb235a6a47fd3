//! Record types shared by the matcher, the applier and the harvester.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A resident as stored in the `resident` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidentRecord {
    pub id: i64,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub match_year: i32,
    pub grad_year: i32,
}

impl ResidentRecord {
    /// `"first last"`, the form compared by the name matcher.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    /// First, middle and last name joined by single spaces.
    pub fn full_name(&self) -> String {
        match self.middle_name.as_deref().map(str::trim) {
            Some(middle) if !middle.is_empty() => format!(
                "{} {} {}",
                self.first_name.trim(),
                middle,
                self.last_name.trim()
            ),
            _ => self.display_name(),
        }
    }
}

/// Curated editorial instruction for one paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionKind {
    Add,
    Delete,
    Keep,
}

impl ActionKind {
    pub const ALL: [ActionKind; 3] = [ActionKind::Add, ActionKind::Delete, ActionKind::Keep];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Delete => "DELETE",
            Self::Keep => "KEEP",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised action keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction(pub String);

impl fmt::Display for UnknownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown action '{}' (expected ADD, DELETE or KEEP)", self.0)
    }
}

impl std::error::Error for UnknownAction {}

impl FromStr for ActionKind {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ADD" => Ok(Self::Add),
            "DELETE" => Ok(Self::Delete),
            "KEEP" => Ok(Self::Keep),
            _ => Err(UnknownAction(s.trim().to_string())),
        }
    }
}

/// Title and journal of a curated paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRef {
    pub title: String,
    pub journal: String,
}

/// One line of the curated action file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEntry {
    pub resident_name: String,
    pub action: ActionKind,
    pub title: String,
    pub journal: String,
}

impl ActionEntry {
    pub fn paper(&self) -> PaperRef {
        PaperRef {
            title: self.title.clone(),
            journal: self.journal.clone(),
        }
    }
}

/// Papers listed for one resident, per action kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionLists {
    add: Vec<PaperRef>,
    delete: Vec<PaperRef>,
    keep: Vec<PaperRef>,
}

impl ActionLists {
    pub fn get(&self, kind: ActionKind) -> &[PaperRef] {
        match kind {
            ActionKind::Add => &self.add,
            ActionKind::Delete => &self.delete,
            ActionKind::Keep => &self.keep,
        }
    }

    pub fn push(&mut self, kind: ActionKind, paper: PaperRef) {
        match kind {
            ActionKind::Add => self.add.push(paper),
            ActionKind::Delete => self.delete.push(paper),
            ActionKind::Keep => self.keep.push(paper),
        }
    }

    pub fn total(&self) -> usize {
        self.add.len() + self.delete.len() + self.keep.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Curated actions grouped by resident name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResidentActionSet {
    residents: BTreeMap<String, ActionLists>,
}

impl ResidentActionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: ActionEntry) {
        let paper = entry.paper();
        self.residents
            .entry(entry.resident_name)
            .or_default()
            .push(entry.action, paper);
    }

    /// Register a resident without any papers (kept so it counts towards
    /// `total_residents`).
    pub fn ensure_resident(&mut self, name: &str) {
        self.residents.entry(name.to_string()).or_default();
    }

    pub fn get(&self, name: &str) -> Option<&ActionLists> {
        self.residents.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ActionLists)> {
        self.residents.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.residents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residents.is_empty()
    }
}

impl FromIterator<ActionEntry> for ResidentActionSet {
    fn from_iter<I: IntoIterator<Item = ActionEntry>>(iter: I) -> Self {
        let mut set = Self::new();
        for entry in iter {
            set.insert(entry);
        }
        set
    }
}

/// An author as listed on a bibliographic record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fore_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initials: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
}

/// Position of a resident within an author list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorPosition {
    #[serde(rename = "1st")]
    First,
    #[serde(rename = "2nd")]
    Second,
    #[serde(rename = "mid")]
    Middle,
    #[serde(rename = "last")]
    Last,
}

impl AuthorPosition {
    /// Classify the zero-based `index` in a list of `len` authors.
    pub fn from_index(index: usize, len: usize) -> Self {
        match index {
            0 => Self::First,
            1 => Self::Second,
            i if i + 1 == len => Self::Last,
            _ => Self::Middle,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::First => "1st",
            Self::Second => "2nd",
            Self::Middle => "mid",
            Self::Last => "last",
        }
    }
}

/// A validated bibliographic record harvested for one resident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePublication {
    pub title: String,
    pub journal: String,
    pub publication_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default)]
    pub authors: Vec<AuthorName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorship: Option<AuthorPosition>,
}

/// A record as delivered by a literature source, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCandidate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub journal: Option<String>,
    #[serde(default)]
    pub publication_date: Option<String>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub authors: Vec<AuthorName>,
    #[serde(default)]
    pub authorship: Option<AuthorPosition>,
}

/// Why a raw record was rejected at ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingField(&'static str),
    InvalidDate(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field '{field}'"),
            Self::InvalidDate(s) => write!(f, "unparseable publication date '{s}'"),
        }
    }
}

impl std::error::Error for ValidationError {}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingField(field))
}

impl TryFrom<RawCandidate> for CandidatePublication {
    type Error = ValidationError;

    fn try_from(raw: RawCandidate) -> Result<Self, Self::Error> {
        let title = required(raw.title, "title")?;
        let journal = required(raw.journal, "journal")?;
        let date = required(raw.publication_date, "publication_date")?;
        let publication_date =
            parse_publication_date(&date).ok_or(ValidationError::InvalidDate(date))?;
        let doi = raw
            .doi
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(Self {
            title,
            journal,
            publication_date,
            doi,
            authors: raw.authors,
            authorship: raw.authorship,
        })
    }
}

/// Parse `YYYY-MM-DD`, `YYYY/MM/DD`, `YYYY-MM` or `YYYY`.
///
/// Missing month or day default to `1`.
pub fn parse_publication_date(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.trim().split(['-', '/']).collect();
    let year: i32 = parts.first()?.trim().parse().ok()?;
    let month: u32 = match parts.get(1) {
        Some(m) => m.trim().parse().ok()?,
        None => 1,
    };
    let day: u32 = match parts.get(2) {
        Some(d) => d.trim().parse().ok()?,
        None => 1,
    };
    if parts.len() > 3 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resident(middle: Option<&str>) -> ResidentRecord {
        ResidentRecord {
            id: 1,
            first_name: "Jane".to_string(),
            middle_name: middle.map(String::from),
            last_name: "Doe".to_string(),
            match_year: 2015,
            grad_year: 2021,
        }
    }

    #[test]
    fn action_kind_parses_case_insensitively() {
        assert_eq!("add".parse::<ActionKind>().unwrap(), ActionKind::Add);
        assert_eq!(" Delete ".parse::<ActionKind>().unwrap(), ActionKind::Delete);
        assert_eq!("KEEP".parse::<ActionKind>().unwrap(), ActionKind::Keep);
        assert!("REMOVE".parse::<ActionKind>().is_err());
    }

    #[test]
    fn action_kind_serializes_uppercase() {
        let json = serde_json::to_string(&ActionKind::Delete).unwrap();
        assert_eq!(json, "\"DELETE\"");
    }

    #[test]
    fn resident_names() {
        assert_eq!(resident(None).display_name(), "Jane Doe");
        assert_eq!(resident(None).full_name(), "Jane Doe");
        assert_eq!(resident(Some("Marie")).full_name(), "Jane Marie Doe");
        assert_eq!(resident(Some("  ")).full_name(), "Jane Doe");
    }

    #[test]
    fn action_set_groups_by_resident() {
        let set: ResidentActionSet = vec![
            ActionEntry {
                resident_name: "Jane Doe".to_string(),
                action: ActionKind::Add,
                title: "A".to_string(),
                journal: "J".to_string(),
            },
            ActionEntry {
                resident_name: "Jane Doe".to_string(),
                action: ActionKind::Keep,
                title: "B".to_string(),
                journal: "J".to_string(),
            },
            ActionEntry {
                resident_name: "John Roe".to_string(),
                action: ActionKind::Delete,
                title: "C".to_string(),
                journal: "K".to_string(),
            },
        ]
        .into_iter()
        .collect();

        assert_eq!(set.len(), 2);
        let jane = set.get("Jane Doe").unwrap();
        assert_eq!(jane.get(ActionKind::Add).len(), 1);
        assert_eq!(jane.get(ActionKind::Keep).len(), 1);
        assert!(jane.get(ActionKind::Delete).is_empty());
        assert_eq!(jane.total(), 2);
    }

    #[test]
    fn author_position_from_index() {
        assert_eq!(AuthorPosition::from_index(0, 1), AuthorPosition::First);
        assert_eq!(AuthorPosition::from_index(1, 2), AuthorPosition::Second);
        assert_eq!(AuthorPosition::from_index(2, 5), AuthorPosition::Middle);
        assert_eq!(AuthorPosition::from_index(4, 5), AuthorPosition::Last);
    }

    #[test]
    fn validation_requires_title_journal_date() {
        let raw = RawCandidate {
            title: Some("Study of X".to_string()),
            journal: Some("JAMA".to_string()),
            publication_date: Some("2020-03".to_string()),
            doi: Some("  ".to_string()),
            ..Default::default()
        };
        let candidate = CandidatePublication::try_from(raw.clone()).unwrap();
        assert_eq!(
            candidate.publication_date,
            NaiveDate::from_ymd_opt(2020, 3, 1).unwrap()
        );
        assert!(candidate.doi.is_none());

        let missing_title = RawCandidate {
            title: Some("   ".to_string()),
            ..raw.clone()
        };
        assert_eq!(
            CandidatePublication::try_from(missing_title),
            Err(ValidationError::MissingField("title"))
        );

        let bad_date = RawCandidate {
            publication_date: Some("spring 2020".to_string()),
            ..raw
        };
        assert!(matches!(
            CandidatePublication::try_from(bad_date),
            Err(ValidationError::InvalidDate(_))
        ));
    }

    #[test]
    fn publication_date_formats() {
        let d = |y, m, d| NaiveDate::from_ymd_opt(y, m, d);
        assert_eq!(parse_publication_date("2019"), d(2019, 1, 1));
        assert_eq!(parse_publication_date("2019-07-04"), d(2019, 7, 4));
        assert_eq!(parse_publication_date("2019/07/04"), d(2019, 7, 4));
        assert_eq!(parse_publication_date("2019-13-01"), None);
        assert_eq!(parse_publication_date("2019-01-01-01"), None);
        assert_eq!(parse_publication_date(""), None);
    }
}
