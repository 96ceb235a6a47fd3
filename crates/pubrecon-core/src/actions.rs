//! Curated action file parser.
//!
//! One action per line: `Name - Title - Journal - ACTION`. The name is the
//! first field, the action the last and the journal the second to last;
//! everything in between is the title, so titles may contain ` - `.
//! Blank lines are ignored.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::{ActionEntry, ActionKind, ResidentActionSet, UnknownAction};

const SEPARATOR: &str = " - ";

/// Why a non-blank line was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    TooFewFields(usize),
    EmptyField(&'static str),
    UnknownAction(UnknownAction),
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewFields(n) => write!(f, "expected 4 fields separated by ' - ', found {n}"),
            Self::EmptyField(field) => write!(f, "empty {field}"),
            Self::UnknownAction(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LineError {}

/// Parse one line. Returns `Ok(None)` for blank lines.
pub fn parse_line(line: &str) -> Result<Option<ActionEntry>, LineError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let parts: Vec<&str> = line.split(SEPARATOR).collect();
    if parts.len() < 4 {
        return Err(LineError::TooFewFields(parts.len()));
    }

    let n = parts.len();
    let resident_name = parts[0].trim();
    let action = parts[n - 1]
        .parse::<ActionKind>()
        .map_err(LineError::UnknownAction)?;
    let journal = parts[n - 2].trim();
    let title = parts[1..n - 2].join(SEPARATOR);
    let title = title.trim();

    if resident_name.is_empty() {
        return Err(LineError::EmptyField("resident name"));
    }
    if title.is_empty() {
        return Err(LineError::EmptyField("title"));
    }
    if journal.is_empty() {
        return Err(LineError::EmptyField("journal"));
    }

    Ok(Some(ActionEntry {
        resident_name: resident_name.to_string(),
        action,
        title: title.to_string(),
        journal: journal.to_string(),
    }))
}

/// Result of parsing a whole action file.
#[derive(Debug, Default)]
pub struct ParsedActions {
    pub actions: ResidentActionSet,
    pub entries: usize,
    /// `(line number, reason)` for every skipped non-blank line.
    pub skipped: Vec<(usize, LineError)>,
}

/// Parse action file content. Malformed lines are collected, not fatal.
pub fn parse_actions(content: &str) -> ParsedActions {
    let mut parsed = ParsedActions::default();

    for (idx, line) in content.lines().enumerate() {
        match parse_line(line) {
            Ok(Some(entry)) => {
                parsed.entries += 1;
                parsed.actions.insert(entry);
            }
            Ok(None) => {}
            Err(LineError::UnknownAction(e)) => {
                // Resident still counts towards total_residents
                if let Some(name) = line.split(SEPARATOR).next().map(str::trim) {
                    if !name.is_empty() {
                        parsed.actions.ensure_resident(name);
                    }
                }
                parsed.skipped.push((idx + 1, LineError::UnknownAction(e)));
            }
            Err(e) => parsed.skipped.push((idx + 1, e)),
        }
    }

    parsed
}

/// Read and parse an action file, logging skipped lines.
pub fn load_actions(path: &Path) -> Result<ParsedActions> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read action file: {}", path.display()))?;
    let parsed = parse_actions(&content);

    for (line_no, reason) in &parsed.skipped {
        log::warn!("{}:{line_no}: skipped ({reason})", path.display());
    }
    log::info!(
        "Parsed {} actions for {} residents from {}",
        parsed.entries,
        parsed.actions.len(),
        path.display()
    );
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_line() {
        let entry = parse_line("Jane Doe - Study of X - JAMA - add")
            .unwrap()
            .unwrap();
        assert_eq!(entry.resident_name, "Jane Doe");
        assert_eq!(entry.title, "Study of X");
        assert_eq!(entry.journal, "JAMA");
        assert_eq!(entry.action, ActionKind::Add);
    }

    #[test]
    fn title_may_contain_separator() {
        let entry = parse_line("Jane Doe - Part one - a study - Ann Surg - KEEP")
            .unwrap()
            .unwrap();
        assert_eq!(entry.title, "Part one - a study");
        assert_eq!(entry.journal, "Ann Surg");
        assert_eq!(entry.action, ActionKind::Keep);
    }

    #[test]
    fn blank_line_is_ignored() {
        assert_eq!(parse_line("   "), Ok(None));
    }

    #[test]
    fn too_few_fields() {
        assert_eq!(
            parse_line("Jane Doe - Study - ADD"),
            Err(LineError::TooFewFields(3))
        );
    }

    #[test]
    fn empty_journal() {
        assert_eq!(
            parse_line("Jane Doe - Study of X -  - ADD"),
            Err(LineError::EmptyField("journal"))
        );
        assert_eq!(
            parse_line("Jane Doe - Study of X - \t - KEEP"),
            Err(LineError::EmptyField("journal"))
        );
    }

    #[test]
    fn unknown_action() {
        assert!(matches!(
            parse_line("Jane Doe - Study - JAMA - MAYBE"),
            Err(LineError::UnknownAction(_))
        ));
    }

    #[test]
    fn parse_file_collects_skips() {
        let content = "\
Jane Doe - Study of X - JAMA - ADD

Jane Doe - Study of Y - NEJM - delete
John Roe - Broken line
John Roe - Study of Z - Lancet - MAYBE
";
        let parsed = parse_actions(content);
        assert_eq!(parsed.entries, 2);
        assert_eq!(parsed.skipped.len(), 2);
        assert_eq!(parsed.skipped[0].0, 4);
        assert_eq!(parsed.skipped[1].0, 5);
        // John Roe is known but has no valid actions
        assert_eq!(parsed.actions.len(), 2);
        assert!(parsed.actions.get("John Roe").unwrap().is_empty());
        let jane = parsed.actions.get("Jane Doe").unwrap();
        assert_eq!(jane.get(ActionKind::Add).len(), 1);
        assert_eq!(jane.get(ActionKind::Delete).len(), 1);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("actions.txt");
        std::fs::write(&path, "Jane Doe - Study of X - JAMA - KEEP\n").unwrap();
        let parsed = load_actions(&path).unwrap();
        assert_eq!(parsed.entries, 1);
        assert!(parsed.skipped.is_empty());
    }
}
