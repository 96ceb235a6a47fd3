//! Author name variants and author-list lookup.

use crate::model::{AuthorName, AuthorPosition, ResidentRecord};

/// A personal name split into first, middle and last parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameParts {
    pub first: String,
    pub middle: Option<String>,
    pub last: String,
}

impl NameParts {
    /// Split on whitespace: first token, last token, everything between is
    /// the middle name. Returns `None` for fewer than two tokens.
    pub fn split(full_name: &str) -> Option<Self> {
        let tokens: Vec<&str> = full_name.split_whitespace().collect();
        if tokens.len() < 2 {
            return None;
        }
        let middle = (tokens.len() > 2).then(|| tokens[1..tokens.len() - 1].join(" "));
        Some(Self {
            first: tokens[0].to_string(),
            middle,
            last: tokens[tokens.len() - 1].to_string(),
        })
    }
}

fn initial(s: &str) -> Option<char> {
    s.chars().next().map(|c| c.to_ascii_uppercase())
}

/// Spellings under which an author may be indexed by literature databases.
///
/// `Jane Marie Doe` yields `Doe J`, `Doe, J.`, `Jane Doe`, `J. Doe`,
/// `Doe, Jane`, `JDoe` and the middle-name forms `Doe JM`, `Doe, J.M.`,
/// `Jane Marie Doe`, `Jane M. Doe`, `J.M. Doe`, `J. M. Doe`,
/// `Doe, Jane Marie`. A single-token name yields only itself.
pub fn name_variants(full_name: &str) -> Vec<String> {
    let Some(parts) = NameParts::split(full_name) else {
        let trimmed = full_name.trim();
        return if trimmed.is_empty() {
            Vec::new()
        } else {
            vec![trimmed.to_string()]
        };
    };

    let NameParts { first, middle, last } = &parts;
    let Some(fi) = initial(first) else {
        return Vec::new();
    };

    let mut variants = vec![
        format!("{last} {fi}"),
        format!("{last}, {fi}."),
        format!("{first} {last}"),
        format!("{fi}. {last}"),
        format!("{last}, {first}"),
        format!("{fi}{last}"),
    ];

    if let Some(middle) = middle {
        if let Some(mi) = initial(middle) {
            variants.extend([
                format!("{last} {fi}{mi}"),
                format!("{last}, {fi}.{mi}."),
                format!("{first} {middle} {last}"),
                format!("{first} {mi}. {last}"),
                format!("{fi}.{mi}. {last}"),
                format!("{fi}. {mi}. {last}"),
                format!("{last}, {first} {middle}"),
            ]);
        }
    }

    variants
}

fn middle_initial_of(author: &AuthorName) -> Option<char> {
    // "Jane M" style fore names carry the middle initial as a second token
    let from_fore = author
        .fore_name
        .as_deref()
        .and_then(|f| f.split_whitespace().nth(1))
        .and_then(initial);
    from_fore.or_else(|| {
        author
            .initials
            .as_deref()
            .and_then(|i| i.chars().filter(|c| c.is_alphabetic()).nth(1))
            .map(|c| c.to_ascii_uppercase())
    })
}

/// Index of `resident` within `authors`.
///
/// First and last names must agree case-insensitively (the first token of
/// the listed fore name is used). Middle initials must agree only when both
/// sides have one.
pub fn find_in_author_list(resident: &ResidentRecord, authors: &[AuthorName]) -> Option<usize> {
    let first = resident.first_name.trim().to_lowercase();
    let last = resident.last_name.trim().to_lowercase();
    let resident_mi = resident.middle_name.as_deref().and_then(initial);

    authors.iter().position(|author| {
        let author_first = author
            .fore_name
            .as_deref()
            .and_then(|f| f.split_whitespace().next())
            .unwrap_or("")
            .to_lowercase();
        let author_last = author.last_name.as_deref().unwrap_or("").trim().to_lowercase();

        let mi_match = match (resident_mi, middle_initial_of(author)) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        };
        author_first == first && author_last == last && mi_match
    })
}

/// Position of `resident` within `authors`, if listed.
pub fn authorship(resident: &ResidentRecord, authors: &[AuthorName]) -> Option<AuthorPosition> {
    find_in_author_list(resident, authors).map(|i| AuthorPosition::from_index(i, authors.len()))
}
