//! Entrez search-term construction

use pubrecon_core::{DateRange, SourceError};

/// Strip C0/C1 control characters, collapse runs of whitespace and trim.
///
/// An empty result is an [`SourceError::InvalidQuery`].
pub fn sanitize(query: &str) -> Result<String, SourceError> {
    let cleaned: String = query
        .chars()
        .filter(|c| !matches!(*c as u32, 0x00..=0x1F | 0x7F..=0x9F))
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return Err(SourceError::InvalidQuery(
            "query is empty after sanitizing".to_string(),
        ));
    }
    Ok(collapsed)
}

/// `(<variant>[Author] AND <start>/01/01:<end>[Date - Publication]) OR ...`
///
/// Without a range each clause is just `(<variant>[Author])`. Blank variants
/// are dropped.
pub fn author_query(variants: &[String], range: Option<DateRange>) -> Result<String, SourceError> {
    let clauses: Vec<String> = variants
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| match range {
            Some(r) => format!(
                "({v}[Author] AND {}/01/01:{}[Date - Publication])",
                r.start_year, r.end_year
            ),
            None => format!("({v}[Author])"),
        })
        .collect();
    sanitize(&clauses.join(" OR "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_controls_and_collapses() {
        assert_eq!(sanitize("  Doe\u{0007} J \u{0085}  ").unwrap(), "Doe J");
        assert_eq!(sanitize("Doe   Jane").unwrap(), "Doe Jane");
    }

    #[test]
    fn sanitize_rejects_empty() {
        let err = sanitize(" \u{0000}\u{001F} ").unwrap_err();
        assert!(matches!(err, SourceError::InvalidQuery(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn query_with_range() {
        let variants = vec!["Doe J".to_string(), "Jane Doe".to_string()];
        let range = DateRange {
            start_year: 2014,
            end_year: 2020,
        };
        assert_eq!(
            author_query(&variants, Some(range)).unwrap(),
            "(Doe J[Author] AND 2014/01/01:2020[Date - Publication]) OR \
             (Jane Doe[Author] AND 2014/01/01:2020[Date - Publication])"
        );
    }

    #[test]
    fn query_without_range() {
        let variants = vec!["Jane Doe".to_string(), "  ".to_string()];
        assert_eq!(author_query(&variants, None).unwrap(), "(Jane Doe[Author])");
    }

    #[test]
    fn no_variants_is_invalid() {
        assert!(matches!(
            author_query(&[], None),
            Err(SourceError::InvalidQuery(_))
        ));
    }
}
