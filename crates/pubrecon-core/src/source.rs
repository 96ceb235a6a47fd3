//! Literature source abstraction.

use std::fmt;

use crate::model::RawCandidate;

/// Inclusive publication-year window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start_year: i32,
    pub end_year: i32,
}

/// Error from querying a literature source.
#[derive(Debug)]
pub enum SourceError {
    /// HTTP 429 or an equivalent throttling signal
    RateLimited,
    /// Query rejected by the service, with optional HTTP status
    Query {
        status: Option<u16>,
        message: String,
    },
    /// Connection, timeout or body read failure
    Transport(String),
    /// Query string is unusable (empty after sanitizing, etc.)
    InvalidQuery(String),
    /// Response could not be decoded
    Parse(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate limited"),
            Self::Query {
                status: Some(s),
                message,
            } => write!(f, "query failed (HTTP {s}): {message}"),
            Self::Query {
                status: None,
                message,
            } => write!(f, "query failed: {message}"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::InvalidQuery(msg) => write!(f, "invalid query: {msg}"),
            Self::Parse(msg) => write!(f, "unparseable response: {msg}"),
        }
    }
}

impl std::error::Error for SourceError {}

impl SourceError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited | Self::Transport(_) => true,
            Self::Query { status, .. } => matches!(status, Some(500..=599)),
            Self::InvalidQuery(_) | Self::Parse(_) => false,
        }
    }
}

/// A searchable bibliographic database.
pub trait LiteratureSource {
    /// Short label used in log lines.
    fn name(&self) -> &str;

    /// Records authored under any of `name_variants`, optionally restricted
    /// to a publication-year window.
    fn search(
        &self,
        name_variants: &[String],
        range: Option<DateRange>,
    ) -> Result<Vec<RawCandidate>, SourceError>;
}
