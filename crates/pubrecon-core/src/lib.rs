//! pubrecon core: matching and reconciliation primitives
//!
//! String similarity, the record model, the curated action file parser,
//! name variants, the candidate index, publication/resident matchers and the
//! match report, plus the literature-source seam with its retry policy.

pub mod actions;
pub mod candidates;
pub mod logging;
pub mod matcher;
pub mod model;
pub mod names;
pub mod progress;
pub mod report;
pub mod retry;
pub mod similarity;
pub mod source;

// Re-exports for convenience
pub use actions::{LineError, ParsedActions, load_actions, parse_actions};
pub use candidates::{CandidateIndex, ResidentCandidates, save_candidates};
pub use logging::{IndicatifLogger, init_logging, truncate};
pub use matcher::{
    FALLBACK_TITLE_THRESHOLD, FallbackMode, JOURNAL_TITLE_THRESHOLD, NAME_THRESHOLD, NameMatch,
    PublicationMatcher, best_resident, match_resident,
};
pub use model::{
    ActionEntry, ActionKind, AuthorName, AuthorPosition, CandidatePublication, PaperRef,
    RawCandidate, ResidentActionSet, ResidentRecord, ValidationError,
};
pub use progress::{ProgressContext, fmt_num, fmt_ratio};
pub use report::{
    ActionReport, KindBreakdown, MatchReport, MatchResult, MatchStatus, ResidentReport, Summary,
    build_report,
};
pub use retry::{RetryPolicy, retry_with_backoff};
pub use similarity::{ratio, same_text};
pub use source::{DateRange, LiteratureSource, SourceError};
