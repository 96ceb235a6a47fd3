use std::fmt;

use pubrecon_store::StoreError;

/// Why a resident or paper could not be applied.
#[derive(Debug)]
pub enum ApplyError {
    /// No database resident scored above the name threshold
    ResidentNotFound { name: String, best_score: Option<f64> },
    /// No linked publication in the journal scored above the delete threshold
    PublicationNotFound { title: String, best_score: Option<f64> },
    Persistence(StoreError),
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResidentNotFound {
                name,
                best_score: Some(score),
            } => write!(f, "no resident matches '{name}' (best score {score:.2})"),
            Self::ResidentNotFound { name, .. } => write!(f, "no resident matches '{name}'"),
            Self::PublicationNotFound {
                title,
                best_score: Some(score),
            } => write!(f, "publication not found: '{title}' (best score {score:.2})"),
            Self::PublicationNotFound { title, .. } => {
                write!(f, "publication not found: '{title}'")
            }
            Self::Persistence(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ApplyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Persistence(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for ApplyError {
    fn from(e: StoreError) -> Self {
        Self::Persistence(e)
    }
}
