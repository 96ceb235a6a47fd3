//! pubrecon-apply: apply a match report to the publication store
//!
//! Resolves each report resident against the database by fuzzy name match,
//! then adds, deletes and prunes author/publication links.

mod applier;
mod error;
mod stats;

pub use applier::{Applier, ApplyOptions, DELETE_THRESHOLD};
pub use error::ApplyError;
pub use stats::{ActionStats, KeepStats, Stats};
