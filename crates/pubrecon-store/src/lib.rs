//! pubrecon-store: relational store for residents, authors and publications
//!
//! A closed table/column vocabulary, a parameterized statement builder and
//! the [`Store`] trait, with a DuckDB implementation.

mod duck;
mod error;
pub mod links;
pub mod query;
pub mod residents;
pub mod schema;
mod status;
mod store;

pub use duck::DuckStore;
pub use error::StoreError;
pub use links::{Unlinked, link, linked_publications, orphan_publications, remove_if_orphan, unlink};
pub use query::{Conditions, Fields, Value};
pub use residents::{ImportSummary, add_resident, import_residents_csv, load_residents};
pub use schema::{Column, Table};
pub use status::{StoreStatus, status};
pub use store::{Row, Store};
