//! pubrecon-pubmed: harvest candidate publications from PubMed
//!
//! # Features
//!
//! - E-utilities client (esearch JSON ids, batched efetch XML)
//! - Streaming XML parsing with quick-xml
//! - Retry with backoff and a plain-name fallback per resident
//!
//! # Example
//!
//! ```ignore
//! use pubrecon_pubmed::{Config, PubmedClient, harvest};
//!
//! let client = PubmedClient::new(Config::default());
//! let out = harvest(&client, &residents, &RetryPolicy::default(), &ProgressBar::hidden());
//! save_candidates(&out.entries, "candidates.json".as_ref())?;
//! ```

pub mod client;
pub mod config;
pub mod harvest;
mod http;
pub mod parser;
pub mod query;

// Re-exports
pub use client::PubmedClient;
pub use config::Config;
pub use harvest::{Harvest, HarvestStats, harvest};
