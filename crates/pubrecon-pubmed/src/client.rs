//! NCBI E-utilities client (esearch + efetch)

use std::cell::Cell;
use std::time::Instant;

use pubrecon_core::{DateRange, LiteratureSource, RawCandidate, SourceError};
use serde::Deserialize;

use crate::config::Config;
use crate::http::get_text;
use crate::parser::parse_efetch_xml;
use crate::query::author_query;

#[derive(Debug, Deserialize)]
struct EsearchResponse {
    esearchresult: EsearchResult,
}

#[derive(Debug, Deserialize)]
struct EsearchResult {
    #[serde(default)]
    idlist: Vec<String>,
    #[serde(default, rename = "ERROR")]
    error: Option<String>,
}

/// Extract the PMID list from an esearch JSON body.
pub fn parse_esearch_json(body: &str) -> Result<Vec<String>, SourceError> {
    let response: EsearchResponse =
        serde_json::from_str(body).map_err(|e| SourceError::Parse(e.to_string()))?;
    if let Some(message) = response.esearchresult.error {
        return Err(SourceError::Query {
            status: None,
            message,
        });
    }
    Ok(response.esearchresult.idlist)
}

/// PubMed as a [`LiteratureSource`].
///
/// Requests are spaced by [`Config::request_interval`] to stay inside the
/// NCBI allowance.
pub struct PubmedClient {
    config: Config,
    last_request: Cell<Option<Instant>>,
}

impl PubmedClient {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            last_request: Cell::new(None),
        }
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{name}", self.config.base_url.trim_end_matches('/'))
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("db", "pubmed".to_string()), ("tool", self.config.tool.clone())];
        if let Some(email) = &self.config.email {
            params.push(("email", email.clone()));
        }
        if let Some(key) = &self.config.api_key {
            params.push(("api_key", key.clone()));
        }
        params
    }

    fn throttle(&self) {
        if let Some(last) = self.last_request.get() {
            let wait = self.config.request_interval().saturating_sub(last.elapsed());
            if !wait.is_zero() {
                std::thread::sleep(wait);
            }
        }
        self.last_request.set(Some(Instant::now()));
    }

    /// PMIDs matching `term`, at most `max_results`.
    pub fn esearch(&self, term: &str) -> Result<Vec<String>, SourceError> {
        let mut params = self.params();
        params.push(("term", term.to_string()));
        params.push(("retmode", "json".to_string()));
        params.push(("retmax", self.config.max_results.to_string()));

        self.throttle();
        let body = get_text(&self.endpoint("esearch.fcgi"), &params)?;
        parse_esearch_json(&body)
    }

    /// Full records for `ids`, fetched in batches of `batch_size`.
    pub fn efetch(&self, ids: &[String]) -> Result<Vec<RawCandidate>, SourceError> {
        let mut records = Vec::with_capacity(ids.len());
        for batch in ids.chunks(self.config.batch_size.max(1)) {
            let mut params = self.params();
            params.push(("id", batch.join(",")));
            params.push(("retmode", "xml".to_string()));

            self.throttle();
            let body = get_text(&self.endpoint("efetch.fcgi"), &params)?;
            let parsed = parse_efetch_xml(&body).map_err(|e| SourceError::Parse(format!("{e:#}")))?;
            log::debug!("efetch: {} ids -> {} records", batch.len(), parsed.len());
            records.extend(parsed);
        }
        Ok(records)
    }
}

impl LiteratureSource for PubmedClient {
    fn name(&self) -> &str {
        "PubMed"
    }

    fn search(
        &self,
        name_variants: &[String],
        range: Option<DateRange>,
    ) -> Result<Vec<RawCandidate>, SourceError> {
        let term = author_query(name_variants, range)?;
        log::debug!("esearch term: {term}");
        let ids = self.esearch(&term)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.efetch(&ids)
    }
}
