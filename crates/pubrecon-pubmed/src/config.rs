//! PubMed client configuration

use std::time::Duration;

/// Runtime configuration for the E-utilities client
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the E-utilities endpoints (trailing slash included)
    pub base_url: String,
    /// Contact address sent with every request, as NCBI asks
    pub email: Option<String>,
    /// Tool name sent with every request
    pub tool: String,
    /// NCBI API key; raises the request allowance from 3/s to 10/s
    pub api_key: Option<String>,
    /// `retmax` for esearch
    pub max_results: usize,
    /// Ids per efetch request
    pub batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/".to_string(),
            email: None,
            tool: "pubrecon".to_string(),
            api_key: None,
            max_results: 10_000,
            batch_size: 200,
        }
    }
}

impl Config {
    /// Minimum spacing between consecutive requests.
    pub fn request_interval(&self) -> Duration {
        if self.api_key.is_some() {
            Duration::from_millis(110)
        } else {
            Duration::from_millis(350)
        }
    }
}
