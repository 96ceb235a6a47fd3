//! Blocking HTTP GET over a shared async client.
//!
//! Uses async reqwest on a small shared tokio runtime but presents a sync
//! interface, since the harvest runs one request at a time.

use std::sync::LazyLock;
use std::time::Duration;

use pubrecon_core::SourceError;

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Whole-request timeout; efetch batches can be slow
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .pool_max_idle_per_host(2)
        .build()
        .expect("failed to build HTTP client")
});

/// Shared tokio runtime for HTTP operations.
static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// Classify a reqwest error: 429 is throttling, any other status is a
/// query error, no status means the transport failed.
pub fn source_error(e: &reqwest::Error) -> SourceError {
    match e.status().map(|s| s.as_u16()) {
        Some(429) => SourceError::RateLimited,
        Some(status) => SourceError::Query {
            status: Some(status),
            message: e.to_string(),
        },
        None => SourceError::Transport(e.to_string()),
    }
}

/// GET `url` with query `params` and return the body as text.
pub fn get_text(url: &str, params: &[(&str, String)]) -> Result<String, SourceError> {
    SHARED_RUNTIME.handle().block_on(async {
        let response = SHARED_CLIENT
            .get(url)
            .query(params)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| source_error(&e))?;
        response.text().await.map_err(|e| source_error(&e))
    })
}
