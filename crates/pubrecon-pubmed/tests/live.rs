//! Queries against the live E-utilities service. Run with `--ignored`.

use pubrecon_core::{DateRange, LiteratureSource};
use pubrecon_pubmed::{Config, PubmedClient};

#[test]
#[ignore = "network"]
fn search_known_author() {
    let client = PubmedClient::new(Config {
        max_results: 5,
        ..Config::default()
    });
    let records = client
        .search(
            &["Fauci AS".to_string()],
            Some(DateRange {
                start_year: 2020,
                end_year: 2021,
            }),
        )
        .unwrap();
    assert!(!records.is_empty());
    assert!(records.iter().all(|r| r.title.is_some()));
}

#[test]
#[ignore = "network"]
fn unknown_author_returns_nothing() {
    let client = PubmedClient::new(Config::default());
    let records = client
        .search(&["Zzyzxqvw Qqqxyz".to_string()], None)
        .unwrap();
    assert!(records.is_empty());
}
