//! Live API tests. Run with: `cargo test --features online -- --nocapture`
#![cfg(feature = "online")]

use biodem_rs::api::Client;

#[test]
fn fetch_year_counts_for_sweden() {
    let cli = Client::default();
    let counts = cli.fetch_year_counts("SE", 300).unwrap();
    assert!(!counts.is_empty());
    assert!(counts.windows(2).all(|w| w[0].year < w[1].year));
    assert!(counts.iter().any(|c| c.records > 0));
}

#[test]
fn suggest_taxa_returns_matches() {
    let cli = Client::default();
    let suggestions = cli.suggest_taxa("Parus", 5).unwrap();
    assert!(!suggestions.is_empty());
    assert!(suggestions.len() <= 5);
}
