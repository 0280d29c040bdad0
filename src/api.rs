//! Synchronous client for the **GBIF occurrence API (v1)**.
//!
//! This module focuses on the year-facet query behind the dual chart (how
//! many occurrence records a country has per collection year) and the taxon
//! suggest endpoint behind the autocomplete box. Failures are captured per
//! query category in an [`ErrorStore`], so a broken autocomplete never
//! clobbers a good year-facet result or vice versa.
//!
//! ### Notes
//! - Facet counts come back with the year as a string `name`; entries whose
//!   year fails to parse are dropped.
//! - Network timeouts use a sane default (30s); transient 5xx responses are
//!   retried with a short backoff.

use crate::models::RecordCount;
use anyhow::{bail, Context, Result};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Distinct external query categories; one error slot each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryCategory {
    YearFacets,
    TaxonSuggest,
}

/// One captured query failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryError {
    pub category: QueryCategory,
    pub message: String,
}

/// Keyed error surface: at most one error per query category, so unrelated
/// failures do not overwrite each other.
#[derive(Debug, Default)]
pub struct ErrorStore {
    errors: HashMap<QueryCategory, QueryError>,
}

impl ErrorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a result: an `Ok` clears the category's slot, an `Err` fills
    /// it. Returns the payload for the caller to keep using.
    pub fn capture<T>(&mut self, category: QueryCategory, result: Result<T>) -> Option<T> {
        match result {
            Ok(v) => {
                self.errors.remove(&category);
                Some(v)
            }
            Err(e) => {
                log::warn!("{:?} query failed: {:#}", category, e);
                self.errors.insert(
                    category,
                    QueryError {
                        category,
                        message: format!("{:#}", e),
                    },
                );
                None
            }
        }
    }

    pub fn get(&self, category: QueryCategory) -> Option<&QueryError> {
        self.errors.get(&category)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Taxon autocomplete entry from the suggest endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaxonSuggestion {
    pub key: i64,
    #[serde(rename = "scientificName")]
    pub scientific_name: String,
    pub rank: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    http: HttpClient,
}

impl Default for Client {
    fn default() -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30)) // total request timeout
            .connect_timeout(Duration::from_secs(10)) // connect timeout
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("biodem_rs/", env!("CARGO_PKG_VERSION"))) // set user agent
            .build()
            .expect("reqwest client build");
        Self {
            base_url: "https://api.gbif.org/v1".into(),
            http,
        }
    }
}

// Allow -, _, . unescaped in query values (common for taxon names).
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc(part: &str) -> String {
    percent_encoding::utf8_percent_encode(part.trim(), SAFE).to_string()
}

impl Client {
    /// Fetch per-year occurrence record counts for one country (ISO2 code).
    ///
    /// Issues a zero-row search with a `year` facet and parses the facet
    /// counts; the result is sorted by ascending year.
    pub fn fetch_year_counts(&self, country_iso2: &str, facet_limit: u32) -> Result<Vec<RecordCount>> {
        if country_iso2.trim().is_empty() {
            bail!("country code required");
        }
        let url = format!(
            "{}/occurrence/search?country={}&facet=year&facetLimit={}&limit=0",
            self.base_url,
            enc(country_iso2),
            facet_limit
        );
        let v = self.get_json(&url).with_context(|| format!("GET {}", url))?;
        parse_year_facets(&v)
    }

    /// Taxon autocomplete: scientific-name suggestions for a prefix.
    pub fn suggest_taxa(&self, query: &str, limit: u32) -> Result<Vec<TaxonSuggestion>> {
        let url = format!(
            "{}/species/suggest?q={}&limit={}",
            self.base_url,
            enc(query),
            limit
        );
        let v = self.get_json(&url).with_context(|| format!("GET {}", url))?;
        serde_json::from_value(v).context("parse taxon suggestions")
    }

    // Small retry for transient failures (5xx / network errors)
    fn get_json(&self, url: &str) -> Result<Value> {
        let mut last_err: Option<anyhow::Error> = None;
        for backoff_ms in [100u64, 300, 700] {
            match self.http.get(url).send() {
                Ok(r) if r.status().is_success() => {
                    return r.json().context("decode json");
                }
                Ok(r) if r.status().is_server_error() => { /* retry */ }
                Ok(r) => bail!("request failed with HTTP {}", r.status()),
                Err(e) => last_err = Some(e.into()),
            }
            std::thread::sleep(Duration::from_millis(backoff_ms));
        }
        bail!("network error: {:?}", last_err);
    }
}

/// Parse the `facets` section of an occurrence-search response into year
/// counts. Facet entries with a non-numeric year are dropped.
pub fn parse_year_facets(v: &Value) -> Result<Vec<RecordCount>> {
    #[derive(Deserialize)]
    struct Facet {
        field: String,
        counts: Vec<FacetCount>,
    }
    #[derive(Deserialize)]
    struct FacetCount {
        name: String,
        count: u64,
    }

    let facets: Vec<Facet> = serde_json::from_value(
        v.get("facets")
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unexpected response shape: no facets"))?,
    )
    .context("parse facets")?;

    let year_facet = facets
        .into_iter()
        .find(|f| f.field.eq_ignore_ascii_case("year"))
        .ok_or_else(|| anyhow::anyhow!("response has no year facet"))?;

    let mut out: Vec<RecordCount> = year_facet
        .counts
        .into_iter()
        .filter_map(|c| {
            c.name
                .trim()
                .parse::<i32>()
                .ok()
                .map(|year| RecordCount { year, records: c.count })
        })
        .collect();
    out.sort_by_key(|c| c.year);
    Ok(out)
}
