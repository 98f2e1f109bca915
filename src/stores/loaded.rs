//! Loaded storefront adapter.
//!
//! Loaded runs a Magento shop behind Algolia; the application id and search
//! key are baked into the shop frontend's query URL, so the whole URL ships
//! as an env-overridable default. Hit fields arrive wrapped in per-store-view
//! `{"default": ...}` objects.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{algolia_query, encode_query, Storefront};
use crate::matching::{best_match, Candidate};
use crate::model::{Listing, Store};
use crate::util::env::env_opt;

const DEFAULT_SEARCH_URL: &str = "https://muvyib7tey-dsn.algolia.net/1/indexes/*/queries?x-algolia-agent=Algolia%20for%20JavaScript%20(3.35.1)%3B%20Browser%3B%20instantsearch.js%20(4.7.2)%3B%20Magento2%20integration%20(3.10.5)%3B%20JS%20Helper%20(3.2.2)&x-algolia-application-id=MUVYIB7TEY&x-algolia-api-key=ODNjY2VjZjExZGE2NTg3ZDkyMGQ4MjljYzYwM2U0NmRjYWI4MDgwNTQ0NjgzNmE2ZGQyY2ZmMDlkMzAyYTI4NXRhZ0ZpbHRlcnM9";
const SEARCH_INDEX: &str = "magento2_default_products";
const HITS_PER_PAGE: u32 = 5;

pub struct LoadedStore {
    client: Client,
    search_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    hits: Vec<LoadedHit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadedHit {
    pub name: LoadedField,
    #[serde(default)]
    pub url: LoadedField,
    #[serde(default)]
    pub price: LoadedPrice,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoadedField {
    #[serde(default)]
    pub default: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoadedPrice {
    #[serde(rename = "USD", default)]
    pub usd: LoadedUsdPrice,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadedUsdPrice {
    #[serde(default = "unknown_price")]
    pub default: f64,
}

impl Default for LoadedUsdPrice {
    fn default() -> Self {
        Self {
            default: unknown_price(),
        }
    }
}

fn unknown_price() -> f64 {
    -1.0
}

impl LoadedStore {
    pub fn new(client: Client) -> Self {
        let search_url = env_opt("LOADED_SEARCH_URL").unwrap_or_else(|| DEFAULT_SEARCH_URL.into());
        Self { client, search_url }
    }

    /// Loaded appends "PC" to most names; the normalizer's suffix stripping
    /// is what lets those still match exactly.
    pub fn pick(&self, title: &str, hits: &[LoadedHit]) -> Option<Listing> {
        let usable: Vec<&LoadedHit> = hits.iter().filter(|h| h.price.usd.default >= 0.0).collect();
        let candidates: Vec<Candidate> = usable
            .iter()
            .map(|h| {
                Candidate::new(
                    h.name.default.clone(),
                    h.price.usd.default,
                    h.url.default.clone(),
                )
            })
            .collect();
        let winner = best_match(title, &candidates)?;
        let hit = usable[winner];
        Some(Listing::Loaded {
            url: hit.url.default.clone(),
            price: hit.price.usd.default,
        })
    }
}

#[async_trait]
impl Storefront for LoadedStore {
    fn store(&self) -> Store {
        Store::Loaded
    }

    async fn find(&self, title: &str) -> Result<Option<Listing>> {
        let payload = json!({
            "requests": [{
                "indexName": SEARCH_INDEX,
                "params": format!("hitsPerPage={HITS_PER_PAGE}&query={}", encode_query(title)),
            }]
        });
        let resp: SearchResponse = algolia_query(&self.client, &self.search_url, payload)
            .await
            .with_context(|| format!("loaded search failed for {title:?}"))?;
        let hits = resp
            .results
            .into_iter()
            .next()
            .map(|r| r.hits)
            .unwrap_or_default();
        debug!(store = %Store::Loaded, title, hits = hits.len(), "search results");
        Ok(self.pick(title, &hits))
    }
}
