//! GreenManGaming storefront adapter.
//!
//! GMG's Algolia key is embedded in their search modal markup and has been
//! stable for years, so it ships as a default here and is only
//! env-overridable rather than fetched per run.

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

const DEFAULT_API_KEY: &str = "3bc4cebab2aa8cddab9e9a3cfad5aef3";
const DEFAULT_SEARCH_URL: &str =
    "https://sczizsp09z-dsn.algolia.net/1/indexes/*/queries?x-algolia-api-key={key}&x-algolia-application-id=SCZIZSP09Z";
const SEARCH_INDEX: &str = "prod_ProductSearch_US";

/// Sentinel GMG puts in `SteamAppId` for bundle products.
const BUNDLE_MARKER: &str = "BUNDLE";

pub struct GreenManGamingStore {
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
    hits: Vec<GmgHit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GmgHit {
    #[serde(rename = "DisplayName")]
    pub display_name: String,
    #[serde(rename = "SteamAppId", default)]
    pub steam_app_id: String,
    #[serde(rename = "Url", default)]
    pub url: String,
    #[serde(rename = "Regions", default)]
    pub regions: GmgRegions,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GmgRegions {
    #[serde(rename = "US", default)]
    pub us: GmgRegionDetails,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GmgRegionDetails {
    /// Dynamic regional price ("Drp") in USD.
    #[serde(rename = "Drp", default = "unknown_price")]
    pub price: f64,
}

impl Default for GmgRegionDetails {
    fn default() -> Self {
        Self {
            price: unknown_price(),
        }
    }
}

fn unknown_price() -> f64 {
    -1.0
}

impl GreenManGamingStore {
    pub fn new(client: Client) -> Self {
        let key = env_opt("GMG_API_KEY").unwrap_or_else(|| DEFAULT_API_KEY.into());
        let template = env_opt("GMG_SEARCH_URL").unwrap_or_else(|| DEFAULT_SEARCH_URL.into());
        Self {
            client,
            search_url: template.replace("{key}", &key),
        }
    }

    pub fn pick(&self, title: &str, hits: &[GmgHit]) -> Option<Listing> {
        let usable: Vec<&GmgHit> = hits
            .iter()
            .filter(|h| {
                if h.steam_app_id.trim() == BUNDLE_MARKER {
                    debug!(store = %Store::GreenManGaming, name = %h.display_name, "skipping bundle hit");
                    return false;
                }
                h.regions.us.price >= 0.0
            })
            .collect();
        let candidates: Vec<Candidate> = usable
            .iter()
            .map(|h| Candidate::new(h.display_name.clone(), h.regions.us.price, h.url.clone()))
            .collect();
        let winner = best_match(title, &candidates)?;
        let hit = usable[winner];
        Some(Listing::GreenManGaming {
            path: hit.url.clone(),
            price: hit.regions.us.price,
        })
    }
}

#[async_trait]
impl Storefront for GreenManGamingStore {
    fn store(&self) -> Store {
        Store::GreenManGaming
    }

    async fn find(&self, title: &str) -> Result<Option<Listing>> {
        let payload = json!({
            "requests": [{
                "indexName": SEARCH_INDEX,
                "params": format!("query={}", encode_query(title)),
            }]
        });
        let resp: SearchResponse = algolia_query(&self.client, &self.search_url, payload)
            .await
            .with_context(|| format!("greenmangaming search failed for {title:?}"))?;
        let hits = resp
            .results
            .into_iter()
            .next()
            .map(|r| r.hits)
            .unwrap_or_default();
        debug!(store = %Store::GreenManGaming, title, hits = hits.len(), "search results");
        Ok(self.pick(title, &hits))
    }
}
