//! HumbleBundle storefront adapter.
//!
//! The search key is served inline on the homepage in a JSON script tag and
//! is effectively static. Hits carry pricing as a `[price, currency]` string
//! pair per country and a delivery-method list; only Steam-delivered,
//! US-priced products are comparable with the other stores.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::{algolia_query, encode_query, Storefront};
use crate::matching::{best_match, Candidate};
use crate::model::{Listing, Store};
use crate::util::env::env_opt;

const DEFAULT_API_KEY: &str = "5229f8b3dec4b8ad265ad17ead42cb7f";
const DEFAULT_SEARCH_URL: &str =
    "https://ayszewdaz2-dsn.algolia.net/1/indexes/replica_product_query_site_search/query?x-algolia-application-id=AYSZEWDAZ2&x-algolia-api-key={key}";
const HITS_PER_PAGE: u32 = 5;
const STEAM_DELIVERY: &str = "steam";

pub struct HumbleBundleStore {
    client: Client,
    search_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<HumbleHit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HumbleHit {
    #[serde(rename = "human_name")]
    pub name: String,
    #[serde(rename = "link", default)]
    pub path: String,
    #[serde(rename = "delivery_methods", default)]
    pub delivery: Vec<String>,
    #[serde(rename = "current_pricing", default)]
    pub pricing: HumblePricing,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HumblePricing {
    /// `[price, currency]` string pair; empty when the product has no US
    /// storefront presence.
    #[serde(rename = "US", default)]
    pub us: Vec<String>,
}

impl HumbleHit {
    fn steam_delivered(&self) -> bool {
        self.delivery.iter().any(|d| d == STEAM_DELIVERY)
    }

    fn us_price(&self) -> Option<f64> {
        self.pricing.us.first()?.parse().ok()
    }
}

impl HumbleBundleStore {
    pub fn new(client: Client) -> Self {
        let key = env_opt("HUMBLE_API_KEY").unwrap_or_else(|| DEFAULT_API_KEY.into());
        let template = env_opt("HUMBLE_SEARCH_URL").unwrap_or_else(|| DEFAULT_SEARCH_URL.into());
        Self {
            client,
            search_url: template.replace("{key}", &key),
        }
    }

    pub fn pick(&self, title: &str, hits: &[HumbleHit]) -> Option<Listing> {
        let mut usable = Vec::new();
        let mut candidates = Vec::new();
        for hit in hits {
            if !hit.steam_delivered() {
                debug!(store = %Store::HumbleBundle, name = %hit.name, "skipping non-steam delivery");
                continue;
            }
            let Some(price) = hit.us_price() else {
                if !hit.pricing.us.is_empty() {
                    warn!(store = %Store::HumbleBundle, name = %hit.name, "unparseable US price");
                }
                continue;
            };
            candidates.push(Candidate::new(hit.name.clone(), price, hit.path.clone()));
            usable.push((hit, price));
        }
        let winner = best_match(title, &candidates)?;
        let (hit, price) = usable[winner];
        Some(Listing::HumbleBundle {
            path: hit.path.clone(),
            price,
        })
    }
}

#[async_trait]
impl Storefront for HumbleBundleStore {
    fn store(&self) -> Store {
        Store::HumbleBundle
    }

    async fn find(&self, title: &str) -> Result<Option<Listing>> {
        let payload = json!({
            "params": format!(
                "query={}&hitsPerPage={HITS_PER_PAGE}&page=0",
                encode_query(title)
            ),
        });
        let resp: SearchResponse = algolia_query(&self.client, &self.search_url, payload)
            .await
            .with_context(|| format!("humblebundle search failed for {title:?}"))?;
        debug!(store = %Store::HumbleBundle, title, hits = resp.hits.len(), "search results");
        Ok(self.pick(title, &resp.hits))
    }
}
