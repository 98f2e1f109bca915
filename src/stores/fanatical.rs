//! Fanatical storefront adapter.
//!
//! Fanatical fronts its catalog with Algolia and rotates the public search
//! key; `/api/algolia/key` hands out a short-lived key to anyone presenting
//! an anonymous id. The key is fetched once at construction and held
//! immutably for the life of the adapter, which comfortably outlasts the
//! key's validity window for a single CLI run.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{algolia_query, Storefront};
use crate::matching::{best_match, Candidate};
use crate::model::{Listing, Store};
use crate::util::env::env_opt;

const DEFAULT_KEY_URL: &str = "https://www.fanatical.com/api/algolia/key";
const DEFAULT_SEARCH_URL: &str =
    "https://w2m9492ddv-dsn.algolia.net/1/indexes/fan_alt_rank/query?x-algolia-api-key={key}&x-algolia-application-id=W2M9492DDV";
const ANON_ID: &str = "deadbeef-8888-8888-8888-deadbeef88";
const HITS_PER_PAGE: u32 = 5;

pub struct FanaticalStore {
    client: Client,
    search_url: String,
}

#[derive(Debug, Deserialize)]
struct KeyResponse {
    key: String,
    // validUntil is ignored: one CLI run finishes well inside the window.
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<FanaticalHit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FanaticalHit {
    pub name: String,
    #[serde(default)]
    pub price: FanaticalPrice,
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FanaticalPrice {
    #[serde(rename = "USD", default = "unknown_price")]
    pub usd: f64,
}

impl Default for FanaticalPrice {
    fn default() -> Self {
        Self {
            usd: unknown_price(),
        }
    }
}

fn unknown_price() -> f64 {
    -1.0
}

impl FanaticalStore {
    /// Fetch the rotating search key and build the adapter around it.
    pub async fn bootstrap(client: Client) -> Result<Self> {
        let key_url = env_opt("FANATICAL_KEY_URL").unwrap_or_else(|| DEFAULT_KEY_URL.into());
        let resp = client
            .get(&key_url)
            .header("anonid", ANON_ID)
            .send()
            .await
            .context("fanatical key request failed")?
            .error_for_status()?;
        let parsed: KeyResponse = resp.json().await.context("fanatical key response")?;
        if parsed.key.is_empty() {
            bail!("fanatical returned an empty search key");
        }

        let template = env_opt("FANATICAL_SEARCH_URL").unwrap_or_else(|| DEFAULT_SEARCH_URL.into());
        Ok(Self {
            client,
            search_url: template.replace("{key}", &parsed.key),
        })
    }

    pub fn pick(&self, title: &str, hits: &[FanaticalHit]) -> Option<Listing> {
        let usable: Vec<&FanaticalHit> = hits.iter().filter(|h| h.price.usd >= 0.0).collect();
        let candidates: Vec<Candidate> = usable
            .iter()
            .map(|h| Candidate::new(h.name.clone(), h.price.usd, h.slug.clone()))
            .collect();
        let winner = best_match(title, &candidates)?;
        let hit = usable[winner];
        Some(Listing::Fanatical {
            slug: hit.slug.clone(),
            price: hit.price.usd,
        })
    }
}

#[async_trait]
impl Storefront for FanaticalStore {
    fn store(&self) -> Store {
        Store::Fanatical
    }

    async fn find(&self, title: &str) -> Result<Option<Listing>> {
        let payload = json!({
            "query": title,
            "hitsPerPage": HITS_PER_PAGE,
            "filters": "",
        });
        let resp: SearchResponse = algolia_query(&self.client, &self.search_url, payload)
            .await
            .with_context(|| format!("fanatical search failed for {title:?}"))?;
        debug!(store = %Store::Fanatical, title, hits = resp.hits.len(), "search results");
        Ok(self.pick(title, &resp.hits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(name: &str, usd: f64, slug: &str) -> FanaticalHit {
        FanaticalHit {
            name: name.into(),
            price: FanaticalPrice { usd },
            slug: slug.into(),
        }
    }

    fn store() -> FanaticalStore {
        FanaticalStore {
            client: Client::new(),
            search_url: "unused".into(),
        }
    }

    #[test]
    fn close_but_inexact_hits_are_rejected() {
        // Fanatical pads thin result sets with near-miss names.
        let hits = vec![hit("Foobar 2", 9.99, "foobar-2")];
        assert_eq!(store().pick("Foobar", &hits), None);
    }

    #[test]
    fn exact_hit_wins_with_slug_carried_through() {
        let hits = vec![
            hit("Foobar 2", 9.99, "foobar-2"),
            hit("Foobar", 6.49, "foobar"),
        ];
        assert_eq!(
            store().pick("Foobar", &hits),
            Some(Listing::Fanatical {
                slug: "foobar".into(),
                price: 6.49
            })
        );
    }

    #[test]
    fn unknown_prices_never_reach_the_selector() {
        let hits = vec![hit("Foobar", -1.0, "foobar")];
        assert_eq!(store().pick("Foobar", &hits), None);
    }

    #[test]
    fn search_response_decodes_missing_price_as_unknown() {
        let raw = r#"{"hits":[{"name":"Foobar","slug":"foobar"}]}"#;
        let parsed: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.hits[0].price.usd, -1.0);
    }
}
