//! Steam storefront adapter.
//!
//! Steam has no public JSON search for this use case; the search-suggest
//! endpoint returns an HTML fragment where each result is an `<a>` block
//! carrying the app id as a data attribute, with the display name and price
//! in classed `<div>`s underneath. We tokenize the fragment with anchored
//! regexes instead of a full HTML parse; the fragment never contains the
//! page chrome a real document would.

use anyhow::{Context, Result};
use async_trait::async_trait;
use itertools::Itertools;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, warn};

use super::Storefront;
use crate::matching::{best_match, Candidate};
use crate::model::{Listing, Store};
use crate::util::env::env_opt;

const DEFAULT_SUGGEST_URL: &str = "https://store.steampowered.com/search/suggest";

pub struct SteamStore {
    client: Client,
    suggest_url: String,
    anchor_re: Regex,
    app_id_re: Regex,
    bundle_id_re: Regex,
    name_re: Regex,
    price_re: Regex,
}

/// One parsed suggest-fragment result. Bundles carry a bundle id instead of
/// an app id; a missing price stays `None` (unreleased or region-hidden).
#[derive(Debug, Clone, PartialEq)]
pub struct SteamHit {
    pub app_id: Option<u64>,
    pub bundle_id: Option<u64>,
    pub name: String,
    pub price: Option<f64>,
}

impl SteamStore {
    pub fn new(client: Client) -> Self {
        let suggest_url =
            env_opt("STEAM_SUGGEST_URL").unwrap_or_else(|| DEFAULT_SUGGEST_URL.into());
        Self {
            client,
            suggest_url,
            // The patterns are static literals; compilation cannot fail.
            anchor_re: Regex::new(r"(?s)<a\s[^>]*>.*?</a>").unwrap(),
            app_id_re: Regex::new(r#"data-ds-appid="(\d+)""#).unwrap(),
            bundle_id_re: Regex::new(r#"data-ds-bundleid="(\d+)""#).unwrap(),
            name_re: Regex::new(r#"(?s)<div class="match_name">(.*?)</div>"#).unwrap(),
            price_re: Regex::new(r#"(?s)<div class="match_price">(.*?)</div>"#).unwrap(),
        }
    }

    /// Extract result blocks from the suggest fragment. Blocks missing both
    /// ids or missing a name are dropped with a warning rather than failing
    /// the whole page.
    pub fn parse_suggest_fragment(&self, html: &str) -> Vec<SteamHit> {
        let mut hits = Vec::new();
        for block in self.anchor_re.find_iter(html) {
            let block = block.as_str();
            let app_id = capture_u64(&self.app_id_re, block);
            let bundle_id = capture_u64(&self.bundle_id_re, block);
            let name = self
                .name_re
                .captures(block)
                .map(|c| c[1].trim().to_string())
                .unwrap_or_default();

            if (app_id.is_none() && bundle_id.is_none()) || name.is_empty() {
                warn!(store = %Store::Steam, "dropping partially parsed result block");
                continue;
            }

            let price = self
                .price_re
                .captures(block)
                .and_then(|c| parse_price(c[1].trim()));
            hits.push(SteamHit {
                app_id,
                bundle_id,
                name,
                price,
            });
        }
        hits
    }

    /// Run the shared selector over the parsed hits and build the winning
    /// listing. Bundle hits and hits without a usable price never become
    /// candidates.
    pub fn pick(&self, title: &str, hits: &[SteamHit]) -> Option<Listing> {
        let usable: Vec<&SteamHit> = hits
            .iter()
            .filter(|h| {
                if h.app_id.is_none() {
                    debug!(store = %Store::Steam, name = %h.name, "skipping bundle hit");
                    return false;
                }
                if h.price.is_none() {
                    debug!(store = %Store::Steam, name = %h.name, "skipping unpriced hit");
                    return false;
                }
                true
            })
            .collect();

        let candidates: Vec<Candidate> = usable
            .iter()
            .map(|h| {
                Candidate::new(
                    h.name.clone(),
                    h.price.unwrap_or_default(),
                    h.app_id.unwrap_or_default().to_string(),
                )
            })
            .collect();

        let winner = best_match(title, &candidates)?;
        let hit = usable[winner];
        Some(Listing::Steam {
            app_id: hit.app_id?,
            price: hit.price?,
        })
    }
}

fn capture_u64(re: &Regex, haystack: &str) -> Option<u64> {
    re.captures(haystack).and_then(|c| c[1].parse().ok())
}

/// Price text is either the word "Free" somewhere in the div, or a currency
/// glyph followed by the amount ("$7.99"). Unparseable text maps to `None`.
fn parse_price(text: &str) -> Option<f64> {
    if text.contains("Free") {
        return Some(0.0);
    }
    let mut chars = text.chars();
    chars.next()?;
    chars.as_str().trim().parse::<f64>().ok()
}

#[async_trait]
impl Storefront for SteamStore {
    fn store(&self) -> Store {
        Store::Steam
    }

    async fn find(&self, title: &str) -> Result<Option<Listing>> {
        // Steam's suggest endpoint wants words joined by '+'.
        let term = title.split_whitespace().join("+");
        let url = format!("{}?term={term}&f=games&cc=US", self.suggest_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("steam suggest request failed for {title:?}"))?
            .error_for_status()?;
        let body = resp.text().await?;
        let hits = self.parse_suggest_fragment(&body);
        debug!(store = %Store::Steam, title, hits = hits.len(), "parsed suggest results");
        Ok(self.pick(title, &hits))
    }
}
