//! Storefront adapters.
//!
//! Each adapter owns one source's wire protocol (endpoint, payload shape,
//! response schema) and maps native hits into [`Candidate`] records; the
//! shared [`crate::matching::best_match`] selector then picks the winner, so
//! matching policy is identical across all five sources.
//!
//! [`Candidate`]: crate::matching::Candidate

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::model::{Listing, Store};

pub mod fanatical;
pub mod greenmangaming;
pub mod humblebundle;
pub mod loaded;
pub mod steam;

pub use fanatical::FanaticalStore;
pub use greenmangaming::GreenManGamingStore;
pub use humblebundle::HumbleBundleStore;
pub use loaded::LoadedStore;
pub use steam::SteamStore;

/// A search-capable storefront. `find` resolves a title to this store's
/// best-matching listing; `Ok(None)` means the store has no corresponding
/// listing, which is a normal outcome, not an error.
#[async_trait]
pub trait Storefront: Send + Sync {
    fn store(&self) -> Store;

    async fn find(&self, title: &str) -> Result<Option<Listing>>;
}

/// Build the full adapter set. Fanatical needs a key-bootstrap round trip,
/// so construction is async; a failed bootstrap is fatal since it usually
/// signals a broken network rather than one flaky store.
pub async fn build_all(client: &Client) -> Result<Vec<Box<dyn Storefront>>> {
    let fanatical = FanaticalStore::bootstrap(client.clone()).await?;
    Ok(vec![
        Box::new(SteamStore::new(client.clone())),
        Box::new(fanatical),
        Box::new(GreenManGamingStore::new(client.clone())),
        Box::new(HumbleBundleStore::new(client.clone())),
        Box::new(LoadedStore::new(client.clone())),
    ])
}

/// POST a JSON payload to an Algolia-style search endpoint and decode the
/// response. These endpoints expect the JSON body to arrive as
/// `application/x-www-form-urlencoded`, matching what the storefront
/// frontends themselves send.
pub(crate) async fn algolia_query<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    payload: serde_json::Value,
) -> Result<T> {
    let resp = client
        .post(url)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(payload.to_string())
        .send()
        .await?;
    let status = resp.status();
    if !status.is_success() {
        let body = truncate_for_log(resp.text().await.unwrap_or_default(), 2000);
        return Err(anyhow!("search query failed: {status} url={url} body={body}"));
    }
    Ok(resp.json::<T>().await?)
}

/// Percent-encode a search query for embedding in an Algolia `params`
/// string. Spaces become `%20`, not `+`.
pub(crate) fn encode_query(title: &str) -> String {
    urlencoding::encode(title).into_owned()
}

pub(crate) fn truncate_for_log(mut s: String, max_len: usize) -> String {
    if s.len() > max_len {
        s.truncate(max_len);
        s.push('…');
    }
    s
}
