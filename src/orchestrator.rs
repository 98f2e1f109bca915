//! Fan-out/fan-in over titles and stores.
//!
//! One task per title, gated by a semaphore; inside a task the five store
//! lookups run concurrently. Each task emits a single [`PriceReport`]
//! message to the collector, so aggregation is message passing with no
//! shared collections. A store that errors for one title degrades to "no
//! offer from that store" — it must not sink the whole title row.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{mpsc, Semaphore};
use tracing::{info, warn};

use crate::model::{PriceReport, TitleQuery};
use crate::stores::Storefront;

pub const DEFAULT_PARALLELISM: usize = 10;

pub async fn run(
    stores: Arc<Vec<Box<dyn Storefront>>>,
    queries: Vec<TitleQuery>,
    parallelism: usize,
) -> Vec<PriceReport> {
    let semaphore = Arc::new(Semaphore::new(parallelism.max(1)));
    let (tx, mut rx) = mpsc::channel(parallelism.max(1));

    let expected = queries.len();
    for query in queries {
        let stores = Arc::clone(&stores);
        let semaphore = Arc::clone(&semaphore);
        let tx = tx.clone();
        tokio::spawn(async move {
            // The semaphore is never closed while tasks run.
            let _permit = semaphore.acquire_owned().await;
            let report = lookup_title(&stores, query).await;
            let _ = tx.send(report).await;
        });
    }
    drop(tx);

    let mut reports = Vec::with_capacity(expected);
    while let Some(report) = rx.recv().await {
        reports.push(report);
    }
    reports
}

async fn lookup_title(stores: &[Box<dyn Storefront>], query: TitleQuery) -> PriceReport {
    info!(title = %query.name, "fetching offers");
    let lookups = stores.iter().map(|s| {
        let title = query.name.clone();
        async move { (s.store(), s.find(&title).await) }
    });
    // Await before building the report: the lazy lookup futures borrow
    // `query.name` until driven to completion.
    let outcomes = join_all(lookups).await;

    let mut report = PriceReport::new(query);
    for (store, outcome) in outcomes {
        match outcome {
            Ok(Some(listing)) => {
                report.offers.insert(store, listing);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(%store, title = %report.query.name, error = %e, "store lookup failed");
            }
        }
    }
    info!(
        title = %report.query.name,
        offers = report.offers.len(),
        "offers collected"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Listing, Store};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    struct FixedStore {
        store: Store,
        price_by_title: Vec<(&'static str, f64)>,
    }

    #[async_trait]
    impl Storefront for FixedStore {
        fn store(&self) -> Store {
            self.store
        }
        async fn find(&self, title: &str) -> Result<Option<Listing>> {
            Ok(self
                .price_by_title
                .iter()
                .find(|(t, _)| *t == title)
                .map(|(_, price)| Listing::Fanatical {
                    slug: title.to_ascii_lowercase(),
                    price: *price,
                }))
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl Storefront for BrokenStore {
        fn store(&self) -> Store {
            Store::Loaded
        }
        async fn find(&self, _title: &str) -> Result<Option<Listing>> {
            Err(anyhow!("socket closed"))
        }
    }

    #[tokio::test]
    async fn collects_offers_and_tolerates_a_dead_store() {
        let stores: Arc<Vec<Box<dyn Storefront>>> = Arc::new(vec![
            Box::new(FixedStore {
                store: Store::Fanatical,
                price_by_title: vec![("Foobar", 4.99)],
            }),
            Box::new(BrokenStore),
        ]);
        let queries = vec![
            TitleQuery::with_target("Foobar", 5.0),
            TitleQuery::new("Quux"),
        ];

        let mut reports = run(stores, queries, 2).await;
        reports.sort_by(|a, b| a.query.name.cmp(&b.query.name));

        assert_eq!(reports.len(), 2);
        // The whole query rides along into the report, target included.
        assert_eq!(reports[0].query, TitleQuery::with_target("Foobar", 5.0));
        assert_eq!(reports[0].offers.len(), 1);
        assert_eq!(reports[0].cheapest().unwrap().price(), 4.99);
        assert!(reports[1].offers.is_empty());
    }

    #[tokio::test]
    async fn parallelism_of_one_still_completes() {
        let stores: Arc<Vec<Box<dyn Storefront>>> = Arc::new(vec![Box::new(FixedStore {
            store: Store::Fanatical,
            price_by_title: vec![("A", 1.0), ("B", 2.0), ("C", 3.0)],
        })]);
        let queries = vec![
            TitleQuery::new("A"),
            TitleQuery::new("B"),
            TitleQuery::new("C"),
        ];
        let reports = run(stores, queries, 1).await;
        assert_eq!(reports.len(), 3);
    }
}
