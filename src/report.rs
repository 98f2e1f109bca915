//! Final report: partition titles by whether their cheapest offer meets the
//! target price, and render the buckets.

use std::fmt::Write;

use crate::model::PriceReport;

/// Titles split by outcome. Within each priced bucket rows are sorted by
/// cheapest price, then title; unmatched titles sort by name.
#[derive(Debug, Default)]
pub struct ReportBuckets {
    pub under_target: Vec<PriceReport>,
    pub over_target: Vec<PriceReport>,
    pub unmatched: Vec<PriceReport>,
}

pub fn partition(reports: Vec<PriceReport>, default_target: f64) -> ReportBuckets {
    let mut buckets = ReportBuckets::default();
    for report in reports {
        let cheapest = report.cheapest().map(|l| l.price());
        match cheapest {
            // Strictly under: an offer exactly at target is not a deal.
            Some(price) if price < report.query.target_or(default_target) => {
                buckets.under_target.push(report)
            }
            Some(_) => buckets.over_target.push(report),
            None => buckets.unmatched.push(report),
        }
    }

    let by_price = |a: &PriceReport, b: &PriceReport| {
        let pa = a.cheapest().map(|l| l.price()).unwrap_or(f64::MAX);
        let pb = b.cheapest().map(|l| l.price()).unwrap_or(f64::MAX);
        pa.total_cmp(&pb).then_with(|| a.query.name.cmp(&b.query.name))
    };
    buckets.under_target.sort_by(by_price);
    buckets.over_target.sort_by(by_price);
    buckets.unmatched.sort_by(|a, b| a.query.name.cmp(&b.query.name));
    buckets
}

pub fn render(buckets: &ReportBuckets) -> String {
    let mut out = String::new();
    banner(&mut out, "Games under target price");
    for report in &buckets.under_target {
        render_title(&mut out, report);
    }

    banner(&mut out, "Games over target price");
    for report in &buckets.over_target {
        render_title(&mut out, report);
    }

    if !buckets.unmatched.is_empty() {
        banner(&mut out, "No listings found");
        for report in &buckets.unmatched {
            let _ = writeln!(out, "{}", report.query.name);
        }
    }
    out
}

fn banner(out: &mut String, heading: &str) {
    let _ = writeln!(out, "==================================================");
    let _ = writeln!(out, "== {heading}");
    let _ = writeln!(out, "==================================================");
}

fn render_title(out: &mut String, report: &PriceReport) {
    // cheapest() is Some for every priced bucket entry.
    let Some(best) = report.cheapest() else {
        return;
    };
    let _ = writeln!(
        out,
        "{}: {:.2} - {} ({})",
        report.query.name,
        best.price(),
        best.url(),
        best.store()
    );
    for listing in report.offers.values() {
        let _ = writeln!(
            out,
            "    {}: {:.2} - {}",
            listing.store(),
            listing.price(),
            listing.url()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Listing, PriceReport, Store, TitleQuery};

    fn report(name: &str, target: Option<f64>, prices: &[(Store, f64)]) -> PriceReport {
        let query = match target {
            Some(t) => TitleQuery::with_target(name, t),
            None => TitleQuery::new(name),
        };
        let mut r = PriceReport::new(query);
        for (store, price) in prices {
            let listing = match store {
                Store::Steam => Listing::Steam {
                    app_id: 1,
                    price: *price,
                },
                _ => Listing::Fanatical {
                    slug: name.to_ascii_lowercase(),
                    price: *price,
                },
            };
            r.offers.insert(*store, listing);
        }
        r
    }

    #[test]
    fn partitions_on_cheapest_offer_vs_target() {
        let reports = vec![
            report("Pricey", None, &[(Store::Steam, 19.99)]),
            report("Cheap", None, &[(Store::Steam, 9.99), (Store::Fanatical, 4.99)]),
            report("Ghost", None, &[]),
        ];
        let buckets = partition(reports, 7.0);
        assert_eq!(buckets.under_target.len(), 1);
        assert_eq!(buckets.under_target[0].query.name, "Cheap");
        assert_eq!(buckets.over_target.len(), 1);
        assert_eq!(buckets.unmatched.len(), 1);
    }

    #[test]
    fn per_title_target_overrides_default() {
        let reports = vec![report("Strict", Some(3.0), &[(Store::Steam, 4.99)])];
        let buckets = partition(reports, 7.0);
        assert!(buckets.under_target.is_empty());
        assert_eq!(buckets.over_target.len(), 1);
    }

    #[test]
    fn exact_target_price_counts_as_over() {
        let reports = vec![report("Edge", None, &[(Store::Steam, 7.0)])];
        let buckets = partition(reports, 7.0);
        assert!(buckets.under_target.is_empty());
        assert_eq!(buckets.over_target.len(), 1);
    }

    #[test]
    fn buckets_sort_by_price_then_title() {
        let reports = vec![
            report("Bravo", None, &[(Store::Steam, 5.0)]),
            report("Alpha", None, &[(Store::Steam, 5.0)]),
            report("Zulu", None, &[(Store::Steam, 1.0)]),
        ];
        let buckets = partition(reports, 7.0);
        let names: Vec<&str> = buckets
            .under_target
            .iter()
            .map(|r| r.query.name.as_str())
            .collect();
        assert_eq!(names, vec!["Zulu", "Alpha", "Bravo"]);
    }

    #[test]
    fn render_includes_cheapest_line_and_breakdown() {
        let buckets = partition(
            vec![report(
                "Foobar",
                None,
                &[(Store::Steam, 6.99), (Store::Fanatical, 4.25)],
            )],
            7.0,
        );
        let text = render(&buckets);
        assert!(text.contains("Foobar: 4.25 - https://www.fanatical.com/en/game/foobar (Fanatical)"));
        assert!(text.contains("    Steam: 6.99 - https://store.steampowered.com/app/1"));
    }
}
