//! Shared result types flowing between the storefront adapters, the
//! orchestrator, and the report.

use std::collections::BTreeMap;
use std::fmt;

use url::Url;

/// Identifier for one of the supported storefronts. Doubles as the key of
/// the per-title offer map, so `Ord` fixes the breakdown print order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Store {
    Steam,
    Fanatical,
    GreenManGaming,
    HumbleBundle,
    Loaded,
}

impl Store {
    pub fn label(self) -> &'static str {
        match self {
            Store::Steam => "Steam",
            Store::Fanatical => "Fanatical",
            Store::GreenManGaming => "GreenManGaming",
            Store::HumbleBundle => "HumbleBundle",
            Store::Loaded => "Loaded",
        }
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One storefront's offer for a title. Each variant carries the store's own
/// locator shape next to the USD price; [`Listing::url`] turns the locator
/// into a deep link.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    Steam { app_id: u64, price: f64 },
    Fanatical { slug: String, price: f64 },
    GreenManGaming { path: String, price: f64 },
    HumbleBundle { path: String, price: f64 },
    Loaded { url: String, price: f64 },
}

impl Listing {
    pub fn store(&self) -> Store {
        match self {
            Listing::Steam { .. } => Store::Steam,
            Listing::Fanatical { .. } => Store::Fanatical,
            Listing::GreenManGaming { .. } => Store::GreenManGaming,
            Listing::HumbleBundle { .. } => Store::HumbleBundle,
            Listing::Loaded { .. } => Store::Loaded,
        }
    }

    pub fn price(&self) -> f64 {
        match self {
            Listing::Steam { price, .. }
            | Listing::Fanatical { price, .. }
            | Listing::GreenManGaming { price, .. }
            | Listing::HumbleBundle { price, .. }
            | Listing::Loaded { price, .. } => *price,
        }
    }

    /// Storefront deep link for this offer. GMG and HumbleBundle return
    /// site-relative paths in their search hits; those are joined onto the
    /// store base here. Loaded already hands back an absolute URL.
    pub fn url(&self) -> String {
        match self {
            Listing::Steam { app_id, .. } => {
                format!("https://store.steampowered.com/app/{app_id}")
            }
            Listing::Fanatical { slug, .. } => {
                format!("https://www.fanatical.com/en/game/{slug}")
            }
            Listing::GreenManGaming { path, .. } => {
                join_site("https://www.greenmangaming.com", path)
            }
            Listing::HumbleBundle { path, .. } => join_site("https://www.humblebundle.com", path),
            Listing::Loaded { url, .. } => url.clone(),
        }
    }
}

/// Resolve a hit's path against the store base. Handles absolute,
/// site-relative, and protocol-relative forms alike; an unresolvable path
/// is passed through untouched rather than dropped.
fn join_site(base: &str, path: &str) -> String {
    // The bases are compile-time literals; parse cannot fail on them.
    Url::parse(base)
        .and_then(|b| b.join(path))
        .map(String::from)
        .unwrap_or_else(|_| path.to_string())
}

/// One input row: a title to search for, with an optional per-title target
/// price overriding the CLI default.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleQuery {
    pub name: String,
    pub target: Option<f64>,
}

impl TitleQuery {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: None,
        }
    }

    pub fn with_target(name: impl Into<String>, target: f64) -> Self {
        Self {
            name: name.into(),
            target: Some(target),
        }
    }

    pub fn target_or(&self, default: f64) -> f64 {
        self.target.unwrap_or(default)
    }
}

/// Aggregated per-title outcome: whichever stores produced a matching
/// listing, keyed by store.
#[derive(Debug, Clone)]
pub struct PriceReport {
    pub query: TitleQuery,
    pub offers: BTreeMap<Store, Listing>,
}

impl PriceReport {
    pub fn new(query: TitleQuery) -> Self {
        Self {
            query,
            offers: BTreeMap::new(),
        }
    }

    /// Cheapest offer across stores. Ties go to the first store in key
    /// order, which keeps the report deterministic.
    pub fn cheapest(&self) -> Option<&Listing> {
        self.offers
            .values()
            .min_by(|a, b| a.price().total_cmp(&b.price()))
    }
}
