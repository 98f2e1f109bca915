//! gamedeals: cross-storefront game price comparison.
//!
//! Given a list of titles, query five storefront search APIs, reconcile
//! their noisy results through one shared matching engine, and report the
//! cheapest offer per title against a target price.

pub mod input;
pub mod matching;
pub mod model;
pub mod orchestrator;
pub mod report;
pub mod stores;
pub mod tracing;
pub mod util;

pub use matching::{best_match, normalize, score, should_ignore, Candidate};
pub use model::{Listing, PriceReport, Store, TitleQuery};
