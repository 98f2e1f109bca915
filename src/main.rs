use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Client;
use tracing::info;

use gamedeals::input::load_queries;
use gamedeals::orchestrator::{self, DEFAULT_PARALLELISM};
use gamedeals::report;
use gamedeals::stores;
use gamedeals::tracing::init_tracing;
use gamedeals::util::env::{env_parse, init_env};

/// Matches the original default cutoff for a "good deal".
const DEFAULT_TARGET_PRICE: f64 = 7.0;

#[derive(Parser, Debug)]
#[command(name = "gamedeals", version, about = "Cross-storefront game price comparison")]
struct Cli {
    /// Game title to look up; repeatable
    #[arg(short, long = "title")]
    titles: Vec<String>,

    /// CSV input file: one `title[,target_price]` row per line
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Default target price (USD) for titles without their own
    #[arg(long, default_value_t = DEFAULT_TARGET_PRICE)]
    target: f64,

    /// Concurrent title lookups (env: GAMEDEALS_PARALLELISM)
    #[arg(long)]
    parallelism: Option<usize>,

    /// Per-request HTTP timeout in seconds
    #[arg(long, default_value_t = 15)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_env();
    init_tracing("gamedeals=info")?;

    let cli = Cli::parse();
    let queries = load_queries(&cli.titles, cli.input.as_deref())?;
    let parallelism = cli
        .parallelism
        .unwrap_or_else(|| env_parse("GAMEDEALS_PARALLELISM", DEFAULT_PARALLELISM));

    let client = Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(cli.timeout_secs))
        .build()
        .context("building HTTP client")?;

    let stores = Arc::new(stores::build_all(&client).await?);
    info!(
        titles = queries.len(),
        stores = stores.len(),
        parallelism,
        "starting lookups"
    );

    let reports = orchestrator::run(stores, queries, parallelism).await;
    let buckets = report::partition(reports, cli.target);
    print!("{}", report::render(&buckets));
    Ok(())
}
