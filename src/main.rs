//! # Article Harvest
//!
//! An incremental scraper for blog articles. It reads a list of article URLs,
//! extracts each article's fields and comment thread, and accumulates the
//! results in a JSON store, skipping URLs already captured by earlier runs.
//!
//! ## Usage
//!
//! ```sh
//! article_harvest                       # links.txt -> data.json
//! article_harvest -l urls.txt -o out.json
//! ```
//!
//! ## Architecture
//!
//! 1. **Load**: read the existing store; its URLs form the known-set
//! 2. **Harvest**: for each unknown URL fetch the article, extract fields,
//!    fetch and pair comments, append the record
//! 3. **Save**: rewrite the store every `--batch-size` URLs and at the end
//!
//! Per-article failures are logged and never stop the run.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod harvest;
mod models;
mod scrapers;
mod store;
mod utils;

use cli::Cli;
use harvest::{HarvestState, Harvester};
use scrapers::fetcher::PageFetcher;
use store::Store;
use utils::{ensure_writable_parent, read_links};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("article_harvest starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    if let Err(e) = ensure_writable_parent(&args.output).await {
        error!(
            path = %args.output.display(),
            error = %e,
            "Store directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let links = match read_links(&args.links).await {
        Ok(links) => links,
        Err(e) => {
            error!(path = %args.links.display(), error = %e, "Cannot read input links");
            return Err(e.into());
        }
    };

    let policy = args.fetch_policy();
    if policy.accept_invalid_certs {
        warn!("TLS certificate verification is disabled; pass --verify-tls to enable it");
    }
    let fetcher = PageFetcher::new(&policy)?;

    let store = Store::new(&args.output);
    let records = match store.load().await {
        Ok(records) => records,
        Err(e) => {
            error!(error = %e, "Cannot read existing store; refusing to overwrite it");
            return Err(e.into());
        }
    };
    let state = HarvestState::from_records(records);
    let existing = state.records().len();

    let harvester = Harvester::new(&fetcher, &store, args.harvest_options());
    let (state, summary) = harvester.run(&links, state).await;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        input = links.len(),
        existing,
        saved = summary.saved,
        skipped = summary.skipped,
        fetch_failed = summary.fetch_failed,
        extract_failed = summary.extract_failed,
        flushes = summary.flushes,
        "Harvest complete"
    );
    info!(
        total = state.records().len(),
        path = %store.path().display(),
        "Articles in store"
    );

    Ok(())
}
