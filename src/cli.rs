//! Command-line interface definitions for Article Harvest.
//!
//! Every option has a default, so running the binary with no arguments reads
//! `links.txt`, writes `data.json`, saves every 10 URLs and waits one second
//! between articles.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::harvest::{DEFAULT_BATCH_SIZE, DEFAULT_DELAY, HarvestOptions};
use crate::scrapers::fetcher::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, FetchPolicy};

/// Command-line arguments for the Article Harvest application.
///
/// # Examples
///
/// ```sh
/// # Defaults: links.txt -> data.json
/// article_harvest
///
/// # Different files, verified TLS
/// article_harvest -l urls.txt -o out/articles.json --verify-tls
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// File with one article URL per line
    #[arg(short, long, default_value = "links.txt")]
    pub links: PathBuf,

    /// JSON store to read and extend
    #[arg(short, long, default_value = "data.json")]
    pub output: PathBuf,

    /// Save the store after this many input URLs (0 saves only at the end)
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Pause between articles, in milliseconds
    #[arg(long, default_value_t = DEFAULT_DELAY.as_millis() as u64)]
    pub delay_ms: u64,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Verify TLS certificates (off by default: the target hosts serve invalid ones)
    #[arg(long, env = "HARVEST_VERIFY_TLS")]
    pub verify_tls: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl Cli {
    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            accept_invalid_certs: !self.verify_tls,
        }
    }

    pub fn harvest_options(&self) -> HarvestOptions {
        HarvestOptions {
            batch_size: self.batch_size,
            delay: Duration::from_millis(self.delay_ms),
            show_progress: !self.no_progress,
        }
    }
}
