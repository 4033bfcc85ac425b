//! The run controller: walks the input list and grows the store.
//!
//! Each input URL ends in exactly one [`Outcome`]:
//!
//! | Outcome | When | Effect |
//! |---------|------|--------|
//! | `Skipped` | URL already known (stored, or saved earlier this run) | nothing fetched |
//! | `FetchFailed` | article page could not be fetched | logged, URL stays unknown |
//! | `ExtractFailed` | a mandatory field is missing | logged, URL stays unknown |
//! | `Saved` | record produced | appended and marked known at once |
//!
//! URLs are processed strictly one after another. A fixed delay separates
//! consecutive URLs that hit the network. The whole collection is saved after
//! every `batch_size` input URLs and once more at the end of the run.

use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{error, info, instrument};

use crate::models::ArticleRecord;
use crate::scrapers::ExtractError;
use crate::scrapers::article::extract_article;
use crate::scrapers::comments::fetch_comments;
use crate::scrapers::fetcher::{FetchError, PageSource};
use crate::store::Store;

/// Input URLs between two periodic saves.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Pause between two URLs that hit the network.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// Why an article produced no record.
#[derive(Debug, Error)]
pub enum ArticleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Terminal state of one input URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Skipped,
    FetchFailed,
    ExtractFailed,
    Saved,
}

#[derive(Debug, Clone)]
pub struct HarvestOptions {
    pub batch_size: usize,
    pub delay: Duration,
    pub show_progress: bool,
}

/// The accumulated collection and the set of URLs it covers.
#[derive(Debug, Default)]
pub struct HarvestState {
    records: Vec<ArticleRecord>,
    known: HashSet<String>,
}

impl HarvestState {
    pub fn from_records(records: Vec<ArticleRecord>) -> Self {
        let known = records.iter().map(|r| r.url.clone()).collect();
        Self { records, known }
    }

    pub fn records(&self) -> &[ArticleRecord] {
        &self.records
    }

    pub fn is_known(&self, url: &str) -> bool {
        self.known.contains(url)
    }

    fn push(&mut self, record: ArticleRecord) {
        self.known.insert(record.url.clone());
        self.records.push(record);
    }
}

/// Per-outcome counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub saved: usize,
    pub skipped: usize,
    pub fetch_failed: usize,
    pub extract_failed: usize,
    pub flushes: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Skipped => self.skipped += 1,
            Outcome::FetchFailed => self.fetch_failed += 1,
            Outcome::ExtractFailed => self.extract_failed += 1,
            Outcome::Saved => self.saved += 1,
        }
    }
}

/// Drives fetch, extract, accumulate and save over an input list.
#[derive(Debug)]
pub struct Harvester<'a, S> {
    source: &'a S,
    store: &'a Store,
    options: HarvestOptions,
}

impl<'a, S: PageSource> Harvester<'a, S> {
    pub fn new(source: &'a S, store: &'a Store, options: HarvestOptions) -> Self {
        Self {
            source,
            store,
            options,
        }
    }

    /// Process every URL in `urls` and return the grown state.
    ///
    /// Never fails: per-URL errors and save errors are logged and counted.
    pub async fn run(&self, urls: &[String], mut state: HarvestState) -> (HarvestState, RunSummary) {
        let mut summary = RunSummary::default();
        let progress = self.progress_bar(urls.len());
        let mut hit_network = false;

        for (i, url) in urls.iter().enumerate() {
            let outcome = if state.is_known(url) {
                info!(%url, "Skipping already stored article");
                Outcome::Skipped
            } else {
                if hit_network && !self.options.delay.is_zero() {
                    sleep(self.options.delay).await;
                }
                hit_network = true;
                self.process(url, &mut state).await
            };
            summary.record(outcome);
            progress.inc(1);

            let processed = i + 1;
            if self.options.batch_size > 0 && processed % self.options.batch_size == 0 {
                self.flush(&state, &mut summary).await;
                info!(processed, "Intermediate save");
            }
        }

        self.flush(&state, &mut summary).await;
        progress.finish_and_clear();
        (state, summary)
    }

    #[instrument(level = "info", skip(self, state))]
    async fn process(&self, url: &str, state: &mut HarvestState) -> Outcome {
        info!("Processing article");
        match self.harvest_article(url).await {
            Ok(record) => {
                state.push(record);
                Outcome::Saved
            }
            Err(ArticleError::Fetch(e)) => {
                error!(error = %e, "Article request failed");
                Outcome::FetchFailed
            }
            Err(ArticleError::Extract(e)) => {
                error!(error = %e, "Article parsing failed");
                Outcome::ExtractFailed
            }
        }
    }

    async fn harvest_article(&self, url: &str) -> Result<ArticleRecord, ArticleError> {
        let html = self.source.fetch(url).await?;
        let fields = extract_article(&html)?;
        let thread = fetch_comments(self.source, url, &fields.author).await;
        Ok(fields.into_record(url, thread.comments, thread.from_author))
    }

    async fn flush(&self, state: &HarvestState, summary: &mut RunSummary) {
        match self.store.save(state.records()).await {
            Ok(()) => summary.flushes += 1,
            Err(e) => error!(error = %e, "Failed to save store; will retry at next save point"),
        }
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.options.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        let style = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        pb.set_style(style);
        pb
    }
}
