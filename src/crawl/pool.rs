// src/crawl/pool.rs
// =============================================================================
// The worker pool: a fixed number of tokio tasks that crawl until no work is
// left anywhere.
//
// Each worker loops:
// 1. Claim a URL from the frontier (parks while the frontier is empty)
// 2. Fetch it through the `Fetch` capability
// 3. Scan the body for words and same-host links
// 4. Admit the links into the frontier, then merge the words into the tally
// 5. Release the claim, which may finish the crawl (see progress.rs)
//
// A failed page is logged and skipped. It never stops the pool.
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use url::Url;

use super::frontier::Frontier;
use super::progress::PendingWork;
use super::tally::{RankedEntry, WordTally};
use super::{ConfigError, CrawlStats};
use crate::fetch::Fetch;
use crate::scan::{parse_seed, scan_stream};

// Everything the workers share. Each piece has its own lock.
struct Shared<F> {
    fetcher: F,
    frontier: Frontier,
    progress: PendingWork,
    tally: WordTally,
    pages_scanned: AtomicUsize,
    pages_failed: AtomicUsize,
}

/// Crawls from a set of seeds and ranks the words it finds.
///
/// A `Scraper` runs one crawl; its frontier and tally are not reset between
/// calls to `scrape`.
pub struct Scraper<F> {
    shared: Arc<Shared<F>>,
    workers: usize,
}

impl<F: Fetch> Scraper<F> {
    /// Creates a scraper that will run `workers` concurrent workers.
    pub fn new(fetcher: F, workers: usize) -> Result<Self, ConfigError> {
        if workers == 0 {
            return Err(ConfigError::NoWorkers);
        }

        Ok(Self {
            shared: Arc::new(Shared {
                fetcher,
                frontier: Frontier::new(),
                progress: PendingWork::new(),
                tally: WordTally::new(),
                pages_scanned: AtomicUsize::new(0),
                pages_failed: AtomicUsize::new(0),
            }),
            workers,
        })
    }

    /// Crawls from `seeds` and returns once every reachable page is done.
    ///
    /// Seeds that are not valid http(s) URLs are logged and skipped.
    pub async fn scrape<I, S>(&self, seeds: I) -> CrawlStats
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for seed in seeds {
            match parse_seed(seed.as_ref()) {
                Ok(url) => {
                    self.shared.frontier.admit(url);
                }
                Err(err) => warn!(error = %err, "skipping seed"),
            }
        }

        info!(
            seeds = self.shared.frontier.len(),
            workers = self.workers,
            "crawl started"
        );

        let mut workers = JoinSet::new();
        for id in 0..self.workers {
            let shared = Arc::clone(&self.shared);
            workers.spawn(async move { shared.run_worker(id).await });
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(err) = joined {
                warn!(error = %err, "worker task ended abnormally");
            }
        }

        debug_assert!(self.shared.progress.is_finished());
        debug_assert_eq!(self.shared.progress.in_flight(), 0);

        let stats = self.stats();
        info!(
            pages_scanned = stats.pages_scanned,
            pages_failed = stats.pages_failed,
            urls_seen = stats.urls_seen,
            "crawl finished"
        );
        if self.shared.tally.is_empty() {
            warn!("crawl finished without counting any words");
        }
        stats
    }

    /// The `n` most frequent words seen so far, highest count first.
    ///
    /// Meant to be called after `scrape` returns.
    pub fn find_most_recurring_words(&self, n: usize) -> Vec<RankedEntry> {
        self.shared.tally.top_n(n)
    }

    /// Number of distinct words in the tally.
    pub fn distinct_words(&self) -> usize {
        self.shared.tally.len()
    }

    pub fn stats(&self) -> CrawlStats {
        CrawlStats {
            pages_scanned: self.shared.pages_scanned.load(Ordering::Relaxed),
            pages_failed: self.shared.pages_failed.load(Ordering::Relaxed),
            urls_seen: self.shared.frontier.seen_count(),
        }
    }
}

impl<F: Fetch> Shared<F> {
    async fn run_worker(&self, id: usize) {
        debug!(worker = id, "worker started");

        while let Some(claimed) = self.progress.next(&self.frontier).await {
            self.process(id, claimed.url()).await;
            // `claimed` drops here, after links were admitted and words merged.
        }

        debug!(worker = id, "worker stopped");
    }

    async fn process(&self, worker: usize, url: &Url) {
        let body = match self.fetcher.fetch(url).await {
            Ok(body) => body,
            Err(err) => {
                warn!(worker, %url, error = %err, "fetch failed, skipping page");
                self.pages_failed.fetch_add(1, Ordering::Relaxed);
                return;
            }
        };

        let scan = scan_stream(url, body).await;
        if let Some(err) = &scan.interrupted {
            warn!(worker, %url, error = %err, "page scan cut short, keeping partial results");
        }

        let found = scan.links.len();
        let admitted = scan
            .links
            .into_iter()
            .filter(|link| self.frontier.admit(link.clone()))
            .count();
        if admitted > 0 {
            self.progress.work_admitted();
        }

        let words = scan.words.len();
        self.tally.merge(scan.words);
        self.pages_scanned.fetch_add(1, Ordering::Relaxed);

        debug!(worker, %url, words, links = found, admitted, "page scanned");
    }
}
