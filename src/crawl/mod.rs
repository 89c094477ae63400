// src/crawl/mod.rs
// =============================================================================
// This module handles the crawl itself.
//
// Features:
// - A deduplicating frontier: every URL is scheduled at most once
// - A fixed-size pool of tokio workers that drain and refill the frontier
// - Exact termination: the crawl ends when nothing is queued and nothing is
//   in flight, not after a guessed delay
// - A shared word tally with a top-N ranking query
//
// Rust concepts:
// - Arc: shared ownership of the crawl state across spawned tasks
// - Mutex: short critical sections around the queue, counter and tally
// =============================================================================

mod frontier;
mod pool;
mod progress;
mod queue;
mod tally;

use serde::Serialize;
use std::time::Duration;

pub use pool::Scraper;
pub use tally::RankedEntry;

/// Settings for one crawl, usually built from the command line.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub workers: usize,
    pub request_timeout: Duration,
    pub user_agent: String,
}

/// Rejected crawl settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("at least one worker is required")]
    NoWorkers,
}

/// Summary numbers for a finished crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    pub pages_scanned: usize,
    pub pages_failed: usize,
    pub urls_seen: usize,
}
