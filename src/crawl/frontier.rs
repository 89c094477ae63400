// src/crawl/frontier.rs
// =============================================================================
// The deduplicating URL frontier: the single source of pending crawl work.
//
// How it works:
// - `admit` checks the seen-set and enqueues in one critical section, so two
//   workers admitting the same link at the same time produce one entry
// - `take` pops the oldest pending URL without blocking
// - Nothing is ever removed from the seen-set, so a URL that was already
//   crawled can never be scheduled again
//
// The frontier does not know whether a URL is being processed or finished.
// That bookkeeping lives in `progress.rs`.
// =============================================================================

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

use super::queue::Queue;

#[derive(Debug, Default)]
struct FrontierState {
    pending: Queue<Url>,
    seen: HashSet<Url>,
}

/// Thread-safe FIFO of URLs that admits every URL at most once.
#[derive(Debug, Default)]
pub struct Frontier {
    state: Mutex<FrontierState>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `url` unless it has been admitted before.
    ///
    /// Returns true when the URL was appended to the pending queue. Callers
    /// are expected to pass normalized URLs (see `scan::link::normalize`).
    pub fn admit(&self, url: Url) -> bool {
        let mut state = self.lock();
        if state.seen.contains(&url) {
            return false;
        }
        state.seen.insert(url.clone());
        state.pending.enqueue(url);
        true
    }

    /// Removes and returns the oldest pending URL, or None if nothing is queued.
    pub fn take(&self) -> Option<Url> {
        self.lock().pending.dequeue()
    }

    /// Number of URLs waiting to be taken.
    pub fn len(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().pending.is_empty()
    }

    /// Number of distinct URLs ever admitted.
    pub fn seen_count(&self) -> usize {
        self.lock().seen.len()
    }

    // State stays consistent across a poisoning panic; recover the guard.
    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
