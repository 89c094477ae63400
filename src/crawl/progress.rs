// src/crawl/progress.rs
// =============================================================================
// Pending-work tracking and crawl termination.
//
// Workers both drain and feed the frontier, so "the queue is empty" does not
// mean "the crawl is over": a sibling may be halfway through a page and about
// to admit more links. We therefore count in-flight pages and only finish when
// the count is zero AND the frontier is empty, checked under one lock.
//
// Protocol:
// 1. `next()` takes a URL from the frontier and bumps `in_flight` in the same
//    critical section, returning an `InFlight` guard
// 2. The worker fetches, scans, admits links and merges counts
// 3. Dropping the guard decrements `in_flight`; if that reaches zero while the
//    frontier is empty, the crawl is finished and every idle worker is woken
//
// Links are only ever admitted by a worker holding a guard (or by the driver
// before workers start), so once the count hits zero with an empty frontier
// nothing can add work again.
//
// Idle workers park on a tokio `Notify` instead of spinning.
//
// Rust concepts:
// - RAII guards: Drop runs the completion step even if processing panics
// - tokio::sync::Notify: async wait/notify without a channel payload
// =============================================================================

use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use url::Url;

use super::frontier::Frontier;

#[derive(Debug, Default)]
struct Progress {
    in_flight: usize,
    finished: bool,
}

/// Outcome of a single non-blocking attempt to claim work.
#[derive(Debug)]
enum Claim {
    Work(Url),
    Idle,
    Finished,
}

/// The pending-work counter plus the wakeup channel for idle workers.
#[derive(Debug, Default)]
pub struct PendingWork {
    state: Mutex<Progress>,
    wakeup: Notify,
}

impl PendingWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until a URL can be claimed, or returns None once the crawl is done.
    pub async fn next<'a>(&'a self, frontier: &'a Frontier) -> Option<InFlight<'a>> {
        loop {
            // Register interest before looking at the state so a wakeup
            // between the check and the await is not lost.
            let notified = self.wakeup.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.claim(frontier) {
                Claim::Work(url) => {
                    return Some(InFlight {
                        url,
                        progress: self,
                        frontier,
                    })
                }
                Claim::Finished => return None,
                Claim::Idle => notified.await,
            }
        }
    }

    /// Wakes idle workers after new URLs were admitted.
    pub fn work_admitted(&self) {
        self.wakeup.notify_waiters();
    }

    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    pub fn is_finished(&self) -> bool {
        self.lock().finished
    }

    fn claim(&self, frontier: &Frontier) -> Claim {
        let mut state = self.lock();
        if state.finished {
            return Claim::Finished;
        }

        match frontier.take() {
            Some(url) => {
                state.in_flight += 1;
                Claim::Work(url)
            }
            // Nothing queued and nobody left who could queue more.
            None if state.in_flight == 0 => {
                state.finished = true;
                drop(state);
                self.wakeup.notify_waiters();
                Claim::Finished
            }
            None => Claim::Idle,
        }
    }

    fn complete(&self, frontier: &Frontier) {
        let mut state = self.lock();
        state.in_flight = state.in_flight.saturating_sub(1);

        if state.in_flight == 0 && frontier.is_empty() {
            state.finished = true;
        }
        drop(state);

        // Either the crawl just finished, or a slot opened up while links
        // may be waiting; both cases need idle workers to re-check.
        self.wakeup.notify_waiters();
    }

    fn lock(&self) -> MutexGuard<'_, Progress> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A claimed URL. Dropping it marks the page as processed.
#[derive(Debug)]
pub struct InFlight<'a> {
    url: Url,
    progress: &'a PendingWork,
    frontier: &'a Frontier,
}

impl InFlight<'_> {
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.progress.complete(self.frontier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_empty_frontier_finishes_immediately() {
        let frontier = Frontier::new();
        let progress = PendingWork::new();

        assert!(progress.next(&frontier).await.is_none());
        assert!(progress.is_finished());
    }

    #[tokio::test]
    async fn test_guard_counts_in_flight_work() {
        let frontier = Frontier::new();
        let progress = PendingWork::new();
        frontier.admit(url("https://example.com/"));

        let claimed = progress.next(&frontier).await.expect("work available");
        assert_eq!(claimed.url().as_str(), "https://example.com/");
        assert_eq!(progress.in_flight(), 1);
        assert!(!progress.is_finished());

        drop(claimed);
        assert_eq!(progress.in_flight(), 0);
        assert!(progress.is_finished());
    }

    #[tokio::test]
    async fn test_links_admitted_before_completion_keep_crawl_alive() {
        let frontier = Frontier::new();
        let progress = PendingWork::new();
        frontier.admit(url("https://example.com/"));

        let claimed = progress.next(&frontier).await.expect("seed");
        frontier.admit(url("https://example.com/next"));
        drop(claimed);

        assert!(!progress.is_finished());
        let next = progress.next(&frontier).await.expect("admitted link");
        assert_eq!(next.url().path(), "/next");
        drop(next);
        assert!(progress.is_finished());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_idle_worker_wakes_when_work_is_admitted() {
        let frontier = Arc::new(Frontier::new());
        let progress = Arc::new(PendingWork::new());
        frontier.admit(url("https://example.com/a"));

        let claimed = progress.next(&frontier).await.expect("a");

        let waiter = {
            let frontier = Arc::clone(&frontier);
            let progress = Arc::clone(&progress);
            tokio::spawn(async move {
                let mut seen = Vec::new();
                while let Some(work) = progress.next(&frontier).await {
                    seen.push(work.url().path().to_string());
                }
                seen
            })
        };

        // Let the waiter park on an empty frontier before feeding it.
        tokio::time::sleep(Duration::from_millis(50)).await;
        frontier.admit(url("https://example.com/b"));
        progress.work_admitted();
        drop(claimed);

        let seen = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("waiter hung")
            .unwrap();
        assert_eq!(seen, vec!["/b".to_string()]);
        assert!(progress.is_finished());
    }
}
