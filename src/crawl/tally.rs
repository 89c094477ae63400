// src/crawl/tally.rs
// =============================================================================
// The global word tally and the ranking query.
//
// `merge` is the only way to change the tally. Each worker builds a local map
// for its page without any locking and merges it in one short critical
// section once the page is done.
// =============================================================================

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A (word, count) pair produced by the ranking query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    pub word: String,
    pub count: u64,
}

/// Word -> occurrence count, shared by all workers.
#[derive(Debug, Default)]
pub struct WordTally {
    counts: Mutex<HashMap<String, u64>>,
}

impl WordTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every (word, count) pair of a page's local counts into the tally.
    pub fn merge(&self, local: HashMap<String, u64>) {
        if local.is_empty() {
            return;
        }

        let mut counts = self.lock();
        for (word, count) in local {
            *counts.entry(word).or_insert(0) += count;
        }
    }

    /// Returns the `n` most frequent words, highest count first.
    ///
    /// Ties are broken alphabetically so repeated calls on the same tally
    /// always agree. Fewer than `n` entries come back when the tally is small.
    pub fn top_n(&self, n: usize) -> Vec<RankedEntry> {
        let mut entries: Vec<RankedEntry> = self
            .lock()
            .iter()
            .map(|(word, &count)| RankedEntry {
                word: word.clone(),
                count,
            })
            .collect();

        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
        entries.truncate(n);
        entries
    }

    /// Count for a single word (0 if never seen).
    #[cfg(test)]
    pub fn count(&self, word: &str) -> u64 {
        self.lock().get(word).copied().unwrap_or(0)
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
