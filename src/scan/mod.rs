// src/scan/mod.rs
// =============================================================================
// This module turns a fetched page into words and links.
//
// Submodules:
// - token: incremental HTML tokenizer (html5ever underneath)
// - link: URL normalization and same-host link resolution
// - page: the page scanner itself
//
// No DOM is ever built: the scanner walks tokens as they stream in and keeps
// only a word map and a link set per page.
// =============================================================================

mod link;
mod page;
mod token;

use crate::fetch::FetchError;

pub use link::parse_seed;
pub use page::scan_stream;

/// Why a page scan stopped before end of input.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The response body broke mid-read
    #[error("{0}")]
    Body(#[from] FetchError),

    /// The tokenizer task died (panicked or was cancelled)
    #[error("scanner task failed: {0}")]
    Task(String),
}
