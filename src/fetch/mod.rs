// src/fetch/mod.rs
// =============================================================================
// The fetch capability: turn a URL into a stream of body bytes.
//
// The crawler only depends on the `Fetch` trait, never on reqwest directly.
// `HttpFetcher` is the real implementation; tests plug in an in-memory site.
//
// Submodules:
// - http: reqwest-backed fetcher
//
// Rust concepts:
// - Traits as seams: the worker pool is generic over `F: Fetch`
// - BoxFuture / BoxStream: object-safe async results without extra crates
// =============================================================================

mod http;

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use url::Url;

pub use http::HttpFetcher;

/// A response body delivered chunk by chunk.
pub type ByteStream = BoxStream<'static, Result<Bytes, FetchError>>;

/// Anything that can fetch a page body.
///
/// Implementations must be safe to call from many workers at once.
pub trait Fetch: Send + Sync + 'static {
    fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<ByteStream, FetchError>>;
}

/// Transport-level failures for a single URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request never produced a response (DNS, connect, TLS, timeout...)
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status
    #[error("HTTP {status}")]
    Status { status: u16 },

    /// The body stream broke after the response started
    #[error("body read failed: {0}")]
    Body(String),
}
