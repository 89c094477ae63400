// src/fetch/http.rs
// =============================================================================
// Fetches pages over HTTP(S) with reqwest.
//
// Key functionality:
// - One shared `Client` for every worker (connection pooling)
// - Non-2xx responses become `FetchError::Status`
// - The body is handed back as a stream, so the scanner can start on the
//   first chunk instead of buffering the whole page
//
// Redirects, TLS and timeouts are reqwest's job; we only pick the settings.
// =============================================================================

use futures::future::{BoxFuture, FutureExt};
use futures::stream::StreamExt;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use super::{ByteStream, Fetch, FetchError};

/// Redirect hops we follow before giving up on a page.
const MAX_REDIRECTS: usize = 5;

/// reqwest-backed implementation of `Fetch`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a client with the given per-request timeout and User-Agent.
    pub fn new(timeout: Duration, user_agent: &str) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<ByteStream, FetchError>> {
        async move {
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| FetchError::Request(describe_error(&e)))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                });
            }

            let body = response
                .bytes_stream()
                .map(|chunk| chunk.map_err(|e| FetchError::Body(describe_error(&e))));

            Ok(body.boxed())
        }
        .boxed()
    }
}

// Turns a reqwest error into a short, human-readable reason.
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - SSL certificate issues
// - Too many redirects
fn describe_error(error: &reqwest::Error) -> String {
    let error_string = error.to_string();

    if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_redirect() {
        "too many redirects".to_string()
    } else if error.is_connect() {
        if error_string.contains("dns") {
            "could not resolve hostname".to_string()
        } else {
            format!("connection failed: {}", error_string)
        }
    } else if error_string.contains("certificate") || error_string.contains("ssl") {
        "SSL certificate error".to_string()
    } else {
        error_string
    }
}
