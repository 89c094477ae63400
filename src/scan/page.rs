// src/scan/page.rs
// =============================================================================
// Scans one page: counts visible words and collects same-host links.
//
// How it works:
// 1. Tokens arrive one at a time from `Tokenizer`
// 2. <style>, <script> and <link> start tags open a suppressed region; an end
//    tag for any of them closes it. Text inside is ignored. Script and style
//    bodies arrive as a single raw text token, so markup in them is never seen
// 3. Other text is split on whitespace and lowercased; nothing else is
//    stripped, so "word," and "word" are different words
// 4. <a href> values are resolved against the page URL; only same-host links
//    are kept
// 5. The Error token (end of input) stops the scan
//
// `scan_stream` runs the tokenizer on tokio's blocking pool and feeds it the
// body chunk by chunk as the network delivers them.
// =============================================================================

use bytes::Bytes;
use futures::StreamExt;
use std::collections::{HashMap, HashSet};
use std::ops::ControlFlow;
use tokio::sync::mpsc;
use url::Url;

use super::link::resolve_same_host;
use super::token::{HtmlToken, Tokenizer};
use super::ScanError;
use crate::fetch::ByteStream;

/// Tags whose contents never count as visible words.
const SUPPRESSED_TAGS: [&str; 3] = ["style", "script", "link"];

/// Body chunks buffered between the network task and the tokenizer.
const CHUNK_BACKLOG: usize = 16;

/// What one page contributed to the crawl.
#[derive(Debug, Default)]
pub struct PageScan {
    pub words: HashMap<String, u64>,
    pub links: HashSet<Url>,
    /// Set when the scan stopped early; words and links so far are still valid.
    pub interrupted: Option<ScanError>,
}

/// Streaming token consumer for a single page.
pub struct PageScanner<'a> {
    page: &'a Url,
    suppressed: bool,
    words: HashMap<String, u64>,
    links: HashSet<Url>,
}

impl<'a> PageScanner<'a> {
    pub fn new(page: &'a Url) -> Self {
        Self {
            page,
            suppressed: false,
            words: HashMap::new(),
            links: HashSet::new(),
        }
    }

    /// Handles one token. Breaks once the tokenizer reports end of input.
    pub fn consume(&mut self, token: HtmlToken) -> ControlFlow<()> {
        match &token {
            HtmlToken::Error => return ControlFlow::Break(()),
            HtmlToken::Text(text) => {
                if !self.suppressed {
                    self.count_words(text);
                }
            }
            HtmlToken::StartTag { name, .. } => {
                if SUPPRESSED_TAGS.contains(&name.as_str()) {
                    self.suppressed = true;
                }
                self.collect_link(&token);
            }
            HtmlToken::EndTag { name } => {
                if SUPPRESSED_TAGS.contains(&name.as_str()) {
                    self.suppressed = false;
                }
            }
            HtmlToken::SelfClosingTag { .. } => self.collect_link(&token),
        }
        ControlFlow::Continue(())
    }

    /// Pulls every ready token out of `tokenizer`.
    pub fn drain(&mut self, tokenizer: &mut Tokenizer) -> ControlFlow<()> {
        while let Some(token) = tokenizer.next_token() {
            if self.consume(token).is_break() {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    pub fn finish(self) -> PageScan {
        PageScan {
            words: self.words,
            links: self.links,
            interrupted: None,
        }
    }

    fn count_words(&mut self, text: &str) {
        for word in text.split_whitespace() {
            *self.words.entry(word.to_lowercase()).or_insert(0) += 1;
        }
    }

    fn collect_link(&mut self, token: &HtmlToken) {
        if token.tag_name() != Some("a") {
            return;
        }
        if let Some(link) = token.attr("href").and_then(|href| resolve_same_host(self.page, href)) {
            self.links.insert(link);
        }
    }
}

/// Scans a document delivered as a sequence of byte chunks.
pub fn scan_chunks<I>(page: &Url, chunks: I) -> PageScan
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    let mut tokenizer = Tokenizer::new();
    let mut scanner = PageScanner::new(page);

    for chunk in chunks {
        tokenizer.feed(chunk.as_ref());
        if scanner.drain(&mut tokenizer).is_break() {
            return scanner.finish();
        }
    }

    tokenizer.end();
    let _ = scanner.drain(&mut tokenizer);
    scanner.finish()
}

/// Scans a response body as it streams in.
///
/// A body that breaks mid-read ends the scan early, keeping everything
/// counted up to that point and recording the failure in `interrupted`.
pub async fn scan_stream(page: &Url, mut body: ByteStream) -> PageScan {
    let (tx, mut rx) = mpsc::channel::<Bytes>(CHUNK_BACKLOG);

    // html5ever's tokenizer is not Send, so it lives on a blocking thread
    // for the whole page instead of crossing await points.
    let scan_page = page.clone();
    let scanner = tokio::task::spawn_blocking(move || {
        scan_chunks(&scan_page, std::iter::from_fn(|| rx.blocking_recv()))
    });

    let mut interrupted = None;
    while let Some(chunk) = body.next().await {
        match chunk {
            Ok(bytes) => {
                // The scanner only hangs up after end of input.
                if tx.send(bytes).await.is_err() {
                    break;
                }
            }
            Err(err) => {
                interrupted = Some(ScanError::Body(err));
                break;
            }
        }
    }
    drop(tx);

    match scanner.await {
        Ok(mut scan) => {
            scan.interrupted = interrupted;
            scan
        }
        Err(err) => PageScan {
            interrupted: Some(ScanError::Task(err.to_string())),
            ..PageScan::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use futures::stream;

    fn page(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn link(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn scan_html(page: &Url, html: &str) -> PageScan {
        scan_chunks(page, std::iter::once(html.as_bytes()))
    }

    #[test]
    fn test_script_text_is_suppressed() {
        let scan = scan_html(
            &page("https://a.com/"),
            "<script>ignored word</script>visible word",
        );
        assert_eq!(scan.words.get("visible"), Some(&1));
        assert_eq!(scan.words.get("word"), Some(&1));
        assert!(!scan.words.contains_key("ignored"));
    }

    #[test]
    fn test_style_text_is_suppressed() {
        let scan = scan_html(
            &page("https://a.com/"),
            "<style>body { color: red }</style><p>Hello</p>",
        );
        assert_eq!(scan.words.len(), 1);
        assert_eq!(scan.words.get("hello"), Some(&1));
    }

    #[test]
    fn test_script_with_less_than_does_not_hide_page() {
        let scan = scan_html(
            &page("https://a.com/"),
            "<script>if (a<b) { go(); }</script><p>visible words</p>",
        );
        assert_eq!(scan.words.get("visible"), Some(&1));
        assert_eq!(scan.words.get("words"), Some(&1));
        assert!(!scan.words.contains_key("go();"));
    }

    #[test]
    fn test_markup_inside_script_is_not_a_link() {
        let scan = scan_html(
            &page("https://a.com/"),
            r#"<script>var s = '<a href="/from-js">';</script><a href="/real">real</a>"#,
        );
        assert!(!scan.links.contains(&link("https://a.com/from-js")));
        assert!(scan.links.contains(&link("https://a.com/real")));
        assert_eq!(scan.words.get("real"), Some(&1));
    }

    #[test]
    fn test_link_tag_suppresses_until_noise_end_tag() {
        let scan = scan_html(
            &page("https://a.com/"),
            r#"<link rel="x"><p>hidden</p></style><p>shown</p>"#,
        );
        assert!(!scan.words.contains_key("hidden"));
        assert_eq!(scan.words.get("shown"), Some(&1));
    }

    #[test]
    fn test_self_closing_noise_tags_do_not_suppress() {
        let scan = scan_html(
            &page("https://a.com/"),
            r#"<script/><p>first</p><link rel="x"/><p>second</p>"#,
        );
        assert_eq!(scan.words.get("first"), Some(&1));
        assert_eq!(scan.words.get("second"), Some(&1));
    }

    #[test]
    fn test_words_are_lowercased_but_not_stripped() {
        let scan = scan_html(
            &page("https://a.com/"),
            "<p>Rust rust RUST, rust.</p>\n<div>  rust\tcrab </div>",
        );
        assert_eq!(scan.words.get("rust"), Some(&3));
        assert_eq!(scan.words.get("rust,"), Some(&1));
        assert_eq!(scan.words.get("rust."), Some(&1));
        assert_eq!(scan.words.get("crab"), Some(&1));
    }

    #[test]
    fn test_same_host_links_are_collected() {
        let scan = scan_html(
            &page("https://a.com/docs/"),
            r##"<a href="/about">About</a>
               <a href="intro#top">Intro</a>
               <a href="https://a.com/about">Again</a>
               <a name="no-href">Anchor</a>"##,
        );
        let expected: HashSet<Url> = [link("https://a.com/about"), link("https://a.com/docs/intro")]
            .into_iter()
            .collect();
        assert_eq!(scan.links, expected);
    }

    #[test]
    fn test_cross_host_link_is_excluded() {
        let scan = scan_html(&page("https://a.com/"), r#"<a href="https://b.com/x">B</a>"#);
        assert!(scan.links.is_empty());
        assert!(!scan.links.contains(&link("https://b.com/x")));
    }

    #[test]
    fn test_malformed_href_does_not_abort_scan() {
        let scan = scan_html(
            &page("https://a.com/"),
            r#"<a href="http://[::1">bad</a> still counted <a href="/ok">ok</a>"#,
        );
        assert_eq!(scan.words.get("still"), Some(&1));
        assert_eq!(scan.links.len(), 1);
        assert!(scan.links.contains(&link("https://a.com/ok")));
    }

    #[test]
    fn test_links_inside_link_region_still_found() {
        // A <link> region is still tokenized as markup; only its text is dropped.
        let scan = scan_html(
            &page("https://a.com/"),
            r#"<link rel="x"><a href="/hidden">x</a></style>"#,
        );
        assert!(scan.links.contains(&link("https://a.com/hidden")));
        assert!(scan.words.is_empty());
    }

    #[tokio::test]
    async fn test_scan_stream_across_chunks() {
        let chunks: Vec<Result<Bytes, FetchError>> = vec![
            Ok(Bytes::from_static(b"<p>hello wo")),
            Ok(Bytes::from_static(b"rld <a href=\"/next\">")),
            Ok(Bytes::from_static(b"next</a></p>")),
        ];
        let scan = scan_stream(&page("https://a.com/"), stream::iter(chunks).boxed()).await;

        assert!(scan.interrupted.is_none());
        assert_eq!(scan.words.get("world"), Some(&1));
        assert!(!scan.words.contains_key("wo"));
        assert!(scan.links.contains(&link("https://a.com/next")));
    }

    #[tokio::test]
    async fn test_broken_body_keeps_partial_results() {
        let chunks: Vec<Result<Bytes, FetchError>> = vec![
            Ok(Bytes::from_static(b"<p>partial words <a href=\"/more\">more</a>")),
            Err(FetchError::Body("connection reset".into())),
            Ok(Bytes::from_static(b"never seen")),
        ];
        let scan = scan_stream(&page("https://a.com/"), stream::iter(chunks).boxed()).await;

        assert!(matches!(scan.interrupted, Some(ScanError::Body(_))));
        assert_eq!(scan.words.get("partial"), Some(&1));
        assert!(!scan.words.contains_key("never"));
        assert!(scan.links.contains(&link("https://a.com/more")));
    }
}
