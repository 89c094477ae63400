// src/scan/token.rs
// =============================================================================
// An incremental HTML tokenizer over raw byte chunks.
//
// We use html5ever's tokenizer (the same one `scraper` sits on) without its
// tree builder, so no DOM is built. Tokens are queued as they are produced
// and pulled out one at a time with `next_token()`.
//
// A few details worth knowing:
// - Network chunks can split a UTF-8 character; the incomplete tail is kept
//   in `carry` until the next chunk arrives
// - html5ever may emit character data in several pieces; consecutive pieces
//   are joined into one `Text` token so a word split across chunks is counted
//   once
// - Without a tree builder nobody switches the tokenizer into raw-text mode,
//   so the sink does it: after <script>, <style>, <title>... the contents come
//   back as one `Text` token up to the matching end tag, never as markup
// =============================================================================

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer as Html5Tokenizer,
    TokenizerOpts,
};
use std::collections::VecDeque;

/// One lexical HTML token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlToken {
    Text(String),
    StartTag {
        name: String,
        attrs: Vec<(String, String)>,
    },
    EndTag {
        name: String,
    },
    SelfClosingTag {
        name: String,
        attrs: Vec<(String, String)>,
    },
    /// End of input. Nothing follows it.
    Error,
}

impl HtmlToken {
    /// Tag name for tag tokens, lowercase as html5ever normalizes it.
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            HtmlToken::StartTag { name, .. }
            | HtmlToken::EndTag { name }
            | HtmlToken::SelfClosingTag { name, .. } => Some(name),
            HtmlToken::Text(_) | HtmlToken::Error => None,
        }
    }

    /// Looks up an attribute on a start or self-closing tag.
    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            HtmlToken::StartTag { attrs, .. } | HtmlToken::SelfClosingTag { attrs, .. } => attrs
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    fn from_tag(tag: Tag) -> Self {
        let name = tag.name.to_string();
        let attrs = || {
            tag.attrs
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect()
        };

        match tag.kind {
            TagKind::EndTag => HtmlToken::EndTag { name },
            TagKind::StartTag if tag.self_closing => HtmlToken::SelfClosingTag {
                name,
                attrs: attrs(),
            },
            TagKind::StartTag => HtmlToken::StartTag {
                name,
                attrs: attrs(),
            },
        }
    }
}

#[derive(Debug, Default)]
struct TokenBuffer {
    text: String,
    ready: VecDeque<HtmlToken>,
}

impl TokenBuffer {
    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            self.ready
                .push_back(HtmlToken::Text(std::mem::take(&mut self.text)));
        }
    }
}

impl TokenSink for TokenBuffer {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::CharacterTokens(text) => self.text.push_str(&text),
            Token::TagToken(tag) => {
                self.flush_text();
                let mode = content_mode(&tag);
                self.ready.push_back(HtmlToken::from_tag(tag));
                return mode;
            }
            Token::EOFToken => {
                self.flush_text();
                self.ready.push_back(HtmlToken::Error);
            }
            // Recoverable markup errors; the tokenizer has already moved on.
            Token::ParseError(message) => {
                tracing::trace!(%message, "html parse error");
            }
            // Comments, doctypes and NUL characters end a run of text.
            _ => self.flush_text(),
        }
        TokenSinkResult::Continue
    }
}

// Tokenizer state for the contents of a start tag, as the HTML tree builder
// would pick it.
fn content_mode(tag: &Tag) -> TokenSinkResult<()> {
    if tag.kind != TagKind::StartTag || tag.self_closing {
        return TokenSinkResult::Continue;
    }

    match &*tag.name {
        "script" => TokenSinkResult::RawData(RawKind::ScriptData),
        "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript" => {
            TokenSinkResult::RawData(RawKind::Rawtext)
        }
        "textarea" | "title" => TokenSinkResult::RawData(RawKind::Rcdata),
        "plaintext" => TokenSinkResult::Plaintext,
        _ => TokenSinkResult::Continue,
    }
}

/// Feeds byte chunks through html5ever and yields `HtmlToken`s.
pub struct Tokenizer {
    inner: Html5Tokenizer<TokenBuffer>,
    input: BufferQueue,
    carry: Vec<u8>,
    ended: bool,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            inner: Html5Tokenizer::new(TokenBuffer::default(), TokenizerOpts::default()),
            input: BufferQueue::new(),
            carry: Vec::new(),
            ended: false,
        }
    }

    /// Pushes the next chunk of the document.
    pub fn feed(&mut self, chunk: &[u8]) {
        if self.ended {
            return;
        }

        let text = self.decode(chunk);
        if !text.is_empty() {
            self.input.push_back(StrTendril::from_slice(&text));
            let _ = self.inner.feed(&mut self.input);
        }
    }

    /// Signals end of input; the final token will be `HtmlToken::Error`.
    pub fn end(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;

        if !self.carry.is_empty() {
            let tail = String::from_utf8_lossy(&self.carry).into_owned();
            self.carry.clear();
            self.input.push_back(StrTendril::from_slice(&tail));
            let _ = self.inner.feed(&mut self.input);
        }
        self.inner.end();
    }

    /// Pops the next token that is ready, if any.
    pub fn next_token(&mut self) -> Option<HtmlToken> {
        self.inner.sink.ready.pop_front()
    }

    // Decodes as much of `carry + chunk` as forms complete UTF-8. Invalid
    // bytes become U+FFFD; an incomplete trailing sequence waits for more input.
    fn decode(&mut self, chunk: &[u8]) -> String {
        self.carry.extend_from_slice(chunk);

        let complete = match std::str::from_utf8(&self.carry) {
            Ok(_) => self.carry.len(),
            Err(err) if err.error_len().is_none() => err.valid_up_to(),
            Err(_) => match incomplete_tail(&self.carry) {
                0 => self.carry.len(),
                tail => self.carry.len() - tail,
            },
        };

        let rest = self.carry.split_off(complete);
        let text = String::from_utf8_lossy(&self.carry).into_owned();
        self.carry = rest;
        text
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

// Length of a trailing, not-yet-complete UTF-8 sequence (0 if none).
fn incomplete_tail(bytes: &[u8]) -> usize {
    let start = bytes.len().saturating_sub(3);
    for (offset, &byte) in bytes[start..].iter().enumerate().rev() {
        let idx = start + offset;
        let needed = match byte {
            0x00..=0x7F => return 0,
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            // continuation byte, keep looking for the lead byte
            0x80..=0xBF => continue,
            _ => return 0,
        };
        let have = bytes.len() - idx;
        return if have < needed { have } else { 0 };
    }
    0
}
