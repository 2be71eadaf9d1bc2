//! Buffered HTML output with a small lexical state machine.
//!
//! [`HtmlOutput`] accumulates encoded bytes for one output file. The state
//! machine tracks whether the writer is inside an open tag so that callers
//! can interleave element, attribute and text operations without worrying
//! about closing `>` themselves, and so empty elements self-close under
//! XHTML.

pub mod charset;
pub mod files;

pub use charset::Charset;

use crate::config::HtmlVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Neutral,
    InTag,
    InEmptyTag,
    InText,
}

/// Writer for a single HTML (or sitemap) output file.
pub struct HtmlOutput {
    buf: Vec<u8>,
    charset: Charset,
    restrict: Charset,
    version: HtmlVersion,
    state: State,
    /// Escape `"` in body text as well as in attribute values.
    pub escape_quotes: bool,
    /// Suppress entity escaping entirely (hhp project-file dialect).
    pub raw_specials: bool,
    /// Replace `"` with `'` (help window titles).
    pub single_quotes_only: bool,
    text_limit: Option<usize>,
    /// Nesting depth of the currently open contents list.
    pub contents_level: i32,
}

impl HtmlOutput {
    pub fn new(charset: Charset, restrict: Charset, version: HtmlVersion) -> Self {
        HtmlOutput {
            buf: Vec::new(),
            charset,
            restrict,
            version,
            state: State::Neutral,
            escape_quotes: false,
            raw_specials: false,
            single_quotes_only: false,
            text_limit: None,
            contents_level: 0,
        }
    }

    pub fn version(&self) -> HtmlVersion {
        self.version
    }

    pub fn restrict_charset(&self) -> Charset {
        self.restrict
    }

    /// Cap the total number of characters emitted by subsequent text
    /// operations. `None` removes the cap.
    pub fn set_text_limit(&mut self, limit: Option<usize>) {
        self.text_limit = limit;
    }

    fn push_raw(&mut self, s: &str) {
        self.buf.extend_from_slice(s.as_bytes());
    }

    /// Close any pending tag but stay ready for more output.
    fn close_pending_tag(&mut self) {
        match self.state {
            State::InEmptyTag if self.version.is_xhtml() => self.push_raw(" />"),
            State::InEmptyTag | State::InTag => self.push_raw(">"),
            _ => {}
        }
        self.state = State::Neutral;
    }

    fn return_to_neutral(&mut self) {
        self.close_pending_tag();
    }

    /// Emit raw markup verbatim, outside any open tag.
    pub fn raw(&mut self, s: &str) {
        self.return_to_neutral();
        self.push_raw(s);
    }

    /// Emit raw text as part of the currently open tag (extra attributes
    /// supplied verbatim by configuration).
    pub fn raw_in_tag(&mut self, s: &str) {
        debug_assert!(matches!(self.state, State::InTag | State::InEmptyTag));
        self.push_raw(" ");
        self.push_raw(s);
    }

    pub fn nl(&mut self) {
        self.return_to_neutral();
        self.push_raw("\n");
    }

    pub fn element_open(&mut self, name: &str) {
        self.return_to_neutral();
        self.push_raw("<");
        self.push_raw(name);
        self.state = State::InTag;
    }

    pub fn element_close(&mut self, name: &str) {
        self.return_to_neutral();
        self.push_raw("</");
        self.push_raw(name);
        self.push_raw(">");
    }

    pub fn element_empty(&mut self, name: &str) {
        self.return_to_neutral();
        self.push_raw("<");
        self.push_raw(name);
        self.state = State::InEmptyTag;
    }

    /// Attribute with a literal value (already markup-safe).
    pub fn attr(&mut self, name: &str, value: &str) {
        debug_assert!(matches!(self.state, State::InTag | State::InEmptyTag));
        self.push_raw(" ");
        self.push_raw(name);
        self.push_raw("=\"");
        self.push_raw(value);
        self.push_raw("\"");
    }

    /// Attribute whose value is escaped and transcoded document text.
    pub fn attr_text(&mut self, name: &str, value: &str) {
        debug_assert!(matches!(self.state, State::InTag | State::InEmptyTag));
        self.push_raw(" ");
        self.push_raw(name);
        self.push_raw("=\"");
        self.text_internal(value, true, false);
        self.push_raw("\"");
    }

    pub fn text(&mut self, s: &str) {
        self.close_pending_tag();
        self.text_internal(s, false, false);
        self.state = State::InText;
    }

    /// Like [`text`](Self::text) but ordinary spaces become `&nbsp;`.
    pub fn text_nbsp(&mut self, s: &str) {
        self.close_pending_tag();
        self.text_internal(s, false, true);
        self.state = State::InText;
    }

    fn text_internal(&mut self, s: &str, quote_quotes: bool, nbsp: bool) {
        let quote_quotes = quote_quotes || self.escape_quotes || self.single_quotes_only;

        let mut take = s.chars().count();
        if let Some(limit) = self.text_limit.as_mut() {
            take = take.min(*limit);
            *limit -= take;
        }

        let mut run = String::new();
        for c in s.chars().take(take) {
            let special = matches!(c, '<' | '>' | '&')
                || (c == '"' && quote_quotes)
                || (c == ' ' && nbsp);
            if !special {
                run.push(c);
                continue;
            }
            if !run.is_empty() {
                self.charset.encode_onto(&run, &mut self.buf);
                run.clear();
            }
            if c == '"' && self.single_quotes_only {
                self.buf.push(b'\'');
            } else if self.raw_specials {
                self.buf.push(c as u8);
            } else {
                let entity = match c {
                    '<' => "&lt;",
                    '>' => "&gt;",
                    '&' => "&amp;",
                    '"' => "&quot;",
                    _ => "&nbsp;",
                };
                self.buf.extend_from_slice(entity.as_bytes());
            }
        }
        if !run.is_empty() {
            self.charset.encode_onto(&run, &mut self.buf);
        }
    }

    /// Invisible anchor carrying a fragment name (plus `id` under XHTML).
    pub fn fragment_anchor(&mut self, fragment: &str) {
        self.element_open("a");
        self.attr("name", fragment);
        if self.version.is_xhtml() {
            self.attr("id", fragment);
        }
        self.element_close("a");
    }

    /// Finish the file, flushing any pending tag, and take the bytes.
    pub fn finish(mut self) -> Vec<u8> {
        self.return_to_neutral();
        self.buf
    }
}
