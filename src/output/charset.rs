//! Output character-set handling.
//!
//! Thin layer over `encoding_rs`: we use its encoder side, including its
//! HTML numeric-character-reference replacement for unmappable characters,
//! plus a hand-rolled US-ASCII target which the WHATWG encoding set does
//! not provide.

use std::fmt::Write as _;

use encoding_rs::{Encoding, UTF_8};

/// A target or restriction character set for rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// Strict 7-bit ASCII; anything else becomes a numeric entity.
    Ascii,
    Encoding(&'static Encoding),
}

impl Charset {
    pub const UTF8: Charset = Charset::Encoding(UTF_8);
    pub const WINDOWS_1252: Charset = Charset::Encoding(encoding_rs::WINDOWS_1252);

    /// Resolve a user-supplied charset label.
    ///
    /// Checked before the WHATWG label table because that table aliases
    /// "ascii" to windows-1252, which is not what a restrict-charset of
    /// ASCII should mean.
    pub fn from_label(label: &str) -> Option<Charset> {
        let trimmed = label.trim();
        if trimmed.eq_ignore_ascii_case("ascii") || trimmed.eq_ignore_ascii_case("us-ascii") {
            return Some(Charset::Ascii);
        }
        Encoding::for_label(trimmed.as_bytes()).map(Charset::Encoding)
    }

    /// MIME name for `<meta http-equiv>` and XML declarations.
    pub fn mime_name(&self) -> &'static str {
        match self {
            Charset::Ascii => "US-ASCII",
            Charset::Encoding(e) => e.name(),
        }
    }

    /// Whether every character of `text` has a direct encoding (no
    /// numeric-reference fallback needed).
    pub fn can_encode(&self, text: &str) -> bool {
        match self {
            Charset::Ascii => text.is_ascii(),
            Charset::Encoding(e) => {
                if *e == UTF_8 {
                    return true;
                }
                let (_, _, had_errors) = e.encode(text);
                !had_errors
            }
        }
    }

    /// Encode `text` onto `out`, replacing unrepresentable characters with
    /// decimal numeric character references.
    pub fn encode_onto(&self, text: &str, out: &mut Vec<u8>) {
        match self {
            Charset::Ascii => {
                for c in text.chars() {
                    if c.is_ascii() {
                        out.push(c as u8);
                    } else {
                        let mut entity = String::new();
                        write!(entity, "&#{};", c as u32).unwrap();
                        out.extend_from_slice(entity.as_bytes());
                    }
                }
            }
            Charset::Encoding(e) => {
                let (bytes, _, _) = e.encode(text);
                out.extend_from_slice(&bytes);
            }
        }
    }
}
