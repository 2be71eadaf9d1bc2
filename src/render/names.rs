//! Output-name sanitisation and template formatting.
//!
//! A [`NameRegistry`] lives for one render session. It turns arbitrary
//! document text into safe filenames and fragment identifiers, keeping
//! every filename unique across the output set and every fragment unique
//! within its file.

use std::collections::HashSet;

use crate::doc::{Paragraph, WordKind};
use crate::render::partition::FileId;

/// Session-scoped registry of claimed filenames and fragments.
#[derive(Debug, Default)]
pub struct NameRegistry {
    filenames: HashSet<String>,
    fragments: HashSet<(FileId, String)>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reduce `text` to a safe, unique output filename and claim it.
    ///
    /// Characters outside `[A-Za-z0-9._+=-]` are dropped; an empty result
    /// becomes `anon.html`. Collisions get `-2`, `-3`, ... inserted before
    /// the last extension.
    pub fn sanitise_filename(&mut self, text: &str) -> String {
        let mut name: String = text
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.' | '='))
            .collect();
        if name.is_empty() {
            name = "anon.html".to_string();
        }
        if self.filenames.contains(&name) {
            let ext_pos = name.rfind('.').unwrap_or(name.len());
            let (base, ext) = name.split_at(ext_pos);
            let mut n = 2;
            let mut candidate = format!("{base}-{n}{ext}");
            while self.filenames.contains(&candidate) {
                n += 1;
                candidate = format!("{base}-{n}{ext}");
            }
            name = candidate;
        }
        self.filenames.insert(name.clone());
        name
    }

    /// Reduce `text` to a fragment identifier unique within `file` and
    /// claim it.
    ///
    /// Fragments must start with a letter; leading non-letters are
    /// stripped, then characters outside `[A-Za-z0-9-_:.]` are dropped. An
    /// empty result becomes `anon`. Collisions get `-2`, `-3`, ...
    /// appended.
    pub fn sanitise_fragment(&mut self, file: FileId, text: &str) -> String {
        let stripped = text.trim_start_matches(|c: char| !c.is_ascii_alphabetic());
        let mut frag: String = stripped
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
            .collect();
        if frag.is_empty() {
            frag = "anon".to_string();
        }
        if self.fragments.contains(&(file, frag.clone())) {
            let mut n = 2;
            let mut candidate = format!("{frag}-{n}");
            while self.fragments.contains(&(file, candidate.clone())) {
                n += 1;
                candidate = format!("{frag}-{n}");
            }
            frag = candidate;
        }
        self.fragments.insert((file, frag.clone()));
        frag
    }
}

/// Expand a `%`-template against a heading paragraph.
///
/// `%n` is the section title text, `%b` the bare number (with the
/// section-kind initial when the heading has a label), `%k` the
/// cross-reference keyword, `%%` a literal percent. A directive whose
/// source is empty, or an unknown directive, falls back to the title
/// text.
pub fn format_template(para: &Paragraph, template: &str) -> String {
    let mut out = String::new();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let Some(&fmt) = chars.peek() else {
            break;
        };
        chars.next();
        if fmt == '%' {
            out.push('%');
            continue;
        }
        let mut done = false;
        match fmt {
            'n' => {
                if !para.words.is_empty() {
                    collect_text(&para.words, &mut out);
                    done = true;
                }
            }
            'b' => {
                // The bare number, prefixed with the label's initial
                // letter when there is one ("C2" for "Chapter 2").
                if !para.number_words.is_empty() {
                    let initial = para
                        .label_words
                        .iter()
                        .find(|w| w.kind == WordKind::Text)
                        .and_then(|w| w.text.chars().next());
                    if let Some(initial) = initial {
                        out.push(initial);
                    }
                    collect_text(&para.number_words, &mut out);
                    done = true;
                }
            }
            'k' => {
                if let Some(keyword) = &para.keyword
                    && !keyword.is_empty()
                {
                    out.push_str(keyword);
                    done = true;
                }
            }
            _ => {}
        }
        if !done {
            collect_text(&para.words, &mut out);
        }
    }
    out
}

fn collect_text(words: &[crate::doc::Word], out: &mut String) {
    for w in words {
        if w.kind == WordKind::Text {
            out.push_str(&w.text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::{Document, ParaKind};

    fn file(n: usize) -> FileId {
        FileId(n)
    }

    #[test]
    fn filename_keeps_safe_characters_only() {
        let mut names = NameRegistry::new();
        assert_eq!(names.sanitise_filename("My Chapter?.html"), "MyChapter.html");
        assert_eq!(names.sanitise_filename("\u{00e9}\u{00e9}"), "anon.html");
    }

    #[test]
    fn filename_collisions_numbered_before_extension() {
        let mut names = NameRegistry::new();
        assert_eq!(names.sanitise_filename("Notes.html"), "Notes.html");
        assert_eq!(names.sanitise_filename("Notes.html"), "Notes-2.html");
        assert_eq!(names.sanitise_filename("Notes.html"), "Notes-3.html");
        assert_eq!(names.sanitise_filename("Notes"), "Notes");
        assert_eq!(names.sanitise_filename("Notes"), "Notes-2");
    }

    #[test]
    fn fragment_strips_leading_nonletters() {
        let mut names = NameRegistry::new();
        assert_eq!(names.sanitise_fragment(file(0), "2.3-setup"), "setup");
        assert_eq!(names.sanitise_fragment(file(0), "123"), "anon");
    }

    #[test]
    fn fragment_uniqueness_is_per_file() {
        let mut names = NameRegistry::new();
        assert_eq!(names.sanitise_fragment(file(0), "intro"), "intro");
        assert_eq!(names.sanitise_fragment(file(0), "intro"), "intro-2");
        assert_eq!(names.sanitise_fragment(file(1), "intro"), "intro");
    }

    #[test]
    fn template_directives() {
        let mut doc = Document::new();
        let ch = doc.add_chapter("Chapter 2", "2", "Getting Started");
        let para = doc.para(ch).clone();
        assert_eq!(format_template(&para, "%n.html"), "GettingStarted.html");
        assert_eq!(format_template(&para, "%b"), "C2");
        assert_eq!(format_template(&para, "100%%"), "100%");
        // Unknown directive falls back to the title words.
        assert_eq!(format_template(&para, "%z"), "GettingStarted");
    }

    #[test]
    fn bare_number_directive_works_without_a_label() {
        let mut doc = Document::new();
        let h = doc.add_heading(ParaKind::Heading, None, "", "2.5", "Odd One");
        let para = doc.para(h).clone();
        assert_eq!(format_template(&para, "%b"), "2.5");
        // A label without a number still falls back to the title.
        let u = doc.add_heading(ParaKind::UnnumberedChapter, None, "Preface", "", "Why");
        let para = doc.para(u).clone();
        assert_eq!(format_template(&para, "%b"), "Why");
    }

    #[test]
    fn template_falls_back_when_source_empty() {
        let mut doc = Document::new();
        let ch = doc.add_heading(ParaKind::UnnumberedChapter, None, "", "", "Legal Stuff");
        let para = doc.para(ch).clone();
        assert_eq!(format_template(&para, "%n.html"), "LegalStuff.html");
        assert_eq!(format_template(&para, "%b"), "LegalStuff");
        assert_eq!(format_template(&para, "%k"), "LegalStuff");
    }

    #[test]
    fn template_keyword_directive() {
        let mut doc = Document::new();
        let ch = doc.add_chapter("Chapter 1", "1", "Intro");
        let mut para = doc.para(ch).clone();
        para.keyword = Some("intro-chapter".to_string());
        assert_eq!(format_template(&para, "%k.html"), "intro-chapter.html");
    }
}
