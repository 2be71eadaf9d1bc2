//! In-memory document model.
//!
//! This is the representation handed over by the parser: a flat, ordered
//! arena of paragraphs with parent links mirroring heading nesting, plus
//! the two read-only lookup tables built alongside it (cross-reference
//! keywords and index entries). The rendering backend never mutates any
//! of this; per-pass data lives in side tables keyed by [`ParaId`].

use std::collections::BTreeMap;

/// Stable index of a paragraph in its [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParaId(pub u32);

impl ParaId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One block-level unit of the source document.
#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    pub kind: ParaKind,
    /// Body text of the paragraph.
    pub words: Vec<Word>,
    /// Formatted number-plus-name words for headings ("Chapter 2") and the
    /// citation text for bibliography entries ("[Smith99]").
    pub label_words: Vec<Word>,
    /// Bare section number words ("2.3"), where numbered.
    pub number_words: Vec<Word>,
    /// Cross-reference key under which this paragraph can be targeted.
    pub keyword: Option<String>,
    /// Enclosing heading paragraph, if any.
    pub parent: Option<ParaId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParaKind {
    Title,
    Chapter,
    Appendix,
    UnnumberedChapter,
    Heading,
    /// Subsection heading; `level` 1 is the first depth below [`ParaKind::Heading`].
    Subsect {
        level: u8,
    },
    #[default]
    Normal,
    Copyright,
    BiblioCited,
    Code,
    Bullet,
    NumberedList,
    DescribedThing,
    Description,
    Rule,
    QuotePush,
    QuotePop,
    /// Open a nested list context inside the current list item.
    LcontPush,
    /// Close the context opened by the matching [`ParaKind::LcontPush`].
    LcontPop,
    VersionId,
}

impl ParaKind {
    pub fn is_heading(self) -> bool {
        matches!(
            self,
            ParaKind::Title
                | ParaKind::Chapter
                | ParaKind::Appendix
                | ParaKind::UnnumberedChapter
                | ParaKind::Heading
                | ParaKind::Subsect { .. }
        )
    }

    /// Heading depth: title -1, chapter class 0, heading 1, subsections 2+.
    ///
    /// The leaf-depth policy counts from 1 at chapter level, i.e. one more
    /// than this.
    pub fn heading_depth(self) -> i32 {
        match self {
            ParaKind::Title => -1,
            ParaKind::Chapter | ParaKind::Appendix | ParaKind::UnnumberedChapter => 0,
            ParaKind::Heading => 1,
            ParaKind::Subsect { level } => level as i32 + 1,
            _ => 0,
        }
    }
}

/// Inline span style carried by text words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpanStyle {
    #[default]
    Normal,
    Emph,
    Strong,
    Code,
    WeakCode,
}

/// Position of a word within a styled run.
///
/// Style tags are only emitted at run boundaries, so a three-word
/// emphasised run produces one `<em>`...`</em>` pair rather than three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPos {
    #[default]
    Only,
    First,
    Middle,
    Last,
}

impl RunPos {
    pub fn opens(self) -> bool {
        matches!(self, RunPos::Only | RunPos::First)
    }

    pub fn closes(self) -> bool {
        matches!(self, RunPos::Only | RunPos::Last)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteSide {
    Open,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WordKind {
    /// Plain text content.
    #[default]
    Text,
    /// Inter-word space (subject to the same style run as its neighbours).
    Space,
    /// Directional quote mark; rendered with the configured quote pair.
    Quote(QuoteSide),
    /// Start of a hyperlink; `text` is the URL.
    HyperLink,
    HyperEnd,
    /// Start of a cross-reference; `text` is the keyword key.
    Xref,
    XrefEnd,
    /// Index citation marker; `text` is the index tag.
    IndexRef,
}

/// One word of inline content.
#[derive(Debug, Clone, Default)]
pub struct Word {
    pub kind: WordKind,
    pub style: SpanStyle,
    pub pos: RunPos,
    pub text: String,
    /// Fallback words used when `text` cannot be represented in the
    /// restricted character set.
    pub alt: Vec<Word>,
}

impl Word {
    pub fn text(text: impl Into<String>) -> Self {
        Word {
            text: text.into(),
            ..Word::default()
        }
    }

    pub fn space() -> Self {
        Word {
            kind: WordKind::Space,
            ..Word::default()
        }
    }

    pub fn quote(side: QuoteSide) -> Self {
        Word {
            kind: WordKind::Quote(side),
            ..Word::default()
        }
    }

    pub fn styled(text: impl Into<String>, style: SpanStyle, pos: RunPos) -> Self {
        Word {
            style,
            pos,
            text: text.into(),
            ..Word::default()
        }
    }

    pub fn xref(key: impl Into<String>) -> Self {
        Word {
            kind: WordKind::Xref,
            text: key.into(),
            ..Word::default()
        }
    }

    pub fn xref_end() -> Self {
        Word {
            kind: WordKind::XrefEnd,
            ..Word::default()
        }
    }

    pub fn index_ref(tag: impl Into<String>) -> Self {
        Word {
            kind: WordKind::IndexRef,
            text: tag.into(),
            ..Word::default()
        }
    }

    /// Split plain prose into space-separated text words, the way the
    /// parser does for unstyled content.
    pub fn plain(text: &str) -> Vec<Word> {
        let mut words = Vec::new();
        for (i, part) in text.split_whitespace().enumerate() {
            if i > 0 {
                words.push(Word::space());
            }
            words.push(Word::text(part));
        }
        words
    }
}

/// The parsed document: a paragraph arena in source order.
#[derive(Debug, Clone, Default)]
pub struct Document {
    paras: Vec<Paragraph>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, para: Paragraph) -> ParaId {
        let id = ParaId(self.paras.len() as u32);
        self.paras.push(id_checked(para));
        id
    }

    pub fn para(&self, id: ParaId) -> &Paragraph {
        &self.paras[id.index()]
    }

    pub fn len(&self) -> usize {
        self.paras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paras.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParaId, &Paragraph)> {
        self.paras
            .iter()
            .enumerate()
            .map(|(i, p)| (ParaId(i as u32), p))
    }

    /// Paragraph following `id` in source order.
    pub fn next(&self, id: ParaId) -> Option<ParaId> {
        let next = id.index() + 1;
        (next < self.paras.len()).then(|| ParaId(next as u32))
    }

    // ------------------------------------------------------------------
    // Construction helpers, used by parsers and tests alike.
    // ------------------------------------------------------------------

    pub fn add_title(&mut self, title: &str) -> ParaId {
        self.push(Paragraph {
            kind: ParaKind::Title,
            words: Word::plain(title),
            ..Paragraph::default()
        })
    }

    /// Add a numbered heading paragraph; `number` is the bare number text
    /// and `label` the full "Chapter N" form shown before the title.
    pub fn add_heading(
        &mut self,
        kind: ParaKind,
        parent: Option<ParaId>,
        label: &str,
        number: &str,
        title: &str,
    ) -> ParaId {
        self.push(Paragraph {
            kind,
            words: Word::plain(title),
            label_words: Word::plain(label),
            number_words: Word::plain(number),
            parent,
            ..Paragraph::default()
        })
    }

    pub fn add_chapter(&mut self, label: &str, number: &str, title: &str) -> ParaId {
        self.add_heading(ParaKind::Chapter, None, label, number, title)
    }

    pub fn add_normal(&mut self, parent: Option<ParaId>, text: &str) -> ParaId {
        self.push(Paragraph {
            kind: ParaKind::Normal,
            words: Word::plain(text),
            parent,
            ..Paragraph::default()
        })
    }

    pub fn add_para(&mut self, kind: ParaKind, parent: Option<ParaId>, words: Vec<Word>) -> ParaId {
        self.push(Paragraph {
            kind,
            words,
            parent,
            ..Paragraph::default()
        })
    }
}

fn id_checked(para: Paragraph) -> Paragraph {
    debug_assert!(
        !(para.kind == ParaKind::Title && para.parent.is_some()),
        "title paragraphs have no parent"
    );
    para
}

/// Cross-reference key to target paragraph lookup, consumed read-only.
///
/// Ordered so that derived artifacts (non-heading fragment numbering) are
/// deterministic across runs.
#[derive(Debug, Clone, Default)]
pub struct KeywordTable {
    keys: BTreeMap<String, ParaId>,
}

impl KeywordTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, target: ParaId) {
        self.keys.insert(key.into(), target);
    }

    pub fn lookup(&self, key: &str) -> Option<ParaId> {
        self.keys.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ParaId)> {
        self.keys.iter().map(|(k, &v)| (k.as_str(), v))
    }
}

/// One index term with its display form.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub text: Vec<Word>,
}

/// Document-wide index: ordered entries plus a tag lookup mapping index
/// citation tags to the entries they feed.
#[derive(Debug, Clone, Default)]
pub struct IndexTable {
    entries: Vec<IndexEntry>,
    tags: BTreeMap<String, Vec<usize>>,
}

impl IndexTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry(&mut self, text: Vec<Word>) -> usize {
        self.entries.push(IndexEntry { text });
        self.entries.len() - 1
    }

    /// Associate a citation tag with an entry created by [`add_entry`].
    ///
    /// [`add_entry`]: IndexTable::add_entry
    pub fn add_tag(&mut self, tag: impl Into<String>, entry: usize) {
        self.tags.entry(tag.into()).or_default().push(entry);
    }

    /// Convenience for the common case of a tag indexing a single term
    /// under its own name.
    pub fn add_term(&mut self, tag: &str) -> usize {
        let entry = self.add_entry(Word::plain(tag));
        self.add_tag(tag, entry);
        entry
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn has_entries(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn entries_for_tag(&self, tag: &str) -> &[usize] {
        self.tags.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_depths() {
        assert_eq!(ParaKind::Title.heading_depth(), -1);
        assert_eq!(ParaKind::Chapter.heading_depth(), 0);
        assert_eq!(ParaKind::Appendix.heading_depth(), 0);
        assert_eq!(ParaKind::Heading.heading_depth(), 1);
        assert_eq!(ParaKind::Subsect { level: 1 }.heading_depth(), 2);
        assert_eq!(ParaKind::Subsect { level: 3 }.heading_depth(), 4);
    }

    #[test]
    fn plain_words_interleave_spaces() {
        let words = Word::plain("two words  here");
        assert_eq!(words.len(), 5);
        assert_eq!(words[0].text, "two");
        assert_eq!(words[1].kind, WordKind::Space);
        assert_eq!(words[4].text, "here");
    }

    #[test]
    fn document_order_and_parents() {
        let mut doc = Document::new();
        let ch = doc.add_chapter("Chapter 1", "1", "Intro");
        let p = doc.add_normal(Some(ch), "Some text.");
        assert_eq!(doc.para(p).parent, Some(ch));
        assert_eq!(doc.next(ch), Some(p));
        assert_eq!(doc.next(p), None);
    }

    #[test]
    fn index_tags_fan_out() {
        let mut idx = IndexTable::new();
        let a = idx.add_entry(Word::plain("alpha"));
        let b = idx.add_entry(Word::plain("beta"));
        idx.add_tag("shared", a);
        idx.add_tag("shared", b);
        assert_eq!(idx.entries_for_tag("shared"), &[a, b]);
        assert!(idx.entries_for_tag("missing").is_empty());
    }
}
