//! Per-file page rendering.
//!
//! [`Renderer`] walks the partitioned document once per output file and
//! produces that file's bytes: header and metadata, navigation, inline
//! contents, section bodies and the footer. The help sitemap files share
//! its word-rendering machinery (see the `help` module).

use crate::config::{Config, HtmlVersion, LevelNumbering};
use crate::doc::{
    Document, IndexTable, KeywordTable, ParaId, ParaKind, QuoteSide, SpanStyle, Word, WordKind,
};
use crate::output::HtmlOutput;
use crate::render::partition::{FileId, Partition, SectionId, SectionKind};
use crate::render::resolve::Resolved;

// Word-rendering feature flags.
pub(crate) const NOTHING: u8 = 0x00;
pub(crate) const MARKUP: u8 = 0x01;
pub(crate) const LINKS: u8 = 0x02;
pub(crate) const INDEXENTS: u8 = 0x04;
pub(crate) const ALL: u8 = MARKUP | LINKS | INDEXENTS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    None,
    Ul,
    Ol,
    Dl,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            ListKind::Ul => "ul",
            ListKind::Ol => "ol",
            ListKind::Dl => "dl",
            ListKind::None => unreachable!("no tag for the empty list state"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemKind {
    None,
    Li,
    Dt,
    Dd,
}

impl ItemKind {
    fn tag(self) -> &'static str {
        match self {
            ItemKind::Li => "li",
            ItemKind::Dt => "dt",
            ItemKind::Dd => "dd",
            ItemKind::None => unreachable!("no tag for the empty item state"),
        }
    }
}

/// Renders the pages of one session. Holds the resolved link tables
/// mutably so that anchor generation and referencing can be recorded.
pub struct Renderer<'a> {
    pub(crate) doc: &'a Document,
    pub(crate) keywords: &'a KeywordTable,
    pub(crate) index: &'a IndexTable,
    pub(crate) cfg: &'a Config,
    pub(crate) part: &'a Partition,
    pub(crate) resolved: &'a mut Resolved,
    lquote: String,
    rquote: String,
}

impl<'a> Renderer<'a> {
    pub fn new(
        doc: &'a Document,
        keywords: &'a KeywordTable,
        index: &'a IndexTable,
        cfg: &'a Config,
        part: &'a Partition,
        resolved: &'a mut Resolved,
    ) -> Self {
        let (lquote, rquote) = cfg.resolve_quotes();
        let (lquote, rquote) = (lquote.to_string(), rquote.to_string());
        Renderer {
            doc,
            keywords,
            index,
            cfg,
            part,
            resolved,
            lquote,
            rquote,
        }
    }

    fn single_file(&self) -> bool {
        self.part.files.len() == 1
    }

    /// Heading level of a section before file-relative adjustment.
    fn section_level(&self, sect: SectionId) -> i32 {
        let s = self.part.section(sect);
        match s.kind {
            SectionKind::Top => -1,
            SectionKind::Index => 0,
            SectionKind::Normal => s
                .title
                .map(|t| self.doc.para(t).kind.heading_depth())
                .unwrap_or(0),
        }
    }

    // ==================================================================
    // Whole-file rendering
    // ==================================================================

    pub fn render_file(&mut self, file: FileId, prev: Option<FileId>) -> Vec<u8> {
        let cfg = self.cfg;
        let part = self.part;
        let doc = self.doc;
        let f = part.file(file);
        let mut ho = HtmlOutput::new(cfg.output_charset, cfg.restrict_charset, cfg.html_version);

        if cfg.html_version.is_xhtml() {
            ho.raw("<?xml version=\"1.0\" encoding=\"");
            ho.raw(cfg.output_charset.mime_name());
            ho.raw("\"?>\n");
        }
        ho.raw(cfg.html_version.doctype());
        ho.nl();

        ho.element_open("html");
        if cfg.html_version.is_xhtml() {
            ho.attr("xmlns", "http://www.w3.org/1999/xhtml");
        }
        ho.nl();

        ho.element_open("head");
        ho.nl();

        ho.element_empty("meta");
        ho.attr("http-equiv", "content-type");
        ho.attr(
            "content",
            &format!("text/html; charset={}", cfg.output_charset.mime_name()),
        );
        ho.nl();

        ho.element_empty("meta");
        ho.attr("name", "generator");
        ho.attr(
            "content",
            concat!(env!("CARGO_PKG_NAME"), ", ", env!("CARGO_PKG_VERSION")),
        );
        ho.nl();

        if let Some(author) = &cfg.author {
            ho.element_empty("meta");
            ho.attr("name", "author");
            ho.attr_text("content", author);
            ho.nl();
        }
        if let Some(description) = &cfg.description {
            ho.element_empty("meta");
            ho.attr("name", "description");
            ho.attr_text("content", description);
            ho.nl();
        }

        ho.element_open("title");
        if let Some(first) = f.first
            && let Some(tp) = part.section(first).title
        {
            self.words(&mut ho, &doc.para(tp).words, NOTHING, Some(file), None);
            if let Some(last) = f.last
                && last != first
                && let Some(lp) = part.section(last).title
            {
                ho.text(&cfg.title_separator);
                self.words(&mut ho, &doc.para(lp).words, NOTHING, Some(file), None);
            }
        }
        ho.element_close("title");
        ho.nl();

        if cfg.rellinks {
            self.rel_links(&mut ho, file, prev);
        }

        if let Some(head_end) = &cfg.head_end {
            ho.raw(head_end);
        }

        ho.element_close("head");
        ho.nl();

        match &cfg.body_tag {
            Some(tag) => ho.raw(tag),
            None => ho.element_open("body"),
        }
        ho.nl();

        if let Some(body_start) = &cfg.body_start {
            ho.raw(body_start);
        }

        if cfg.navlinks && !self.single_file() {
            self.nav_bar(&mut ho, file, prev);
        }

        // In single-file mode the top section's title is promoted above
        // the inline contents.
        if self.single_file() && part.section(part.order[0]).kind == SectionKind::Top {
            ho.element_open("h1");
            for frag in part.section(part.order[0]).fragments.iter().flatten() {
                ho.fragment_anchor(frag);
            }
            self.section_title(&mut ho, part.order[0], file, true);
            ho.element_close("h1");
        }

        self.prefix_contents(&mut ho, file);
        self.sections(&mut ho, file);

        self.contents_entry(&mut ho, 0, None, file);
        ho.nl();

        self.footer(&mut ho, file);

        ho.element_close("body");
        ho.nl();
        ho.element_close("html");
        ho.nl();
        ho.finish()
    }

    fn rel_links(&mut self, ho: &mut HtmlOutput, file: FileId, prev: Option<FileId>) {
        let part = self.part;
        let cfg = self.cfg;
        let f = part.file(file);

        let mut link = |ho: &mut HtmlOutput, rel: &str, target: &str| {
            ho.element_empty("link");
            ho.attr("rel", rel);
            ho.attr("href", target);
            ho.nl();
        };

        if let Some(prev) = prev {
            link(ho, "previous", &part.file(prev).filename);
        }
        if file != FileId(0) {
            link(ho, "ToC", &part.file(FileId(0)).filename);
        }
        if cfg.leaf_level.at_least(1)
            && let Some(first) = f.first
            && let Some(parent) = part.section(first).parent
        {
            link(ho, "up", &part.file(part.section(parent).file).filename);
        }
        if let Some(idx) = part.index_file
            && idx != file
        {
            link(ho, "index", &part.file(idx).filename);
        }
        let next = FileId(file.0 + 1);
        if next.0 < part.files.len() {
            link(ho, "next", &part.file(next).filename);
        }
    }

    fn nav_bar(&mut self, ho: &mut HtmlOutput, file: FileId, prev: Option<FileId>) {
        let part = self.part;
        let cfg = self.cfg;
        let f = part.file(file);

        ho.element_open("p");
        if let Some(attr) = &cfg.nav_attr {
            ho.raw_in_tag(attr);
        }

        let mut labelled_link =
            |ho: &mut HtmlOutput, target: Option<&str>, label: &str| {
                if let Some(target) = target {
                    ho.element_open("a");
                    ho.attr("href", target);
                }
                ho.text(label);
                if target.is_some() {
                    ho.element_close("a");
                }
            };

        labelled_link(
            ho,
            prev.map(|p| part.file(p).filename.as_str()),
            &cfg.nav_prev_text,
        );
        ho.text(&cfg.nav_separator);

        let toc = (file != FileId(0)).then(|| part.file(FileId(0)).filename.as_str());
        labelled_link(ho, toc, &cfg.contents_text);

        // "Up" duplicates "Contents" when only chapters split, so it only
        // appears for deeper leaf levels.
        if cfg.leaf_level.at_least(2) {
            let up = f
                .first
                .and_then(|first| part.section(first).parent)
                .map(|p| part.file(part.section(p).file).filename.as_str());
            ho.text(&cfg.nav_separator);
            labelled_link(ho, up, &cfg.nav_up_text);
        }

        if let Some(idx) = part.index_file {
            ho.text(&cfg.nav_separator);
            let target = (idx != file).then(|| part.file(idx).filename.as_str());
            labelled_link(ho, target, &cfg.index_text);
        }

        ho.text(&cfg.nav_separator);
        let next = FileId(file.0 + 1);
        let next = (next.0 < part.files.len()).then(|| part.file(next).filename.as_str());
        labelled_link(ho, next, &cfg.nav_next_text);

        ho.element_close("p");
        ho.nl();
    }

    /// Inline contents at the top of a leaf file.
    fn prefix_contents(&mut self, ho: &mut HtmlOutput, file: FileId) {
        let part = self.part;
        let cfg = self.cfg;
        let f = part.file(file);

        let mut toc = Vec::new();
        let mut leaf = true;
        for &s in &part.order {
            let ancestor = part.ancestor_in_file(s, file);
            if part.section(s).file != file && ancestor.is_some() {
                leaf = false;
            }
            if let Some((a, adepth)) = ancestor
                && adepth <= part.section(a).contents_depth
            {
                toc.push(s);
            }
        }

        // Single-file mode already printed the top title; drop its entry
        // and pull the rest up a level.
        let toc_start = usize::from(
            self.single_file()
                && toc
                    .first()
                    .is_some_and(|&s| part.section(s).kind == SectionKind::Top),
        );

        if leaf
            && cfg.leaf_contains_contents
            && toc.len() >= cfg.leaf_smallest_contents
            && toc_start < toc.len()
        {
            for i in toc_start..toc.len() {
                let s = toc[i];
                let hlevel =
                    self.section_level(s) - toc_start as i32 - f.min_heading_depth + 1;
                debug_assert!(hlevel >= 1);
                self.contents_entry(ho, hlevel, Some(s), file);
            }
            self.contents_entry(ho, 0, None, file);
        }
    }

    /// One entry of a contents list, opening and closing `<ul>` nesting
    /// as the depth changes. Depth 0 with no section closes the list.
    fn contents_entry(
        &mut self,
        ho: &mut HtmlOutput,
        depth: i32,
        sect: Option<SectionId>,
        file: FileId,
    ) {
        if ho.contents_level >= depth && ho.contents_level > 0 {
            ho.element_close("li");
            ho.nl();
        }
        while ho.contents_level > depth {
            ho.element_close("ul");
            ho.contents_level -= 1;
            if ho.contents_level > 0 {
                ho.element_close("li");
            }
            ho.nl();
        }
        while ho.contents_level < depth {
            ho.nl();
            ho.element_open("ul");
            ho.nl();
            ho.contents_level += 1;
        }

        let Some(sect) = sect else {
            return;
        };
        ho.element_open("li");
        let target = self.part.section(sect);
        self.href(ho, file, target.file, target.fragments[0].as_deref());
        self.section_title(ho, sect, file, false);
        ho.element_close("a");
        // The <li> is closed by the next entry at this depth.
    }

    /// Main content pass: sections in this file are rendered in full;
    /// descendants of them living elsewhere become contents entries.
    fn sections(&mut self, ho: &mut HtmlOutput, file: FileId) {
        let part = self.part;
        for idx in 0..part.order.len() {
            let sect = part.order[idx];
            let s = part.section(sect);
            if s.file != file {
                if let Some((a, adepth)) = part.ancestor_in_file(sect, file)
                    && adepth <= part.section(a).contents_depth
                {
                    self.contents_entry(ho, adepth as i32, Some(sect), file);
                }
                continue;
            }

            self.contents_entry(ho, 0, None, file);

            if !(self.single_file() && s.kind == SectionKind::Top) {
                let hlevel =
                    (self.section_level(sect) - part.file(file).min_heading_depth + 1).min(6);
                debug_assert!(hlevel >= 1);
                let htag = format!("h{hlevel}");
                ho.element_open(&htag);
                for frag in part.section(sect).fragments.iter().flatten() {
                    ho.fragment_anchor(frag);
                }
                self.section_title(ho, sect, file, true);
                ho.element_close(&htag);
            }

            if let Some(text) = part.section(sect).text {
                self.section_body(ho, file, text);
            }
            if part.section(sect).kind == SectionKind::Index {
                self.index_body(ho, file);
            }
        }
    }

    fn section_body(&mut self, ho: &mut HtmlOutput, file: FileId, start: ParaId) {
        let doc = self.doc;
        let mut stack = vec![(ListKind::None, ItemKind::None)];
        let mut cursor = Some(start);

        loop {
            // What list context does the upcoming paragraph want? End of
            // document behaves like a plain paragraph so the loop below
            // unwinds any open lists before breaking.
            let kind = cursor.map(|id| doc.para(id).kind);
            let listtype = match kind.unwrap_or(ParaKind::Normal) {
                ParaKind::Rule
                | ParaKind::Normal
                | ParaKind::Copyright
                | ParaKind::BiblioCited
                | ParaKind::Code
                | ParaKind::QuotePush
                | ParaKind::QuotePop
                | ParaKind::Chapter
                | ParaKind::Appendix
                | ParaKind::UnnumberedChapter
                | ParaKind::Heading
                | ParaKind::Subsect { .. }
                | ParaKind::LcontPop => ListKind::None,
                ParaKind::Bullet => ListKind::Ul,
                ParaKind::NumberedList => ListKind::Ol,
                ParaKind::DescribedThing | ParaKind::Description => ListKind::Dl,
                ParaKind::LcontPush => {
                    stack.push((ListKind::None, ItemKind::None));
                    cursor = cursor.and_then(|id| doc.next(id));
                    continue;
                }
                // Non-printing paragraph kinds.
                ParaKind::Title | ParaKind::VersionId => {
                    cursor = cursor.and_then(|id| doc.next(id));
                    continue;
                }
            };

            ho.nl();

            // The pending list item is only closed now, after LcontPush
            // handling, so continuation paragraphs nest inside it.
            let top = stack.last_mut().expect("list stack never empties");
            if top.1 != ItemKind::None {
                ho.element_close(top.1.tag());
                ho.nl();
            }
            top.1 = ItemKind::None;

            if listtype != top.0 && top.0 != ListKind::None {
                ho.element_close(top.0.tag());
                ho.nl();
            }

            let Some(pid) = cursor else {
                break;
            };
            let pk = doc.para(pid).kind;
            if pk.is_heading() && pk != ParaKind::Title {
                break;
            }

            if listtype != top.0 && listtype != ListKind::None {
                ho.element_open(listtype.tag());
            }
            top.0 = listtype;

            match pk {
                ParaKind::Rule => ho.element_empty("hr"),
                ParaKind::Code => self.code_para(ho, pid),
                ParaKind::Normal | ParaKind::Copyright => {
                    ho.element_open("p");
                    ho.nl();
                    self.words(ho, &doc.para(pid).words, ALL, Some(file), Some(pid));
                    ho.nl();
                    ho.element_close("p");
                }
                ParaKind::BiblioCited => {
                    ho.element_open("p");
                    self.target_anchors(ho, pid);
                    ho.nl();
                    self.words(ho, &doc.para(pid).label_words, ALL, Some(file), Some(pid));
                    ho.text(" ");
                    self.words(ho, &doc.para(pid).words, ALL, Some(file), Some(pid));
                    ho.nl();
                    ho.element_close("p");
                }
                ParaKind::Bullet | ParaKind::NumberedList => {
                    ho.element_open("li");
                    self.target_anchors(ho, pid);
                    ho.nl();
                    stack.last_mut().expect("list stack never empties").1 = ItemKind::Li;
                    self.words(ho, &doc.para(pid).words, ALL, Some(file), Some(pid));
                }
                ParaKind::DescribedThing => {
                    ho.element_open("dt");
                    ho.nl();
                    stack.last_mut().expect("list stack never empties").1 = ItemKind::Dt;
                    self.words(ho, &doc.para(pid).words, ALL, Some(file), Some(pid));
                }
                ParaKind::Description => {
                    ho.element_open("dd");
                    ho.nl();
                    stack.last_mut().expect("list stack never empties").1 = ItemKind::Dd;
                    self.words(ho, &doc.para(pid).words, ALL, Some(file), Some(pid));
                }
                ParaKind::QuotePush => ho.element_open("blockquote"),
                ParaKind::QuotePop => ho.element_close("blockquote"),
                ParaKind::LcontPop => {
                    stack.pop();
                    debug_assert!(!stack.is_empty(), "unbalanced list continuation");
                }
                _ => {}
            }

            cursor = doc.next(pid);
        }

        debug_assert_eq!(stack.len(), 1, "unbalanced list continuation");
    }

    /// Anchors for a paragraph that is a cross-reference target.
    fn target_anchors(&mut self, ho: &mut HtmlOutput, pid: ParaId) {
        if let Some(&sect) = self.part.para_sections.get(&pid) {
            for frag in self.part.section(sect).fragments.iter().flatten() {
                ho.fragment_anchor(frag);
            }
        }
    }

    /// The generated index page: one paragraph, `<br>`-separated entries,
    /// each entry's term followed by links to its citation sites.
    fn index_body(&mut self, ho: &mut HtmlOutput, file: FileId) {
        let index = self.index;
        let part = self.part;
        let doc = self.doc;
        let cfg = self.cfg;

        ho.element_open("p");
        for (i, entry) in index.entries().iter().enumerate() {
            if i > 0 {
                ho.element_empty("br");
            }
            ho.nl();

            self.words(ho, &entry.text, MARKUP | LINKS, Some(file), None);
            ho.text(&cfg.index_main_sep);

            let refs = self.resolved.entry_refs[i].clone();
            for (j, key) in refs.iter().enumerate() {
                if j > 0 {
                    ho.text(&cfg.index_multi_sep);
                }
                let (sect, fragment) = {
                    let slot = self
                        .resolved
                        .slots
                        .get_mut(key)
                        .expect("entry refs only name resolved slots");
                    slot.referenced = true;
                    (slot.section, slot.fragment.clone())
                };
                self.href(ho, file, part.section(sect).file, Some(&fragment));
                match part.section(sect).title {
                    Some(tp) if !doc.para(tp).label_words.is_empty() => {
                        self.words(
                            ho,
                            &doc.para(tp).label_words,
                            MARKUP | LINKS,
                            Some(file),
                            None,
                        );
                    }
                    Some(tp) if !doc.para(tp).words.is_empty() => {
                        self.words(ho, &doc.para(tp).words, MARKUP | LINKS, Some(file), None);
                    }
                    // A titleless target can only be the preamble.
                    _ => ho.text(&cfg.preamble_text),
                }
                ho.element_close("a");
            }
        }
        ho.element_close("p");
    }

    fn footer(&mut self, ho: &mut HtmlOutput, file: FileId) {
        let cfg = self.cfg;
        let doc = self.doc;
        let mut done_version_ids = false;

        if cfg.address_section {
            ho.element_empty("hr");
        }
        if let Some(body_end) = &cfg.body_end {
            ho.raw(body_end);
        }

        if cfg.address_section {
            let mut started = false;
            if cfg.html_version == HtmlVersion::IsoHtml {
                // The ISO-HTML validator wants <address> wrapped in a
                // block element.
                ho.element_open("div");
            }
            ho.element_open("address");
            if let Some(addr_start) = &cfg.address_start {
                ho.raw(addr_start);
                ho.nl();
                started = true;
            }
            if cfg.visible_version_id {
                for (pid, p) in doc.iter() {
                    if p.kind != ParaKind::VersionId {
                        continue;
                    }
                    if started {
                        ho.element_empty("br");
                    }
                    ho.nl();
                    ho.text(&cfg.pre_versionid);
                    self.words(ho, &doc.para(pid).words, NOTHING, Some(file), Some(pid));
                    ho.text(&cfg.post_versionid);
                    started = true;
                }
                done_version_ids = true;
            }
            if let Some(addr_end) = &cfg.address_end {
                if started {
                    ho.element_empty("br");
                }
                ho.raw(addr_end);
            }
            ho.element_close("address");
            if cfg.html_version == HtmlVersion::IsoHtml {
                ho.element_close("div");
            }
        }

        if !done_version_ids {
            // Invisible version IDs still go out, as an HTML comment.
            let mut started = false;
            for (pid, p) in doc.iter() {
                if p.kind != ParaKind::VersionId {
                    continue;
                }
                if !started {
                    ho.raw("<!-- version IDs:\n");
                    started = true;
                }
                self.words(ho, &doc.para(pid).words, NOTHING, Some(file), Some(pid));
                ho.nl();
            }
            if started {
                ho.raw("-->\n");
            }
        }
    }

    // ==================================================================
    // Shared building blocks
    // ==================================================================

    /// Open an `<a href>` to another section. A same-file target with no
    /// fragment still opens a bare `<a>`, so the matching close tag stays
    /// balanced.
    pub(crate) fn href(
        &mut self,
        ho: &mut HtmlOutput,
        thisfile: FileId,
        targetfile: FileId,
        fragment: Option<&str>,
    ) {
        let mut url = String::new();
        if targetfile != thisfile {
            url.push_str(&self.part.file(targetfile).filename);
        }
        if let Some(fragment) = fragment {
            url.push('#');
            url.push_str(fragment);
        }
        ho.element_open("a");
        if !url.is_empty() {
            ho.attr("href", &url);
        }
    }

    /// A section's displayed title: optional number and suffix, then the
    /// title words. `real` enables link and index processing, which is
    /// wanted in headings but not in contents entries.
    pub(crate) fn section_title(
        &mut self,
        ho: &mut HtmlOutput,
        sect: SectionId,
        thisfile: FileId,
        real: bool,
    ) {
        let part = self.part;
        let doc = self.doc;
        let cfg = self.cfg;
        let s = part.section(sect);

        let Some(tp) = s.title else {
            // Top gets its stand-in name only in contents; a real titleless
            // top page just starts with its text.
            if s.kind == SectionKind::Top && !real {
                ho.text(&cfg.preamble_text);
            } else if s.kind == SectionKind::Index {
                ho.text(&cfg.index_text);
            }
            return;
        };

        let p = doc.para(tp);
        let depth = p.kind.heading_depth();
        let sl: Option<&LevelNumbering> = if depth < 0 {
            None
        } else if depth == 0 {
            Some(&cfg.chapter_numbering)
        } else {
            let i = (depth as usize - 1).min(cfg.section_numbering.len() - 1);
            Some(&cfg.section_numbering[i])
        };

        let number: Option<&[Word]> = match sl {
            Some(sl) if sl.shown => Some(if sl.numbers_only {
                &p.number_words
            } else {
                &p.label_words
            }),
            _ => None,
        };
        if let (Some(number), Some(sl)) = (number, sl)
            && !number.is_empty()
        {
            self.words(ho, number, MARKUP, Some(thisfile), None);
            ho.text(&sl.suffix);
        }

        let flags = if real { ALL } else { MARKUP };
        self.words(ho, &p.words, flags, Some(thisfile), Some(tp));
    }

    /// Render a run of inline words.
    ///
    /// `para` identifies the containing paragraph for index-citation
    /// anchors; fallback (`alt`) runs pass `None` so nested citations
    /// stay inert.
    pub(crate) fn words(
        &mut self,
        ho: &mut HtmlOutput,
        words: &[Word],
        flags: u8,
        thisfile: Option<FileId>,
        para: Option<ParaId>,
    ) {
        let part = self.part;
        for (i, w) in words.iter().enumerate() {
            match w.kind {
                WordKind::HyperLink => {
                    if flags & LINKS != 0 {
                        ho.element_open("a");
                        let mut url = String::new();
                        for c in w.text.chars() {
                            match c {
                                '&' => url.push_str("&amp;"),
                                '<' => url.push_str("&lt;"),
                                '>' => url.push_str("&gt;"),
                                _ => url.push(c),
                            }
                        }
                        ho.attr("href", &url);
                    }
                }
                WordKind::Xref => {
                    if flags & LINKS != 0
                        && let Some(thisfile) = thisfile
                    {
                        let target = self
                            .keywords
                            .lookup(&w.text)
                            .and_then(|pid| part.para_sections.get(&pid).copied());
                        match target {
                            Some(sect) => {
                                let s = part.section(sect);
                                self.href(ho, thisfile, s.file, s.fragments[0].as_deref());
                            }
                            // Unresolvable; open a bare anchor so the
                            // XrefEnd still has something to close.
                            None => self.href(ho, thisfile, thisfile, None),
                        }
                    }
                }
                WordKind::HyperEnd | WordKind::XrefEnd => {
                    if flags & LINKS != 0 {
                        ho.element_close("a");
                    }
                }
                WordKind::IndexRef => {
                    if flags & INDEXENTS != 0
                        && let Some(pid) = para
                        && let Some(slot) = self.resolved.slots.get_mut(&(pid, i))
                    {
                        ho.fragment_anchor(&slot.fragment);
                        slot.generated = true;
                    }
                }
                WordKind::Text | WordKind::Space | WordKind::Quote(_) => {
                    let markup = flags & MARKUP != 0;
                    let tag = match w.style {
                        SpanStyle::Emph => Some("em"),
                        SpanStyle::Strong => Some("strong"),
                        SpanStyle::Code | SpanStyle::WeakCode => Some("code"),
                        SpanStyle::Normal => None,
                    };
                    if markup
                        && let Some(tag) = tag
                        && w.pos.opens()
                    {
                        ho.element_open(tag);
                    }

                    match w.kind {
                        WordKind::Space => ho.text(" "),
                        WordKind::Quote(QuoteSide::Open) => ho.text(&self.lquote),
                        WordKind::Quote(QuoteSide::Close) => ho.text(&self.rquote),
                        _ => {
                            if w.alt.is_empty() || ho.restrict_charset().can_encode(&w.text) {
                                ho.text_nbsp(&w.text);
                            } else {
                                self.words(ho, &w.alt, flags, thisfile, None);
                            }
                        }
                    }

                    if markup
                        && let Some(tag) = tag
                        && w.pos.closes()
                    {
                        ho.element_close(tag);
                    }
                }
            }
        }
    }

    /// A code paragraph: `<pre><code>` with one source line per text
    /// word, optionally followed by an emphasis-mask word marking runs to
    /// set in `<em>` or `<b>`.
    fn code_para(&mut self, ho: &mut HtmlOutput, pid: ParaId) {
        let doc = self.doc;
        let words = &doc.para(pid).words;

        ho.element_open("pre");
        ho.element_open("code");
        let mut i = 0;
        while i < words.len() {
            let w = &words[i];
            i += 1;
            if !(w.kind == WordKind::Text && w.style == SpanStyle::WeakCode) {
                continue;
            }
            let line: Vec<char> = w.text.chars().collect();
            let mask: Vec<char> = match words.get(i) {
                Some(m) if m.kind == WordKind::Text && m.style == SpanStyle::Emph => {
                    i += 1;
                    m.text.chars().collect()
                }
                _ => Vec::new(),
            };

            let mut pos = 0;
            while pos < line.len() && pos < mask.len() {
                let mc = mask[pos];
                let mut n = 0;
                while pos + n < line.len() && pos + n < mask.len() && mask[pos + n] == mc {
                    n += 1;
                }
                let tag = match mc {
                    'i' => Some("em"),
                    'b' => Some("b"),
                    _ => None,
                };
                if let Some(tag) = tag {
                    ho.element_open(tag);
                }
                let run: String = line[pos..pos + n].iter().collect();
                ho.text(&run);
                if let Some(tag) = tag {
                    ho.element_close(tag);
                }
                pos += n;
            }
            let rest: String = line[pos..].iter().collect();
            ho.text(&rest);
            ho.nl();
        }
        ho.element_close("code");
        ho.element_close("pre");
    }
}
