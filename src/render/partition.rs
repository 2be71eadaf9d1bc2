//! Partitioning the document tree into sections and output files.
//!
//! Sections mirror the heading structure (plus a synthetic top section and
//! an optional index section) and each is assigned to an output file
//! according to the configured leaf-depth policy. Everything here is plain
//! data with integer ids; the renderer consults it read-only.

use std::collections::HashMap;

use crate::config::{Config, LeafLevel};
use crate::doc::{Document, ParaId, ParaKind};
use crate::render::names::{NameRegistry, format_template};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Normal,
    /// Synthetic section for the document title and preamble.
    Top,
    /// Synthetic section holding the generated index page.
    Index,
}

#[derive(Debug)]
pub struct Section {
    pub kind: SectionKind,
    /// Heading paragraph, absent for synthetic sections.
    pub title: Option<ParaId>,
    /// First body paragraph, if the section has any body.
    pub text: Option<ParaId>,
    pub parent: Option<SectionId>,
    pub file: FileId,
    /// How many levels of descendants this section's inline contents
    /// covers, relative to this section.
    pub contents_depth: u32,
    /// Sanitised fragment names, one per configured fragment template.
    pub fragments: Vec<Option<String>>,
}

#[derive(Debug)]
pub struct OutputFile {
    pub filename: String,
    /// Shallowest heading depth appearing in the file.
    pub min_heading_depth: i32,
    /// First and last sections at that shallowest depth.
    pub first: Option<SectionId>,
    pub last: Option<SectionId>,
    /// Counter for machine-generated fragment names within this file.
    pub fragment_counter: u32,
}

/// The partitioned document: sections in presentation order plus the
/// output files they map onto.
#[derive(Debug)]
pub struct Partition {
    pub sections: Vec<Section>,
    /// Sections rendered in document order. Sections created later for
    /// non-heading link targets are not listed here.
    pub order: Vec<SectionId>,
    pub files: Vec<OutputFile>,
    /// Heading (and, after resolution, keyword-target) paragraph to
    /// section lookup.
    pub para_sections: HashMap<ParaId, SectionId>,
    pub top: SectionId,
    pub index_file: Option<FileId>,
    single_file: Option<FileId>,
}

impl Partition {
    pub fn section(&self, id: SectionId) -> &Section {
        &self.sections[id.0]
    }

    pub fn file(&self, id: FileId) -> &OutputFile {
        &self.files[id.0]
    }

    pub fn file_ids(&self) -> impl Iterator<Item = FileId> {
        (0..self.files.len()).map(FileId)
    }

    /// Shallowest ancestor of `sect` (or `sect` itself) living in `file`,
    /// along with the ancestor distance climbed to reach it.
    pub fn ancestor_in_file(&self, sect: SectionId, file: FileId) -> Option<(SectionId, u32)> {
        let mut cur = Some(sect);
        let mut depth = 0;
        let mut found = None;
        while let Some(s) = cur {
            if self.sections[s.0].file == file {
                found = Some((s, depth));
            }
            cur = self.sections[s.0].parent;
            depth += 1;
        }
        // Distances were counted upward from `sect`; report the climb from
        // `sect` to the match.
        found
    }

    /// A file is a leaf when no section outside it has an ancestor inside
    /// it.
    pub fn is_leaf_file(&self, file: FileId) -> bool {
        for &s in &self.order {
            if self.sections[s.0].file != file && self.ancestor_in_file(s, file).is_some() {
                return false;
            }
        }
        true
    }

    fn new_section(&mut self, section: Section, in_order: bool) -> SectionId {
        let id = SectionId(self.sections.len());
        self.sections.push(section);
        if in_order {
            self.order.push(id);
        }
        id
    }

    fn new_file(&mut self, names: &mut NameRegistry, raw_name: &str) -> FileId {
        let id = FileId(self.files.len());
        self.files.push(OutputFile {
            filename: names.sanitise_filename(raw_name),
            min_heading_depth: i32::MAX,
            first: None,
            last: None,
            fragment_counter: 0,
        });
        id
    }

    /// Pick or create the output file for `sect`, whose heading sits at
    /// `depth` (-1 for the top section). Records the file's shallowest
    /// section range as a side effect.
    fn assign_file(
        &mut self,
        cfg: &Config,
        names: &mut NameRegistry,
        doc: &Document,
        sect: SectionId,
        depth: i32,
    ) {
        // Leaf depths count from 1 at chapter level.
        let leaf_depth = depth + 1;
        let file = match cfg.leaf_level {
            LeafLevel::Single => match self.single_file {
                Some(f) => f,
                None => {
                    let f = self.new_file(names, &cfg.single_filename);
                    self.single_file = Some(f);
                    f
                }
            },
            LeafLevel::Depth(n) if leaf_depth as u32 > n => {
                // Too deep to start a file; share the parent's.
                let parent = self.sections[sect.0]
                    .parent
                    .expect("sections below the leaf threshold have parents");
                self.sections[parent.0].file
            }
            _ => {
                let raw_name = match self.sections[sect.0].kind {
                    SectionKind::Top => cfg.contents_filename.clone(),
                    SectionKind::Index => cfg.index_filename.clone(),
                    SectionKind::Normal => {
                        let title = self.sections[sect.0]
                            .title
                            .expect("normal sections have heading paragraphs");
                        format_template(doc.para(title), &cfg.template_filename)
                    }
                };
                self.new_file(names, &raw_name)
            }
        };
        self.sections[sect.0].file = file;

        let f = &mut self.files[file.0];
        if f.min_heading_depth > depth {
            f.min_heading_depth = depth;
            f.first = Some(sect);
        }
        if f.min_heading_depth == depth {
            f.last = Some(sect);
        }
    }
}

/// Build the section tree and file assignment for `doc`.
///
/// `with_index` adds the synthetic index section (and its file) after
/// everything else.
pub fn partition(
    doc: &Document,
    cfg: &Config,
    names: &mut NameRegistry,
    with_index: bool,
) -> Partition {
    let mut part = Partition {
        sections: Vec::new(),
        order: Vec::new(),
        files: Vec::new(),
        para_sections: HashMap::new(),
        top: SectionId(0),
        index_file: None,
        single_file: None,
    };

    // The top section's body starts at the very first paragraph; the
    // body loop skips the title and stops at the first real heading, so
    // this renders exactly the preamble, wherever the title sits.
    let preamble = doc.iter().next().map(|(id, _)| id);
    let top = part.new_section(
        Section {
            kind: SectionKind::Top,
            title: None,
            text: preamble,
            parent: None,
            file: FileId(0),
            contents_depth: cfg.contents_depth(0),
            fragments: vec![None; cfg.template_fragments.len()],
        },
        true,
    );
    part.top = top;
    part.assign_file(cfg, names, doc, top, -1);

    for (pid, p) in doc.iter() {
        if !p.kind.is_heading() {
            continue;
        }
        if p.kind == ParaKind::Title {
            part.sections[top.0].title = Some(pid);
            continue;
        }
        let depth = p.kind.heading_depth();
        // A section one level down shows contents_depth(d+1) levels
        // counting itself, so its own subtree allowance is that minus its
        // absolute level.
        let contents_depth = cfg
            .contents_depth((depth + 1) as u32)
            .saturating_sub((depth + 1) as u32);
        let parent = p
            .parent
            .and_then(|q| part.para_sections.get(&q).copied())
            .unwrap_or(top);
        let sect = part.new_section(
            Section {
                kind: SectionKind::Normal,
                title: Some(pid),
                text: doc.next(pid).filter(|&n| !doc.para(n).kind.is_heading()),
                parent: Some(parent),
                file: FileId(0),
                contents_depth,
                fragments: vec![None; cfg.template_fragments.len()],
            },
            true,
        );
        part.para_sections.insert(pid, sect);
        part.assign_file(cfg, names, doc, sect, depth);

        let file = part.sections[sect.0].file;
        for i in 0..cfg.template_fragments.len() {
            let raw = format_template(doc.para(pid), &cfg.template_fragments[i]);
            let frag = names.sanitise_fragment(file, &raw);
            part.sections[sect.0].fragments[i] = Some(frag);
        }
    }

    if with_index {
        let sect = part.new_section(
            Section {
                kind: SectionKind::Index,
                title: None,
                text: None,
                parent: Some(top),
                file: FileId(0),
                contents_depth: 0,
                fragments: vec![None; cfg.template_fragments.len().max(1)],
            },
            true,
        );
        part.assign_file(cfg, names, doc, sect, 0);
        let file = part.sections[sect.0].file;
        let frag = names.sanitise_fragment(file, &cfg.index_text);
        part.sections[sect.0].fragments[0] = Some(frag);
        part.index_file = Some(file);
    }

    part
}

/// Sections created after partitioning, as link targets for non-heading
/// keyword paragraphs. They live in their parent's file and are not part
/// of the presentation order.
pub(crate) fn add_target_section(
    part: &mut Partition,
    para: ParaId,
    parent: SectionId,
    fragment: String,
) -> SectionId {
    let file = part.sections[parent.0].file;
    let mut fragments = vec![None; part.sections[parent.0].fragments.len().max(1)];
    fragments[0] = Some(fragment);
    let sect = part.new_section(
        Section {
            kind: SectionKind::Normal,
            title: Some(para),
            text: None,
            parent: Some(parent),
            file,
            contents_depth: 0,
            fragments,
        },
        false,
    );
    part.para_sections.insert(para, sect);
    sect
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Report;

    fn two_chapter_doc() -> Document {
        let mut doc = Document::new();
        doc.add_title("The Manual");
        let c1 = doc.add_chapter("Chapter 1", "1", "Intro");
        doc.add_normal(Some(c1), "Welcome.");
        let c2 = doc.add_chapter("Chapter 2", "2", "Setup");
        doc.add_normal(Some(c2), "Install it.");
        let h = doc.add_heading(ParaKind::Heading, Some(c2), "Section 2.1", "2.1", "Details");
        doc.add_normal(Some(h), "More.");
        doc
    }

    #[test]
    fn leaf_depth_one_splits_at_chapters() {
        let doc = two_chapter_doc();
        let mut cfg = Config::default();
        let mut report = Report::new();
        cfg.apply("leaf-level", &["1"], &mut report);
        let mut names = NameRegistry::new();
        let part = partition(&doc, &cfg, &mut names, false);

        let filenames: Vec<&str> = part.files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(filenames, vec!["Contents.html", "Intro.html", "Setup.html"]);
        // The depth-1 heading shares its chapter's file.
        let heading_sect = part.order[3];
        assert_eq!(part.section(heading_sect).file, FileId(2));
    }

    #[test]
    fn single_file_mode_uses_one_file() {
        let doc = two_chapter_doc();
        let mut cfg = Config::default();
        cfg.leaf_level = LeafLevel::Single;
        let mut names = NameRegistry::new();
        let part = partition(&doc, &cfg, &mut names, false);
        assert_eq!(part.files.len(), 1);
        assert_eq!(part.file(FileId(0)).filename, "Manual.html");
        assert!(part.sections.iter().all(|s| s.file == FileId(0)));
    }

    #[test]
    fn infinite_leaf_level_gives_every_section_a_file() {
        let doc = two_chapter_doc();
        let mut cfg = Config::default();
        cfg.leaf_level = LeafLevel::Infinite;
        let mut names = NameRegistry::new();
        let part = partition(&doc, &cfg, &mut names, false);
        // Top, two chapters, one heading.
        assert_eq!(part.files.len(), 4);
        assert_eq!(part.file(FileId(3)).filename, "Details.html");
    }

    #[test]
    fn duplicate_chapter_titles_get_distinct_files() {
        let mut doc = Document::new();
        doc.add_title("T");
        doc.add_chapter("Chapter 1", "1", "Notes");
        doc.add_chapter("Chapter 2", "2", "Notes");
        let cfg = Config::default();
        let mut names = NameRegistry::new();
        let part = partition(&doc, &cfg, &mut names, false);
        let filenames: Vec<&str> = part.files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(
            filenames,
            vec!["Contents.html", "Notes.html", "Notes-2.html"]
        );
    }

    #[test]
    fn index_section_comes_last() {
        let doc = two_chapter_doc();
        let cfg = Config::default();
        let mut names = NameRegistry::new();
        let part = partition(&doc, &cfg, &mut names, true);
        let last = *part.order.last().unwrap();
        assert_eq!(part.section(last).kind, SectionKind::Index);
        let idx_file = part.index_file.unwrap();
        assert_eq!(part.file(idx_file).filename, "IndexPage.html");
        assert_eq!(part.section(last).fragments[0].as_deref(), Some("Index"));
    }

    #[test]
    fn file_tracks_shallowest_section_range() {
        let doc = two_chapter_doc();
        let mut cfg = Config::default();
        let mut report = Report::new();
        cfg.apply("leaf-level", &["1"], &mut report);
        let mut names = NameRegistry::new();
        let part = partition(&doc, &cfg, &mut names, false);

        let setup_file = part.file(FileId(2));
        assert_eq!(setup_file.min_heading_depth, 0);
        // Both endpoints are the Setup chapter itself; the nested heading
        // is deeper and does not extend the range.
        assert_eq!(setup_file.first, setup_file.last);
        let first = setup_file.first.unwrap();
        let title = part.section(first).title.unwrap();
        assert_eq!(doc.para(title).words[0].text, "Setup");
    }

    #[test]
    fn preamble_becomes_top_section_body() {
        let mut doc = Document::new();
        doc.add_normal(None, "Preamble text.");
        doc.add_title("T");
        doc.add_chapter("Chapter 1", "1", "One");
        let cfg = Config::default();
        let mut names = NameRegistry::new();
        let part = partition(&doc, &cfg, &mut names, false);
        assert_eq!(part.section(part.top).text, Some(ParaId(0)));
        assert_eq!(part.section(part.top).title, Some(ParaId(1)));
    }

    #[test]
    fn top_section_body_starts_at_first_paragraph_even_after_title() {
        let mut doc = Document::new();
        doc.add_title("T");
        doc.add_normal(None, "Preamble after the title.");
        doc.add_chapter("Chapter 1", "1", "One");
        let cfg = Config::default();
        let mut names = NameRegistry::new();
        let part = partition(&doc, &cfg, &mut names, false);
        // The body walk starts at the title and skips over it.
        assert_eq!(part.section(part.top).text, Some(ParaId(0)));
        assert_eq!(part.section(part.top).title, Some(ParaId(0)));
    }

    #[test]
    fn leaf_file_detection() {
        let doc = two_chapter_doc();
        let mut cfg = Config::default();
        let mut report = Report::new();
        cfg.apply("leaf-level", &["1"], &mut report);
        let mut names = NameRegistry::new();
        let part = partition(&doc, &cfg, &mut names, false);
        // Chapter files are leaves; the contents file has every chapter's
        // ancestor chain passing through it.
        assert!(!part.is_leaf_file(FileId(0)));
        assert!(part.is_leaf_file(FileId(1)));
        assert!(part.is_leaf_file(FileId(2)));
    }
}
