//! Link-target resolution.
//!
//! Two passes over the document fix every anchor name before any page is
//! rendered. The first gives each non-heading cross-reference target its
//! own fragment (`p0`, `p1`, ... per file) and a synthetic section to hang
//! links off. The second numbers index citations (`i0`, `i1`, ... per
//! file) and records which index entries each citation feeds.
//!
//! Every slot carries `generated` and `referenced` flags, set during page
//! rendering; a finished render must have produced an anchor for exactly
//! the citations the index pages point at.

use std::collections::HashMap;

use crate::doc::{Document, IndexTable, KeywordTable, ParaId, ParaKind, WordKind};
use crate::render::names::NameRegistry;
use crate::render::partition::{Partition, SectionId, add_target_section};

/// Resolved anchor for one index citation, identified by its paragraph
/// and top-level word position.
#[derive(Debug)]
pub struct IndexRefSlot {
    /// Section whose page carries the anchor.
    pub section: SectionId,
    pub fragment: String,
    /// An anchor was emitted at the citation site.
    pub generated: bool,
    /// An index page emitted a link to the anchor.
    pub referenced: bool,
}

pub type SlotKey = (ParaId, usize);

#[derive(Debug, Default)]
pub struct Resolved {
    pub slots: HashMap<SlotKey, IndexRefSlot>,
    /// For each index entry, the citations that mention it, in document
    /// order.
    pub entry_refs: Vec<Vec<SlotKey>>,
}

impl Resolved {
    /// Every anchor the index references was generated, and vice versa.
    pub fn is_consistent(&self) -> bool {
        self.slots.values().all(|s| s.generated == s.referenced)
    }

    pub fn any_references(&self) -> bool {
        self.entry_refs.iter().any(|refs| !refs.is_empty())
    }
}

pub fn resolve(
    doc: &Document,
    keywords: &KeywordTable,
    index: &IndexTable,
    part: &mut Partition,
    names: &mut NameRegistry,
) -> Resolved {
    // Pass 1: fragments for cross-reference targets that are not
    // headings (list items, described things, bibliography citations).
    // Iteration order is the keyword table's, which is deterministic.
    for (_, pid) in keywords.iter() {
        let p = doc.para(pid);
        if p.kind.is_heading() {
            continue;
        }
        let parent = p
            .parent
            .and_then(|q| part.para_sections.get(&q).copied())
            .unwrap_or(part.top);
        let file = part.section(parent).file;
        let n = {
            let f = &mut part.files[file.0];
            let n = f.fragment_counter;
            f.fragment_counter += 1;
            n
        };
        let fragment = names.sanitise_fragment(file, &format!("p{n}"));
        add_target_section(part, pid, parent, fragment);
    }

    // The two numbering sequences are independent.
    for f in &mut part.files {
        f.fragment_counter = 0;
    }

    // Pass 2: fragments for index citations, attributed to the most
    // recent heading's section.
    let mut resolved = Resolved {
        slots: HashMap::new(),
        entry_refs: vec![Vec::new(); index.entries().len()],
    };
    let mut last_sect = part.top;
    for (pid, p) in doc.iter() {
        if p.kind.is_heading()
            && p.kind != ParaKind::Title
            && let Some(&sect) = part.para_sections.get(&pid)
        {
            last_sect = sect;
        }
        for (i, w) in p.words.iter().enumerate() {
            if w.kind != WordKind::IndexRef {
                continue;
            }
            let file = part.section(last_sect).file;
            let n = {
                let f = &mut part.files[file.0];
                let n = f.fragment_counter;
                f.fragment_counter += 1;
                n
            };
            let fragment = names.sanitise_fragment(file, &format!("i{n}"));
            resolved.slots.insert(
                (pid, i),
                IndexRefSlot {
                    section: last_sect,
                    fragment,
                    generated: false,
                    referenced: false,
                },
            );
            for &entry in index.entries_for_tag(&w.text) {
                resolved.entry_refs[entry].push((pid, i));
            }
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::doc::Word;
    use crate::render::partition::partition;

    fn resolve_doc(
        doc: &Document,
        keywords: &KeywordTable,
        index: &IndexTable,
    ) -> (Partition, Resolved) {
        let cfg = Config::default();
        let mut names = NameRegistry::new();
        let mut part = partition(doc, &cfg, &mut names, index.has_entries());
        let resolved = resolve(doc, keywords, index, &mut part, &mut names);
        (part, resolved)
    }

    #[test]
    fn non_heading_targets_get_numbered_fragments() {
        let mut doc = Document::new();
        doc.add_title("T");
        let ch = doc.add_chapter("Chapter 1", "1", "Refs");
        let b1 = doc.add_para(ParaKind::Bullet, Some(ch), Word::plain("first"));
        let b2 = doc.add_para(ParaKind::Bullet, Some(ch), Word::plain("second"));
        let mut keywords = KeywordTable::new();
        keywords.insert("item-one", b1);
        keywords.insert("item-two", b2);

        let (part, _) = resolve_doc(&doc, &keywords, &IndexTable::new());
        let s1 = part.para_sections[&b1];
        let s2 = part.para_sections[&b2];
        assert_eq!(part.section(s1).fragments[0].as_deref(), Some("p0"));
        assert_eq!(part.section(s2).fragments[0].as_deref(), Some("p1"));
        // Both live in the chapter's file, off the presentation order.
        let ch_sect = part.para_sections[&ch];
        assert_eq!(part.section(s1).file, part.section(ch_sect).file);
        assert!(!part.order.contains(&s1));
    }

    #[test]
    fn citation_numbering_restarts_per_file() {
        let mut doc = Document::new();
        doc.add_title("T");
        let c1 = doc.add_chapter("Chapter 1", "1", "One");
        doc.add_para(
            ParaKind::Normal,
            Some(c1),
            vec![Word::text("x"), Word::index_ref("alpha")],
        );
        let c2 = doc.add_chapter("Chapter 2", "2", "Two");
        doc.add_para(
            ParaKind::Normal,
            Some(c2),
            vec![Word::index_ref("alpha"), Word::index_ref("beta")],
        );
        let mut index = IndexTable::new();
        index.add_term("alpha");
        index.add_term("beta");

        let (part, resolved) = resolve_doc(&doc, &KeywordTable::new(), &index);
        let frags: Vec<(&str, &str)> = resolved
            .slots
            .values()
            .map(|s| {
                (
                    part.file(part.section(s.section).file).filename.as_str(),
                    s.fragment.as_str(),
                )
            })
            .collect();
        assert!(frags.contains(&("One.html", "i0")));
        assert!(frags.contains(&("Two.html", "i0")));
        assert!(frags.contains(&("Two.html", "i1")));
    }

    #[test]
    fn entry_refs_follow_document_order() {
        let mut doc = Document::new();
        doc.add_title("T");
        let ch = doc.add_chapter("Chapter 1", "1", "One");
        let p1 = doc.add_para(ParaKind::Normal, Some(ch), vec![Word::index_ref("alpha")]);
        let p2 = doc.add_para(ParaKind::Normal, Some(ch), vec![Word::index_ref("alpha")]);
        let mut index = IndexTable::new();
        index.add_term("alpha");

        let (_, resolved) = resolve_doc(&doc, &KeywordTable::new(), &index);
        assert_eq!(resolved.entry_refs[0], vec![(p1, 0), (p2, 0)]);
        assert!(resolved.any_references());
    }

    #[test]
    fn unknown_tags_resolve_to_no_entries() {
        let mut doc = Document::new();
        doc.add_title("T");
        let ch = doc.add_chapter("Chapter 1", "1", "One");
        doc.add_para(ParaKind::Normal, Some(ch), vec![Word::index_ref("ghost")]);
        let mut index = IndexTable::new();
        index.add_term("real");

        let (_, resolved) = resolve_doc(&doc, &KeywordTable::new(), &index);
        // The citation still gets a slot, but feeds nothing.
        assert_eq!(resolved.slots.len(), 1);
        assert!(resolved.entry_refs[0].is_empty());
        assert!(!resolved.any_references());
    }
}
