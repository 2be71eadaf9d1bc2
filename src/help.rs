//! Compiled-help auxiliary files: the project file (`.hhp`), the sitemap
//! contents (`.hhc`) and the keyword index (`.hhk`).
//!
//! These share the page renderer's word machinery but write a legacy
//! dialect: hardwired windows-1252 bytes, uppercase sitemap markup, and
//! titles truncated to 255 characters. A good unofficial reference for
//! the formats is <http://chmspec.nongnu.org/>.

use std::collections::HashSet;

use crate::config::HtmlVersion;
use crate::output::{Charset, HtmlOutput};
use crate::render::page::{NOTHING, Renderer};
use crate::render::partition::{FileId, SectionKind};

/// Navigation pane properties for the main help window (HHWIN_PROP_*).
const WINDOW_PROPERTIES: &str = "0x62520";
/// Toolbar buttons for the main help window (HHWIN_BUTTON_*). Of the two
/// pairs of Next/Previous bits, only 21/22 actually work, so those are
/// the ones set here.
const WINDOW_TOOLBAR: &str = "0x70304e";

const SITEMAP_HEADER: &str = "<!DOCTYPE HTML PUBLIC \"-//IETF//DTD HTML//EN\">\n\
                              <HTML><HEAD>\n\
                              <META HTTP-EQUIV=\"Content-Type\" \
                              CONTENT=\"text/html; charset=";
const SITEMAP_FOOTER: &str = "</UL></BODY></HTML>\n";
const TITLE_LIMIT: usize = 255;

fn sitemap_output() -> HtmlOutput {
    // Help viewers read these files as windows-1252 regardless of any
    // declared charset.
    HtmlOutput::new(
        Charset::WINDOWS_1252,
        Charset::WINDOWS_1252,
        HtmlVersion::Html4,
    )
}

impl Renderer<'_> {
    /// The `.hhp` project file.
    pub(crate) fn help_project(&mut self, hhk_needed: bool) -> Vec<u8> {
        let cfg = self.cfg;
        let part = self.part;
        let doc = self.doc;
        let mut ho = sitemap_output();
        ho.raw_specials = true;

        ho.raw(
            "[OPTIONS]\n\
             Binary TOC=Yes\n\
             Compatibility=1.1 or later\n\
             Compiled file=",
        );
        ho.raw(cfg.help_archive.as_deref().unwrap_or("output.chm"));
        ho.raw(
            "\n\
             Default Window=main\n\
             Default topic=",
        );
        ho.raw(&part.file(FileId(0)).filename);
        ho.raw(
            "\n\
             Display compile progress=Yes\n\
             Full-text search=Yes\n\
             Title=",
        );
        ho.set_text_limit(Some(TITLE_LIMIT));
        if let Some(tp) = part.section(part.top).title {
            self.words(&mut ho, &doc.para(tp).words, NOTHING, None, None);
        }
        ho.set_text_limit(None);
        ho.raw("\n");

        // Not needed by the compiler, but the GUI workshop misbehaves
        // without them.
        if let Some(hhc) = &cfg.help_contents {
            ho.raw("Contents file=");
            ho.raw(hhc);
            ho.raw("\n");
        }
        if hhk_needed
            && let Some(hhk) = &cfg.help_index
        {
            ho.raw("Index file=");
            ho.raw(hhk);
            ho.raw("\n");
        }

        ho.raw("\n[WINDOWS]\nmain=\"");
        ho.single_quotes_only = true;
        ho.set_text_limit(Some(TITLE_LIMIT));
        if let Some(tp) = part.section(part.top).title {
            self.words(&mut ho, &doc.para(tp).words, NOTHING, None, None);
        }
        ho.set_text_limit(None);
        ho.single_quotes_only = false;
        ho.raw("\",\"");
        if let Some(hhc) = &cfg.help_contents {
            ho.raw(hhc);
        }
        ho.raw("\",\"");
        if hhk_needed
            && let Some(hhk) = &cfg.help_index
        {
            ho.raw(hhk);
        }
        ho.raw("\",\"");
        ho.raw(&part.file(FileId(0)).filename);
        ho.raw("\",,,,,,");
        ho.raw(WINDOW_PROPERTIES);
        ho.raw(",,");
        ho.raw(WINDOW_TOOLBAR);
        ho.raw(",,,,,,,,0\n");

        // Also informational only; the compiler chases links itself.
        ho.raw("\n[FILES]\n");
        for f in &part.files {
            ho.raw(&f.filename);
            ho.raw("\n");
        }

        ho.finish()
    }

    /// The `.hhc` sitemap contents: one entry per output file, nested by
    /// each file's depth in the section tree.
    pub(crate) fn help_contents(&mut self) -> Vec<u8> {
        let cfg = self.cfg;
        let part = self.part;
        let doc = self.doc;
        let mut ho = sitemap_output();
        ho.escape_quotes = true;

        ho.raw(SITEMAP_HEADER);
        ho.raw(cfg.output_charset.mime_name());
        ho.raw("\">\n</HEAD><BODY><UL>\n");

        let mut currdepth = 0;
        for fid in part.file_ids() {
            let f = part.file(fid);

            // Contents depth of the file: ancestors of its shallowest
            // section, not counting the top section.
            let mut depth = 0;
            if let Some(first) = f.first {
                let mut cur = part.section(first).parent;
                while let Some(s) = cur {
                    if part.section(s).kind == SectionKind::Top {
                        break;
                    }
                    depth += 1;
                    cur = part.section(s).parent;
                }
            }

            // The top file is not treated as the parent of the chapter
            // files, so it always counts as a leaf.
            let leaf = match f.first {
                Some(first) if part.section(first).kind != SectionKind::Top => {
                    part.is_leaf_file(fid)
                }
                _ => true,
            };

            while currdepth < depth {
                ho.raw("<UL>\n");
                currdepth += 1;
            }
            while currdepth > depth {
                ho.raw("</UL>\n");
                currdepth -= 1;
            }

            ho.raw("<LI><OBJECT TYPE=\"text/sitemap\"><PARAM NAME=\"Name\" VALUE=\"");
            ho.set_text_limit(Some(TITLE_LIMIT));
            match f.first {
                Some(first) if part.section(first).title.is_some() => {
                    let tp = part.section(first).title.expect("checked above");
                    self.words(&mut ho, &doc.para(tp).words, NOTHING, None, None);
                }
                Some(first) if part.section(first).kind == SectionKind::Index => {
                    ho.text(&cfg.index_text);
                }
                _ => {}
            }
            ho.set_text_limit(None);
            ho.raw("\"><PARAM NAME=\"Local\" VALUE=\"");
            ho.raw(&f.filename);
            ho.raw("\"><PARAM NAME=\"ImageNumber\" VALUE=\"");
            ho.raw(if leaf { "11" } else { "1" });
            ho.raw("\"></OBJECT>\n");
        }
        while currdepth > 0 {
            ho.raw("</UL>\n");
            currdepth -= 1;
        }
        ho.raw(SITEMAP_FOOTER);

        ho.finish()
    }

    /// The `.hhk` keyword index: one entry per index term with at least
    /// one citation, each citing file listed once.
    pub(crate) fn help_keyword_index(&mut self) -> Vec<u8> {
        let cfg = self.cfg;
        let index = self.index;
        let mut ho = sitemap_output();
        ho.escape_quotes = true;

        ho.raw(SITEMAP_HEADER);
        ho.raw(cfg.output_charset.mime_name());
        ho.raw("\">\n</HEAD><BODY><UL>\n");

        for (i, entry) in index.entries().iter().enumerate() {
            let refs = self.resolved.entry_refs[i].clone();
            if refs.is_empty() {
                continue;
            }

            ho.raw("<LI><OBJECT TYPE=\"text/sitemap\">\n<PARAM NAME=\"Name\" VALUE=\"");
            ho.set_text_limit(Some(TITLE_LIMIT));
            self.words(&mut ho, &entry.text, NOTHING, None, None);
            ho.set_text_limit(None);
            ho.raw("\">\n");

            let mut listed: HashSet<FileId> = HashSet::new();
            for key in &refs {
                let section = {
                    let slot = self
                        .resolved
                        .slots
                        .get_mut(key)
                        .expect("entry refs only name resolved slots");
                    slot.referenced = true;
                    slot.section
                };
                let file = self.part.section(section).file;
                if listed.insert(file) {
                    ho.raw("<PARAM NAME=\"Local\" VALUE=\"");
                    ho.raw(&self.part.file(file).filename);
                    ho.raw("\">\n");
                }
            }
            ho.raw("</OBJECT>\n");
        }
        ho.raw(SITEMAP_FOOTER);

        ho.finish()
    }
}
