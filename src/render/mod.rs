//! The rendering pipeline.
//!
//! A render pass is: partition the document into sections and files,
//! resolve every link target, render each file's page, then emit any
//! compiled-help auxiliary files. Output lands in a caller-supplied
//! [`FileSet`]; an unwritable file is reported and skipped rather than
//! aborting the pass.

pub mod names;
pub mod page;
pub mod partition;
pub mod resolve;

use std::io::{Seek, Write};

use crate::config::Config;
use crate::doc::{Document, IndexTable, KeywordTable};
use crate::error::{Error, Report, Result};
use crate::output::files::{ArchiveFiles, FileSet};
use crate::render::names::NameRegistry;
use crate::render::page::Renderer;
use crate::render::partition::{FileId, partition};
use crate::render::resolve::resolve;

/// Render `doc` as a set of HTML files.
pub fn render_html(
    doc: &Document,
    keywords: &KeywordTable,
    index: &IndexTable,
    cfg: &Config,
    out: &mut dyn FileSet,
    report: &mut Report,
) -> Result<()> {
    render_common(doc, keywords, index, cfg, out, report, false)
}

/// Render `doc` as compiled-help input: HTML pages plus the project,
/// contents and keyword-index files.
pub fn render_help(
    doc: &Document,
    keywords: &KeywordTable,
    index: &IndexTable,
    cfg: &Config,
    out: &mut dyn FileSet,
    report: &mut Report,
) -> Result<()> {
    render_common(doc, keywords, index, cfg, out, report, true)
}

/// Like [`render_help`], but packaging the output set into a ZIP archive
/// written to `writer`.
pub fn render_help_archive<W: Write + Seek>(
    doc: &Document,
    keywords: &KeywordTable,
    index: &IndexTable,
    cfg: &Config,
    writer: W,
    report: &mut Report,
) -> Result<W> {
    let mut files = ArchiveFiles::new(writer);
    render_common(doc, keywords, index, cfg, &mut files, report, true)?;
    files.finish()
}

fn render_common(
    doc: &Document,
    keywords: &KeywordTable,
    index: &IndexTable,
    cfg: &Config,
    out: &mut dyn FileSet,
    report: &mut Report,
    help_mode: bool,
) -> Result<()> {
    let mut cfg = cfg.clone();
    cfg.validate(report, help_mode);

    let mut names = NameRegistry::new();
    // A generated index page is only wanted when no keyword-index file
    // takes its place.
    let with_index_page = index.has_entries() && cfg.help_index.is_none();
    let mut part = partition(doc, &cfg, &mut names, with_index_page);
    let mut resolved = resolve(doc, keywords, index, &mut part, &mut names);

    let mut renderer = Renderer::new(doc, keywords, index, &cfg, &part, &mut resolved);

    let mut prev = None;
    for i in 0..part.files.len() {
        let fid = FileId(i);
        let bytes = renderer.render_file(fid, prev);
        write_output(out, &part.file(fid).filename, &bytes, report)?;
        prev = Some(fid);
    }

    // The keyword index is omitted when no term has any citations.
    let hhk_needed = cfg.help_index.is_some() && renderer.resolved.any_references();

    if let Some(name) = cfg.help_project.clone() {
        let bytes = renderer.help_project(hhk_needed);
        write_output(out, &name, &bytes, report)?;
    }
    if let Some(name) = cfg.help_contents.clone() {
        let bytes = renderer.help_contents();
        write_output(out, &name, &bytes, report)?;
    }
    if hhk_needed
        && let Some(name) = cfg.help_index.clone()
    {
        let bytes = renderer.help_keyword_index();
        write_output(out, &name, &bytes, report)?;
    }

    if help_mode {
        for (disk, arcname) in &cfg.extra_files {
            match std::fs::read(disk) {
                Ok(data) => write_output(out, arcname, &data, report)?,
                Err(e) => report.cant_read(disk, &e),
            }
        }
    }

    debug_assert!(
        renderer.resolved.is_consistent(),
        "index anchors out of step with index references"
    );
    Ok(())
}

/// Hand one finished file to the sink. I/O failures degrade to a report
/// entry so the rest of the output set is still produced.
fn write_output(
    out: &mut dyn FileSet,
    name: &str,
    data: &[u8],
    report: &mut Report,
) -> Result<()> {
    match out.add(name, data) {
        Ok(()) => Ok(()),
        Err(Error::Io(e)) => {
            report.cant_write(name, &e);
            Ok(())
        }
        Err(other) => Err(other),
    }
}
