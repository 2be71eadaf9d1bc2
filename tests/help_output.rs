//! Compiled-help output tests.
//!
//! Checks the project (.hhp), sitemap contents (.hhc) and keyword index
//! (.hhk) files, plus ZIP packaging of the whole output set.

use std::io::Cursor;

use halyard::{
    Config, Document, IndexTable, KeywordTable, MemoryFiles, ParaKind, Report, Word, render_help,
    render_help_archive,
};

// ============================================================================
// Helpers
// ============================================================================

fn help_manual() -> (Document, KeywordTable, IndexTable) {
    let mut doc = Document::new();
    doc.add_title("The Manual");
    let c1 = doc.add_chapter("Chapter 1", "1", "One");
    doc.add_para(
        ParaKind::Normal,
        Some(c1),
        vec![
            Word::text("widgets"),
            Word::index_ref("widgets"),
            Word::text("here"),
            Word::index_ref("widgets"),
        ],
    );
    let h = doc.add_heading(ParaKind::Heading, Some(c1), "Section 1.1", "1.1", "Sub");
    doc.add_normal(Some(h), "Nested text.");
    let c2 = doc.add_chapter("Chapter 2", "2", "Two");
    doc.add_para(
        ParaKind::Normal,
        Some(c2),
        vec![Word::text("more"), Word::index_ref("widgets")],
    );
    let mut index = IndexTable::new();
    index.add_term("widgets");
    (doc, KeywordTable::new(), index)
}

fn render(doc: &Document, keywords: &KeywordTable, index: &IndexTable, cfg: &Config) -> MemoryFiles {
    let mut out = MemoryFiles::new();
    let mut report = Report::new();
    render_help(doc, keywords, index, cfg, &mut out, &mut report).unwrap();
    assert!(report.is_empty(), "unexpected diagnostics: {:?}", report.messages());
    out
}

// ============================================================================
// Output set
// ============================================================================

#[test]
fn test_help_output_set() {
    let (doc, keywords, index) = help_manual();
    let out = render(&doc, &keywords, &index, &Config::help());
    let names: Vec<&str> = out.names().collect();

    // One HTML file per section plus the two sitemap files. The keyword
    // index supplants the generated index page.
    assert!(names.contains(&"Contents.html"));
    assert!(names.contains(&"One.html"));
    assert!(names.contains(&"Sub.html"));
    assert!(names.contains(&"Two.html"));
    assert!(names.contains(&"contents.hhc"));
    assert!(names.contains(&"index.hhk"));
    assert!(!names.contains(&"IndexPage.html"));

    // Help defaults: no nav bar, no address footer.
    let one = out.get_str("One.html").unwrap();
    assert!(!one.contains("Previous"));
    assert!(!one.contains("<address>"));
}

#[test]
fn test_project_file() {
    let (doc, keywords, index) = help_manual();
    let mut cfg = Config::help();
    cfg.help_project = Some("project.hhp".to_string());
    let out = render(&doc, &keywords, &index, &cfg);

    let hhp = out.get_str("project.hhp").unwrap();
    assert!(hhp.starts_with("[OPTIONS]\nBinary TOC=Yes\n"));
    assert!(hhp.contains("Compiled file=output.chm\n"));
    assert!(hhp.contains("Default topic=Contents.html\n"));
    assert!(hhp.contains("Title=The Manual\n"));
    assert!(hhp.contains("Contents file=contents.hhc\n"));
    assert!(hhp.contains("Index file=index.hhk\n"));
    assert!(hhp.contains(
        "[WINDOWS]\nmain=\"The Manual\",\"contents.hhc\",\"index.hhk\",\"Contents.html\""
    ));
    assert!(hhp.contains(",,,,,,0x62520,,0x70304e,,,,,,,,0\n"));
    // Every output page is listed.
    assert!(hhp.contains("[FILES]\n"));
    for name in ["Contents.html", "One.html", "Sub.html", "Two.html"] {
        assert!(hhp.contains(&format!("{name}\n")), "missing {name}");
    }
}

#[test]
fn test_project_window_title_drops_double_quotes() {
    let mut doc = Document::new();
    doc.add_title("The \"Big\" Manual");
    let c1 = doc.add_chapter("Chapter 1", "1", "One");
    doc.add_normal(Some(c1), "text");

    let mut cfg = Config::help();
    cfg.help_project = Some("project.hhp".to_string());
    let out = render(&doc, &KeywordTable::new(), &IndexTable::new(), &cfg);
    let hhp = out.get_str("project.hhp").unwrap();
    // The quoted window-title field cannot contain double quotes.
    assert!(hhp.contains("main=\"The 'Big' Manual\","));
    // The plain Title= field keeps them.
    assert!(hhp.contains("Title=The \"Big\" Manual\n"));
}

// ============================================================================
// Sitemap contents
// ============================================================================

#[test]
fn test_contents_sitemap_nesting_and_icons() {
    let (doc, keywords, index) = help_manual();
    let out = render(&doc, &keywords, &index, &Config::help());
    let hhc = out.get_str("contents.hhc").unwrap();

    assert!(hhc.starts_with("<!DOCTYPE HTML PUBLIC \"-//IETF//DTD HTML//EN\">\n"));

    // The top file and the chapters sit at the same level; the
    // subsection file nests one deeper.
    let top = hhc.find("VALUE=\"The Manual\"").unwrap();
    let one = hhc.find("VALUE=\"One\"").unwrap();
    let sub = hhc.find("VALUE=\"Sub\"").unwrap();
    let two = hhc.find("VALUE=\"Two\"").unwrap();
    assert!(top < one && one < sub && sub < two);
    let nested_open = hhc[one..sub].matches("<UL>").count();
    let nested_close = hhc[sub..two].matches("</UL>").count();
    assert_eq!(nested_open, 1);
    assert_eq!(nested_close, 1);

    // Leaf pages get the page icon (11), branch pages the book icon (1).
    let one_entry = &hhc[one..sub];
    assert!(one_entry.contains("ImageNumber\" VALUE=\"1\""));
    let sub_entry = &hhc[sub..two];
    assert!(sub_entry.contains("ImageNumber\" VALUE=\"11\""));
    // The top file is always a leaf for sitemap purposes.
    assert!(hhc[top..one].contains("ImageNumber\" VALUE=\"11\""));

    assert!(hhc.contains("PARAM NAME=\"Local\" VALUE=\"Sub.html\""));
    assert!(hhc.ends_with("</UL></BODY></HTML>\n"));
}

#[test]
fn test_sitemap_titles_escape_double_quotes() {
    let mut doc = Document::new();
    doc.add_title("T");
    let c1 = doc.add_chapter("Chapter 1", "1", "Say \"hi\"");
    doc.add_normal(Some(c1), "text");

    let out = render(&doc, &KeywordTable::new(), &IndexTable::new(), &Config::help());
    let hhc = out.get_str("contents.hhc").unwrap();
    assert!(hhc.contains("VALUE=\"Say &quot;hi&quot;\""));
}

// ============================================================================
// Keyword index
// ============================================================================

#[test]
fn test_keyword_index_lists_each_file_once() {
    let (doc, keywords, index) = help_manual();
    let out = render(&doc, &keywords, &index, &Config::help());
    let hhk = out.get_str("index.hhk").unwrap();

    assert!(hhk.contains("<PARAM NAME=\"Name\" VALUE=\"widgets\">"));
    // Two citations in One.html collapse to a single Local entry.
    assert_eq!(hhk.matches("VALUE=\"One.html\"").count(), 1);
    assert_eq!(hhk.matches("VALUE=\"Two.html\"").count(), 1);
}

#[test]
fn test_keyword_index_omitted_without_citations() {
    let mut doc = Document::new();
    doc.add_title("T");
    let c1 = doc.add_chapter("Chapter 1", "1", "One");
    doc.add_normal(Some(c1), "no citations here");
    let mut index = IndexTable::new();
    index.add_term("orphan");

    let out = render(&doc, &KeywordTable::new(), &index, &Config::help());
    assert!(out.get("index.hhk").is_none());
    // The contents sitemap still appears.
    assert!(out.get("contents.hhc").is_some());
}

// ============================================================================
// Archive packaging
// ============================================================================

#[test]
fn test_help_archive_contains_output_set() {
    let (doc, keywords, index) = help_manual();
    let mut report = Report::new();
    let cursor = render_help_archive(
        &doc,
        &keywords,
        &index,
        &Config::help(),
        Cursor::new(Vec::new()),
        &mut report,
    )
    .unwrap();
    assert!(report.is_empty());

    let mut zip = zip::ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();
    let mut names: Vec<String> = (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "Contents.html",
            "One.html",
            "Sub.html",
            "Two.html",
            "contents.hhc",
            "index.hhk",
        ]
    );
}
