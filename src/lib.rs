//! # halyard
//!
//! A multi-file HTML and compiled-help (CHM) rendering backend for
//! structured documents.
//!
//! ## Features
//!
//! - Splits a heading tree into linked HTML files at a configurable depth
//! - Stable cross-reference and index anchors, resolved before rendering
//! - Generated contents pages, navigation bars and index pages
//! - HTML 3.2/4/ISO/XHTML dialects with any WHATWG output charset
//! - HTML Help project, contents and keyword-index (`.hhp`/`.hhc`/`.hhk`)
//!   output, packaged loose or into a ZIP archive
//!
//! ## Quick Start
//!
//! ```no_run
//! use halyard::{Config, DiskFiles, Document, IndexTable, KeywordTable, Report};
//!
//! let mut doc = Document::new();
//! doc.add_title("The Manual");
//! let ch = doc.add_chapter("Chapter 1", "1", "Introduction");
//! doc.add_normal(Some(ch), "Welcome to the manual.");
//!
//! let cfg = Config::default();
//! let mut out = DiskFiles::new("build/html");
//! let mut report = Report::new();
//! halyard::render_html(
//!     &doc,
//!     &KeywordTable::new(),
//!     &IndexTable::new(),
//!     &cfg,
//!     &mut out,
//!     &mut report,
//! )
//! .unwrap();
//! for message in report.messages() {
//!     eprintln!("{message}");
//! }
//! ```
//!
//! ## Output destinations
//!
//! Rendering writes named files through the [`FileSet`] trait:
//! [`DiskFiles`] for a directory of loose files, [`MemoryFiles`] for an
//! in-memory map, and [`ArchiveFiles`] for a ZIP archive (used by
//! [`render_help_archive`]).

pub mod config;
pub mod doc;
pub mod error;
pub(crate) mod help;
pub mod output;
pub mod render;

pub use config::{Config, HtmlVersion, LeafLevel, LevelNumbering};
pub use doc::{
    Document, IndexTable, KeywordTable, ParaId, ParaKind, Paragraph, QuoteSide, RunPos, SpanStyle,
    Word, WordKind,
};
pub use error::{Error, Report, Result};
pub use output::Charset;
pub use output::files::{ArchiveFiles, DiskFiles, FileSet, MemoryFiles};
pub use render::{render_help, render_help_archive, render_html};
