//! Rendering configuration.
//!
//! [`Config`] carries every knob the HTML and compiled-help renderers
//! consult: file partitioning, naming templates, navigation text, charset
//! and markup dialect, and the help-file names. Defaults match a plain
//! multi-file HTML manual; [`Config::help`] gives the compiled-help
//! variant. Options arrive as key/argument pairs via [`Config::apply`],
//! with unrecognised values reported and ignored.

use crate::error::Report;
use crate::output::Charset;

/// HTML dialect to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HtmlVersion {
    Html32,
    #[default]
    Html4,
    IsoHtml,
    Xhtml10Transitional,
    Xhtml10Strict,
}

impl HtmlVersion {
    pub fn from_label(label: &str) -> Option<HtmlVersion> {
        match label {
            "html3.2" => Some(HtmlVersion::Html32),
            "html4" => Some(HtmlVersion::Html4),
            "iso-html" => Some(HtmlVersion::IsoHtml),
            "xhtml1.0transitional" => Some(HtmlVersion::Xhtml10Transitional),
            "xhtml1.0strict" => Some(HtmlVersion::Xhtml10Strict),
            _ => None,
        }
    }

    pub fn is_xhtml(self) -> bool {
        matches!(
            self,
            HtmlVersion::Xhtml10Transitional | HtmlVersion::Xhtml10Strict
        )
    }

    pub fn doctype(self) -> &'static str {
        match self {
            HtmlVersion::Html32 => {
                "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 3.2 Final//EN\">"
            }
            HtmlVersion::Html4 => {
                "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 4.01//EN\"\n\
                 \"http://www.w3.org/TR/html4/strict.dtd\">"
            }
            HtmlVersion::IsoHtml => {
                "<!DOCTYPE HTML PUBLIC \"ISO/IEC 15445:2000//DTD HTML//EN\">"
            }
            HtmlVersion::Xhtml10Transitional => {
                "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\"\n\
                 \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\">"
            }
            HtmlVersion::Xhtml10Strict => {
                "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\"\n\
                 \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\">"
            }
        }
    }
}

/// How the document tree is cut into output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafLevel {
    /// Everything in one file.
    Single,
    /// Sections up to this depth start new files; deeper ones share their
    /// parent's file.
    Depth(u32),
    /// Every section starts a new file.
    Infinite,
}

impl LeafLevel {
    /// True when the threshold is a finite depth of at least `n`.
    /// Single-file and infinite leaf levels have no finite threshold, so
    /// the depth-gated extras (parent links, the nav-bar Up entry) stay
    /// off for both.
    pub fn at_least(self, n: u32) -> bool {
        match self {
            LeafLevel::Depth(d) => d >= n,
            LeafLevel::Single | LeafLevel::Infinite => false,
        }
    }
}

/// Numbering presentation for one heading depth.
#[derive(Debug, Clone)]
pub struct LevelNumbering {
    /// Show only the bare number, without the section-kind word.
    pub numbers_only: bool,
    /// Whether the number is shown at all.
    pub shown: bool,
    /// Text between the number and the title.
    pub suffix: String,
}

impl LevelNumbering {
    fn new(numbers_only: bool, shown: bool, suffix: &str) -> Self {
        LevelNumbering {
            numbers_only,
            shown,
            suffix: suffix.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Partitioning
    pub leaf_level: LeafLevel,
    pub leaf_contains_contents: bool,
    /// Minimum number of entries a leaf-file contents needs before it is
    /// worth emitting.
    pub leaf_smallest_contents: usize,
    /// Per-level overrides for how deep below a section its inline
    /// contents reaches; level N defaults to N+2.
    contents_depths: Vec<u32>,

    // Naming
    pub single_filename: String,
    pub contents_filename: String,
    pub index_filename: String,
    pub template_filename: String,
    pub template_fragments: Vec<String>,

    // Heading numbering
    pub chapter_numbering: LevelNumbering,
    pub section_numbering: Vec<LevelNumbering>,

    // Navigation and labels
    pub navlinks: bool,
    pub rellinks: bool,
    pub index_text: String,
    pub contents_text: String,
    pub preamble_text: String,
    pub title_separator: String,
    pub nav_prev_text: String,
    pub nav_next_text: String,
    pub nav_up_text: String,
    pub nav_separator: String,
    pub index_main_sep: String,
    pub index_multi_sep: String,
    pub pre_versionid: String,
    pub post_versionid: String,

    // Markup dialect and charsets
    pub html_version: HtmlVersion,
    pub output_charset: Charset,
    pub restrict_charset: Charset,
    /// Preferred quote pairs, best first; the renderer walks down the
    /// chain until a pair is representable in the restriction charset.
    pub quote_pairs: Vec<(String, String)>,

    // Literal markup insertion points
    pub head_end: Option<String>,
    pub body_tag: Option<String>,
    pub body_start: Option<String>,
    pub body_end: Option<String>,
    pub address_start: Option<String>,
    pub address_end: Option<String>,
    pub nav_attr: Option<String>,

    // Footer
    pub address_section: bool,
    pub visible_version_id: bool,

    // Metadata
    pub author: Option<String>,
    pub description: Option<String>,

    // Compiled-help output
    pub help_archive: Option<String>,
    pub help_project: Option<String>,
    pub help_contents: Option<String>,
    pub help_index: Option<String>,
    /// Additional files to pack into the help archive, as
    /// (disk path, archive name) pairs.
    pub extra_files: Vec<(String, String)>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            leaf_level: LeafLevel::Depth(2),
            // The prefix contents list on leaf pages is opt-in.
            leaf_contains_contents: false,
            leaf_smallest_contents: 4,
            contents_depths: Vec::new(),

            single_filename: "Manual.html".to_string(),
            contents_filename: "Contents.html".to_string(),
            index_filename: "IndexPage.html".to_string(),
            template_filename: "%n.html".to_string(),
            template_fragments: vec!["%b".to_string()],

            chapter_numbering: LevelNumbering::new(false, true, ": "),
            section_numbering: vec![LevelNumbering::new(true, true, " ")],

            navlinks: true,
            rellinks: true,
            index_text: "Index".to_string(),
            contents_text: "Contents".to_string(),
            preamble_text: "Preamble".to_string(),
            title_separator: " - ".to_string(),
            nav_prev_text: "Previous".to_string(),
            nav_next_text: "Next".to_string(),
            nav_up_text: "Up".to_string(),
            nav_separator: " | ".to_string(),
            index_main_sep: ": ".to_string(),
            index_multi_sep: ", ".to_string(),
            pre_versionid: "[".to_string(),
            post_versionid: "]".to_string(),

            html_version: HtmlVersion::Html4,
            output_charset: Charset::Ascii,
            restrict_charset: Charset::UTF8,
            quote_pairs: vec![
                ("\u{2018}".to_string(), "\u{2019}".to_string()),
                ("\"".to_string(), "\"".to_string()),
            ],

            head_end: None,
            body_tag: None,
            body_start: None,
            body_end: None,
            address_start: None,
            address_end: None,
            nav_attr: None,

            address_section: true,
            visible_version_id: true,

            author: None,
            description: None,

            help_archive: None,
            help_project: None,
            help_contents: None,
            help_index: None,
            extra_files: Vec::new(),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "yes" | "y" | "true" | "t" | "on" | "1" => Some(true),
        "no" | "n" | "false" | "f" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Defaults for compiled-help output: one file per section, no
    /// navigation bar or address footer, and the standard help filenames.
    pub fn help() -> Self {
        Config {
            leaf_level: LeafLevel::Infinite,
            navlinks: false,
            address_section: false,
            visible_version_id: false,
            help_archive: Some("output.chm".to_string()),
            help_contents: Some("contents.hhc".to_string()),
            help_index: Some("index.hhk".to_string()),
            ..Config::default()
        }
    }

    /// How many levels of contents a section at `level` shows, counting
    /// the section itself as one.
    pub fn contents_depth(&self, level: u32) -> u32 {
        self.contents_depths
            .get(level as usize)
            .copied()
            .unwrap_or(level + 2)
    }

    /// Resolve the quote pair to use under the restriction charset,
    /// walking down the fallback chain while the current pair is
    /// unrepresentable and another pair remains.
    pub fn resolve_quotes(&self) -> (&str, &str) {
        let mut idx = 0;
        while idx + 1 < self.quote_pairs.len() {
            let (l, r) = &self.quote_pairs[idx];
            if self.restrict_charset.can_encode(l) && self.restrict_charset.can_encode(r) {
                break;
            }
            idx += 1;
        }
        let (l, r) = &self.quote_pairs[idx];
        (l, r)
    }

    fn ensure_section_level(&mut self, depth: usize) -> &mut LevelNumbering {
        while self.section_numbering.len() < depth {
            let last = self
                .section_numbering
                .last()
                .cloned()
                .unwrap_or_else(|| LevelNumbering::new(true, true, " "));
            self.section_numbering.push(last);
        }
        &mut self.section_numbering[depth - 1]
    }

    /// Apply one configuration directive. Recoverable problems (unknown
    /// values, missing arguments) go to `report` and leave the previous
    /// setting in place.
    pub fn apply(&mut self, key: &str, args: &[&str], report: &mut Report) {
        macro_rules! arg {
            () => {
                match args.first() {
                    Some(a) => *a,
                    None => {
                        report.missing_argument(key);
                        return;
                    }
                }
            };
        }
        macro_rules! set_bool {
            ($field:expr) => {{
                let v = arg!();
                match parse_bool(v) {
                    Some(b) => $field = b,
                    None => report.unknown_value(key, v),
                }
            }};
        }
        macro_rules! set_string {
            ($field:expr) => {
                $field = arg!().to_string()
            };
        }
        macro_rules! set_opt_string {
            ($field:expr) => {
                $field = Some(arg!().to_string())
            };
        }

        match key {
            "contents-filename" => set_string!(self.contents_filename),
            "index-filename" => set_string!(self.index_filename),
            "template-filename" => set_string!(self.template_filename),
            "single-filename" => set_string!(self.single_filename),
            "template-fragment" => {
                if args.is_empty() {
                    report.missing_argument(key);
                } else {
                    self.template_fragments = args.iter().map(|s| s.to_string()).collect();
                }
            }

            "chapter-numeric" => set_bool!(self.chapter_numbering.numbers_only),
            "chapter-shownumber" => set_bool!(self.chapter_numbering.shown),
            "chapter-suffix" => set_string!(self.chapter_numbering.suffix),
            "section-numeric" | "section-shownumber" | "section-suffix" => {
                // Optional leading depth argument, default 1.
                let (depth, rest) = match args.split_first() {
                    Some((first, rest)) if !rest.is_empty() => {
                        match first.parse::<usize>() {
                            Ok(d) if d >= 1 => (d, rest),
                            _ => {
                                report.unknown_value(key, first);
                                return;
                            }
                        }
                    }
                    _ => (1, args),
                };
                let value = match rest.first() {
                    Some(v) => *v,
                    None => {
                        report.missing_argument(key);
                        return;
                    }
                };
                let level = self.ensure_section_level(depth);
                match key {
                    "section-suffix" => level.suffix = value.to_string(),
                    "section-numeric" => match parse_bool(value) {
                        Some(b) => level.numbers_only = b,
                        None => report.unknown_value(key, value),
                    },
                    _ => match parse_bool(value) {
                        Some(b) => level.shown = b,
                        None => report.unknown_value(key, value),
                    },
                }
            }

            "leaf-level" => {
                let v = arg!();
                if v == "infinite" || v == "infinity" {
                    self.leaf_level = LeafLevel::Infinite;
                } else {
                    match v.parse::<u32>() {
                        Ok(0) => self.leaf_level = LeafLevel::Single,
                        Ok(n) => self.leaf_level = LeafLevel::Depth(n),
                        Err(_) => report.unknown_value(key, v),
                    }
                }
            }
            "leaf-contains-contents" => set_bool!(self.leaf_contains_contents),
            "leaf-smallest-contents" => {
                let v = arg!();
                match v.parse::<usize>() {
                    Ok(n) => self.leaf_smallest_contents = n,
                    Err(_) => report.unknown_value(key, v),
                }
            }
            "contents-depth" => {
                let (level, value) = match args {
                    [l, v, ..] => (*l, *v),
                    _ => {
                        report.missing_argument(key);
                        return;
                    }
                };
                match (level.parse::<usize>(), value.parse::<u32>()) {
                    (Ok(l), Ok(v)) => {
                        if self.contents_depths.len() <= l {
                            // Pad with the positional defaults.
                            for i in self.contents_depths.len()..=l {
                                self.contents_depths.push(i as u32 + 2);
                            }
                        }
                        self.contents_depths[l] = v;
                    }
                    _ => report.unknown_value(key, value),
                }
            }

            "index-text" => set_string!(self.index_text),
            "contents-text" => set_string!(self.contents_text),
            "preamble-text" => set_string!(self.preamble_text),
            "title-separator" => set_string!(self.title_separator),
            "nav-prev-text" => set_string!(self.nav_prev_text),
            "nav-next-text" => set_string!(self.nav_next_text),
            "nav-up-text" => set_string!(self.nav_up_text),
            "nav-separator" => set_string!(self.nav_separator),
            "index-main-separator" => set_string!(self.index_main_sep),
            "index-multiple-separator" => set_string!(self.index_multi_sep),
            "pre-versionid" => set_string!(self.pre_versionid),
            "post-versionid" => set_string!(self.post_versionid),

            "html-version" => {
                let v = arg!();
                match HtmlVersion::from_label(v) {
                    Some(ver) => self.html_version = ver,
                    None => report.unknown_value(key, v),
                }
            }
            "output-charset" => {
                let v = arg!();
                match Charset::from_label(v) {
                    Some(cs) => self.output_charset = cs,
                    None => report.unknown_value(key, v),
                }
            }
            "restrict-charset" => {
                let v = arg!();
                match Charset::from_label(v) {
                    Some(cs) => self.restrict_charset = cs,
                    None => report.unknown_value(key, v),
                }
            }
            "quotes" => {
                if args.len() < 2 {
                    report.missing_argument(key);
                } else {
                    self.quote_pairs = args
                        .chunks_exact(2)
                        .map(|p| (p[0].to_string(), p[1].to_string()))
                        .collect();
                }
            }

            "head-end" => set_opt_string!(self.head_end),
            "body-tag" => set_opt_string!(self.body_tag),
            "body-start" => set_opt_string!(self.body_start),
            "body-end" => set_opt_string!(self.body_end),
            "address-start" => set_opt_string!(self.address_start),
            "address-end" => set_opt_string!(self.address_end),
            "navigation-attributes" => set_opt_string!(self.nav_attr),

            "include-navlinks" => set_bool!(self.navlinks),
            "include-rellinks" => set_bool!(self.rellinks),
            "address-section" => set_bool!(self.address_section),
            "visible-version-id" => set_bool!(self.visible_version_id),

            "author" => set_opt_string!(self.author),
            "description" => set_opt_string!(self.description),

            "help-chm" => set_opt_string!(self.help_archive),
            "help-project" => set_opt_string!(self.help_project),
            "help-contents" => set_opt_string!(self.help_contents),
            "help-index" => set_opt_string!(self.help_index),
            "help-extra-file" => {
                let disk = arg!();
                let arcname = args.get(1).copied().unwrap_or_else(|| {
                    std::path::Path::new(disk)
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or(disk)
                });
                // The leading-# namespace is reserved by help viewers.
                if arcname.starts_with('#') || arcname.starts_with('$') {
                    report.bad_archive_name(arcname);
                } else {
                    self.extra_files
                        .push((disk.to_string(), arcname.to_string()));
                }
            }

            _ => report.unknown_value("option", key),
        }
    }

    /// Post-configuration checks. In HTML mode the help archive and
    /// project names only make sense as a pair, and the auxiliary sitemap
    /// files only make sense under a project. In help mode any missing
    /// help filenames fall back to their defaults.
    pub fn validate(&mut self, report: &mut Report, help_mode: bool) {
        if help_mode {
            if self.help_archive.is_none() {
                self.help_archive = Some("output.chm".to_string());
            }
            if self.help_contents.is_none() {
                self.help_contents = Some("contents.hhc".to_string());
            }
            if self.help_index.is_none() {
                self.help_index = Some("index.hhk".to_string());
            }
            return;
        }
        if self.help_archive.is_some() != self.help_project.is_some() {
            report.help_names_mismatch();
            self.help_archive = None;
            self.help_project = None;
        }
        if self.help_project.is_none() {
            self.help_contents = None;
            self.help_index = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contents_depth_defaults_to_level_plus_two() {
        let cfg = Config::default();
        assert_eq!(cfg.contents_depth(0), 2);
        assert_eq!(cfg.contents_depth(3), 5);
    }

    #[test]
    fn contents_depth_override_keeps_other_levels() {
        let mut cfg = Config::default();
        let mut report = Report::new();
        cfg.apply("contents-depth", &["2", "7"], &mut report);
        assert!(report.is_empty());
        assert_eq!(cfg.contents_depth(0), 2);
        assert_eq!(cfg.contents_depth(1), 3);
        assert_eq!(cfg.contents_depth(2), 7);
        assert_eq!(cfg.contents_depth(3), 5);
    }

    #[test]
    fn section_numbering_extends_by_copying_deepest() {
        let mut cfg = Config::default();
        let mut report = Report::new();
        cfg.apply("section-suffix", &["1", ". "], &mut report);
        cfg.apply("section-numeric", &["3", "false"], &mut report);
        assert!(report.is_empty());
        assert_eq!(cfg.section_numbering.len(), 3);
        // Levels 2 and 3 were seeded from level 1's settings.
        assert_eq!(cfg.section_numbering[1].suffix, ". ");
        assert_eq!(cfg.section_numbering[2].suffix, ". ");
        assert!(cfg.section_numbering[0].numbers_only);
        assert!(!cfg.section_numbering[2].numbers_only);
    }

    #[test]
    fn leaf_level_parses_zero_and_infinite() {
        let mut cfg = Config::default();
        let mut report = Report::new();
        cfg.apply("leaf-level", &["0"], &mut report);
        assert_eq!(cfg.leaf_level, LeafLevel::Single);
        cfg.apply("leaf-level", &["infinite"], &mut report);
        assert_eq!(cfg.leaf_level, LeafLevel::Infinite);
        cfg.apply("leaf-level", &["3"], &mut report);
        assert_eq!(cfg.leaf_level, LeafLevel::Depth(3));
        assert!(report.is_empty());
        cfg.apply("leaf-level", &["lots"], &mut report);
        assert_eq!(cfg.leaf_level, LeafLevel::Depth(3));
        assert_eq!(report.messages().len(), 1);
    }

    #[test]
    fn only_finite_leaf_levels_reach_thresholds() {
        assert!(LeafLevel::Depth(2).at_least(2));
        assert!(!LeafLevel::Depth(1).at_least(2));
        assert!(!LeafLevel::Single.at_least(1));
        assert!(!LeafLevel::Infinite.at_least(1));
    }

    #[test]
    fn unknown_value_is_reported_and_ignored() {
        let mut cfg = Config::default();
        let mut report = Report::new();
        cfg.apply("html-version", &["html9"], &mut report);
        assert_eq!(cfg.html_version, HtmlVersion::Html4);
        assert_eq!(report.messages().len(), 1);
    }

    #[test]
    fn quote_chain_falls_back_under_ascii_restriction() {
        let mut cfg = Config::default();
        cfg.restrict_charset = Charset::Ascii;
        assert_eq!(cfg.resolve_quotes(), ("\"", "\""));
        cfg.restrict_charset = Charset::UTF8;
        assert_eq!(cfg.resolve_quotes(), ("\u{2018}", "\u{2019}"));
    }

    #[test]
    fn quote_chain_keeps_last_pair_even_if_unrepresentable() {
        let mut cfg = Config::default();
        cfg.restrict_charset = Charset::Ascii;
        cfg.quote_pairs = vec![
            ("\u{2018}".to_string(), "\u{2019}".to_string()),
            ("\u{201c}".to_string(), "\u{201d}".to_string()),
        ];
        assert_eq!(cfg.resolve_quotes(), ("\u{201c}", "\u{201d}"));
    }

    #[test]
    fn html_mode_requires_archive_and_project_together() {
        let mut cfg = Config::default();
        let mut report = Report::new();
        cfg.help_archive = Some("out.chm".to_string());
        cfg.help_contents = Some("c.hhc".to_string());
        cfg.validate(&mut report, false);
        assert_eq!(report.messages().len(), 1);
        assert!(cfg.help_archive.is_none());
        assert!(cfg.help_contents.is_none());
    }

    #[test]
    fn help_mode_fills_default_filenames() {
        let mut cfg = Config::default();
        let mut report = Report::new();
        cfg.validate(&mut report, true);
        assert!(report.is_empty());
        assert_eq!(cfg.help_archive.as_deref(), Some("output.chm"));
        assert_eq!(cfg.help_contents.as_deref(), Some("contents.hhc"));
        assert_eq!(cfg.help_index.as_deref(), Some("index.hhk"));
    }

    #[test]
    fn reserved_archive_prefix_rejected() {
        let mut cfg = Config::help();
        let mut report = Report::new();
        cfg.apply("help-extra-file", &["logo.png", "#SYSTEM"], &mut report);
        assert!(cfg.extra_files.is_empty());
        assert_eq!(report.messages().len(), 1);
        cfg.apply("help-extra-file", &["img/logo.png"], &mut report);
        assert_eq!(
            cfg.extra_files,
            vec![("img/logo.png".to_string(), "logo.png".to_string())]
        );
    }
}
