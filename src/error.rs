//! Error types and the per-run diagnostics collector.

use std::io;

use thiserror::Error;

/// Errors that can abort a render outright.
///
/// Most failure modes do not go through here: recoverable conditions
/// (unwritable output file, unknown option value) are pushed onto a
/// [`Report`] and the pass carries on.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Collects non-fatal diagnostics for one render pass.
///
/// Each condition is reported once per occurrence and the corresponding
/// feature falls back to a safe default (a discarding output stream, the
/// option's built-in value) so the rest of the run still completes.
#[derive(Debug, Default)]
pub struct Report {
    messages: Vec<String>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// An output destination could not be opened or written.
    pub fn cant_write(&mut self, name: &str, err: &io::Error) {
        self.messages
            .push(format!("cannot write output '{name}': {err}"));
    }

    /// An input file (e.g. a configured extra archive file) could not be read.
    pub fn cant_read(&mut self, name: &str, err: &io::Error) {
        self.messages.push(format!("cannot read '{name}': {err}"));
    }

    /// A configuration option was given a value outside its enumeration.
    pub fn unknown_value(&mut self, option: &str, value: &str) {
        self.messages
            .push(format!("unrecognised value '{value}' for option '{option}'"));
    }

    /// A configuration option was given too few arguments.
    pub fn missing_argument(&mut self, option: &str) {
        self.messages
            .push(format!("option '{option}' requires an argument"));
    }

    /// The help archive and project filenames must be configured together.
    pub fn help_names_mismatch(&mut self) {
        self.messages.push(
            "help archive and project filenames must both be present; \
             help output disabled"
                .to_string(),
        );
    }

    /// An extra-file archive name used a reserved prefix.
    pub fn bad_archive_name(&mut self, name: &str) {
        self.messages
            .push(format!("archive filename '{name}' uses a reserved prefix"));
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}
