//! Destinations for rendered output files.
//!
//! A render pass produces a set of named byte buffers; [`FileSet`]
//! abstracts over where they land. [`DiskFiles`] writes loose files into a
//! directory, [`MemoryFiles`] keeps them in a map (used heavily by tests),
//! and [`ArchiveFiles`] streams them into a ZIP archive for compiled-help
//! packaging.

use std::collections::BTreeMap;
use std::fs;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::Result;

/// Sink for the named output files of one render pass.
pub trait FileSet {
    fn add(&mut self, name: &str, data: &[u8]) -> Result<()>;
}

/// Writes each output file into a directory on disk.
pub struct DiskFiles {
    dir: PathBuf,
}

impl DiskFiles {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        DiskFiles {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl FileSet for DiskFiles {
    fn add(&mut self, name: &str, data: &[u8]) -> Result<()> {
        fs::write(self.dir.join(name), data)?;
        Ok(())
    }
}

/// Collects output files in memory.
#[derive(Debug, Default)]
pub struct MemoryFiles {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<u8>> {
        self.files
    }
}

impl FileSet for MemoryFiles {
    fn add(&mut self, name: &str, data: &[u8]) -> Result<()> {
        self.files.insert(name.to_string(), data.to_vec());
        Ok(())
    }
}

/// Streams output files into a ZIP archive.
pub struct ArchiveFiles<W: Write + Seek> {
    zip: ZipWriter<W>,
}

impl<W: Write + Seek> ArchiveFiles<W> {
    pub fn new(writer: W) -> Self {
        ArchiveFiles {
            zip: ZipWriter::new(writer),
        }
    }

    /// Finish the archive and recover the underlying writer.
    pub fn finish(self) -> Result<W> {
        Ok(self.zip.finish()?)
    }
}

impl<W: Write + Seek> FileSet for ArchiveFiles<W> {
    fn add(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        self.zip.start_file(name, options)?;
        self.zip.write_all(data)?;
        Ok(())
    }
}
