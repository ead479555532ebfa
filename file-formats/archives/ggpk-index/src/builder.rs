//! Index creation from in-memory files

use crate::bundle::write_bundle;
use crate::path::normalize_path;
use crate::standalone::write_standalone;
use crate::{Error, Result};
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

#[derive(Debug, Clone, Copy)]
enum Layout {
    Bundle,
    Standalone,
}

/// Builder for new index files of either backend
///
/// # Examples
///
/// ```no_run
/// use ggpk_index::IndexBuilder;
///
/// IndexBuilder::new()
///     .add_file_data(b"AAAA".to_vec(), "art/icon.png")
///     .add_file_data(b"hello".to_vec(), "readme.txt")
///     .build_standalone("Content.ggpk")?;
/// # Ok::<(), ggpk_index::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct IndexBuilder {
    files: Vec<(String, Vec<u8>)>,
}

impl IndexBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file from memory. A later file with the same path replaces an earlier one.
    pub fn add_file_data(mut self, data: Vec<u8>, archive_path: &str) -> Self {
        let path = normalize_path(archive_path);
        if let Some(existing) = self.files.iter_mut().find(|(p, _)| *p == path) {
            existing.1 = data;
        } else {
            self.files.push((path, data));
        }
        self
    }

    /// Number of files queued
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no files are queued
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write a bundle index file
    pub fn build_bundle<P: AsRef<Path>>(self, path: P) -> Result<()> {
        self.build_with(path.as_ref(), Layout::Bundle)
    }

    /// Write a standalone archive file
    pub fn build_standalone<P: AsRef<Path>>(self, path: P) -> Result<()> {
        self.build_with(path.as_ref(), Layout::Standalone)
    }

    fn build_with(self, path: &Path, layout: Layout) -> Result<()> {
        if let Some((empty, _)) = self.files.iter().find(|(p, _)| p.is_empty()) {
            return Err(Error::invalid_format(format!("empty archive path '{empty}'")));
        }

        // Create a temporary file in the same directory
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp_file = NamedTempFile::new_in(parent)?;
        {
            let mut out = BufWriter::new(temp_file.as_file_mut());
            match layout {
                Layout::Bundle => write_bundle(&mut out, &self.files)?,
                Layout::Standalone => write_standalone(&mut out, &self.files)?,
            }
            out.flush()?;
        }

        // Atomically rename temp file to final destination
        temp_file.persist(path).map_err(|e| Error::Io(e.error))?;
        log::debug!("Built {} with {} files", path.display(), self.files.len());
        Ok(())
    }
}
