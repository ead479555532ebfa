//! Parallel subtree extraction

use crate::index::Index;
use crate::path::is_contained;
use crate::record::FileRecord;
use crate::replace::Flow;
use crate::tree::Node;
use crate::{Error, Result};
use rayon::prelude::*;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Configuration for parallel extraction
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Number of worker threads (None = use rayon default)
    pub num_threads: Option<usize>,
}

impl ExtractOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads
    pub fn threads(mut self, num: usize) -> Self {
        self.num_threads = Some(num);
        self
    }
}

/// Path of `record` relative to the extracted node
fn relative_path(node: Node<'_>, record: &FileRecord) -> String {
    match node {
        Node::File(_) => record.name().to_string(),
        Node::Directory(dir) if dir.path().is_empty() => record.path().to_string(),
        Node::Directory(dir) => record
            .path()
            .strip_prefix(dir.path())
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(record.path())
            .to_string(),
    }
}

/// Write one output file through a temporary file in the same directory
fn write_atomic(dest: &Path, data: &[u8]) -> Result<()> {
    let parent = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(data)?;
    temp.persist(dest).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// Extract every file at or below `node` into `out_dir`
///
/// Files keep their path relative to `node`; extracting a single file node
/// writes `out_dir/<file name>`. Work is spread over a rayon pool, so
/// `on_entry` may be called from several threads at once and in any order.
/// Each output file is either written completely or not at all. Returns the
/// number of files written.
pub fn extract_parallel<I, F>(
    index: &I,
    node: Node<'_>,
    out_dir: &Path,
    options: &ExtractOptions,
    on_entry: F,
) -> Result<usize>
where
    I: Index + Sync + ?Sized,
    F: Fn(&FileRecord, &str) -> Flow + Sync,
{
    let jobs: Vec<(&FileRecord, String)> = index
        .table()
        .descendants(node)
        .into_iter()
        .map(|record| (record, relative_path(node, record)))
        .collect();

    if let Some((record, _)) = jobs.iter().find(|(_, rel)| !is_contained(rel)) {
        return Err(Error::invalid_format(format!(
            "{} would be written outside of the output directory",
            record.path()
        )));
    }

    log::debug!(
        "Extracting {} files to {}",
        jobs.len(),
        out_dir.display()
    );

    let run = || {
        jobs.par_iter()
            .map(|(record, rel)| -> Result<usize> {
                if on_entry(record, rel) == Flow::Skip {
                    return Ok(0);
                }
                let data = index.read(record)?;
                write_atomic(&out_dir.join(rel), &data)?;
                Ok(1)
            })
            .try_reduce(|| 0, |a, b| Ok(a + b))
    };

    let written = match options.num_threads {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?
            .install(run)?,
        None => run()?,
    };

    log::info!("Extracted {written} files to {}", out_dir.display());
    Ok(written)
}
