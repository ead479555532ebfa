//! Extraction commands

use anyhow::{Context, Result, anyhow};
use ggpk_index::{ExtractOptions, Flow, Index, extract_parallel};
use std::fs;
use std::path::Path;

use super::open_index;
use crate::utils::create_progress_bar;

/// Extract a single file
pub fn extract_file(target: &Path, internal_path: &str, out_file: &Path) -> Result<()> {
    let index = open_index(target)?;
    let record = index
        .find(internal_path)
        .ok_or_else(|| anyhow!("File not found in archive: {internal_path}"))?;

    let data = index
        .read(&record)
        .with_context(|| format!("Failed to read {}", record.path()))?;

    if let Some(parent) = out_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(out_file, data.as_slice())
        .with_context(|| format!("Failed to write {}", out_file.display()))?;

    println!("Extracted: {}", record.path());
    Ok(())
}

/// Extract everything below an internal directory
pub fn extract_dir(
    target: &Path,
    internal_dir: &str,
    out_dir: &Path,
    threads: Option<usize>,
) -> Result<()> {
    let index = open_index(target)?;
    let node = index
        .find_node(internal_dir)
        .ok_or_else(|| anyhow!("Directory not found in archive: {internal_dir}"))?;

    let total = index.table().descendants(node).len();
    let mut options = ExtractOptions::new();
    if let Some(threads) = threads {
        options = options.threads(threads);
    }

    let pb = create_progress_bar(total as u64, "Extracting files");
    let written = extract_parallel(&index, node, out_dir, &options, |_, path| {
        pb.set_message(path.to_string());
        pb.inc(1);
        Flow::Continue
    })
    .with_context(|| format!("Failed to extract {internal_dir}"))?;
    pb.finish_and_clear();

    println!("Done! Extracted {written} files to {}", out_dir.display());
    Ok(())
}
