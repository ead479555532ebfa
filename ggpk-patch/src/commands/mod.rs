//! Command implementations

pub mod extract;
pub mod pack;
pub mod replace;

use anyhow::{Context, Result};
use ggpk_index::ArchiveIndex;
use std::path::Path;

use crate::utils::create_spinner;

/// Open the archive a command operates on
pub(crate) fn open_index(target: &Path) -> Result<ArchiveIndex> {
    let spinner = create_spinner("Opening archive...");
    let index = ArchiveIndex::open(target)
        .with_context(|| format!("Failed to open archive {}", target.display()));
    spinner.finish_and_clear();
    index
}
