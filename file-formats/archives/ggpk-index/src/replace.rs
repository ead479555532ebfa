//! Applying payload entries to an index

use crate::index::{Index, WriteStrategy};
use crate::payload::PayloadEntry;
use crate::record::FileRecord;
use crate::{Error, Result};

/// Decision returned by per-entry callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    /// Apply the entry
    #[default]
    Continue,
    /// Leave this entry untouched
    Skip,
}

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaceSummary {
    /// Entries written to the index
    pub replaced: usize,
    /// Entries the callback asked to skip
    pub skipped: usize,
    /// Entries whose path is not in the index
    pub missing: usize,
}

/// Replace every index record named by a payload entry
///
/// Entries are processed in the order given. An entry whose path the index
/// does not contain is counted as missing and otherwise ignored. `on_entry`
/// runs before each write and may veto it with [`Flow::Skip`].
///
/// Standalone archives write each entry as it is visited and commit the table
/// once at the end; bundles collect all entries and rewrite the file once.
/// Nothing is persisted when no entry was written. A failure part way through
/// leaves the archive in whatever state the backend reached.
pub fn replace<I, E, F>(index: &mut I, entries: E, mut on_entry: F) -> Result<ReplaceSummary>
where
    I: Index + ?Sized,
    E: IntoIterator<Item = Result<PayloadEntry>>,
    F: FnMut(&FileRecord, &str) -> Flow,
{
    let strategy = index.write_strategy();
    let mut summary = ReplaceSummary::default();
    let mut staged: Vec<(FileRecord, PayloadEntry)> = Vec::new();

    for entry in entries {
        let entry = entry?;
        let Some(record) = index.find(entry.path()) else {
            log::warn!("{} is not in the archive, ignoring", entry.path());
            summary.missing += 1;
            continue;
        };

        if on_entry(&record, entry.path()) == Flow::Skip {
            log::warn!("Skipping {}", entry.path());
            summary.skipped += 1;
            continue;
        }

        match strategy {
            WriteStrategy::Spread => index.write(&record, entry.data())?,
            WriteStrategy::InPlace => staged.push((record, entry)),
        }
        summary.replaced += 1;
    }

    if summary.replaced == 0 {
        log::info!("No entries matched, index left untouched");
        return Ok(summary);
    }

    match strategy {
        WriteStrategy::Spread => index.save()?,
        WriteStrategy::InPlace => {
            let batch: Vec<(&FileRecord, &[u8])> = staged
                .iter()
                .map(|(record, entry)| (record, entry.data()))
                .collect();
            index.rewrite(&batch)?;
        }
    }

    log::info!(
        "Replaced {} entries ({} skipped, {} missing)",
        summary.replaced,
        summary.skipped,
        summary.missing
    );
    Ok(summary)
}

/// Replace a single record and persist it
///
/// Unlike [`replace`], a path the index does not contain is an error.
pub fn replace_file<I: Index + ?Sized>(index: &mut I, path: &str, data: &[u8]) -> Result<FileRecord> {
    let record = index.find(path).ok_or_else(|| Error::not_found(path))?;
    match index.write_strategy() {
        WriteStrategy::Spread => {
            index.write(&record, data)?;
            index.save()?;
        }
        WriteStrategy::InPlace => index.rewrite(&[(&record, data)])?,
    }
    Ok(record)
}
