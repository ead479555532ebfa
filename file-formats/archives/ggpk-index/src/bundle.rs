//! Monolithic bundle index backend
//!
//! The bundle file packs every record back to back after a single table, so
//! a record cannot grow or shrink in place. Writes are staged in memory and
//! [`BundleIndex::save`](crate::Index::save) rewrites the whole file through
//! a temporary file that atomically replaces the original.
//!
//! ```text
//! "BNDL"  u32 version  u32 count
//! count × { u16 path_len, path, u64 size }
//! record data, in table order
//! ```

use crate::index::{BackendKind, Index, WriteStrategy};
use crate::io::{decode_path, expect_magic, read_path, truncated, write_path};
use crate::record::{FileRecord, RecordTable};
use crate::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use zeroize::Zeroizing;

/// Bundle file magic
pub const BUNDLE_MAGIC: [u8; 4] = *b"BNDL";

/// Bundle layout version
pub const BUNDLE_VERSION: u32 = 1;

/// Index backed by a monolithic bundle file
#[derive(Debug)]
pub struct BundleIndex {
    path: PathBuf,
    table: RecordTable,
    staged: HashMap<usize, Zeroizing<Vec<u8>>>,
}

impl BundleIndex {
    /// Open a bundle index file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        expect_magic(&mut reader, &BUNDLE_MAGIC, "bundle")?;
        let version = reader
            .read_u32::<LittleEndian>()
            .map_err(truncated("bundle header"))?;
        if version != BUNDLE_VERSION {
            return Err(Error::invalid_format(format!(
                "unsupported bundle version {version}"
            )));
        }
        let count = reader
            .read_u32::<LittleEndian>()
            .map_err(truncated("bundle header"))?;

        let mut sizes = Vec::with_capacity((count as usize).min(4096));
        for _ in 0..count {
            let path = read_path(&mut reader).map_err(truncated("bundle table"))?;
            let size = reader
                .read_u64::<LittleEndian>()
                .map_err(truncated("bundle table"))?;
            sizes.push((decode_path(path)?, size));
        }

        let mut offset = reader.stream_position()?;
        let mut entries = Vec::with_capacity(sizes.len());
        for (path, size) in sizes {
            entries.push((path, offset, size));
            offset = offset
                .checked_add(size)
                .ok_or_else(|| Error::invalid_format("bundle record sizes overflow"))?;
        }
        if offset > file_len {
            return Err(Error::invalid_format(format!(
                "bundle data truncated: need {offset} bytes, file has {file_len}"
            )));
        }

        let table = RecordTable::from_entries(entries)?;
        log::debug!(
            "Opened bundle index {} with {} records",
            path.display(),
            table.len()
        );

        Ok(Self {
            path,
            table,
            staged: HashMap::new(),
        })
    }

    /// Path of the bundle file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of writes waiting for the next save
    pub fn staged_count(&self) -> usize {
        self.staged.len()
    }
}

/// Write the table part of a bundle, returning its length in bytes
fn write_table<W: Write>(writer: &mut W, entries: &[(&str, u64)]) -> Result<u64> {
    let count = u32::try_from(entries.len())
        .map_err(|_| Error::invalid_format("too many records for a bundle"))?;
    writer.write_all(&BUNDLE_MAGIC)?;
    writer.write_u32::<LittleEndian>(BUNDLE_VERSION)?;
    writer.write_u32::<LittleEndian>(count)?;

    let mut written = 12;
    for (path, size) in entries {
        written += write_path(writer, path)?;
        writer.write_u64::<LittleEndian>(*size)?;
        written += 8;
    }
    Ok(written)
}

/// Serialize a complete bundle from in-memory files
pub(crate) fn write_bundle<W: Write>(writer: &mut W, files: &[(String, Vec<u8>)]) -> Result<()> {
    let entries: Vec<(&str, u64)> = files
        .iter()
        .map(|(path, data)| (path.as_str(), data.len() as u64))
        .collect();
    write_table(writer, &entries)?;
    for (_, data) in files {
        writer.write_all(data)?;
    }
    Ok(())
}

impl Index for BundleIndex {
    fn kind(&self) -> BackendKind {
        BackendKind::Bundle
    }

    fn write_strategy(&self) -> WriteStrategy {
        WriteStrategy::InPlace
    }

    fn table(&self) -> &RecordTable {
        &self.table
    }

    fn read(&self, record: &FileRecord) -> Result<Zeroizing<Vec<u8>>> {
        let id = self.table.resolve(record)?;
        if let Some(data) = self.staged.get(&id) {
            return Ok(data.clone());
        }

        let live = &self.table.records()[id];
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(live.offset()))?;
        let mut data = Zeroizing::new(vec![0u8; live.size() as usize]);
        file.read_exact(&mut data)
            .map_err(truncated("bundle record"))?;
        Ok(data)
    }

    fn write(&mut self, record: &FileRecord, data: &[u8]) -> Result<()> {
        let id = self.table.resolve(record)?;
        log::debug!("Staging {} ({} bytes)", record.path(), data.len());
        self.staged.insert(id, Zeroizing::new(data.to_vec()));
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        if self.staged.is_empty() {
            log::debug!("Bundle {} has no staged writes", self.path.display());
            return Ok(());
        }

        let sizes: Vec<u64> = self
            .table
            .records()
            .iter()
            .map(|r| {
                self.staged
                    .get(&r.id())
                    .map_or(r.size(), |data| data.len() as u64)
            })
            .collect();
        let entries: Vec<(&str, u64)> = self
            .table
            .records()
            .iter()
            .zip(&sizes)
            .map(|(r, size)| (r.path(), *size))
            .collect();

        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(parent)?;
        let mut source = File::open(&self.path)?;

        let data_start = {
            let mut out = BufWriter::new(temp.as_file_mut());
            let data_start = write_table(&mut out, &entries)?;

            for record in self.table.records() {
                if let Some(data) = self.staged.get(&record.id()) {
                    out.write_all(data)?;
                    continue;
                }
                source.seek(SeekFrom::Start(record.offset()))?;
                let copied = io::copy(&mut (&mut source).take(record.size()), &mut out)?;
                if copied != record.size() {
                    return Err(Error::invalid_format(format!(
                        "bundle record {} truncated",
                        record.path()
                    )));
                }
            }
            out.flush()?;
            data_start
        };
        temp.as_file().sync_all()?;
        drop(source);
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        let mut offset = data_start;
        for (id, size) in sizes.into_iter().enumerate() {
            self.table.relocate(id, offset, size);
            offset += size;
        }

        log::info!(
            "Rewrote bundle {} with {} replaced records",
            self.path.display(),
            self.staged.len()
        );
        self.staged.clear();
        Ok(())
    }
}
