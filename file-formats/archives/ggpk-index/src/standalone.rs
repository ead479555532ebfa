//! Standalone archive backend
//!
//! A standalone archive keeps record data and its table in one file with a
//! small fixed header pointing at the current table. Replacing a record
//! appends the new bytes and repoints that record only; saving appends a
//! fresh table and swings the header pointer to it. Superseded data stays in
//! the file as dead space.
//!
//! ```text
//! "GIDX"  u32 version  u64 table_offset
//! record data ...
//! table: u32 count, count × { u16 path_len, path, u64 offset, u64 size }
//! ```

use crate::index::{BackendKind, Index, WriteStrategy};
use crate::io::{decode_path, expect_magic, read_path, truncated, write_path};
use crate::record::{FileRecord, RecordTable};
use crate::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// Standalone archive magic
pub const STANDALONE_MAGIC: [u8; 4] = *b"GIDX";

/// Standalone layout version
pub const STANDALONE_VERSION: u32 = 1;

/// Size of the fixed header
pub const STANDALONE_HEADER_SIZE: u64 = 16;

/// Offset of the table pointer inside the header
const TABLE_POINTER_OFFSET: u64 = 8;

/// Index backed by a standalone archive file
#[derive(Debug)]
pub struct StandaloneIndex {
    path: PathBuf,
    table: RecordTable,
    writer: Option<File>,
    dirty: bool,
}

impl StandaloneIndex {
    /// Open a standalone archive
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        expect_magic(&mut reader, &STANDALONE_MAGIC, "archive")?;
        let version = reader
            .read_u32::<LittleEndian>()
            .map_err(truncated("archive header"))?;
        if version != STANDALONE_VERSION {
            return Err(Error::invalid_format(format!(
                "unsupported archive version {version}"
            )));
        }
        let table_offset = reader
            .read_u64::<LittleEndian>()
            .map_err(truncated("archive header"))?;
        if table_offset < STANDALONE_HEADER_SIZE || table_offset > file_len {
            return Err(Error::invalid_format(format!(
                "table offset {table_offset} outside of file ({file_len} bytes)"
            )));
        }

        reader.seek(SeekFrom::Start(table_offset))?;
        let count = reader
            .read_u32::<LittleEndian>()
            .map_err(truncated("archive table"))?;

        let mut entries = Vec::with_capacity((count as usize).min(4096));
        for _ in 0..count {
            let path = decode_path(read_path(&mut reader).map_err(truncated("archive table"))?)?;
            let offset = reader
                .read_u64::<LittleEndian>()
                .map_err(truncated("archive table"))?;
            let size = reader
                .read_u64::<LittleEndian>()
                .map_err(truncated("archive table"))?;

            let end = offset.checked_add(size);
            if offset < STANDALONE_HEADER_SIZE || end.is_none_or(|end| end > file_len) {
                return Err(Error::invalid_format(format!(
                    "record {path} points outside of file"
                )));
            }
            entries.push((path, offset, size));
        }

        let table = RecordTable::from_entries(entries)?;
        log::debug!(
            "Opened standalone archive {} with {} records",
            path.display(),
            table.len()
        );

        Ok(Self {
            path,
            table,
            writer: None,
            dirty: false,
        })
    }

    /// Path of the archive file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether record locations changed since the last save
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn writer(&mut self) -> Result<&mut File> {
        match &mut self.writer {
            Some(file) => Ok(file),
            slot => {
                let file = OpenOptions::new().read(true).write(true).open(&self.path)?;
                Ok(slot.insert(file))
            }
        }
    }
}

/// Write a table at the writer's current position
fn write_table<W: Write>(writer: &mut W, records: &[FileRecord]) -> Result<()> {
    let count = u32::try_from(records.len())
        .map_err(|_| Error::invalid_format("too many records for an archive"))?;
    writer.write_u32::<LittleEndian>(count)?;
    for record in records {
        write_path(writer, record.path())?;
        writer.write_u64::<LittleEndian>(record.offset())?;
        writer.write_u64::<LittleEndian>(record.size())?;
    }
    Ok(())
}

/// Serialize a complete standalone archive from in-memory files
pub(crate) fn write_standalone<W: Write>(
    writer: &mut W,
    files: &[(String, Vec<u8>)],
) -> Result<()> {
    let mut offset = STANDALONE_HEADER_SIZE;
    let mut records = Vec::with_capacity(files.len());
    for (id, (path, data)) in files.iter().enumerate() {
        records.push(FileRecord::new(id, path.clone(), offset, data.len() as u64));
        offset += data.len() as u64;
    }

    writer.write_all(&STANDALONE_MAGIC)?;
    writer.write_u32::<LittleEndian>(STANDALONE_VERSION)?;
    writer.write_u64::<LittleEndian>(offset)?;
    for (_, data) in files {
        writer.write_all(data)?;
    }
    write_table(writer, &records)
}

impl Index for StandaloneIndex {
    fn kind(&self) -> BackendKind {
        BackendKind::Standalone
    }

    fn write_strategy(&self) -> WriteStrategy {
        WriteStrategy::Spread
    }

    fn table(&self) -> &RecordTable {
        &self.table
    }

    fn read(&self, record: &FileRecord) -> Result<Zeroizing<Vec<u8>>> {
        let id = self.table.resolve(record)?;
        let live = &self.table.records()[id];

        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(live.offset()))?;
        let mut data = Zeroizing::new(vec![0u8; live.size() as usize]);
        file.read_exact(&mut data)
            .map_err(truncated("archive record"))?;
        Ok(data)
    }

    fn write(&mut self, record: &FileRecord, data: &[u8]) -> Result<()> {
        let id = self.table.resolve(record)?;
        let file = self.writer()?;
        let offset = file.seek(SeekFrom::End(0))?;
        file.write_all(data)?;

        self.table.relocate(id, offset, data.len() as u64);
        self.dirty = true;
        log::debug!(
            "Wrote {} ({} bytes) at offset {offset}",
            record.path(),
            data.len()
        );
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        if !self.dirty {
            log::debug!("Archive {} has no pending changes", self.path.display());
            return Ok(());
        }

        let records = self.table.records().to_vec();
        let file = self.writer()?;
        let table_offset = file.seek(SeekFrom::End(0))?;
        {
            let mut out = BufWriter::new(&mut *file);
            write_table(&mut out, &records)?;
            out.flush()?;
        }
        file.seek(SeekFrom::Start(TABLE_POINTER_OFFSET))?;
        file.write_u64::<LittleEndian>(table_offset)?;
        file.sync_all()?;

        self.dirty = false;
        log::info!(
            "Committed table of {} records to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create(dir: &TempDir, files: &[(&str, &[u8])]) -> PathBuf {
        let path = dir.path().join("Content.ggpk");
        let files: Vec<(String, Vec<u8>)> = files
            .iter()
            .map(|(p, d)| (p.to_string(), d.to_vec()))
            .collect();
        let mut out = File::create(&path).unwrap();
        write_standalone(&mut out, &files).unwrap();
        path
    }

    #[test]
    fn test_open_and_read() {
        let dir = TempDir::new().unwrap();
        let path = create(&dir, &[("art/icon.png", b"AAAA"), ("readme.txt", b"hi")]);

        let index = StandaloneIndex::open(&path).unwrap();
        assert_eq!(index.kind(), BackendKind::Standalone);
        let record = index.find("art/icon.png").unwrap();
        assert_eq!(index.read(&record).unwrap().as_slice(), b"AAAA");
    }

    #[test]
    fn test_write_relocates_record_only() {
        let dir = TempDir::new().unwrap();
        let path = create(&dir, &[("a.txt", b"alpha"), ("b.txt", b"beta")]);

        let mut index = StandaloneIndex::open(&path).unwrap();
        let before_b = index.find("b.txt").unwrap();
        let a = index.find("a.txt").unwrap();
        index.write(&a, b"ALPHA!").unwrap();
        assert!(index.is_dirty());

        let after_a = index.find("a.txt").unwrap();
        assert_ne!(after_a, a);
        assert_eq!(index.find("b.txt").unwrap(), before_b);

        // The old table is still authoritative on disk until save
        let untouched = StandaloneIndex::open(&path).unwrap();
        let on_disk = untouched.find("a.txt").unwrap();
        assert_eq!(untouched.read(&on_disk).unwrap().as_slice(), b"alpha");

        index.save().unwrap();
        assert!(!index.is_dirty());

        let reopened = StandaloneIndex::open(&path).unwrap();
        let a = reopened.find("a.txt").unwrap();
        let b = reopened.find("b.txt").unwrap();
        assert_eq!(reopened.read(&a).unwrap().as_slice(), b"ALPHA!");
        assert_eq!(reopened.read(&b).unwrap().as_slice(), b"beta");
    }

    #[test]
    fn test_bad_table_offset_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.ggpk");
        let mut bytes = STANDALONE_MAGIC.to_vec();
        bytes.extend_from_slice(&STANDALONE_VERSION.to_le_bytes());
        bytes.extend_from_slice(&9999u64.to_le_bytes());
        std::fs::write(&path, bytes).unwrap();

        let err = StandaloneIndex::open(&path).unwrap_err();
        assert!(err.is_corruption());
    }
}
