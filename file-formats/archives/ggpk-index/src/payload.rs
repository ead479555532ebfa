//! Zip patch payloads
//!
//! A payload is a plain zip container held entirely in memory. Encrypted
//! patches decrypt into one, plain patches are read straight from disk. The
//! buffer and every entry read out of it are wiped on drop.

use crate::io::read_to_end_wiping;
use crate::path::normalize_path;
use crate::{Error, Result};
use std::io::Cursor;
use std::path::Path;
use zeroize::Zeroizing;
use zip::ZipArchive;

/// Largest buffer reserved up front for a single entry
const MAX_PREALLOCATION: usize = 1 << 24;

/// An in-memory zip payload
#[derive(Debug)]
pub struct Payload {
    bytes: Zeroizing<Vec<u8>>,
    len: usize,
}

impl Payload {
    /// Wrap zip bytes, checking that they form a readable archive
    pub fn from_bytes<B: Into<Zeroizing<Vec<u8>>>>(bytes: B) -> Result<Self> {
        let bytes = bytes.into();
        let len = ZipArchive::new(Cursor::new(bytes.as_slice()))?.len();
        log::debug!("Payload holds {len} zip entries");
        Ok(Self { bytes, len })
    }

    /// Read a zip payload from disk
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::not_found(path.display().to_string()),
            _ => Error::Io(e),
        })?;
        Self::from_bytes(bytes)
    }

    /// Raw zip bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of zip entries, directories included
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the zip has no entries
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// File entries in zip order with normalized paths
    pub fn entries(&self) -> Result<PayloadEntries<'_>> {
        Ok(PayloadEntries {
            archive: ZipArchive::new(Cursor::new(self.bytes.as_slice()))?,
            next: 0,
        })
    }
}

/// One file carried by a payload
#[derive(Debug, Clone)]
pub struct PayloadEntry {
    path: String,
    data: Zeroizing<Vec<u8>>,
}

impl PayloadEntry {
    /// Create an entry, normalizing its path
    pub fn new<B: Into<Zeroizing<Vec<u8>>>>(path: &str, data: B) -> Self {
        Self {
            path: normalize_path(path),
            data: data.into(),
        }
    }

    /// Normalized internal path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Replacement bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Iterator over the file entries of a [`Payload`]
pub struct PayloadEntries<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    next: usize,
}

impl std::fmt::Debug for PayloadEntries<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadEntries")
            .field("len", &self.archive.len())
            .field("next", &self.next)
            .finish()
    }
}

impl Iterator for PayloadEntries<'_> {
    type Item = Result<PayloadEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.archive.len() {
            let index = self.next;
            self.next += 1;

            let mut file = match self.archive.by_index(index) {
                Ok(file) => file,
                Err(e) => return Some(Err(e.into())),
            };
            if file.is_dir() {
                continue;
            }
            let path = normalize_path(file.name());
            if path.is_empty() {
                continue;
            }

            // Declared sizes are untrusted; past the cap the buffer grows by wiping moves
            let capacity = usize::try_from(file.size()).map_or(MAX_PREALLOCATION, |size| {
                size.min(MAX_PREALLOCATION)
            });
            let mut data = Zeroizing::new(Vec::with_capacity(capacity));
            if let Err(e) = read_to_end_wiping(&mut file, &mut data) {
                return Some(Err(Error::Payload(format!("failed to read {path}: {e}"))));
            }
            return Some(Ok(PayloadEntry { path, data }));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .add_directory("art/", SimpleFileOptions::default())
            .unwrap();
        for (name, data) in files {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_entries_in_zip_order() {
        let bytes = zip_bytes(&[("z.txt", b"last"), ("art\\icon.png", b"BBBB")]);
        let payload = Payload::from_bytes(bytes).unwrap();
        assert_eq!(payload.len(), 3);

        let entries: Vec<PayloadEntry> = payload
            .entries()
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        let paths: Vec<&str> = entries.iter().map(|e| e.path()).collect();
        assert_eq!(paths, vec!["z.txt", "art/icon.png"]);
        assert_eq!(entries[1].data(), b"BBBB");
    }

    #[test]
    fn test_entry_data_is_sized_exactly() {
        let big: Vec<u8> = (0..100_000u32).map(|i| (i % 199) as u8).collect();
        let deflated = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file("big.bin", deflated).unwrap();
        writer.write_all(&big).unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let payload = Payload::from_bytes(bytes).unwrap();
        let entry = payload.entries().unwrap().next().unwrap().unwrap();
        assert_eq!(entry.path(), "big.bin");
        assert_eq!(entry.data(), big.as_slice());
        assert_eq!(entry.data.capacity(), big.len());
    }

    #[test]
    fn test_wiping_read_grows_from_empty() {
        let data = vec![7u8; 20_000];
        let mut buf = Zeroizing::new(Vec::new());
        let n = read_to_end_wiping(&mut data.as_slice(), &mut buf).unwrap();
        assert_eq!(n, data.len());
        assert_eq!(buf.as_slice(), data.as_slice());
    }

    #[test]
    fn test_not_a_zip() {
        let err = Payload::from_bytes(b"definitely not a zip".to_vec()).unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_missing_file() {
        let err = Payload::read("/nonexistent/patch.zip").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
