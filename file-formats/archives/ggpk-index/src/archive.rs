//! Backend selection by file name

use crate::bundle::BundleIndex;
use crate::index::{BackendKind, Index, WriteStrategy};
use crate::record::{FileRecord, RecordTable};
use crate::standalone::StandaloneIndex;
use crate::{Error, Result};
use std::path::Path;
use zeroize::Zeroizing;

/// File name reserved for monolithic bundle indexes
pub const BUNDLE_INDEX_FILE_NAME: &str = "_.index.bin";

/// An opened archive, served by whichever backend its file name selects
///
/// # Examples
///
/// ```no_run
/// use ggpk_index::{ArchiveIndex, Index};
///
/// let index = ArchiveIndex::open("Bundles2/_.index.bin")?;
/// if let Some(record) = index.find("art/icon.png") {
///     let data = index.read(&record)?;
///     println!("{} bytes", data.len());
/// }
/// # Ok::<(), ggpk_index::Error>(())
/// ```
#[derive(Debug)]
pub enum ArchiveIndex {
    /// `_.index.bin` bundle
    Bundle(BundleIndex),
    /// Any other archive file
    Standalone(StandaloneIndex),
}

impl ArchiveIndex {
    /// Which backend a path would be opened with
    pub fn classify(path: &Path) -> BackendKind {
        if path
            .file_name()
            .is_some_and(|name| name == BUNDLE_INDEX_FILE_NAME)
        {
            BackendKind::Bundle
        } else {
            BackendKind::Standalone
        }
    }

    /// Open an archive, choosing the backend by file name
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::not_found(path.display().to_string()));
        }

        let kind = Self::classify(path);
        log::debug!("Opening {} as {kind:?}", path.display());
        Ok(match kind {
            BackendKind::Bundle => Self::Bundle(BundleIndex::open(path)?),
            BackendKind::Standalone => Self::Standalone(StandaloneIndex::open(path)?),
        })
    }

    /// Path of the opened file
    pub fn path(&self) -> &Path {
        match self {
            Self::Bundle(index) => index.path(),
            Self::Standalone(index) => index.path(),
        }
    }

    fn backend(&self) -> &dyn Index {
        match self {
            Self::Bundle(index) => index,
            Self::Standalone(index) => index,
        }
    }

    fn backend_mut(&mut self) -> &mut dyn Index {
        match self {
            Self::Bundle(index) => index,
            Self::Standalone(index) => index,
        }
    }
}

impl Index for ArchiveIndex {
    fn kind(&self) -> BackendKind {
        self.backend().kind()
    }

    fn write_strategy(&self) -> WriteStrategy {
        self.backend().write_strategy()
    }

    fn table(&self) -> &RecordTable {
        self.backend().table()
    }

    fn read(&self, record: &FileRecord) -> Result<Zeroizing<Vec<u8>>> {
        self.backend().read(record)
    }

    fn write(&mut self, record: &FileRecord, data: &[u8]) -> Result<()> {
        self.backend_mut().write(record, data)
    }

    fn save(&mut self) -> Result<()> {
        self.backend_mut().save()
    }

    fn rewrite(&mut self, batch: &[(&FileRecord, &[u8])]) -> Result<()> {
        self.backend_mut().rewrite(batch)
    }
}
