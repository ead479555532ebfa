//! The index contract shared by every backend

use crate::record::{FileRecord, RecordTable};
use crate::tree::Node;
use crate::Result;
use zeroize::Zeroizing;

/// Which concrete backend serves an index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Monolithic bundle index file rewritten as a whole
    Bundle,
    /// Standalone archive container updated record by record
    Standalone,
}

/// How writes reach the disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStrategy {
    /// Each write relocates its own record; `save` commits the table
    Spread,
    /// Writes are staged and the whole storage file is rewritten once
    InPlace,
}

/// Path lookup, read/write and persistence over an archive
pub trait Index {
    /// Backend serving this index
    fn kind(&self) -> BackendKind;

    /// Persistence strategy of the backend
    fn write_strategy(&self) -> WriteStrategy;

    /// Records and tree
    fn table(&self) -> &RecordTable;

    /// Look up a file by internal path
    fn find(&self, path: &str) -> Option<FileRecord> {
        self.table().find(path).cloned()
    }

    /// Look up a directory or file by internal path
    fn find_node(&self, path: &str) -> Option<Node<'_>> {
        self.table().find_node(path)
    }

    /// Current contents of a record, including writes not yet saved
    ///
    /// Record data may come straight from a decrypted patch, so it is handed
    /// out in a buffer that is wiped on drop.
    fn read(&self, record: &FileRecord) -> Result<Zeroizing<Vec<u8>>>;

    /// Replace the contents of a record
    fn write(&mut self, record: &FileRecord, data: &[u8]) -> Result<()>;

    /// Persist all writes
    fn save(&mut self) -> Result<()>;

    /// Apply a batch of writes and persist them with a single save
    fn rewrite(&mut self, batch: &[(&FileRecord, &[u8])]) -> Result<()> {
        for (record, data) in batch {
            self.write(record, data)?;
        }
        self.save()
    }
}
