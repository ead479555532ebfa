//! File records and the path → record table shared by both backends

use crate::path::{file_name, normalize_path};
use crate::tree::{DirectoryNode, Node};
use crate::{Error, Result};
use std::collections::HashMap;

/// A file stored in the index
///
/// Records are handed out by value; `id` ties a copy back to the slot it was
/// taken from when it is later written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    id: usize,
    path: String,
    offset: u64,
    size: u64,
}

impl FileRecord {
    pub(crate) fn new(id: usize, path: String, offset: u64, size: u64) -> Self {
        Self {
            id,
            path,
            offset,
            size,
        }
    }

    /// Slot of this record in its index
    pub fn id(&self) -> usize {
        self.id
    }

    /// Normalized internal path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// File name without directories
    pub fn name(&self) -> &str {
        file_name(&self.path)
    }

    /// Stored size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    pub(crate) fn offset(&self) -> u64 {
        self.offset
    }

    pub(crate) fn relocate(&mut self, offset: u64, size: u64) {
        self.offset = offset;
        self.size = size;
    }
}

/// Flat record list plus path lookup and directory tree
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    records: Vec<FileRecord>,
    by_path: HashMap<String, usize>,
    root: DirectoryNode,
}

impl RecordTable {
    /// Build a table from `(path, offset, size)` triples in storage order
    pub(crate) fn from_entries(entries: Vec<(String, u64, u64)>) -> Result<Self> {
        let mut records = Vec::with_capacity(entries.len());
        let mut by_path = HashMap::with_capacity(entries.len());

        for (id, (path, offset, size)) in entries.into_iter().enumerate() {
            let path = normalize_path(&path);
            if path.is_empty() {
                return Err(Error::invalid_format(format!("record {id} has an empty path")));
            }
            if by_path.insert(path.clone(), id).is_some() {
                return Err(Error::invalid_format(format!("duplicate path '{path}'")));
            }
            records.push(FileRecord::new(id, path, offset, size));
        }

        let root = DirectoryNode::build(&records);
        Ok(Self {
            records,
            by_path,
            root,
        })
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in storage order
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    /// Record by id
    pub fn get(&self, id: usize) -> Option<&FileRecord> {
        self.records.get(id)
    }

    /// Look up a record by internal path
    pub fn find(&self, path: &str) -> Option<&FileRecord> {
        let path = normalize_path(path);
        self.by_path.get(&path).and_then(|&id| self.records.get(id))
    }

    /// Look up a directory or file by internal path
    ///
    /// Directories win over files when both exist at the same path.
    pub fn find_node(&self, path: &str) -> Option<Node<'_>> {
        let path = normalize_path(path);
        if let Some(dir) = self.root.find_directory(&path) {
            return Some(Node::Directory(dir));
        }

        let (parent, name) = match path.rsplit_once('/') {
            Some((parent, name)) => (parent, name),
            None => ("", path.as_str()),
        };
        self.root
            .find_directory(parent)
            .and_then(|dir| dir.file_id(name))
            .and_then(|id| self.records.get(id))
            .map(Node::File)
    }

    /// Root of the directory tree
    pub fn root(&self) -> &DirectoryNode {
        &self.root
    }

    /// Every file record at or below `node`
    pub fn descendants<'a>(&'a self, node: Node<'a>) -> Vec<&'a FileRecord> {
        match node {
            Node::File(record) => vec![record],
            Node::Directory(dir) => dir
                .descendant_ids()
                .into_iter()
                .filter_map(|id| self.records.get(id))
                .collect(),
        }
    }

    /// Resolve a caller-held record back to its live slot
    pub(crate) fn resolve(&self, record: &FileRecord) -> Result<usize> {
        match self.records.get(record.id()) {
            Some(live) if live.path() == record.path() => Ok(record.id()),
            _ => Err(Error::not_found(record.path())),
        }
    }

    pub(crate) fn relocate(&mut self, id: usize, offset: u64, size: u64) {
        if let Some(record) = self.records.get_mut(id) {
            record.relocate(offset, size);
        }
    }
}
