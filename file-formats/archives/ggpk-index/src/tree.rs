//! Directory tree view over the flat record table

use crate::path::normalize_path;
use crate::record::FileRecord;
use std::collections::BTreeMap;

/// A directory in the index tree
///
/// Directories are implied by record paths; the tree holds record ids, not
/// records, so it stays valid while records are rewritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryNode {
    name: String,
    path: String,
    directories: BTreeMap<String, DirectoryNode>,
    files: BTreeMap<String, usize>,
}

/// Result of a tree lookup
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    /// A directory and everything below it
    Directory(&'a DirectoryNode),
    /// A single file record
    File(&'a FileRecord),
}

impl DirectoryNode {
    /// Build the tree for a set of records
    pub(crate) fn build(records: &[FileRecord]) -> Self {
        let mut root = Self::default();
        for record in records {
            root.insert(record.path(), record.id());
        }
        root
    }

    fn insert(&mut self, path: &str, id: usize) {
        let mut node = self;
        let mut segments = path.split('/').peekable();
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                node.files.insert(segment.to_string(), id);
                return;
            }
            let child_path = if node.path.is_empty() {
                segment.to_string()
            } else {
                format!("{}/{}", node.path, segment)
            };
            node = node
                .directories
                .entry(segment.to_string())
                .or_insert_with(|| DirectoryNode {
                    name: segment.to_string(),
                    path: child_path,
                    ..Default::default()
                });
        }
    }

    /// Directory name (empty for the root)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full normalized path (empty for the root)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Immediate subdirectories, sorted by name
    pub fn directories(&self) -> impl Iterator<Item = &DirectoryNode> {
        self.directories.values()
    }

    /// Ids of the files directly in this directory, sorted by name
    pub fn file_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.files.values().copied()
    }

    /// Ids of every file at or below this directory
    pub fn descendant_ids(&self) -> Vec<usize> {
        let mut ids = Vec::new();
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids(&self, ids: &mut Vec<usize>) {
        ids.extend(self.files.values().copied());
        for dir in self.directories.values() {
            dir.collect_ids(ids);
        }
    }

    /// Find a directory by path
    pub fn find_directory(&self, path: &str) -> Option<&DirectoryNode> {
        let path = normalize_path(path);
        if path.is_empty() {
            return Some(self);
        }
        path.split('/')
            .try_fold(self, |node, segment| node.directories.get(segment))
    }

    /// Find the id of a file directly in this directory
    pub(crate) fn file_id(&self, name: &str) -> Option<usize> {
        self.files.get(name).copied()
    }
}
