//! Reconciliation and extraction against both backends

use ggpk_index::{
    ArchiveIndex, BackendKind, ExtractOptions, Flow, Index, IndexBuilder, Payload, extract_parallel,
    replace,
};
use pretty_assertions::assert_eq;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

const FILES: &[(&str, &[u8])] = &[
    ("art/icon.png", b"AAAA"),
    ("art/ui/button.dds", b"button"),
    ("data/items.dat", b"items v1"),
    ("readme.txt", b"hello"),
];

fn build(dir: &TempDir, kind: BackendKind) -> PathBuf {
    let builder = FILES.iter().fold(IndexBuilder::new(), |b, (path, data)| {
        b.add_file_data(data.to_vec(), path)
    });
    match kind {
        BackendKind::Bundle => {
            let path = dir.path().join("_.index.bin");
            builder.build_bundle(&path).unwrap();
            path
        }
        BackendKind::Standalone => {
            let path = dir.path().join("Content.ggpk");
            builder.build_standalone(&path).unwrap();
            path
        }
    }
}

fn payload(files: &[(&str, &[u8])]) -> Payload {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in files {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    Payload::from_bytes(writer.finish().unwrap().into_inner()).unwrap()
}

fn contents(path: &Path) -> Vec<(String, Vec<u8>)> {
    let index = ArchiveIndex::open(path).unwrap();
    index
        .table()
        .records()
        .iter()
        .map(|r| (r.path().to_string(), index.read(r).unwrap().to_vec()))
        .collect()
}

fn apply(path: &Path, payload: &Payload) -> usize {
    let mut index = ArchiveIndex::open(path).unwrap();
    replace(&mut index, payload.entries().unwrap(), |_, _| Flow::Continue)
        .unwrap()
        .replaced
}

#[test]
fn test_replace_then_read_back() {
    for kind in [BackendKind::Bundle, BackendKind::Standalone] {
        let dir = TempDir::new().unwrap();
        let path = build(&dir, kind);

        let patch = payload(&[("art\\icon.png", b"BBBB"), ("data/items.dat", b"items v2!!")]);
        assert_eq!(apply(&path, &patch), 2, "{kind:?}");

        let index = ArchiveIndex::open(&path).unwrap();
        assert_eq!(index.kind(), kind);
        let icon = index.find("art/icon.png").unwrap();
        assert_eq!(index.read(&icon).unwrap().as_slice(), b"BBBB");
        let items = index.find("data/items.dat").unwrap();
        assert_eq!(index.read(&items).unwrap().as_slice(), b"items v2!!");
        let readme = index.find("readme.txt").unwrap();
        assert_eq!(index.read(&readme).unwrap().as_slice(), b"hello");
    }
}

#[test]
fn test_reconciliation_is_idempotent() {
    for kind in [BackendKind::Bundle, BackendKind::Standalone] {
        let dir = TempDir::new().unwrap();
        let path = build(&dir, kind);
        let patch = payload(&[
            ("readme.txt", b"patched readme"),
            ("not/in/archive.bin", b"ignored"),
            ("art/ui/button.dds", b"b2"),
        ]);

        let first = apply(&path, &patch);
        let after_first = contents(&path);
        let second = apply(&path, &patch);
        let after_second = contents(&path);

        assert_eq!(first, 2, "{kind:?}");
        assert_eq!(second, first, "{kind:?}");
        assert_eq!(after_second, after_first, "{kind:?}");
    }
}

#[test]
fn test_skip_leaves_content_unchanged() {
    for kind in [BackendKind::Bundle, BackendKind::Standalone] {
        let dir = TempDir::new().unwrap();
        let path = build(&dir, kind);
        let patch = payload(&[("art/icon.png", b"BBBB"), ("readme.txt", b"bye")]);

        let mut index = ArchiveIndex::open(&path).unwrap();
        let summary = replace(&mut index, patch.entries().unwrap(), |_, path| {
            if path == "readme.txt" {
                Flow::Skip
            } else {
                Flow::Continue
            }
        })
        .unwrap();
        assert_eq!(summary.replaced, 1, "{kind:?}");
        assert_eq!(summary.skipped, 1, "{kind:?}");

        let index = ArchiveIndex::open(&path).unwrap();
        let readme = index.find("readme.txt").unwrap();
        assert_eq!(index.read(&readme).unwrap().as_slice(), b"hello");
        let icon = index.find("art/icon.png").unwrap();
        assert_eq!(index.read(&icon).unwrap().as_slice(), b"BBBB");
    }
}

#[test]
fn test_extraction_is_complete() {
    for kind in [BackendKind::Bundle, BackendKind::Standalone] {
        for threads in [1, 4] {
            let dir = TempDir::new().unwrap();
            let path = build(&dir, kind);
            let out = dir.path().join(format!("out-{threads}"));

            let index = ArchiveIndex::open(&path).unwrap();
            let node = index.find_node("").unwrap();
            let written = extract_parallel(
                &index,
                node,
                &out,
                &ExtractOptions::new().threads(threads),
                |_, _| Flow::Continue,
            )
            .unwrap();

            assert_eq!(written, FILES.len());
            for (name, data) in FILES {
                assert_eq!(std::fs::read(out.join(name)).unwrap(), *data);
            }
        }
    }
}
