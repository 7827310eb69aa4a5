// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use booster::GzipParams;
use booster::compression::compress;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Marker used by the default configuration
pub const MARKER: &str = booster::DEFAULT_MARKER;

/// Gzip `data` the way booster itself would.
pub fn canonical_gzip(data: &[u8]) -> Vec<u8> {
    compress(data, &GzipParams::default()).unwrap()
}

/// Gzip `data` with settings booster does not use, so it cannot round-trip.
pub fn foreign_gzip(data: &[u8]) -> Vec<u8> {
    compress(
        data,
        &GzipParams {
            level: 9,
            mtime: 1_700_000_000,
            os: 3,
            ..GzipParams::default()
        },
    )
    .unwrap()
}

/// Tar-like plaintext: repetitive with some variation.
pub fn layer_data(seed: u32, len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    let mut state = seed | 1;
    while out.len() < len {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        out.extend_from_slice(format!("usr/lib/file-{:04}\0", state % 500).as_bytes());
    }
    out.truncate(len);
    out
}

/// Registry-shaped tree:
///
/// ```text
/// blobs/sha256/aa/data   canonical gzip layer
/// blobs/sha256/bb/data   foreign gzip layer
/// blobs/sha256/cc/data   plain JSON manifest
/// repositories/app/link  plain text
/// ```
///
/// Returns the TempDir (keep it alive) and the root path.
pub fn registry_tree() -> (TempDir, PathBuf) {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("registry");

    write(&root.join("blobs/sha256/aa/data"), &canonical_gzip(&layer_data(1, 200_000)));
    write(&root.join("blobs/sha256/bb/data"), &foreign_gzip(&layer_data(2, 50_000)));
    write(
        &root.join("blobs/sha256/cc/data"),
        br#"{"schemaVersion":2,"layers":[]}"#,
    );
    write(&root.join("repositories/app/link"), b"sha256:aa\n");

    (temp, root)
}

pub fn write(path: &Path, data: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, data).unwrap();
}

pub fn shadow_of(path: &Path) -> PathBuf {
    booster::shadow::shadow_path(path, MARKER)
}

/// Every file under `root` with its contents, relative paths as keys.
pub fn snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut files: Vec<_> = walkdir::WalkDir::new(root)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap().to_path_buf();
            (rel, fs::read(e.path()).unwrap())
        })
        .collect();
    files.sort();
    files
}

/// Relative paths of all shadow files under `root`.
pub fn shadows(root: &Path) -> BTreeSet<PathBuf> {
    snapshot(root)
        .into_iter()
        .map(|(path, _)| path)
        .filter(|path| booster::shadow::is_shadow(path, MARKER))
        .collect()
}
