//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use walkdir::WalkDir;
use zip::write::FileOptions;

/// Writes `(relative path, content)` pairs under `root`, creating parents.
pub fn write_tree(root: &Path, files: &[(&str, &[u8])]) {
    for (name, data) in files {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, data).unwrap();
    }
}

/// Reads every regular file under `root` into a map keyed by its
/// `/`-separated relative path.
pub fn read_tree(root: &Path) -> BTreeMap<String, Vec<u8>> {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap();
            let name = rel
                .components()
                .map(|c| c.as_os_str().to_str().unwrap())
                .collect::<Vec<_>>()
                .join("/");
            (name, fs::read(e.path()).unwrap())
        })
        .collect()
}

/// Converts test fixtures into the map shape returned by [`read_tree`].
pub fn as_map(files: &[(&str, &[u8])]) -> BTreeMap<String, Vec<u8>> {
    files
        .iter()
        .map(|(name, data)| (name.to_string(), data.to_vec()))
        .collect()
}

/// Builds a zip in memory with entry names stored verbatim.
///
/// Unlike [`fsx::Writer`], names are not validated, so this can produce the
/// hostile archives extraction must refuse.
pub fn raw_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    raw_zip_with(entries, FileOptions::default())
}

/// Like [`raw_zip`] with explicit per-entry options.
pub fn raw_zip_with(entries: &[(&str, &[u8])], options: FileOptions) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Writes [`raw_zip`] output to `path`.
pub fn write_raw_zip(path: &Path, entries: &[(&str, &[u8])]) {
    fs::write(path, raw_zip(entries)).unwrap();
}

/// Extracts the error from a Result, panicking if it's Ok.
///
/// Cleaner than `unwrap_err()` when the Ok type doesn't implement Debug.
pub fn expect_err<T, E>(result: Result<T, E>) -> E {
    match result {
        Ok(_) => panic!("Expected error but got Ok"),
        Err(e) => e,
    }
}
