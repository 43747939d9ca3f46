//! Archive entry descriptors.

use zip::read::ZipFile;

const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

/// One entry of an opened archive, as described by the central directory.
///
/// Sizes are the values the archive declares; extraction does not trust them
/// and re-counts bytes while decompressing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Position of the entry in the central directory.
    pub index: usize,
    /// The raw entry name as stored.
    pub name: String,
    /// Declared uncompressed size.
    pub size: u64,
    /// Declared compressed size.
    pub compressed_size: u64,
    /// True for directory entries (names ending in `/`).
    pub is_dir: bool,
    /// True if the stored Unix mode marks the entry as a symbolic link.
    pub is_symlink: bool,
    /// Full Unix mode (type and permission bits), if the archive stores one.
    pub unix_mode: Option<u32>,
}

impl ArchiveEntry {
    pub(crate) fn from_zip(index: usize, file: &ZipFile<'_>) -> Self {
        let unix_mode = file.unix_mode();
        Self {
            index,
            name: file.name().to_string(),
            size: file.size(),
            compressed_size: file.compressed_size(),
            is_dir: file.is_dir(),
            is_symlink: unix_mode.is_some_and(|mode| mode & S_IFMT == S_IFLNK),
            unix_mode,
        }
    }

    /// Returns the permission bits (`rwx` for user, group, other), if stored.
    pub fn permissions(&self) -> Option<u32> {
        self.unix_mode.map(|mode| mode & 0o777)
    }

    /// Returns true for regular file entries.
    pub fn is_file(&self) -> bool {
        !self.is_dir && !self.is_symlink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;

    #[test]
    fn test_from_zip_classifies_entries() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("file.txt", FileOptions::default().unix_permissions(0o640))
            .unwrap();
        writer.write_all(b"content").unwrap();
        writer.add_directory("dir/", FileOptions::default()).unwrap();
        writer
            .add_symlink("link", "file.txt", FileOptions::default())
            .unwrap();
        let data = writer.finish().unwrap().into_inner();

        let mut archive = zip::ZipArchive::new(Cursor::new(data)).unwrap();
        let entries: Vec<_> = (0..archive.len())
            .map(|i| ArchiveEntry::from_zip(i, &archive.by_index_raw(i).unwrap()))
            .collect();

        assert_eq!(entries[0].name, "file.txt");
        assert_eq!(entries[0].size, 7);
        assert!(entries[0].is_file());
        assert_eq!(entries[0].permissions(), Some(0o640));

        assert!(entries[1].is_dir);
        assert!(!entries[1].is_file());

        assert!(entries[2].is_symlink);
        assert_eq!(entries[2].index, 2);
    }
}
