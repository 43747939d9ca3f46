//! Archive reading API.
//!
//! [`extract`] unpacks a zip file under a destination directory, refusing
//! entries that would land outside it and entries that decompress past the
//! configured limits. [`Archive`] exposes the same machinery for callers that
//! want to inspect entries first.
//!
//! # Example
//!
//! ```rust,no_run
//! use fsx::read::{Archive, ExtractOptions};
//!
//! let mut archive = Archive::open_path("archive.zip")?;
//!
//! for entry in archive.entries() {
//!     println!("{}: {} bytes", entry.name, entry.size);
//! }
//!
//! archive.extract("output_dir", &ExtractOptions::default())?;
//! # Ok::<(), fsx::Error>(())
//! ```

mod archive_open;
mod entry;
mod extraction;
mod info;
mod options;

pub use entry::ArchiveEntry;
pub use info::ExtractResult;
pub use options::{ExtractOptions, LinkPolicy, OverwritePolicy, PathSafety, ResourceLimits};

use std::path::Path;

use zip::ZipArchive;

use crate::Result;

/// An opened zip archive.
pub struct Archive<R> {
    pub(crate) zip: ZipArchive<R>,
    pub(crate) entries: Vec<ArchiveEntry>,
}

impl<R> std::fmt::Debug for Archive<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

/// Extracts the zip archive at `archive` under `dest`.
///
/// The archive is opened before anything is created, so a missing or
/// malformed archive leaves the filesystem untouched. The destination is
/// then created (with parents) if needed. Entries are processed in
/// central-directory order; the first failure aborts the extraction after
/// removing that entry's partially written file. Files from earlier entries
/// stay in place.
///
/// # Errors
///
/// - [`Error::NotFound`](crate::Error::NotFound) if the archive is missing
/// - [`Error::InvalidFormat`](crate::Error::InvalidFormat) if it is not a zip
/// - [`Error::PathTraversal`](crate::Error::PathTraversal) for entries that
///   would be written outside `dest`
/// - [`Error::EntryTooLarge`](crate::Error::EntryTooLarge) when an entry
///   exceeds a size or ratio limit
/// - [`Error::ResourceLimitExceeded`](crate::Error::ResourceLimitExceeded)
///   when the archive has too many entries
pub fn extract(
    archive: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<ExtractResult> {
    Archive::open_path(archive)?.extract(dest, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;

    fn archive_with(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in files {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_open_lists_entries() {
        let data = archive_with(&[("a.txt", b"hello"), ("sub/b.txt", b"world!")]);
        let archive = Archive::open(Cursor::new(data)).unwrap();

        assert_eq!(archive.len(), 2);
        assert!(!archive.is_empty());
        assert_eq!(archive.entries()[1].name, "sub/b.txt");
        assert_eq!(archive.entry("sub/b.txt").unwrap().size, 6);
        assert!(archive.entry("missing").is_none());
    }

    #[test]
    fn test_open_rejects_garbage() {
        let err = Archive::open(Cursor::new(b"definitely not a zip".to_vec())).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_open_empty_archive() {
        let archive = Archive::open(Cursor::new(archive_with(&[]))).unwrap();
        assert!(archive.is_empty());
    }

    #[test]
    fn test_extract_missing_archive() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out");
        let err = extract(dir.path().join("missing.zip"), &dest, &ExtractOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert!(!dest.exists());
    }
}
