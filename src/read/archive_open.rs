//! Archive opening and listing.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use zip::ZipArchive;

use crate::{Error, Result};

use super::{Archive, ArchiveEntry};

impl Archive<BufReader<File>> {
    /// Opens an archive from a file path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the file does not exist and
    /// [`Error::InvalidFormat`] if it is not a readable zip archive.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::from_io(e, path))?;
        log::debug!("opening archive {}", path.display());
        Self::open(BufReader::new(file))
    }
}

impl<R: Read + Seek> Archive<R> {
    /// Opens an archive from a reader.
    ///
    /// Reads the central directory; no entry data is decompressed.
    pub fn open(reader: R) -> Result<Self> {
        let mut zip = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(zip.len());
        for index in 0..zip.len() {
            let file = zip.by_index_raw(index)?;
            entries.push(ArchiveEntry::from_zip(index, &file));
        }
        Ok(Self { zip, entries })
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns all entries in central directory order.
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Returns an entry by name.
    pub fn entry(&self, name: &str) -> Option<&ArchiveEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}
