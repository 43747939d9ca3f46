//! Entry input methods.
//!
//! This module provides methods for adding entries to an archive from
//! various sources: files, readers, byte slices, and whole directory trees.

use std::fs::{self, File};
use std::io::{self, Read, Seek, Write};
use std::path::Path;

use walkdir::WalkDir;

use crate::{ArchivePath, Error, Result};

use super::Writer;
use super::options::SymlinkPolicy;

impl<W: Write + Seek> Writer<W> {
    /// Adds a regular file from a filesystem path.
    ///
    /// Permission bits are taken from the open file, so they match the
    /// content that was read.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be opened or is not a regular
    /// file.
    pub fn add_path(&mut self, disk_path: impl AsRef<Path>, archive_path: ArchivePath) -> Result<()> {
        let disk_path = disk_path.as_ref();
        let mut file = File::open(disk_path).map_err(|e| Error::from_io(e, disk_path))?;
        let meta = file.metadata().map_err(|e| Error::from_io(e, disk_path))?;
        if !meta.is_file() {
            return Err(Error::InvalidArchivePath(format!(
                "'{}' is not a regular file",
                disk_path.display()
            )));
        }

        let mode = unix_mode(&meta);
        self.start_entry(&archive_path, mode, meta.len())?;
        let written = io::copy(&mut file, &mut self.zip).map_err(|e| Error::from_io(e, disk_path))?;
        self.record_file(&archive_path, written);
        Ok(())
    }

    /// Adds data from a reader.
    ///
    /// `mode` is recorded as the entry's Unix permissions when permissions
    /// are preserved. Returns the number of bytes written.
    pub fn add_reader(
        &mut self,
        archive_path: ArchivePath,
        source: &mut dyn Read,
        mode: Option<u32>,
    ) -> Result<u64> {
        self.start_entry(&archive_path, mode, 0)?;
        let written = io::copy(source, &mut self.zip)?;
        self.record_file(&archive_path, written);
        Ok(written)
    }

    /// Adds data from a byte slice.
    pub fn add_bytes(&mut self, archive_path: ArchivePath, data: &[u8]) -> Result<()> {
        self.start_entry(&archive_path, None, data.len() as u64)?;
        self.zip.write_all(data)?;
        self.record_file(&archive_path, data.len() as u64);
        Ok(())
    }

    /// Adds a symbolic link entry pointing at `target`.
    pub fn add_symlink(&mut self, archive_path: ArchivePath, target: &str) -> Result<()> {
        log::debug!("adding symlink {} -> {}", archive_path, target);
        let options = self.options.file_options(None, 0);
        self.zip
            .add_symlink(archive_path.as_str(), target, options)?;
        self.result.symlinks_written += 1;
        Ok(())
    }

    /// Adds every regular file below `root`, named relative to `root`.
    ///
    /// Directories are descended in lexical order and produce no entries.
    /// Symlinks follow [`SymlinkPolicy`]; sockets, pipes, and devices are
    /// skipped. `exclude` names one path to leave out, used to keep an
    /// in-progress archive from swallowing itself.
    pub(crate) fn add_tree(&mut self, root: &Path, exclude: Option<&Path>) -> Result<()> {
        let policy = self.options.symlinks;
        let walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(policy == SymlinkPolicy::Follow)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if is_dangling_link(&err) => {
                    log::warn!(
                        "skipping dangling symlink {}",
                        err.path().unwrap_or(root).display()
                    );
                    self.result.entries_skipped += 1;
                    continue;
                }
                Err(err) => return Err(walk_error(err, root)),
            };
            let path = entry.path();
            if exclude.is_some_and(|excluded| excluded == path) {
                continue;
            }

            let file_type = entry.file_type();
            if file_type.is_dir() {
                continue;
            }

            let relative = path.strip_prefix(root).map_err(|_| {
                Error::InvalidArchivePath(format!("'{}' is outside the walked root", path.display()))
            })?;
            let name = ArchivePath::from_relative(relative)?;

            if file_type.is_symlink() {
                self.add_tree_symlink(path, name, policy)?;
            } else if file_type.is_file() {
                self.add_path(path, name)?;
            } else {
                log::debug!("skipping special file {}", path.display());
                self.result.entries_skipped += 1;
            }
        }
        Ok(())
    }

    fn add_tree_symlink(&mut self, path: &Path, name: ArchivePath, policy: SymlinkPolicy) -> Result<()> {
        if policy != SymlinkPolicy::Store || !cfg!(unix) {
            log::debug!("skipping symlink {}", path.display());
            self.result.entries_skipped += 1;
            return Ok(());
        }
        let target = fs::read_link(path).map_err(|e| Error::from_io(e, path))?;
        let target = target.to_str().ok_or_else(|| {
            Error::InvalidArchivePath(format!(
                "symlink '{}' has a non UTF-8 target",
                path.display()
            ))
        })?;
        self.add_symlink(name, target)
    }

    fn start_entry(&mut self, archive_path: &ArchivePath, mode: Option<u32>, size: u64) -> Result<()> {
        let options = self.options.file_options(mode, size);
        self.zip.start_file(archive_path.as_str(), options)?;
        Ok(())
    }

    fn record_file(&mut self, archive_path: &ArchivePath, size: u64) {
        log::debug!("added {} ({} bytes)", archive_path, size);
        self.result.entries_written += 1;
        self.result.total_size += size;
    }
}

#[cfg(unix)]
fn unix_mode(meta: &fs::Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(meta.permissions().mode())
}

#[cfg(not(unix))]
fn unix_mode(_meta: &fs::Metadata) -> Option<u32> {
    None
}

fn is_dangling_link(err: &walkdir::Error) -> bool {
    err.io_error()
        .is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
        && err.path().is_some_and(|p| p.symlink_metadata().is_ok())
}

fn walk_error(err: walkdir::Error, root: &Path) -> Error {
    let path = err.path().unwrap_or(root).to_path_buf();
    if let Some(ancestor) = err.loop_ancestor() {
        return Error::InvalidArchivePath(format!(
            "symlink loop: '{}' points back to '{}'",
            path.display(),
            ancestor.display()
        ));
    }
    match err.into_io_error() {
        Some(io) => Error::from_io(io, path),
        None => Error::Io(io::Error::other("directory walk failed")),
    }
}
