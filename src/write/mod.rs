//! Archive writing API.
//!
//! [`create`] turns a directory tree into a new zip file. [`Writer`] is the
//! lower-level building block it uses, available for callers that assemble
//! archives entry by entry.
//!
//! # Example
//!
//! ```rust,no_run
//! use fsx::{ArchivePath, Writer};
//!
//! let mut writer = Writer::create_path("bundle.zip")?;
//! writer.add_bytes(ArchivePath::new("README.txt")?, b"hello")?;
//! writer.add_path("Cargo.toml", ArchivePath::new("Cargo.toml")?)?;
//! let result = writer.finish()?;
//! println!("wrote {} entries", result.entries_written);
//! # Ok::<(), fsx::Error>(())
//! ```

mod entry_input;
pub(crate) mod options;
mod writer_init;

pub use options::{CompressionMethod, SymlinkPolicy, WriteOptions, WriteResult};

use std::fs;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use zip::ZipWriter;

use crate::{Error, Result};

/// A zip archive writer.
pub struct Writer<W: Write + Seek> {
    zip: ZipWriter<W>,
    options: WriteOptions,
    result: WriteResult,
}

impl<W: Write + Seek> std::fmt::Debug for Writer<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Writer")
            .field("options", &self.options)
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}

/// Archives the directory tree at `src` into a new zip file at `dest`.
///
/// Every regular file below `src` becomes one entry named by its path
/// relative to `src`, with `/` separators. Directories get no entries of
/// their own, so empty directories are not represented. Entries are written
/// in depth-first lexical order, which makes the output deterministic for a
/// given tree.
///
/// The archive is assembled in a temporary file next to `dest` and moved
/// into place only once complete, without replacing anything. A failed call
/// leaves no file at `dest`.
///
/// # Errors
///
/// - [`Error::NotFound`] if `src` does not exist
/// - [`Error::NotADirectory`] if `src` is not a directory
/// - [`Error::AlreadyExists`] if anything exists at `dest`, including a
///   file created concurrently while the archive was being written
/// - [`Error::InvalidArchivePath`] if a file name cannot be stored (not
///   UTF-8, or longer than 32 KiB)
/// - I/O errors from reading the tree or writing the archive
pub fn create(
    src: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    options: &WriteOptions,
) -> Result<WriteResult> {
    let src = src.as_ref();
    let dest = dest.as_ref();

    let meta = fs::metadata(src).map_err(|e| Error::from_io(e, src))?;
    if !meta.is_dir() {
        return Err(Error::NotADirectory {
            path: src.to_path_buf(),
        });
    }
    if fs::symlink_metadata(dest).is_ok() {
        return Err(Error::AlreadyExists {
            path: dest.to_path_buf(),
        });
    }

    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let temp = NamedTempFile::new_in(parent).map_err(|e| Error::from_io(e, parent))?;
    log::debug!(
        "creating {} from {} via {}",
        dest.display(),
        src.display(),
        temp.path().display()
    );

    // The temp file lives in dest's directory, which may sit inside src.
    let root = src.canonicalize().map_err(|e| Error::from_io(e, src))?;
    let exclude = temp
        .path()
        .canonicalize()
        .map_err(|e| Error::from_io(e, temp.path()))?;

    let mut writer = Writer::create(BufWriter::new(temp))?.options(options.clone());
    writer.add_tree(&root, Some(&exclude))?;
    let (result, sink) = writer.finish_into_inner()?;

    let temp = sink.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    temp.as_file().sync_all().map_err(|e| Error::from_io(e, temp.path()))?;
    temp.persist_noclobber(dest)
        .map_err(|e| Error::from_io(e.error, dest))?;

    log::debug!(
        "created {}: {} entries, {} bytes",
        dest.display(),
        result.entries_written + result.symlinks_written,
        result.compressed_size
    );
    Ok(result)
}
