//! Writer initialization and finalization.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use zip::ZipWriter;

use crate::{Error, Result};

use super::Writer;
use super::options::{WriteOptions, WriteResult};

impl Writer<BufWriter<File>> {
    /// Creates a new archive file at the given path.
    ///
    /// The file is opened with create-new semantics, so an existing file is
    /// never truncated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if the path exists, or another error
    /// if the file cannot be created.
    pub fn create_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| Error::from_io(e, path))?;
        Self::create(BufWriter::new(file))
    }

    /// Finishes writing the archive and flushes it to disk.
    pub fn finish(self) -> Result<WriteResult> {
        let (result, sink) = self.finish_into_inner()?;
        let file = sink.into_inner().map_err(|e| Error::Io(e.into_error()))?;
        file.sync_all()?;
        Ok(result)
    }
}

impl<W: Write + Seek> Writer<W> {
    /// Creates a new archive writer over any seekable sink.
    pub fn create(sink: W) -> Result<Self> {
        Ok(Self {
            zip: ZipWriter::new(sink),
            options: WriteOptions::default(),
            result: WriteResult::default(),
        })
    }

    /// Sets the write options for entries added from now on.
    pub fn options(mut self, options: WriteOptions) -> Self {
        self.options = options;
        self
    }

    /// Writes the central directory and returns the statistics and the sink.
    ///
    /// `compressed_size` in the result is the sink's position after the
    /// central directory, i.e. the archive length for a fresh sink.
    pub fn finish_into_inner(self) -> Result<(WriteResult, W)> {
        let Self { mut zip, mut result, .. } = self;
        let mut sink = zip.finish()?;
        sink.flush()?;
        result.compressed_size = sink.stream_position()?;
        Ok((result, sink))
    }
}
